//! Keyed, TTL-based, single-flight cache for admin dashboard data.

mod entry;
mod errors;
mod manager;
mod options;
mod registry;
mod status;

pub use errors::CacheError;
pub use manager::{CacheManager, FetchResult};
pub use options::{CacheOptions, DEFAULT_TTL};
pub use registry::{CacheRegistry, ManagedCache};
pub use status::CacheStatus;
