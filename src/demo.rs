//! Simulated admin dashboard load against a fake backend.
//!
//! Several viewers open the enrollment dashboard at once; the single-flight
//! cache turns that into one backend read. A roster cache is pre-seeded from
//! data obtained elsewhere, and the payments cache is invalidated after use.

use anyhow::Context;
use futures::future::try_join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use crate::cache::{CacheOptions, CacheRegistry, CacheStatus};

pub const ENROLLMENT_CACHE: &str = "enrollment-summary";
pub const ROSTER_CACHE: &str = "instructor-roster";
pub const PAYMENTS_CACHE: &str = "pending-payments";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentSummary {
    pub course: String,
    pub enrolled: u32,
    pub waitlisted: u32,
}

/// Stand-in for the document database behind the dashboards.
#[derive(Debug)]
pub struct SimulatedBackend {
    reads: AtomicUsize,
    latency: Duration,
}

impl SimulatedBackend {
    pub fn new(latency: Duration) -> Self {
        Self {
            reads: AtomicUsize::new(0),
            latency,
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub async fn enrollment_summary(&self, course: &str) -> anyhow::Result<EnrollmentSummary> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        debug!(course, "enrollment summary read from backend");
        Ok(EnrollmentSummary {
            course: course.to_owned(),
            enrolled: 42,
            waitlisted: 3,
        })
    }

    pub async fn pending_payments(&self) -> anyhow::Result<u32> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        Ok(7)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoReport {
    pub viewers: usize,
    pub backend_reads: usize,
    pub caches: BTreeMap<String, CacheStatus>,
}

pub async fn run(
    registry: &CacheRegistry,
    backend: Arc<SimulatedBackend>,
    options: CacheOptions,
    viewers: usize,
) -> anyhow::Result<DemoReport> {
    let enrollment = registry
        .get_instance::<EnrollmentSummary>(ENROLLMENT_CACHE, options)
        .context("Failed to register enrollment cache")?;

    let loads = (0..viewers).map(|viewer| {
        let enrollment = Arc::clone(&enrollment);
        let backend = Arc::clone(&backend);
        async move {
            let summary = enrollment
                .get_data(
                    move || async move { backend.enrollment_summary("CISSP").await },
                    false,
                )
                .await?;
            debug!(viewer, enrolled = summary.enrolled, "dashboard rendered");
            Ok::<_, anyhow::Error>(summary)
        }
    });
    try_join_all(loads)
        .await
        .context("Failed to load enrollment dashboard")?;

    let roster = registry
        .get_instance::<Vec<String>>(ROSTER_CACHE, options)
        .context("Failed to register roster cache")?;
    roster.set_cache(vec!["A. Rivera".to_owned(), "J. Okafor".to_owned()]);

    let payments = registry
        .get_instance::<u32>(PAYMENTS_CACHE, options)
        .context("Failed to register payments cache")?;
    let pending = {
        let backend = Arc::clone(&backend);
        payments
            .get_data(move || async move { backend.pending_payments().await }, false)
            .await
            .context("Failed to load pending payments")?
    };
    info!(pending = *pending, "pending payments loaded");
    // A payment was just approved; the count is now stale.
    registry.invalidate(PAYMENTS_CACHE);

    let report = DemoReport {
        viewers,
        backend_reads: backend.reads(),
        caches: registry.all_status(),
    };
    info!(
        viewers,
        backend_reads = report.backend_reads,
        caches = report.caches.len(),
        "dashboard simulation finished"
    );
    Ok(report)
}
