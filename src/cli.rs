use clap::{Parser, ValueEnum};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingFormat {
    Pretty,
    Json,
}

fn default_tracing_format() -> TracingFormat {
    if cfg!(debug_assertions) {
        TracingFormat::Pretty
    } else {
        TracingFormat::Json
    }
}

/// Simulates admin dashboard viewers sharing cached backend reads.
#[derive(Debug, Parser)]
#[command(name = "dashboard-cache", version, about)]
pub struct Args {
    /// Log output format
    #[arg(long, value_enum, default_value_t = default_tracing_format())]
    pub tracing: TracingFormat,

    /// Number of dashboard viewers loading the same data at once
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u16).range(1..))]
    pub viewers: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults() {
        let args = Args::try_parse_from(["dashboard-cache"]).unwrap();
        assert_eq!(args.viewers, 8);
    }

    #[test]
    fn parses_json_tracing() {
        let args =
            Args::try_parse_from(["dashboard-cache", "--tracing", "json", "--viewers", "3"])
                .unwrap();
        assert_eq!(args.tracing, TracingFormat::Json);
        assert_eq!(args.viewers, 3);
    }

    #[test]
    fn rejects_zero_viewers() {
        assert!(Args::try_parse_from(["dashboard-cache", "--viewers", "0"]).is_err());
    }
}
