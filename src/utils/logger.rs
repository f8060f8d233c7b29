use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directives used when `RUST_LOG` is unset. Both binaries log at the same level.
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "cloud_labs=debug,dynamodb_basics=debug,info"
    } else {
        "cloud_labs=info,dynamodb_basics=info,warn"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

/// Compact one-line events on stderr, without targets or source locations.
pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// JSON lines, for runs captured by CI or a log shipper.
pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(env_filter(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .json()
                .with_current_span(false),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_cover_both_binaries() {
        for verbose in [false, true] {
            let directives = default_directives(verbose);
            assert!(directives.contains("cloud_labs="));
            assert!(directives.contains("dynamodb_basics="));
        }
        assert!(default_directives(true).contains("cloud_labs=debug"));
    }
}
