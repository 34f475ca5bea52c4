//! Logging setup for the dispatch planner.
//!
//! Structured logging via `tracing`, with a compact default format and a
//! verbose format that includes target/file/line for troubleshooting.

use std::io::IsTerminal;
use tracing_subscriber::{
    EnvFilter,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Initialize the global tracing subscriber.
///
/// `verbose` switches the default filter from `info,warn` to `debug,info`
/// and enables target/file/line annotations on each log line. `RUST_LOG`
/// always overrides the default filter when set.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("dispatch_planner=debug,info")
        } else {
            EnvFilter::new("dispatch_planner=info,warn")
        }
    });

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(use_color()),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_ansi(use_color()),
            )
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_color_does_not_panic() {
        let _ = use_color();
    }
}
