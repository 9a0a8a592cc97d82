use slog::{o, Drain, FilterLevel, Logger};

use crate::env::ENV_VARS;

mod codes;

pub use codes::LogCode;

/// Create the root logger. Log levels can be adjusted with the
/// `VIEWGRAPH_LOG` environment variable, which accepts the same directives
/// as `env_logger`.
pub fn logger(show_debug: bool) -> Logger {
    logger_with_levels(show_debug, ENV_VARS.log_levels())
}

pub fn logger_with_levels(show_debug: bool, levels: Option<&str>) -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_envlogger::LogBuilder::new(drain)
        .filter(
            None,
            if show_debug {
                FilterLevel::Debug
            } else {
                FilterLevel::Info
            },
        )
        .parse(levels.unwrap_or(""))
        .build();
    let drain = slog_async::Async::new(drain)
        .chan_size(20000)
        .build()
        .fuse();
    Logger::root(drain, o!())
}

/// A logger that drops everything; meant for tests and for callers that
/// do not care about diagnostics.
pub fn discard() -> Logger {
    Logger::root(slog::Discard, o!())
}
