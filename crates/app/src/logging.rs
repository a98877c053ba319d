use std::io;

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

const DEFAULT_LEVEL: LevelFilter = LevelFilter::INFO;

pub(crate) fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::OFF),
        "error" => Some(LevelFilter::ERROR),
        "warn" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}

pub(crate) fn level_from_args(args: &[String]) -> LevelFilter {
    args.iter()
        .position(|arg| arg == "--log-level")
        .and_then(|idx| args.get(idx + 1))
        .and_then(|value| parse_level(value))
        .unwrap_or(DEFAULT_LEVEL)
}

/// Our own targets log at `level`; dependencies only at WARN and above.
pub(crate) fn setup_tracing(level: LevelFilter) {
    let filter_layer = tracing_subscriber::filter::filter_fn(move |metadata| {
        let is_surfvol = metadata.target().starts_with("surfvol");
        if is_surfvol {
            *metadata.level() <= level
        } else {
            *metadata.level() <= Level::WARN
        }
    });
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter_layer))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels() {
        assert_eq!(parse_level("DEBUG"), Some(LevelFilter::DEBUG));
        assert_eq!(parse_level("off"), Some(LevelFilter::OFF));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn level_flag_falls_back_to_default() {
        let args: Vec<String> = ["surfvol", "resample", "--log-level", "trace"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(level_from_args(&args), LevelFilter::TRACE);
        assert_eq!(level_from_args(&args[..2]), DEFAULT_LEVEL);
    }
}
