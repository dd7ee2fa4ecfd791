// tests/logging.rs

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use workdag::cli::{CliArgs, LogLevel};
use workdag::logging::build_filter;

#[test]
fn cli_level_sets_the_filter_ceiling() {
    let cases = [
        (LogLevel::Error, LevelFilter::ERROR),
        (LogLevel::Warn, LevelFilter::WARN),
        (LogLevel::Info, LevelFilter::INFO),
        (LogLevel::Debug, LevelFilter::DEBUG),
        (LogLevel::Trace, LevelFilter::TRACE),
    ];

    for (level, expected) in cases {
        assert_eq!(build_filter(Some(level)).max_level_hint(), Some(expected), "{level:?}");
    }
}

#[test]
fn log_level_flag_accepts_known_levels_only() {
    let args = CliArgs::try_parse_from(["workdag", "--log-level", "debug"]).unwrap();
    assert!(matches!(args.log_level, Some(LogLevel::Debug)));

    let args = CliArgs::try_parse_from(["workdag"]).unwrap();
    assert!(args.log_level.is_none());

    assert!(CliArgs::try_parse_from(["workdag", "--log-level", "loud"]).is_err());
}
