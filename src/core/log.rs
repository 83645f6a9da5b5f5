use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Level for the crate's own events. The web server keeps `info` so its
/// listen address and fallback warnings reach the console.
pub fn app_level(verbose: bool, serving: bool) -> LevelFilter {
    match (verbose, serving) {
        (true, _) => LevelFilter::DEBUG,
        (false, true) => LevelFilter::INFO,
        (false, false) => LevelFilter::OFF,
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
///
/// Server output is compact and timestamped; terminal conversions use the
/// pretty format without time.
pub fn init_logging(verbose: bool, serving: bool) {
    let level = app_level(verbose, serving);
    let app_filter = Targets::new().with_target("fxform", level);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    tracing_subscriber::registry()
        .with(serving.then(|| fmt::layer().compact()))
        .with((!serving).then(|| fmt::layer().pretty().without_time()))
        .with(app_filter)
        .with(env_filter)
        .init();
}
