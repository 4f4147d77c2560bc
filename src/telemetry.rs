//! Tracing setup.
//!
//! `LOG_LEVEL` takes an `EnvFilter` directive string (e.g. "debug" or
//! "info,allocation=debug,pool=warn"); `LOG_FORMAT=json` switches to JSON lines.
//!
//! Targets used by this crate: `quiz_allocator` (lifecycle), `allocation`
//! (planning, tier visits, shortfalls), `pool` (inventory changes).

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,quiz_allocator=debug,tower_http=info";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

fn filter_from(raw: Option<String>) -> EnvFilter {
    raw.and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init_tracing() {
    let filter = filter_from(std::env::var("LOG_LEVEL").ok());
    let format = LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // json() changes the builder type, so each arm finishes on its own.
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
