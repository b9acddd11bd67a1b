//! Logging for the `index`, `search` and `ask` commands.
//!
//! Events are tagged with the pipeline stage that emits them (`documents`, `ingest`,
//! `chunker`, `embedding`, `vector`, `query`, `generation`). Each stage can get
//! its own level. Everything goes to stderr so answers on stdout stay readable.
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! default = "warn"  # quiet by default
//!
//! [logging.modules]
//! chunker = "debug"  # trace unit packing
//! ```
//!
//! # Environment Variable
//!
//! A set `RUST_LOG` replaces the configured levels entirely:
//! ```bash
//! RUST_LOG=debug lexrag index
//! RUST_LOG=vector=trace,query=debug lexrag ask
//! ```

use std::sync::Once;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Wall-clock `HH:MM:SS.mmm`, enough to see where an ingestion run spends time.
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// `default` followed by `stage=level` pairs in name order.
fn filter_directives(config: &LoggingConfig) -> String {
    let mut modules: Vec<_> = config.modules.iter().collect();
    modules.sort();

    let mut filter_str = config.default.clone();
    for (module, level) in modules {
        filter_str.push_str(&format!(",{module}={level}"));
    }
    filter_str
}

/// Install the stderr subscriber for `[logging]` settings.
///
/// Only the first call installs anything, so tests may call it freely.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(filter_directives(config))
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_timer(CompactTime)
            .with_level(true)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}

/// Install the subscriber at the default `warn` level.
pub fn init() {
    init_with_config(&LoggingConfig::default());
}

/// Info event prefixed with its pipeline stage, e.g. `[ingest] chunked: 42 chunks`.
///
/// # Examples
/// ```ignore
/// log_event!("ingest", "chunked", "{} chunks", chunks.len());
/// log_event!("ingest", "saved");
/// ```
#[macro_export]
macro_rules! log_event {
    ($handler:expr, $event:expr) => {
        tracing::info!("[{}] {}", $handler, $event)
    };
    ($handler:expr, $event:expr, $($arg:tt)*) => {
        tracing::info!("[{}] {}: {}", $handler, $event, format!($($arg)*))
    };
}

/// Stage-prefixed event at debug level, for previews and sizes.
///
/// # Examples
/// ```ignore
/// debug_event!("query", "context", "{} chars", context.len());
/// ```
#[macro_export]
macro_rules! debug_event {
    ($handler:expr, $event:expr) => {
        tracing::debug!("[{}] {}", $handler, $event)
    };
    ($handler:expr, $event:expr, $($arg:tt)*) => {
        tracing::debug!("[{}] {}: {}", $handler, $event, format!($($arg)*))
    };
}
