use metrics::{try_create_int_counter, IntCounter, Result as MetricsResult};
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const MAX_MESSAGE_WIDTH: usize = 40;

pub mod tracing_logging_layer;

pub use tracing_logging_layer::LoggingLayer;

/// The minimum interval between log messages indicating that a queue is full.
const LOG_DEBOUNCE_INTERVAL: Duration = Duration::from_secs(30);

pub static INFOS_TOTAL: LazyLock<MetricsResult<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("info_total", "Count of infos logged"));
pub static WARNS_TOTAL: LazyLock<MetricsResult<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("warn_total", "Count of warns logged"));
pub static ERRORS_TOTAL: LazyLock<MetricsResult<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("error_total", "Count of errors logged"));
pub static CRITS_TOTAL: LazyLock<MetricsResult<IntCounter>> =
    LazyLock::new(|| try_create_int_counter("crit_total", "Count of crits logged"));

/// Provides de-bounce functionality for logging. `elapsed()` only returns `true` once every
/// `LOG_DEBOUNCE_INTERVAL`, used to avoid flooding logs from hot loops such as a full worker
/// queue or a peer repeatedly failing validation.
#[derive(Default)]
pub struct TimeLatch(Option<Instant>);

impl TimeLatch {
    /// Only returns true once every `LOG_DEBOUNCE_INTERVAL`.
    pub fn elapsed(&mut self) -> bool {
        let now = Instant::now();

        let is_elapsed = self.0.is_some_and(|elapse_time| now > elapse_time);

        if is_elapsed || self.0.is_none() {
            self.0 = Some(now + LOG_DEBOUNCE_INTERVAL);
        }

        is_elapsed
    }
}

/// Options controlling the production tracing subscriber built by `init_tracing`.
pub struct LoggingConfig {
    pub log_color: bool,
    pub json_stdout: bool,
    pub extra_info: bool,
    pub log_file_path: Option<PathBuf>,
    pub max_log_size_mb: u64,
    pub max_log_number: usize,
    pub log_file_compression: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_color: true,
            json_stdout: false,
            extra_info: false,
            log_file_path: None,
            max_log_size_mb: 200,
            max_log_number: 5,
            log_file_compression: false,
        }
    }
}

/// Initializes the global tracing subscriber for long-running binaries (the `node` crate).
/// Writes formatted events to stdout, or to a rolling log file when `log_file_path` is set, via
/// a non-blocking writer; the returned `WorkerGuard` must be held for the lifetime of the
/// process or buffered events may be lost on exit.
pub fn init_tracing(config: LoggingConfig) -> WorkerGuard {
    let writer: Box<dyn std::io::Write + Send> = if let Some(path) = &config.log_file_path {
        use logroller::{Compression, LogRollerBuilder, Rotation, RotationSize};
        let mut builder = LogRollerBuilder::new(
            path.parent().unwrap_or_else(|| std::path::Path::new(".")).to_path_buf(),
            path.file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("node.log")),
        )
        .rotation(Rotation::SizeBased(RotationSize::MB(config.max_log_size_mb)))
        .max_keep_files(config.max_log_number as u64);
        if config.log_file_compression {
            builder = builder.compression(Compression::Gzip);
        }
        match builder.build() {
            Ok(roller) => Box::new(roller),
            Err(_) => Box::new(std::io::stdout()),
        }
    } else {
        Box::new(std::io::stdout())
    };

    let (non_blocking_writer, guard) = NonBlocking::new(writer);
    let (unused_writer, unused_guard) = NonBlocking::new(std::io::sink());
    let _ = unused_writer;

    let layer = LoggingLayer::new(
        non_blocking_writer,
        unused_guard,
        false,
        config.log_color,
        config.log_color,
        if config.json_stdout {
            Some("JSON".to_string())
        } else {
            None
        },
        None,
        config.extra_info,
        false,
    );

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init();

    guard
}

/// Return a tracing subscriber suitable for test usage.
///
/// By default no logs will be printed, but they can be enabled via
/// the `test_logger` feature.  This feature can be enabled for any
/// dependent crate by passing `--features logging/test_logger`, e.g.
/// ```bash
/// cargo test -p custody --features logging/test_logger
/// ```
pub fn create_test_tracing_subscriber() {
    if cfg!(feature = "test_logger") {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_new("debug").unwrap())
            .try_init();
    }
}
