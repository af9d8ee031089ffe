//! Logging system
//!
//! Two sinks share one `tracing` registry:
//! - a daily-rolling file in one-line JSON (always on)
//! - human-readable lines on stdout (always on; the shell reads them)
//!
//! Every JSON line carries timestamp (ISO 8601 with offset, millisecond
//! precision), level, target, pid, tid, file + line, message, structured
//! fields and the app version. `log` records from dependencies are bridged
//! into `tracing`.

use log::LevelFilter;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::Level;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

static APP_VERSION: OnceLock<String> = OnceLock::new();
static LOGGER_READY: OnceLock<()> = OnceLock::new();
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize the logging system.
///
/// `file_name` is the prefix of the rolling log file (`server.log`,
/// `shell.log`, ...). `verbose` raises the default level to trace for
/// this workspace's targets.
pub fn init_logger(log_dir: PathBuf, file_name: &str, verbose: bool) -> anyhow::Result<()> {
    if LOGGER_READY.get().is_some() {
        return Ok(());
    }

    std::fs::create_dir_all(&log_dir)?;

    let _ = APP_VERSION.set(env!("CARGO_PKG_VERSION").to_string());

    // Forward `log` crate records into tracing
    let _ = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init();

    let file_appender = rolling::daily(&log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = FILE_GUARD.set(guard);

    let json_layer = fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_current_span(false)
        .with_span_list(false)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(true)
        .with_timer(fmt::time::ChronoLocal::new(
            "%Y-%m-%dT%H:%M:%S%.3f%:z".to_string(),
        ))
        .event_format(JsonFormatter::new())
        .with_filter(get_file_filter(verbose));

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(std::io::stdout().is_terminal())
        .event_format(HumanReadableFormatter::new(std::io::stdout().is_terminal()))
        .with_filter(get_stdout_filter(verbose));

    let subscriber = Registry::default().with(json_layer).with(stdout_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    let _ = LOGGER_READY.set(());

    tracing::info!(
        target: "loginport::logging",
        log_dir = %log_dir.display(),
        version = env!("CARGO_PKG_VERSION"),
        profile = if cfg!(debug_assertions) { "Debug" } else { "Release" },
        "Logger initialized successfully"
    );

    Ok(())
}

/// Console-only fallback when the log directory is unusable.
pub fn init_console_logger(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(get_stdout_filter(verbose))
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .try_init();
}

fn get_file_filter(verbose: bool) -> EnvFilter {
    // RUST_LOG overrides
    let default_level = if verbose || cfg!(debug_assertions) {
        "debug,loginport=trace"
    } else {
        "info,chromiumoxide=warn"
    };

    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn get_stdout_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose {
        "debug,loginport=trace"
    } else {
        "info,chromiumoxide=warn,tungstenite=warn"
    };

    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

// ============================================================
// Formatters
// ============================================================

use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// One-line JSON formatter
struct JsonFormatter {
    pid: u32,
    version: String,
}

impl JsonFormatter {
    fn new() -> Self {
        Self {
            pid: std::process::id(),
            version: APP_VERSION
                .get()
                .cloned()
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
        }
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();

        let now = chrono::Local::now();
        let timestamp = now.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string();

        let thread = std::thread::current();
        let tid = format!("{:?}", thread.id());
        let thread_name = thread.name().unwrap_or("unnamed");

        let mut json = serde_json::json!({
            "timestamp": timestamp,
            "level": metadata.level().to_string(),
            "pid": self.pid,
            "tid": tid,
            "thread_name": thread_name,
            "target": metadata.target(),
            "version": self.version,
        });

        if let Some(file) = metadata.file() {
            json["file"] = serde_json::json!(file);
        }
        if let Some(line) = metadata.line() {
            json["line"] = serde_json::json!(line);
        }

        let mut fields_visitor = JsonVisitor::new();
        event.record(&mut fields_visitor);

        if let Some(message) = fields_visitor.fields.get("message") {
            json["message"] = message.clone();
        }

        let custom_fields: serde_json::Map<String, serde_json::Value> = fields_visitor
            .fields
            .into_iter()
            .filter(|(key, _)| key != "message")
            .collect();

        if !custom_fields.is_empty() {
            json["fields"] = serde_json::Value::Object(custom_fields);
        }

        writeln!(
            writer,
            "{}",
            serde_json::to_string(&json).unwrap_or_default()
        )
    }
}

/// Human-readable formatter
///
/// `2025-12-09 10:32:15.123 [INFO] (loginport::login) pid=12345 account=1111 — message`
struct HumanReadableFormatter {
    pid: u32,
    ansi: bool,
}

impl HumanReadableFormatter {
    fn new(ansi: bool) -> Self {
        Self {
            pid: std::process::id(),
            ansi,
        }
    }

    fn level_str(&self, level: &Level) -> &'static str {
        if !self.ansi {
            return match *level {
                Level::ERROR => "ERROR",
                Level::WARN => "WARN",
                Level::INFO => "INFO",
                Level::DEBUG => "DEBUG",
                Level::TRACE => "TRACE",
            };
        }
        match *level {
            Level::ERROR => "\x1b[31mERROR\x1b[0m",
            Level::WARN => "\x1b[33mWARN\x1b[0m",
            Level::INFO => "\x1b[32mINFO\x1b[0m",
            Level::DEBUG => "\x1b[36mDEBUG\x1b[0m",
            Level::TRACE => "\x1b[35mTRACE\x1b[0m",
        }
    }
}

impl<S, N> FormatEvent<S, N> for HumanReadableFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();

        let now = chrono::Local::now();
        let timestamp = now.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let mut fields_visitor = JsonVisitor::new();
        event.record(&mut fields_visitor);

        let message = fields_visitor
            .fields
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        let field_parts: Vec<String> = fields_visitor
            .fields
            .iter()
            .filter(|(key, _)| key.as_str() != "message")
            .map(|(key, value)| match value.as_str() {
                Some(s) => format!("{}={}", key, s),
                None => format!("{}={}", key, value),
            })
            .collect();
        let fields_str = if field_parts.is_empty() {
            String::new()
        } else {
            format!(" {}", field_parts.join(" "))
        };

        writeln!(
            writer,
            "{} [{}] ({}) pid={}{} — {}",
            timestamp,
            self.level_str(metadata.level()),
            metadata.target(),
            self.pid,
            fields_str,
            message,
        )
    }
}

/// Collects event fields into a JSON map
struct JsonVisitor {
    fields: serde_json::Map<String, serde_json::Value>,
}

impl JsonVisitor {
    fn new() -> Self {
        Self {
            fields: serde_json::Map::new(),
        }
    }
}

impl tracing::field::Visit for JsonVisitor {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.fields.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}
