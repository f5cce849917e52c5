use std::backtrace::{Backtrace, BacktraceStatus};
use std::io::Write;
use std::panic::PanicHookInfo;
use std::sync::{Once, OnceLock};

use sweep_config::{Environment, UnsupportedEnvironment};
use thiserror::Error;
use tracing::field::display;
use tracing::subscriber::{SetGlobalDefaultError, set_global_default};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_log::{LogTracer, log_tracer::SetLoggerError};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber, Registry, fmt, layer::SubscriberExt};

/// JSON field name identifying the cluster a log line comes from.
const CLUSTER_KEY_IN_LOG: &str = "cluster";

/// Errors that can occur during tracing initialization.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to init log tracer: {0}")]
    InitLogTracer(#[from] SetLoggerError),

    #[error("failed to set global default subscriber: {0}")]
    SetGlobalDefault(#[from] SetGlobalDefaultError),

    #[error("failed to detect the environment: {0}")]
    Environment(#[from] UnsupportedEnvironment),
}

/// Keeps buffered log lines alive until the binary exits.
///
/// Production mode holds the [`WorkerGuard`] of the non-blocking writer; dropping it
/// flushes pending lines.
#[must_use]
pub enum LogFlusher {
    Flusher(WorkerGuard),
    NullFlusher,
}

static INIT_TEST_TRACING: Once = Once::new();

/// Initializes tracing for tests.
///
/// Output is only enabled when `ENABLE_TRACING` is set:
/// ```bash
/// ENABLE_TRACING=1 cargo test test_name
/// ```
pub fn init_test_tracing() {
    INIT_TEST_TRACING.call_once(|| {
        if std::env::var("ENABLE_TRACING").is_ok() {
            // Tests want readable output, not JSON.
            Environment::Dev.set();
            let _log_flusher =
                init_tracing("test", None).expect("Failed to initialize tracing for tests");
        }
    });
}

static CLUSTER_NAME: OnceLock<String> = OnceLock::new();

/// Sets the cluster name attached to every JSON log line.
pub fn set_global_cluster_name(cluster_name: String) {
    let _ = CLUSTER_NAME.set(cluster_name);
}

pub fn get_global_cluster_name() -> Option<&'static str> {
    CLUSTER_NAME.get().map(|s| s.as_str())
}

/// Writer wrapper adding the cluster name to JSON log entries that lack it.
struct ClusterInjectingWriter<W> {
    inner: W,
}

impl<W> ClusterInjectingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W> Write for ClusterInjectingWriter<W>
where
    W: Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Some(cluster_name) = get_global_cluster_name()
            && let Some(injected) = inject_field(buf, CLUSTER_KEY_IN_LOG, cluster_name)
        {
            // The caller handed us `buf`, so that is what we report as written.
            self.inner.write_all(injected.as_bytes())?;
            return Ok(buf.len());
        }

        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Returns `buf` with `key` set to `value` if `buf` is a JSON object without `key`.
fn inject_field(buf: &[u8], key: &str, value: &str) -> Option<String> {
    let json_str = std::str::from_utf8(buf).ok()?;
    let serde_json::Value::Object(mut map) = serde_json::from_str(json_str).ok()? else {
        return None;
    };

    if map.contains_key(key) {
        return None;
    }

    map.insert(key.to_owned(), serde_json::Value::String(value.to_owned()));
    let modified = serde_json::to_string(&map).ok()?;

    if json_str.ends_with('\n') {
        Some(format!("{modified}\n"))
    } else {
        Some(modified)
    }
}

/// Initializes tracing for a binary.
///
/// `RUST_LOG` controls the filter and defaults to `info`. Events emitted through the
/// `log` crate, which `kube` dependencies still use, are forwarded to `tracing`.
pub fn init_tracing(
    app_name: &str,
    cluster_name: Option<String>,
) -> Result<LogFlusher, TracingError> {
    if let Some(cluster_name) = cluster_name {
        set_global_cluster_name(cluster_name);
    }

    LogTracer::init()?;

    let is_prod = Environment::load()?.is_prod();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_flusher = if is_prod {
        configure_prod_tracing(filter)?
    } else {
        configure_dev_tracing(filter)?
    };

    set_tracing_panic_hook();

    tracing::debug!(app_name, is_prod, "tracing initialized");

    Ok(log_flusher)
}

/// JSON lines on stderr, written from a background thread.
fn configure_prod_tracing(filter: EnvFilter) -> Result<LogFlusher, TracingError> {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let format = fmt::format()
        .with_level(true)
        .with_ansi(false)
        .with_target(false);

    let subscriber = Registry::default().with(filter).with(
        fmt::layer()
            .event_format(format)
            .with_writer(move || ClusterInjectingWriter::new(writer.make_writer()))
            .json()
            .with_current_span(true)
            .with_span_list(true),
    );

    set_global_default(subscriber)?;

    Ok(LogFlusher::Flusher(guard))
}

/// Pretty, colored output on stderr.
fn configure_dev_tracing(filter: EnvFilter) -> Result<LogFlusher, TracingError> {
    let format = fmt::format()
        .with_level(true)
        .with_ansi(true)
        .pretty()
        .with_line_number(false)
        .with_file(false)
        .with_target(true);

    let subscriber = FmtSubscriber::builder()
        .event_format(format)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    set_global_default(subscriber)?;

    Ok(LogFlusher::NullFlusher)
}

/// Routes panics through `tracing` before running the previous hook.
fn set_tracing_panic_hook() {
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        panic_hook(info);
        prev_hook(info);
    }));
}

fn panic_hook(panic_info: &PanicHookInfo) {
    let backtrace = Backtrace::capture();
    let (backtrace, note) = match backtrace.status() {
        BacktraceStatus::Captured => (Some(backtrace), None),
        BacktraceStatus::Disabled => (
            None,
            Some("run with RUST_BACKTRACE=1 to display backtraces"),
        ),
        BacktraceStatus::Unsupported => {
            (None, Some("backtraces are not supported on this platform"))
        }
        _ => (None, Some("backtrace status is unknown")),
    };

    let payload = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    };

    let location = panic_info.location().map(|location| location.to_string());

    tracing::error!(
        panic.payload = payload,
        payload.location = location,
        panic.backtrace = backtrace.map(display),
        panic.note = note,
        "a panic occurred",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injects_cluster_into_json_lines() {
        let line = b"{\"level\":\"INFO\",\"fields\":{\"message\":\"hi\"}}\n";

        let injected = inject_field(line, CLUSTER_KEY_IN_LOG, "prod-eu").unwrap();
        let value: serde_json::Value = serde_json::from_str(injected.trim_end()).unwrap();

        assert_eq!(value["cluster"], "prod-eu");
        assert!(injected.ends_with('\n'));
    }

    #[test]
    fn leaves_existing_cluster_field_alone() {
        let line = br#"{"cluster":"other"}"#;

        assert!(inject_field(line, CLUSTER_KEY_IN_LOG, "prod-eu").is_none());
    }

    #[test]
    fn ignores_non_json_output() {
        assert!(inject_field(b"plain text", CLUSTER_KEY_IN_LOG, "prod-eu").is_none());
    }
}
