use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock, RwLock};
use tracing::Subscriber;
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Lines kept for the in-app log panel.
pub const LOG_CAPACITY: usize = 500;

static LOG_BUFFER: OnceLock<Arc<Mutex<VecDeque<String>>>> = OnceLock::new();

fn get_log_buffer() -> &'static Arc<Mutex<VecDeque<String>>> {
    LOG_BUFFER.get_or_init(|| Arc::new(Mutex::new(VecDeque::with_capacity(LOG_CAPACITY))))
}

pub fn append_log(line: String) {
    if let Ok(mut buffer) = get_log_buffer().lock() {
        if buffer.len() == LOG_CAPACITY {
            buffer.pop_front();
        }
        buffer.push_back(line);
    }
}

/// Snapshot of captured lines, oldest first.
pub fn recent_logs() -> Vec<String> {
    get_log_buffer()
        .lock()
        .map(|buffer| buffer.iter().cloned().collect())
        .unwrap_or_default()
}

pub fn clear_logs() {
    if let Ok(mut buffer) = get_log_buffer().lock() {
        buffer.clear();
    }
}

pub struct LogCaptureLayer;

impl<S> Layer<S> for LogCaptureLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        struct MessageVisitor {
            message: String,
        }

        impl tracing::field::Visit for MessageVisitor {
            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = format!("{:?}", value);
                }
            }

            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    self.message = value.to_string();
                }
            }
        }

        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);

        append_log(format!(
            "[{}] {}: {}",
            metadata.level(),
            metadata.target(),
            visitor.message
        ));
    }
}

// Type-erased reload handle using a closure
type ReloadFn = Box<dyn Fn(&str) + Send + Sync>;

static RELOAD_HANDLE: OnceLock<Arc<RwLock<Option<ReloadFn>>>> = OnceLock::new();

fn get_reload_handle() -> &'static Arc<RwLock<Option<ReloadFn>>> {
    RELOAD_HANDLE.get_or_init(|| Arc::new(RwLock::new(None)))
}

/// Store the reload handle for later use (type-erased)
pub fn set_reload_fn<F>(reload_fn: F)
where
    F: Fn(&str) + Send + Sync + 'static,
{
    if let Ok(mut handle) = get_reload_handle().write() {
        *handle = Some(Box::new(reload_fn));
    }
}

/// Update the tracing log level at runtime
pub fn update_tracing_level(level: &str) {
    if let Ok(handle) = get_reload_handle().read() {
        if let Some(ref reload_fn) = *handle {
            reload_fn(level);
        }
    }
}

/// Install the global subscriber: reloadable EnvFilter, fmt output and capture.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::reload;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let (filter, reload_handle) = reload::Layer::new(env_filter);

    set_reload_fn(move |level: &str| {
        let new_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("error"));
        if let Err(e) = reload_handle.reload(new_filter) {
            eprintln!("Failed to reload log filter: {}", e);
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(LogCaptureLayer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_capture_layer_records_message() {
        let subscriber = tracing_subscriber::registry().with(LogCaptureLayer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("capture-check {}", 7);
        });
        assert!(recent_logs()
            .iter()
            .any(|line| line.contains("WARN") && line.contains("capture-check 7")));
    }
}
