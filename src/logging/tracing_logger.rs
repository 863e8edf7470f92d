//! # TracingLogger: default logging hook
//!
//! Writes each record as a `tracing` event under the `bufferbus` target.
//! Payloads are rendered as JSON; a payload that fails to serialize is replaced
//! by a placeholder naming its type and the serializer error.
//!
//! ## Example output
//! ```text
//! DEBUG bufferbus: emitter kind="on" event="chat" data=listener@0x6000037c8010
//! DEBUG bufferbus: emitter kind="emit" event="chat" data=["hi","there"]
//! DEBUG bufferbus: emitter kind="off" event="chat" data=listener@0x6000037c8010
//! ```

use serde::Serialize;

use super::logger::{EmitLogger, LogDetail, LogRecord};
use crate::listeners::Delivery;

/// Logger that forwards records to `tracing` at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl TracingLogger {
    /// Construct a new [`TracingLogger`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Renders a delivery as JSON, or a placeholder if serialization fails.
pub fn render_payload<T: Serialize>(delivery: &Delivery<T>) -> String {
    serde_json::to_string(delivery).unwrap_or_else(|e| {
        format!(
            "<{} payload ({} item(s)) failed to serialize: {e}>",
            std::any::type_name::<T>(),
            delivery.len()
        )
    })
}

impl<T: Serialize> EmitLogger<T> for TracingLogger {
    fn log(&self, record: &LogRecord<'_, T>) {
        let data = match &record.detail {
            LogDetail::Listener(id) => id.to_string(),
            LogDetail::Delivery(delivery) => render_payload(delivery),
        };
        tracing::debug!(
            target: "bufferbus",
            kind = record.kind.as_label(),
            event = record.event,
            data = %data,
            "emitter"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::{Error as _, Serializer};

    struct Opaque;

    impl Serialize for Opaque {
        fn serialize<S: Serializer>(&self, _s: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("opaque handle"))
        }
    }

    #[test]
    fn test_render_json() {
        assert_eq!(render_payload(&Delivery::Single(3)), "3");
        assert_eq!(render_payload(&Delivery::Batch(vec!["a", "b"])), "[\"a\",\"b\"]");
    }

    #[test]
    fn test_render_falls_back_on_serialize_error() {
        let out = render_payload(&Delivery::Batch(vec![Opaque, Opaque]));
        assert!(out.starts_with('<'), "got {out}");
        assert!(out.contains("Opaque"), "got {out}");
        assert!(out.contains("2 item(s)"), "got {out}");
        assert!(out.contains("opaque handle"), "got {out}");
    }

    #[test]
    fn test_log_never_panics_on_bad_payload() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let delivery = Delivery::Single(Opaque);
        TracingLogger::new().log(&LogRecord {
            kind: crate::LogKind::Emit,
            event: "x",
            detail: LogDetail::Delivery(&delivery),
        });
    }
}
