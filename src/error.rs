//! Error types used by the emitter.
//!
//! Emitter operations report outcomes as `bool`. The only fallible surface is
//! awaiting an interval replay started by
//! [`BufferedEmitter::resume`](crate::BufferedEmitter::resume), which fails with
//! [`ReplayError`] when the background replay did not run to completion.
//!
//! The type provides helper methods (`as_label`, `as_message`) for logging.

use thiserror::Error;

/// # Errors produced by an interval replay.
///
/// Replayed emissions that were already delivered stay delivered; the
/// remaining queued entries are lost.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ReplayError {
    /// The replay task was aborted before every entry was re-emitted.
    #[error("replay aborted before completion")]
    Aborted,

    /// A panic escaped the replay task.
    #[error("replay task panicked: {reason}")]
    Panicked {
        /// Panic payload rendered as text, when it was a string.
        reason: String,
    },
}

impl ReplayError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use bufferbus::ReplayError;
    ///
    /// assert_eq!(ReplayError::Aborted.as_label(), "replay_aborted");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ReplayError::Aborted => "replay_aborted",
            ReplayError::Panicked { .. } => "replay_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ReplayError::Aborted => "aborted".to_string(),
            ReplayError::Panicked { reason } => format!("panicked: {reason}"),
        }
    }

    /// Indicates whether the replay was stopped on purpose.
    ///
    /// # Example
    /// ```
    /// use bufferbus::ReplayError;
    ///
    /// assert!(ReplayError::Aborted.is_aborted());
    /// assert!(!ReplayError::Panicked { reason: "boom".into() }.is_aborted());
    /// ```
    pub fn is_aborted(&self) -> bool {
        matches!(self, ReplayError::Aborted)
    }
}

impl From<tokio::task::JoinError> for ReplayError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            return ReplayError::Aborted;
        }
        let reason = match err.try_into_panic() {
            Ok(payload) => panic_message(payload.as_ref()),
            Err(other) => other.to_string(),
        };
        ReplayError::Panicked { reason }
    }
}

/// Renders a panic payload (`&str` or `String`) as text.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_and_messages() {
        let err = ReplayError::Panicked {
            reason: "listener blew up".into(),
        };
        assert_eq!(err.as_label(), "replay_panicked");
        assert_eq!(err.as_message(), "panicked: listener blew up");
        assert_eq!(err.to_string(), "replay task panicked: listener blew up");
    }

    #[test]
    fn test_panic_message_downcasts() {
        let s: Box<dyn std::any::Any + Send> = Box::new("static");
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(s.as_ref()), "static");
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }

    #[tokio::test]
    async fn test_from_join_error_aborted() {
        let handle = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        });
        handle.abort();
        let err = ReplayError::from(handle.await.unwrap_err());
        assert!(err.is_aborted());
    }

    #[tokio::test]
    async fn test_from_join_error_panicked() {
        let handle = tokio::spawn(async { panic!("replay boom") });
        let err = ReplayError::from(handle.await.unwrap_err());
        assert_eq!(err.as_message(), "panicked: replay boom");
    }
}
