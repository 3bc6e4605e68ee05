use std::fmt;
use std::time::Duration;

/// Renders the error as a `tracing` field value, with its source chain
/// available to the subscriber.
#[must_use]
pub fn tracing_err<'a, E: std::error::Error + 'static>(err: &'a E) -> impl tracing::Value + 'a {
    err as &dyn std::error::Error
}

/// Human-readable duration field value (`1.52s`, `340.11ms`).
pub(crate) fn tracing_duration(duration: Duration) -> impl tracing::Value {
    tracing::field::display(DurationDisplay(duration))
}

struct DurationDisplay(Duration);

impl fmt::Display for DurationDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2?}", self.0)
    }
}
