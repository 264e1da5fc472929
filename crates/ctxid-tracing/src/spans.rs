//! Span builder helpers for correlation-aware instrumentation.

/// Create a span for work that outlives the request handler.
#[macro_export]
macro_rules! background_task_span {
    ($correlation_id:expr, $task:expr) => {
        tracing::info_span!(
            "background_task",
            correlation_id = %$correlation_id,
            task = %$task,
            duration_ms = tracing::field::Empty,
        )
    };
}
