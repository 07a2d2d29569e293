//! Shared utility macros for farm-server

/// Security event logging with a dedicated `security` target, so auth
/// events can be filtered into their own sink.
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
