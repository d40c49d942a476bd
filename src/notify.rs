//! User-facing notification port.
//!
//! Every failed request and every blocked navigation produces exactly one
//! `notify_error` call. UI layers plug in their toast/banner implementation;
//! headless callers use `TracingNotifier`.

/// Capability to surface an error message to the user.
pub trait Notifier: Send + Sync {
    fn notify_error(&self, message: &str);
}

/// Emits notifications as `warn` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_error(&self, message: &str) {
        tracing::warn!(target: "authgate::notify", %message, "user notification");
    }
}
