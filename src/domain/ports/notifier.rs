/// Sink for successful resolutions.
///
/// Called from the service event loop right after a name is written to the
/// cache, so implementations must not block.
pub trait Notifier: Send + Sync {
    fn on_resolved(&self, handle: &str, name: &str);
}

/// A notifier that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn on_resolved(&self, _handle: &str, _name: &str) {}
}
