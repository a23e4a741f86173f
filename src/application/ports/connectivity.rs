use tokio::sync::watch;

/// Injected connectivity signal.
///
/// The core never detects connectivity itself; the host app owns whatever
/// mechanism produces the boolean and feeds it in. The engine reads the
/// level before each send and the host forwards the rising edge to
/// `SyncEngine::handle_online`.
pub trait ConnectivityMonitor: Send + Sync {
    fn is_online(&self) -> bool;

    /// Receiver that observes every online/offline transition.
    fn subscribe(&self) -> watch::Receiver<bool>;
}
