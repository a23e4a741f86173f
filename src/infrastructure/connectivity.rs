use tokio::sync::watch;
use tracing::info;

use crate::application::ports::ConnectivityMonitor;

/// Connectivity flag shared between the platform shell and the sync engine.
///
/// The shell flips the flag from whatever reachability signal the platform
/// provides; the engine consults it before each send and subscribes to
/// react to reconnection.
pub struct SharedConnectivity {
    sender: watch::Sender<bool>,
}

impl SharedConnectivity {
    pub fn new(online: bool) -> Self {
        let (sender, _) = watch::channel(online);
        Self { sender }
    }

    pub fn set_online(&self, online: bool) {
        if *self.sender.borrow() != online {
            info!(online, "connectivity changed");
        }
        // send_replace never fails; the sender keeps its own receiver alive.
        self.sender.send_replace(online);
    }
}

impl ConnectivityMonitor for SharedConnectivity {
    fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}
