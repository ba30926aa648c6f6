//! Online/offline tracking from OS link signals plus active probing.

mod link;
mod monitor;
mod probe;

pub use link::{watch_link, SystemLink, LINK_POLL_INTERVAL};
pub use monitor::{ConnectivityHandle, ConnectivityMonitor};
pub use probe::HttpProbe;

/// Anything that can say whether we currently believe we are online
pub trait OnlineSignal: Send + Sync {
  fn is_online(&self) -> bool;
}
