//! OS-reported link state, turned into up/down transition events.

use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// How often the OS link state is re-read
pub const LINK_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
  Up,
  Down,
}

/// Source of the OS view of network link state
pub trait LinkStatus: Send + Sync + 'static {
  fn is_up(&self) -> bool;
}

/// Link state as reported by the operating system.
///
/// On Linux this reads `/sys/class/net`. Elsewhere the link is assumed up
/// and the connectivity probe alone decides.
pub struct SystemLink;

impl LinkStatus for SystemLink {
  fn is_up(&self) -> bool {
    #[cfg(target_os = "linux")]
    {
      sysfs_link_up(Path::new("/sys/class/net")).unwrap_or(true)
    }
    #[cfg(not(target_os = "linux"))]
    {
      true
    }
  }
}

/// Any non-loopback interface whose operstate is up (or unknown, which tun
/// devices report while passing traffic) counts as a link.
///
/// Returns `None` when no interface could be read at all.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn sysfs_link_up(root: &Path) -> Option<bool> {
  let entries = std::fs::read_dir(root).ok()?;
  let mut seen = false;

  for entry in entries.flatten() {
    if entry.file_name() == "lo" {
      continue;
    }
    let Ok(state) = std::fs::read_to_string(entry.path().join("operstate")) else {
      continue;
    };
    seen = true;
    if matches!(state.trim(), "up" | "unknown") {
      return Some(true);
    }
  }

  seen.then_some(false)
}

/// Read the current link state and watch it for transitions.
///
/// The watcher stops once the returned receiver is dropped.
pub fn watch_link<L: LinkStatus>(
  link: L,
  poll_interval: Duration,
) -> (bool, mpsc::UnboundedReceiver<LinkEvent>) {
  let initial = link.is_up();
  let (tx, rx) = mpsc::unbounded_channel();

  tokio::spawn(async move {
    let mut last = initial;
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.tick().await;

    loop {
      ticker.tick().await;
      let up = link.is_up();
      if up == last {
        continue;
      }
      last = up;
      debug!(up, "link state changed");
      let event = if up { LinkEvent::Up } else { LinkEvent::Down };
      if tx.send(event).is_err() {
        break;
      }
    }
  });

  (initial, rx)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::Arc;

  fn fake_iface(root: &Path, name: &str, state: &str) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("operstate"), format!("{}\n", state)).unwrap();
  }

  #[test]
  fn test_sysfs_up_interface() {
    let root = tempfile::tempdir().unwrap();
    fake_iface(root.path(), "lo", "unknown");
    fake_iface(root.path(), "eth0", "up");
    assert_eq!(sysfs_link_up(root.path()), Some(true));
  }

  #[test]
  fn test_sysfs_only_loopback_up() {
    let root = tempfile::tempdir().unwrap();
    fake_iface(root.path(), "lo", "unknown");
    fake_iface(root.path(), "eth0", "down");
    assert_eq!(sysfs_link_up(root.path()), Some(false));
  }

  #[test]
  fn test_sysfs_unreadable() {
    assert_eq!(sysfs_link_up(Path::new("/nonexistent/sys/class/net")), None);
  }

  struct Toggle(Arc<AtomicBool>);

  impl LinkStatus for Toggle {
    fn is_up(&self) -> bool {
      self.0.load(Ordering::SeqCst)
    }
  }

  #[tokio::test(start_paused = true)]
  async fn test_watch_link_emits_transitions() {
    let up = Arc::new(AtomicBool::new(true));
    let (initial, mut events) = watch_link(Toggle(up.clone()), Duration::from_secs(1));
    assert!(initial);

    up.store(false, Ordering::SeqCst);
    assert_eq!(events.recv().await, Some(LinkEvent::Down));

    up.store(true, Ordering::SeqCst);
    assert_eq!(events.recv().await, Some(LinkEvent::Up));
  }
}
