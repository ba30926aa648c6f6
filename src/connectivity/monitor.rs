use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::link::LinkEvent;
use super::probe::Probe;
use super::OnlineSignal;

/// Best-effort "online" flag kept in sync with real connectivity.
///
/// - starts from the OS link state, then probes once right away
/// - re-probes every `interval` no matter what the OS says
/// - link up: probe before believing it
/// - link down: offline immediately, no probe
/// - a probe that outlives `probe_timeout` counts as failed
///
/// The background task stops when the monitor is dropped.
pub struct ConnectivityMonitor {
  state: watch::Receiver<bool>,
  probes: watch::Receiver<u64>,
  probe_requests: mpsc::UnboundedSender<()>,
  task: JoinHandle<()>,
}

impl ConnectivityMonitor {
  pub fn spawn<P: Probe + 'static>(
    probe: P,
    link_up: bool,
    link_events: mpsc::UnboundedReceiver<LinkEvent>,
    interval: Duration,
    probe_timeout: Duration,
  ) -> Self {
    let (state_tx, state) = watch::channel(link_up);
    let (probes_tx, probes) = watch::channel(0u64);
    let (probe_requests, requests_rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(run(
      Prober {
        probe,
        timeout: probe_timeout,
        state: state_tx,
        completed: probes_tx,
      },
      link_events,
      requests_rx,
      interval,
    ));

    Self {
      state,
      probes,
      probe_requests,
      task,
    }
  }

  pub fn is_online(&self) -> bool {
    *self.state.borrow()
  }

  /// Receiver that wakes on every online/offline transition
  pub fn subscribe(&self) -> watch::Receiver<bool> {
    self.state.clone()
  }

  /// Cheap read-only view for the reconciler
  pub fn handle(&self) -> ConnectivityHandle {
    ConnectivityHandle {
      state: self.state.clone(),
    }
  }

  /// Ask for an out-of-band probe
  pub fn probe_now(&self) {
    let _ = self.probe_requests.send(());
  }

  /// Resolve once the startup probe has corrected the OS-reported state
  pub async fn wait_for_first_probe(&self) {
    let mut probes = self.probes.clone();
    let _ = probes.wait_for(|completed| *completed >= 1).await;
  }
}

impl Drop for ConnectivityMonitor {
  fn drop(&mut self) {
    self.task.abort();
  }
}

/// Read-only connectivity view, re-read on every call
#[derive(Clone)]
pub struct ConnectivityHandle {
  state: watch::Receiver<bool>,
}

impl OnlineSignal for ConnectivityHandle {
  fn is_online(&self) -> bool {
    *self.state.borrow()
  }
}

struct Prober<P> {
  probe: P,
  timeout: Duration,
  state: watch::Sender<bool>,
  completed: watch::Sender<u64>,
}

impl<P: Probe> Prober<P> {
  async fn check(&self, cause: &'static str) {
    let ok = match time::timeout(self.timeout, self.probe.probe()).await {
      Ok(ok) => ok,
      Err(_) => {
        debug!(cause, timeout = ?self.timeout, "probe timed out");
        false
      }
    };
    self.publish(ok, cause);
    self.completed.send_modify(|n| *n += 1);
  }

  fn publish(&self, online: bool, cause: &'static str) {
    self.state.send_if_modified(|current| {
      if *current == online {
        return false;
      }
      info!(online, cause, "connectivity changed");
      *current = online;
      true
    });
  }
}

async fn run<P: Probe>(
  prober: Prober<P>,
  mut link_events: mpsc::UnboundedReceiver<LinkEvent>,
  mut probe_requests: mpsc::UnboundedReceiver<()>,
  interval: Duration,
) {
  prober.check("startup probe").await;

  let mut ticker = time::interval_at(Instant::now() + interval, interval);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  let mut link_open = true;

  loop {
    tokio::select! {
      _ = ticker.tick() => prober.check("periodic probe").await,
      event = link_events.recv(), if link_open => match event {
        Some(LinkEvent::Up) => {
          debug!("link reported up, probing");
          prober.check("link up").await;
        }
        Some(LinkEvent::Down) => prober.publish(false, "link down"),
        None => link_open = false,
      },
      request = probe_requests.recv() => match request {
        Some(()) => prober.check("manual probe").await,
        None => break,
      },
    }
  }
}
