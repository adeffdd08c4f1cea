//! Process-wide bootstrap loader for the external platform api.
//!
//! One `ApiLoader` is shared by every embed in the process (wrap it in an
//! `Arc`). The first browser-context `request_load` injects the platform's
//! bootstrap script and installs the global callback the script invokes once
//! its api is usable; every later call only hands out a fresh anchor id.
//! Readiness is a latch: it fires at most once per loader lifetime and late
//! subscribers observe it immediately.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::constants::constants;
use crate::platform::{ContainerHandle, HostPage};

/// Bootstrap progress. Monotonic within one loader lifetime; only the
/// testing reset winds it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiLoadState {
  NotRequested,
  Requested,
  Ready,
}

pub struct ApiLoader {
  page: Arc<dyn HostPage>,
  state: Arc<StdMutex<ApiLoadState>>,
  next_anchor: AtomicU64,
  ready_tx: watch::Sender<bool>,
}

impl ApiLoader {
  pub fn new(page: Arc<dyn HostPage>) -> Self {
    let (ready_tx, _) = watch::channel(false);
    Self {
      page,
      state: Arc::new(StdMutex::new(ApiLoadState::NotRequested)),
      next_anchor: AtomicU64::new(1),
      ready_tx,
    }
  }

  pub fn load_state(&self) -> ApiLoadState {
    *self.state.lock().expect("loader state mutex poisoned")
  }

  /// Assign a fresh process-unique anchor id to `container` and, on the very
  /// first browser-context call, inject the bootstrap script (immediately
  /// before the first existing script element) and install the ready hook.
  ///
  /// Outside a browser document this performs no DOM mutation at all; the
  /// returned id is unused and the latch can never fire.
  pub fn request_load(&self, container: &dyn ContainerHandle) -> Result<String> {
    let anchor_id = format!("{}{}", constants().anchor_id_prefix, self.next_anchor.fetch_add(1, Ordering::Relaxed));

    if !self.page.is_browser() {
      debug!(anchor_id = %anchor_id, "loader: non-browser context, skipping dom work");
      return Ok(anchor_id);
    }

    container.set_anchor_id(&anchor_id);

    // Check-and-set under the lock, with no await in between: two embeds
    // attaching in the same tick still produce exactly one injection.
    let first_request = {
      let mut state = self.state.lock().expect("loader state mutex poisoned");
      if *state == ApiLoadState::NotRequested {
        *state = ApiLoadState::Requested;
        true
      } else {
        false
      }
    };

    if first_request {
      let url = &constants().bootstrap_script_url;
      info!(url = %url, anchor_id = %anchor_id, "loader: injecting platform bootstrap script");
      self.page.inject_bootstrap_script(url).context("failed to inject platform bootstrap script")?;

      let state = Arc::clone(&self.state);
      let ready_tx = self.ready_tx.clone();
      self.page.install_ready_hook(Box::new(move || {
        *state.lock().expect("loader state mutex poisoned") = ApiLoadState::Ready;
        ready_tx.send_replace(true);
        info!("loader: platform api ready");
      }));
    } else {
      debug!(anchor_id = %anchor_id, "loader: script already requested, assigned anchor only");
    }

    Ok(anchor_id)
  }

  /// Resolves once the platform api has reported ready.
  ///
  /// Latched: subscribers arriving after the fact resolve immediately, and
  /// nobody observes the signal twice. If the bootstrap script never calls
  /// back (load failure, non-browser context) this stays pending forever;
  /// that is the contract, not an error.
  pub async fn ready(&self) {
    let mut ready_rx = self.ready_tx.subscribe();
    // wait_for checks the current value first, giving replay-one semantics.
    // The sender lives as long as `self`, so the channel cannot close here.
    let _ = ready_rx.wait_for(|ready| *ready).await;
  }

  /// Wind the loader back to its initial state and re-arm the latch.
  /// Intended for tests that need a fresh process-wide state.
  pub fn reset_for_testing(&self) {
    *self.state.lock().expect("loader state mutex poisoned") = ApiLoadState::NotRequested;
    self.ready_tx.send_replace(false);
    debug!("loader: reset to initial state");
  }
}
