//! Host-facing output channels for proxied player events.
//!
//! One multicast channel per event kind. The bus exposes the live receiver
//! count so the controller can skip attaching platform listeners for kinds
//! nobody observes, keeping bridging volume proportional to actual interest.

use tokio::sync::broadcast;

use crate::constants::constants;
use crate::platform::{PlayerEvent, PlayerEventKind};

pub struct EventBus {
  channels: [broadcast::Sender<PlayerEvent>; PlayerEventKind::ALL.len()],
}

impl EventBus {
  pub fn new() -> Self {
    let capacity = constants().event_channel_capacity;
    Self { channels: std::array::from_fn(|_| broadcast::channel(capacity).0) }
  }

  /// Open a receiver for one event kind. Dropping the receiver unsubscribes.
  pub fn subscribe(&self, kind: PlayerEventKind) -> broadcast::Receiver<PlayerEvent> {
    self.channels[kind as usize].subscribe()
  }

  /// Live number of open receivers for one event kind.
  pub fn subscriber_count(&self, kind: PlayerEventKind) -> usize {
    self.channels[kind as usize].receiver_count()
  }

  /// Multicast an event to every current subscriber of its kind. Events with
  /// no subscribers are dropped silently.
  pub fn emit(&self, event: PlayerEvent) {
    let _ = self.channels[event.kind as usize].send(event);
  }
}

impl Default for EventBus {
  fn default() -> Self {
    Self::new()
  }
}
