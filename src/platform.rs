//! Boundary capabilities the host must supply.
//!
//! The crate never touches a real document. Everything it needs from the
//! outside world (a page that can host a script element, a container with a
//! measurable box, the platform's player constructor and the live player's
//! operations) is expressed as a trait here. Hosts implement these against
//! their DOM layer; tests implement them in memory.

use anyhow::Result;
use futures::stream::BoxStream;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A measurable box: width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSize {
  pub width: f64,
  pub height: f64,
}

/// Playback state reported by the live player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
  Unstarted,
  Ended,
  Playing,
  Paused,
  Buffering,
  Cued,
}

impl PlayerState {
  /// Decode the platform's numeric state code. Unknown codes map to `Unstarted`.
  pub fn from_code(code: i32) -> Self {
    match code {
      0 => PlayerState::Ended,
      1 => PlayerState::Playing,
      2 => PlayerState::Paused,
      3 => PlayerState::Buffering,
      5 => PlayerState::Cued,
      _ => PlayerState::Unstarted,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      PlayerState::Unstarted => "unstarted",
      PlayerState::Ended => "ended",
      PlayerState::Playing => "playing",
      PlayerState::Paused => "paused",
      PlayerState::Buffering => "buffering",
      PlayerState::Cued => "cued",
    }
  }
}

/// The fixed set of event kinds proxied from the player to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerEventKind {
  Ready,
  StateChange,
  PlaybackQualityChange,
  PlaybackRateChange,
  Error,
  ApiChange,
}

impl PlayerEventKind {
  pub const ALL: [PlayerEventKind; 6] = [
    PlayerEventKind::Ready,
    PlayerEventKind::StateChange,
    PlayerEventKind::PlaybackQualityChange,
    PlayerEventKind::PlaybackRateChange,
    PlayerEventKind::Error,
    PlayerEventKind::ApiChange,
  ];

  pub fn label(self) -> &'static str {
    match self {
      PlayerEventKind::Ready => "ready",
      PlayerEventKind::StateChange => "stateChange",
      PlayerEventKind::PlaybackQualityChange => "playbackQualityChange",
      PlayerEventKind::PlaybackRateChange => "playbackRateChange",
      PlayerEventKind::Error => "error",
      PlayerEventKind::ApiChange => "apiChange",
    }
  }
}

/// An event observed on the live player, payload carried unmodified.
#[derive(Debug, Clone)]
pub struct PlayerEvent {
  pub kind: PlayerEventKind,
  pub payload: serde_json::Value,
}

/// Static styling applied to the container before the player exists.
///
/// `padding_top_pct` reserves layout space proportionally to the container
/// width so the page doesn't jump when the real frame mounts;
/// `background_image_url` is drawn cover-fit behind the reserved space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaceholderStyle {
  pub padding_top_pct: Option<f64>,
  pub background_image_url: Option<String>,
}

/// Everything the platform needs to construct a player.
#[derive(Debug, Clone)]
pub struct PlayerInit {
  /// Anchor element id assigned by the loader.
  pub anchor_id: String,
  pub width: f64,
  pub height: f64,
  /// Single-video id. `None` in playlist mode, where the ids are cued/loaded
  /// after the player reports ready.
  pub video_id: Option<String>,
  /// Opaque passthrough bag, forwarded verbatim (plus the list-type variable
  /// in playlist mode).
  pub player_vars: serde_json::Value,
  /// Optional base-URL override for the platform.
  pub host: Option<String>,
}

/// Callback slot the bootstrap script invokes when the platform api is usable.
pub type ReadyHook = Box<dyn FnOnce() + Send>;

/// The page hosting the embeds: execution context, viewport, script injection.
pub trait HostPage: Send + Sync {
  /// `false` when running outside a real browser document (e.g. prerendering).
  fn is_browser(&self) -> bool;

  /// Current viewport box. Only meaningful when `is_browser()`.
  fn viewport(&self) -> BoxSize;

  /// Insert the bootstrap script element immediately before the first
  /// existing script element in the document.
  fn inject_bootstrap_script(&self, src: &str) -> Result<()>;

  /// Install the process-global callback the bootstrap script invokes once
  /// its api becomes usable.
  fn install_ready_hook(&self, hook: ReadyHook);
}

/// The element an embed mounts into.
pub trait ContainerHandle: Send + Sync {
  /// Current offset box of the container.
  fn size(&self) -> BoxSize;

  /// Assign the anchor id the platform will replace with its frame.
  fn set_anchor_id(&self, id: &str);

  fn apply_placeholder(&self, style: &PlaceholderStyle) -> Result<()>;

  fn clear_placeholder(&self) -> Result<()>;

  /// Stream of container box-change notifications. The stream ending means
  /// the container stopped reporting; no further callbacks follow.
  fn resize_events(&self) -> BoxStream<'static, ()>;
}

/// Operations on a live player object.
pub trait PlayerHandle: Send + Sync {
  fn set_size(&self, width: f64, height: f64);

  fn player_state(&self) -> PlayerState;

  fn load_video(&self, id: &str);

  fn cue_video(&self, id: &str);

  fn load_playlist(&self, ids: &[String]);

  fn cue_playlist(&self, ids: &[String]);

  /// Attach a listener for one event kind. Observed events are pushed into
  /// `tx` from the platform's own callback context; the controller drains
  /// them onto its scheduler.
  fn listen(&self, kind: PlayerEventKind, tx: mpsc::UnboundedSender<PlayerEvent>);

  fn destroy(&self);
}

/// The external platform's player constructor.
pub trait PlayerPlatform: Send + Sync {
  fn create_player(&self, init: PlayerInit) -> Arc<dyn PlayerHandle>;
}
