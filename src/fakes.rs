//! In-memory implementations of the boundary traits, recording every call so
//! tests can assert on injection counts, anchor assignment, placeholder
//! styling, player construction and listener attachment.

use anyhow::Result;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::mpsc;

use crate::platform::{
  BoxSize, ContainerHandle, HostPage, PlaceholderStyle, PlayerEvent, PlayerEventKind, PlayerHandle, PlayerInit,
  PlayerPlatform, PlayerState, ReadyHook,
};

pub(crate) struct FakePage {
  browser: bool,
  viewport: StdMutex<BoxSize>,
  injected: StdMutex<Vec<String>>,
  hook: StdMutex<Option<ReadyHook>>,
}

impl FakePage {
  pub fn browser() -> Arc<Self> {
    Arc::new(Self {
      browser: true,
      viewport: StdMutex::new(BoxSize { width: 1920.0, height: 1080.0 }),
      injected: StdMutex::new(Vec::new()),
      hook: StdMutex::new(None),
    })
  }

  /// A page without a real document (prerendering context).
  pub fn server() -> Arc<Self> {
    Arc::new(Self {
      browser: false,
      viewport: StdMutex::new(BoxSize { width: 0.0, height: 0.0 }),
      injected: StdMutex::new(Vec::new()),
      hook: StdMutex::new(None),
    })
  }

  pub fn set_viewport(&self, width: f64, height: f64) {
    *self.viewport.lock().expect("fake page mutex poisoned") = BoxSize { width, height };
  }

  pub fn injection_count(&self) -> usize {
    self.injected.lock().expect("fake page mutex poisoned").len()
  }

  pub fn has_ready_hook(&self) -> bool {
    self.hook.lock().expect("fake page mutex poisoned").is_some()
  }

  /// Invoke the installed ready hook, as the bootstrap script would.
  pub fn fire_ready(&self) {
    let hook = self.hook.lock().expect("fake page mutex poisoned").take();
    if let Some(hook) = hook {
      hook();
    }
  }
}

impl HostPage for FakePage {
  fn is_browser(&self) -> bool {
    self.browser
  }

  fn viewport(&self) -> BoxSize {
    *self.viewport.lock().expect("fake page mutex poisoned")
  }

  fn inject_bootstrap_script(&self, src: &str) -> Result<()> {
    self.injected.lock().expect("fake page mutex poisoned").push(src.to_string());
    Ok(())
  }

  fn install_ready_hook(&self, hook: ReadyHook) {
    *self.hook.lock().expect("fake page mutex poisoned") = Some(hook);
  }
}

pub(crate) struct FakeContainer {
  size: StdMutex<BoxSize>,
  anchor_ids: StdMutex<Vec<String>>,
  placeholder: StdMutex<Option<PlaceholderStyle>>,
  clear_count: StdMutex<usize>,
  resize_tx: StdMutex<Option<mpsc::UnboundedSender<()>>>,
}

impl FakeContainer {
  pub fn new(width: f64, height: f64) -> Arc<Self> {
    Arc::new(Self {
      size: StdMutex::new(BoxSize { width, height }),
      anchor_ids: StdMutex::new(Vec::new()),
      placeholder: StdMutex::new(None),
      clear_count: StdMutex::new(0),
      resize_tx: StdMutex::new(None),
    })
  }

  pub fn set_size(&self, width: f64, height: f64) {
    *self.size.lock().expect("fake container mutex poisoned") = BoxSize { width, height };
  }

  pub fn anchor_ids(&self) -> Vec<String> {
    self.anchor_ids.lock().expect("fake container mutex poisoned").clone()
  }

  pub fn placeholder(&self) -> Option<PlaceholderStyle> {
    self.placeholder.lock().expect("fake container mutex poisoned").clone()
  }

  pub fn clear_count(&self) -> usize {
    *self.clear_count.lock().expect("fake container mutex poisoned")
  }

  /// Emit one container box-change notification, as a resize observer would.
  pub fn trigger_resize(&self) {
    if let Some(tx) = self.resize_tx.lock().expect("fake container mutex poisoned").as_ref() {
      let _ = tx.send(());
    }
  }

  /// Drop the notification channel, ending the watcher's stream.
  pub fn end_resize_stream(&self) {
    self.resize_tx.lock().expect("fake container mutex poisoned").take();
  }

  /// Whether something called `resize_events` and still holds the stream.
  pub fn resize_watcher_attached(&self) -> bool {
    self.resize_tx.lock().expect("fake container mutex poisoned").is_some()
  }
}

impl ContainerHandle for FakeContainer {
  fn size(&self) -> BoxSize {
    *self.size.lock().expect("fake container mutex poisoned")
  }

  fn set_anchor_id(&self, id: &str) {
    self.anchor_ids.lock().expect("fake container mutex poisoned").push(id.to_string());
  }

  fn apply_placeholder(&self, style: &PlaceholderStyle) -> Result<()> {
    *self.placeholder.lock().expect("fake container mutex poisoned") = Some(style.clone());
    Ok(())
  }

  fn clear_placeholder(&self) -> Result<()> {
    *self.placeholder.lock().expect("fake container mutex poisoned") = None;
    *self.clear_count.lock().expect("fake container mutex poisoned") += 1;
    Ok(())
  }

  fn resize_events(&self) -> BoxStream<'static, ()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    *self.resize_tx.lock().expect("fake container mutex poisoned") = Some(tx);
    futures::stream::poll_fn(move |cx| rx.poll_recv(cx)).boxed()
  }
}

/// Calls recorded on a fake player, in order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlayerCall {
  SetSize(f64, f64),
  LoadVideo(String),
  CueVideo(String),
  LoadPlaylist(Vec<String>),
  CuePlaylist(Vec<String>),
  Destroy,
}

pub(crate) struct FakePlayer {
  pub init: PlayerInit,
  state: StdMutex<PlayerState>,
  calls: StdMutex<Vec<PlayerCall>>,
  listeners: StdMutex<Vec<(PlayerEventKind, mpsc::UnboundedSender<PlayerEvent>)>>,
}

impl FakePlayer {
  fn new(init: PlayerInit) -> Self {
    Self {
      init,
      state: StdMutex::new(PlayerState::Unstarted),
      calls: StdMutex::new(Vec::new()),
      listeners: StdMutex::new(Vec::new()),
    }
  }

  pub fn set_state(&self, state: PlayerState) {
    *self.state.lock().expect("fake player mutex poisoned") = state;
  }

  pub fn calls(&self) -> Vec<PlayerCall> {
    self.calls.lock().expect("fake player mutex poisoned").clone()
  }

  pub fn resize_calls(&self) -> Vec<(f64, f64)> {
    self
      .calls()
      .into_iter()
      .filter_map(|call| match call {
        PlayerCall::SetSize(width, height) => Some((width, height)),
        _ => None,
      })
      .collect()
  }

  pub fn listened_kinds(&self) -> Vec<PlayerEventKind> {
    self.listeners.lock().expect("fake player mutex poisoned").iter().map(|(kind, _)| *kind).collect()
  }

  /// Emit an event to the listeners attached for its kind, as the platform's
  /// callback machinery would.
  pub fn emit(&self, kind: PlayerEventKind, payload: serde_json::Value) {
    for (listened, tx) in self.listeners.lock().expect("fake player mutex poisoned").iter() {
      if *listened == kind {
        let _ = tx.send(PlayerEvent { kind, payload: payload.clone() });
      }
    }
  }
}

impl PlayerHandle for FakePlayer {
  fn set_size(&self, width: f64, height: f64) {
    self.calls.lock().expect("fake player mutex poisoned").push(PlayerCall::SetSize(width, height));
  }

  fn player_state(&self) -> PlayerState {
    *self.state.lock().expect("fake player mutex poisoned")
  }

  fn load_video(&self, id: &str) {
    self.calls.lock().expect("fake player mutex poisoned").push(PlayerCall::LoadVideo(id.to_string()));
  }

  fn cue_video(&self, id: &str) {
    self.calls.lock().expect("fake player mutex poisoned").push(PlayerCall::CueVideo(id.to_string()));
  }

  fn load_playlist(&self, ids: &[String]) {
    self.calls.lock().expect("fake player mutex poisoned").push(PlayerCall::LoadPlaylist(ids.to_vec()));
  }

  fn cue_playlist(&self, ids: &[String]) {
    self.calls.lock().expect("fake player mutex poisoned").push(PlayerCall::CuePlaylist(ids.to_vec()));
  }

  fn listen(&self, kind: PlayerEventKind, tx: mpsc::UnboundedSender<PlayerEvent>) {
    self.listeners.lock().expect("fake player mutex poisoned").push((kind, tx));
  }

  fn destroy(&self) {
    self.calls.lock().expect("fake player mutex poisoned").push(PlayerCall::Destroy);
  }
}

#[derive(Default)]
pub(crate) struct FakePlatform {
  created: StdMutex<Vec<Arc<FakePlayer>>>,
}

impl FakePlatform {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn created_count(&self) -> usize {
    self.created.lock().expect("fake platform mutex poisoned").len()
  }

  pub fn last_player(&self) -> Option<Arc<FakePlayer>> {
    self.created.lock().expect("fake platform mutex poisoned").last().cloned()
  }
}

impl PlayerPlatform for FakePlatform {
  fn create_player(&self, init: PlayerInit) -> Arc<dyn PlayerHandle> {
    let player = Arc::new(FakePlayer::new(init));
    self.created.lock().expect("fake platform mutex poisoned").push(Arc::clone(&player));
    player
  }
}
