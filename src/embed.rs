//! Per-embed lifecycle controller.
//!
//! Owns one widget from attach to destroy: placeholder styling, the wait for
//! the platform api, player construction with playlist-vs-single semantics,
//! the debounced resize watcher and the conditional event bridge. All work
//! that outlives `attach` runs in spawned tasks that `destroy` aborts, the
//! same take-and-abort teardown the rest of the crate uses.

use anyhow::{Context, Result};
use futures::StreamExt;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::events::EventBus;
use crate::loader::ApiLoader;
use crate::options::{EmbedOptions, SizeMode, VideoReference};
use crate::platform::{
  ContainerHandle, HostPage, PlaceholderStyle, PlayerEvent, PlayerEventKind, PlayerHandle, PlayerInit, PlayerPlatform,
  PlayerState,
};
use crate::sizing::{self, SizeResult};

/// Where one embed instance is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
  /// Constructed, not yet attached.
  Uninitialized,
  /// Terminal: attached outside a browser document. Placeholder styling only,
  /// no api request, no player, ever.
  Inert,
  /// Attached, waiting for the platform api latch.
  AwaitingApi,
  /// Live player exists.
  PlayerCreated,
  /// Terminal: torn down. Never re-entered.
  Destroyed,
}

/// State shared between the controller handle and its spawned tasks.
struct EmbedShared {
  state: LifecycleState,
  video: VideoReference,
  player: Option<Arc<dyn PlayerHandle>>,
  placeholder_applied: bool,
  resize_task: Option<JoinHandle<()>>,
  forward_task: Option<JoinHandle<()>>,
}

pub struct EmbedController {
  loader: Arc<ApiLoader>,
  page: Arc<dyn HostPage>,
  container: Arc<dyn ContainerHandle>,
  platform: Arc<dyn PlayerPlatform>,
  options: EmbedOptions,
  events: Arc<EventBus>,
  shared: Arc<StdMutex<EmbedShared>>,
  init_task: Option<JoinHandle<()>>,
}

impl EmbedController {
  pub fn new(
    loader: Arc<ApiLoader>,
    page: Arc<dyn HostPage>,
    container: Arc<dyn ContainerHandle>,
    platform: Arc<dyn PlayerPlatform>,
    options: EmbedOptions,
    video: VideoReference,
  ) -> Self {
    Self {
      loader,
      page,
      container,
      platform,
      options,
      events: Arc::new(EventBus::new()),
      shared: Arc::new(StdMutex::new(EmbedShared {
        state: LifecycleState::Uninitialized,
        video,
        player: None,
        placeholder_applied: false,
        resize_task: None,
        forward_task: None,
      })),
      init_task: None,
    }
  }

  pub fn lifecycle_state(&self) -> LifecycleState {
    self.shared.lock().expect("embed state mutex poisoned").state
  }

  pub fn video(&self) -> VideoReference {
    self.shared.lock().expect("embed state mutex poisoned").video.clone()
  }

  /// Open a host-facing receiver for one proxied event kind.
  ///
  /// Subscribe before `attach`: listener attachment on the player is decided
  /// at creation time from the subscriber counts then in effect.
  pub fn subscribe(&self, kind: PlayerEventKind) -> broadcast::Receiver<PlayerEvent> {
    self.events.subscribe(kind)
  }

  /// Mount the embed: placeholder styling, then either the terminal inert
  /// state (non-browser) or the api request and the wait for readiness.
  pub fn attach(&mut self) -> Result<()> {
    {
      let shared = self.shared.lock().expect("embed state mutex poisoned");
      if shared.state != LifecycleState::Uninitialized {
        warn!(state = ?shared.state, "embed: attach on already-attached instance, ignoring");
        return Ok(());
      }
    }

    // Placeholder styling goes in before any state transition so prerendered
    // output already reserves space and shows the thumbnail.
    self.apply_placeholder().context("failed to apply placeholder styling")?;

    if !self.page.is_browser() {
      info!("embed: non-browser context, staying inert");
      self.shared.lock().expect("embed state mutex poisoned").state = LifecycleState::Inert;
      return Ok(());
    }

    let anchor_id = self.loader.request_load(self.container.as_ref()).context("failed to request platform api")?;
    debug!(anchor_id = %anchor_id, "embed: awaiting platform api");
    self.shared.lock().expect("embed state mutex poisoned").state = LifecycleState::AwaitingApi;

    let loader = Arc::clone(&self.loader);
    let page = Arc::clone(&self.page);
    let container = Arc::clone(&self.container);
    let platform = Arc::clone(&self.platform);
    let options = self.options.clone();
    let events = Arc::clone(&self.events);
    let shared = Arc::clone(&self.shared);
    self.init_task = Some(tokio::spawn(async move {
      loader.ready().await;
      create_player(&page, &container, &platform, &options, &events, &shared, anchor_id);
    }));

    Ok(())
  }

  /// Point the embed at a new video or playlist.
  ///
  /// With a live player, a player currently reporting `Playing` gets an
  /// immediate load (replaces playback now); every other state gets a cue
  /// (prepared, not auto-started). Without a player the reference is only
  /// stored and used at creation time.
  pub fn set_video(&self, video: VideoReference) {
    let player = {
      let mut shared = self.shared.lock().expect("embed state mutex poisoned");
      shared.video = video.clone();
      shared.player.clone()
    };
    let Some(player) = player else { return };

    let playing = player.player_state() == PlayerState::Playing;
    match (&video, playing) {
      (VideoReference::Single(id), true) => {
        debug!(id = %id, "embed: loading new video over live playback");
        player.load_video(id);
      }
      (VideoReference::Single(id), false) => {
        debug!(id = %id, "embed: cueing new video");
        player.cue_video(id);
      }
      (VideoReference::Playlist(ids), true) => {
        debug!(count = ids.len(), "embed: loading new playlist over live playback");
        player.load_playlist(ids);
      }
      (VideoReference::Playlist(ids), false) => {
        debug!(count = ids.len(), "embed: cueing new playlist");
        player.cue_playlist(ids);
      }
    }
  }

  /// Tear the embed down. Safe from any state and idempotent: destroying
  /// before a player ever existed does nothing player-related, repeated
  /// destroys are no-ops.
  pub fn destroy(&mut self) {
    if let Some(task) = self.init_task.take() {
      task.abort();
    }

    let (prior, player, resize_task, forward_task) = {
      let mut shared = self.shared.lock().expect("embed state mutex poisoned");
      if shared.state == LifecycleState::Destroyed {
        return;
      }
      let prior = shared.state;
      shared.state = LifecycleState::Destroyed;
      (prior, shared.player.take(), shared.resize_task.take(), shared.forward_task.take())
    };

    // Aborting the watcher also cancels any pending debounce timer.
    if let Some(task) = resize_task {
      task.abort();
    }
    if let Some(task) = forward_task {
      task.abort();
    }
    if let Some(player) = player {
      player.destroy();
    }
    info!(from = ?prior, "embed: destroyed");
  }

  fn apply_placeholder(&self) -> Result<()> {
    let mut style = PlaceholderStyle::default();

    if self.options.size_mode() == SizeMode::Responsive {
      // reserve proportional layout space so the page doesn't jump on mount
      style.padding_top_pct = Some(100.0 * self.options.aspect_ratio);
    }
    if let Some(variant) = self.options.thumbnail {
      let shared = self.shared.lock().expect("embed state mutex poisoned");
      if let Some(id) = shared.video.first_id() {
        style.background_image_url = Some(variant.url_for(id));
      }
    }

    if style == PlaceholderStyle::default() {
      return Ok(());
    }
    self.container.apply_placeholder(&style)?;
    self.shared.lock().expect("embed state mutex poisoned").placeholder_applied = true;
    Ok(())
  }
}

impl Drop for EmbedController {
  fn drop(&mut self) {
    self.destroy();
  }
}

/// Current responsive size: container width at the configured ratio, capped
/// by the container's current height, clamped to the viewport in a browser.
fn current_size(page: &Arc<dyn HostPage>, container: &Arc<dyn ContainerHandle>, options: &EmbedOptions) -> SizeResult {
  let container_box = container.size();
  let viewport = page.is_browser().then(|| page.viewport());
  sizing::compute(container_box, viewport, container_box.height, options.aspect_ratio)
}

/// `AwaitingApi → PlayerCreated`: build the player and wire everything up.
/// Runs inside the init task once the readiness latch fires. Holds the shared
/// lock for the whole transition so a concurrent destroy either wins outright
/// (nothing is created) or waits until the player is registered for teardown.
fn create_player(
  page: &Arc<dyn HostPage>,
  container: &Arc<dyn ContainerHandle>,
  platform: &Arc<dyn PlayerPlatform>,
  options: &EmbedOptions,
  events: &Arc<EventBus>,
  shared: &Arc<StdMutex<EmbedShared>>,
  anchor_id: String,
) {
  let mut guard = shared.lock().expect("embed state mutex poisoned");
  if guard.state != LifecycleState::AwaitingApi {
    debug!(state = ?guard.state, "embed: no longer awaiting api, skipping player creation");
    return;
  }

  let size = match options.size_mode() {
    SizeMode::Fixed(width, height) => SizeResult { width, height },
    SizeMode::Responsive => current_size(page, container, options),
  };

  let mut player_vars = options.player_vars.clone();
  let video_id = match &guard.video {
    VideoReference::Single(id) => Some(id.clone()),
    VideoReference::Playlist(_) => {
      // playlist mode: the platform expects its list-type player variable
      // and no single video id; the ids are cued/loaded on ready
      if !player_vars.is_object() {
        player_vars = serde_json::Value::Object(serde_json::Map::new());
      }
      player_vars["listType"] = serde_json::Value::String("player".to_string());
      None
    }
  };

  let player = platform.create_player(PlayerInit {
    anchor_id: anchor_id.clone(),
    width: size.width,
    height: size.height,
    video_id,
    player_vars,
    host: options.host.clone(),
  });
  info!(anchor_id = %anchor_id, width = size.width, height = size.height, "embed: player created");

  // Bridge only the event kinds somebody observes. `ready` is special: the
  // controller itself needs it to clear the placeholder and to issue the
  // initial playlist cue/load, independent of host interest.
  let (event_tx, event_rx) = mpsc::unbounded_channel();
  let wants_ready = guard.video.is_playlist()
    || guard.placeholder_applied
    || events.subscriber_count(PlayerEventKind::Ready) > 0;
  if wants_ready {
    player.listen(PlayerEventKind::Ready, event_tx.clone());
  }
  for kind in [
    PlayerEventKind::StateChange,
    PlayerEventKind::PlaybackQualityChange,
    PlayerEventKind::PlaybackRateChange,
    PlayerEventKind::Error,
    PlayerEventKind::ApiChange,
  ] {
    if events.subscriber_count(kind) > 0 {
      player.listen(kind, event_tx.clone());
    }
  }
  drop(event_tx);

  guard.forward_task = Some(tokio::spawn(forward_events(
    event_rx,
    Arc::clone(container),
    options.clone(),
    Arc::clone(events),
    Arc::clone(shared),
  )));

  if options.size_mode() == SizeMode::Responsive {
    guard.resize_task = Some(tokio::spawn(watch_resize(
      Arc::clone(page),
      Arc::clone(container),
      options.clone(),
      Arc::clone(shared),
    )));
  }

  guard.player = Some(player);
  guard.state = LifecycleState::PlayerCreated;
}

/// Debounced resize watcher: coalesce each burst of container box changes
/// into one recomputation after the quiet window, then resize the live
/// player. Aborted wholesale at destroy.
async fn watch_resize(
  page: Arc<dyn HostPage>,
  container: Arc<dyn ContainerHandle>,
  options: EmbedOptions,
  shared: Arc<StdMutex<EmbedShared>>,
) {
  let mut resize_events = container.resize_events();
  let window = options.debounce();

  'outer: while resize_events.next().await.is_some() {
    // every further trigger inside the window restarts it
    loop {
      tokio::select! {
        () = tokio::time::sleep(window) => break,
        next = resize_events.next() => {
          if next.is_none() {
            break 'outer;
          }
        }
      }
    }

    let size = current_size(&page, &container, &options);
    let player = shared.lock().expect("embed state mutex poisoned").player.clone();
    if let Some(player) = player {
      debug!(width = size.width, height = size.height, "resize: applying recomputed size");
      player.set_size(size.width, size.height);
    }
  }
  debug!("resize: container event stream ended");
}

/// Drain player callbacks onto the crate's scheduler and re-emit them on the
/// host-facing channels, handling the controller's own `ready` duties first.
async fn forward_events(
  mut event_rx: mpsc::UnboundedReceiver<PlayerEvent>,
  container: Arc<dyn ContainerHandle>,
  options: EmbedOptions,
  events: Arc<EventBus>,
  shared: Arc<StdMutex<EmbedShared>>,
) {
  while let Some(event) = event_rx.recv().await {
    if event.kind == PlayerEventKind::Ready {
      handle_ready(&container, &options, &shared);
    }
    events.emit(event);
  }
}

/// The live frame renders its own content from here on: drop the placeholder
/// styling, and in playlist mode issue the initial cue (or load, when the
/// opaque bag asks for autoplay).
fn handle_ready(container: &Arc<dyn ContainerHandle>, options: &EmbedOptions, shared: &Arc<StdMutex<EmbedShared>>) {
  let (player, playlist, clear_placeholder) = {
    let mut shared = shared.lock().expect("embed state mutex poisoned");
    let clear_placeholder = shared.placeholder_applied;
    shared.placeholder_applied = false;
    let playlist = match &shared.video {
      VideoReference::Playlist(ids) => Some(ids.clone()),
      VideoReference::Single(_) => None,
    };
    (shared.player.clone(), playlist, clear_placeholder)
  };

  if clear_placeholder
    && let Err(err) = container.clear_placeholder()
  {
    warn!(err = %err, "embed: failed to clear placeholder styling");
  }

  if let (Some(player), Some(ids)) = (player, playlist) {
    if options.autoplay_requested() {
      info!(count = ids.len(), "embed: loading playlist on ready");
      player.load_playlist(&ids);
    } else {
      info!(count = ids.len(), "embed: cueing playlist on ready");
      player.cue_playlist(&ids);
    }
  }
}
