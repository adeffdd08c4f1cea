//! Per-embed configuration and the video reference.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::time::Duration;

use crate::constants::constants;
use crate::resolver::{resolve_video_id, resolve_video_ids};

/// One side of the requested player box: a fixed pixel value or `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
  #[default]
  Auto,
  Px(f64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DimensionRepr {
  Number(f64),
  Text(String),
}

impl<'de> Deserialize<'de> for Dimension {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    match DimensionRepr::deserialize(deserializer)? {
      DimensionRepr::Number(px) => Ok(Dimension::Px(px)),
      DimensionRepr::Text(s) if s == "auto" => Ok(Dimension::Auto),
      DimensionRepr::Text(s) => Err(serde::de::Error::custom(format!("expected \"auto\" or a number, got {s:?}"))),
    }
  }
}

/// Thumbnail filename variants served by the platform's image host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailVariant {
  Default,
  MqDefault,
  HqDefault,
  SdDefault,
  MaxResDefault,
}

impl ThumbnailVariant {
  pub fn file_name(self) -> &'static str {
    match self {
      ThumbnailVariant::Default => "default.jpg",
      ThumbnailVariant::MqDefault => "mqdefault.jpg",
      ThumbnailVariant::HqDefault => "hqdefault.jpg",
      ThumbnailVariant::SdDefault => "sddefault.jpg",
      ThumbnailVariant::MaxResDefault => "maxresdefault.jpg",
    }
  }

  /// Full image URL for the given video id.
  pub fn url_for(self, video_id: &str) -> String {
    format!("{}/{}/{}", constants().thumbnail_base_url, video_id, self.file_name())
  }
}

/// How the player box is sized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeMode {
  /// Both dimensions explicit: used verbatim, no resize tracking.
  Fixed(f64, f64),
  /// Sized from the container; a debounced resize watcher keeps it current.
  Responsive,
}

/// Immutable per-instance embed configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbedOptions {
  pub width: Dimension,
  pub height: Dimension,
  /// Height per unit width used by responsive sizing.
  pub aspect_ratio: f64,
  /// Quiet window for coalescing resize bursts.
  pub resize_debounce_ms: u64,
  /// Base-URL override passed through to the platform.
  pub host: Option<String>,
  /// Placeholder background shown before the player exists.
  pub thumbnail: Option<ThumbnailVariant>,
  /// Opaque bag forwarded verbatim to the platform.
  pub player_vars: Value,
}

impl Default for EmbedOptions {
  fn default() -> Self {
    let c = constants();
    Self {
      width: Dimension::Auto,
      height: Dimension::Auto,
      aspect_ratio: c.default_aspect_ratio,
      resize_debounce_ms: c.default_resize_debounce_ms,
      host: None,
      thumbnail: None,
      player_vars: Value::Null,
    }
  }
}

impl EmbedOptions {
  /// Fixed only when both sides are explicit numbers; any `auto` side makes
  /// the whole box responsive.
  pub fn size_mode(&self) -> SizeMode {
    match (self.width, self.height) {
      (Dimension::Px(width), Dimension::Px(height)) => SizeMode::Fixed(width, height),
      _ => SizeMode::Responsive,
    }
  }

  pub fn debounce(&self) -> Duration {
    Duration::from_millis(self.resize_debounce_ms)
  }

  /// Whether the opaque bag requests autoplay. Follows the platform's loose
  /// truthiness: boolean `true`, any non-zero number, or a non-empty string
  /// other than `"0"`.
  pub(crate) fn autoplay_requested(&self) -> bool {
    match self.player_vars.get("autoplay") {
      Some(Value::Bool(flag)) => *flag,
      Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
      Some(Value::String(s)) => !s.is_empty() && s != "0",
      _ => false,
    }
  }
}

/// What the embed plays: one identifier, or an ordered playlist of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoReference {
  Single(String),
  Playlist(Vec<String>),
}

impl VideoReference {
  /// Resolve a single video URL. An unresolvable URL yields an empty id.
  pub fn from_url(url: &str) -> Self {
    VideoReference::Single(resolve_video_id(url))
  }

  /// Resolve a sequence of URLs element-wise, preserving order and length.
  pub fn from_urls(urls: &[String]) -> Self {
    VideoReference::Playlist(resolve_video_ids(urls))
  }

  pub fn is_playlist(&self) -> bool {
    matches!(self, VideoReference::Playlist(_))
  }

  /// First non-empty identifier, used to key the thumbnail placeholder.
  pub fn first_id(&self) -> Option<&str> {
    match self {
      VideoReference::Single(id) => (!id.is_empty()).then_some(id.as_str()),
      VideoReference::Playlist(ids) => ids.iter().map(String::as_str).find(|id| !id.is_empty()),
    }
  }
}
