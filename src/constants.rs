//! Crate constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available —
//! no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable crate constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // Platform bootstrap
  pub bootstrap_script_url: String,
  pub anchor_id_prefix: String,

  // Thumbnail placeholder
  pub thumbnail_base_url: String,

  // Responsive sizing
  pub default_aspect_ratio: f64,
  pub default_resize_debounce_ms: u64,

  // Event proxying
  pub event_channel_capacity: usize,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed crate constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
