//! Lifecycle management for embedded YouTube players.
//!
//! The crate covers the part of hosting a third-party player that is easy to
//! get wrong: injecting the platform's bootstrap script exactly once per
//! process, telling every embed exactly once when the api becomes usable,
//! sizing each player from its container and viewport, coalescing resize
//! bursts, bridging the player's event set to the host only where observed,
//! and tearing all of it down safely in any order.
//!
//! The host supplies its document, container and player plumbing through the
//! capability traits in [`platform`]; the crate itself never touches a DOM.
//!
//! ```ignore
//! use std::sync::Arc;
//! use yt_embed::{ApiLoader, EmbedController, EmbedOptions, VideoReference};
//!
//! let loader = Arc::new(ApiLoader::new(page.clone()));
//! let mut embed = EmbedController::new(
//!   loader,
//!   page,
//!   container,
//!   platform,
//!   EmbedOptions::default(),
//!   VideoReference::from_url("https://youtu.be/dQw4w9WgXcQ"),
//! );
//! embed.attach()?;
//! // …
//! embed.destroy();
//! ```

mod constants;
pub mod embed;
pub mod events;
pub mod loader;
pub mod options;
pub mod platform;
pub mod resolver;
pub mod sizing;

#[cfg(test)]
pub(crate) mod fakes;

pub use embed::{EmbedController, LifecycleState};
pub use events::EventBus;
pub use loader::{ApiLoadState, ApiLoader};
pub use options::{Dimension, EmbedOptions, SizeMode, ThumbnailVariant, VideoReference};
pub use platform::{
  BoxSize, ContainerHandle, HostPage, PlaceholderStyle, PlayerEvent, PlayerEventKind, PlayerHandle, PlayerInit,
  PlayerPlatform, PlayerState, ReadyHook,
};
pub use sizing::SizeResult;
