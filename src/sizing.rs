//! Responsive size computation for an embedded player.
//!
//! Pure box math: fill the container width at the configured aspect ratio,
//! clamp to the container height, fall back to the full viewport when the
//! result would overflow the screen.

use crate::platform::BoxSize;

/// Concrete target dimensions. Both fields are always real numbers; the
/// `auto` sentinel never leaves the options layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeResult {
  pub width: f64,
  pub height: f64,
}

/// Compute the target player size.
///
/// - `container`: the container's current offset box; its width drives the size.
/// - `viewport`: pass `None` outside a browser context to skip the viewport clamp.
/// - `height_cap`: maximum height, ratio-preserving; `0` disables the cap.
/// - `aspect_ratio`: height per unit width.
///
/// The viewport clamp intentionally does not preserve the ratio: it is an
/// emergency "don't overflow the screen" snap to the full viewport box.
pub fn compute(container: BoxSize, viewport: Option<BoxSize>, height_cap: f64, aspect_ratio: f64) -> SizeResult {
  let mut width = container.width;
  let mut height = width * aspect_ratio;

  if height_cap > 0.0 && height > height_cap {
    height = height_cap;
    width = height / aspect_ratio;
  }

  if let Some(viewport) = viewport
    && height > viewport.height
  {
    height = viewport.height;
    width = viewport.width;
  }

  SizeResult { width, height }
}
