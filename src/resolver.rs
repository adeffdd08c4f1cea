//! Video identifier resolution from the known URL shapes.
//!
//! Handles `youtu.be/…`, `…/v/…`, `…/u/<n>/…`, `…/embed/…` and `watch?v=…`.
//! Failure is signaled by an empty string, never by an error; the opaque
//! platform layer downstream decides how to fail on a bad id.

/// Length of a platform video identifier.
pub const VIDEO_ID_LEN: usize = 11;

/// Slice the candidate token starting at `start`: everything up to the first
/// `#`, `&` or `?`.
fn token_at(url: &str, start: usize) -> &str {
  let rest = &url[start..];
  let end = rest.find(['#', '&', '?']).unwrap_or(rest.len());
  &rest[..end]
}

/// Byte offset right after the `/u/<n>/` shape, if present.
/// `<n>` is a single word character (user-index path segment).
fn after_user_segment(url: &str) -> Option<usize> {
  let pos = url.rfind("/u/")?;
  let rest = url[pos + 3..].as_bytes();
  if rest.len() >= 2 && (rest[0].is_ascii_alphanumeric() || rest[0] == b'_') && rest[1] == b'/' {
    Some(pos + 3 + 2)
  } else {
    None
  }
}

/// Resolve a video URL to its 11-character identifier.
///
/// Returns the empty string when no known shape matches or the token has the
/// wrong length. When several shapes appear in one URL the rightmost match
/// wins, so the id closest to the end of the URL is taken.
pub fn resolve_video_id(url: &str) -> String {
  let mut start: Option<usize> = None;

  for marker in ["youtu.be/", "v/", "embed/", "watch?v="] {
    if let Some(pos) = url.rfind(marker) {
      let candidate = pos + marker.len();
      start = Some(start.map_or(candidate, |s| s.max(candidate)));
    }
  }
  if let Some(candidate) = after_user_segment(url) {
    start = Some(start.map_or(candidate, |s| s.max(candidate)));
  }

  match start {
    Some(start) => {
      let token = token_at(url, start);
      if token.len() == VIDEO_ID_LEN { token.to_string() } else { String::new() }
    }
    None => String::new(),
  }
}

/// Resolve a sequence of URLs element-wise, preserving order and length.
/// Unresolvable entries stay as empty strings, no filtering.
pub fn resolve_video_ids(urls: &[String]) -> Vec<String> {
  urls.iter().map(|url| resolve_video_id(url)).collect()
}
