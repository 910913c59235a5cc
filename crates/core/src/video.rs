//! Embed-URL derivation for module and quiz videos.
//!
//! Video references are opaque URLs; the only thing the platform needs is to
//! recognize an embeddable video URL and derive the embed form the player
//! iframe expects. Everything else about the host stays external.

use url::Url;

/// Derives the embeddable form of a video URL, if there is one.
///
/// Recognized shapes:
/// - `https://www.youtube.com/watch?v=ID` -> `https://www.youtube.com/embed/ID`
/// - `https://youtu.be/ID` -> `https://www.youtube.com/embed/ID`
/// - URLs already in `/embed/` form pass through unchanged.
///
/// Anything else is not embeddable and yields `None`.
#[must_use]
pub fn embed_url(raw: &Url) -> Option<Url> {
    let host = raw.host_str()?;

    if host == "youtu.be" {
        let id = raw.path_segments()?.next().filter(|s| !s.is_empty())?;
        return Url::parse(&format!("https://www.youtube.com/embed/{id}")).ok();
    }

    if host == "youtube.com" || host.ends_with(".youtube.com") {
        if raw.path().starts_with("/embed/") {
            return Some(raw.clone());
        }
        if raw.path() == "/watch" {
            let id = raw
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())?;
            if id.is_empty() {
                return None;
            }
            return Url::parse(&format!("https://{host}/embed/{id}")).ok();
        }
    }

    None
}

/// True when `embed_url` would succeed for this URL.
#[must_use]
pub fn is_embeddable(raw: &Url) -> bool {
    embed_url(raw).is_some()
}
