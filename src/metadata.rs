//! Tag and cover-art lookup collaborator.
//!
//! Failures here always degrade to defaults; an unreadable or untagged file
//! is still a perfectly playable track.

use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use log::debug;
use std::path::Path;

/// Artist label used when a file carries no readable artist tag.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Tags extracted from an audio file.
#[derive(Debug, Clone)]
pub struct TrackTags {
    pub artist: String,
    /// Raw bytes of the embedded cover art, when present.
    pub cover_art: Option<Vec<u8>>,
    pub duration_ms: Option<u64>,
}

impl Default for TrackTags {
    fn default() -> Self {
        Self {
            artist: UNKNOWN_ARTIST.to_string(),
            cover_art: None,
            duration_ms: None,
        }
    }
}

/// Read tags from an audio file. Never fails: unreadable files yield the
/// default artist label and no art.
#[must_use]
pub fn read_tags(path: &Path) -> TrackTags {
    let tagged_file = match lofty::read_from_path(path) {
        Ok(file) => file,
        Err(err) => {
            debug!("Could not read tags from {}: {err}", path.display());
            return TrackTags::default();
        }
    };

    let duration_ms = {
        let duration = tagged_file.properties().duration();
        if duration.is_zero() {
            None
        } else {
            Some(duration.as_millis() as u64)
        }
    };

    let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());

    let (artist, cover_art) = match tag {
        Some(tag) => {
            let artist = tag
                .artist()
                .map(|artist| artist.trim().to_string())
                .filter(|artist| !artist.is_empty())
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
            let cover_art = tag.pictures().first().map(|pic| pic.data().to_vec());
            (artist, cover_art)
        }
        None => (UNKNOWN_ARTIST.to_string(), None),
    };

    TrackTags {
        artist,
        cover_art,
        duration_ms,
    }
}
