// In-memory artist directory, for offline replays and tests.

use crate::error::{LookupError, Result};
use crate::lookup::{ArtistLookup, RawArtist};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug)]
pub struct MemoryLookup {
    artists: HashMap<String, RawArtist>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MemoryLookup {
    pub fn new() -> Self {
        Self {
            artists: HashMap::new(),
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Builds a directory from records keyed by their own `id`. Records
    /// without an id are ignored.
    pub fn from_artists(artists: impl IntoIterator<Item = RawArtist>) -> Self {
        let mut lookup = Self::new();
        for artist in artists {
            lookup = lookup.with_artist(artist);
        }
        lookup
    }

    /// Loads a JSON array of artist records, as saved from `artist/<id>?inc=artist-rels`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let artists: Vec<RawArtist> = serde_json::from_str(&content)?;
        Ok(Self::from_artists(artists))
    }

    pub fn with_artist(mut self, artist: RawArtist) -> Self {
        if let Some(id) = artist.id.clone() {
            self.artists.insert(id, artist);
        }
        self
    }

    /// Makes lookups of `id` fail with a transport-style error.
    pub fn with_failure(mut self, id: impl Into<String>) -> Self {
        self.failing.insert(id.into());
        self
    }

    pub fn len(&self) -> usize {
        self.artists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }

    /// Every id looked up so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn lookup_sync(&self, id: &str) -> std::result::Result<RawArtist, LookupError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(id.to_string());
        }

        if self.failing.contains(id) {
            return Err(LookupError::ApiError(500, format!("simulated failure for {}", id)));
        }

        self.artists
            .get(id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(id.to_string()))
    }
}

impl Default for MemoryLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtistLookup for MemoryLookup {
    async fn lookup_artist(&self, id: &str) -> std::result::Result<RawArtist, LookupError> {
        self.lookup_sync(id)
    }
}
