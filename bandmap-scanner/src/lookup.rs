// The external capability the crawler depends on, and the wire shape it returns.

use crate::error::LookupError;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Artist record as returned by `artist/<id>?inc=artist-rels`.
///
/// Every field is optional so a single malformed relation never fails the
/// whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArtist {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub relations: Vec<RawRelation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRelation {
    #[serde(rename = "type", default)]
    pub relation_type: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub artist: Option<RawArtistRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArtistRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl RawArtist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            relations: Vec::new(),
        }
    }

    /// Adds a relation to another artist.
    pub fn with_relation(
        mut self,
        relation_type: &str,
        target_id: impl Into<String>,
        target_name: impl Into<String>,
    ) -> Self {
        self.relations.push(RawRelation {
            relation_type: Some(relation_type.to_string()),
            direction: None,
            artist: Some(RawArtistRef {
                id: Some(target_id.into()),
                name: Some(target_name.into()),
            }),
        });
        self
    }
}

/// Fetch an artist by id, with its artist relationships included.
///
/// Implementations decide transport, caching and pacing; the crawler only
/// sees records or errors.
pub trait ArtistLookup {
    fn lookup_artist(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<RawArtist, LookupError>> + Send;
}

impl<T: ArtistLookup + Sync> ArtistLookup for &T {
    fn lookup_artist(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<RawArtist, LookupError>> + Send {
        (**self).lookup_artist(id)
    }
}
