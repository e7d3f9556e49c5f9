use crate::error::FetchError;
use crate::lookup::{ArtistLookup, RawArtist, RawArtistRef};
use crate::model::{Band, UNKNOWN_NAME};
use std::collections::HashSet;
use tracing::{debug, warn};

/// How a relation label is treated when building a roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Member,
    Supporting,
}

/// Relation type labels that count as membership or support.
///
/// Labels are matched after trimming and lower-casing. Anything else
/// (producer, touring, tribute…) is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationLabels {
    member: HashSet<String>,
    supporting: HashSet<String>,
}

impl RelationLabels {
    pub fn new<M, S>(member: M, supporting: S) -> Self
    where
        M: IntoIterator,
        M::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        Self {
            member: member.into_iter().map(|l| normalize_label(l.as_ref())).collect(),
            supporting: supporting
                .into_iter()
                .map(|l| normalize_label(l.as_ref()))
                .collect(),
        }
    }

    pub fn classify(&self, label: &str) -> Option<RelationKind> {
        let label = normalize_label(label);
        if self.member.contains(&label) {
            Some(RelationKind::Member)
        } else if self.supporting.contains(&label) {
            Some(RelationKind::Supporting)
        } else {
            None
        }
    }
}

impl Default for RelationLabels {
    fn default() -> Self {
        Self::new(["member of band", "member"], ["supporting musician"])
    }
}

fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Turns raw artist records into typed rosters.
pub struct FetchAdapter<L> {
    lookup: L,
    labels: RelationLabels,
}

impl<L: ArtistLookup> FetchAdapter<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            labels: RelationLabels::default(),
        }
    }

    pub fn with_labels(mut self, labels: RelationLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Fetch a band with its members and supporting musicians.
    pub async fn fetch_band(&self, id: &str) -> Result<Band, FetchError> {
        let raw = self
            .lookup
            .lookup_artist(id)
            .await
            .map_err(|e| FetchError::new(id, e))?;
        Ok(self.band_from_raw(id, raw))
    }

    /// Every distinct band the person is linked to through a member-type relation.
    pub async fn fetch_member_bands(
        &self,
        person_id: &str,
    ) -> Result<Vec<(String, String)>, FetchError> {
        let raw = self
            .lookup
            .lookup_artist(person_id)
            .await
            .map_err(|e| FetchError::new(person_id, e))?;

        let mut seen = HashSet::new();
        let mut bands = Vec::new();
        for relation in &raw.relations {
            let Some(kind) = relation.relation_type.as_deref().and_then(|t| self.labels.classify(t))
            else {
                continue;
            };
            if kind != RelationKind::Member {
                continue;
            }
            let Some(target) = &relation.artist else {
                continue;
            };
            let Some(band_id) = target.id.as_deref().filter(|id| !id.is_empty()) else {
                warn!(person = %person_id, "Skipping band relation without an id");
                continue;
            };
            if seen.insert(band_id.to_string()) {
                bands.push((band_id.to_string(), name_or_unknown(target)));
            }
        }

        debug!(person = %person_id, bands = bands.len(), "Resolved member bands");
        Ok(bands)
    }

    fn band_from_raw(&self, id: &str, raw: RawArtist) -> Band {
        let name = raw
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let mut band = Band::new(id, name);

        for relation in raw.relations {
            let Some(kind) = relation.relation_type.as_deref().and_then(|t| self.labels.classify(t))
            else {
                continue;
            };
            let Some(person) = relation.artist else {
                continue;
            };
            let person_name = name_or_unknown(&person);
            let person_id = person.id.unwrap_or_default();
            match kind {
                RelationKind::Member => band.add_member(person_name, person_id),
                RelationKind::Supporting => band.add_supporting_musician(person_name, person_id),
            }
        }

        band
    }
}

fn name_or_unknown(artist: &RawArtistRef) -> String {
    artist
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;
    use crate::lookup::RawRelation;
    use crate::memory::MemoryLookup;

    fn grunge_lookup() -> MemoryLookup {
        MemoryLookup::new()
            .with_artist(
                RawArtist::new("mlb", "Mother Love Bone")
                    .with_relation("member of band", "jeff", "Jeff Ament")
                    .with_relation("Member", "stone", "Stone Gossard")
                    .with_relation("supporting musician", "chris", "Chris Cornell")
                    .with_relation("producer", "terry", "Terry Date"),
            )
            .with_artist(
                RawArtist::new("jeff", "Jeff Ament")
                    .with_relation("member of band", "mlb", "Mother Love Bone")
                    .with_relation("member of band", "pj", "Pearl Jam")
                    .with_relation("member of band", "pj", "Pearl Jam")
                    .with_relation("supporting musician", "temple", "Temple of the Dog"),
            )
    }

    #[tokio::test]
    async fn test_fetch_band_classifies_relations() {
        let adapter = FetchAdapter::new(grunge_lookup());
        let band = adapter.fetch_band("mlb").await.unwrap();

        assert_eq!(band.id, "mlb");
        assert_eq!(band.name, "Mother Love Bone");
        let members: Vec<&str> = band.members.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(members, vec!["jeff", "stone"]);
        assert_eq!(band.supporting_musicians.len(), 1);
        assert_eq!(band.supporting_musicians[0].name, "Chris Cornell");
    }

    #[tokio::test]
    async fn test_fetch_band_fills_sentinels_for_malformed_relations() {
        let mut raw = RawArtist {
            id: Some("odd".to_string()),
            name: None,
            relations: Vec::new(),
        };
        raw.relations.push(RawRelation {
            relation_type: Some("member of band".to_string()),
            direction: None,
            artist: Some(RawArtistRef {
                id: None,
                name: None,
            }),
        });
        raw.relations.push(RawRelation {
            relation_type: Some("member of band".to_string()),
            direction: None,
            artist: None,
        });
        raw.relations.push(RawRelation {
            relation_type: None,
            direction: None,
            artist: Some(RawArtistRef {
                id: Some("ghost".to_string()),
                name: Some("Ghost".to_string()),
            }),
        });

        let adapter = FetchAdapter::new(MemoryLookup::new().with_artist(raw));
        let band = adapter.fetch_band("odd").await.unwrap();

        assert_eq!(band.name, UNKNOWN_NAME);
        assert_eq!(band.members.len(), 1);
        assert_eq!(band.members[0].name, UNKNOWN_NAME);
        assert_eq!(band.members[0].id, "");
        assert!(band.supporting_musicians.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_band_error_carries_id() {
        let adapter = FetchAdapter::new(MemoryLookup::new());
        let err = adapter.fetch_band("nowhere").await.unwrap_err();
        assert_eq!(err.id, "nowhere");
        assert!(matches!(err.source, LookupError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_member_bands_distinct_members_only() {
        let adapter = FetchAdapter::new(grunge_lookup());
        let bands = adapter.fetch_member_bands("jeff").await.unwrap();

        assert_eq!(
            bands,
            vec![
                ("mlb".to_string(), "Mother Love Bone".to_string()),
                ("pj".to_string(), "Pearl Jam".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_member_bands_failure() {
        let adapter = FetchAdapter::new(grunge_lookup().with_failure("jeff"));
        let err = adapter.fetch_member_bands("jeff").await.unwrap_err();
        assert_eq!(err.id, "jeff");
    }

    #[test]
    fn test_labels_normalized() {
        let labels = RelationLabels::default();
        assert_eq!(labels.classify("  Member Of Band "), Some(RelationKind::Member));
        assert_eq!(labels.classify("SUPPORTING MUSICIAN"), Some(RelationKind::Supporting));
        assert_eq!(labels.classify("tribute"), None);
    }

    #[tokio::test]
    async fn test_custom_labels_track_extra_relation_types() {
        let labels = RelationLabels::new(
            ["member of band", "member"],
            ["supporting musician", "Producer"],
        );
        let adapter = FetchAdapter::new(grunge_lookup()).with_labels(labels);
        let band = adapter.fetch_band("mlb").await.unwrap();
        assert_eq!(band.supporting_musicians.len(), 2);
        assert_eq!(band.supporting_musicians[1].id, "terry");
    }
}
