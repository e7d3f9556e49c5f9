use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Sentinel used when the service omits a name.
pub const UNKNOWN_NAME: &str = "Unknown";

/// A person attached to a band, either as a member or a supporting musician.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonRef {
    pub name: String,
    pub id: String,
}

impl PersonRef {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// One musical group and its personnel, as fetched from the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub members: Vec<PersonRef>,
    #[serde(default)]
    pub supporting_musicians: Vec<PersonRef>,
}

impl Band {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            members: Vec::new(),
            supporting_musicians: Vec::new(),
        }
    }

    pub fn add_member(&mut self, name: impl Into<String>, id: impl Into<String>) {
        self.members.push(PersonRef::new(name, id));
    }

    pub fn add_supporting_musician(&mut self, name: impl Into<String>, id: impl Into<String>) {
        self.supporting_musicians.push(PersonRef::new(name, id));
    }

    /// Members followed by supporting musicians, in upstream order.
    pub fn personnel(&self) -> impl Iterator<Item = &PersonRef> {
        self.members.iter().chain(self.supporting_musicians.iter())
    }

    /// Distinct person ids across the whole roster. Empty sentinel ids are left out.
    pub fn personnel_ids(&self) -> HashSet<&str> {
        self.personnel()
            .map(|p| p.id.as_str())
            .filter(|id| !id.is_empty())
            .collect()
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Band(name={}, id={})", self.name, self.id)
    }
}

/// A pending unit of crawl work: a band id and the BFS level it was found at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub band_id: String,
    pub depth: usize,
}

impl FrontierEntry {
    pub fn new(band_id: impl Into<String>, depth: usize) -> Self {
        Self {
            band_id: band_id.into(),
            depth,
        }
    }
}

/// What kind of lookup a recorded failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Band,
    Person,
}

/// A lookup the crawl skipped, kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlFailure {
    pub id: String,
    pub kind: FailureKind,
    pub depth: usize,
    pub error: String,
}
