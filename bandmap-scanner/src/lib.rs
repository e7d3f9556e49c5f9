pub mod adapter;
pub mod crawler;
pub mod error;
pub mod lookup;
pub mod memory;
pub mod model;
pub mod musicbrainz;

pub use adapter::{FetchAdapter, RelationKind, RelationLabels};
pub use crawler::{CrawlEvent, CrawlMode, CrawlOutcome, Crawler, ProgressCallback};
pub use error::{FetchError, LookupError, ScanError};
pub use lookup::{ArtistLookup, RawArtist};
pub use memory::MemoryLookup;
pub use model::{Band, CrawlFailure, FailureKind, PersonRef};
pub use musicbrainz::{ClientConfig, MusicBrainzClient};
