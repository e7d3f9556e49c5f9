use crate::adapter::FetchAdapter;
use crate::error::{Result, ScanError};
use crate::lookup::ArtistLookup;
use crate::model::{Band, CrawlFailure, FailureKind, FrontierEntry};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_DEPTH: usize = 2;

/// MusicBrainz allows roughly one request per second; stay a little under it.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(1100);

pub type ProgressCallback = Arc<dyn Fn(CrawlEvent) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    FetchingBand { id: String, depth: usize },
    BandFetched { id: String, name: String },
    BandFailed { id: String },
    LookingUpPerson { id: String, name: String },
}

/// How far the crawl reaches from the seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// Seed personnel only: the bands they belong to are fetched but not expanded.
    OneHop,
    /// Expand every band found up to `max_depth` hops from the seed.
    Bounded { max_depth: usize },
}

impl CrawlMode {
    pub fn max_depth(&self) -> usize {
        match self {
            CrawlMode::OneHop => 1,
            CrawlMode::Bounded { max_depth } => *max_depth,
        }
    }
}

impl Default for CrawlMode {
    fn default() -> Self {
        CrawlMode::Bounded {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Everything a crawl produced.
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// Fetched bands in discovery order, unique by id.
    pub bands: Vec<Band>,
    pub failures: Vec<CrawlFailure>,
    pub persons_looked_up: usize,
    /// Set when the stop signal ended the crawl before the frontier drained.
    pub stopped: bool,
}

/// Breadth-first, depth-bounded crawl over bands linked by shared personnel.
///
/// Lookups run one at a time. Each person lookup is followed by a fixed
/// pause before the next request, whatever its outcome.
pub struct Crawler<L> {
    adapter: FetchAdapter<L>,
    mode: CrawlMode,
    request_delay: Duration,
    progress_callback: Option<ProgressCallback>,
    stop_signal: Option<Arc<AtomicBool>>,
}

impl<L: ArtistLookup> Crawler<L> {
    pub fn new(adapter: FetchAdapter<L>) -> Self {
        Self {
            adapter,
            mode: CrawlMode::default(),
            request_delay: DEFAULT_REQUEST_DELAY,
            progress_callback: None,
            stop_signal: None,
        }
    }

    pub fn with_mode(mut self, mode: CrawlMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.mode = CrawlMode::Bounded { max_depth: depth };
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// The crawl checks this flag between frontier entries and stops once it is set.
    pub fn with_stop_signal(mut self, signal: Arc<AtomicBool>) -> Self {
        self.stop_signal = Some(signal);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.mode.max_depth()
    }

    pub async fn crawl(&self, seed_id: &str) -> Result<CrawlOutcome> {
        let seed_id = seed_id.trim();
        if seed_id.is_empty() {
            return Err(ScanError::InvalidConfig("seed id is empty".to_string()));
        }

        let max_depth = self.max_depth();
        info!("Starting crawl from {} (max depth {})", seed_id, max_depth);

        let mut frontier = VecDeque::from([FrontierEntry::new(seed_id, 0)]);
        let mut visited: HashSet<String> = HashSet::new();
        let mut outcome = CrawlOutcome::default();

        while let Some(FrontierEntry { band_id, depth }) = frontier.pop_front() {
            if self.stop_requested() {
                info!("Stop requested, {} entries left in the frontier", frontier.len() + 1);
                outcome.stopped = true;
                break;
            }

            // Marked before the fetch so a failing id is never retried.
            if !visited.insert(band_id.clone()) {
                debug!("Skipping already visited band {}", band_id);
                continue;
            }

            self.notify(CrawlEvent::FetchingBand {
                id: band_id.clone(),
                depth,
            });

            let band = match self.adapter.fetch_band(&band_id).await {
                Ok(band) => band,
                Err(e) if depth == 0 => {
                    warn!("Seed band {} could not be fetched: {}", band_id, e);
                    return Err(ScanError::SeedUnavailable(e));
                }
                Err(e) => {
                    warn!("Failed to fetch band {}: {}", band_id, e);
                    self.notify(CrawlEvent::BandFailed { id: band_id.clone() });
                    outcome.failures.push(CrawlFailure {
                        id: band_id,
                        kind: FailureKind::Band,
                        depth,
                        error: e.source.to_string(),
                    });
                    continue;
                }
            };

            info!(depth, "Fetched {}", band);
            self.notify(CrawlEvent::BandFetched {
                id: band.id.clone(),
                name: band.name.clone(),
            });

            if depth < max_depth {
                self.expand(&band, depth, &visited, &mut frontier, &mut outcome)
                    .await;
            }

            outcome.bands.push(band);
        }

        info!(
            "Crawl complete. {} bands fetched, {} lookups failed",
            outcome.bands.len(),
            outcome.failures.len()
        );
        Ok(outcome)
    }

    /// Looks up each person on the band's roster and queues the bands they belong to.
    async fn expand(
        &self,
        band: &Band,
        depth: usize,
        visited: &HashSet<String>,
        frontier: &mut VecDeque<FrontierEntry>,
        outcome: &mut CrawlOutcome,
    ) {
        let mut persons_seen = HashSet::new();

        for person in band.personnel() {
            if person.id.is_empty() || !persons_seen.insert(person.id.as_str()) {
                continue;
            }

            self.notify(CrawlEvent::LookingUpPerson {
                id: person.id.clone(),
                name: person.name.clone(),
            });

            let result = self.adapter.fetch_member_bands(&person.id).await;
            outcome.persons_looked_up += 1;
            self.pause().await;

            match result {
                Ok(found) => {
                    for (band_id, band_name) in found {
                        if !visited.contains(&band_id) {
                            debug!("Queuing {} ({}) at depth {}", band_name, band_id, depth + 1);
                            frontier.push_back(FrontierEntry::new(band_id, depth + 1));
                        }
                    }
                }
                Err(e) => {
                    warn!("Failed to fetch bands for {} ({}): {}", person.name, person.id, e);
                    outcome.failures.push(CrawlFailure {
                        id: person.id.clone(),
                        kind: FailureKind::Person,
                        depth,
                        error: e.source.to_string(),
                    });
                }
            }
        }
    }

    async fn pause(&self) {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }

    fn stop_requested(&self) -> bool {
        self.stop_signal
            .as_ref()
            .is_some_and(|signal| signal.load(Ordering::Relaxed))
    }

    fn notify(&self, event: CrawlEvent) {
        if let Some(ref callback) = self.progress_callback {
            callback(event);
        }
    }
}
