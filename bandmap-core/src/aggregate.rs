use crate::connections::build_connections;
use crate::export::{AggregateResult, export};
use bandmap_scanner::error::Result;
use bandmap_scanner::{
    ArtistLookup, CrawlEvent, CrawlFailure, CrawlMode, Crawler, FetchAdapter, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

/// Options for configuring an aggregation run
pub struct AggregateOptions {
    pub seed_id: String,
    pub mode: CrawlMode,
    pub request_delay: Duration,
    pub show_progress_bars: bool,
    pub stop_signal: Option<Arc<AtomicBool>>,
}

/// Callback for reporting aggregation progress as plain messages
pub type AggregateProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// What an aggregation run produced
#[derive(Debug, Clone)]
pub struct AggregateRun {
    pub result: AggregateResult,
    pub failures: Vec<CrawlFailure>,
    pub persons_looked_up: usize,
    pub stopped: bool,
}

/// Crawl outward from the seed, infer connections and build the export document.
///
/// Fails only when the seed band itself cannot be fetched.
pub async fn execute_aggregate<L: ArtistLookup>(
    options: AggregateOptions,
    adapter: FetchAdapter<L>,
    progress_callback: Option<AggregateProgressCallback>,
) -> Result<AggregateRun> {
    let AggregateOptions {
        seed_id,
        mode,
        request_delay,
        show_progress_bars,
        stop_signal,
    } = options;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Fetching seed band...");
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(Arc::new(pb))
    } else {
        None
    };

    let fetched_count = Arc::new(AtomicUsize::new(0));

    let pb_clone = progress_bar.clone();
    let count_clone = fetched_count.clone();
    let forward = progress_callback.clone();
    let crawl_callback: ProgressCallback = Arc::new(move |event: CrawlEvent| {
        let message = match event {
            CrawlEvent::FetchingBand { id, depth } => {
                format!("Fetching band {} (depth {})", id, depth)
            }
            CrawlEvent::BandFetched { name, .. } => {
                let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
                format!("Fetched {} ({} bands so far)", name, count)
            }
            CrawlEvent::BandFailed { id } => format!("[!]  Failed to fetch band {}", id),
            CrawlEvent::LookingUpPerson { name, .. } => format!("Looking up {}", name),
        };
        if let Some(ref pb) = pb_clone {
            pb.set_message(message.clone());
        }
        if let Some(ref callback) = forward {
            callback(message);
        }
    });

    let mut crawler = Crawler::new(adapter)
        .with_mode(mode)
        .with_request_delay(request_delay)
        .with_progress_callback(crawl_callback);
    if let Some(signal) = stop_signal {
        crawler = crawler.with_stop_signal(signal);
    }

    let outcome = match crawler.crawl(&seed_id).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(ref pb) = progress_bar {
                pb.abandon_with_message("Crawl failed");
            }
            return Err(e);
        }
    };

    if let Some(ref callback) = progress_callback {
        callback(format!(
            "Computing connections across {} bands",
            outcome.bands.len()
        ));
    }
    let connections = build_connections(&outcome.bands);
    info!(
        "Aggregated {} bands and {} connections from seed {}",
        outcome.bands.len(),
        connections.len(),
        seed_id
    );

    if let Some(ref pb) = progress_bar {
        let total = fetched_count.load(Ordering::Relaxed);
        let label = if outcome.stopped {
            "Crawl stopped early!"
        } else {
            "Crawl complete!"
        };
        pb.finish_with_message(format!(
            "{} {} bands, {} connections",
            label,
            total,
            connections.len()
        ));
    }

    Ok(AggregateRun {
        result: export(outcome.bands, connections),
        failures: outcome.failures,
        persons_looked_up: outcome.persons_looked_up,
        stopped: outcome.stopped,
    })
}
