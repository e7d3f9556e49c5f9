use bandmap_core::aggregate::{AggregateOptions, AggregateRun, execute_aggregate};
use bandmap_core::config::BandmapConfig;
use bandmap_core::export::AggregateResult;
use bandmap_core::graph::BandGraph;
use bandmap_core::report::{ReportFormat, gather_report_data, generate_report, save_report};
use bandmap_scanner::{ArtistLookup, FetchAdapter, MemoryLookup, MusicBrainzClient, ScanError};
use clap::ArgMatches;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Output file written by a one-hop crawl unless `--output` says otherwise.
pub const ONE_HOP_OUTPUT: &str = "bands_network.json";
/// Output file written by a bounded-depth crawl unless `--output` says otherwise.
pub const EXTENDED_OUTPUT: &str = "bands_network_extended.json";
/// Exit status after a second Ctrl-C abandons the crawl.
pub const FORCED_EXIT_CODE: i32 = 130;

// Helper functions for crawl handler

/// Accepts a bare artist id or a musicbrainz.org artist URL and returns the id.
pub fn parse_seed_id(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let id = if trimmed.contains("://") {
        let (_, rest) = trimmed
            .split_once("/artist/")
            .ok_or_else(|| format!("'{}' is not a MusicBrainz artist URL", trimmed))?;
        rest.split(['?', '#', '/']).next().unwrap_or_default()
    } else {
        trimmed
    };

    if id.is_empty() {
        return Err("Seed id is empty".to_string());
    }
    if id.chars().any(char::is_whitespace) {
        return Err(format!("Seed id '{}' contains whitespace", id));
    }
    if !is_mbid(id) {
        warn!("Seed id '{}' does not look like a MusicBrainz id", id);
    }
    Ok(id.to_string())
}

/// True for ids shaped like `8-4-4-4-12` hex digits.
pub fn is_mbid(id: &str) -> bool {
    let groups: Vec<&str> = id.split('-').collect();
    groups.len() == 5
        && groups
            .iter()
            .zip([8, 4, 4, 4, 12])
            .all(|(g, len)| g.len() == len && g.chars().all(|c| c.is_ascii_hexdigit()))
}

/// `--output` with `~` expanded, or the default file for the crawl mode.
pub fn resolve_output_path(output: Option<&String>, one_hop: bool) -> PathBuf {
    match output {
        Some(path) => PathBuf::from(shellexpand::tilde(path).as_ref()),
        None if one_hop => PathBuf::from(ONE_HOP_OUTPUT),
        None => PathBuf::from(EXTENDED_OUTPUT),
    }
}

/// Config file and environment first, then any flags given on the command line.
pub fn build_config(args: &ArgMatches) -> Result<BandmapConfig, String> {
    let config_path = args.get_one::<String>("config").map(String::as_str);
    let mut config = BandmapConfig::load_optional(config_path)
        .and_then(BandmapConfig::apply_env)
        .map_err(|e| e.to_string())?;

    if let Some(depth) = args.get_one::<usize>("depth") {
        config.crawl.max_depth = *depth;
        config.crawl.one_hop = false;
    }
    if args.get_flag("one-hop") {
        config.crawl.one_hop = true;
    }
    if let Some(delay) = args.get_one::<u64>("delay-ms") {
        config.crawl.request_delay_ms = *delay;
    }
    if let Some(agent) = args.get_one::<String>("user-agent") {
        config.client.user_agent = agent.clone();
    }
    if let Some(url) = args.get_one::<String>("base-url") {
        config.client.base_url = url.clone();
    }

    debug!("Resolved config: {:?}", config);
    Ok(config)
}

/// Loads saved artist records for an offline replay.
pub fn load_offline_lookup(path: &str) -> Result<MemoryLookup, String> {
    let expanded = shellexpand::tilde(path);
    let lookup = MemoryLookup::from_json_file(Path::new(expanded.as_ref()))
        .map_err(|e| format!("Failed to load offline records from {}: {}", path, e))?;
    if lookup.is_empty() {
        return Err(format!("No artist records found in {}", path));
    }
    Ok(lookup)
}

/// How an interrupt watcher finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// No signal handler could be installed.
    Unavailable,
    /// A second interrupt arrived while the crawl was winding down.
    Forced,
}

/// The first interrupt sets `stop_signal` so the crawl stops between lookups.
/// The second one returns `Interrupt::Forced` and the caller should exit.
pub async fn watch_interrupts<F, Fut>(mut next_signal: F, stop_signal: Arc<AtomicBool>) -> Interrupt
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_signal().await.is_err() {
        return Interrupt::Unavailable;
    }
    stop_signal.store(true, Ordering::Relaxed);
    warn!("Interrupted, stopping after the current lookup (Ctrl-C again to quit now)");

    match next_signal().await {
        Ok(()) => Interrupt::Forced,
        Err(_) => Interrupt::Unavailable,
    }
}

/// Runs an aggregation with a Ctrl-C handler that stops the crawl and keeps what was found.
pub async fn run_aggregate<L: ArtistLookup>(
    lookup: L,
    config: &BandmapConfig,
    seed_id: &str,
    show_progress: bool,
) -> Result<AggregateRun, ScanError> {
    let stop_signal = Arc::new(AtomicBool::new(false));
    let signal_clone = stop_signal.clone();
    let ctrl_c = tokio::spawn(async move {
        if watch_interrupts(tokio::signal::ctrl_c, signal_clone).await == Interrupt::Forced {
            std::process::exit(FORCED_EXIT_CODE);
        }
    });

    let options = AggregateOptions {
        seed_id: seed_id.to_string(),
        mode: config.crawl_mode(),
        request_delay: config.request_delay(),
        show_progress_bars: show_progress,
        stop_signal: Some(stop_signal),
    };
    let adapter = FetchAdapter::new(lookup).with_labels(config.relation_labels());
    let run = execute_aggregate(options, adapter, None).await;

    ctrl_c.abort();
    run
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn parse_format(args: &ArgMatches) -> ReportFormat {
    args.get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text)
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "✗".red().bold(), message);
    std::process::exit(1);
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) {
    let raw_seed = sub_matches
        .get_one::<String>("SEED_ID")
        .map(String::as_str)
        .unwrap_or_default();
    let seed_id = parse_seed_id(raw_seed).unwrap_or_else(|e| fail(e));
    let config = build_config(sub_matches).unwrap_or_else(|e| fail(e));
    let output_path =
        resolve_output_path(sub_matches.get_one::<String>("output"), config.crawl.one_hop);
    let offline = sub_matches.get_one::<String>("offline");

    if !quiet {
        print_divider();
        println!("{}", "  BANDMAP CRAWL".bright_white().bold());
        print_divider();
        println!("{} Seed: {}", "→".blue(), seed_id.bright_white());
        let reach = if config.crawl.one_hop {
            "one hop (seed personnel only)".to_string()
        } else {
            format!("{} hops", config.crawl.max_depth)
        };
        println!("{} Reach: {}", "→".blue(), reach);
        println!(
            "{} Delay: {} ms per person lookup",
            "→".blue(),
            config.crawl.request_delay_ms
        );
        match offline {
            Some(path) => println!(
                "{} Source: offline records in {}",
                "→".blue(),
                path.bright_white()
            ),
            None => println!(
                "{} Source: {}",
                "→".blue(),
                config.client.base_url.bright_white()
            ),
        }
        println!();
    }

    let run = match offline {
        Some(path) => {
            let lookup = load_offline_lookup(path).unwrap_or_else(|e| fail(e));
            run_aggregate(lookup, &config, &seed_id, !quiet).await
        }
        None => {
            let client = MusicBrainzClient::new(&config.client_config())
                .unwrap_or_else(|e| fail(format!("Failed to create MusicBrainz client: {}", e)));
            run_aggregate(client, &config, &seed_id, !quiet).await
        }
    };

    let run = match run {
        Ok(run) => run,
        Err(ScanError::SeedUnavailable(e)) => {
            fail(format!("Failed to fetch seed band data: {}", e))
        }
        Err(e) => fail(format!("Crawl failed: {}", e)),
    };

    if let Err(e) = run.result.save(&output_path) {
        fail(format!("Failed to write {}: {}", output_path.display(), e));
    }

    if !quiet {
        println!();
        if run.stopped {
            println!("{} Crawl interrupted, partial results kept", "⚠".yellow().bold());
        }
        println!(
            "{} {} bands, {} connections, {} people looked up",
            "✓".green().bold(),
            run.result.bands.len().to_string().cyan(),
            run.result.connections.len().to_string().cyan(),
            run.persons_looked_up.to_string().cyan()
        );
        if !run.failures.is_empty() {
            println!(
                "{} {} lookups failed and were skipped",
                "⚠".yellow().bold(),
                run.failures.len()
            );
        }
        println!(
            "{} Band network written to {}",
            "✓".green().bold(),
            output_path.display().to_string().bright_white()
        );
    }

    if let Some(report_path) = sub_matches.get_one::<String>("report") {
        let data = gather_report_data(&run.result, &run.failures);
        let content = generate_report(&data, parse_format(sub_matches))
            .unwrap_or_else(|e| fail(format!("Failed to build report: {}", e)));
        let path = PathBuf::from(shellexpand::tilde(report_path).as_ref());
        if let Err(e) = save_report(&content, &path) {
            fail(format!("Failed to write report {}: {}", path.display(), e));
        }
        if !quiet {
            println!(
                "{} Report written to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
    }
}

/// Text listing of one band's neighbours, strongest first.
pub fn neighbour_report(result: &AggregateResult, band_id: &str) -> Result<String, String> {
    let band = result
        .band(band_id)
        .ok_or_else(|| format!("Band {} is not in this network", band_id))?;
    let graph = BandGraph::from_result(result);
    let neighbours = graph.neighbours(band_id);

    let mut report = format!("{} ({})\n", band.name, band.id);
    if neighbours.is_empty() {
        report.push_str("  no shared personnel with any other band\n");
    }
    for neighbour in neighbours {
        report.push_str(&format!(
            "  [{}] {} ({})\n",
            neighbour.weight, neighbour.name, neighbour.id
        ));
    }
    Ok(report)
}

pub fn handle_report(sub_matches: &ArgMatches) {
    let path = sub_matches
        .get_one::<String>("PATH")
        .map(String::as_str)
        .unwrap_or_default();
    let expanded = shellexpand::tilde(path);
    let result = AggregateResult::load(Path::new(expanded.as_ref()))
        .unwrap_or_else(|e| fail(format!("Failed to read {}: {}", path, e)));

    let content = match sub_matches.get_one::<String>("band") {
        Some(band_id) => neighbour_report(&result, band_id).unwrap_or_else(|e| fail(e)),
        None => {
            let data = gather_report_data(&result, &[]);
            generate_report(&data, parse_format(sub_matches))
                .unwrap_or_else(|e| fail(format!("Failed to build report: {}", e)))
        }
    };

    match sub_matches.get_one::<String>("output") {
        Some(output) => {
            let output_path = PathBuf::from(shellexpand::tilde(output).as_ref());
            if let Err(e) = save_report(&content, &output_path) {
                fail(format!("Failed to write report {}: {}", output_path.display(), e));
            }
            println!(
                "{} Report written to {}",
                "✓".green().bold(),
                output_path.display().to_string().bright_white()
            );
        }
        None => print!("{}", content),
    }
}
