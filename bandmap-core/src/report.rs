// Report generation from an aggregate result

use crate::export::AggregateResult;
use crate::graph::BandGraph;
use bandmap_scanner::CrawlFailure;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const DIVIDER: &str =
    "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

/// How many links and rosters the summary lists.
pub const TOP_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<BandSummary>,
    pub total_bands: usize,
    pub total_connections: usize,
    pub total_personnel: usize,
    pub components: usize,
    pub isolated_bands: Vec<BandSummary>,
    pub strongest_links: Vec<LinkSummary>,
    pub largest_rosters: Vec<RosterSummary>,
    pub failures: Vec<CrawlFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSummary {
    pub source: String,
    pub target: String,
    pub weight: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSummary {
    pub name: String,
    pub members: usize,
    pub supporting_musicians: usize,
}

/// Summarises an aggregate. The first band in the pool is the seed.
pub fn gather_report_data(result: &AggregateResult, failures: &[CrawlFailure]) -> ReportData {
    let graph = BandGraph::from_result(result);

    let seed = result.bands.first().map(|b| BandSummary {
        id: b.id.clone(),
        name: b.name.clone(),
    });

    let total_personnel = result
        .bands
        .iter()
        .flat_map(|b| b.personnel_ids())
        .collect::<std::collections::HashSet<&str>>()
        .len();

    let isolated_bands = result
        .bands
        .iter()
        .filter(|b| graph.neighbours(&b.id).is_empty())
        .map(|b| BandSummary {
            id: b.id.clone(),
            name: b.name.clone(),
        })
        .collect();

    let strongest_links = graph
        .strongest(TOP_LIMIT)
        .into_iter()
        .map(|(source, target, weight)| LinkSummary {
            source,
            target,
            weight,
        })
        .collect();

    let mut largest_rosters: Vec<RosterSummary> = result
        .bands
        .iter()
        .map(|b| RosterSummary {
            name: b.name.clone(),
            members: b.members.len(),
            supporting_musicians: b.supporting_musicians.len(),
        })
        .collect();
    largest_rosters.sort_by(|a, b| {
        (b.members + b.supporting_musicians)
            .cmp(&(a.members + a.supporting_musicians))
            .then_with(|| a.name.cmp(&b.name))
    });
    largest_rosters.truncate(TOP_LIMIT);

    ReportData {
        seed,
        total_bands: graph.node_count(),
        total_connections: graph.edge_count(),
        total_personnel,
        components: graph.component_count(),
        isolated_bands,
        strongest_links,
        largest_rosters,
        failures: failures.to_vec(),
    }
}

pub fn generate_text_report(data: &ReportData) -> String {
    let mut report = String::new();

    report.push_str(DIVIDER);
    report.push_str("                        BANDMAP COLLABORATION REPORT\n");
    report.push_str(DIVIDER);
    report.push('\n');

    if let Some(ref seed) = data.seed {
        report.push_str(&format!("Seed:         {} ({})\n", seed.name, seed.id));
    }
    report.push_str(&format!("Bands:        {}\n", data.total_bands));
    report.push_str(&format!("Connections:  {}\n", data.total_connections));
    report.push_str(&format!("Personnel:    {}\n", data.total_personnel));
    report.push_str(&format!("Components:   {}\n", data.components));
    report.push_str(&format!("Failures:     {}\n", data.failures.len()));
    report.push('\n');

    if !data.strongest_links.is_empty() {
        report.push_str(DIVIDER);
        report.push_str("STRONGEST LINKS\n");
        report.push_str(DIVIDER);
        report.push('\n');
        for link in &data.strongest_links {
            report.push_str(&format!(
                "  [{}] {} <-> {}\n",
                link.weight, link.source, link.target
            ));
        }
        report.push('\n');
    }

    if !data.largest_rosters.is_empty() {
        report.push_str(DIVIDER);
        report.push_str("LARGEST ROSTERS\n");
        report.push_str(DIVIDER);
        report.push('\n');
        for roster in &data.largest_rosters {
            report.push_str(&format!(
                "  {:<40} {} members, {} supporting\n",
                roster.name, roster.members, roster.supporting_musicians
            ));
        }
        report.push('\n');
    }

    if !data.isolated_bands.is_empty() {
        report.push_str(DIVIDER);
        report.push_str("UNCONNECTED BANDS\n");
        report.push_str(DIVIDER);
        report.push('\n');
        for band in &data.isolated_bands {
            report.push_str(&format!("  {} ({})\n", band.name, band.id));
        }
        report.push('\n');
    }

    if !data.failures.is_empty() {
        report.push_str(DIVIDER);
        report.push_str("SKIPPED LOOKUPS\n");
        report.push_str(DIVIDER);
        report.push('\n');
        for failure in &data.failures {
            report.push_str(&format!(
                "  {:?} {} at depth {}: {}\n",
                failure.kind, failure.id, failure.depth, failure.error
            ));
        }
        report.push('\n');
    }

    report.push_str(DIVIDER);
    report.push_str("                          End of Report\n");
    report.push_str(DIVIDER);
    report.push_str("\nGenerated by bandmap. Data from MusicBrainz (CC0).\n\n");

    report
}

pub fn generate_json_report(data: &ReportData) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "bandmap",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json",
            },
            "seed": data.seed,
            "summary": {
                "total_bands": data.total_bands,
                "total_connections": data.total_connections,
                "total_personnel": data.total_personnel,
                "components": data.components,
                "failures": data.failures.len(),
            },
            "strongest_links": data.strongest_links,
            "largest_rosters": data.largest_rosters,
            "isolated_bands": data.isolated_bands,
            "failures": data.failures,
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_report(
    data: &ReportData,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(data)),
        ReportFormat::Json => generate_json_report(data),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
