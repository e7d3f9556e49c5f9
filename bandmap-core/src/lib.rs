pub mod aggregate;
pub mod config;
pub mod connections;
pub mod export;
pub mod graph;
pub mod report;

pub use aggregate::{AggregateOptions, AggregateProgressCallback, AggregateRun, execute_aggregate};
pub use config::{BandmapConfig, ConfigError};
pub use connections::{Connection, build_connections};
pub use export::{AggregateResult, export};
pub use graph::{BandGraph, Neighbour};
pub use report::{ReportData, ReportFormat, gather_report_data};

const BANNER: &str = r#"
   _                     _
  | |__   __ _ _ __   __| |_ __ ___   __ _ _ __
  | '_ \ / _` | '_ \ / _` | '_ ` _ \ / _` | '_ \
  | |_) | (_| | | | | (_| | | | | | | (_| | |_) |
  |_.__/ \__,_|_| |_|\__,_|_| |_| |_|\__,_| .__/
                                          |_|
"#;

pub fn print_banner() {
    println!("{}", BANNER);
    println!(
        "  v{}  mapping who played with whom, one MusicBrainz lookup at a time\n",
        env!("CARGO_PKG_VERSION")
    );
}
