// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

#[path = "commands.rs"]
pub mod commands;

// Re-export commonly used handler functions for convenience
pub use commands::command_argument_builder;
pub use handlers::{
    Interrupt, build_config, is_mbid, load_offline_lookup, neighbour_report, parse_seed_id,
    resolve_output_path, run_aggregate, watch_interrupts,
};

// Re-export aggregation functionality from bandmap-core
pub use bandmap_core::aggregate::{
    AggregateOptions, AggregateProgressCallback, AggregateRun, execute_aggregate,
};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
