// Final node/edge document handed to the visualization.

use crate::connections::Connection;
use bandmap_scanner::Band;
use bandmap_scanner::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// The field names and nesting are read by existing visualization code and
/// must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub bands: Vec<Band>,
    pub connections: Vec<Connection>,
}

/// Pairs the crawl pool with its connections. Discovery order is preserved.
pub fn export(bands: Vec<Band>, connections: Vec<Connection>) -> AggregateResult {
    AggregateResult { bands, connections }
}

impl AggregateResult {
    pub fn band(&self, id: &str) -> Option<&Band> {
        self.bands.iter().find(|b| b.id == id)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(self.to_json_pretty()?.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
