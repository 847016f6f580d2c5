//! Content plans read from TOML files.
//!
//! ```toml
//! [[plans]]
//! name = "Morning digest"
//! channel_id = "6f1c2b7e-58a4-4c1e-9d8b-3a0f6a1d2e44"
//! cron_expression = "0 9 * * *"
//! timezone = "Europe/Berlin"
//! publish_mode = "review_first"
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, instrument};
use vermeer_core::ContentPlan;
use vermeer_error::{ConfigError, VermeerResult};

#[derive(Debug, Deserialize)]
struct PlanFile {
    #[serde(default)]
    plans: Vec<ContentPlan>,
}

/// Parse the `[[plans]]` tables of a TOML document.
pub fn parse_plans(source: &str) -> VermeerResult<Vec<ContentPlan>> {
    let file: PlanFile = toml::from_str(source)
        .map_err(|e| ConfigError::new(format!("Failed to parse plan file: {}", e)))?;
    Ok(file.plans)
}

/// Read and parse a plan file.
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_plans(path: impl AsRef<Path>) -> VermeerResult<Vec<ContentPlan>> {
    let source = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        ConfigError::new(format!(
            "Failed to read plan file {}: {}",
            path.as_ref().display(),
            e
        ))
    })?;
    let plans = parse_plans(&source)?;
    debug!(count = plans.len(), "Loaded plans");
    Ok(plans)
}
