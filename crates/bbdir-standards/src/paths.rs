//! Standards directory path resolution.

use std::path::{Path, PathBuf};

/// Environment variable for overriding the standards directory.
pub const STANDARDS_ENV_VAR: &str = "BBDIR_STANDARDS_DIR";

pub const CONFIG_FILE: &str = "rd_connect.toml";
pub const MISSING_DISEASES_FILE: &str = "missing_diseases.csv";
pub const MISSING_COUNTRIES_FILE: &str = "missing_countries.csv";
pub const MISSING_NETWORKS_FILE: &str = "missing_networks.csv";

/// Missing-reference reports. Kept apart from the curated tables above so a
/// report written into the standards directory never replaces them.
pub const MISSING_DISEASES_REPORT: &str = "missing_diseases.report.csv";
pub const MISSING_COUNTRIES_REPORT: &str = "missing_countries.report.csv";
pub const MISSING_NETWORKS_REPORT: &str = "missing_networks.report.csv";

/// Get the standards root directory.
///
/// Resolution order:
/// 1. `BBDIR_STANDARDS_DIR` environment variable
/// 2. `standards/` directory relative to workspace root
pub fn standards_root() -> PathBuf {
    if let Ok(root) = std::env::var(STANDARDS_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../standards")
}

/// Settings file inside `root`, if one is there.
pub fn config_in(root: &Path) -> Option<PathBuf> {
    let path = root.join(CONFIG_FILE);
    path.is_file().then_some(path)
}
