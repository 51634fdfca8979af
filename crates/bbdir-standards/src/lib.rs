#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod paths;
pub mod supplemental;

pub use crate::config::{BiobankMapping, CatalogueSettings, IdentityConfig, StandardsConfig};
pub use crate::error::{Result, StandardsError};
pub use crate::paths::{
    CONFIG_FILE, MISSING_COUNTRIES_FILE, MISSING_COUNTRIES_REPORT, MISSING_DISEASES_FILE,
    MISSING_DISEASES_REPORT, MISSING_NETWORKS_FILE, MISSING_NETWORKS_REPORT, config_in,
    standards_root,
};
pub use crate::supplemental::{SUPPLEMENTAL_DELIMITER, SupplementalTable};
