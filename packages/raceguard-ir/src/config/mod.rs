//! Configuration system
//!
//! Two pieces: `AnalysisConfig` (the run's knobs, all defaulted) and
//! `DomainProfile` (the lock/registration call names of the driver domain,
//! built-in Linux profile or YAML-loaded). All configuration errors are
//! fatal before analysis starts.

pub mod analysis_config;
pub mod domain_profile;
pub mod error;

pub use analysis_config::{AnalysisConfig, MAX_CALL_DEPTH, MIN_CALL_DEPTH};
pub use domain_profile::DomainProfile;
pub use error::{ConfigError, ConfigResult};
