//! Driver-domain knowledge
//!
//! The IR carries no locking primitives; locks are acquired and released
//! through plain calls. A `DomainProfile` names the calls that matter:
//! which callees acquire and release locks, and which register or unregister
//! a device (used for entry-point role classification). The built-in profile
//! covers the common Linux driver API; other domains load a YAML profile.

use super::error::{ConfigError, ConfigResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainProfile {
    pub name: String,
    pub acquire_calls: BTreeSet<String>,
    pub release_calls: BTreeSet<String>,
    #[serde(default)]
    pub register_calls: BTreeSet<String>,
    #[serde(default)]
    pub unregister_calls: BTreeSet<String>,
}

static LINUX: Lazy<DomainProfile> = Lazy::new(|| {
    let names = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
    DomainProfile {
        name: "linux".to_string(),
        acquire_calls: names(&[
            "mutex_lock",
            "mutex_lock_interruptible",
            "spin_lock",
            "spin_lock_irq",
            "spin_lock_irqsave",
        ]),
        release_calls: names(&[
            "mutex_unlock",
            "spin_unlock",
            "spin_unlock_irq",
            "spin_unlock_irqrestore",
        ]),
        register_calls: names(&["register_netdev", "misc_register", "register_chrdev"]),
        unregister_calls: names(&["unregister_netdev", "misc_deregister", "unregister_chrdev"]),
    }
});

impl DomainProfile {
    /// The built-in Linux driver profile.
    pub fn linux() -> Self {
        LINUX.clone()
    }

    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let profile: DomainProfile = serde_yaml::from_str(yaml)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// A usable profile needs at least the lock call classes; registration
    /// classes may be empty (role classification then never fires).
    pub fn validate(&self) -> ConfigResult<()> {
        if self.acquire_calls.is_empty() {
            return Err(ConfigError::EmptyCallClass {
                profile: self.name.clone(),
                class: "acquire".to_string(),
            });
        }
        if self.release_calls.is_empty() {
            return Err(ConfigError::EmptyCallClass {
                profile: self.name.clone(),
                class: "release".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_acquire(&self, callee: &str) -> bool {
        self.acquire_calls.contains(callee)
    }

    pub fn is_release(&self, callee: &str) -> bool {
        self.release_calls.contains(callee)
    }

    pub fn is_register(&self, callee: &str) -> bool {
        self.register_calls.contains(callee)
    }

    pub fn is_unregister(&self, callee: &str) -> bool {
        self.unregister_calls.contains(callee)
    }

    /// Whether the profile knows this callee at all. Known calls never count
    /// as opaque during the flow analysis.
    pub fn classifies(&self, callee: &str) -> bool {
        self.is_acquire(callee)
            || self.is_release(callee)
            || self.is_register(callee)
            || self.is_unregister(callee)
    }
}

impl Default for DomainProfile {
    fn default() -> Self {
        Self::linux()
    }
}
