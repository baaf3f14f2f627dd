//! Attribute vocabulary
//!
//! Attributes are the contract between the lowering front end and this
//! engine. Procedures carry `entrypoint` / `tag` / `checker`; variables carry
//! `lock` plus the analyzer-owned bookkeeping markers. Instrumented units can
//! be re-ingested: the analyzer-owned markers keep bookkeeping state out of
//! the shared-state analysis on the second pass.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Procedure: concurrently-invokable driver entry point.
pub const ATTR_ENTRY_POINT: &str = "entrypoint";
/// Procedure: helper belonging to the tagged entry point's call tree.
pub const ATTR_TAG: &str = "tag";
/// Procedure: synthesized pair-checking harness.
pub const ATTR_CHECKER: &str = "checker";
/// Variable: lock object.
pub const ATTR_LOCK: &str = "lock";
/// Variable: analyzer-owned current lockset.
pub const ATTR_CURRENT_LOCKSET: &str = "current_lockset";
/// Variable: analyzer-owned memory lockset.
pub const ATTR_MEMORY_LOCKSET: &str = "lockset";
/// Variable: analyzer-owned access-checking variable.
pub const ATTR_ACCESS_CHECKING: &str = "access_checking";
/// Variable: analyzer-owned access watchdog constant.
pub const ATTR_WATCHDOG: &str = "watchdog";
/// Variable: analyzer-owned domain-specific tracking variable.
pub const ATTR_DOMAIN_SPECIFIC: &str = "domain_specific";

/// Bare flags plus key/value tags attached to a procedure or variable.
///
/// Ordered containers so serialized fixtures are stable byte-for-byte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSet {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    flags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    tags: BTreeMap<String, String>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(mut self, name: &str) -> Self {
        self.flags.insert(name.to_string());
        self
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_string(), value.to_string());
        self
    }

    pub fn add_flag(&mut self, name: &str) {
        self.flags.insert(name.to_string());
    }

    pub fn add_tag(&mut self, key: &str, value: &str) {
        self.tags.insert(key.to_string(), value.to_string());
    }

    pub fn has(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty() && self.tags.is_empty()
    }

    // ───────────────────────── typed accessors ─────────────────────────

    pub fn is_entry_point(&self) -> bool {
        self.has(ATTR_ENTRY_POINT)
    }

    /// Entry point this helper is tagged as belonging to, if any.
    pub fn helper_tag(&self) -> Option<&str> {
        self.tag(ATTR_TAG)
    }

    pub fn is_checker(&self) -> bool {
        self.has(ATTR_CHECKER)
    }

    pub fn is_lock(&self) -> bool {
        self.has(ATTR_LOCK)
    }

    pub fn is_current_lockset(&self) -> bool {
        self.has(ATTR_CURRENT_LOCKSET)
    }

    pub fn is_memory_lockset(&self) -> bool {
        self.has(ATTR_MEMORY_LOCKSET)
    }

    pub fn is_access_checking(&self) -> bool {
        self.has(ATTR_ACCESS_CHECKING)
    }

    pub fn is_watchdog(&self) -> bool {
        self.has(ATTR_WATCHDOG)
    }

    pub fn is_domain_specific(&self) -> bool {
        self.has(ATTR_DOMAIN_SPECIFIC)
    }

    /// Variables owned by the analyzer itself (locks and bookkeeping state).
    /// These never count as driver shared state on re-ingestion.
    pub fn is_analyzer_owned(&self) -> bool {
        self.is_lock()
            || self.is_current_lockset()
            || self.is_memory_lockset()
            || self.is_access_checking()
            || self.is_watchdog()
            || self.is_domain_specific()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_and_tags() {
        let attrs = AttributeSet::new()
            .with_flag(ATTR_ENTRY_POINT)
            .with_tag(ATTR_TAG, "ioctl");
        assert!(attrs.is_entry_point());
        assert_eq!(attrs.helper_tag(), Some("ioctl"));
        assert!(!attrs.is_checker());
        assert!(attrs.tag("missing").is_none());
    }

    #[test]
    fn test_analyzer_owned_covers_all_bookkeeping_markers() {
        for marker in [
            ATTR_LOCK,
            ATTR_CURRENT_LOCKSET,
            ATTR_MEMORY_LOCKSET,
            ATTR_ACCESS_CHECKING,
            ATTR_WATCHDOG,
            ATTR_DOMAIN_SPECIFIC,
        ] {
            let attrs = AttributeSet::new().with_flag(marker);
            assert!(attrs.is_analyzer_owned(), "marker {marker} not recognized");
        }
        assert!(!AttributeSet::new().is_analyzer_owned());
    }

    #[test]
    fn test_serde_round_trip_stable() {
        let attrs = AttributeSet::new()
            .with_flag(ATTR_LOCK)
            .with_tag("origin", "mutex_init");
        let json = serde_json::to_string(&attrs).unwrap();
        let back: AttributeSet = serde_json::from_str(&json).unwrap();
        assert_eq!(attrs, back);
    }
}
