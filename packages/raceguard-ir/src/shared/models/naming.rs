//! Bookkeeping name contract
//!
//! Access-checking variables, watchdog constants and pair-checking harnesses
//! follow a fixed naming scheme that downstream verifiers and re-ingested
//! units rely on. Formatting and parsing both live here so the two can never
//! drift apart.

/// Prefix of write access-checking variables.
pub const WRITE_ACCESS_PREFIX: &str = "WRITTEN_";
/// Prefix of read access-checking variables.
pub const READ_ACCESS_PREFIX: &str = "READ_";
/// Prefix of access watchdog constants.
pub const WATCHDOG_PREFIX: &str = "WATCHED_ACCESS_";
/// Prefix of synthesized pair-checking procedures.
pub const PAIR_REGION_PREFIX: &str = "check$";

/// `WRITTEN_{location}_${entry_point}`
pub fn write_access_variable_name(location: &str, entry_point: &str) -> String {
    format!("{WRITE_ACCESS_PREFIX}{location}_${entry_point}")
}

/// `READ_{location}_${entry_point}`
pub fn read_access_variable_name(location: &str, entry_point: &str) -> String {
    format!("{READ_ACCESS_PREFIX}{location}_${entry_point}")
}

/// `WATCHED_ACCESS_{location}`
pub fn watchdog_constant_name(location: &str) -> String {
    format!("{WATCHDOG_PREFIX}{location}")
}

/// `check${first}${second}`; callers pass the canonical pair order.
pub fn pair_region_name(first: &str, second: &str) -> String {
    format!("{PAIR_REGION_PREFIX}{first}${second}")
}

/// Location a watchdog constant monitors, if the name follows the scheme.
pub fn watched_location(constant_name: &str) -> Option<&str> {
    constant_name.strip_prefix(WATCHDOG_PREFIX)
}

pub fn is_write_access_variable(name: &str) -> bool {
    name.starts_with(WRITE_ACCESS_PREFIX)
}

pub fn is_read_access_variable(name: &str) -> bool {
    name.starts_with(READ_ACCESS_PREFIX)
}
