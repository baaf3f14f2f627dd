//! Custom assertions for test verification
//!
//! This module provides domain-specific assertions over analysis runs.

use raceguard_ir::{AnalysisRun, AssertionVerdict, Outcome};

/// Assert the process-level outcome of a run
pub fn assert_outcome(run: &AnalysisRun, expected: Outcome) {
    assert_eq!(
        run.outcome(),
        expected,
        "Expected outcome '{expected}', stats: {:?}",
        run.stats
    );
}

/// Assert that the run found no violated pair
pub fn assert_race_free(run: &AnalysisRun) {
    assert_eq!(
        run.stats.violated,
        0,
        "Expected no violations, got: {:?}",
        report_lines(run)
    );
}

/// Assert the number of reports the run produced
pub fn assert_report_count(run: &AnalysisRun, expected: usize) {
    assert_eq!(
        run.reports.len(),
        expected,
        "Expected {expected} reports, got {}: {:?}",
        run.reports.len(),
        report_lines(run)
    );
}

/// Assert that some violated report names the location
pub fn assert_violation_on(run: &AnalysisRun, location: &str) {
    assert!(
        run.races().any(|r| r.location == location),
        "Expected a violation on '{location}', reports: {:?}",
        report_lines(run)
    );
}

/// Assert the verdict of the report for one pair and location
pub fn assert_verdict(
    run: &AnalysisRun,
    pair: &str,
    location: &str,
    expected: AssertionVerdict,
) {
    let report = run
        .reports
        .iter()
        .find(|r| r.pair.to_string() == pair && r.location == location);
    match report {
        Some(report) => assert_eq!(
            report.verdict, expected,
            "Verdict mismatch for {pair} on '{location}'"
        ),
        None => panic!(
            "No report for {pair} on '{location}', reports: {:?}",
            report_lines(run)
        ),
    }
}

/// Assert that no report pairs the two entry points
pub fn assert_no_pair_between(run: &AnalysisRun, first: &str, second: &str) {
    assert!(
        !run
            .reports
            .iter()
            .any(|r| r.pair.involves(first) && r.pair.involves(second)),
        "Expected no report between '{first}' and '{second}', reports: {:?}",
        report_lines(run)
    );
}

fn report_lines(run: &AnalysisRun) -> Vec<String> {
    run.reports.iter().map(|r| r.to_string()).collect()
}
