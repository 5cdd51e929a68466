//! Line-oriented rendering of a finished run.

use retrypool_jobs::PoolReport;

/// `Result: <value>` lines followed by `Error: <message>` lines, each
/// group in arrival order.
pub fn render(report: &PoolReport) -> Vec<String> {
    report
        .results
        .iter()
        .map(|value| format!("Result: {}", value))
        .chain(report.errors.iter().map(|err| format!("Error: {}", err)))
        .collect()
}
