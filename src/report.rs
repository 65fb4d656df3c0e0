use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;

use crate::collector::RunResult;
use crate::config::ReportFormat;

#[derive(Serialize)]
struct JsonReport<'a> {
    scenario: &'a str,
    success_rate: f64,
    requests_per_second: f64,
    #[serde(flatten)]
    result: &'a RunResult,
}

fn ms(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}

/// Plain-text end-of-run summary.
pub fn render_human(result: &RunResult, scenario: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "================================================================");
    let _ = writeln!(
        out,
        "Scenario: {scenario}{}",
        if result.cancelled { " (cancelled)" } else { "" }
    );
    let _ = writeln!(out, "================================================================");
    let _ = writeln!(out, "Terms found:          {:>10}", result.terms_found);
    let _ = writeln!(
        out,
        "Workers x budget:     {:>10}",
        format!("{} x {}", result.concurrency, result.iteration_budget)
    );
    let _ = writeln!(out, "Total requests:       {:>10}", result.total_requests);
    let _ = writeln!(out, "Succeeded:            {:>10}", result.success_count);
    let _ = writeln!(
        out,
        "Failed:               {:>10}   (http: {}, transport: {})",
        result.failure_count, result.http_failures, result.transport_failures
    );

    if result.total_requests > 0 {
        let _ = writeln!(out, "Success rate:         {:>10.2}%", result.success_rate());
        let _ = writeln!(
            out,
            "Throughput:           {:>10.2} req/s",
            result.requests_per_second()
        );

        let l = &result.latency;
        let _ = writeln!(out, "\nLatency (ms)");
        let _ = writeln!(out, "   Min:               {:>10.2}", ms(l.min));
        let _ = writeln!(out, "   Mean:              {:>10.2}", ms(l.mean));
        let _ = writeln!(out, "   P50:               {:>10.2}", ms(l.p50));
        let _ = writeln!(out, "   P95:               {:>10.2}", ms(l.p95));
        let _ = writeln!(out, "   P99:               {:>10.2}", ms(l.p99));
        let _ = writeln!(out, "   Max:               {:>10.2}", ms(l.max));
    }

    if !result.status_counts.is_empty() {
        let _ = writeln!(out, "\nStatus codes");
        for (code, count) in &result.status_counts {
            let _ = writeln!(out, "   {code}:               {count:>10}");
        }
    }

    let _ = writeln!(out, "\nWall time: {:.2}s", result.wall_time.as_secs_f64());
    out
}

pub fn render_json(result: &RunResult, scenario: &str) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        scenario,
        success_rate: result.success_rate(),
        requests_per_second: result.requests_per_second(),
        result,
    })
}

pub fn print_report(result: &RunResult, scenario: &str, format: ReportFormat) -> serde_json::Result<()> {
    match format {
        ReportFormat::Human => print!("{}", render_human(result, scenario)),
        ReportFormat::Json => println!("{}", render_json(result, scenario)?),
    }
    Ok(())
}
