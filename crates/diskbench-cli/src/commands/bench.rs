use anyhow::Result;
use console::{measure_text_width, style};
use diskbench::reporting::RunSummary;
use diskbench::runners::FioInvocation;
use diskbench::{BenchRunConfig, BenchmarkRunner};

/// Exit status for a finished run: 1 if any case failed
pub fn exit_status(summary: &RunSummary) -> i32 {
    if summary.all_passed() {
        0
    } else {
        1
    }
}

/// One PASS/FAIL line per case, then the totals
fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines: Vec<String> = summary
        .cases
        .iter()
        .map(|case| {
            let tag = if case.outcome.is_pass() {
                style("PASS").green().bold()
            } else {
                style("FAIL").red().bold()
            };
            format!("{} {}", tag, case)
        })
        .collect();

    lines.push(String::new());
    lines.push(summary.to_string());
    lines
}

pub fn run_benchmark(config: BenchRunConfig) -> Result<RunSummary> {
    let runner = BenchmarkRunner::new(config)?;
    let summary = runner.run()?;

    for line in summary_lines(&summary) {
        println!("{}", line);
    }
    println!(
        "Results saved to: {}",
        runner.config().output_dir.display()
    );
    Ok(summary)
}

fn case_table(config: &BenchRunConfig) -> Vec<String> {
    let rows: Vec<(String, String)> = config
        .cases()
        .iter()
        .map(|case| {
            (
                format!("{} [{}]", case.device, case.mode.label),
                FioInvocation::for_case(&config.tool, case).command_line(),
            )
        })
        .collect();

    let max_key_len = rows
        .iter()
        .map(|(k, _)| measure_text_width(k))
        .max()
        .unwrap_or(0)
        .max("case".len());

    let mut lines = vec![
        format!("case {} => command", " ".repeat(max_key_len - "case".len())),
        "-".repeat(max_key_len + 12),
    ];
    for (case, command) in rows {
        lines.push(format!(
            "{} {} => {}",
            case,
            " ".repeat(max_key_len - measure_text_width(&case)),
            command
        ));
    }
    lines
}

pub fn list_cases(config: &BenchRunConfig) {
    for line in case_table(config) {
        println!("{}", line);
    }
}
