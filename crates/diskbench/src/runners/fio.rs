use crate::bench_config::BenchCase;
use crate::errors::{BenchError, BenchResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Command;

/// Flags shared by every job: direct 4KiB I/O, libaio, 64 in flight, 30s time-based.
const FIXED_ARGS: [&str; 7] = [
    "--direct=1",
    "--bs=4k",
    "--ioengine=libaio",
    "--iodepth=64",
    "--runtime=30",
    "--time_based",
    "--group_reporting",
];

const METRIC_KEYWORD: &str = "iops";

static IOPS_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\biops\s*=\s*([0-9][0-9.]*[kmg]?)").unwrap());

/// A fully built fio command line for one case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FioInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl FioInvocation {
    pub fn for_case(tool: &str, case: &BenchCase) -> Self {
        let mut args = vec![
            format!("--name={}", case.name()),
            format!("--filename={}", case.device_path()),
            format!("--rw={}", case.mode.workload),
        ];
        args.extend(FIXED_ARGS.iter().map(|a| a.to_string()));

        FioInvocation {
            program: tool.to_string(),
            args,
        }
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// What one subprocess run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

pub trait CommandExecutor {
    fn execute(&self, invocation: &FioInvocation) -> BenchResult<InvocationOutput>;
}

/// Runs the invocation as a real child process and blocks until it exits
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn execute(&self, invocation: &FioInvocation) -> BenchResult<InvocationOutput> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .output()
            .map_err(|source| BenchError::SpawnError {
                program: invocation.program.clone(),
                source,
            })?;

        Ok(InvocationOutput {
            // killed by a signal
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Apply the pass/fail policy: nonzero exit first, then the metric keyword.
pub fn evaluate(case: &BenchCase, output: &InvocationOutput) -> BenchResult<()> {
    if output.exit_code != 0 {
        return Err(BenchError::ToolExecutionFailure {
            device: case.device.clone(),
            mode: case.mode.label.clone(),
            code: output.exit_code,
            stderr: output.stderr.trim().to_string(),
        });
    }

    if !output.stdout.to_lowercase().contains(METRIC_KEYWORD) {
        return Err(BenchError::MissingMetricFailure {
            device: case.device.clone(),
            mode: case.mode.label.clone(),
        });
    }

    Ok(())
}

/// First `IOPS=<value>` figure in the output, e.g. `123k` from `write: IOPS=123k, BW=...`
pub fn extract_iops(stdout: &str) -> Option<String> {
    IOPS_VALUE
        .captures(stdout)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
