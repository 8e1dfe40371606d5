use crate::bench_config::{BenchCase, BenchRunConfig};
use crate::errors::BenchResult;
use crate::reporting::{CaseOutcome, CaseResult, RunSummary};
use crate::runners::fio::{
    evaluate, extract_iops, CommandExecutor, FioInvocation, InvocationOutput, SystemExecutor,
};
use crate::utilities::run_post_process;
use crate::work_dir::{CaseWorkDir, STDERR_ATTACHMENT, STDOUT_ATTACHMENT};
use chrono::Utc;
use std::fs;
use std::time::Instant;

/// Runs every (device, mode) case of a config, one after another
pub struct BenchmarkRunner {
    config: BenchRunConfig,
    executor: Box<dyn CommandExecutor>,
}

impl BenchmarkRunner {
    /// Runner that spawns the real benchmarking tool
    pub fn new(config: BenchRunConfig) -> BenchResult<Self> {
        Self::with_executor(config, SystemExecutor)
    }

    pub fn with_executor(
        config: BenchRunConfig,
        executor: impl CommandExecutor + 'static,
    ) -> BenchResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            executor: Box::new(executor),
        })
    }

    pub fn config(&self) -> &BenchRunConfig {
        &self.config
    }

    pub fn cases(&self) -> Vec<BenchCase> {
        self.config.cases()
    }

    pub fn invocation(&self, case: &BenchCase) -> FioInvocation {
        FioInvocation::for_case(&self.config.tool, case)
    }

    /// Run all cases. A failing case never stops the run; only failing to
    /// create the output directory does.
    pub fn run(&self) -> BenchResult<RunSummary> {
        fs::create_dir_all(&self.config.output_dir)?;

        let cases = self.cases();
        tracing::info!(
            "Running {} benchmark cases with {}",
            cases.len(),
            self.config.tool
        );

        let mut summary = RunSummary::new(self.config.tool.clone());
        for case in &cases {
            summary.add_case(self.run_case(case));
        }

        let summary_file = self.config.output_dir.join(&self.config.run_summary_filename);
        match serde_json::to_string_pretty(&summary) {
            Ok(output_str) => match fs::write(&summary_file, output_str) {
                Ok(_) => tracing::info!("Wrote run summary to {}", summary_file.display()),
                Err(e) => tracing::error!(
                    "Failed to write run summary to {}: {}",
                    summary_file.display(),
                    e
                ),
            },
            Err(e) => tracing::error!("Failed to serialize run results: {}", e),
        }

        tracing::info!("Benchmark run finished: {}", summary);
        Ok(summary)
    }

    pub fn run_case(&self, case: &BenchCase) -> CaseResult {
        tracing::info!(
            "Starting test on device {} | mode: {}",
            case.device_path(),
            case.mode.label
        );

        let invocation = self.invocation(case);
        tracing::debug!("Command: {}", invocation.command_line());

        let started_at = Utc::now();
        let start = Instant::now();
        let output = self
            .executor
            .execute(&invocation)
            .unwrap_or_else(|e| InvocationOutput {
                exit_code: -1,
                stdout: String::new(),
                stderr: e.to_string(),
            });
        let duration_ms = start.elapsed().as_millis();

        let outcome = CaseOutcome::from(evaluate(case, &output));
        match &outcome {
            CaseOutcome::Passed => tracing::info!("{} passed", case.name()),
            CaseOutcome::Failed { message, .. } => {
                tracing::warn!("{} failed: {}", case.name(), message)
            }
        }

        let result = CaseResult {
            device: case.device.clone(),
            mode: case.mode.label.clone(),
            workload: case.mode.workload.clone(),
            command: invocation.command_line(),
            exit_code: output.exit_code,
            outcome,
            iops: extract_iops(&output.stdout),
            started_at,
            duration_ms,
        };

        self.save_attachments(case, &output, &result);
        result
    }

    fn save_attachments(&self, case: &BenchCase, output: &InvocationOutput, result: &CaseResult) {
        let work_dir = match CaseWorkDir::create(&self.config.output_dir, case) {
            Ok(dir) => dir,
            Err(e) => {
                tracing::error!("Failed to create directory for {}: {}", case.name(), e);
                return;
            }
        };

        if let Err(e) = work_dir.attach(STDOUT_ATTACHMENT, &output.stdout) {
            tracing::error!("Failed to attach stdout for {}: {}", case.name(), e);
        }
        let stderr = if output.exit_code != 0 {
            work_dir.attach(STDERR_ATTACHMENT, &output.stderr).map(|_| ())
        } else {
            work_dir.detach(STDERR_ATTACHMENT)
        };
        if let Err(e) = stderr {
            tracing::error!("Failed to update stderr attachment for {}: {}", case.name(), e);
        }

        match work_dir.attach_json(&self.config.case_result_filename, result) {
            Ok(result_file) => {
                if let Some(cmd) = &self.config.post_process_cmd {
                    run_post_process(cmd, &result_file);
                }
            }
            Err(e) => tracing::error!("Failed to write result for {}: {}", case.name(), e),
        }
    }
}
