use std::path::Path;
use std::process::Command;

/// Run `<cmd> <result_file>` and wait for it. Failures are logged only.
pub fn run_post_process(cmd: &Path, result_file: &Path) {
    tracing::info!("Running post-process command: {:?}", cmd);

    match Command::new(cmd).arg(result_file).status() {
        Ok(status) if status.success() => {}
        Ok(status) => tracing::warn!("Post-process command {:?} exited with {}", cmd, status),
        Err(e) => tracing::error!("Failed to run post-process command {:?}: {}", cmd, e),
    }
}
