pub mod benchmark_runner;
pub mod fio;

// Re-export for easier usage
pub use benchmark_runner::BenchmarkRunner;
pub use fio::{CommandExecutor, FioInvocation, InvocationOutput, SystemExecutor};
