pub mod bench_config;
pub mod errors;
pub mod reporting;
pub mod runners;
pub mod utilities;
pub mod work_dir;

// Re-export main components for easier use
pub use bench_config::{BenchCase, BenchMode, BenchRunConfig};
pub use errors::{BenchError, BenchResult, FailureKind};
pub use runners::BenchmarkRunner;
