pub mod types;

pub use types::{CaseOutcome, CaseResult, RunSummary};
