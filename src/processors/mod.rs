pub mod comfort_classifier;
pub mod completeness_checker;
pub mod orchestrator;
pub mod shard_selector;
pub mod summary_builder;

pub use comfort_classifier::{ComfortClassifier, StationDays};
pub use completeness_checker::{CompletenessChecker, CompletenessReport};
pub use orchestrator::{Orchestrator, RunReport, StationOutcome};
pub use shard_selector::{prefix_patterns, shard_of, ShardSelector};
pub use summary_builder::{FinalizeOutcome, SummaryBuilder};
