pub mod constants;
pub mod numeric;
pub mod progress;

pub use constants::*;
pub use numeric::{round2, round_to, scale_onto_array};
pub use progress::ProgressReporter;
