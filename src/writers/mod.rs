pub mod summary_writer;

pub use summary_writer::{SummaryRow, SummaryWriter};
