/// Output side of vowtrack: the CSV dataset and the run summary.

pub mod summary;
pub mod table;

pub use summary::{BatchSummary, FailedFile};
pub use table::{read_table, write_table};
