pub mod error;
pub mod load;
pub mod pipeline;
pub mod structs;
pub mod transform;

// Re-export public API
pub use error::{PipelineError, Result};
pub use load::{read_dataset, write_csv, write_json, write_pdf};
pub use pipeline::{OutputPaths, process_entry, run_batch};
pub use structs::{Dataset, DatasetKind, FieldValue, JobEntry, JobState, Record, SimpleLogger};
pub use transform::correct_dataset;
