pub mod cli_error;
pub mod cli_output;
pub mod collection;
pub mod credentials;
pub mod document;
pub mod exit_code;
pub mod file_entry;
pub mod forms;
pub mod ingest_outcome;
pub mod resource_id;
pub mod run_summary;
