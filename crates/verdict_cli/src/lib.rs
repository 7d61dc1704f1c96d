//! Command-line client pieces: upload validation, the HTTP client and
//! terminal output.

pub mod client;
pub mod report;
pub mod settings;
pub mod upload;
