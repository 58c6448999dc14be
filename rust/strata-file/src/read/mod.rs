pub mod artifact_reader;
pub mod file_reader;
pub mod options;
