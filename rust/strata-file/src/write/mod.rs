pub mod artifact_writer;
pub mod file_writer;
pub mod options;
pub mod row_group_buffer;

mod encoding_pool;
