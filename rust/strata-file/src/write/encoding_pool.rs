//! Worker pool for encoding the columns of a row group concurrently.

use std::sync::Arc;

use strata_common::error::ErrorKind;

/// Creates a dedicated pool of `num_threads` encoding workers.
pub(crate) fn create(num_threads: usize) -> strata_common::Result<Arc<rayon::ThreadPool>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("strata_encode_{i}"))
        .build()
        .map_err(|e| ErrorKind::Other {
            context: format!("failed to start {num_threads} encoding threads"),
            source: Box::new(e),
        })?;
    Ok(Arc::new(pool))
}
