use strata_common::error::Error;
use strata_encodings::EncodingPolicy;
use strata_format::defs::MAX_ROW_GROUP_ROWS;

/// Configuration of a [`FileWriter`](super::file_writer::FileWriter).
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Maximum number of rows in a row group, at most
    /// [`MAX_ROW_GROUP_ROWS`].
    pub row_group_size: usize,
    /// Estimated encoded size, in bytes, at which a row group is flushed even
    /// if it holds fewer than `row_group_size` rows.
    pub page_size: usize,
    /// Distinct value budget of a dictionary-encoded column chunk; a chunk
    /// over budget is written as PLAIN.
    pub dictionary_max_distinct: usize,
    /// Number of worker threads encoding the columns of a row group.
    /// `1` encodes on the calling thread.
    pub encoding_parallelism: usize,
    /// Whether column chunk statistics include min/max values.
    pub collect_min_max: bool,
    /// Writer identification recorded in the footer metadata.
    pub created_by: String,
}

impl WriterOptions {
    pub const DEFAULT_ROW_GROUP_SIZE: usize = 64 * 1024;
    pub const DEFAULT_PAGE_SIZE: usize = 8 * 1024 * 1024;
    pub const DEFAULT_DICTIONARY_MAX_DISTINCT: usize = 64 * 1024;

    pub fn with_row_group_size(mut self, row_group_size: usize) -> Self {
        self.row_group_size = row_group_size;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_dictionary_max_distinct(mut self, dictionary_max_distinct: usize) -> Self {
        self.dictionary_max_distinct = dictionary_max_distinct;
        self
    }

    pub fn with_encoding_parallelism(mut self, encoding_parallelism: usize) -> Self {
        self.encoding_parallelism = encoding_parallelism;
        self
    }

    pub fn with_collect_min_max(mut self, collect_min_max: bool) -> Self {
        self.collect_min_max = collect_min_max;
        self
    }

    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = created_by.into();
        self
    }

    pub fn validate(&self) -> strata_common::Result<()> {
        if self.row_group_size == 0 {
            return Err(Error::invalid_arg("row_group_size", "must be positive"));
        }
        if self.row_group_size as u64 > MAX_ROW_GROUP_ROWS {
            return Err(Error::invalid_arg(
                "row_group_size",
                format!("must not exceed {MAX_ROW_GROUP_ROWS}"),
            ));
        }
        if self.page_size == 0 {
            return Err(Error::invalid_arg("page_size", "must be positive"));
        }
        if self.encoding_parallelism == 0 {
            return Err(Error::invalid_arg("encoding_parallelism", "must be positive"));
        }
        Ok(())
    }

    pub fn encoding_policy(&self) -> EncodingPolicy {
        EncodingPolicy {
            dictionary_max_distinct: self.dictionary_max_distinct,
            collect_min_max: self.collect_min_max,
        }
    }
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            row_group_size: Self::DEFAULT_ROW_GROUP_SIZE,
            page_size: Self::DEFAULT_PAGE_SIZE,
            dictionary_max_distinct: Self::DEFAULT_DICTIONARY_MAX_DISTINCT,
            encoding_parallelism: 1,
            collect_min_max: true,
            created_by: format!("strata-file {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[cfg(test)]
mod tests {
    use strata_format::defs::MAX_ROW_GROUP_ROWS;

    use super::WriterOptions;

    #[test]
    fn test_validation() {
        assert!(WriterOptions::default().validate().is_ok());
        for options in [
            WriterOptions::default().with_row_group_size(0),
            WriterOptions::default().with_page_size(0),
            WriterOptions::default().with_encoding_parallelism(0),
        ] {
            let err = options.validate().unwrap_err();
            assert!(err.to_string().contains("must be positive"));
        }
        let err = WriterOptions::default()
            .with_row_group_size(MAX_ROW_GROUP_ROWS as usize + 1)
            .validate()
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(
            WriterOptions::default()
                .with_row_group_size(MAX_ROW_GROUP_ROWS as usize)
                .validate()
                .is_ok()
        );
        assert!(
            WriterOptions::default()
                .with_dictionary_max_distinct(0)
                .validate()
                .is_ok()
        );
    }
}
