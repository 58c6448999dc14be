#[macro_export]
macro_rules! verify {
    ($expr:expr) => {{
        let result = $expr;
        $crate::utils::verify(result, stringify!($expr))?;
    }};
}

pub fn verify(predicate: bool, condition: &str) -> std::io::Result<()> {
    if predicate {
        Ok(())
    } else {
        Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            condition,
        ))
    }
}

/// Clamps `range` to an object of the given `size`. Returns an empty range
/// when the start lies at or beyond the end.
pub fn clamp_range(range: std::ops::Range<u64>, size: u64) -> std::ops::Range<u64> {
    if range.start >= size || range.start >= range.end {
        return 0..0;
    }
    range.start..range.end.min(size)
}

#[cfg(test)]
mod tests {
    use super::clamp_range;

    #[test]
    fn test_clamp_range() {
        assert_eq!(clamp_range(0..10, 100), 0..10);
        assert_eq!(clamp_range(90..110, 100), 90..100);
        assert_eq!(clamp_range(100..110, 100), 0..0);
        assert_eq!(clamp_range(5..5, 100), 0..0);
    }
}
