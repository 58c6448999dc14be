pub type Result<T> = std::result::Result<T, crate::error::Error>;

#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

#[macro_export]
macro_rules! verify_data {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_data(result, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[inline]
pub fn verify_data(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        corrupt_data(name, condition)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.trim_matches('"').to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cold]
pub fn corrupt_data(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::CorruptFile {
        element: name.trim_matches('"').to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    fn check_len(buf: &[u8]) -> crate::Result<()> {
        verify_data!("trailer", buf.len() >= 8);
        Ok(())
    }

    fn check_size(size: usize) -> crate::Result<()> {
        verify_arg!(size, size > 0);
        Ok(())
    }

    #[test]
    fn test_verify_macros() {
        assert!(check_len(&[0u8; 8]).is_ok());
        let err = check_len(&[0u8; 3]).unwrap_err();
        assert!(err.is_corrupt_file());
        assert!(err.to_string().contains("trailer"));

        assert!(check_size(1).is_ok());
        let err = check_size(0).unwrap_err();
        assert!(err.to_string().contains("size > 0"));
    }
}
