use crate::utils::error::{AeError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(AeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(AeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// Unix socket 路徑在 Linux 上最長 107 bytes
pub fn validate_socket_path(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;
    if path.len() > 107 {
        return Err(AeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: format!("Socket path is too long ({} bytes, max 107)", path.len()),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(AeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_socket_path() {
        assert!(validate_socket_path("kateri.socket", "/tmp/kateri.socket").is_ok());
        assert!(validate_socket_path("kateri.socket", "").is_err());
        assert!(validate_socket_path("kateri.socket", &"x".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("pdf.width", 800.0, 1.0, 10000.0).is_ok());
        assert!(validate_range("pdf.width", 0.0, 1.0, 10000.0).is_err());
    }
}
