use crate::utils::error::{EtlError, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static BUCKET_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9._-]{1,61}[a-z0-9]$").expect("valid regex"));

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> EtlError {
    EtlError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_required<'a>(field_name: &str, value: &'a Option<String>) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(EtlError::MissingConfigError {
            field: field_name.to_string(),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
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
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// Cloud Storage bucket naming rules, without the dotted-name length exceptions.
pub fn validate_gcs_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(invalid(
            field_name,
            bucket_name,
            "Bucket name must be between 3 and 63 characters",
        ));
    }

    if !BUCKET_NAME.is_match(bucket_name) {
        return Err(invalid(
            field_name,
            bucket_name,
            "Bucket name may only contain lowercase letters, digits, '-', '_' and '.', \
             and must start and end with a letter or digit",
        ));
    }

    Ok(())
}

pub fn validate_object_name(field_name: &str, name: &str) -> Result<()> {
    validate_path(field_name, name)?;

    if name.ends_with('/') {
        return Err(invalid(field_name, name, "Object name must not end with '/'"));
    }

    if name.len() > 1024 {
        return Err(invalid(
            field_name,
            name,
            "Object name must be at most 1024 bytes",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("resolver_url", "https://dns.google/resolve").is_ok());
        assert!(validate_url("resolver_url", "http://127.0.0.1:8080/resolve").is_ok());
        assert!(validate_url("resolver_url", "").is_err());
        assert!(validate_url("resolver_url", "invalid-url").is_err());
        assert!(validate_url("resolver_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_gcs_bucket_name() {
        assert!(validate_gcs_bucket_name("bucket", "leads-2024").is_ok());
        assert!(validate_gcs_bucket_name("bucket", "my_bucket.data").is_ok());
        assert!(validate_gcs_bucket_name("bucket", "ab").is_err());
        assert!(validate_gcs_bucket_name("bucket", "Upper-Case").is_err());
        assert!(validate_gcs_bucket_name("bucket", "-leading").is_err());
        assert!(validate_gcs_bucket_name("bucket", "trailing_").is_err());
    }

    #[test]
    fn test_validate_object_name() {
        assert!(validate_object_name("input_csv", "exports/leads.csv").is_ok());
        assert!(validate_object_name("input_csv", "").is_err());
        assert!(validate_object_name("input_csv", "exports/").is_err());
    }

    #[test]
    fn test_validate_required() {
        assert_eq!(
            validate_required("bucket", &Some("b".to_string())).unwrap(),
            "b"
        );
        assert!(validate_required("bucket", &Some("  ".to_string())).is_err());
        assert!(validate_required("bucket", &None).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("concurrency", 10, 1, 100).is_ok());
        assert!(validate_range("concurrency", 0, 1, 100).is_err());
    }
}
