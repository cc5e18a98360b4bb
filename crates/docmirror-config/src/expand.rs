//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a string.
///
/// Strings without `${` are returned unchanged, so bare `$VAR` and URLs
/// containing `$` pass through literally.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var)
            .map(Some)
            .map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Name of a referenced variable that is not set.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_with_default_uses_value() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("DOCMIRROR_TEST_BRANCH", "main");
        }
        let result = expand_env("${DOCMIRROR_TEST_BRANCH:-master}", "remote.branch").unwrap();
        assert_eq!(result, "main");
        unsafe {
            std::env::remove_var("DOCMIRROR_TEST_BRANCH");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("DOCMIRROR_UNSET_TEST");
        }
        let result = expand_env("${DOCMIRROR_UNSET_TEST:-fallback}", "remote.api_url").unwrap();
        assert_eq!(result, "fallback");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("DOCMIRROR_MISSING_TEST");
        }
        let err = expand_env("${DOCMIRROR_MISSING_TEST}", "remote.access_token").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("DOCMIRROR_MISSING_TEST"));
        assert!(err.to_string().contains("remote.access_token"));
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("DOCMIRROR_HOST_TEST", "ghe.example.com");
        }
        let result = expand_env("https://${DOCMIRROR_HOST_TEST}/api/v3", "remote.api_url").unwrap();
        assert_eq!(result, "https://ghe.example.com/api/v3");
        unsafe {
            std::env::remove_var("DOCMIRROR_HOST_TEST");
        }
    }

    #[test]
    fn test_literals_unchanged() {
        assert_eq!(expand_env("plain", "f").unwrap(), "plain");
        assert_eq!(expand_env("$VAR", "f").unwrap(), "$VAR");
        assert_eq!(
            expand_env("https://example.com/$path", "f").unwrap(),
            "https://example.com/$path"
        );
    }
}
