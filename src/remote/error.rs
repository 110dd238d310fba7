//! Classification of octocrab errors into Hermes errors.

use crate::error::HermesError;

/// Seconds reported in `RateLimited`. Informational: the sync engine always
/// waits its configured cooldown.
pub const DEFAULT_RATE_LIMIT_SECS: u64 = 60;

/// Build a detailed error message from an octocrab GitHub error.
pub fn build_github_error_message(error: &octocrab::Error) -> String {
    match error {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code;
            let status_text = status.canonical_reason().unwrap_or("Unknown");
            let mut message = format!(
                "GitHub API error ({} {}): {}",
                status.as_u16(),
                status_text,
                source.message
            );

            if let Some(errors) = &source.errors
                && !errors.is_empty()
            {
                message.push_str("\n\nErrors:");
                for error in errors {
                    message.push_str(&format!("\n- {error}"));
                }
            }

            message
        }
        octocrab::Error::Http { source, .. } => format!("HTTP error: {source}"),
        octocrab::Error::Service { source, .. } => format!("Service error: {source}"),
        octocrab::Error::Serde { source, .. } => format!("Serialization error: {source}"),
        _ => format!("GitHub API error: {error}"),
    }
}

/// Whether a status code means "quota exhausted or forbidden".
pub fn is_rate_limit_status(status: http::StatusCode) -> bool {
    status == http::StatusCode::FORBIDDEN || status == http::StatusCode::TOO_MANY_REQUESTS
}

/// Check if an octocrab error is rate limited.
///
/// Returns true for 403 and 429 responses, and for errors whose message
/// mentions a rate limit.
pub fn is_github_rate_limited(error: &octocrab::Error) -> bool {
    if let octocrab::Error::GitHub { source, .. } = error {
        return is_rate_limit_status(source.status_code);
    }

    let error_msg = error.to_string().to_lowercase();
    error_msg.contains("rate limit")
}

/// Map an octocrab error onto the sync engine's failure classes.
pub fn classify_github_error(error: octocrab::Error, context: &str) -> HermesError {
    classify(is_github_rate_limited(&error), context, || {
        build_github_error_message(&error)
    })
}

fn classify(rate_limited: bool, context: &str, message: impl FnOnce() -> String) -> HermesError {
    if rate_limited {
        return HermesError::RateLimited(DEFAULT_RATE_LIMIT_SECS);
    }
    HermesError::Api(format!("{context}: {}", message()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_statuses() {
        assert!(is_rate_limit_status(http::StatusCode::FORBIDDEN));
        assert!(is_rate_limit_status(http::StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_rate_limit_status(http::StatusCode::NOT_FOUND));
        assert!(!is_rate_limit_status(http::StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_rate_limit_status(http::StatusCode::UNPROCESSABLE_ENTITY));
    }

    #[test]
    fn test_classify() {
        let err = classify(true, "update issue #7", || unreachable!());
        assert!(matches!(err, HermesError::RateLimited(DEFAULT_RATE_LIMIT_SECS)));

        let err = classify(false, "update issue #7", || "422 Unprocessable".to_string());
        match err {
            HermesError::Api(message) => assert_eq!(message, "update issue #7: 422 Unprocessable"),
            other => panic!("expected Api, got {other:?}"),
        }
    }
}
