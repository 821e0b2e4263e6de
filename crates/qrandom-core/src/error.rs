use thiserror::Error;

/// Errors surfaced synchronously when building a pool.
///
/// Steady-state failures never show up here: a failed refill is logged by
/// the scheduler and absorbed.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("setting {key} is not defined and has no default")]
    MissingSetting { key: &'static str },

    #[error("invalid value for {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error("runtime error: {0}")]
    Runtime(String),
}

pub type PoolResult<T> = Result<T, PoolError>;

/// Errors produced by an [`EntropySource`](crate::EntropySource) fetch.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport failed: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("entropy service answered {code}: {body}")]
    Status { code: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("entropy service rejected the request: {0}")]
    Rejected(String),

    #[error("source panicked during fetch")]
    Panicked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_setting_names_the_key() {
        let err = PoolError::MissingSetting {
            key: "QRYPT_API_URL",
        };
        assert_eq!(
            err.to_string(),
            "setting QRYPT_API_URL is not defined and has no default"
        );
    }

    #[test]
    fn status_error_carries_code_and_body() {
        let err = SourceError::Status {
            code: 401,
            body: "bad token".into(),
        };
        assert_eq!(err.to_string(), "entropy service answered 401: bad token");
    }
}
