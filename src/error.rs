use rusoto_core::credential::CredentialsError;
use rusoto_core::request::TlsError;
use rusoto_core::RusotoError;
use rusoto_lambda::{GetFunctionConcurrencyError, PutFunctionConcurrencyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("not a valid AWS region: {0:?}")]
    InvalidRegion(String),
    #[error("failed to build credentials provider: {0}")]
    Credentials(#[from] CredentialsError),
    #[error("failed to build http client: {0}")]
    Tls(#[from] TlsError),
    #[error(transparent)]
    PutConcurrency(#[from] RusotoError<PutFunctionConcurrencyError>),
    #[error(transparent)]
    GetConcurrency(#[from] RusotoError<GetFunctionConcurrencyError>),
    #[error("reserved concurrent executions {0} does not fit in a 32-bit integer")]
    OutOfRange(i64),
    #[error("no resource state is present")]
    MissingState,
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use crate::error::ProviderError;
    use rusoto_core::RusotoError;
    use rusoto_lambda::PutFunctionConcurrencyError;

    #[test]
    fn test_out_of_range_message() {
        assert_eq!(
            ProviderError::OutOfRange(4_294_967_296).to_string(),
            "reserved concurrent executions 4294967296 does not fit in a 32-bit integer"
        );
    }

    #[test]
    fn test_rusoto_error_text_is_kept() {
        let error = ProviderError::from(RusotoError::<PutFunctionConcurrencyError>::Validation(
            "function name is empty".to_string(),
        ));
        assert!(matches!(error, ProviderError::PutConcurrency(_)));
        assert_eq!(error.to_string(), "function name is empty");
    }

    #[test]
    fn test_invalid_region_message() {
        assert_eq!(
            ProviderError::InvalidRegion("not-a-region".to_string()).to_string(),
            "not a valid AWS region: \"not-a-region\""
        );
    }
}
