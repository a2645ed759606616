use crate::error::ProviderError;
use async_trait::async_trait;

use rusoto_core::credential::DefaultCredentialsProvider;
use rusoto_core::{HttpClient, Region};
use rusoto_lambda::{
    GetFunctionConcurrencyRequest, Lambda, LambdaClient, PutFunctionConcurrencyRequest,
};

use std::convert::TryFrom;
use std::str::FromStr;

/// The two Lambda operations the concurrency resource needs.
///
/// Both return the reserved concurrency AWS reports for the function. A
/// function without a reservation reports `0`.
#[async_trait]
pub trait ConcurrencyApi: Send + Sync {
    async fn put_function_concurrency(
        &self,
        function_name: &str,
        reserved_concurrent_executions: i32,
    ) -> Result<i32, ProviderError>;

    async fn get_function_concurrency(&self, function_name: &str) -> Result<i32, ProviderError>;
}

pub struct LambdaConcurrencyClient {
    client: LambdaClient,
}

#[async_trait]
impl ConcurrencyApi for LambdaConcurrencyClient {
    async fn put_function_concurrency(
        &self,
        function_name: &str,
        reserved_concurrent_executions: i32,
    ) -> Result<i32, ProviderError> {
        let concurrency = self
            .client
            .put_function_concurrency(PutFunctionConcurrencyRequest {
                function_name: function_name.to_string(),
                reserved_concurrent_executions: i64::from(reserved_concurrent_executions),
            })
            .await?;
        Self::to_model_value(concurrency.reserved_concurrent_executions)
    }

    async fn get_function_concurrency(&self, function_name: &str) -> Result<i32, ProviderError> {
        let concurrency = self
            .client
            .get_function_concurrency(GetFunctionConcurrencyRequest {
                function_name: function_name.to_string(),
            })
            .await?;
        Self::to_model_value(concurrency.reserved_concurrent_executions)
    }
}

impl LambdaConcurrencyClient {
    pub fn new_with_client(client: LambdaClient) -> Self {
        LambdaConcurrencyClient { client }
    }

    /// Builds a client for `region`, or for the region the environment names
    /// when none is given. See [`resolve_region`].
    pub fn from_region(region: Option<&str>) -> Result<Self, ProviderError> {
        let region = resolve_region(region, |variable| std::env::var(variable).ok())?;
        let dispatcher = HttpClient::new()?;
        let credentials = DefaultCredentialsProvider::new()?;
        Ok(Self::new_with_client(LambdaClient::new_with(
            dispatcher,
            credentials,
            region,
        )))
    }

    fn to_model_value(value: Option<i64>) -> Result<i32, ProviderError> {
        let value = value.unwrap_or_default();
        i32::try_from(value).map_err(|_| ProviderError::OutOfRange(value))
    }
}

const REGION_VARIABLES: [&'static str; 2] = ["AWS_DEFAULT_REGION", "AWS_REGION"];

/// Picks the client region: the explicit name, then `AWS_DEFAULT_REGION`,
/// then `AWS_REGION`. Only when none is set does rusoto's profile lookup
/// apply. A set but malformed name is an error, never a fallback.
pub fn resolve_region<F>(explicit: Option<&str>, variable: F) -> Result<Region, ProviderError>
where
    F: Fn(&str) -> Option<String>,
{
    let name = explicit
        .map(str::to_string)
        .or_else(|| REGION_VARIABLES.iter().find_map(|name| variable(*name)));
    match name {
        Some(name) => parse_region(&name),
        None => Ok(Region::default()),
    }
}

/// Regions rusoto was built without get a custom endpoint.
pub fn parse_region(name: &str) -> Result<Region, ProviderError> {
    if let Ok(region) = Region::from_str(name) {
        return Ok(region);
    }
    if !is_region_name(name) {
        return Err(ProviderError::InvalidRegion(name.to_string()));
    }
    let domain = if name.starts_with("cn-") {
        "amazonaws.com.cn"
    } else {
        "amazonaws.com"
    };
    Ok(Region::Custom {
        name: name.to_string(),
        endpoint: format!("https://lambda.{}.{}", name, domain),
    })
}

// e.g. `ap-southeast-5`, `us-gov-west-1`
fn is_region_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('-').collect();
    let well_formed = parts.iter().all(|part| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    });
    let numbered = parts
        .last()
        .map_or(false, |part| part.chars().all(|c| c.is_ascii_digit()));
    parts.len() >= 3 && well_formed && numbered
}

#[cfg(test)]
mod tests {
    use crate::error::ProviderError;
    use crate::lambda_concurrency_client::{
        parse_region, resolve_region, ConcurrencyApi, LambdaConcurrencyClient,
    };
    use rusoto_core::signature::SignedRequest;
    use rusoto_core::Region;
    use rusoto_lambda::LambdaClient;
    use rusoto_mock::{
        MockCredentialsProvider, MockRequestDispatcher, MockResponseReader, ReadMockResponse,
    };

    fn mock_client(dispatcher: MockRequestDispatcher) -> LambdaConcurrencyClient {
        LambdaConcurrencyClient::new_with_client(LambdaClient::new_with(
            dispatcher,
            MockCredentialsProvider,
            Region::UsEast1,
        ))
    }

    #[tokio::test]
    async fn test_put_function_concurrency() {
        let dispatcher = MockRequestDispatcher::default()
            .with_body(&*MockResponseReader::read_response(
                "test_resources/valid",
                "put_function_concurrency.json",
            ))
            .with_request_checker(|request: &SignedRequest| {
                assert_eq!(request.method, "PUT");
                assert!(request.path.ends_with("/functions/fn-a/concurrency"));
            });

        let client = mock_client(dispatcher);
        let result = client.put_function_concurrency("fn-a", 5).await;

        assert_eq!(result.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_put_function_concurrency_error() {
        let dispatcher = MockRequestDispatcher::with_status(404).with_body(
            &*MockResponseReader::read_response("test_resources/error", "function_not_found.json"),
        );

        let client = mock_client(dispatcher);
        let result = client.put_function_concurrency("missing", 5).await;

        assert!(matches!(result, Err(ProviderError::PutConcurrency(_))));
    }

    #[tokio::test]
    async fn test_get_function_concurrency() {
        let dispatcher = MockRequestDispatcher::default()
            .with_body(&*MockResponseReader::read_response(
                "test_resources/valid",
                "get_function_concurrency.json",
            ))
            .with_request_checker(|request: &SignedRequest| {
                assert_eq!(request.method, "GET");
                assert!(request.path.ends_with("/functions/fn-a/concurrency"));
            });

        let client = mock_client(dispatcher);
        let result = client.get_function_concurrency("fn-a").await;

        assert_eq!(result.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_get_function_concurrency_without_reservation() {
        let dispatcher = MockRequestDispatcher::default().with_body("{}");

        let client = mock_client(dispatcher);
        let result = client.get_function_concurrency("fn-a").await;

        assert_eq!(result.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_function_concurrency_error() {
        let dispatcher = MockRequestDispatcher::with_status(404).with_body(
            &*MockResponseReader::read_response("test_resources/error", "function_not_found.json"),
        );

        let client = mock_client(dispatcher);
        let result = client.get_function_concurrency("missing").await;

        assert!(matches!(result, Err(ProviderError::GetConcurrency(_))));
    }

    #[test]
    fn test_to_model_value_out_of_range() {
        let result = LambdaConcurrencyClient::to_model_value(Some(i64::from(i32::MAX) + 1));
        assert!(matches!(result, Err(ProviderError::OutOfRange(2_147_483_648))));
    }

    #[test]
    fn test_from_region_rejects_malformed_region() {
        let result = LambdaConcurrencyClient::from_region(Some("not-a-region"));
        assert!(matches!(result, Err(ProviderError::InvalidRegion(_))));
    }

    #[test]
    fn test_parse_known_region() {
        assert_eq!(parse_region("eu-west-1").unwrap(), Region::EuWest1);
    }

    #[test]
    fn test_parse_region_newer_than_rusoto() {
        for name in &["ap-southeast-5", "ca-west-1", "il-central-1", "mx-central-1"] {
            assert_eq!(
                parse_region(name).unwrap(),
                Region::Custom {
                    name: name.to_string(),
                    endpoint: format!("https://lambda.{}.amazonaws.com", name),
                }
            );
        }
    }

    #[test]
    fn test_parse_china_region_endpoint() {
        assert_eq!(
            parse_region("cn-southwest-2").unwrap(),
            Region::Custom {
                name: "cn-southwest-2".to_string(),
                endpoint: "https://lambda.cn-southwest-2.amazonaws.com.cn".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_region_rejects_malformed_names() {
        for name in &["", "not-a-region", "US_EAST_1", "us-east-", "us east 1", "us-east"] {
            assert!(
                matches!(parse_region(name), Err(ProviderError::InvalidRegion(_))),
                "{:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_resolve_region_prefers_explicit_name() {
        let region = resolve_region(Some("eu-west-1"), |_| Some("us-west-2".to_string()));
        assert_eq!(region.unwrap(), Region::EuWest1);
    }

    #[test]
    fn test_resolve_region_from_environment() {
        let region = resolve_region(None, |variable| match variable {
            "AWS_REGION" => Some("ap-northeast-1".to_string()),
            _ => None,
        });
        assert_eq!(region.unwrap(), Region::ApNortheast1);
    }

    #[test]
    fn test_resolve_region_default_region_variable_wins() {
        let region = resolve_region(None, |variable| match variable {
            "AWS_DEFAULT_REGION" => Some("eu-central-1".to_string()),
            "AWS_REGION" => Some("us-west-2".to_string()),
            _ => None,
        });
        assert_eq!(region.unwrap(), Region::EuCentral1);
    }

    #[test]
    fn test_resolve_region_rejects_malformed_environment() {
        let region = resolve_region(None, |variable| match variable {
            "AWS_DEFAULT_REGION" => Some("not-a-region".to_string()),
            _ => None,
        });
        assert!(matches!(region, Err(ProviderError::InvalidRegion(_))));
    }
}
