use crate::concurrency_resource::ConcurrencyResource;
use crate::framework::{ConfigureResponse, Provider, ProviderData, ProviderMetadata, Resource};
use crate::lambda_concurrency_client::{ConcurrencyApi, LambdaConcurrencyClient};
use crate::schema::{Attribute, Schema};
use crate::state::Config;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

pub const PROVIDER_TYPE_NAME: &str = "lambdaconfig";

#[derive(Debug, Default, Deserialize)]
pub struct LambdaconfigProviderModel {
    #[serde(default)]
    pub region: Option<String>,
}

pub struct LambdaconfigProvider {
    version: String,
}

impl LambdaconfigProvider {
    pub fn new(version: impl Into<String>) -> Self {
        LambdaconfigProvider {
            version: version.into(),
        }
    }
}

#[async_trait]
impl Provider for LambdaconfigProvider {
    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: PROVIDER_TYPE_NAME.to_string(),
            version: self.version.clone(),
        }
    }

    fn schema(&self) -> Schema {
        Schema::new().with_attribute(
            "region",
            Attribute::optional_string().with_description("The region to use."),
        )
    }

    async fn configure(&self, config: &Config) -> ConfigureResponse {
        let mut response = ConfigureResponse::default();
        let data = match config.get::<Option<LambdaconfigProviderModel>>() {
            Ok(data) => data.unwrap_or_default(),
            Err(error) => {
                response
                    .diagnostics
                    .add_error("Unable to Decode Provider Configuration", error.to_string());
                return response;
            }
        };

        let client = match LambdaConcurrencyClient::from_region(data.region.as_deref()) {
            Ok(client) => client,
            Err(err) => {
                error!(region = ?data.region, error = %err, "unable to load AWS config");
                response
                    .diagnostics
                    .add_error("Unable to Load AWS config", err.to_string());
                return response;
            }
        };
        info!(region = ?data.region, "configured lambda client");

        let client: Arc<dyn ConcurrencyApi> = Arc::new(client);
        let resource_data: ProviderData = Arc::new(client);
        response.resource_data = Some(resource_data);
        response
    }

    fn resources(&self) -> Vec<Box<dyn Resource>> {
        vec![Box::new(ConcurrencyResource::new())]
    }
}
