use crate::diagnostics::Diagnostics;
use crate::framework::{
    import_state_passthrough_id, CreateRequest, DeleteRequest, ImportStateRequest, ProviderData,
    ReadRequest, Resource, ResourceResponse, UpdateRequest,
};
use crate::lambda_concurrency_client::ConcurrencyApi;
use crate::schema::{Attribute, Schema};
use crate::state::{Plan, State};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

const PUT_ERROR_SUMMARY: &str = "Error Putting Lambda function concurrency";
const READ_ERROR_SUMMARY: &str = "Error Reading Lambda function concurrency";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcurrencyResourceModel {
    pub function_name: String,
    pub reserved_concurrent_executions: i32,
}

#[derive(Debug, Deserialize)]
struct TrackedFunction {
    function_name: String,
}

/// Manages the reserved concurrency of one Lambda function.
///
/// Deleting the resource only stops tracking it. The reservation stays in
/// place on the AWS side.
#[derive(Default)]
pub struct ConcurrencyResource {
    client: Option<Arc<dyn ConcurrencyApi>>,
}

impl ConcurrencyResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with_client(client: Arc<dyn ConcurrencyApi>) -> Self {
        ConcurrencyResource {
            client: Some(client),
        }
    }

    fn client(&self, diagnostics: &mut Diagnostics) -> Option<&Arc<dyn ConcurrencyApi>> {
        if self.client.is_none() {
            diagnostics.add_error(
                "Unconfigured Lambda Client",
                "The provider has not been configured. Please report this issue to the provider developers.",
            );
        }
        self.client.as_ref()
    }

    /// Create and update share this: the API is an idempotent set.
    async fn put_concurrency(&self, plan: &Plan, response: &mut ResourceResponse) {
        let mut model: ConcurrencyResourceModel = match plan.get() {
            Ok(model) => model,
            Err(error) => {
                response
                    .diagnostics
                    .add_error("Unable to Decode Plan", error.to_string());
                return;
            }
        };
        let client = match self.client(&mut response.diagnostics) {
            Some(client) => client,
            None => return,
        };

        info!(
            function_name = %model.function_name,
            reserved_concurrent_executions = model.reserved_concurrent_executions,
            "putting function concurrency"
        );
        let reserved = match client
            .put_function_concurrency(&model.function_name, model.reserved_concurrent_executions)
            .await
        {
            Ok(reserved) => reserved,
            Err(error) => {
                warn!(
                    function_name = %model.function_name,
                    %error,
                    "put function concurrency failed"
                );
                response
                    .diagnostics
                    .add_error(PUT_ERROR_SUMMARY, error.to_string());
                return;
            }
        };

        model.reserved_concurrent_executions = reserved;
        let mut state = State::empty();
        match state.set(&model) {
            Ok(()) => response.state = state,
            Err(error) => response
                .diagnostics
                .add_error("Unable to Encode State", error.to_string()),
        }
    }
}

#[async_trait]
impl Resource for ConcurrencyResource {
    fn metadata(&self, provider_type_name: &str) -> String {
        format!("{}_concurrency", provider_type_name)
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .with_attribute(
                "function_name",
                Attribute::required_string()
                    .with_description("Name of the lambda function.")
                    .requires_replace(),
            )
            .with_attribute(
                "reserved_concurrent_executions",
                Attribute::required_int32().with_description(
                    "Amount of reserved concurrent executions for this lambda function.",
                ),
            )
    }

    fn configure(&mut self, provider_data: Option<&ProviderData>) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        // No data means the provider is unconfigured or its configure failed,
        // so a client from an earlier configure must not be reused.
        self.client = None;
        let provider_data = match provider_data {
            Some(provider_data) => provider_data,
            None => return diagnostics,
        };

        match provider_data.downcast_ref::<Arc<dyn ConcurrencyApi>>() {
            Some(client) => self.client = Some(Arc::clone(client)),
            None => diagnostics.add_error(
                "Unexpected Resource Configure Type",
                "Expected a Lambda concurrency client. Please report this issue to the provider developers.",
            ),
        }
        diagnostics
    }

    async fn create(&self, request: CreateRequest) -> ResourceResponse {
        let mut response = ResourceResponse::default();
        self.put_concurrency(&request.plan, &mut response).await;
        response
    }

    async fn read(&self, request: ReadRequest) -> ResourceResponse {
        let mut response = ResourceResponse::with_state(request.state);
        let function_name = match response.state.get::<TrackedFunction>() {
            Ok(model) => model.function_name,
            Err(error) => {
                response
                    .diagnostics
                    .add_error("Unable to Decode State", error.to_string());
                return response;
            }
        };
        let client = match self.client(&mut response.diagnostics) {
            Some(client) => client,
            None => return response,
        };

        info!(function_name = %function_name, "reading function concurrency");
        match client.get_function_concurrency(&function_name).await {
            Ok(reserved) => {
                let model = ConcurrencyResourceModel {
                    function_name,
                    reserved_concurrent_executions: reserved,
                };
                if let Err(error) = response.state.set(&model) {
                    response
                        .diagnostics
                        .add_error("Unable to Encode State", error.to_string());
                }
            }
            Err(error) => {
                warn!(function_name = %function_name, %error, "get function concurrency failed");
                response
                    .diagnostics
                    .add_error(READ_ERROR_SUMMARY, error.to_string());
            }
        }
        response
    }

    async fn update(&self, request: UpdateRequest) -> ResourceResponse {
        let mut response = ResourceResponse::with_state(request.prior_state);
        self.put_concurrency(&request.plan, &mut response).await;
        response
    }

    async fn delete(&self, request: DeleteRequest) -> ResourceResponse {
        let mut response = ResourceResponse::with_state(request.state);
        info!("removing function concurrency from state, AWS reservation is left in place");
        response.state.remove_resource();
        response
    }

    async fn import_state(&self, request: ImportStateRequest) -> ResourceResponse {
        import_state_passthrough_id("function_name", request)
    }
}
