//! Line-delimited JSON adapter standing in for the host's plugin transport.
//!
//! Each input line is one [`HostRequest`]; each produces exactly one output
//! line. A malformed line gets an error diagnostic back and the session goes
//! on. End of input ends the session.

use crate::diagnostics::Diagnostics;
use crate::framework::{
    CreateRequest, DeleteRequest, ImportStateRequest, Provider, ReadRequest, Resource,
    ResourceResponse, UpdateRequest,
};
use crate::schema::Schema;
use crate::state::{Config, Plan, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum HostRequest {
    GetSchema,
    Configure {
        #[serde(default)]
        config: Value,
    },
    Plan {
        type_name: String,
        #[serde(default)]
        prior_state: Option<Value>,
        proposed_state: Value,
    },
    Create {
        type_name: String,
        plan: Value,
    },
    Read {
        type_name: String,
        state: Value,
    },
    Update {
        type_name: String,
        plan: Value,
        prior_state: Value,
    },
    Delete {
        type_name: String,
        state: Value,
    },
    Import {
        type_name: String,
        id: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HostResponse {
    Schema {
        provider_type_name: String,
        provider_version: String,
        provider: Schema,
        resource_schemas: BTreeMap<String, Schema>,
    },
    Plan {
        requires_replace: Vec<String>,
        diagnostics: Diagnostics,
    },
    Resource {
        new_state: Option<Value>,
        diagnostics: Diagnostics,
    },
    Diagnostics {
        diagnostics: Diagnostics,
    },
}

impl From<ResourceResponse> for HostResponse {
    fn from(response: ResourceResponse) -> Self {
        HostResponse::Resource {
            new_state: response.state.into_value(),
            diagnostics: response.diagnostics,
        }
    }
}

fn error_response(summary: &str, detail: String) -> HostResponse {
    let mut diagnostics = Diagnostics::new();
    diagnostics.add_error(summary, detail);
    HostResponse::Diagnostics { diagnostics }
}

pub struct Host {
    provider: Box<dyn Provider>,
    resources: BTreeMap<String, Box<dyn Resource>>,
}

impl Host {
    pub fn new(provider: Box<dyn Provider>) -> Self {
        let type_name = provider.metadata().type_name;
        let resources = provider
            .resources()
            .into_iter()
            .map(|resource| (resource.metadata(&type_name), resource))
            .collect();
        Host {
            provider,
            resources,
        }
    }

    fn resource(&self, type_name: &str) -> Result<&dyn Resource, HostResponse> {
        self.resources
            .get(type_name)
            .map(|resource| resource.as_ref())
            .ok_or_else(|| {
                error_response(
                    "Unknown Resource Type",
                    format!("The provider does not implement {:?}.", type_name),
                )
            })
    }

    pub async fn handle(&mut self, request: HostRequest) -> HostResponse {
        match request {
            HostRequest::GetSchema => self.schema(),
            HostRequest::Configure { config } => self.configure(Config::new(config)).await,
            HostRequest::Plan {
                type_name,
                prior_state,
                proposed_state,
            } => match self.resource(&type_name) {
                Ok(resource) => HostResponse::Plan {
                    requires_replace: prior_state
                        .map(|prior| resource.schema().requires_replace(&prior, &proposed_state))
                        .unwrap_or_default(),
                    diagnostics: Diagnostics::new(),
                },
                Err(response) => response,
            },
            HostRequest::Create { type_name, plan } => match self.resource(&type_name) {
                Ok(resource) => resource
                    .create(CreateRequest {
                        plan: Plan::new(plan),
                    })
                    .await
                    .into(),
                Err(response) => response,
            },
            HostRequest::Read { type_name, state } => match self.resource(&type_name) {
                Ok(resource) => resource
                    .read(ReadRequest {
                        state: State::new(state),
                    })
                    .await
                    .into(),
                Err(response) => response,
            },
            HostRequest::Update {
                type_name,
                plan,
                prior_state,
            } => match self.resource(&type_name) {
                Ok(resource) => resource
                    .update(UpdateRequest {
                        plan: Plan::new(plan),
                        prior_state: State::new(prior_state),
                    })
                    .await
                    .into(),
                Err(response) => response,
            },
            HostRequest::Delete { type_name, state } => match self.resource(&type_name) {
                Ok(resource) => resource
                    .delete(DeleteRequest {
                        state: State::new(state),
                    })
                    .await
                    .into(),
                Err(response) => response,
            },
            HostRequest::Import { type_name, id } => match self.resource(&type_name) {
                Ok(resource) => resource.import_state(ImportStateRequest { id }).await.into(),
                Err(response) => response,
            },
        }
    }

    fn schema(&self) -> HostResponse {
        let metadata = self.provider.metadata();
        HostResponse::Schema {
            provider_type_name: metadata.type_name,
            provider_version: metadata.version,
            provider: self.provider.schema(),
            resource_schemas: self
                .resources
                .iter()
                .map(|(name, resource)| (name.clone(), resource.schema()))
                .collect(),
        }
    }

    async fn configure(&mut self, config: Config) -> HostResponse {
        let response = self.provider.configure(&config).await;
        let mut diagnostics = response.diagnostics;
        // A failed configure leaves every resource without a client.
        let resource_data = if diagnostics.has_error() {
            None
        } else {
            response.resource_data.as_ref()
        };
        for resource in self.resources.values_mut() {
            diagnostics.append(resource.configure(resource_data));
        }
        HostResponse::Diagnostics { diagnostics }
    }

    pub async fn handle_line(&mut self, line: &str) -> HostResponse {
        match serde_json::from_str::<HostRequest>(line) {
            Ok(request) => {
                debug!(?request, "handling request");
                self.handle(request).await
            }
            Err(error) => {
                warn!(%error, "malformed request");
                error_response("Malformed Request", error.to_string())
            }
        }
    }

    /// Serves requests from `reader` until end of input.
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("serving provider requests");
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            let response = self.handle_line(line.trim()).await;
            let mut encoded = serde_json::to_vec(&response)?;
            encoded.push(b'\n');
            writer.write_all(&encoded).await?;
            writer.flush().await?;
        }
        info!("end of input, shutting down");
        Ok(())
    }
}
