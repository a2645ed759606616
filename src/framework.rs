//! Capability contract between the host and the provider.
//!
//! The host configures a [`Provider`] once per session, then drives each
//! [`Resource`] through its lifecycle. Every call reports problems through
//! [`Diagnostics`] instead of failing the process.

use crate::diagnostics::Diagnostics;
use crate::schema::Schema;
use crate::state::{Config, Plan, State};
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

/// Whatever the provider hands its resources after configure. Each resource
/// downcasts it to the type it expects.
pub type ProviderData = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMetadata {
    pub type_name: String,
    pub version: String,
}

#[derive(Default)]
pub struct ConfigureResponse {
    pub diagnostics: Diagnostics,
    pub resource_data: Option<ProviderData>,
}

#[async_trait]
pub trait Provider: Send + Sync {
    fn metadata(&self) -> ProviderMetadata;

    fn schema(&self) -> Schema;

    async fn configure(&self, config: &Config) -> ConfigureResponse;

    fn resources(&self) -> Vec<Box<dyn Resource>>;
}

pub struct CreateRequest {
    pub plan: Plan,
}

pub struct ReadRequest {
    pub state: State,
}

pub struct UpdateRequest {
    pub plan: Plan,
    pub prior_state: State,
}

pub struct DeleteRequest {
    pub state: State,
}

pub struct ImportStateRequest {
    pub id: String,
}

/// The state the host should track after a lifecycle call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceResponse {
    pub state: State,
    pub diagnostics: Diagnostics,
}

impl ResourceResponse {
    pub fn with_state(state: State) -> Self {
        ResourceResponse {
            state,
            diagnostics: Diagnostics::new(),
        }
    }
}

#[async_trait]
pub trait Resource: Send + Sync {
    fn metadata(&self, provider_type_name: &str) -> String;

    fn schema(&self) -> Schema;

    fn configure(&mut self, provider_data: Option<&ProviderData>) -> Diagnostics;

    async fn create(&self, request: CreateRequest) -> ResourceResponse;

    async fn read(&self, request: ReadRequest) -> ResourceResponse;

    async fn update(&self, request: UpdateRequest) -> ResourceResponse;

    async fn delete(&self, request: DeleteRequest) -> ResourceResponse;

    async fn import_state(&self, request: ImportStateRequest) -> ResourceResponse;
}

/// Seeds a new record whose `attribute` holds the import identifier. A read
/// is expected to fill in everything else.
pub fn import_state_passthrough_id(
    attribute: &str,
    request: ImportStateRequest,
) -> ResourceResponse {
    let mut state = State::empty();
    state.set_attribute(attribute, request.id);
    ResourceResponse::with_state(state)
}
