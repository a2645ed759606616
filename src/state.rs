use crate::error::ProviderError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tracked state of one resource instance. `None` means the host should stop
/// tracking it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(Option<Value>);

impl State {
    pub fn new(value: Value) -> Self {
        State(Some(value))
    }

    pub fn empty() -> Self {
        State(None)
    }

    pub fn get<T: DeserializeOwned>(&self) -> Result<T, ProviderError> {
        let value = self.0.as_ref().ok_or(ProviderError::MissingState)?;
        Ok(T::deserialize(value)?)
    }

    pub fn set<T: Serialize>(&mut self, model: &T) -> Result<(), ProviderError> {
        self.0 = Some(serde_json::to_value(model)?);
        Ok(())
    }

    /// Writes a single attribute, starting a new object if nothing is tracked.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<Value>) {
        let mut object = match self.0.take() {
            Some(Value::Object(object)) => object,
            _ => Map::new(),
        };
        object.insert(name.to_string(), value.into());
        self.0 = Some(Value::Object(object));
    }

    pub fn remove_resource(&mut self) {
        self.0 = None;
    }

    #[cfg(test)]
    pub fn is_removed(&self) -> bool {
        self.0.is_none()
    }

    pub fn into_value(self) -> Option<Value> {
        self.0
    }
}

/// Planned values for a create or update, or a provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan(Value);

impl Plan {
    pub fn new(value: Value) -> Self {
        Plan(value)
    }

    pub fn get<T: DeserializeOwned>(&self) -> Result<T, ProviderError> {
        Ok(T::deserialize(&self.0)?)
    }
}

pub type Config = Plan;
