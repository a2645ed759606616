use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Int32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub kind: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub description: String,
    pub requires_replace: bool,
}

impl Attribute {
    fn new(kind: AttributeType, required: bool) -> Self {
        Attribute {
            kind,
            required,
            optional: !required,
            description: String::new(),
            requires_replace: false,
        }
    }

    pub fn required_string() -> Self {
        Self::new(AttributeType::String, true)
    }

    pub fn optional_string() -> Self {
        Self::new(AttributeType::String, false)
    }

    pub fn required_int32() -> Self {
        Self::new(AttributeType::Int32, true)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Changing this attribute destroys and recreates the resource instead of
    /// updating it in place.
    pub fn requires_replace(mut self) -> Self {
        self.requires_replace = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    #[cfg(test)]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Names of requires-replace attributes whose value differs between
    /// `prior` and `planned`, in attribute order.
    pub fn requires_replace(&self, prior: &Value, planned: &Value) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|(_, attribute)| attribute.requires_replace)
            .filter(|(name, _)| {
                prior.get(name.as_str()).unwrap_or(&Value::Null)
                    != planned.get(name.as_str()).unwrap_or(&Value::Null)
            })
            .map(|(name, _)| name.clone())
            .collect()
    }
}
