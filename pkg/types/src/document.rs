use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata fields populated by the API server that must not travel with a backup.
const SERVER_METADATA: &[&str] = &[
    "uid",
    "resourceVersion",
    "selfLink",
    "creationTimestamp",
    "generation",
    "managedFields",
];

/// One cluster resource instance as an opaque structured map.
///
/// Objects keep their keys sorted, so identical content always encodes to identical YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceDocument(Value);

impl ResourceDocument {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn kind(&self) -> Option<&str> {
        self.0.get("kind").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata_str("name")
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata_str("namespace")
    }

    fn metadata_str(&self, field: &str) -> Option<&str> {
        self.0
            .get("metadata")
            .and_then(|m| m.get(field))
            .and_then(Value::as_str)
    }

    /// Strip `status` and server-populated metadata so an unchanged resource
    /// serializes to the same bytes on every run.
    pub fn export(mut self) -> Self {
        if let Value::Object(map) = &mut self.0 {
            map.remove("status");
            if let Some(Value::Object(metadata)) = map.get_mut("metadata") {
                for field in SERVER_METADATA {
                    metadata.remove(*field);
                }
            }
        }
        self
    }

    /// Copy of this document placed into `namespace`.
    pub fn in_namespace(&self, namespace: &str) -> Self {
        let mut value = self.0.clone();
        if let Value::Object(map) = &mut value {
            let metadata = map
                .entry("metadata")
                .or_insert_with(|| Value::Object(Default::default()));
            if let Value::Object(metadata) = metadata {
                metadata.insert("namespace".to_string(), Value::String(namespace.to_string()));
            }
        }
        Self(value)
    }

    /// Encode as a single block-style YAML document.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.0)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content).map(Self)
    }
}

impl From<Value> for ResourceDocument {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
