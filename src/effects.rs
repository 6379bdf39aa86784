// Rule effects: what a rule does to the resources it selects.
//
// A rule carries exactly one of four effects. The bodies are only inspected
// far enough to tell whether they are set; everything the validators don't
// reason about is kept as opaque JSON so documents round-trip unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Modifies matching resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_strategic_merge: Option<Value>,
    #[serde(default, skip_serializing_if = "String::is_empty", rename = "patchesJson6902")]
    pub patches_json6902: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreach: Vec<Value>,
    /// Keys not modelled above, kept verbatim.
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl Mutation {
    pub fn is_empty(&self) -> bool {
        self.patch_strategic_merge.is_none()
            && self.patches_json6902.is_empty()
            && self.targets.is_empty()
            && self.foreach.is_empty()
            && self.extra.is_empty()
    }
}

/// Checks matching resources against a pattern or deny condition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_pattern: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreach: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_security: Option<Value>,
    /// Keys not modelled above, kept verbatim.
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl Validation {
    pub fn is_empty(&self) -> bool {
        self.message.is_empty()
            && self.pattern.is_none()
            && self.any_pattern.is_none()
            && self.deny.is_none()
            && self.foreach.is_empty()
            && self.pod_security.is_none()
            && self.extra.is_empty()
    }
}

/// Creates a new resource when a matching resource is admitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synchronize: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clone: Option<Value>,
    /// Keys not modelled above, kept verbatim.
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl Generation {
    pub fn is_empty(&self) -> bool {
        self.api_version.is_empty()
            && self.kind.is_empty()
            && self.name.is_empty()
            && self.namespace.is_empty()
            && !self.synchronize
            && self.data.is_none()
            && self.clone.is_none()
            && self.extra.is_empty()
    }
}

/// Verifies image signatures and attestations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageVerification {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_references: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attestors: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attestations: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutate_digest: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_digest: Option<bool>,
    /// Keys not modelled above, kept verbatim.
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl ImageVerification {
    pub fn is_empty(&self) -> bool {
        self.image_references.is_empty()
            && self.attestors.is_empty()
            && self.attestations.is_empty()
            && self.mutate_digest.is_none()
            && self.verify_digest.is_none()
            && self.extra.is_empty()
    }
}
