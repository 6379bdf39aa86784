// A single policy rule: which resources it selects and what it does to them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::effects::{Generation, ImageVerification, Mutation, Validation};
use crate::selector::CompositeSelector;

/// Kubernetes caps rule names at this length.
pub const MAX_RULE_NAME_LEN: usize = 63;

/// Complete rule definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Unique within the owning policy
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Variables and data sources, carried opaquely
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<Value>,

    #[serde(default, rename = "match", skip_serializing_if = "CompositeSelector::is_empty")]
    pub match_resources: CompositeSelector,

    #[serde(default, rename = "exclude", skip_serializing_if = "CompositeSelector::is_empty")]
    pub exclude_resources: CompositeSelector,

    /// Raw any/all condition tree. Never evaluated here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preconditions: Option<Value>,

    #[serde(default, rename = "mutate", skip_serializing_if = "Mutation::is_empty")]
    pub mutation: Mutation,

    #[serde(default, rename = "validate", skip_serializing_if = "Validation::is_empty")]
    pub validation: Validation,

    #[serde(default, rename = "generate", skip_serializing_if = "Generation::is_empty")]
    pub generation: Generation,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verify_images: Vec<ImageVerification>,
}

impl Rule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn has_mutate(&self) -> bool {
        !self.mutation.is_empty()
    }

    pub fn has_validate(&self) -> bool {
        !self.validation.is_empty()
    }

    pub fn has_generate(&self) -> bool {
        !self.generation.is_empty()
    }

    pub fn has_verify_images(&self) -> bool {
        !self.verify_images.is_empty()
    }

    /// Kinds the rule can select, in declaration order.
    pub fn match_kinds(&self) -> Vec<String> {
        self.match_resources.kinds()
    }

    /// Kinds the rule carves out, in declaration order.
    pub fn exclude_kinds(&self) -> Vec<String> {
        self.exclude_resources.kinds()
    }

    /// True when either side uses an `all` list.
    pub fn uses_conjunctive_selectors(&self) -> bool {
        !self.match_resources.all.is_empty() || !self.exclude_resources.all.is_empty()
    }

    pub fn preconditions(&self) -> Option<&Value> {
        self.preconditions.as_ref()
    }

    pub fn set_preconditions(&mut self, conditions: Option<Value>) {
        self.preconditions = conditions;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::ResourceSelector;
    use serde_json::json;

    #[test]
    fn match_kinds_follow_declaration_order() {
        let mut rule = Rule::new("kinds");
        rule.match_resources = CompositeSelector {
            any: vec![ResourceSelector::builder().kinds(&["Deployment"]).build()],
            all: Vec::new(),
            direct: ResourceSelector::builder().kinds(&["Pod"]).build(),
        };
        assert_eq!(rule.match_kinds(), vec!["Pod", "Deployment"]);
        assert!(rule.exclude_kinds().is_empty());
    }

    #[test]
    fn parses_wire_field_names() {
        let rule: Rule = serde_json::from_value(json!({
            "name": "check-labels",
            "match": {"resources": {"kinds": ["Pod"]}},
            "exclude": {"resources": {"namespaces": ["kube-system"]}},
            "preconditions": {"all": [{"key": "{{request.operation}}", "operator": "Equals", "value": "CREATE"}]},
            "validate": {"message": "label `app` is required", "pattern": {"metadata": {"labels": {"app": "?*"}}}}
        }))
        .unwrap();

        assert_eq!(rule.name, "check-labels");
        assert_eq!(rule.match_kinds(), vec!["Pod"]);
        assert_eq!(rule.exclude_resources.direct.resources.namespaces, vec!["kube-system"]);
        assert!(rule.has_validate());
        assert!(!rule.has_mutate());
        assert!(!rule.has_generate());
        assert!(!rule.has_verify_images());
        assert!(rule.preconditions().is_some());
    }

    #[test]
    fn round_trips_without_inventing_fields() {
        let value = json!({
            "name": "sign",
            "match": {"any": [{"resources": {"kinds": ["Pod"]}}]},
            "verifyImages": [{"imageReferences": ["ghcr.io/acme/*"]}]
        });
        let rule: Rule = serde_json::from_value(value.clone()).unwrap();
        assert!(rule.has_verify_images());
        assert_eq!(serde_json::to_value(&rule).unwrap(), value);
    }

    #[test]
    fn preconditions_can_be_replaced() {
        let mut rule = Rule::new("pre");
        assert!(rule.preconditions().is_none());
        rule.set_preconditions(Some(json!({"any": []})));
        assert_eq!(rule.preconditions(), Some(&json!({"any": []})));
    }
}
