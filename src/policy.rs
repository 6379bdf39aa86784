// Policy documents: a named collection of rules validated as a unit
//
// This module provides:
// 1. The policy document model (ClusterPolicy / Policy)
// 2. JSON and YAML parsing and serialization
// 3. Policy-wide validation: rule names plus every rule's own findings

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::config::ValidatorConfig;
use crate::error::{ParseError, ValidationError, ValidationResult, ValidationWarning};
use crate::field_path::FieldPath;
use crate::rule::Rule;
use crate::rule_validator::RuleValidator;

pub const CLUSTER_POLICY_KIND: &str = "ClusterPolicy";
pub const NAMESPACED_POLICY_KIND: &str = "Policy";

/// Object metadata of a policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Policy body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySpec {
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_failure_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<bool>,
}

/// A cluster-wide or namespaced policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    #[serde(default)]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: PolicyMetadata,
    #[serde(default)]
    pub spec: PolicySpec,
}

fn default_kind() -> String {
    CLUSTER_POLICY_KIND.to_string()
}

impl Policy {
    /// Creates an empty cluster policy with a fresh uid.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            api_version: "kyverno.io/v1".to_string(),
            kind: CLUSTER_POLICY_KIND.to_string(),
            metadata: PolicyMetadata {
                name: name.into(),
                uid: Some(Uuid::new_v4()),
                creation_timestamp: Some(Utc::now()),
                ..PolicyMetadata::default()
            },
            spec: PolicySpec::default(),
        }
    }

    /// Creates an empty namespaced policy.
    pub fn namespaced(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let mut policy = Self::new(name);
        policy.kind = NAMESPACED_POLICY_KIND.to_string();
        policy.metadata.namespace = Some(namespace.into());
        policy
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.spec.rules.push(rule);
    }

    pub fn get_rule(&self, name: &str) -> Option<&Rule> {
        self.spec.rules.iter().find(|r| r.name == name)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.spec.rules
    }

    /// True for `kind: Policy` or when a namespace is set.
    pub fn is_namespaced(&self) -> bool {
        self.kind == NAMESPACED_POLICY_KIND
            || self.metadata.namespace.as_deref().is_some_and(|ns| !ns.is_empty())
    }

    /// Union of every rule's match kinds, first occurrence order.
    pub fn match_kinds(&self) -> Vec<String> {
        dedup_in_order(self.spec.rules.iter().flat_map(|rule| rule.match_kinds()))
    }

    /// Union of every rule's exclude kinds, first occurrence order.
    pub fn exclude_kinds(&self) -> Vec<String> {
        dedup_in_order(self.spec.rules.iter().flat_map(|rule| rule.exclude_kinds()))
    }
}

fn dedup_in_order(kinds: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    kinds.filter(|kind| seen.insert(kind.clone())).collect()
}

/// Policy parser supporting JSON and YAML
pub struct PolicyParser;

impl PolicyParser {
    pub fn from_json(json: &str) -> Result<Policy, ParseError> {
        serde_json::from_str(json).map_err(|e| ParseError::JsonParseError(e.to_string()))
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Policy, ParseError> {
        serde_json::from_slice(bytes).map_err(|e| ParseError::JsonParseError(e.to_string()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Policy, ParseError> {
        serde_yaml::from_str(yaml).map_err(|e| ParseError::YamlParseError(e.to_string()))
    }

    pub fn to_json(policy: &Policy) -> Result<String, ParseError> {
        serde_json::to_string_pretty(policy).map_err(|e| ParseError::SerializationError(e.to_string()))
    }

    pub fn to_yaml(policy: &Policy) -> Result<String, ParseError> {
        serde_yaml::to_string(policy).map_err(|e| ParseError::SerializationError(e.to_string()))
    }
}

/// Validates every rule of a policy and the policy-level rule name constraints.
#[derive(Debug, Clone, Default)]
pub struct PolicyValidator {
    config: ValidatorConfig,
    rule_validator: RuleValidator,
}

impl PolicyValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
            rule_validator: RuleValidator::new(),
        }
    }

    /// Swaps the per-rule validator, e.g. to plug in a custom selector validator.
    pub fn with_rule_validator(mut self, rule_validator: RuleValidator) -> Self {
        self.rule_validator = rule_validator;
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn validate(&self, policy: &Policy) -> ValidationResult {
        let mut result = ValidationResult::valid();
        let rules_path = FieldPath::new("spec").child("rules");

        if policy.spec.rules.is_empty() {
            result.add_error(ValidationError::EmptyPolicy { path: rules_path });
            return result;
        }

        let namespaced = self
            .config
            .force_namespaced
            .unwrap_or_else(|| policy.is_namespaced());

        let mut seen_names = HashSet::new();
        for (i, rule) in policy.spec.rules.iter().enumerate() {
            let rule_path = rules_path.index(i);
            self.validate_rule_name(rule, &rule_path, &mut seen_names, &mut result);

            let errs = self.rule_validator.validate(
                rule,
                &rule_path,
                namespaced,
                &self.config.cluster_scoped_kinds,
            );
            result.add_errors(errs);

            if self.config.warn_on_skipped_analysis && rule.uses_conjunctive_selectors() {
                warn!(
                    "Conflict analysis skipped for rule '{}' of policy '{}': `all` selectors are not analysed",
                    rule.name, policy.metadata.name
                );
                result.add_warning(ValidationWarning::ConflictAnalysisSkipped {
                    path: rule_path,
                    rule: rule.name.clone(),
                });
            }
        }

        info!(
            "Validated policy '{}': {} rules, {} errors, {} warnings",
            policy.metadata.name,
            policy.spec.rules.len(),
            result.errors.len(),
            result.warnings.len()
        );
        result
    }

    fn validate_rule_name<'a>(
        &self,
        rule: &'a Rule,
        rule_path: &FieldPath,
        seen_names: &mut HashSet<&'a str>,
        result: &mut ValidationResult,
    ) {
        let name_path = rule_path.child("name");
        if rule.name.is_empty() {
            result.add_error(ValidationError::required(name_path, "rule name is required"));
            return;
        }
        if rule.name.len() > self.config.max_rule_name_len {
            result.add_error(ValidationError::invalid(
                name_path.clone(),
                rule.name.clone(),
                format!("must be no more than {} characters", self.config.max_rule_name_len),
            ));
        }
        if !seen_names.insert(rule.name.as_str()) {
            debug!("Duplicate rule name '{}'", rule.name);
            result.add_error(ValidationError::Duplicate {
                path: name_path,
                value: rule.name.clone(),
            });
        }
    }
}
