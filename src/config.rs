// Validator configuration

use std::collections::BTreeSet;

use crate::rule::MAX_RULE_NAME_LEN;

/// Built-in Kubernetes kinds that live outside any namespace.
pub const DEFAULT_CLUSTER_SCOPED_KINDS: &[&str] = &[
    "APIService",
    "CertificateSigningRequest",
    "ClusterRole",
    "ClusterRoleBinding",
    "ComponentStatus",
    "CSIDriver",
    "CSINode",
    "CustomResourceDefinition",
    "IngressClass",
    "MutatingWebhookConfiguration",
    "Namespace",
    "Node",
    "PersistentVolume",
    "PriorityClass",
    "RuntimeClass",
    "StorageClass",
    "ValidatingWebhookConfiguration",
    "VolumeAttachment",
];

/// Configuration shared by the rule and policy validators.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Kinds forbidden in namespaced policies
    pub cluster_scoped_kinds: BTreeSet<String>,
    /// Overrides the namespaced flag derived from the policy itself
    pub force_namespaced: Option<bool>,
    /// Longest accepted rule name
    pub max_rule_name_len: usize,
    /// Emit a warning when conflict analysis is skipped for a rule
    pub warn_on_skipped_analysis: bool,
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self {
            cluster_scoped_kinds: DEFAULT_CLUSTER_SCOPED_KINDS
                .iter()
                .map(|kind| kind.to_string())
                .collect(),
            force_namespaced: None,
            max_rule_name_len: MAX_RULE_NAME_LEN,
            warn_on_skipped_analysis: true,
        }
    }

    /// Replaces the cluster-scoped kind set.
    pub fn with_cluster_scoped_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cluster_scoped_kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    /// Adds kinds (typically cluster-scoped CRDs) to the existing set.
    pub fn add_cluster_scoped_kind(mut self, kind: impl Into<String>) -> Self {
        self.cluster_scoped_kinds.insert(kind.into());
        self
    }

    pub fn force_namespaced(mut self, namespaced: bool) -> Self {
        self.force_namespaced = Some(namespaced);
        self
    }

    pub fn with_max_rule_name_len(mut self, max: usize) -> Self {
        self.max_rule_name_len = max;
        self
    }

    pub fn warn_on_skipped_analysis(mut self, warn: bool) -> Self {
        self.warn_on_skipped_analysis = warn;
        self
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self::new()
    }
}
