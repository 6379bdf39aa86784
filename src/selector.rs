// Resource selection criteria used by rule `match` and `exclude` blocks.
//
// A selector narrows the set of admission requests a rule applies to along
// independent dimensions:
//
// 1. Resources: kinds, names, namespaces, annotations and label predicates
// 2. User info: roles, cluster roles and subjects of the requester
//
// An empty dimension places no constraint on that dimension. A composite
// selector wraps a direct selector together with `any` (OR) and `all` (AND)
// lists of selectors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// LABEL SELECTORS
// ============================================================================

/// Set-based operator of a label selector requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelSelectorOperator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

impl LabelSelectorOperator {
    /// `In` and `NotIn` need a non-empty value list, the others need none.
    pub fn takes_values(&self) -> bool {
        matches!(self, LabelSelectorOperator::In | LabelSelectorOperator::NotIn)
    }
}

/// A single set-based label requirement, e.g. `tier In (web, api)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelSelectorRequirement {
    pub key: String,
    pub operator: LabelSelectorOperator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl LabelSelectorRequirement {
    pub fn new(key: impl Into<String>, operator: LabelSelectorOperator, values: &[&str]) -> Self {
        Self {
            key: key.into(),
            operator,
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Label predicate: exact label matches ANDed with set-based requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<LabelSelectorRequirement>,
}

impl LabelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.match_labels.insert(key.into(), value.into());
        self
    }

    pub fn with_expression(mut self, requirement: LabelSelectorRequirement) -> Self {
        self.match_expressions.push(requirement);
        self
    }

    /// A selector with no labels and no expressions selects everything.
    pub fn is_empty(&self) -> bool {
        self.match_labels.is_empty() && self.match_expressions.is_empty()
    }
}

// ============================================================================
// USER INFO
// ============================================================================

/// Identity a request is made by: a user, group or service account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_group: Option<String>,
}

impl Subject {
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            kind: "User".to_string(),
            name: name.into(),
            namespace: None,
            api_group: Some("rbac.authorization.k8s.io".to_string()),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self {
            kind: "Group".to_string(),
            name: name.into(),
            namespace: None,
            api_group: Some("rbac.authorization.k8s.io".to_string()),
        }
    }

    pub fn service_account(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: "ServiceAccount".to_string(),
            name: name.into(),
            namespace: Some(namespace.into()),
            api_group: None,
        }
    }
}

/// Requester criteria of a selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cluster_roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<Subject>,
}

impl UserInfo {
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.cluster_roles.is_empty() && self.subjects.is_empty()
    }
}

// ============================================================================
// RESOURCE DESCRIPTION
// ============================================================================

/// Resource criteria of a selector.
///
/// `name` is the legacy single-pattern form; `names` is the list form. Both
/// accept `*` and `?` wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescription {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_selector: Option<LabelSelector>,
}

impl ResourceDescription {
    /// True when no field is set. A present-but-empty selector or annotation
    /// map still counts as set.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
            && self.name.is_empty()
            && self.names.is_empty()
            && self.namespaces.is_empty()
            && self.annotations.is_none()
            && self.selector.is_none()
            && self.namespace_selector.is_none()
    }
}

// ============================================================================
// RESOURCE SELECTOR
// ============================================================================

/// Atomic selection criteria: user info fields at the top level plus a
/// `resources` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSelector {
    #[serde(flatten)]
    pub user_info: UserInfo,
    #[serde(default, skip_serializing_if = "ResourceDescription::is_empty")]
    pub resources: ResourceDescription,
}

impl ResourceSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ResourceSelectorBuilder {
        ResourceSelectorBuilder::new()
    }

    /// An empty selector constrains nothing.
    pub fn is_empty(&self) -> bool {
        self.user_info.is_empty() && self.resources.is_empty()
    }
}

/// Builder for [`ResourceSelector`].
#[derive(Debug, Default)]
pub struct ResourceSelectorBuilder {
    selector: ResourceSelector,
}

impl ResourceSelectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(mut self, kinds: &[&str]) -> Self {
        self.selector.resources.kinds = to_strings(kinds);
        self
    }

    pub fn name(mut self, pattern: impl Into<String>) -> Self {
        self.selector.resources.name = pattern.into();
        self
    }

    pub fn names(mut self, patterns: &[&str]) -> Self {
        self.selector.resources.names = to_strings(patterns);
        self
    }

    pub fn namespaces(mut self, namespaces: &[&str]) -> Self {
        self.selector.resources.namespaces = to_strings(namespaces);
        self
    }

    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.selector
            .resources
            .annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn selector(mut self, selector: LabelSelector) -> Self {
        self.selector.resources.selector = Some(selector);
        self
    }

    pub fn namespace_selector(mut self, selector: LabelSelector) -> Self {
        self.selector.resources.namespace_selector = Some(selector);
        self
    }

    pub fn roles(mut self, roles: &[&str]) -> Self {
        self.selector.user_info.roles = to_strings(roles);
        self
    }

    pub fn cluster_roles(mut self, roles: &[&str]) -> Self {
        self.selector.user_info.cluster_roles = to_strings(roles);
        self
    }

    pub fn subject(mut self, subject: Subject) -> Self {
        self.selector.user_info.subjects.push(subject);
        self
    }

    pub fn build(self) -> ResourceSelector {
        self.selector
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// ============================================================================
// COMPOSITE SELECTOR
// ============================================================================

/// Which form of a composite selector carries the criteria.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectorForm<'a> {
    /// Criteria live directly on the composite.
    Direct(&'a ResourceSelector),
    /// At least one of the listed selectors must match.
    Any(&'a [ResourceSelector]),
    /// Every listed selector must match.
    All(&'a [ResourceSelector]),
}

/// Body of a rule's `match` or `exclude` block.
///
/// On the wire the direct criteria sit alongside the `any` and `all` lists.
/// Well-formed input populates only one of the three; [`form`] reports which.
///
/// [`form`]: CompositeSelector::form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeSelector {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any: Vec<ResourceSelector>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all: Vec<ResourceSelector>,
    #[serde(flatten)]
    pub direct: ResourceSelector,
}

impl CompositeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direct(selector: ResourceSelector) -> Self {
        Self {
            direct: selector,
            ..Self::default()
        }
    }

    pub fn any_of(selectors: Vec<ResourceSelector>) -> Self {
        Self {
            any: selectors,
            ..Self::default()
        }
    }

    pub fn all_of(selectors: Vec<ResourceSelector>) -> Self {
        Self {
            all: selectors,
            ..Self::default()
        }
    }

    /// `all` takes precedence over `any`, which takes precedence over the
    /// direct criteria.
    pub fn form(&self) -> SelectorForm<'_> {
        if !self.all.is_empty() {
            SelectorForm::All(&self.all)
        } else if !self.any.is_empty() {
            SelectorForm::Any(&self.any)
        } else {
            SelectorForm::Direct(&self.direct)
        }
    }

    /// True when neither the direct criteria nor either list is populated.
    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.any.is_empty() && self.all.is_empty()
    }

    /// Kinds in order: direct kinds, then each `all` entry, then each `any` entry.
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds = self.direct.resources.kinds.clone();
        for selector in &self.all {
            kinds.extend(selector.resources.kinds.iter().cloned());
        }
        for selector in &self.any {
            kinds.extend(selector.resources.kinds.iter().cloned());
        }
        kinds
    }
}
