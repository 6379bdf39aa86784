// Match/exclude conflict detection
//
// A rule whose `exclude` block covers everything its `match` block selects
// never applies to anything. This module proves that condition statically,
// dimension by dimension:
//
// 1. Conjunctive (`all`) selectors are not analysed
// 2. Disjunctive (`any`) selectors on both sides are compared entry by entry
// 3. Otherwise every populated exclude dimension must cover match
//
// The analysis only reports what it can prove. Whenever match may reach a
// resource that exclude lets through, the rule is accepted.

use log::debug;
use std::collections::HashSet;
use std::hash::Hash;

use crate::error::{ErrorList, ValidationError};
use crate::field_path::FieldPath;
use crate::rule::Rule;
use crate::selector::{CompositeSelector, LabelSelector, ResourceSelector};
use crate::wildcard;

/// Selection dimension compared by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    AnyEntries,
    Exclude,
    Roles,
    ClusterRoles,
    Subjects,
    Name,
    Names,
    Namespaces,
    Kinds,
    Selector,
    NamespaceSelector,
    Annotations,
}

/// Outcome of comparing a match block against an exclude block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAnalysis {
    /// An `all` list is present on either side; nothing was proven.
    Skipped,
    /// Match may select resources that exclude does not cover on this dimension.
    Reachable(Dimension),
    /// Exclude covers everything match selects.
    EmptySelection,
}

impl ConflictAnalysis {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ConflictAnalysis::EmptySelection)
    }
}

/// Static match/exclude conflict detector.
pub struct ConflictDetector;

impl ConflictDetector {
    /// Reports an empty-selection error scoped to `path` when the rule's
    /// exclude block provably covers its match block.
    pub fn check_match_exclude_conflict(rule: &Rule, path: &FieldPath) -> ErrorList {
        let mut errs = ErrorList::new();
        let analysis = Self::analyze(&rule.match_resources, &rule.exclude_resources);
        match analysis {
            ConflictAnalysis::EmptySelection => {
                debug!("Rule '{}' matches an empty set", rule.name);
                errs.push(ValidationError::EmptySelectionSet {
                    path: path.clone(),
                    rule: rule.name.clone(),
                });
            }
            ConflictAnalysis::Reachable(dimension) => {
                debug!("Rule '{}' reaches resources outside exclude on {:?}", rule.name, dimension);
            }
            ConflictAnalysis::Skipped => {
                debug!("Rule '{}' uses `all` selectors, conflict analysis skipped", rule.name);
            }
        }
        errs
    }

    /// Compares a match block against an exclude block.
    pub fn analyze(matching: &CompositeSelector, excluding: &CompositeSelector) -> ConflictAnalysis {
        if !matching.all.is_empty() || !excluding.all.is_empty() {
            return ConflictAnalysis::Skipped;
        }

        // Entries are compared whole, never decomposed.
        if !matching.any.is_empty() && !excluding.any.is_empty() {
            let covered = matching
                .any
                .iter()
                .all(|m| excluding.any.iter().any(|e| m == e));
            return if covered {
                ConflictAnalysis::EmptySelection
            } else {
                ConflictAnalysis::Reachable(Dimension::AnyEntries)
            };
        }

        // Nothing to subtract.
        if excluding.is_empty() {
            return ConflictAnalysis::Reachable(Dimension::Exclude);
        }

        match Self::compare_direct(&matching.direct, &excluding.direct) {
            Err(dimension) => ConflictAnalysis::Reachable(dimension),
            Ok(()) => ConflictAnalysis::EmptySelection,
        }
    }

    /// Walks every populated exclude dimension. `Err` names the first one
    /// that leaves part of match uncovered.
    fn compare_direct(m: &ResourceSelector, e: &ResourceSelector) -> Result<(), Dimension> {
        let (m_user, e_user) = (&m.user_info, &e.user_info);
        let (m_res, e_res) = (&m.resources, &e.resources);

        if !e_user.roles.is_empty() && !covers(&e_user.roles, &m_user.roles) {
            return Err(Dimension::Roles);
        }
        if !e_user.cluster_roles.is_empty() && !covers(&e_user.cluster_roles, &m_user.cluster_roles) {
            return Err(Dimension::ClusterRoles);
        }
        if !e_user.subjects.is_empty() && !covers(&e_user.subjects, &m_user.subjects) {
            return Err(Dimension::Subjects);
        }

        if !e_res.name.is_empty() && !wildcard::matches(&e_res.name, &m_res.name) {
            return Err(Dimension::Name);
        }

        // Once both sides list names, the names alone decide.
        if !e_res.names.is_empty() {
            if m_res.names.is_empty() {
                return Err(Dimension::Names);
            }
            let all_excluded = m_res
                .names
                .iter()
                .all(|name| e_res.names.iter().any(|pattern| wildcard::matches(pattern, name)));
            return if all_excluded { Ok(()) } else { Err(Dimension::Names) };
        }

        if !e_res.namespaces.is_empty() && !covers(&e_res.namespaces, &m_res.namespaces) {
            return Err(Dimension::Namespaces);
        }
        if !e_res.kinds.is_empty() && !covers(&e_res.kinds, &m_res.kinds) {
            return Err(Dimension::Kinds);
        }

        if !label_selector_covers(m_res.selector.as_ref(), e_res.selector.as_ref()) {
            return Err(Dimension::Selector);
        }
        if !label_selector_covers(
            m_res.namespace_selector.as_ref(),
            e_res.namespace_selector.as_ref(),
        ) {
            return Err(Dimension::NamespaceSelector);
        }

        if (m_res.annotations.is_some() || e_res.annotations.is_some())
            && m_res.annotations != e_res.annotations
        {
            return Err(Dimension::Annotations);
        }

        Ok(())
    }
}

/// Match must be non-empty and contained in exclude.
fn covers<T: Eq + Hash>(excluding: &[T], matching: &[T]) -> bool {
    if matching.is_empty() {
        return false;
    }
    let excluded: HashSet<&T> = excluding.iter().collect();
    matching.iter().all(|value| excluded.contains(value))
}

/// An exclude selector covers a match selector when every requirement it
/// imposes is also imposed by match. Absent on both sides covers trivially;
/// absent on one side never does.
fn label_selector_covers(matching: Option<&LabelSelector>, excluding: Option<&LabelSelector>) -> bool {
    match (matching, excluding) {
        (None, None) => true,
        (Some(m), Some(e)) => {
            let expressions_covered = e
                .match_expressions
                .iter()
                .all(|expression| m.match_expressions.contains(expression));
            let labels_covered = e
                .match_labels
                .iter()
                .all(|(key, value)| m.match_labels.get(key) == Some(value));
            expressions_covered && labels_covered
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{LabelSelectorOperator, LabelSelectorRequirement, Subject};
    use serde_json::json;

    fn direct(selector: ResourceSelector) -> CompositeSelector {
        CompositeSelector::direct(selector)
    }

    fn kinds(values: &[&str]) -> ResourceSelector {
        ResourceSelector::builder().kinds(values).build()
    }

    fn analyze(matching: &CompositeSelector, excluding: &CompositeSelector) -> ConflictAnalysis {
        ConflictDetector::analyze(matching, excluding)
    }

    #[test]
    fn empty_exclude_never_conflicts() {
        let matching = direct(
            ResourceSelector::builder()
                .kinds(&["Pod"])
                .names(&["pod-a"])
                .roles(&["admin"])
                .build(),
        );
        assert_eq!(
            analyze(&matching, &CompositeSelector::new()),
            ConflictAnalysis::Reachable(Dimension::Exclude)
        );
        assert_eq!(
            analyze(&CompositeSelector::new(), &CompositeSelector::new()),
            ConflictAnalysis::Reachable(Dimension::Exclude)
        );
    }

    // Accepted limitation: conjunctive selectors are never analysed, even
    // when the rule is genuinely empty.
    #[test]
    fn all_selectors_are_not_analysed() {
        let pods = kinds(&["Pod"]);
        let matching = CompositeSelector::all_of(vec![pods.clone()]);
        let excluding = CompositeSelector::all_of(vec![pods.clone()]);
        assert_eq!(analyze(&matching, &excluding), ConflictAnalysis::Skipped);

        let matching = direct(pods.clone());
        let excluding = CompositeSelector {
            all: vec![pods.clone()],
            ..direct(pods)
        };
        assert_eq!(analyze(&matching, &excluding), ConflictAnalysis::Skipped);
    }

    #[test]
    fn wildcard_names_exclude_every_matched_name() {
        let matching = direct(ResourceSelector::builder().names(&["pod-a", "pod-b"]).build());
        let excluding = direct(ResourceSelector::builder().names(&["*"]).build());
        assert_eq!(analyze(&matching, &excluding), ConflictAnalysis::EmptySelection);
    }

    #[test]
    fn names_must_all_be_excluded() {
        let matching = direct(ResourceSelector::builder().names(&["pod-a", "web-b"]).build());
        let excluding = direct(ResourceSelector::builder().names(&["pod-*"]).build());
        assert_eq!(
            analyze(&matching, &excluding),
            ConflictAnalysis::Reachable(Dimension::Names)
        );

        let unnamed = direct(kinds(&["Pod"]));
        assert_eq!(
            analyze(&unnamed, &excluding),
            ConflictAnalysis::Reachable(Dimension::Names)
        );
    }

    #[test]
    fn names_decide_before_later_dimensions() {
        let matching = direct(
            ResourceSelector::builder()
                .names(&["pod-a"])
                .namespaces(&["prod"])
                .build(),
        );
        let excluding = direct(
            ResourceSelector::builder()
                .names(&["pod-*"])
                .namespaces(&["staging"])
                .build(),
        );
        assert_eq!(analyze(&matching, &excluding), ConflictAnalysis::EmptySelection);
    }

    #[test]
    fn namespaces_must_be_fully_contained() {
        let matching = direct(ResourceSelector::builder().namespaces(&["prod", "staging"]).build());
        let excluding = direct(ResourceSelector::builder().namespaces(&["prod"]).build());
        assert_eq!(
            analyze(&matching, &excluding),
            ConflictAnalysis::Reachable(Dimension::Namespaces)
        );

        let matching = direct(ResourceSelector::builder().namespaces(&["prod"]).build());
        let excluding = direct(ResourceSelector::builder().namespaces(&["prod", "staging"]).build());
        assert_eq!(analyze(&matching, &excluding), ConflictAnalysis::EmptySelection);
    }

    #[test]
    fn identical_kinds_conflict() {
        assert_eq!(
            analyze(&direct(kinds(&["Pod"])), &direct(kinds(&["Pod"]))),
            ConflictAnalysis::EmptySelection
        );
        assert_eq!(
            analyze(&direct(kinds(&["Pod", "Service"])), &direct(kinds(&["Pod"]))),
            ConflictAnalysis::Reachable(Dimension::Kinds)
        );
        // Unrestricted match kinds reach beyond any finite exclude list.
        let any_kind = direct(ResourceSelector::builder().namespaces(&["a"]).build());
        assert_eq!(
            analyze(&any_kind, &direct(kinds(&["Pod"]))),
            ConflictAnalysis::Reachable(Dimension::Kinds)
        );
    }

    #[test]
    fn user_info_dimensions_require_containment() {
        let matching = direct(ResourceSelector::builder().roles(&["dev"]).kinds(&["Pod"]).build());
        let excluding = direct(ResourceSelector::builder().roles(&["dev", "ops"]).build());
        assert_eq!(analyze(&matching, &excluding), ConflictAnalysis::EmptySelection);

        let excluding = direct(ResourceSelector::builder().cluster_roles(&["cluster-admin"]).build());
        assert_eq!(
            analyze(&matching, &excluding),
            ConflictAnalysis::Reachable(Dimension::ClusterRoles)
        );

        let alice = Subject::user("alice");
        let matching = direct(ResourceSelector::builder().subject(alice.clone()).build());
        let excluding = direct(
            ResourceSelector::builder()
                .subject(alice)
                .subject(Subject::group("devs"))
                .build(),
        );
        assert_eq!(analyze(&matching, &excluding), ConflictAnalysis::EmptySelection);

        // Subjects compare structurally: same name, different namespace.
        let matching = direct(
            ResourceSelector::builder()
                .subject(Subject::service_account("ci", "builder"))
                .build(),
        );
        let excluding = direct(
            ResourceSelector::builder()
                .subject(Subject::service_account("default", "builder"))
                .build(),
        );
        assert_eq!(
            analyze(&matching, &excluding),
            ConflictAnalysis::Reachable(Dimension::Subjects)
        );
    }

    #[test]
    fn single_name_uses_wildcards() {
        let matching = direct(ResourceSelector::builder().name("nginx-1").kinds(&["Pod"]).build());
        let excluding = direct(ResourceSelector::builder().name("nginx-*").kinds(&["Pod"]).build());
        assert_eq!(analyze(&matching, &excluding), ConflictAnalysis::EmptySelection);

        let excluding = direct(ResourceSelector::builder().name("redis-*").build());
        assert_eq!(
            analyze(&matching, &excluding),
            ConflictAnalysis::Reachable(Dimension::Name)
        );
    }

    #[test]
    fn label_selector_exclude_requirements_must_appear_in_match() {
        let tier = LabelSelectorRequirement::new("tier", LabelSelectorOperator::In, &["web", "api"]);
        let matching = direct(
            ResourceSelector::builder()
                .kinds(&["Pod"])
                .selector(
                    LabelSelector::new()
                        .with_label("app", "shop")
                        .with_label("env", "prod")
                        .with_expression(tier.clone()),
                )
                .build(),
        );

        // Exclude is looser than match: it covers it.
        let excluding = direct(
            ResourceSelector::builder()
                .kinds(&["Pod"])
                .selector(LabelSelector::new().with_label("app", "shop").with_expression(tier))
                .build(),
        );
        assert_eq!(analyze(&matching, &excluding), ConflictAnalysis::EmptySelection);

        // Same key, different value.
        let excluding = direct(
            ResourceSelector::builder()
                .kinds(&["Pod"])
                .selector(LabelSelector::new().with_label("app", "billing"))
                .build(),
        );
        assert_eq!(
            analyze(&matching, &excluding),
            ConflictAnalysis::Reachable(Dimension::Selector)
        );

        // Exclude expression absent from match.
        let excluding = direct(
            ResourceSelector::builder()
                .kinds(&["Pod"])
                .selector(LabelSelector::new().with_expression(LabelSelectorRequirement::new(
                    "debug",
                    LabelSelectorOperator::Exists,
                    &[],
                )))
                .build(),
        );
        assert_eq!(
            analyze(&matching, &excluding),
            ConflictAnalysis::Reachable(Dimension::Selector)
        );
    }

    #[test]
    fn one_sided_selectors_never_conflict() {
        let matching = direct(kinds(&["Pod"]));
        let excluding = direct(
            ResourceSelector::builder()
                .kinds(&["Pod"])
                .selector(LabelSelector::new().with_label("app", "web"))
                .build(),
        );
        assert_eq!(
            analyze(&matching, &excluding),
            ConflictAnalysis::Reachable(Dimension::Selector)
        );

        let matching = direct(
            ResourceSelector::builder()
                .kinds(&["Pod"])
                .namespace_selector(LabelSelector::new().with_label("team", "a"))
                .build(),
        );
        let excluding = direct(kinds(&["Pod"]));
        assert_eq!(
            analyze(&matching, &excluding),
            ConflictAnalysis::Reachable(Dimension::NamespaceSelector)
        );
    }

    #[test]
    fn namespace_selector_follows_label_rules() {
        let matching = direct(
            ResourceSelector::builder()
                .kinds(&["Pod"])
                .namespace_selector(LabelSelector::new().with_label("team", "a").with_label("env", "dev"))
                .build(),
        );
        let excluding = direct(
            ResourceSelector::builder()
                .kinds(&["Pod"])
                .namespace_selector(LabelSelector::new().with_label("env", "dev"))
                .build(),
        );
        assert_eq!(analyze(&matching, &excluding), ConflictAnalysis::EmptySelection);
    }

    #[test]
    fn annotations_must_be_equal_when_present() {
        let annotated = |value: &str| {
            ResourceSelector::builder()
                .kinds(&["Pod"])
                .annotation("policy.io/skip", value)
                .build()
        };
        assert_eq!(
            analyze(&direct(annotated("true")), &direct(annotated("true"))),
            ConflictAnalysis::EmptySelection
        );
        assert_eq!(
            analyze(&direct(annotated("true")), &direct(annotated("false"))),
            ConflictAnalysis::Reachable(Dimension::Annotations)
        );
        assert_eq!(
            analyze(&direct(kinds(&["Pod"])), &direct(annotated("true"))),
            ConflictAnalysis::Reachable(Dimension::Annotations)
        );
    }

    #[test]
    fn any_entries_must_all_appear_in_exclude() {
        let pods = kinds(&["Pod"]);
        let deployments = kinds(&["Deployment"]);

        let matching = CompositeSelector::any_of(vec![pods.clone(), deployments.clone()]);
        let excluding = CompositeSelector::any_of(vec![deployments.clone(), pods.clone()]);
        assert_eq!(analyze(&matching, &excluding), ConflictAnalysis::EmptySelection);

        let excluding = CompositeSelector::any_of(vec![pods.clone()]);
        assert_eq!(
            analyze(&matching, &excluding),
            ConflictAnalysis::Reachable(Dimension::AnyEntries)
        );

        // No decomposition: a broader exclude entry does not count.
        let matching = CompositeSelector::any_of(vec![pods]);
        let excluding = CompositeSelector::any_of(vec![kinds(&["Pod", "Service"])]);
        assert_eq!(
            analyze(&matching, &excluding),
            ConflictAnalysis::Reachable(Dimension::AnyEntries)
        );
    }

    // Accepted limitation: an exclude written only as `any` entries, against
    // a match without `any`, has no populated direct dimension to compare and
    // is reported as an empty selection whatever the entries contain.
    #[test]
    fn exclude_only_in_any_reports_empty_selection() {
        let matching = direct(kinds(&["Deployment"]));
        let excluding = CompositeSelector::any_of(vec![kinds(&["Pod"])]);
        let analysis = analyze(&matching, &excluding);
        assert_eq!(analysis, ConflictAnalysis::EmptySelection);
        assert!(analysis.is_conflict());

        assert!(!analyze(&matching, &CompositeSelector::new()).is_conflict());
        assert!(!ConflictAnalysis::Skipped.is_conflict());
    }

    #[test]
    fn check_reports_one_error_scoped_to_rule() {
        let rule: Rule = serde_json::from_value(json!({
            "name": "noop",
            "match": {"resources": {"kinds": ["Pod"]}},
            "exclude": {"resources": {"kinds": ["Pod"]}},
            "validate": {"message": "m"}
        }))
        .unwrap();
        let path = FieldPath::new("spec").child("rules").index(3);
        let errs = ConflictDetector::check_match_exclude_conflict(&rule, &path);
        assert_eq!(errs.len(), 1);
        assert_eq!(
            errs[0],
            ValidationError::EmptySelectionSet {
                path,
                rule: "noop".to_string()
            }
        );
    }
}
