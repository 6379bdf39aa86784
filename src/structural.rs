// Structural validation of a single `match` or `exclude` block
//
// The rule validator hands each composite selector to a `SelectorValidator`.
// Callers with a richer view of the cluster (API discovery, CRD schemas) plug
// in their own implementation; `StructuralValidator` covers the checks that
// need nothing beyond the selector itself.

use std::collections::BTreeSet;

use crate::error::{ErrorList, ValidationError};
use crate::field_path::FieldPath;
use crate::selector::{CompositeSelector, LabelSelector, ResourceSelector};

/// Validates the shape of one composite selector.
pub trait SelectorValidator: Send + Sync {
    /// Returns findings for `selector`, scoped under `path`.
    fn validate(
        &self,
        selector: &CompositeSelector,
        path: &FieldPath,
        namespaced: bool,
        cluster_scoped_kinds: &BTreeSet<String>,
    ) -> ErrorList;
}

/// Selector checks that need no cluster access.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl SelectorValidator for StructuralValidator {
    fn validate(
        &self,
        selector: &CompositeSelector,
        path: &FieldPath,
        namespaced: bool,
        cluster_scoped_kinds: &BTreeSet<String>,
    ) -> ErrorList {
        let mut errs = ErrorList::new();

        if !selector.any.is_empty() && !selector.all.is_empty() {
            errs.push(ValidationError::invalid(
                path.clone(),
                "any/all",
                "can't specify any and all together",
            ));
        }

        let composite = !selector.any.is_empty() || !selector.all.is_empty();
        if composite && !selector.direct.is_empty() {
            errs.push(ValidationError::invalid(
                path.clone(),
                "resources/user info",
                "can't specify any/all together with direct resource or user info",
            ));
        }

        self.validate_filter(&selector.direct, path, namespaced, cluster_scoped_kinds, &mut errs);
        for (i, filter) in selector.any.iter().enumerate() {
            let filter_path = path.child("any").index(i);
            self.validate_filter(filter, &filter_path, namespaced, cluster_scoped_kinds, &mut errs);
        }
        for (i, filter) in selector.all.iter().enumerate() {
            let filter_path = path.child("all").index(i);
            self.validate_filter(filter, &filter_path, namespaced, cluster_scoped_kinds, &mut errs);
        }

        errs
    }
}

impl StructuralValidator {
    fn validate_filter(
        &self,
        filter: &ResourceSelector,
        path: &FieldPath,
        namespaced: bool,
        cluster_scoped_kinds: &BTreeSet<String>,
        errs: &mut ErrorList,
    ) {
        let resources = &filter.resources;
        let resources_path = path.child("resources");

        if !resources.name.is_empty() && !resources.names.is_empty() {
            errs.push(ValidationError::invalid(
                resources_path.clone(),
                resources.name.clone(),
                "both name and names can not be specified together",
            ));
        }

        if namespaced {
            if !resources.namespaces.is_empty() {
                errs.push(ValidationError::forbidden(
                    resources_path.child("namespaces"),
                    "namespaces are not allowed in a namespaced policy",
                ));
            }
            for (i, kind) in resources.kinds.iter().enumerate() {
                if cluster_scoped_kinds.contains(kind) {
                    errs.push(ValidationError::forbidden(
                        resources_path.child("kinds").index(i),
                        format!("cluster-scoped kind {} is not allowed in a namespaced policy", kind),
                    ));
                }
            }
        }

        if let Some(selector) = &resources.selector {
            validate_label_selector(selector, &resources_path.child("selector"), errs);
        }
        if let Some(selector) = &resources.namespace_selector {
            validate_label_selector(selector, &resources_path.child("namespaceSelector"), errs);
        }

        for (i, subject) in filter.user_info.subjects.iter().enumerate() {
            let subject_path = path.child("subjects").index(i);
            if subject.kind.is_empty() {
                errs.push(ValidationError::required(subject_path.child("kind"), "subject kind is required"));
            }
            if subject.name.is_empty() {
                errs.push(ValidationError::required(subject_path.child("name"), "subject name is required"));
            }
        }
    }
}

fn validate_label_selector(selector: &LabelSelector, path: &FieldPath, errs: &mut ErrorList) {
    for (i, requirement) in selector.match_expressions.iter().enumerate() {
        let requirement_path = path.child("matchExpressions").index(i);
        if requirement.key.is_empty() {
            errs.push(ValidationError::required(requirement_path.child("key"), "label key is required"));
        }
        let has_values = !requirement.values.is_empty();
        if requirement.operator.takes_values() && !has_values {
            errs.push(ValidationError::required(
                requirement_path.child("values"),
                format!("values must be non-empty for operator {:?}", requirement.operator),
            ));
        } else if !requirement.operator.takes_values() && has_values {
            errs.push(ValidationError::forbidden(
                requirement_path.child("values"),
                format!("values must be empty for operator {:?}", requirement.operator),
            ));
        }
    }
}
