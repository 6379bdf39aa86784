// Per-rule validation: effect exclusivity, match/exclude conflicts, and the
// structure of both selector blocks. All four phases always run and their
// findings are returned in that order.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::conflict::ConflictDetector;
use crate::error::ErrorList;
use crate::field_path::FieldPath;
use crate::operation::check_operation_type;
use crate::rule::Rule;
use crate::structural::{SelectorValidator, StructuralValidator};

/// Validates a single rule.
#[derive(Clone)]
pub struct RuleValidator {
    selector_validator: Arc<dyn SelectorValidator>,
}

impl RuleValidator {
    /// Uses [`StructuralValidator`] for selector blocks.
    pub fn new() -> Self {
        Self::with_selector_validator(Arc::new(StructuralValidator))
    }

    pub fn with_selector_validator(selector_validator: Arc<dyn SelectorValidator>) -> Self {
        Self { selector_validator }
    }

    /// Returns every finding for `rule`: operation errors, then conflict
    /// errors, then `match` errors, then `exclude` errors.
    pub fn validate(
        &self,
        rule: &Rule,
        path: &FieldPath,
        namespaced: bool,
        cluster_scoped_kinds: &BTreeSet<String>,
    ) -> ErrorList {
        let mut errs = ErrorList::new();
        self.validate_into(rule, path, namespaced, cluster_scoped_kinds, &mut errs);
        errs
    }

    /// Same as [`validate`](Self::validate) but appends onto `errs`.
    pub fn validate_into(
        &self,
        rule: &Rule,
        path: &FieldPath,
        namespaced: bool,
        cluster_scoped_kinds: &BTreeSet<String>,
        errs: &mut ErrorList,
    ) {
        errs.extend(check_operation_type(rule, path));
        errs.extend(ConflictDetector::check_match_exclude_conflict(rule, path));
        errs.extend(self.selector_validator.validate(
            &rule.match_resources,
            &path.child("match"),
            namespaced,
            cluster_scoped_kinds,
        ));
        errs.extend(self.selector_validator.validate(
            &rule.exclude_resources,
            &path.child("exclude"),
            namespaced,
            cluster_scoped_kinds,
        ));
    }
}

impl Default for RuleValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleValidator").finish_non_exhaustive()
    }
}
