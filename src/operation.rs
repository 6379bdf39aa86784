// Every rule must declare exactly one effect.

use crate::error::{ErrorList, ValidationError};
use crate::field_path::FieldPath;
use crate::rule::Rule;

/// Number of effects the rule declares.
pub fn declared_operations(rule: &Rule) -> usize {
    [
        rule.has_mutate(),
        rule.has_validate(),
        rule.has_generate(),
        rule.has_verify_images(),
    ]
    .iter()
    .filter(|declared| **declared)
    .count()
}

/// Reports a missing effect or more than one effect on `rule`.
pub fn check_operation_type(rule: &Rule, path: &FieldPath) -> ErrorList {
    let mut errs = ErrorList::new();
    match declared_operations(rule) {
        0 => errs.push(ValidationError::MissingOperation {
            path: path.clone(),
            rule: rule.name.clone(),
        }),
        1 => {}
        _ => errs.push(ValidationError::MultipleOperations {
            path: path.clone(),
            rule: rule.name.clone(),
        }),
    }
    errs
}
