// Validation findings and parse errors
//
// Findings are values, not failures: validators push them onto an
// `ErrorList` and keep going, so a single pass reports everything wrong
// with a rule or policy.

use thiserror::Error;

use crate::field_path::FieldPath;

/// Ordered list of findings, in the order the checks ran.
pub type ErrorList = Vec<ValidationError>;

/// Coarse category of a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Invalid,
    Forbidden,
    Required,
    Duplicate,
}

/// Validation error types
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("{path}: Invalid value: rule '{rule}': No operation defined in the rule '{rule}'.(supported operations: mutate,validate,generate,verifyImages)")]
    MissingOperation { path: FieldPath, rule: String },

    #[error("{path}: Invalid value: rule '{rule}': Multiple operations defined in the rule '{rule}', only one operation (mutate,validate,generate,verifyImages) is allowed per rule")]
    MultipleOperations { path: FieldPath, rule: String },

    #[error("{path}: Invalid value: rule '{rule}': Rule is matching an empty set")]
    EmptySelectionSet { path: FieldPath, rule: String },

    #[error("{path}: Invalid value: {value}: {detail}")]
    Invalid {
        path: FieldPath,
        value: String,
        detail: String,
    },

    #[error("{path}: Forbidden: {detail}")]
    Forbidden { path: FieldPath, detail: String },

    #[error("{path}: Required value: {detail}")]
    Required { path: FieldPath, detail: String },

    #[error("{path}: Duplicate value: {value}")]
    Duplicate { path: FieldPath, value: String },

    #[error("{path}: Required value: policy has no rules")]
    EmptyPolicy { path: FieldPath },
}

impl ValidationError {
    /// Field the finding is scoped to.
    pub fn path(&self) -> &FieldPath {
        match self {
            ValidationError::MissingOperation { path, .. }
            | ValidationError::MultipleOperations { path, .. }
            | ValidationError::EmptySelectionSet { path, .. }
            | ValidationError::Invalid { path, .. }
            | ValidationError::Forbidden { path, .. }
            | ValidationError::Required { path, .. }
            | ValidationError::Duplicate { path, .. }
            | ValidationError::EmptyPolicy { path } => path,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::MissingOperation { .. }
            | ValidationError::MultipleOperations { .. }
            | ValidationError::EmptySelectionSet { .. }
            | ValidationError::Invalid { .. } => ErrorKind::Invalid,
            ValidationError::Forbidden { .. } => ErrorKind::Forbidden,
            ValidationError::Required { .. } | ValidationError::EmptyPolicy { .. } => {
                ErrorKind::Required
            }
            ValidationError::Duplicate { .. } => ErrorKind::Duplicate,
        }
    }

    pub(crate) fn invalid(
        path: FieldPath,
        value: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        ValidationError::Invalid {
            path,
            value: value.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn forbidden(path: FieldPath, detail: impl Into<String>) -> Self {
        ValidationError::Forbidden {
            path,
            detail: detail.into(),
        }
    }

    pub(crate) fn required(path: FieldPath, detail: impl Into<String>) -> Self {
        ValidationError::Required {
            path,
            detail: detail.into(),
        }
    }
}

/// Validation warning types
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    /// The rule uses `all` on match or exclude, so no conflict analysis ran.
    ConflictAnalysisSkipped { path: FieldPath, rule: String },
}

/// Validation result with detailed errors
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: ErrorList,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_error(error: ValidationError) -> Self {
        Self {
            valid: false,
            errors: vec![error],
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.valid = false;
        self.errors.push(error);
    }

    pub fn add_errors(&mut self, errors: ErrorList) {
        if !errors.is_empty() {
            self.valid = false;
        }
        self.errors.extend(errors);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Parse Errors
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("YAML parse error: {0}")]
    YamlParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}
