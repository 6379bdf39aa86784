//! # Rule Validator
//!
//! Static validation of policy rules before they are admitted: every rule
//! must declare exactly one effect, and its `exclude` block must not cover
//! everything its `match` block selects.

pub mod field_path;
pub mod error;
pub mod selector;
pub mod wildcard;
pub mod effects;
pub mod rule;
pub mod operation;
pub mod conflict;
pub mod structural;
pub mod config;
pub mod rule_validator;
pub mod policy;

pub use field_path::{FieldPath, PathElement};

pub use error::{
    ErrorKind, ErrorList, ParseError, ValidationError, ValidationResult, ValidationWarning,
};

pub use selector::{
    CompositeSelector, LabelSelector, LabelSelectorOperator, LabelSelectorRequirement,
    ResourceDescription, ResourceSelector, ResourceSelectorBuilder, SelectorForm, Subject,
    UserInfo,
};

pub use effects::{Generation, ImageVerification, Mutation, Validation};

pub use rule::{Rule, MAX_RULE_NAME_LEN};

pub use operation::{check_operation_type, declared_operations};

pub use conflict::{ConflictAnalysis, ConflictDetector, Dimension};

pub use structural::{SelectorValidator, StructuralValidator};

pub use config::{ValidatorConfig, DEFAULT_CLUSTER_SCOPED_KINDS};

pub use rule_validator::RuleValidator;

pub use policy::{
    Policy,                 // Policy document
    PolicyMetadata,         // Object metadata
    PolicyParser,           // JSON/YAML parsing
    PolicySpec,             // Rule collection
    PolicyValidator,        // Policy-wide validator
    CLUSTER_POLICY_KIND,
    NAMESPACED_POLICY_KIND,
};
