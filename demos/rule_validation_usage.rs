// demos/rule_validation_usage.rs
//
// This example walks through validating rules and whole policies.
//
// Run with: cargo run --example rule_validation_usage

use rule_validator::{
    CompositeSelector, ConflictDetector, FieldPath, LabelSelector, Policy, PolicyParser,
    PolicyValidator, ResourceSelector, Rule, RuleValidator, ValidatorConfig,
};

fn main() {
    println!("=== Rule Validator - Usage Examples ===\n");

    example_1_single_rule();
    example_2_conflict_analysis();
    example_3_policy_document();
}

/// Example 1: Validating one rule
fn example_1_single_rule() {
    println!("Example 1: Validating a Single Rule");
    println!("===================================");

    let mut rule = Rule::new("require-team-label");
    rule.validation.message = "label `team` is required".to_string();
    rule.match_resources = CompositeSelector::direct(
        ResourceSelector::builder().kinds(&["Pod", "Deployment"]).build(),
    );
    rule.exclude_resources = CompositeSelector::direct(
        ResourceSelector::builder().namespaces(&["kube-system"]).build(),
    );

    let config = ValidatorConfig::default();
    let path = FieldPath::new("spec").child("rules").index(0);
    let errs = RuleValidator::new().validate(&rule, &path, false, &config.cluster_scoped_kinds);
    println!("Rule '{}': {} findings", rule.name, errs.len());

    // Drop the effect: the rule no longer does anything.
    rule.validation = Default::default();
    for err in RuleValidator::new().validate(&rule, &path, false, &config.cluster_scoped_kinds) {
        println!("  {}", err);
    }
    println!();
}

/// Example 2: Inspecting the conflict analysis directly
fn example_2_conflict_analysis() {
    println!("Example 2: Conflict Analysis");
    println!("============================");

    let matching = CompositeSelector::direct(
        ResourceSelector::builder()
            .kinds(&["Pod"])
            .selector(LabelSelector::new().with_label("app", "web").with_label("env", "prod"))
            .build(),
    );

    let broad = CompositeSelector::direct(
        ResourceSelector::builder()
            .kinds(&["Pod"])
            .selector(LabelSelector::new().with_label("app", "web"))
            .build(),
    );
    println!("Exclude app=web:        {:?}", ConflictDetector::analyze(&matching, &broad));

    let narrow = CompositeSelector::direct(
        ResourceSelector::builder()
            .kinds(&["Pod"])
            .selector(LabelSelector::new().with_label("app", "billing"))
            .build(),
    );
    println!("Exclude app=billing:    {:?}", ConflictDetector::analyze(&matching, &narrow));

    let conjunctive = CompositeSelector::all_of(vec![ResourceSelector::builder().kinds(&["Pod"]).build()]);
    println!("Exclude with all block: {:?}", ConflictDetector::analyze(&matching, &conjunctive));
    println!();
}

/// Example 3: Parsing and validating a policy document
fn example_3_policy_document() {
    println!("Example 3: Policy Documents");
    println!("===========================");

    let yaml = r#"
apiVersion: kyverno.io/v1
kind: Policy
metadata:
  name: team-a-guardrails
  namespace: team-a
spec:
  rules:
    - name: no-cluster-roles
      match:
        resources:
          kinds: ["ClusterRole"]
      validate:
        message: "namespaced policies can't reach cluster roles"
    - name: skip-everything
      match:
        resources:
          names: ["web-1", "web-2"]
      exclude:
        resources:
          names: ["web-*"]
      validate:
        message: "never applies"
"#;

    let policy: Policy = match PolicyParser::from_yaml(yaml) {
        Ok(policy) => policy,
        Err(e) => {
            println!("Failed to parse policy: {}", e);
            return;
        }
    };

    let result = PolicyValidator::new(ValidatorConfig::default()).validate(&policy);
    println!("Policy '{}' valid: {}", policy.metadata.name, result.valid);
    for err in &result.errors {
        println!("  error: {}", err);
    }
    for warning in &result.warnings {
        println!("  warning: {:?}", warning);
    }
    println!("Webhook kinds: {:?}", policy.match_kinds());
}
