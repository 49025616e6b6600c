//! Built-in placement rules, in evaluation order.

use super::{Condition, MismatchRule};
use workbench_model::{Category, RoleTag};

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|word| word.to_string()).collect()
}

fn name_contains(list: &[&str]) -> Condition {
    Condition::NameContains(words(list))
}

fn parent_contains(list: &[&str]) -> Condition {
    Condition::ParentNameContains(words(list))
}

fn rule(name: &str, description: &str, when: Condition, reason: &str) -> MismatchRule {
    MismatchRule::new(name, when, reason).with_description(description)
}

/// The standard table. Order matters: the first match wins.
pub fn builtin_rules() -> Vec<MismatchRule> {
    vec![
        rule(
            "outcome-under-demographics",
            "Outcome endpoints do not belong in demographic or baseline sections",
            Condition::AllOf(vec![
                Condition::AnyOf(vec![
                    Condition::RoleIs(RoleTag::Outcome),
                    Condition::HasEndpointTier,
                ]),
                parent_contains(&["demographic", "baseline"]),
            ]),
            "Outcome endpoint \"{name}\" should not be nested under demographic/baseline section",
        ),
        rule(
            "demographics-under-outcome",
            "Demographic variables do not belong in outcome sections",
            Condition::AllOf(vec![
                Condition::CategoryIs(Category::Demographics),
                parent_contains(&["outcome", "endpoint", "efficacy"]),
            ]),
            "Demographic variable \"{name}\" should not be in outcome/endpoint section",
        ),
        rule(
            "treatment-under-demographics",
            "Treatment variables do not belong in demographic sections",
            Condition::AllOf(vec![
                Condition::CategoryIs(Category::Treatments),
                parent_contains(&["demographic", "baseline characteristics"]),
            ]),
            "Treatment variable \"{name}\" should not be in demographics section",
        ),
        rule(
            "laboratory-under-treatment",
            "Laboratory tests do not belong in treatment sections",
            Condition::AllOf(vec![
                Condition::CategoryIs(Category::Laboratory),
                parent_contains(&["treatment", "intervention"]),
            ]),
            "Laboratory test \"{name}\" should not be nested under treatment section",
        ),
        rule(
            "survival-misplaced",
            "Survival and mortality outcomes belong in outcome sections",
            Condition::AllOf(vec![
                name_contains(&["survival", "mortality", "death"]),
                parent_contains(&["demographic", "baseline", "procedure"]),
            ]),
            "Survival/mortality outcome \"{name}\" is semantically misplaced in this section",
        ),
        rule(
            "assessment-under-demographics",
            "Clinical assessments belong in assessment sections",
            Condition::AllOf(vec![
                name_contains(&["nihss", "rankin", "mrs", "score", "scale"]),
                parent_contains(&["demographic", "identification"]),
            ]),
            "Clinical assessment \"{name}\" should be in assessments section, not demographics",
        ),
        rule(
            "procedure-under-outcome",
            "Procedure variables belong in treatment or procedure sections",
            Condition::AllOf(vec![
                name_contains(&["procedure", "surgery", "operation"]),
                parent_contains(&["outcome", "endpoint"]),
            ]),
            "Procedure variable \"{name}\" should be in treatments/procedures section, not outcomes",
        ),
    ]
}
