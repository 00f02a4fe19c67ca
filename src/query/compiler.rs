use std::collections::HashMap;

use crate::query::predicate::{Clause, Predicate, TextTarget};

/// Pagination and search keys consumed by the caller, never turned into
/// filter clauses.
const CONTROL_KEYS: [&str; 5] = ["page", "limit", "q", "minExperience", "maxExperience"];

/// Fields that filter by case-insensitive substring instead of equality.
const SUBSTRING_FIELDS: [&str; 6] = [
    "fullName",
    "email",
    "mobileNumber",
    "emergencyMobileNumber",
    "areaOfInterest",
    "subjectOrDepartment",
];

/// Everywhere the free-text `q` parameter looks, including sub-fields of
/// each nested list.
const FREE_TEXT_TARGETS: [TextTarget; 15] = [
    TextTarget::Scalar("fullName"),
    TextTarget::Scalar("email"),
    TextTarget::Scalar("mobileNumber"),
    TextTarget::Scalar("emergencyMobileNumber"),
    TextTarget::Scalar("areaOfInterest"),
    TextTarget::Scalar("subjectOrDepartment"),
    TextTarget::Nested {
        list: "educationQualifications",
        field: "level",
    },
    TextTarget::Nested {
        list: "educationQualifications",
        field: "subject",
    },
    TextTarget::Nested {
        list: "educationQualifications",
        field: "boardOrUniversity",
    },
    TextTarget::Nested {
        list: "educationQualifications",
        field: "institutionName",
    },
    TextTarget::Nested {
        list: "workExperience",
        field: "designation",
    },
    TextTarget::Nested {
        list: "workExperience",
        field: "institutionName",
    },
    TextTarget::Nested {
        list: "references",
        field: "name",
    },
    TextTarget::Nested {
        list: "references",
        field: "designation",
    },
    TextTarget::Nested {
        list: "references",
        field: "contact",
    },
];

/// Translates raw query parameters into a [`Predicate`]. Permissive by
/// contract: unknown keys become exact-match clauses rather than errors, and
/// experience bounds that fail to parse are dropped, not coerced to zero.
/// Deterministic (clauses come out in sorted key order) and side-effect free.
pub fn compile_filter(params: &HashMap<String, String>) -> Predicate {
    let mut predicate = Predicate::default();

    let mut keys: Vec<&String> = params.keys().collect();
    keys.sort();

    for key in keys {
        let value = &params[key];
        if value.is_empty() || CONTROL_KEYS.contains(&key.as_str()) {
            continue;
        }
        if SUBSTRING_FIELDS.contains(&key.as_str()) {
            predicate.clauses.push(Clause::Contains {
                field: key.clone(),
                value: value.clone(),
            });
        } else if key == "applicationType" {
            // Stored tokens are lower-case (school / college /
            // others/administration); normalize whatever the UI sent.
            predicate.clauses.push(Clause::Eq {
                field: key.clone(),
                value: value.to_lowercase(),
            });
        } else {
            predicate.clauses.push(Clause::Eq {
                field: key.clone(),
                value: value.clone(),
            });
        }
    }

    let min = parse_bound(params.get("minExperience"));
    let max = parse_bound(params.get("maxExperience"));
    if min.is_some() || max.is_some() {
        predicate.clauses.push(Clause::Range {
            field: "totalWorkExperience",
            min,
            max,
        });
    }

    if let Some(q) = params.get("q") {
        let q = q.trim();
        if !q.is_empty() {
            predicate.clauses.push(Clause::AnyContains {
                needle: q.to_string(),
                targets: &FREE_TEXT_TARGETS,
            });
        }
    }

    predicate
}

fn parse_bound(raw: Option<&String>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => {
            tracing::debug!(value = raw, "dropping unparseable experience bound");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_input_compiles_to_match_all() {
        let predicate = compile_filter(&HashMap::new());
        assert!(predicate.is_empty());
    }

    #[test]
    fn substring_fields_become_contains_clauses() {
        let predicate = compile_filter(&params(&[("fullName", "an")]));
        assert_eq!(
            predicate.clauses,
            vec![Clause::Contains {
                field: "fullName".into(),
                value: "an".into(),
            }]
        );
    }

    #[test]
    fn application_type_value_is_lowercased() {
        let predicate = compile_filter(&params(&[("applicationType", "College")]));
        assert_eq!(
            predicate.clauses,
            vec![Clause::Eq {
                field: "applicationType".into(),
                value: "college".into(),
            }]
        );
    }

    #[test]
    fn unknown_keys_pass_through_as_exact_match() {
        let predicate = compile_filter(&params(&[("futureField", "x"), ("gender", "Female")]));
        assert!(predicate.clauses.contains(&Clause::Eq {
            field: "futureField".into(),
            value: "x".into(),
        }));
        // Recognized keys are unaffected by the unknown one's presence.
        assert!(predicate.clauses.contains(&Clause::Eq {
            field: "gender".into(),
            value: "Female".into(),
        }));
    }

    #[test]
    fn experience_bounds_build_an_inclusive_range() {
        let predicate = compile_filter(&params(&[("minExperience", "2"), ("maxExperience", "5")]));
        assert_eq!(
            predicate.clauses,
            vec![Clause::Range {
                field: "totalWorkExperience",
                min: Some(2.0),
                max: Some(5.0),
            }]
        );
    }

    #[test]
    fn unparseable_bound_is_dropped_not_zeroed() {
        let predicate = compile_filter(&params(&[("minExperience", "abc"), ("maxExperience", "5")]));
        assert_eq!(
            predicate.clauses,
            vec![Clause::Range {
                field: "totalWorkExperience",
                min: None,
                max: Some(5.0),
            }]
        );

        // Both bounds unparseable: no range clause at all.
        let predicate = compile_filter(&params(&[("minExperience", "abc")]));
        assert!(predicate.is_empty());
    }

    #[test]
    fn blank_values_and_control_keys_are_skipped() {
        let predicate = compile_filter(&params(&[
            ("gender", ""),
            ("page", "3"),
            ("limit", "25"),
            ("q", "   "),
        ]));
        assert!(predicate.is_empty());
    }

    #[test]
    fn free_text_builds_one_disjunction_over_all_targets() {
        let predicate = compile_filter(&params(&[("q", "delhi")]));
        match &predicate.clauses[..] {
            [Clause::AnyContains { needle, targets }] => {
                assert_eq!(needle, "delhi");
                assert_eq!(targets.len(), FREE_TEXT_TARGETS.len());
            }
            other => panic!("unexpected clauses: {other:?}"),
        }
    }
}
