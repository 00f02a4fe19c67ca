use crate::models::application::Application;

/// A free-text search target: either a top-level scalar field or one
/// sub-field of every element of a nested list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTarget {
    Scalar(&'static str),
    Nested {
        list: &'static str,
        field: &'static str,
    },
}

/// One filter condition. Field names are wire-form (camelCase), matching the
/// query parameters they were compiled from.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Exact string equality against the field's stored value.
    Eq { field: String, value: String },
    /// Case-insensitive substring match.
    Contains { field: String, value: String },
    /// Inclusive numeric range on `totalWorkExperience`. Bounds that failed
    /// to parse were dropped by the compiler and are simply absent here.
    Range {
        field: &'static str,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Case-insensitive substring disjunction across a fixed target set.
    /// Matches when any scalar target or any element of a nested list
    /// target contains the needle.
    AnyContains {
        needle: String,
        targets: &'static [TextTarget],
    },
}

/// Compiled, store-agnostic filter: a conjunction of clauses. Built fresh
/// per request, never persisted. An empty predicate matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    pub clauses: Vec<Clause>,
}

impl Predicate {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Reference matching semantics. Store backends that translate the
    /// predicate into their own query language (the Postgres store does)
    /// must agree with this function; the in-memory test store runs it
    /// directly.
    pub fn matches(&self, app: &Application) -> bool {
        self.clauses.iter().all(|clause| clause.matches(app))
    }
}

impl Clause {
    pub fn matches(&self, app: &Application) -> bool {
        match self {
            Clause::Eq { field, value } => {
                app.scalar_field(field).map_or(false, |v| v == *value)
            }
            Clause::Contains { field, value } => app
                .scalar_field(field)
                .map_or(false, |v| contains_ci(&v, value)),
            Clause::Range { min, max, .. } => {
                let n = app.total_work_experience;
                min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi)
            }
            Clause::AnyContains { needle, targets } => targets
                .iter()
                .any(|target| target_contains(app, target, needle)),
        }
    }
}

fn target_contains(app: &Application, target: &TextTarget, needle: &str) -> bool {
    match target {
        TextTarget::Scalar(field) => app
            .scalar_field(field)
            .map_or(false, |v| contains_ci(&v, needle)),
        TextTarget::Nested { list, field } => match *list {
            "educationQualifications" => app.education_qualifications.iter().any(|e| {
                let value = match *field {
                    "level" => e.level.as_deref(),
                    "subject" => e.subject.as_deref(),
                    "boardOrUniversity" => e.board_or_university.as_deref(),
                    "institutionName" => e.institution_name.as_deref(),
                    _ => None,
                };
                value.map_or(false, |v| contains_ci(v, needle))
            }),
            "workExperience" => app.work_experience.iter().any(|w| {
                let value = match *field {
                    "designation" => w.designation.as_deref(),
                    "institutionName" => w.institution_name.as_deref(),
                    _ => None,
                };
                value.map_or(false, |v| contains_ci(v, needle))
            }),
            "references" => app.references.iter().any(|r| {
                let value = match *field {
                    "name" => r.name.as_deref(),
                    "designation" => r.designation.as_deref(),
                    "contact" => r.contact.as_deref(),
                    _ => None,
                };
                value.map_or(false, |v| contains_ci(v, needle))
            }),
            _ => false,
        },
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
