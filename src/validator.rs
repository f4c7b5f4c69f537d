use crate::model::song::{Direction, NoteColor};
use crate::note_encoder::AUTHOR_FIELD_LEN;
use serde_yaml::Value;
use std::fmt;
use thiserror::Error;

/// Dotted location of a field inside a chart document, e.g. `song.difficulty`
/// or `notes[3].color`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn child(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{}", self.0, name))
        }
    }

    pub fn element(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "(document root)")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("Missing field: {path}")]
    MissingField { path: FieldPath },

    #[error("Invalid field: {path} must be {expected}")]
    InvalidField { path: FieldPath, expected: String },
}

impl Diagnostic {
    pub fn path(&self) -> &FieldPath {
        match self {
            Diagnostic::MissingField { path } => path,
            Diagnostic::InvalidField { path, .. } => path,
        }
    }
}

/// Everything wrong with one chart document. Validation never stops at the
/// first problem, so a single pass shows a chart author the full list of fixes.
#[derive(Debug, Default)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn missing(&mut self, path: FieldPath) {
        self.diagnostics.push(Diagnostic::MissingField { path });
    }

    fn invalid(&mut self, path: FieldPath, expected: impl Into<String>) {
        self.diagnostics.push(Diagnostic::InvalidField {
            path,
            expected: expected.into(),
        });
    }
}

/// One requirement on a field's value. Schemas are plain data, so the chart
/// ruleset below reads like the .yaml format documentation.
pub enum Constraint {
    /// The value must equal this YAML value exactly.
    Literal(Value),

    /// The value must satisfy an arbitrary check. `expects` names the
    /// requirement in diagnostics.
    Predicate {
        expects: &'static str,
        check: fn(&Value) -> bool,
    },

    /// The value must be one of a fixed set of strings.
    OneOf(&'static [&'static str]),

    /// The value must be a mapping whose fields satisfy a nested schema.
    Fields(Schema),

    /// The value must be a sequence, every element a mapping satisfying a nested schema.
    ItemsOf(Schema),
}

pub struct FieldRule {
    pub name: &'static str,
    pub required: bool,
    pub constraint: Constraint,
}

pub struct Schema {
    pub fields: Vec<FieldRule>,
}

/// Validate a parsed chart document against the chart schema.
pub fn validate(doc: &Value) -> Report {
    let mut report = Report::default();
    check_fields(&chart_schema(), doc, &FieldPath::root(), &mut report);
    report
}

fn check_fields(schema: &Schema, value: &Value, path: &FieldPath, report: &mut Report) {
    if value.as_mapping().is_none() {
        report.invalid(path.clone(), "a mapping");
        return;
    }

    for rule in &schema.fields {
        // An explicit null is treated the same as an absent field.
        match value.get(rule.name) {
            Some(v) if !v.is_null() => {
                check_constraint(&rule.constraint, v, &path.child(rule.name), report);
            }
            _ => {
                if rule.required {
                    report.missing(path.child(rule.name));
                }
            }
        }
    }
}

fn check_constraint(constraint: &Constraint, value: &Value, path: &FieldPath, report: &mut Report) {
    match constraint {
        Constraint::Literal(expected) => {
            if value != expected {
                report.invalid(path.clone(), render_literal(expected));
            }
        }
        Constraint::Predicate { expects, check } => {
            if !check(value) {
                report.invalid(path.clone(), *expects);
            }
        }
        Constraint::OneOf(allowed) => {
            if !value.as_str().is_some_and(|s| allowed.contains(&s)) {
                report.invalid(path.clone(), format!("one of {}", allowed.join(", ")));
            }
        }
        Constraint::Fields(schema) => {
            check_fields(schema, value, path, report);
        }
        Constraint::ItemsOf(schema) => match value.as_sequence() {
            Some(items) => {
                for (index, item) in items.iter().enumerate() {
                    check_fields(schema, item, &path.element(index), report);
                }
            }
            None => report.invalid(path.clone(), "a sequence"),
        },
    }
}

fn render_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => format!("{:?}", other),
    }
}

fn non_negative_integer() -> Constraint {
    Constraint::Predicate {
        expects: "a non-negative integer",
        check: |v| v.as_u64().is_some(),
    }
}

/// The rules a chart document must satisfy before it can be compiled.
fn chart_schema() -> Schema {
    Schema {
        fields: vec![
            FieldRule {
                name: "song",
                required: true,
                constraint: Constraint::Fields(Schema {
                    fields: vec![
                        FieldRule {
                            name: "ms_per_pixel",
                            required: true,
                            constraint: non_negative_integer(),
                        },
                        FieldRule {
                            name: "lead_in_ms",
                            required: true,
                            constraint: non_negative_integer(),
                        },
                        FieldRule {
                            name: "author",
                            required: false,
                            constraint: Constraint::Predicate {
                                expects: "a string of at most 32 bytes",
                                check: |v| v.as_str().is_some_and(|s| s.len() <= AUTHOR_FIELD_LEN),
                            },
                        },
                        FieldRule {
                            name: "difficulty",
                            required: true,
                            constraint: Constraint::Predicate {
                                expects: "an integer from 1 to 10",
                                check: |v| v.as_i64().is_some_and(|n| (1..=10).contains(&n)),
                            },
                        },
                    ],
                }),
            },
            FieldRule {
                name: "notes",
                required: true,
                constraint: Constraint::ItemsOf(Schema {
                    fields: vec![
                        FieldRule {
                            name: "color",
                            required: true,
                            constraint: Constraint::OneOf(NoteColor::NAMES),
                        },
                        FieldRule {
                            name: "direction",
                            required: true,
                            constraint: Constraint::OneOf(Direction::NAMES),
                        },
                        FieldRule {
                            name: "start_ms",
                            required: true,
                            constraint: non_negative_integer(),
                        },
                        FieldRule {
                            name: "length_ms",
                            required: true,
                            constraint: non_negative_integer(),
                        },
                        FieldRule {
                            name: "speed",
                            required: false,
                            constraint: Constraint::Predicate {
                                expects: "a number greater than zero",
                                check: |v| v.as_f64().is_some_and(|x| x > 0.0),
                            },
                        },
                    ],
                }),
            },
        ],
    }
}
