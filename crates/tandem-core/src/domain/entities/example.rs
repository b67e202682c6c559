use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{error::DomainError, value_objects::ExampleName};

/// Answers for one template: question name → value, in file order.
///
/// Values are carried verbatim; Tandem never interprets them, it only writes
/// them back out as the renderer's data file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers(Map<String, Value>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build answers from a parsed document.
    ///
    /// `null` (an empty YAML file) yields empty answers; any other non-mapping
    /// document is rejected.
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(map) => Ok(Self(map)),
            other => Err(DomainError::InvalidAnswers {
                reason: format!("expected a mapping at the top level, found {}", kind_of(&other)),
            }),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// A named pair of answer sets: one for the package template, one for the
/// rule template.
///
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    name: ExampleName,
    package_answers: Answers,
    rule_answers: Answers,
}

impl Example {
    pub fn new(name: ExampleName, package_answers: Answers, rule_answers: Answers) -> Self {
        Self {
            name,
            package_answers,
            rule_answers,
        }
    }

    pub fn name(&self) -> &ExampleName {
        &self.name
    }

    pub fn package_answers(&self) -> &Answers {
        &self.package_answers
    }

    pub fn rule_answers(&self) -> &Answers {
        &self.rule_answers
    }

    /// Answers for the given stage.
    pub fn answers_for(&self, stage: crate::domain::Stage) -> &Answers {
        match stage {
            crate::domain::Stage::Package => &self.package_answers,
            crate::domain::Stage::Rule => &self.rule_answers,
        }
    }
}
