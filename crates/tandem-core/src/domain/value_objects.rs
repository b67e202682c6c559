//! Domain value objects: ExampleName, EnvName, Stage, ExecutionMode.
//!
//! # Design
//!
//! These are pure value types: equality-by-value, no identity, validated at
//! construction. This file's only job is to define the types, their string
//! representations, and their `FromStr` parsers.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── ExampleName ──────────────────────────────────────────────────────────────

/// Identifier of a registered example (one answer-set pair).
///
/// Invariant: non-empty, no path separators, does not start with `.`.
/// The name doubles as a directory name under the sandbox root, so these
/// rules keep it a single safe path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExampleName(String);

impl ExampleName {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let invalid = |reason: &str| DomainError::InvalidExampleName {
            name: name.clone(),
            reason: reason.into(),
        };

        if name.trim().is_empty() {
            return Err(invalid("name cannot be empty"));
        }
        if name.starts_with('.') {
            return Err(invalid("name cannot start with '.'"));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(invalid("name cannot contain path separators"));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExampleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ExampleName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ExampleName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExampleName> for String {
    fn from(name: ExampleName) -> Self {
        name.0
    }
}

impl AsRef<str> for ExampleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ── EnvName ──────────────────────────────────────────────────────────────────

/// Name of a test/build environment declared by a rendered project.
///
/// Invariant: trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EnvName(String);

impl EnvName {
    pub fn new(name: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyEnvName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EnvName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for EnvName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EnvName> for String {
    fn from(name: EnvName) -> Self {
        name.0
    }
}

// ── Stage ────────────────────────────────────────────────────────────────────

/// Which half of the two-stage render a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Parent template, rendered first.
    Package,
    /// Child template, rendered on top of the package output.
    Rule,
}

impl Stage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::Rule => "rule",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "package" => Ok(Self::Package),
            "rule" => Ok(Self::Rule),
            other => Err(DomainError::InvalidStage(other.into())),
        }
    }
}

// ── ExecutionMode ────────────────────────────────────────────────────────────

/// How the environment runner should execute a single environment.
///
/// Tandem itself always issues one blocking call per environment; the mode is
/// only forwarded to the external runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Parallel,
    Serial,
}

impl ExecutionMode {
    pub const fn from_parallel_flag(parallel: bool) -> Self {
        if parallel { Self::Parallel } else { Self::Serial }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Parallel => "parallel",
            Self::Serial => "serial",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
