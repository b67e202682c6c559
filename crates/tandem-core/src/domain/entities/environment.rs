use serde::Serialize;

use crate::domain::value_objects::EnvName;

/// Name used when a project declares no environments at all.
pub const PLACEHOLDER_ENV: &str = "NOTSET";

/// Ordered, duplicate-free, never-empty list of environments.
///
/// The only constructor is [`EnvironmentList::from_discovered`], which falls
/// back to the [`PLACEHOLDER_ENV`] entry so that downstream iteration never
/// silently runs zero environments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentList {
    envs: Vec<EnvName>,
    placeholder: bool,
}

impl EnvironmentList {
    pub fn from_discovered<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut envs: Vec<EnvName> = Vec::new();
        for name in names {
            if let Ok(env) = EnvName::new(name) {
                if !envs.contains(&env) {
                    envs.push(env);
                }
            }
        }

        if envs.is_empty() {
            return Self::placeholder();
        }

        Self {
            envs,
            placeholder: false,
        }
    }

    pub fn placeholder() -> Self {
        Self {
            envs: vec![EnvName::new(PLACEHOLDER_ENV).expect("placeholder is a valid name")],
            placeholder: true,
        }
    }

    /// `true` when nothing was discovered and the list holds only the
    /// placeholder entry.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn len(&self) -> usize {
        self.envs.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.envs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnvName> {
        self.envs.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.envs.iter().map(EnvName::as_str).collect()
    }

    pub fn contains(&self, env: &EnvName) -> bool {
        self.envs.contains(env)
    }
}

/// Caller-supplied subset of environments to run. Empty selects all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFilter {
    selected: Vec<EnvName>,
}

impl EnvFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only(selected: impl IntoIterator<Item = EnvName>) -> Self {
        Self {
            selected: selected.into_iter().collect(),
        }
    }

    pub fn is_all(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected environments in the project's declared order.
    pub fn apply(&self, envs: &EnvironmentList) -> Vec<EnvName> {
        envs.iter()
            .filter(|env| self.is_all() || self.selected.contains(env))
            .cloned()
            .collect()
    }
}
