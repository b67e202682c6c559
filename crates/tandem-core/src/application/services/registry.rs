//! Example registry - the set of examples a run can select from.

use tracing::debug;

use crate::{
    application::{ApplicationError, ports::ExampleSource},
    domain::{Example, ExampleName},
    error::TandemResult,
};

/// Registered examples, in load order.
#[derive(Debug, Clone, Default)]
pub struct ExampleRegistry {
    examples: Vec<Example>,
}

impl ExampleRegistry {
    /// Load every example the source knows about.
    pub fn load(source: &dyn ExampleSource) -> TandemResult<Self> {
        let examples = source.load_all()?;
        debug!(count = examples.len(), "Examples loaded");
        Ok(Self { examples })
    }

    pub fn from_examples(examples: Vec<Example>) -> Self {
        Self { examples }
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn all(&self) -> &[Example] {
        &self.examples
    }

    pub fn names(&self) -> Vec<&ExampleName> {
        self.examples.iter().map(Example::name).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Example> {
        self.examples.iter().find(|e| e.name().as_str() == name)
    }

    /// Look up `names` in order. No names selects every example.
    ///
    /// If any name is unknown nothing is returned; the error lists all of
    /// the unknown names.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> TandemResult<Vec<Example>> {
        if names.is_empty() {
            return Ok(self.examples.clone());
        }

        let missing: Vec<String> = names
            .iter()
            .map(AsRef::as_ref)
            .filter(|n| self.get(n).is_none())
            .map(str::to_owned)
            .collect();

        if !missing.is_empty() {
            return Err(ApplicationError::UnknownExamples {
                missing,
                available: self.names().iter().map(|n| n.to_string()).collect(),
            }
            .into());
        }

        Ok(names
            .iter()
            .filter_map(|n| self.get(n.as_ref()).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockExampleSource;
    use crate::domain::Answers;
    use crate::error::TandemError;

    fn example(name: &str) -> Example {
        Example::new(ExampleName::new(name).unwrap(), Answers::new(), Answers::new())
    }

    fn registry() -> ExampleRegistry {
        ExampleRegistry::from_examples(vec![example("alpha"), example("beta")])
    }

    #[test]
    fn load_uses_the_source() {
        let mut source = MockExampleSource::new();
        source
            .expect_load_all()
            .times(1)
            .returning(|| Ok(vec![example("alpha")]));

        let registry = ExampleRegistry::load(&source).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("alpha").is_some());
    }

    #[test]
    fn empty_selection_means_all() {
        let all = registry().resolve::<&str>(&[]).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn resolve_keeps_requested_order() {
        let picked = registry().resolve(&["beta", "alpha"]).unwrap();
        let names: Vec<_> = picked.iter().map(|e| e.name().as_str()).collect();
        assert_eq!(names, vec!["beta", "alpha"]);
    }

    #[test]
    fn unknown_names_are_all_reported() {
        let err = registry()
            .resolve(&["alpha", "nope", "../x"])
            .unwrap_err();
        match err {
            TandemError::Application(ApplicationError::UnknownExamples { missing, .. }) => {
                assert_eq!(missing, vec!["nope".to_string(), "../x".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
