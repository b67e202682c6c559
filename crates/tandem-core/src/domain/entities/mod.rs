pub mod environment;
pub mod example;
pub mod matrix;
pub mod render;

pub use crate::domain::DomainError;
pub use environment::{EnvFilter, EnvironmentList, PLACEHOLDER_ENV};
pub use example::{Answers, Example};
pub use matrix::{
    CaseReport, CaseStatus, ExampleState, MatrixCase, MatrixPlan, MatrixReport, PipelineStep,
    SkipReason, SkippedExample,
};
pub use render::{
    OutputLocation, RenderOutcome, RenderRequest, RenderedExample, StageLayout, WorkRoot,
};
