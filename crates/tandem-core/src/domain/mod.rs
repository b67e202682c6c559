// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Tandem.
//!
//! This module contains the pure model of the pipeline: examples and their
//! answers, render requests and outcomes, environment lists, and the
//! per-example and per-case state machines. Process execution and file I/O
//! are handled via ports (traits) defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: the whole pipeline is synchronous
//! - **No I/O**: No filesystem, process, or network calls
//! - **Immutable entities**: examples and outcomes are never mutated in place
//! - **Validated values**: names are checked at construction
//!
// Public API - what the world sees
pub mod entities;
pub mod error;
pub mod include;
pub mod value_objects;

// Re-exports for convenience
pub use entities::{
    environment::{EnvFilter, EnvironmentList, PLACEHOLDER_ENV},
    example::{Answers, Example},
    matrix::{
        CaseReport, CaseStatus, ExampleState, MatrixCase, MatrixPlan, MatrixReport, PipelineStep,
        SkipReason, SkippedExample,
    },
    render::{
        OutputLocation, RenderOutcome, RenderRequest, RenderedExample, StageLayout, WorkRoot,
    },
};

pub use error::{DomainError, ErrorCategory};

pub use value_objects::{EnvName, ExampleName, ExecutionMode, Stage};
