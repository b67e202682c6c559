//! Application layer for Tandem.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (RenderService, MatrixService, SandboxService, ...)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer and the external
//! tools. Rules about names, lists and state transitions live in
//! `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    DiscoveryService, EnvFileHook, ExampleRegistry, MatrixService, RenderService,
    SandboxReport, SandboxService, TemplateFetcher, TemplatePair,
};

// Re-export port traits (for adapter implementation)
pub use ports::{
    Capture, DeclaredEnvironments, EnvironmentRunner, ExampleSource, Invocation, ProcessOutput,
    ProcessRunner, ProjectVcs, TemplateRenderer, Workspace,
};

pub use error::ApplicationError;
