//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `tandem-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `ProcessRunner`: spawning external programs
//!   - `TemplateRenderer`: rendering one template stage
//!   - `EnvironmentRunner` / `DeclaredEnvironments`: listing and running test environments
//!   - `ExampleSource`: loading registered examples
//!   - `Workspace`: filesystem side effects
//!   - `ProjectVcs`: git
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    Capture, DeclaredEnvironments, EnvironmentRunner, ExampleSource, Invocation, ProcessOutput,
    ProcessRunner, ProjectVcs, TemplateRenderer, Workspace,
};

#[cfg(test)]
pub use output::{
    MockDeclaredEnvironments, MockEnvironmentRunner, MockExampleSource, MockProcessRunner,
    MockProjectVcs, MockTemplateRenderer, MockWorkspace,
};
