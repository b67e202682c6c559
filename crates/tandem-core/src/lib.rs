//! Tandem Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Tandem, the
//! two-stage template test harness, following hexagonal (ports and
//! adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           tandem-cli (CLI)              │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (RenderService, MatrixService, ...)    │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Driven: Renderer, Runner, Workspace)   │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    tandem-adapters (Infrastructure)     │
//! │   (CopierRenderer, ToxRunner, GitCli)   │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Example, EnvironmentList, MatrixCase)  │
//! │         No External Dependencies        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tandem_core::prelude::*;
//!
//! // 1. Wire adapters into the services
//! let render = RenderService::new(renderer, workspace, TemplatePair::new(package, rule));
//! let discovery = DiscoveryService::new(runner.clone(), declared);
//! let mut matrix = MatrixService::new(render, discovery, runner, vcs);
//!
//! // 2. Collect and run every (example, environment) pair
//! let plan = matrix.collect(registry.all(), &EnvFilter::all())?;
//! let report = matrix.run_all(&plan, ExecutionMode::Parallel, true)?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        DiscoveryService, EnvFileHook, ExampleRegistry, MatrixService, RenderService,
        SandboxService, TemplateFetcher, TemplatePair,
        ports::{
            DeclaredEnvironments, EnvironmentRunner, ExampleSource, ProcessRunner, ProjectVcs,
            TemplateRenderer, Workspace,
        },
    };
    pub use crate::domain::{
        Answers, EnvFilter, EnvName, EnvironmentList, Example, ExampleName, ExecutionMode,
        MatrixCase, MatrixPlan, MatrixReport, Stage,
    };
    pub use crate::error::{TandemError, TandemResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
