//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "render an example", "collect the test
//! matrix" or "generate the sandbox".

pub mod discovery_service;
pub mod fetch_service;
pub mod hook_service;
pub mod matrix_service;
pub mod registry;
pub mod render_service;
pub mod sandbox_service;

pub use discovery_service::DiscoveryService;
pub use fetch_service::{DEFAULT_TEMPLATE_DIR, DEFAULT_TEMPLATE_URL, TemplateFetcher};
pub use hook_service::{ENVIRONMENT_FILE, EnvFileHook, TRIGGER_FILE};
pub use matrix_service::{MatrixService, Preparation, PreparedExample};
pub use registry::ExampleRegistry;
pub use render_service::{ANSWERS_FILE, RenderService, TemplatePair, is_remote_template};
pub use sandbox_service::{SandboxEntry, SandboxOutcome, SandboxReport, SandboxService};
