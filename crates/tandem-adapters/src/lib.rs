//! Infrastructure adapters for Tandem.
//!
//! This crate implements the ports defined in `tandem-core::application::ports`.
//! It contains all external dependencies, process spawning and I/O operations.

pub mod answers;
pub mod copier;
pub mod git;
pub mod process;
pub mod pyproject;
pub mod tox;
pub mod workspace;

// Re-export commonly used adapters
pub use answers::{AnswersDirectory, load_answers};
pub use copier::CopierRenderer;
pub use git::GitCli;
pub use process::SystemProcessRunner;
pub use pyproject::PyprojectReader;
pub use tox::ToxRunner;
pub use workspace::{LocalWorkspace, copy_tree};
