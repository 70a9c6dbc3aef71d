//! Workspace loading — feeds source trees from disk into an `AnalysisHost`.

mod workspace_loader;

pub use workspace_loader::{LoadError, LoadSummary, WorkspaceLoader};
