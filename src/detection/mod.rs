//! Repository detection: runtime classification and best-effort extraction
//! of build/start commands, exposed port and Python version.

pub mod analyzer;
pub mod app_type;
pub mod patterns;
pub mod types;

pub use analyzer::RepositoryAnalyzer;
pub use app_type::AppTypeDetector;
pub use types::{AppType, RepositoryAnalysis};
