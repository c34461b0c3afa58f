use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime category of a repository, decided by marker files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    Node,
    Python,
    Go,
    Unknown,
}

impl AppType {
    pub fn name(&self) -> &'static str {
        match self {
            AppType::Node => "node",
            AppType::Python => "python",
            AppType::Go => "go",
            AppType::Unknown => "unknown",
        }
    }

    /// Port assumed when nothing in the repository declares one
    pub fn default_port(&self) -> u16 {
        match self {
            AppType::Python => 5000,
            _ => 3000,
        }
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Settings inferred from a checkout.
///
/// Every field is optional and independent: `None` means the analyzer could
/// not determine the value, never that something went wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryAnalysis {
    pub port: Option<u16>,
    pub build_cmd: Option<String>,
    pub start_cmd: Option<String>,
    pub python_version: Option<String>,
}
