use super::naming::sanitize_app_name;
use crate::detection::{AppType, RepositoryAnalysis};
use serde::{Deserialize, Serialize};

/// Canonical deployment descriptor, stored as JSON under `apps/<appName>/config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    pub slug: String,
    pub app_name: String,
    pub app_type: AppType,
    pub port: u16,
    pub build_cmd: Option<String>,
    pub start_cmd: Option<String>,
    pub python_version: Option<String>,
}

impl DeploymentConfig {
    pub fn kv_key(&self) -> String {
        format!("apps/{}/config", self.app_name)
    }

    pub fn url(&self) -> String {
        format!("http://{}.localhost", self.app_name)
    }
}

/// Merges detection output into a [`DeploymentConfig`], filling in the port
/// from the app type when the repository declares none.
#[derive(Debug, Clone)]
pub struct DeploymentConfigBuilder {
    slug: String,
    app_type: AppType,
    analysis: RepositoryAnalysis,
}

impl DeploymentConfigBuilder {
    pub fn new(slug: impl Into<String>, app_type: AppType) -> Self {
        Self {
            slug: slug.into(),
            app_type,
            analysis: RepositoryAnalysis::default(),
        }
    }

    pub fn with_analysis(mut self, analysis: RepositoryAnalysis) -> Self {
        self.analysis = analysis;
        self
    }

    pub fn build(self) -> DeploymentConfig {
        let port = self
            .analysis
            .port
            .filter(|port| *port != 0)
            .unwrap_or_else(|| self.app_type.default_port());

        DeploymentConfig {
            app_name: sanitize_app_name(&self.slug),
            slug: self.slug,
            app_type: self.app_type,
            port,
            build_cmd: self.analysis.build_cmd,
            start_cmd: self.analysis.start_cmd,
            python_version: self.analysis.python_version,
        }
    }
}
