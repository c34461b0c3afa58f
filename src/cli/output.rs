//! Output formatting for JSON, YAML and human-readable text
//!
//! JSON and YAML render the same camelCase shapes the service produces, so
//! `--format json` output can be fed straight into other tooling.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::deploy::{DeploymentConfig, DispatchResult};
use crate::service::{AppsResponse, DeployResponse, HealthReport};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_deploy(&self, response: &DeployResponse) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(response, "deploy response"),
            OutputFormat::Yaml => to_yaml(response, "deploy response"),
            OutputFormat::Human => Ok(deploy_human(response)),
        }
    }

    pub fn format_apps(&self, response: &AppsResponse) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(response, "app list"),
            OutputFormat::Yaml => to_yaml(response, "app list"),
            OutputFormat::Human => Ok(apps_human(response)),
        }
    }

    pub fn format_health(&self, report: &HealthReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "health report"),
            OutputFormat::Yaml => to_yaml(report, "health report"),
            OutputFormat::Human => Ok(format!(
                "\u{2713} {} ({})\n",
                report.status,
                report.timestamp.to_rfc3339()
            )),
        }
    }

    pub fn format_config(&self, config: &DeploymentConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(config, "deployment config"),
            OutputFormat::Yaml => to_yaml(config, "deployment config"),
            OutputFormat::Human => Ok(config_human(config)),
        }
    }
}

fn to_json<T: Serialize>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {} to JSON", what))
}

fn to_yaml<T: Serialize>(value: &T, what: &str) -> Result<String> {
    serde_yaml::to_string(value).with_context(|| format!("Failed to serialize {} to YAML", what))
}

fn deploy_human(response: &DeployResponse) -> String {
    let deployed = response.results.iter().filter(|r| r.is_deployed()).count();
    let mut output = format!(
        "Deployment Results ({}/{} deployed)\n{}\n\n",
        deployed,
        response.results.len(),
        RULE
    );

    for result in &response.results {
        match result {
            DispatchResult::Deployed {
                slug,
                app_name,
                job_id,
                url,
            } => {
                output.push_str(&format!("\u{2713} {}\n", slug));
                output.push_str(&format!("\u{251C}\u{2500} App:  {}\n", app_name));
                output.push_str(&format!("\u{251C}\u{2500} Job:  {}\n", job_id));
                output.push_str(&format!("\u{2514}\u{2500} URL:  {}\n", url));
            }
            DispatchResult::Error { slug, error } => {
                output.push_str(&format!("\u{2717} {}\n", slug));
                output.push_str(&format!("\u{2514}\u{2500} Error: {}\n", error));
            }
        }
    }
    output
}

fn apps_human(response: &AppsResponse) -> String {
    if response.apps.is_empty() {
        return "No apps deployed\n".to_string();
    }

    let mut output = format!("Deployed Apps ({})\n{}\n\n", response.apps.len(), RULE);
    for app in &response.apps {
        output.push_str(&format!(
            "{:<24} {:<8} port {:<6} {}\n",
            app.name,
            app.config.app_type,
            app.config.port,
            app.config.slug
        ));
    }
    output
}

fn config_human(config: &DeploymentConfig) -> String {
    let unset = "(not specified)";
    let mut output = format!("Deployment Config\n{}\n\n", RULE);

    output.push_str(&format!("Slug:      {}\n", config.slug));
    output.push_str(&format!("App Name:  {}\n", config.app_name));
    output.push_str(&format!("App Type:  {}\n", config.app_type));
    output.push_str(&format!("Port:      {}\n", config.port));
    output.push_str(&format!(
        "Build:     {}\n",
        config.build_cmd.as_deref().unwrap_or(unset)
    ));
    output.push_str(&format!(
        "Start:     {}\n",
        config.start_cmd.as_deref().unwrap_or(unset)
    ));
    if let Some(version) = &config.python_version {
        output.push_str(&format!("Python:    {}\n", version));
    }
    output.push_str(&format!("URL:       {}\n", config.url()));
    output
}
