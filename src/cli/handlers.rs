//! Command handlers. Each returns the process exit code.

use super::commands::{AppsArgs, DeployArgs, DetectArgs, HealthArgs, ServiceArgs};
use super::output::OutputFormatter;
use crate::config::{ConfigError, SlugshipConfig};
use crate::deploy::{BatchOrchestrator, DeploymentConfig, DeploymentConfigBuilder};
use crate::detection::{AppTypeDetector, RepositoryAnalyzer};
use crate::fs::{FileSystem, RealFileSystem};
use crate::service::{self, DeployRequest, DeployService};
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

pub async fn handle_deploy(args: &DeployArgs) -> i32 {
    let mut config = apply_overrides(SlugshipConfig::default(), &args.service);
    if let Some(dir) = &args.repos_dir {
        config.repos_dir = dir.clone();
    }
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return 1;
    }
    debug!("{}", config);

    let request = match &args.request {
        Some(source) => match read_request(source) {
            Ok(request) => request,
            Err(e) => {
                error!("Invalid deploy request: {:#}", e);
                return 1;
            }
        },
        None => DeployRequest::new(args.slugs.clone()),
    };

    let service = match build_service(&config) {
        Ok(service) => service,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    info!(count = request.len(), "Deploying repositories");
    let response = service.deploy_request(&request).await;

    print_output(OutputFormatter::new(args.format.into()).format_deploy(&response))
}

pub async fn handle_apps(args: &AppsArgs) -> i32 {
    let config = apply_overrides(SlugshipConfig::default(), &args.service);
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return 1;
    }

    let service = match build_service(&config) {
        Ok(service) => service,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    match service.list_apps().await {
        Ok(apps) => print_output(OutputFormatter::new(args.format.into()).format_apps(&apps)),
        Err(e) => {
            error!("Failed to list apps: {}", e);
            1
        }
    }
}

pub async fn handle_health(args: &HealthArgs) -> i32 {
    let report = service::health_report();
    print_output(OutputFormatter::new(args.format.into()).format_health(&report))
}

pub async fn handle_detect(args: &DetectArgs) -> i32 {
    let repo_path = match &args.repository_path {
        Some(path) => path.clone(),
        None => match env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                error!("Failed to get current directory: {}", e);
                return 1;
            }
        },
    };

    if !repo_path.is_dir() {
        error!(
            "Repository path is not a directory: {}",
            repo_path.display()
        );
        return 1;
    }

    let repo_path = match repo_path.canonicalize() {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to canonicalize repository path: {}", e);
            return 1;
        }
    };

    let slug = args
        .slug
        .clone()
        .unwrap_or_else(|| default_slug(&repo_path));
    let config = detect_config(&RealFileSystem::new(), &repo_path, &slug);

    print_output(OutputFormatter::new(args.format.into()).format_config(&config))
}

/// CLI flags win over environment values
pub fn apply_overrides(mut config: SlugshipConfig, args: &ServiceArgs) -> SlugshipConfig {
    if let Some(addr) = &args.consul_addr {
        config.consul_addr = addr.clone();
    }
    if let Some(addr) = &args.nomad_addr {
        config.nomad_addr = addr.clone();
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }
    config
}

/// Reads a request body from a file, or from stdin when the path is `-`
pub fn read_request(source: &Path) -> Result<DeployRequest> {
    let text = if source == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read request from stdin")?;
        text
    } else {
        fs::read_to_string(source)
            .with_context(|| format!("Failed to read request file {:?}", source))?
    };

    Ok(DeployRequest::from_json(&text)?)
}

/// Same detection and config building a deploy runs, minus the clone
pub fn detect_config(fs: &dyn FileSystem, repo_path: &Path, slug: &str) -> DeploymentConfig {
    let app_type = AppTypeDetector::new(fs).detect(repo_path);
    let analysis = RepositoryAnalyzer::new(fs).analyze(repo_path);

    DeploymentConfigBuilder::new(slug, app_type)
        .with_analysis(analysis)
        .build()
}

/// `local/<dir name>` for checkouts with no slug given
pub fn default_slug(repo_path: &Path) -> String {
    let name = repo_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string());
    format!("local/{}", name)
}

fn build_service(config: &SlugshipConfig) -> Result<DeployService, ConfigError> {
    let kv = Arc::new(config.consul_client()?);
    let scheduler = Arc::new(config.nomad_client()?);
    let cloner = Arc::new(config.git_cloner());

    let orchestrator =
        BatchOrchestrator::new(cloner, Arc::new(RealFileSystem::new()), kv.clone(), scheduler);
    Ok(DeployService::new(orchestrator, kv))
}

fn print_output(rendered: Result<String>) -> i32 {
    match rendered {
        Ok(text) => {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
            0
        }
        Err(e) => {
            error!("Failed to format output: {:#}", e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::AppType;
    use crate::fs::MockFileSystem;
    use tempfile::TempDir;

    #[test]
    fn test_apply_overrides() {
        let base = SlugshipConfig::default();
        let args = ServiceArgs {
            consul_addr: Some("http://127.0.0.1:8500".to_string()),
            nomad_addr: None,
            timeout: Some(7),
        };

        let config = apply_overrides(base.clone(), &args);
        assert_eq!(config.consul_addr, "http://127.0.0.1:8500");
        assert_eq!(config.nomad_addr, base.nomad_addr);
        assert_eq!(config.request_timeout_secs, 7);
    }

    #[test]
    fn test_read_request_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("body.json");
        fs::write(&path, r#"{"slugs": ["acme/web", "acme/api"]}"#).unwrap();

        let request = read_request(&path).unwrap();
        assert_eq!(
            request,
            DeployRequest::new(vec!["acme/web".to_string(), "acme/api".to_string()])
        );
    }

    #[test]
    fn test_read_request_rejects_non_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("body.json");
        fs::write(&path, r#"{"slugs": "acme/web"}"#).unwrap();

        let err = read_request(&path).unwrap_err();
        assert_eq!(err.to_string(), "slugs must be an array");
    }

    #[test]
    fn test_read_request_missing_file() {
        let err = read_request(Path::new("/nonexistent/body.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read request file"));
    }

    #[test]
    fn test_detect_config_with_mock_fs() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "/mock/package.json",
            r#"{"scripts": {"build": "tsc", "start": "node server.js --port 8080"}}"#,
        );

        let config = detect_config(&fs, Path::new("/mock"), "acme/Web_App");
        assert_eq!(config.app_type, AppType::Node);
        assert_eq!(config.app_name, "web-app");
        assert_eq!(config.port, 8080);
        assert_eq!(config.build_cmd.as_deref(), Some("npm run build"));
        assert_eq!(config.start_cmd.as_deref(), Some("npm start"));
    }

    #[test]
    fn test_default_slug() {
        assert_eq!(default_slug(Path::new("/work/my-app")), "local/my-app");
    }
}
