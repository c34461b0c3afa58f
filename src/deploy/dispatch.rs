use super::config::DeploymentConfig;
use crate::clients::{ClientError, DispatchRequest, Scheduler};
use crate::detection::AppType;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

pub const META_GITHUB_SLUG: &str = "GITHUB_SLUG";
pub const META_APP_NAME: &str = "APP_NAME";
pub const META_PORT: &str = "PORT";
pub const META_PYTHON_VERSION: &str = "PYTHON_VERSION";
pub const META_BUILD_COMMAND: &str = "BUILD_COMMAND";
pub const META_START_COMMAND: &str = "START_COMMAND";

/// Parameterized job registered on the scheduler ahead of time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobTemplate {
    GithubApp,
    PythonApp,
}

impl JobTemplate {
    pub fn for_app_type(app_type: AppType) -> Self {
        match app_type {
            AppType::Python => JobTemplate::PythonApp,
            _ => JobTemplate::GithubApp,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            JobTemplate::GithubApp => "github-app",
            JobTemplate::PythonApp => "python-app",
        }
    }
}

impl fmt::Display for JobTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dispatch metadata for `config`.
///
/// `PYTHON_VERSION` is only sent for python apps and the build/start commands
/// only for node apps, each only when known.
pub fn dispatch_meta(config: &DeploymentConfig) -> BTreeMap<String, String> {
    let mut meta = BTreeMap::new();
    meta.insert(META_GITHUB_SLUG.to_string(), config.slug.clone());
    meta.insert(META_APP_NAME.to_string(), config.app_name.clone());
    meta.insert(META_PORT.to_string(), config.port.to_string());

    let mut optional = |key: &str, value: &Option<String>| {
        if let Some(value) = value {
            meta.insert(key.to_string(), value.clone());
        }
    };

    match config.app_type {
        AppType::Python => optional(META_PYTHON_VERSION, &config.python_version),
        AppType::Node => {
            optional(META_BUILD_COMMAND, &config.build_cmd);
            optional(META_START_COMMAND, &config.start_cmd);
        }
        AppType::Go | AppType::Unknown => {}
    }

    meta
}

/// Turns a deployment descriptor into exactly one scheduler dispatch.
/// Scheduler errors are returned untouched.
pub struct DispatchAdapter {
    scheduler: Arc<dyn Scheduler>,
}

impl DispatchAdapter {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self { scheduler }
    }

    pub async fn dispatch(&self, config: &DeploymentConfig) -> Result<String, ClientError> {
        let template = JobTemplate::for_app_type(config.app_type);
        let request = DispatchRequest {
            meta: dispatch_meta(config),
        };

        let job_id = self.scheduler.dispatch(template.name(), &request).await?;
        info!(app_name = %config.app_name, %template, %job_id, "Dispatched deployment job");
        Ok(job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::config::DeploymentConfigBuilder;
    use crate::detection::RepositoryAnalysis;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingScheduler {
        calls: Mutex<Vec<(String, DispatchRequest)>>,
        fail_with: Option<u16>,
    }

    #[async_trait]
    impl Scheduler for RecordingScheduler {
        async fn dispatch(
            &self,
            template: &str,
            request: &DispatchRequest,
        ) -> Result<String, ClientError> {
            self.calls
                .lock()
                .unwrap()
                .push((template.to_string(), request.clone()));
            match self.fail_with {
                Some(status) => Err(ClientError::Status {
                    service: "nomad",
                    status,
                    body: "job not found".to_string(),
                }),
                None => Ok(format!("{}/dispatch-1", template)),
            }
        }
    }

    fn node_config() -> DeploymentConfig {
        DeploymentConfigBuilder::new("acme/web", AppType::Node)
            .with_analysis(RepositoryAnalysis {
                port: Some(8080),
                build_cmd: Some("npm run build".to_string()),
                start_cmd: Some("npm start".to_string()),
                python_version: None,
            })
            .build()
    }

    fn python_config(version: Option<&str>) -> DeploymentConfig {
        DeploymentConfigBuilder::new("acme/api", AppType::Python)
            .with_analysis(RepositoryAnalysis {
                python_version: version.map(str::to_string),
                build_cmd: Some("ignored".to_string()),
                ..Default::default()
            })
            .build()
    }

    #[test]
    fn test_template_selection() {
        assert_eq!(JobTemplate::for_app_type(AppType::Python), JobTemplate::PythonApp);
        assert_eq!(JobTemplate::for_app_type(AppType::Node), JobTemplate::GithubApp);
        assert_eq!(JobTemplate::for_app_type(AppType::Go), JobTemplate::GithubApp);
        assert_eq!(JobTemplate::for_app_type(AppType::Unknown), JobTemplate::GithubApp);
    }

    #[test]
    fn test_node_meta() {
        let meta = dispatch_meta(&node_config());

        assert_eq!(meta[META_GITHUB_SLUG], "acme/web");
        assert_eq!(meta[META_APP_NAME], "web");
        assert_eq!(meta[META_PORT], "8080");
        assert_eq!(meta[META_BUILD_COMMAND], "npm run build");
        assert_eq!(meta[META_START_COMMAND], "npm start");
        assert!(!meta.contains_key(META_PYTHON_VERSION));
    }

    #[test]
    fn test_python_meta_only_carries_version() {
        let meta = dispatch_meta(&python_config(Some("3.9")));

        assert_eq!(meta[META_PORT], "5000");
        assert_eq!(meta[META_PYTHON_VERSION], "3.9");
        assert!(!meta.contains_key(META_BUILD_COMMAND));
        assert!(!meta.contains_key(META_START_COMMAND));
    }

    #[test]
    fn test_optional_meta_omitted_when_unknown() {
        let meta = dispatch_meta(&python_config(None));
        assert_eq!(meta.len(), 3);

        let go = DeploymentConfigBuilder::new("acme/svc", AppType::Go)
            .with_analysis(RepositoryAnalysis {
                start_cmd: Some("npm start".to_string()),
                ..Default::default()
            })
            .build();
        assert_eq!(dispatch_meta(&go).len(), 3);
    }

    #[tokio::test]
    async fn test_dispatch_calls_scheduler_once() {
        let scheduler = Arc::new(RecordingScheduler::default());
        let adapter = DispatchAdapter::new(scheduler.clone());

        let job_id = adapter.dispatch(&python_config(Some("3.10"))).await.unwrap();

        assert_eq!(job_id, "python-app/dispatch-1");
        let calls = scheduler.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "python-app");
        assert_eq!(calls[0].1.meta[META_PYTHON_VERSION], "3.10");
    }

    #[tokio::test]
    async fn test_dispatch_error_is_not_retried() {
        let scheduler = Arc::new(RecordingScheduler {
            fail_with: Some(404),
            ..Default::default()
        });
        let adapter = DispatchAdapter::new(scheduler.clone());

        let err = adapter.dispatch(&node_config()).await.unwrap_err();

        assert_eq!(err.to_string(), "nomad returned 404: job not found");
        assert_eq!(scheduler.calls.lock().unwrap().len(), 1);
    }
}
