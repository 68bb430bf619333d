//! Fargate task launches.

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_ecs::config::Region;
use aws_sdk_ecs::error::ProvideErrorMetadata;
use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, ContainerOverride, KeyValuePair, LaunchType,
    NetworkConfiguration, TaskOverride,
};
use aws_sdk_ecs::Client;
use tracing::{debug, info};

use vod_models::TranscodeJob;

use crate::error::{classify_error, DispatchError, DispatchResult};

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// ECS cluster name
    pub cluster: String,
    /// Task definition family or ARN
    pub task_definition: String,
    /// Container name within the task definition
    pub container_name: String,
    /// Subnets for the task's network interface
    pub subnets: Vec<String>,
    /// Security groups for the task's network interface
    pub security_groups: Vec<String>,
    /// Façade endpoint the worker reports its playback link to
    pub callback_url: String,
    /// AWS region
    pub region: String,
    /// Static access key; falls back to the default provider chain when absent
    pub access_key_id: Option<String>,
    /// Static secret key; falls back to the default provider chain when absent
    pub secret_access_key: Option<String>,
}

impl DispatchConfig {
    /// Create config from environment variables.
    pub fn from_env() -> DispatchResult<Self> {
        let require = |name: &str| {
            std::env::var(name)
                .map_err(|_| DispatchError::config_error(format!("{name} not set")))
        };

        Ok(Self {
            cluster: require("ECS_CLUSTER_NAME")?,
            task_definition: require("ECS_TASK_DEFINITION")?,
            container_name: std::env::var("ECS_CONTAINER_NAME")
                .unwrap_or_else(|_| "vod-transcoder".to_string()),
            subnets: split_list(&require("SUBNET_IDS")?),
            security_groups: split_list(&require("SECURITY_GROUP_IDS")?),
            callback_url: require("BACKEND_ENDPOINT")?,
            region: require("BUCKET_REGION")?,
            access_key_id: std::env::var("AMAZON_ACCESS_KEY").ok(),
            secret_access_key: std::env::var("AMAZON_SECRET_ACCESS_KEY").ok(),
        })
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Handle to a launched task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    /// ARN of the launched task
    pub task_arn: String,
}

/// ECS Fargate dispatcher.
#[derive(Debug, Clone)]
pub struct EcsDispatcher {
    client: Client,
    config: DispatchConfig,
}

impl EcsDispatcher {
    /// Create a new dispatcher from configuration.
    pub async fn new(config: DispatchConfig) -> DispatchResult<Self> {
        if config.subnets.is_empty() {
            return Err(DispatchError::config_error("no subnets configured"));
        }

        let region = Region::new(config.region.clone());

        let client = match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key), Some(secret_key)) => {
                let credentials =
                    Credentials::new(access_key, secret_key, None, None, "vodforge-env");
                let sdk_config = aws_sdk_ecs::config::Builder::new()
                    .behavior_version(BehaviorVersion::latest())
                    .region(region)
                    .credentials_provider(credentials)
                    .build();
                Client::from_conf(sdk_config)
            }
            _ => {
                let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await;
                Client::new(&sdk_config)
            }
        };

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub async fn from_env() -> DispatchResult<Self> {
        let config = DispatchConfig::from_env()?;
        Self::new(config).await
    }

    /// Launch one worker task for the given job.
    ///
    /// Returns as soon as the control plane accepts the launch; worker
    /// completion is never observed here.
    pub async fn dispatch(&self, job: &TranscodeJob) -> DispatchResult<TaskHandle> {
        debug!(job_id = %job.job_id, cluster = %self.config.cluster, "Launching worker task");

        let mut vpc = AwsVpcConfiguration::builder()
            .assign_public_ip(AssignPublicIp::Enabled);
        for subnet in &self.config.subnets {
            vpc = vpc.subnets(subnet);
        }
        for group in &self.config.security_groups {
            vpc = vpc.security_groups(group);
        }
        let vpc = vpc
            .build()
            .map_err(|e| DispatchError::InvalidParameter(e.to_string()))?;

        let overrides = TaskOverride::builder()
            .container_overrides(
                ContainerOverride::builder()
                    .name(&self.config.container_name)
                    .set_environment(Some(self.worker_environment(job)))
                    .build(),
            )
            .build();

        let response = self
            .client
            .run_task()
            .cluster(&self.config.cluster)
            .task_definition(&self.config.task_definition)
            .launch_type(LaunchType::Fargate)
            .network_configuration(
                NetworkConfiguration::builder().awsvpc_configuration(vpc).build(),
            )
            .overrides(overrides)
            .send()
            .await
            .map_err(|e| {
                let message = e
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string());
                classify_error(e.code(), &message)
            })?;

        let task_arn = response
            .tasks()
            .first()
            .and_then(|t| t.task_arn())
            .map(str::to_string);

        match task_arn {
            Some(task_arn) => {
                info!(job_id = %job.job_id, task_arn = %task_arn, "Worker task launched");
                Ok(TaskHandle { task_arn })
            }
            None => {
                let reason = response
                    .failures()
                    .first()
                    .and_then(|f| f.reason())
                    .unwrap_or("no task returned by RunTask");
                Err(DispatchError::infra(reason.to_string()))
            }
        }
    }

    /// Environment injected into the worker container.
    fn worker_environment(&self, job: &TranscodeJob) -> Vec<KeyValuePair> {
        let pair = |name: &str, value: &str| {
            KeyValuePair::builder().name(name).value(value).build()
        };

        let mut environment = vec![
            pair("SOURCE_URL", &job.source_url),
            pair("VIDEO_ID", job.job_id.as_str()),
            pair("OUTPUT_BUCKET", &job.output_bucket),
            pair("CDN_BASE_URL", &job.cdn_base_url),
            pair("CALLBACK_URL", &self.config.callback_url),
            pair("BUCKET_REGION", &self.config.region),
        ];

        if let (Some(access_key), Some(secret_key)) =
            (&self.config.access_key_id, &self.config.secret_access_key)
        {
            environment.push(pair("AMAZON_ACCESS_KEY", access_key));
            environment.push(pair("AMAZON_SECRET_ACCESS_KEY", secret_key));
        }

        environment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vod_models::JobId;

    fn test_config() -> DispatchConfig {
        DispatchConfig {
            cluster: "vod-cluster".to_string(),
            task_definition: "vod-transcoder:3".to_string(),
            container_name: "vod-transcoder".to_string(),
            subnets: vec!["subnet-a".to_string(), "subnet-b".to_string()],
            security_groups: vec!["sg-1".to_string()],
            callback_url: "https://api.example.com/api/v1/upload/upload-video-link".to_string(),
            region: "ap-south-1".to_string(),
            access_key_id: Some("test-access-key".to_string()),
            secret_access_key: Some("test-secret-key".to_string()),
        }
    }

    fn test_job() -> TranscodeJob {
        TranscodeJob {
            job_id: JobId::from("video-abc123"),
            source_url: "https://signed.example.com/uploads/video-abc123.mp4".to_string(),
            output_bucket: "hls-out".to_string(),
            cdn_base_url: "https://cdn.example.com".to_string(),
        }
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_list("a,,b"), vec!["a", "b"]);
        assert!(split_list("").is_empty());
    }

    #[tokio::test]
    async fn test_empty_subnets_rejected() {
        let config = DispatchConfig {
            subnets: vec![],
            ..test_config()
        };
        let err = EcsDispatcher::new(config).await.unwrap_err();
        assert!(matches!(err, DispatchError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_worker_environment_carries_job_parameters() {
        let dispatcher = EcsDispatcher::new(test_config()).await.unwrap();
        let environment = dispatcher.worker_environment(&test_job());

        let get = |name: &str| {
            environment
                .iter()
                .find(|kv| kv.name() == Some(name))
                .and_then(|kv| kv.value())
                .map(str::to_string)
        };

        assert_eq!(get("VIDEO_ID").as_deref(), Some("video-abc123"));
        assert_eq!(get("OUTPUT_BUCKET").as_deref(), Some("hls-out"));
        assert_eq!(get("CDN_BASE_URL").as_deref(), Some("https://cdn.example.com"));
        assert_eq!(
            get("CALLBACK_URL").as_deref(),
            Some("https://api.example.com/api/v1/upload/upload-video-link")
        );
        assert!(get("SOURCE_URL").unwrap().contains("video-abc123.mp4"));
        assert_eq!(get("AMAZON_ACCESS_KEY").as_deref(), Some("test-access-key"));
    }
}
