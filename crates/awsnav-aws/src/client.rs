//! Per-profile SDK configuration and service client construction

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::debug;

/// Everything service calls need for one profile: the resolved SDK
/// configuration plus the identifiers the wizards display. Built once
/// per profile and never mutated afterwards.
pub struct SessionContext {
    pub profile: String,
    pub region: Option<String>,
    config: SdkConfig,
}

impl SessionContext {
    /// Resolve credentials and shared client settings for a profile.
    /// All clients share the same retry and timeout policy.
    pub async fn load(profile: &str, region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .profile_name(profile)
            .retry_config(RetryConfig::standard().with_max_attempts(3))
            .timeout_config(
                TimeoutConfig::builder()
                    .connect_timeout(Duration::from_secs(10))
                    .read_timeout(Duration::from_secs(30))
                    .build(),
            );
        if let Some(region) = region.clone() {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;
        debug!(profile, "resolved SDK configuration");
        Self {
            profile: profile.to_string(),
            region,
            config,
        }
    }

    pub fn ec2(&self) -> aws_sdk_ec2::Client {
        aws_sdk_ec2::Client::new(&self.config)
    }

    pub fn ecs(&self) -> aws_sdk_ecs::Client {
        aws_sdk_ecs::Client::new(&self.config)
    }

    pub fn logs(&self) -> aws_sdk_cloudwatchlogs::Client {
        aws_sdk_cloudwatchlogs::Client::new(&self.config)
    }

    pub fn apigateway(&self) -> aws_sdk_apigatewayv2::Client {
        aws_sdk_apigatewayv2::Client::new(&self.config)
    }

    pub fn catalog(&self) -> aws_sdk_servicecatalog::Client {
        aws_sdk_servicecatalog::Client::new(&self.config)
    }

    pub fn s3(&self) -> aws_sdk_s3::Client {
        aws_sdk_s3::Client::new(&self.config)
    }

    pub fn cost(&self) -> aws_sdk_costexplorer::Client {
        aws_sdk_costexplorer::Client::new(&self.config)
    }

    pub fn rds(&self) -> aws_sdk_rds::Client {
        aws_sdk_rds::Client::new(&self.config)
    }

    pub fn elb(&self) -> aws_sdk_elasticloadbalancingv2::Client {
        aws_sdk_elasticloadbalancingv2::Client::new(&self.config)
    }
}

/// Cache of session contexts keyed by profile name, so switching back
/// to an already-used profile skips credential resolution.
#[derive(Default)]
pub struct ContextCache {
    contexts: HashMap<String, Arc<SessionContext>>,
}

impl ContextCache {
    pub async fn get_or_load(&mut self, profile: &str, region: Option<String>) -> Arc<SessionContext> {
        if let Some(ctx) = self.contexts.get(profile) {
            return ctx.clone();
        }
        let ctx = Arc::new(SessionContext::load(profile, region).await);
        self.contexts.insert(profile.to_string(), ctx.clone());
        ctx
    }
}
