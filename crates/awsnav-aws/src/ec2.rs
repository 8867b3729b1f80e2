//! EC2 instance listing and lifecycle operations

use anyhow::{Context, Result};
use aws_sdk_ec2::types::{Filter, Instance};
use chrono::{DateTime, Utc};

use awsnav_types::InstanceInfo;

use crate::client::SessionContext;

/// Lifecycle state filter applied when listing instances
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StateFilter {
    #[default]
    All,
    Running,
    Stopped,
}

impl StateFilter {
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }

    /// Cycle through the filters in display order
    pub fn next(&self) -> Self {
        match self {
            Self::All => Self::Running,
            Self::Running => Self::Stopped,
            Self::Stopped => Self::All,
        }
    }

    fn as_state_name(&self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Running => Some("running"),
            Self::Stopped => Some("stopped"),
        }
    }
}

impl std::str::FromStr for StateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "running" => Ok(Self::Running),
            "stopped" => Ok(Self::Stopped),
            other => Err(format!("unknown state filter '{other}'")),
        }
    }
}

/// List instances, optionally restricted to one lifecycle state.
pub async fn list_instances(ctx: &SessionContext, state: StateFilter) -> Result<Vec<InstanceInfo>> {
    let mut request = ctx.ec2().describe_instances();
    if let Some(state_name) = state.as_state_name() {
        request = request.filters(
            Filter::builder()
                .name("instance-state-name")
                .values(state_name)
                .build(),
        );
    }

    let mut instances = Vec::new();
    let mut pages = request.into_paginator().send();
    while let Some(page) = pages.next().await {
        let page = page.context("Failed to list EC2 instances")?;
        for reservation in page.reservations() {
            for instance in reservation.instances() {
                instances.push(to_info(instance));
            }
        }
    }
    Ok(instances)
}

/// Fetch one instance by id. `None` means the id no longer resolves.
pub async fn get_instance(ctx: &SessionContext, instance_id: &str) -> Result<Option<InstanceInfo>> {
    let response = ctx
        .ec2()
        .describe_instances()
        .instance_ids(instance_id)
        .send()
        .await
        .with_context(|| format!("Failed to describe instance {instance_id}"))?;
    Ok(response
        .reservations()
        .iter()
        .flat_map(|r| r.instances())
        .next()
        .map(to_info))
}

pub async fn start_instance(ctx: &SessionContext, instance_id: &str) -> Result<()> {
    ctx.ec2()
        .start_instances()
        .instance_ids(instance_id)
        .send()
        .await
        .with_context(|| format!("Failed to start instance {instance_id}"))?;
    Ok(())
}

pub async fn stop_instance(ctx: &SessionContext, instance_id: &str) -> Result<()> {
    ctx.ec2()
        .stop_instances()
        .instance_ids(instance_id)
        .send()
        .await
        .with_context(|| format!("Failed to stop instance {instance_id}"))?;
    Ok(())
}

pub async fn reboot_instance(ctx: &SessionContext, instance_id: &str) -> Result<()> {
    ctx.ec2()
        .reboot_instances()
        .instance_ids(instance_id)
        .send()
        .await
        .with_context(|| format!("Failed to reboot instance {instance_id}"))?;
    Ok(())
}

fn to_info(instance: &Instance) -> InstanceInfo {
    let name = instance
        .tags()
        .iter()
        .find(|tag| tag.key() == Some("Name"))
        .and_then(|tag| tag.value())
        .map(str::to_string);

    InstanceInfo {
        id: instance.instance_id().unwrap_or_default().to_string(),
        name,
        state: instance
            .state()
            .and_then(|s| s.name())
            .map(|n| n.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        instance_type: instance
            .instance_type()
            .map(|t| t.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        availability_zone: instance
            .placement()
            .and_then(|p| p.availability_zone())
            .map(str::to_string),
        public_ip: instance.public_ip_address().map(str::to_string),
        private_ip: instance.private_ip_address().map(str::to_string),
        vpc_id: instance.vpc_id().map(str::to_string),
        subnet_id: instance.subnet_id().map(str::to_string),
        security_groups: instance
            .security_groups()
            .iter()
            .filter_map(|g| g.group_name())
            .map(str::to_string)
            .collect(),
        key_name: instance.key_name().map(str::to_string),
        image_id: instance.image_id().map(str::to_string),
        launch_time: instance
            .launch_time()
            .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_filter_cycle() {
        assert_eq!(StateFilter::All.next(), StateFilter::Running);
        assert_eq!(StateFilter::Running.next(), StateFilter::Stopped);
        assert_eq!(StateFilter::Stopped.next(), StateFilter::All);
    }

    #[test]
    fn test_state_filter_from_str() {
        assert_eq!("running".parse::<StateFilter>(), Ok(StateFilter::Running));
        assert!("terminated".parse::<StateFilter>().is_err());
    }

    #[test]
    fn test_only_all_skips_the_api_filter() {
        assert_eq!(StateFilter::All.as_state_name(), None);
        assert_eq!(StateFilter::Running.as_state_name(), Some("running"));
        assert_eq!(StateFilter::Stopped.as_state_name(), Some("stopped"));
    }
}
