//! ECS cluster, service, and task operations

use anyhow::{Context, Result};

use awsnav_types::{ContainerLogSource, ServiceDetail, TaskSummary};

use crate::client::SessionContext;

fn arn_tail(arn: &str) -> &str {
    arn.split('/').next_back().unwrap_or(arn)
}

/// List cluster names, sorted case-insensitively.
pub async fn list_clusters(ctx: &SessionContext) -> Result<Vec<String>> {
    let mut clusters = Vec::new();
    let mut pages = ctx.ecs().list_clusters().into_paginator().send();
    while let Some(page) = pages.next().await {
        let page = page.context("Failed to list ECS clusters")?;
        clusters.extend(page.cluster_arns().iter().map(|arn| arn_tail(arn).to_string()));
    }
    clusters.sort_by_key(|name| name.to_lowercase());
    Ok(clusters)
}

/// List service names in a cluster, sorted case-insensitively.
pub async fn list_services(ctx: &SessionContext, cluster: &str) -> Result<Vec<String>> {
    let mut services = Vec::new();
    let mut pages = ctx
        .ecs()
        .list_services()
        .cluster(cluster)
        .into_paginator()
        .send();
    while let Some(page) = pages.next().await {
        let page = page.with_context(|| format!("Failed to list services in {cluster}"))?;
        services.extend(page.service_arns().iter().map(|arn| arn_tail(arn).to_string()));
    }
    services.sort_by_key(|name| name.to_lowercase());
    Ok(services)
}

pub async fn describe_service(
    ctx: &SessionContext,
    cluster: &str,
    service: &str,
) -> Result<ServiceDetail> {
    let response = ctx
        .ecs()
        .describe_services()
        .cluster(cluster)
        .services(service)
        .send()
        .await
        .with_context(|| format!("Failed to describe service {service}"))?;

    let svc = response
        .services()
        .first()
        .with_context(|| format!("Service '{service}' not found in cluster '{cluster}'"))?;

    Ok(ServiceDetail {
        name: svc.service_name().unwrap_or(service).to_string(),
        status: svc.status().unwrap_or("UNKNOWN").to_string(),
        task_definition: svc
            .task_definition()
            .map(arn_tail)
            .unwrap_or("-")
            .to_string(),
        desired_count: svc.desired_count(),
        running_count: svc.running_count(),
        pending_count: svc.pending_count(),
        launch_type: svc
            .launch_type()
            .map(|t| t.as_str().to_string())
            .unwrap_or_else(|| "-".to_string()),
    })
}

/// List the tasks currently attached to a service.
pub async fn list_tasks(
    ctx: &SessionContext,
    cluster: &str,
    service: &str,
) -> Result<Vec<TaskSummary>> {
    let listed = ctx
        .ecs()
        .list_tasks()
        .cluster(cluster)
        .service_name(service)
        .send()
        .await
        .with_context(|| format!("Failed to list tasks for {service}"))?;

    let task_arns = listed.task_arns();
    if task_arns.is_empty() {
        return Ok(Vec::new());
    }

    let described = ctx
        .ecs()
        .describe_tasks()
        .cluster(cluster)
        .set_tasks(Some(task_arns.to_vec()))
        .send()
        .await
        .context("Failed to describe tasks")?;

    Ok(described
        .tasks()
        .iter()
        .map(|task| TaskSummary {
            id: task.task_arn().map(arn_tail).unwrap_or("unknown").to_string(),
            arn: task.task_arn().unwrap_or_default().to_string(),
            last_status: task.last_status().unwrap_or("UNKNOWN").to_string(),
            desired_status: task.desired_status().unwrap_or("UNKNOWN").to_string(),
            health_status: task
                .health_status()
                .map(|h| h.as_str().to_string())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            containers: task
                .containers()
                .iter()
                .filter_map(|c| c.name())
                .map(str::to_string)
                .collect(),
        })
        .collect())
}

/// Resolve awslogs log groups from the service's current task
/// definition. Containers without an awslogs driver are skipped.
pub async fn container_log_sources(
    ctx: &SessionContext,
    cluster: &str,
    service: &str,
) -> Result<Vec<ContainerLogSource>> {
    let response = ctx
        .ecs()
        .describe_services()
        .cluster(cluster)
        .services(service)
        .send()
        .await
        .with_context(|| format!("Failed to describe service {service}"))?;

    let task_definition = response
        .services()
        .first()
        .and_then(|s| s.task_definition())
        .with_context(|| format!("Service '{service}' has no task definition"))?
        .to_string();

    let described = ctx
        .ecs()
        .describe_task_definition()
        .task_definition(&task_definition)
        .send()
        .await
        .with_context(|| format!("Failed to describe task definition {task_definition}"))?;

    let mut sources = Vec::new();
    if let Some(definition) = described.task_definition() {
        for container in definition.container_definitions() {
            let Some(config) = container.log_configuration() else {
                continue;
            };
            if config.log_driver().as_str() != "awslogs" {
                continue;
            }
            let Some(group) = config.options().and_then(|o| o.get("awslogs-group")) else {
                continue;
            };
            sources.push(ContainerLogSource {
                container: container.name().unwrap_or("unknown").to_string(),
                log_group: group.clone(),
            });
        }
    }
    Ok(sources)
}

/// Restart all tasks of a service by forcing a new deployment.
pub async fn force_new_deployment(
    ctx: &SessionContext,
    cluster: &str,
    service: &str,
) -> Result<()> {
    ctx.ecs()
        .update_service()
        .cluster(cluster)
        .service(service)
        .force_new_deployment(true)
        .send()
        .await
        .with_context(|| format!("Failed to force deployment of {service}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arn_tail_extracts_name() {
        assert_eq!(
            arn_tail("arn:aws:ecs:eu-west-1:123456789012:cluster/prod"),
            "prod"
        );
        assert_eq!(
            arn_tail("arn:aws:ecs:eu-west-1:123456789012:task/prod/1a2b3c"),
            "1a2b3c"
        );
    }

    #[test]
    fn test_arn_tail_passes_plain_names_through() {
        assert_eq!(arn_tail("prod"), "prod");
        assert_eq!(arn_tail(""), "");
    }
}
