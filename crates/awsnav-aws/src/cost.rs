//! Cost Explorer summaries and the idle resource scan

use anyhow::{Context, Result};
use aws_sdk_costexplorer::types::{
    DateInterval, Granularity, GroupDefinition, GroupDefinitionType, Metric,
};
use aws_sdk_ec2::types::Filter;
use chrono::{Datelike, Days, Months, NaiveDate, Utc};
use tracing::warn;

use awsnav_types::{CostSummary, IdleResource, ServiceCost};

use crate::client::SessionContext;
use crate::ec2::{self, StateFilter};

const DATE_FMT: &str = "%Y-%m-%d";
const SNAPSHOT_AGE_DAYS: i64 = 90;

/// Month-to-date interval: first of the month through tomorrow
/// (Cost Explorer end dates are exclusive).
fn month_range(today: NaiveDate) -> (String, String) {
    let start = today.with_day0(0).unwrap_or(today);
    let end = today.checked_add_days(Days::new(1)).unwrap_or(today);
    (start.format(DATE_FMT).to_string(), end.format(DATE_FMT).to_string())
}

/// Remainder-of-month interval for the forecast, or `None` when the
/// month is already over tomorrow.
fn forecast_range(today: NaiveDate) -> Option<(String, String)> {
    let start = today.checked_add_days(Days::new(1))?;
    let next_month = today.with_day0(0)?.checked_add_months(Months::new(1))?;
    if start >= next_month {
        return None;
    }
    Some((
        start.format(DATE_FMT).to_string(),
        next_month.format(DATE_FMT).to_string(),
    ))
}

fn parse_amount(amount: Option<&str>) -> f64 {
    amount.and_then(|a| a.parse().ok()).unwrap_or(0.0)
}

/// Unblended month-to-date spend, with an end-of-month forecast when
/// one is available.
pub async fn month_to_date(ctx: &SessionContext) -> Result<CostSummary> {
    let today = Utc::now().date_naive();
    let (start, end) = month_range(today);

    let response = ctx
        .cost()
        .get_cost_and_usage()
        .time_period(
            DateInterval::builder()
                .start(start.as_str())
                .end(end.as_str())
                .build()
                .context("Invalid cost interval")?,
        )
        .granularity(Granularity::Monthly)
        .metrics("UnblendedCost")
        .send()
        .await
        .context("Failed to fetch month-to-date cost")?;

    let mut total = 0.0;
    let mut unit = "USD".to_string();
    for result in response.results_by_time() {
        if let Some(metric) = result.total().and_then(|t| t.get("UnblendedCost")) {
            total += parse_amount(metric.amount());
            if let Some(u) = metric.unit() {
                unit = u.to_string();
            }
        }
    }

    Ok(CostSummary {
        start,
        end,
        total,
        unit,
        forecast: fetch_forecast(ctx, today).await,
    })
}

/// Forecast failures degrade the summary instead of aborting it; new
/// accounts often have no forecast data at all.
async fn fetch_forecast(ctx: &SessionContext, today: NaiveDate) -> Option<f64> {
    let (start, end) = forecast_range(today)?;
    let interval = DateInterval::builder().start(start).end(end).build().ok()?;
    match ctx
        .cost()
        .get_cost_forecast()
        .time_period(interval)
        .metric(Metric::UnblendedCost)
        .granularity(Granularity::Monthly)
        .send()
        .await
    {
        Ok(response) => response.total().map(|t| parse_amount(t.amount())),
        Err(e) => {
            warn!(error = %e, "cost forecast unavailable");
            None
        }
    }
}

/// Month-to-date spend per service, highest first, capped at `limit`.
pub async fn top_services(ctx: &SessionContext, limit: usize) -> Result<Vec<ServiceCost>> {
    let today = Utc::now().date_naive();
    let (start, end) = month_range(today);

    let response = ctx
        .cost()
        .get_cost_and_usage()
        .time_period(
            DateInterval::builder()
                .start(start)
                .end(end)
                .build()
                .context("Invalid cost interval")?,
        )
        .granularity(Granularity::Monthly)
        .metrics("UnblendedCost")
        .group_by(
            GroupDefinition::builder()
                .r#type(GroupDefinitionType::Dimension)
                .key("SERVICE")
                .build(),
        )
        .send()
        .await
        .context("Failed to fetch per-service costs")?;

    let mut costs = Vec::new();
    for result in response.results_by_time() {
        for group in result.groups() {
            let Some(service) = group.keys().first() else {
                continue;
            };
            let amount = group
                .metrics()
                .and_then(|m| m.get("UnblendedCost"))
                .map(|m| parse_amount(m.amount()))
                .unwrap_or(0.0);
            costs.push(ServiceCost {
                service: service.clone(),
                amount,
            });
        }
    }
    costs.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    costs.truncate(limit);
    Ok(costs)
}

/// Scan for resources that bill while idle. Each probe failing only
/// drops that probe's findings, so partial permissions still produce a
/// useful report.
pub async fn idle_resources(ctx: &SessionContext) -> Vec<IdleResource> {
    let mut found = Vec::new();
    let probes: [(&str, Result<Vec<IdleResource>>); 6] = [
        ("volumes", unattached_volumes(ctx).await),
        ("addresses", unassociated_addresses(ctx).await),
        ("instances", stopped_instances(ctx).await),
        ("databases", stopped_databases(ctx).await),
        ("load balancers", empty_load_balancers(ctx).await),
        ("snapshots", old_snapshots(ctx).await),
    ];
    for (probe, result) in probes {
        match result {
            Ok(items) => found.extend(items),
            Err(e) => warn!(probe, error = %e, "idle resource probe failed"),
        }
    }
    found
}

async fn unattached_volumes(ctx: &SessionContext) -> Result<Vec<IdleResource>> {
    let mut found = Vec::new();
    let mut pages = ctx
        .ec2()
        .describe_volumes()
        .filters(Filter::builder().name("status").values("available").build())
        .into_paginator()
        .send();
    while let Some(page) = pages.next().await {
        let page = page.context("Failed to list unattached volumes")?;
        for volume in page.volumes() {
            found.push(IdleResource {
                kind: "EBS volume".to_string(),
                id: volume.volume_id().unwrap_or_default().to_string(),
                note: format!("{} GiB unattached", volume.size().unwrap_or(0)),
            });
        }
    }
    Ok(found)
}

async fn unassociated_addresses(ctx: &SessionContext) -> Result<Vec<IdleResource>> {
    let response = ctx
        .ec2()
        .describe_addresses()
        .send()
        .await
        .context("Failed to list elastic IPs")?;
    Ok(response
        .addresses()
        .iter()
        .filter(|address| address.association_id().is_none())
        .map(|address| IdleResource {
            kind: "Elastic IP".to_string(),
            id: address
                .public_ip()
                .or(address.allocation_id())
                .unwrap_or_default()
                .to_string(),
            note: "not associated".to_string(),
        })
        .collect())
}

async fn stopped_instances(ctx: &SessionContext) -> Result<Vec<IdleResource>> {
    Ok(ec2::list_instances(ctx, StateFilter::Stopped)
        .await?
        .into_iter()
        .map(|instance| IdleResource {
            kind: "EC2 instance".to_string(),
            id: instance.id.clone(),
            note: format!("'{}' stopped, EBS still billed", instance.display_name()),
        })
        .collect())
}

async fn stopped_databases(ctx: &SessionContext) -> Result<Vec<IdleResource>> {
    let response = ctx
        .rds()
        .describe_db_instances()
        .send()
        .await
        .context("Failed to list RDS instances")?;
    Ok(response
        .db_instances()
        .iter()
        .filter(|db| db.db_instance_status() == Some("stopped"))
        .map(|db| IdleResource {
            kind: "RDS instance".to_string(),
            id: db.db_instance_identifier().unwrap_or_default().to_string(),
            note: "stopped, storage still billed".to_string(),
        })
        .collect())
}

async fn empty_load_balancers(ctx: &SessionContext) -> Result<Vec<IdleResource>> {
    let elb = ctx.elb();
    let response = elb
        .describe_load_balancers()
        .send()
        .await
        .context("Failed to list load balancers")?;

    let mut found = Vec::new();
    for lb in response.load_balancers() {
        let Some(arn) = lb.load_balancer_arn() else {
            continue;
        };
        let groups = elb
            .describe_target_groups()
            .load_balancer_arn(arn)
            .send()
            .await
            .context("Failed to list target groups")?;
        let mut has_targets = false;
        for group in groups.target_groups() {
            let Some(group_arn) = group.target_group_arn() else {
                continue;
            };
            let health = elb
                .describe_target_health()
                .target_group_arn(group_arn)
                .send()
                .await
                .context("Failed to describe target health")?;
            if !health.target_health_descriptions().is_empty() {
                has_targets = true;
                break;
            }
        }
        if !has_targets {
            found.push(IdleResource {
                kind: "Load balancer".to_string(),
                id: lb.load_balancer_name().unwrap_or_default().to_string(),
                note: "no registered targets".to_string(),
            });
        }
    }
    Ok(found)
}

async fn old_snapshots(ctx: &SessionContext) -> Result<Vec<IdleResource>> {
    let cutoff = Utc::now().timestamp() - SNAPSHOT_AGE_DAYS * 86_400;
    let mut found = Vec::new();
    let mut pages = ctx
        .ec2()
        .describe_snapshots()
        .owner_ids("self")
        .into_paginator()
        .send();
    while let Some(page) = pages.next().await {
        let page = page.context("Failed to list snapshots")?;
        for snapshot in page.snapshots() {
            let Some(start_time) = snapshot.start_time() else {
                continue;
            };
            if start_time.secs() < cutoff {
                found.push(IdleResource {
                    kind: "EBS snapshot".to_string(),
                    id: snapshot.snapshot_id().unwrap_or_default().to_string(),
                    note: format!("older than {SNAPSHOT_AGE_DAYS} days"),
                });
            }
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_range_covers_first_through_tomorrow() {
        let (start, end) = month_range(date(2024, 3, 15));
        assert_eq!(start, "2024-03-01");
        assert_eq!(end, "2024-03-16");
    }

    #[test]
    fn test_month_range_crosses_month_boundary_at_month_end() {
        let (start, end) = month_range(date(2024, 1, 31));
        assert_eq!(start, "2024-01-01");
        assert_eq!(end, "2024-02-01");
    }

    #[test]
    fn test_forecast_range_midmonth() {
        let (start, end) = forecast_range(date(2024, 3, 15)).unwrap();
        assert_eq!(start, "2024-03-16");
        assert_eq!(end, "2024-04-01");
    }

    #[test]
    fn test_forecast_range_empty_on_last_day() {
        assert_eq!(forecast_range(date(2024, 3, 31)), None);
        assert_eq!(forecast_range(date(2024, 12, 31)), None);
    }

    #[test]
    fn test_forecast_range_december_rolls_to_january() {
        let (start, end) = forecast_range(date(2024, 12, 15)).unwrap();
        assert_eq!(start, "2024-12-16");
        assert_eq!(end, "2025-01-01");
    }

    #[test]
    fn test_parse_amount_tolerates_garbage() {
        assert_eq!(parse_amount(Some("12.5")), 12.5);
        assert_eq!(parse_amount(Some("nope")), 0.0);
        assert_eq!(parse_amount(None), 0.0);
    }
}
