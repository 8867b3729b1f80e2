use std::ffi::OsStr;

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use tokio::process::Command;

use awsnav_aws::SessionContext;
use awsnav_aws::{ecs, logs};
use awsnav_logs::{LogFormatter, apply_window, floor_char_boundary};
use awsnav_types::{ContainerLogSource, FormattedLogEntry, ServiceDetail, TaskSummary};
use awsnav_ui::{Choice, Menu, Nav, confirm, input_default, input_optional, pause};

use crate::config::Settings;

/// Pretty-printed JSON payloads are previewed up to this many bytes.
const JSON_PREVIEW_LIMIT: usize = 500;

#[derive(Subcommand, Debug)]
pub enum EcsCommand {
    /// Show recent logs of a service
    Logs {
        cluster: String,
        service: String,
        /// Container to read from (defaults to the service-named one)
        #[arg(long)]
        container: Option<String>,
        /// Number of events kept from the end of the window
        #[arg(long)]
        tail: Option<usize>,
        /// Case-insensitive substring the raw message must contain
        #[arg(long)]
        level: Option<String>,
        /// Minutes of history to fetch
        #[arg(long)]
        lookback: Option<i64>,
    },
    /// Restart all tasks of a service via a forced deployment
    ForceDeploy {
        cluster: String,
        service: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn run(ctx: &SessionContext, command: EcsCommand, settings: &Settings) -> Result<()> {
    match command {
        EcsCommand::Logs {
            cluster,
            service,
            container,
            tail,
            level,
            lookback,
        } => {
            let sources = ecs::container_log_sources(ctx, &cluster, &service).await?;
            let Some(source) = pick_source(&sources, &service, container.as_deref()) else {
                println!("No awslogs-backed containers found for '{service}'.");
                return Ok(());
            };
            show_logs(
                ctx,
                &source.log_group,
                level.as_deref(),
                tail.unwrap_or_else(|| settings.tail()),
                lookback.unwrap_or_else(|| settings.lookback()),
            )
            .await
        }
        EcsCommand::ForceDeploy {
            cluster,
            service,
            yes,
        } => {
            if !yes
                && !confirm(
                    &format!("Force a new deployment of '{service}'? All tasks restart."),
                    false,
                )?
            {
                println!("Aborted.");
                return Ok(());
            }
            ecs::force_new_deployment(ctx, &cluster, &service).await?;
            println!("New deployment requested for {service}.");
            Ok(())
        }
    }
}

/// Choose a log source: an explicitly named container, else the
/// container named after the service, else the first one.
fn pick_source<'a>(
    sources: &'a [ContainerLogSource],
    service: &str,
    container: Option<&str>,
) -> Option<&'a ContainerLogSource> {
    if let Some(name) = container {
        return sources.iter().find(|s| s.container == name);
    }
    sources
        .iter()
        .find(|s| s.container == service)
        .or_else(|| sources.first())
}

async fn show_logs(
    ctx: &SessionContext,
    log_group: &str,
    filter: Option<&str>,
    tail: usize,
    lookback: i64,
) -> Result<()> {
    let events = match logs::fetch_window(ctx, log_group, lookback).await {
        Ok(events) => events,
        Err(e) => {
            println!("{}", format!("Could not fetch logs: {e:#}").red());
            Vec::new()
        }
    };
    let events = apply_window(events, filter, tail);
    if events.is_empty() {
        println!("No matching log events in the last {lookback} minutes.");
        return Ok(());
    }

    let formatter = LogFormatter::new();
    for event in &events {
        print_entry(&formatter.format_entry(event));
    }
    Ok(())
}

fn print_entry(entry: &FormattedLogEntry) {
    println!(
        "{} {:>5} {}",
        entry.timestamp.dimmed(),
        entry.level.as_str().color(entry.level.color()),
        entry.message
    );
    if let Some(json) = &entry.json_data {
        if let Ok(pretty) = serde_json::to_string_pretty(json) {
            if pretty.len() > JSON_PREVIEW_LIMIT {
                let cut = floor_char_boundary(&pretty, JSON_PREVIEW_LIMIT);
                println!("{}", pretty[..cut].dimmed());
                println!("{}", "  ... (truncated)".dimmed());
            } else {
                println!("{}", pretty.dimmed());
            }
        }
    }
}

pub async fn wizard(ctx: &SessionContext, settings: &Settings) -> Result<Nav> {
    loop {
        let clusters = match ecs::list_clusters(ctx).await {
            Ok(clusters) => clusters,
            Err(e) => {
                super::report(&e);
                pause()?;
                return Ok(Nav::Back);
            }
        };
        if clusters.is_empty() {
            println!("No ECS clusters in this account.");
            return Ok(Nav::Back);
        }
        let menu = Menu::new("ECS cluster")
            .items(clusters.iter().map(|c| (c.clone(), c.clone())))
            .with_refresh()
            .with_back("Back")
            .with_exit();
        match menu.prompt()? {
            Choice::Item(cluster) => {
                let cluster = cluster.clone();
                if service_list_menu(ctx, &cluster, settings).await? == Nav::Exit {
                    return Ok(Nav::Exit);
                }
            }
            Choice::Nav(Nav::Refresh) => continue,
            Choice::Nav(Nav::Back) => return Ok(Nav::Back),
            Choice::Nav(Nav::Exit) => return Ok(Nav::Exit),
        }
    }
}

async fn service_list_menu(ctx: &SessionContext, cluster: &str, settings: &Settings) -> Result<Nav> {
    loop {
        let services = match ecs::list_services(ctx, cluster).await {
            Ok(services) => services,
            Err(e) => {
                super::report(&e);
                pause()?;
                return Ok(Nav::Back);
            }
        };
        if services.is_empty() {
            println!("No services in cluster '{cluster}'.");
            return Ok(Nav::Back);
        }
        let menu = Menu::new(format!("Services in {cluster}"))
            .items(services.iter().map(|s| (s.clone(), s.clone())))
            .with_refresh()
            .with_back("Back")
            .with_exit();
        match menu.prompt()? {
            Choice::Item(service) => {
                let service = service.clone();
                if service_menu(ctx, cluster, &service, settings).await? == Nav::Exit {
                    return Ok(Nav::Exit);
                }
            }
            Choice::Nav(Nav::Refresh) => continue,
            Choice::Nav(Nav::Back) => return Ok(Nav::Back),
            Choice::Nav(Nav::Exit) => return Ok(Nav::Exit),
        }
    }
}

#[derive(Clone, Copy)]
enum ServiceAction {
    ViewLogs,
    ExecShell,
    ForceDeploy,
}

/// Detail menu for one service. Counts are re-fetched on every pass.
async fn service_menu(
    ctx: &SessionContext,
    cluster: &str,
    service: &str,
    settings: &Settings,
) -> Result<Nav> {
    loop {
        let fetched = async {
            let detail = ecs::describe_service(ctx, cluster, service).await?;
            let tasks = ecs::list_tasks(ctx, cluster, service).await?;
            Ok::<_, anyhow::Error>((detail, tasks))
        }
        .await;
        let (detail, tasks) = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                super::report(&e);
                pause()?;
                return Ok(Nav::Back);
            }
        };
        print_service(&detail, &tasks);

        let menu = Menu::new(service.to_string())
            .item("View logs", ServiceAction::ViewLogs)
            .item("Run a shell in a task", ServiceAction::ExecShell)
            .item("Force new deployment", ServiceAction::ForceDeploy)
            .with_refresh()
            .with_back("Back")
            .with_exit();

        match menu.prompt()? {
            Choice::Item(ServiceAction::ViewLogs) => {
                if let Err(e) = logs_wizard(ctx, cluster, service, settings).await {
                    super::report(&e);
                }
                pause()?;
            }
            Choice::Item(ServiceAction::ExecShell) => {
                if let Err(e) = exec_wizard(ctx, cluster, service).await {
                    super::report(&e);
                    pause()?;
                }
            }
            Choice::Item(ServiceAction::ForceDeploy) => {
                if confirm(
                    &format!("Force a new deployment of '{service}'? All tasks restart."),
                    false,
                )? {
                    match ecs::force_new_deployment(ctx, cluster, service).await {
                        Ok(()) => println!("New deployment requested."),
                        Err(e) => super::report(&e),
                    }
                } else {
                    println!("Aborted.");
                }
                pause()?;
            }
            Choice::Nav(Nav::Refresh) => continue,
            Choice::Nav(Nav::Back) => return Ok(Nav::Back),
            Choice::Nav(Nav::Exit) => return Ok(Nav::Exit),
        }
    }
}

fn print_service(detail: &ServiceDetail, tasks: &[TaskSummary]) {
    println!();
    println!("{}  [{}]", detail.name.bold(), detail.status);
    println!("  task def:  {}", detail.task_definition);
    println!(
        "  tasks:     {} desired / {} running / {} pending",
        detail.desired_count, detail.running_count, detail.pending_count
    );
    println!("  launch:    {}", detail.launch_type);
    for task in tasks {
        println!(
            "    {}  {} ({})",
            task.id.dimmed(),
            task.last_status,
            task.health_status
        );
    }
    println!();
}

async fn logs_wizard(
    ctx: &SessionContext,
    cluster: &str,
    service: &str,
    settings: &Settings,
) -> Result<()> {
    let sources = ecs::container_log_sources(ctx, cluster, service).await?;
    if sources.is_empty() {
        println!("No awslogs-backed containers found for '{service}'.");
        return Ok(());
    }

    let source = if sources.len() == 1 {
        &sources[0]
    } else {
        let menu = Menu::new("Container")
            .items(sources.iter().map(|s| (s.container.clone(), s)))
            .with_back("Cancel");
        match menu.prompt()? {
            Choice::Item(source) => *source,
            Choice::Nav(_) => return Ok(()),
        }
    };

    let tail = input_default("Events to show", &settings.tail().to_string())?
        .trim()
        .parse()
        .unwrap_or_else(|_| settings.tail());

    let filter_menu = Menu::new("Filter")
        .item("All events", None)
        .item("ERROR only", Some("ERROR".to_string()))
        .item("WARN only", Some("WARN".to_string()))
        .item("Custom substring", Some(String::new()));
    let filter = match filter_menu.prompt()? {
        Choice::Item(Some(word)) if word.is_empty() => {
            let typed = input_optional("Substring to match")?;
            let typed = typed.trim().to_string();
            if typed.is_empty() { None } else { Some(typed) }
        }
        Choice::Item(choice) => choice.clone(),
        Choice::Nav(_) => None,
    };

    show_logs(
        ctx,
        &source.log_group,
        filter.as_deref(),
        tail,
        settings.lookback(),
    )
    .await
}

/// PATH lookup, no spawn. The plugin only has to exist to be usable.
fn binary_on_path_in(paths: &OsStr, name: &str) -> bool {
    std::env::split_paths(paths).any(|dir| dir.join(name).is_file())
}

fn plugin_installed() -> bool {
    std::env::var_os("PATH")
        .map(|paths| binary_on_path_in(&paths, "session-manager-plugin"))
        .unwrap_or(false)
}

/// Open an interactive shell inside a running task through
/// `aws ecs execute-command`.
async fn exec_wizard(ctx: &SessionContext, cluster: &str, service: &str) -> Result<()> {
    if !plugin_installed() {
        println!(
            "{}",
            "session-manager-plugin is not installed; see the AWS Session Manager docs.".yellow()
        );
        pause()?;
        return Ok(());
    }

    let tasks: Vec<TaskSummary> = ecs::list_tasks(ctx, cluster, service)
        .await?
        .into_iter()
        .filter(|task| task.last_status == "RUNNING")
        .collect();
    if tasks.is_empty() {
        println!("No running tasks for '{service}'.");
        pause()?;
        return Ok(());
    }

    let task = if tasks.len() == 1 {
        &tasks[0]
    } else {
        let menu = Menu::new("Task")
            .items(tasks.iter().map(|t| {
                (format!("{} [{}]", t.id, t.health_status), t)
            }))
            .with_back("Cancel");
        match menu.prompt()? {
            Choice::Item(task) => *task,
            Choice::Nav(_) => return Ok(()),
        }
    };

    let container = if task.containers.len() <= 1 {
        match task.containers.first() {
            Some(name) => name.clone(),
            None => {
                println!("Task has no containers.");
                return Ok(());
            }
        }
    } else {
        let menu = Menu::new("Container")
            .items(task.containers.iter().map(|c| (c.clone(), c.clone())))
            .with_back("Cancel");
        match menu.prompt()? {
            Choice::Item(name) => name.clone(),
            Choice::Nav(_) => return Ok(()),
        }
    };

    let mut command = Command::new("aws");
    command.args([
        "ecs",
        "execute-command",
        "--profile",
        &ctx.profile,
        "--cluster",
        cluster,
        "--task",
        &task.arn,
        "--container",
        &container,
        "--interactive",
        "--command",
        "/bin/sh",
    ]);
    if let Some(region) = &ctx.region {
        command.args(["--region", region]);
    }
    let status = command.status().await?;
    if !status.success() {
        println!(
            "{}",
            "execute-command failed; check that the service has enableExecuteCommand set.".yellow()
        );
        pause()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(container: &str) -> ContainerLogSource {
        ContainerLogSource {
            container: container.to_string(),
            log_group: format!("/ecs/{container}"),
        }
    }

    #[test]
    fn test_pick_source_prefers_explicit_container() {
        let sources = [source("web"), source("sidecar")];
        let picked = pick_source(&sources, "web", Some("sidecar")).unwrap();
        assert_eq!(picked.container, "sidecar");
    }

    #[test]
    fn test_pick_source_unknown_container_yields_none() {
        let sources = [source("web")];
        assert!(pick_source(&sources, "web", Some("nope")).is_none());
    }

    #[test]
    fn test_pick_source_defaults_to_service_named_container() {
        let sources = [source("sidecar"), source("api")];
        let picked = pick_source(&sources, "api", None).unwrap();
        assert_eq!(picked.container, "api");
    }

    #[test]
    fn test_pick_source_falls_back_to_first() {
        let sources = [source("sidecar"), source("web")];
        let picked = pick_source(&sources, "api", None).unwrap();
        assert_eq!(picked.container, "sidecar");
    }

    #[test]
    fn test_pick_source_empty_list() {
        assert!(pick_source(&[], "api", None).is_none());
    }

    #[test]
    fn test_binary_on_path_in_finds_existing_file() {
        let dir = std::env::temp_dir().join("awsnav-plugin-lookup-test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("session-manager-plugin"), b"").unwrap();

        let paths = std::env::join_paths([&dir]).unwrap();
        assert!(binary_on_path_in(&paths, "session-manager-plugin"));
        assert!(!binary_on_path_in(&paths, "no-such-binary"));
    }
}
