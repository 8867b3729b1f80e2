use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use awsnav_aws::{ContextCache, SessionContext, profiles, session};
use awsnav_types::ProfileInfo;
use awsnav_ui::{Choice, Menu, Nav, pause};

use commands::apigateway::ApigwCommand;
use commands::catalog::CatalogCommand;
use commands::ec2::Ec2Command;
use commands::ecs::EcsCommand;
use config::Settings;

mod commands;
mod config;

/// Interactive AWS resource navigator with SSO session management
#[derive(Parser, Debug)]
#[command(name = "awsnav", version, about, long_about = None)]
struct Cli {
    /// Profile from the AWS config file
    #[arg(short, long, global = true)]
    profile: Option<String>,

    /// Region override
    #[arg(long, global = true)]
    region: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List SSO profiles from the AWS config file
    Profiles,
    /// EC2 instances
    Ec2 {
        #[command(subcommand)]
        command: Ec2Command,
    },
    /// ECS services and their logs
    Ecs {
        #[command(subcommand)]
        command: EcsCommand,
    },
    /// API Gateway HTTP APIs
    Apigw {
        #[command(subcommand)]
        command: ApigwCommand,
    },
    /// Service Catalog products
    Sc {
        #[command(subcommand)]
        command: CatalogCommand,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("{} {e:#}", "error:".red().bold());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run() -> Result<()> {
    let Cli {
        profile,
        region,
        command,
    } = Cli::parse();
    let settings = Settings::load();

    match command {
        Some(Commands::Profiles) => commands::profiles::list(),
        Some(Commands::Ec2 { command }) => {
            let ctx = connect(profile, region, &settings).await?;
            commands::ec2::run(&ctx, command).await
        }
        Some(Commands::Ecs { command }) => {
            let ctx = connect(profile, region, &settings).await?;
            commands::ecs::run(&ctx, command, &settings).await
        }
        Some(Commands::Apigw { command }) => {
            let ctx = connect(profile, region, &settings).await?;
            commands::apigateway::run(&ctx, command).await
        }
        Some(Commands::Sc { command }) => {
            let ctx = connect(profile, region, &settings).await?;
            commands::catalog::run(&ctx, command).await
        }
        None => wizard(profile, region, settings).await,
    }
}

/// Resolve a profile for one-shot commands, log in if needed, and build
/// the session context.
async fn connect(
    profile_flag: Option<String>,
    region_flag: Option<String>,
    settings: &Settings,
) -> Result<SessionContext> {
    let name = profile_flag
        .or_else(|| settings.default_profile.clone())
        .context("No profile given; pass --profile or set default_profile in the config file")?;
    let info = profiles::find_profile(&name)?;
    session::ensure_logged_in(&name).await?;
    let region = region_flag.or_else(|| settings.region.clone()).or(info.region);
    Ok(SessionContext::load(&name, region).await)
}

/// The interactive loop: pick a profile, then hop between service areas
/// until the user exits. "Switch profile" from the area menu comes back
/// here; contexts are cached per profile across switches.
async fn wizard(
    profile_flag: Option<String>,
    region_flag: Option<String>,
    settings: Settings,
) -> Result<()> {
    let mut cache = ContextCache::default();
    let mut preselected = profile_flag;
    loop {
        let info = match preselected.take() {
            Some(name) => profiles::find_profile(&name)?,
            None => match pick_profile()? {
                Some(info) => info,
                None => return Ok(()),
            },
        };
        session::ensure_logged_in(&info.name).await?;

        let region = region_flag
            .clone()
            .or_else(|| settings.region.clone())
            .or_else(|| info.region.clone());
        let ctx = cache.get_or_load(&info.name, region).await;

        match area_menu(&ctx, &settings).await? {
            Nav::Exit => return Ok(()),
            Nav::Back | Nav::Refresh => continue,
        }
    }
}

fn profile_label(profile: &ProfileInfo) -> String {
    match (&profile.sso_account_id, &profile.sso_role_name) {
        (Some(account), Some(role)) => format!("{} ({account}/{role})", profile.name),
        (Some(account), None) => format!("{} ({account})", profile.name),
        _ => profile.name.clone(),
    }
}

fn pick_profile() -> Result<Option<ProfileInfo>> {
    let found = profiles::load_sso_profiles()?;
    if found.is_empty() {
        anyhow::bail!("No SSO profiles found in the AWS config file");
    }
    let menu = Menu::new("Profile")
        .items(found.iter().map(|p| (profile_label(p), p)))
        .with_exit();
    match menu.prompt()? {
        Choice::Item(info) => Ok(Some((*info).clone())),
        Choice::Nav(_) => Ok(None),
    }
}

#[derive(Clone, Copy)]
enum Area {
    Ecs,
    Ec2,
    Catalog,
    ApiGateway,
    S3,
    Cost,
}

async fn area_menu(ctx: &SessionContext, settings: &Settings) -> Result<Nav> {
    loop {
        let menu = Menu::new(format!("awsnav [{}]", ctx.profile))
            .item("ECS services", Area::Ecs)
            .item("EC2 instances", Area::Ec2)
            .item("Service Catalog", Area::Catalog)
            .item("API Gateway", Area::ApiGateway)
            .item("S3 buckets", Area::S3)
            .item("Cost overview", Area::Cost)
            .with_back("Switch profile")
            .with_exit();

        let outcome = match menu.prompt()? {
            Choice::Item(Area::Ecs) => commands::ecs::wizard(ctx, settings).await,
            Choice::Item(Area::Ec2) => commands::ec2::wizard(ctx).await,
            Choice::Item(Area::Catalog) => commands::catalog::wizard(ctx).await,
            Choice::Item(Area::ApiGateway) => commands::apigateway::wizard(ctx).await,
            Choice::Item(Area::S3) => commands::s3::wizard(ctx).await,
            Choice::Item(Area::Cost) => commands::cost::wizard(ctx).await,
            Choice::Nav(nav) => return Ok(nav),
        };
        // A failed AWS call drops the user back here instead of
        // ending the session.
        match outcome {
            Ok(Nav::Exit) => return Ok(Nav::Exit),
            Ok(_) => {}
            Err(e) => {
                println!("{} {e:#}", "error:".red());
                pause()?;
            }
        }
    }
}
