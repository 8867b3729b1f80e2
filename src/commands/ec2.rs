use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use awsnav_aws::SessionContext;
use awsnav_aws::ec2::{self, StateFilter};
use awsnav_types::InstanceInfo;
use awsnav_ui::{Choice, Menu, Nav, Table, confirm, pause};

#[derive(Subcommand, Debug)]
pub enum Ec2Command {
    /// List instances
    List {
        /// Filter by lifecycle state: all, running, or stopped
        #[arg(long, default_value = "all")]
        state: StateFilter,
    },
    /// Start a stopped instance
    Start {
        instance_id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Stop a running instance
    Stop {
        instance_id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Reboot an instance
    Reboot {
        instance_id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn run(ctx: &SessionContext, command: Ec2Command) -> Result<()> {
    match command {
        Ec2Command::List { state } => {
            let instances = ec2::list_instances(ctx, state).await?;
            if instances.is_empty() {
                println!("No {} instances found.", state.label());
            } else {
                print_instances(&instances);
            }
            Ok(())
        }
        Ec2Command::Start { instance_id, yes } => act(ctx, &instance_id, Action::Start, yes).await,
        Ec2Command::Stop { instance_id, yes } => act(ctx, &instance_id, Action::Stop, yes).await,
        Ec2Command::Reboot { instance_id, yes } => act(ctx, &instance_id, Action::Reboot, yes).await,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    Start,
    Stop,
    Reboot,
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Reboot => "reboot",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Stop => "Stop",
            Self::Reboot => "Reboot",
        }
    }

    /// Starting is benign; stopping and rebooting default to no.
    fn default_answer(self) -> bool {
        matches!(self, Self::Start)
    }
}

async fn act(ctx: &SessionContext, instance_id: &str, action: Action, yes: bool) -> Result<()> {
    let instance = ec2::get_instance(ctx, instance_id)
        .await?
        .with_context(|| format!("Instance {instance_id} not found"))?;

    if !yes {
        let prompt = format!(
            "{} instance '{}' (currently {})?",
            action.label(),
            instance.display_name(),
            instance.state
        );
        if !confirm(&prompt, action.default_answer())? {
            println!("Aborted.");
            return Ok(());
        }
    }

    match action {
        Action::Start => ec2::start_instance(ctx, instance_id).await?,
        Action::Stop => ec2::stop_instance(ctx, instance_id).await?,
        Action::Reboot => ec2::reboot_instance(ctx, instance_id).await?,
    }
    println!("Requested {} of {instance_id}.", action.verb());
    Ok(())
}

fn print_instances(instances: &[InstanceInfo]) {
    let mut table = Table::new(["NAME", "ID", "STATE", "TYPE", "AZ", "PRIVATE IP", "PUBLIC IP"]);
    for instance in instances {
        table.row([
            instance.display_name(),
            instance.id.as_str(),
            instance.state.as_str(),
            instance.instance_type.as_str(),
            instance.availability_zone.as_deref().unwrap_or("-"),
            instance.private_ip.as_deref().unwrap_or("-"),
            instance.public_ip.as_deref().unwrap_or("-"),
        ]);
    }
    table.print();
}

fn print_detail(instance: &InstanceInfo) {
    println!();
    println!("{}  {}", instance.display_name().bold(), instance.id.dimmed());
    println!("  state:     {}", instance.state);
    println!("  type:      {}", instance.instance_type);
    println!(
        "  az:        {}",
        instance.availability_zone.as_deref().unwrap_or("-")
    );
    println!(
        "  private:   {}",
        instance.private_ip.as_deref().unwrap_or("-")
    );
    println!(
        "  public:    {}",
        instance.public_ip.as_deref().unwrap_or("-")
    );
    println!("  vpc:       {}", instance.vpc_id.as_deref().unwrap_or("-"));
    println!(
        "  subnet:    {}",
        instance.subnet_id.as_deref().unwrap_or("-")
    );
    println!("  sg:        {}", instance.security_groups.join(", "));
    println!(
        "  key pair:  {}",
        instance.key_name.as_deref().unwrap_or("-")
    );
    println!(
        "  ami:       {}",
        instance.image_id.as_deref().unwrap_or("-")
    );
    if let Some(launched) = instance.launch_time {
        println!("  launched:  {}", launched.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    println!();
}

enum Pick {
    Instance(String),
    CycleFilter,
}

pub async fn wizard(ctx: &SessionContext) -> Result<Nav> {
    let mut state = StateFilter::All;
    loop {
        let instances = match ec2::list_instances(ctx, state).await {
            Ok(instances) => instances,
            Err(e) => {
                super::report(&e);
                pause()?;
                return Ok(Nav::Back);
            }
        };
        let mut menu = Menu::new(format!("EC2 instances ({})", state.label()));
        for instance in &instances {
            menu = menu.item(
                format!(
                    "{} [{}] {}",
                    instance.display_name(),
                    instance.state,
                    instance.id
                ),
                Pick::Instance(instance.id.clone()),
            );
        }
        let menu = menu
            .item(
                format!("Filter: {} (cycle)", state.label()),
                Pick::CycleFilter,
            )
            .with_refresh()
            .with_back("Back")
            .with_exit();

        match menu.prompt()? {
            Choice::Item(Pick::Instance(id)) => {
                let id = id.clone();
                if instance_menu(ctx, &id).await? == Nav::Exit {
                    return Ok(Nav::Exit);
                }
            }
            Choice::Item(Pick::CycleFilter) => state = state.next(),
            Choice::Nav(Nav::Refresh) => continue,
            Choice::Nav(Nav::Back) => return Ok(Nav::Back),
            Choice::Nav(Nav::Exit) => return Ok(Nav::Exit),
        }
    }
}

/// Detail menu for one instance. State is re-fetched on every pass so
/// the offered actions track reality.
async fn instance_menu(ctx: &SessionContext, instance_id: &str) -> Result<Nav> {
    loop {
        let instance = match ec2::get_instance(ctx, instance_id).await {
            Ok(Some(instance)) => instance,
            Ok(None) => {
                println!("Instance {instance_id} no longer exists.");
                return Ok(Nav::Back);
            }
            Err(e) => {
                super::report(&e);
                pause()?;
                return Ok(Nav::Back);
            }
        };
        print_detail(&instance);

        let mut menu = Menu::new(instance.display_name().to_string());
        if instance.state == "stopped" {
            menu = menu.item("Start", Action::Start);
        }
        if instance.state == "running" {
            menu = menu.item("Stop", Action::Stop).item("Reboot", Action::Reboot);
        }
        let menu = menu.with_refresh().with_back("Back").with_exit();

        match menu.prompt()? {
            Choice::Item(action) => {
                if let Err(e) = act(ctx, instance_id, *action, false).await {
                    super::report(&e);
                }
                pause()?;
            }
            Choice::Nav(Nav::Refresh) => continue,
            Choice::Nav(Nav::Back) => return Ok(Nav::Back),
            Choice::Nav(Nav::Exit) => return Ok(Nav::Exit),
        }
    }
}
