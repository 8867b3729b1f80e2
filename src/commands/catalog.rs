use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::Colorize;

use awsnav_aws::SessionContext;
use awsnav_aws::catalog;
use awsnav_types::{ProductInfo, ProvisionedProduct};
use awsnav_ui::{Choice, Menu, Nav, Table, confirm, confirm_typed, input, input_default, pause, secret};

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// List products available to launch
    Products,
    /// List provisioned products in this account
    Provisioned,
    /// Show the status of a provisioned product
    Status { name: String },
    /// Terminate a provisioned product
    Terminate {
        name: String,
        /// Skip the confirmation prompts
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn run(ctx: &SessionContext, command: CatalogCommand) -> Result<()> {
    match command {
        CatalogCommand::Products => {
            let products = catalog::list_products(ctx).await?;
            if products.is_empty() {
                println!("No products available.");
                return Ok(());
            }
            let mut table = Table::new(["NAME", "ID", "OWNER"]);
            for product in &products {
                table.row([
                    product.name.as_str(),
                    product.id.as_str(),
                    product.owner.as_deref().unwrap_or("-"),
                ]);
            }
            table.print();
            Ok(())
        }
        CatalogCommand::Provisioned => {
            let provisioned = catalog::list_provisioned(ctx).await?;
            if provisioned.is_empty() {
                println!("Nothing provisioned in this account.");
                return Ok(());
            }
            let mut table = Table::new(["NAME", "STATUS", "TYPE", "CREATED"]);
            for item in &provisioned {
                table.row([
                    item.name.clone(),
                    item.status.clone(),
                    item.product_type.clone(),
                    item.created
                        .map(|t| t.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ]);
            }
            table.print();
            Ok(())
        }
        CatalogCommand::Status { name } => {
            let item = find_provisioned(ctx, &name).await?;
            let status = catalog::provisioned_status(ctx, &item.id).await?;
            print_status(&name, &status.status, status.message.as_deref());
            Ok(())
        }
        CatalogCommand::Terminate { name, yes } => {
            let item = find_provisioned(ctx, &name).await?;
            terminate_flow(ctx, &item, yes).await
        }
    }
}

async fn find_provisioned(ctx: &SessionContext, name: &str) -> Result<ProvisionedProduct> {
    catalog::list_provisioned(ctx)
        .await?
        .into_iter()
        .find(|item| item.name == name)
        .with_context(|| format!("No provisioned product named '{name}'"))
}

fn print_status(name: &str, status: &str, message: Option<&str>) {
    let colored_status = match status {
        "AVAILABLE" => status.green(),
        "ERROR" | "TAINTED" => status.red(),
        _ => status.yellow(),
    };
    println!("{name}: {colored_status}");
    if let Some(message) = message {
        println!("  {message}");
    }
}

/// Double confirmation, then terminate. The typed-name check aborts
/// silently on any mismatch; `yes` skips both prompts.
async fn terminate_flow(ctx: &SessionContext, item: &ProvisionedProduct, yes: bool) -> Result<()> {
    if !yes {
        if !confirm(
            &format!("Terminate '{}'? All of its resources are destroyed.", item.name),
            false,
        )? {
            println!("Aborted.");
            return Ok(());
        }
        if !confirm_typed(&item.name)? {
            println!("Name mismatch, aborting.");
            return Ok(());
        }
    }
    catalog::terminate(ctx, &item.id).await?;
    println!("Termination of '{}' requested.", item.name);
    Ok(())
}

#[derive(Clone, Copy)]
enum Section {
    Launch,
    Provisioned,
}

pub async fn wizard(ctx: &SessionContext) -> Result<Nav> {
    loop {
        let menu = Menu::new("Service Catalog")
            .item("Launch a product", Section::Launch)
            .item("Provisioned products", Section::Provisioned)
            .with_back("Back")
            .with_exit();
        match menu.prompt()? {
            Choice::Item(Section::Launch) => {
                if launch_wizard(ctx).await? == Nav::Exit {
                    return Ok(Nav::Exit);
                }
            }
            Choice::Item(Section::Provisioned) => {
                if provisioned_wizard(ctx).await? == Nav::Exit {
                    return Ok(Nav::Exit);
                }
            }
            Choice::Nav(Nav::Back) => return Ok(Nav::Back),
            Choice::Nav(_) => return Ok(Nav::Exit),
        }
    }
}

async fn launch_wizard(ctx: &SessionContext) -> Result<Nav> {
    loop {
        let products = match catalog::list_products(ctx).await {
            Ok(products) => products,
            Err(e) => {
                super::report(&e);
                pause()?;
                return Ok(Nav::Back);
            }
        };
        if products.is_empty() {
            println!("No products available to launch.");
            return Ok(Nav::Back);
        }
        let menu = Menu::new("Product")
            .items(products.iter().map(|p| (p.name.clone(), p)))
            .with_refresh()
            .with_back("Back")
            .with_exit();
        match menu.prompt()? {
            Choice::Item(product) => {
                if let Err(e) = provision_wizard(ctx, product).await {
                    super::report(&e);
                    pause()?;
                }
            }
            Choice::Nav(Nav::Refresh) => continue,
            Choice::Nav(Nav::Back) => return Ok(Nav::Back),
            Choice::Nav(Nav::Exit) => return Ok(Nav::Exit),
        }
    }
}

async fn provision_wizard(ctx: &SessionContext, product: &ProductInfo) -> Result<()> {
    if let Some(description) = &product.description {
        println!("\n{description}\n");
    }

    let versions = catalog::product_versions(ctx, &product.id).await?;
    if versions.is_empty() {
        println!("'{}' has no launchable versions.", product.name);
        pause()?;
        return Ok(());
    }
    let version = if versions.len() == 1 {
        &versions[0]
    } else {
        let menu = Menu::new("Version")
            .items(versions.iter().map(|v| {
                let label = match &v.description {
                    Some(d) => format!("{} ({d})", v.name),
                    None => v.name.clone(),
                };
                (label, v)
            }))
            .with_back("Cancel");
        match menu.prompt()? {
            Choice::Item(version) => *version,
            Choice::Nav(_) => return Ok(()),
        }
    };

    let paths = catalog::launch_paths(ctx, &product.id).await?;
    let path = match paths.len() {
        0 => bail!("Product '{}' has no launch paths", product.name),
        1 => &paths[0],
        _ => {
            let menu = Menu::new("Launch path")
                .items(paths.iter().map(|p| (p.name.clone(), p)))
                .with_back("Cancel");
            match menu.prompt()? {
                Choice::Item(path) => *path,
                Choice::Nav(_) => return Ok(()),
            }
        }
    };

    let parameters =
        catalog::provisioning_parameters(ctx, &product.id, &version.id, &path.id).await?;
    let mut values = Vec::new();
    for parameter in &parameters {
        let prompt = match &parameter.description {
            Some(d) => format!("{} ({d})", parameter.key),
            None => parameter.key.clone(),
        };
        let value = if parameter.no_echo {
            secret(&prompt)?
        } else {
            input_default(&prompt, parameter.default_value.as_deref().unwrap_or(""))?
        };
        values.push((parameter.key.clone(), value));
    }

    let name = input("Provisioned product name")?;
    println!();
    println!("  product:  {} ({})", product.name, version.name);
    println!("  name:     {name}");
    println!("  params:   {}", values.len());
    if !confirm("Provision now?", false)? {
        println!("Aborted.");
        return Ok(());
    }

    catalog::provision(ctx, &product.id, &version.id, &path.id, &name, values).await?;
    println!(
        "{}",
        format!("Provisioning of '{name}' started; check its status under provisioned products.")
            .green()
    );
    pause()?;
    Ok(())
}

#[derive(Clone, Copy)]
enum ProvisionedAction {
    RefreshStatus,
    Terminate,
}

async fn provisioned_wizard(ctx: &SessionContext) -> Result<Nav> {
    loop {
        let provisioned = match catalog::list_provisioned(ctx).await {
            Ok(provisioned) => provisioned,
            Err(e) => {
                super::report(&e);
                pause()?;
                return Ok(Nav::Back);
            }
        };
        if provisioned.is_empty() {
            println!("Nothing provisioned in this account.");
            return Ok(Nav::Back);
        }
        let menu = Menu::new("Provisioned product")
            .items(
                provisioned
                    .iter()
                    .map(|item| (format!("{} [{}]", item.name, item.status), item)),
            )
            .with_refresh()
            .with_back("Back")
            .with_exit();
        match menu.prompt()? {
            Choice::Item(item) => {
                let item = (*item).clone();
                if provisioned_menu(ctx, &item).await? == Nav::Exit {
                    return Ok(Nav::Exit);
                }
            }
            Choice::Nav(Nav::Refresh) => continue,
            Choice::Nav(Nav::Back) => return Ok(Nav::Back),
            Choice::Nav(Nav::Exit) => return Ok(Nav::Exit),
        }
    }
}

async fn provisioned_menu(ctx: &SessionContext, item: &ProvisionedProduct) -> Result<Nav> {
    loop {
        let status = match catalog::provisioned_status(ctx, &item.id).await {
            Ok(status) => status,
            Err(e) => {
                super::report(&e);
                pause()?;
                return Ok(Nav::Back);
            }
        };
        print_status(&item.name, &status.status, status.message.as_deref());

        let menu = Menu::new(item.name.clone())
            .item("Refresh status", ProvisionedAction::RefreshStatus)
            .item("Terminate", ProvisionedAction::Terminate)
            .with_back("Back")
            .with_exit();
        match menu.prompt()? {
            Choice::Item(ProvisionedAction::RefreshStatus) => continue,
            Choice::Item(ProvisionedAction::Terminate) => {
                if let Err(e) = terminate_flow(ctx, item, false).await {
                    super::report(&e);
                }
                pause()?;
                return Ok(Nav::Back);
            }
            Choice::Nav(Nav::Back) => return Ok(Nav::Back),
            Choice::Nav(_) => return Ok(Nav::Exit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Harness {
        #[command(subcommand)]
        command: CatalogCommand,
    }

    #[test]
    fn test_terminate_takes_yes_flag() {
        let parsed = Harness::try_parse_from(["sc", "terminate", "my-stack", "--yes"]).unwrap();
        match parsed.command {
            CatalogCommand::Terminate { name, yes } => {
                assert_eq!(name, "my-stack");
                assert!(yes);
            }
            other => panic!("parsed wrong command: {other:?}"),
        }
    }

    #[test]
    fn test_terminate_short_yes_flag() {
        let parsed = Harness::try_parse_from(["sc", "terminate", "my-stack", "-y"]).unwrap();
        match parsed.command {
            CatalogCommand::Terminate { yes, .. } => assert!(yes),
            other => panic!("parsed wrong command: {other:?}"),
        }
    }

    #[test]
    fn test_terminate_defaults_to_prompting() {
        let parsed = Harness::try_parse_from(["sc", "terminate", "my-stack"]).unwrap();
        match parsed.command {
            CatalogCommand::Terminate { yes, .. } => assert!(!yes),
            other => panic!("parsed wrong command: {other:?}"),
        }
    }
}
