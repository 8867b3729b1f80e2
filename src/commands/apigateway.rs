use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use awsnav_aws::SessionContext;
use awsnav_aws::apigateway::{self, IntegrationKind, RouteAuth};
use awsnav_types::ApiInfo;
use awsnav_ui::{Choice, Menu, Nav, Table, confirm, input, input_optional, pause};

#[derive(Subcommand, Debug)]
pub enum ApigwCommand {
    /// List HTTP APIs
    Apis,
    /// List routes of an API
    Routes { api_id: String },
    /// Interactively create a route on an API
    CreateRoute { api_id: String },
}

pub async fn run(ctx: &SessionContext, command: ApigwCommand) -> Result<()> {
    match command {
        ApigwCommand::Apis => {
            let apis = apigateway::list_apis(ctx).await?;
            if apis.is_empty() {
                println!("No APIs found.");
                return Ok(());
            }
            let mut table = Table::new(["ID", "NAME", "PROTOCOL"]);
            for api in &apis {
                table.row([api.id.as_str(), api.name.as_str(), api.protocol.as_str()]);
            }
            table.print();
            Ok(())
        }
        ApigwCommand::Routes { api_id } => {
            print_routes(ctx, &api_id).await
        }
        ApigwCommand::CreateRoute { api_id } => create_route_wizard(ctx, &api_id).await,
    }
}

async fn print_routes(ctx: &SessionContext, api_id: &str) -> Result<()> {
    let routes = apigateway::list_routes(ctx, api_id).await?;
    if routes.is_empty() {
        println!("API {api_id} has no routes.");
        return Ok(());
    }
    let mut table = Table::new(["ROUTE KEY", "TARGET", "AUTH"]);
    for route in &routes {
        table.row([
            route.route_key.as_str(),
            route.target.as_deref().unwrap_or("-"),
            route.authorization.as_deref().unwrap_or("NONE"),
        ]);
    }
    table.print();
    Ok(())
}

pub async fn wizard(ctx: &SessionContext) -> Result<Nav> {
    loop {
        let apis = match apigateway::list_apis(ctx).await {
            Ok(apis) => apis,
            Err(e) => {
                super::report(&e);
                pause()?;
                return Ok(Nav::Back);
            }
        };
        if apis.is_empty() {
            println!("No APIs in this account.");
            return Ok(Nav::Back);
        }
        let menu = Menu::new("API")
            .items(apis.iter().map(|api| {
                (format!("{} ({}) {}", api.name, api.protocol, api.id), api)
            }))
            .with_refresh()
            .with_back("Back")
            .with_exit();
        match menu.prompt()? {
            Choice::Item(api) => {
                let api = (*api).clone();
                if api_menu(ctx, &api).await? == Nav::Exit {
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
enum ApiAction {
    ViewRoutes,
    CreateRoute,
}

async fn api_menu(ctx: &SessionContext, api: &ApiInfo) -> Result<Nav> {
    loop {
        let menu = Menu::new(api.name.clone())
            .item("View routes", ApiAction::ViewRoutes)
            .item("Create route", ApiAction::CreateRoute)
            .with_back("Back")
            .with_exit();
        match menu.prompt()? {
            Choice::Item(ApiAction::ViewRoutes) => {
                if let Err(e) = print_routes(ctx, &api.id).await {
                    super::report(&e);
                }
                pause()?;
            }
            Choice::Item(ApiAction::CreateRoute) => {
                if let Err(e) = create_route_wizard(ctx, &api.id).await {
                    super::report(&e);
                }
                pause()?;
            }
            Choice::Nav(Nav::Back) => return Ok(Nav::Back),
            Choice::Nav(_) => return Ok(Nav::Exit),
        }
    }
}

enum IntegrationChoice {
    Existing(String),
    NewLambda,
    NewHttp,
    Skip,
}

async fn create_route_wizard(ctx: &SessionContext, api_id: &str) -> Result<()> {
    let path = input_optional("Route path, e.g. /orders (empty cancels)")?;
    let path = path.trim().to_string();
    if path.is_empty() {
        println!("Cancelled.");
        return Ok(());
    }

    let methods = ["ANY", "GET", "POST", "PUT", "PATCH", "DELETE"];
    let method_menu = Menu::new("Method").items(methods.iter().map(|m| (*m, *m)));
    let method = match method_menu.prompt()? {
        Choice::Item(method) => *method,
        Choice::Nav(_) => return Ok(()),
    };
    let route_key = format!("{method} {path}");

    let auth = pick_auth(ctx, api_id).await?;
    let integration = pick_integration(ctx, api_id).await?;

    println!();
    println!("  route key:    {route_key}");
    println!(
        "  auth:         {}",
        match &auth {
            RouteAuth::Open => "open".to_string(),
            RouteAuth::AwsIam => "AWS_IAM".to_string(),
            RouteAuth::Authorizer(id) => format!("authorizer {id}"),
        }
    );
    if !confirm("Create this route?", false)? {
        println!("Aborted.");
        return Ok(());
    }

    let integration_id = match integration {
        IntegrationChoice::Existing(id) => Some(id),
        IntegrationChoice::NewLambda => {
            let arn = input("Lambda function ARN")?;
            Some(apigateway::create_integration(ctx, api_id, IntegrationKind::LambdaProxy(arn)).await?)
        }
        IntegrationChoice::NewHttp => {
            let url = input("Target URL")?;
            Some(apigateway::create_integration(ctx, api_id, IntegrationKind::HttpProxy(url)).await?)
        }
        IntegrationChoice::Skip => None,
    };

    let route_id =
        apigateway::create_route(ctx, api_id, &route_key, integration_id.as_deref(), auth).await?;
    println!("{}", format!("Created route {route_id} ({route_key}).").green());
    Ok(())
}

async fn pick_auth(ctx: &SessionContext, api_id: &str) -> Result<RouteAuth> {
    let authorizers = apigateway::list_authorizers(ctx, api_id).await?;
    let mut menu = Menu::new("Authorization")
        .item("Open (no auth)", RouteAuth::Open)
        .item("AWS_IAM", RouteAuth::AwsIam);
    for authorizer in &authorizers {
        menu = menu.item(
            format!("Authorizer: {}", authorizer.name),
            RouteAuth::Authorizer(authorizer.id.clone()),
        );
    }
    match menu.prompt()? {
        Choice::Item(auth) => Ok(auth.clone()),
        Choice::Nav(_) => Ok(RouteAuth::Open),
    }
}

async fn pick_integration(ctx: &SessionContext, api_id: &str) -> Result<IntegrationChoice> {
    let existing = apigateway::list_integrations(ctx, api_id).await?;
    let mut menu = Menu::new("Integration")
        .item("New Lambda proxy", IntegrationChoice::NewLambda)
        .item("New HTTP proxy", IntegrationChoice::NewHttp)
        .item("No integration", IntegrationChoice::Skip);
    for integration in &existing {
        menu = menu.item(
            format!(
                "Existing: {} {}",
                integration.integration_type,
                integration.uri.as_deref().unwrap_or(&integration.id)
            ),
            IntegrationChoice::Existing(integration.id.clone()),
        );
    }
    match menu.prompt()? {
        Choice::Item(IntegrationChoice::Existing(id)) => {
            Ok(IntegrationChoice::Existing(id.clone()))
        }
        Choice::Item(IntegrationChoice::NewLambda) => Ok(IntegrationChoice::NewLambda),
        Choice::Item(IntegrationChoice::NewHttp) => Ok(IntegrationChoice::NewHttp),
        _ => Ok(IntegrationChoice::Skip),
    }
}
