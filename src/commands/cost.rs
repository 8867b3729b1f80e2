use anyhow::Result;
use colored::Colorize;

use awsnav_aws::SessionContext;
use awsnav_aws::cost;
use awsnav_ui::{Choice, Menu, Nav, Table, pause};

const TOP_SERVICES: usize = 10;

#[derive(Clone, Copy)]
enum Report {
    MonthToDate,
    TopServices,
    IdleScan,
}

pub async fn wizard(ctx: &SessionContext) -> Result<Nav> {
    loop {
        let menu = Menu::new("Cost overview")
            .item("Month-to-date summary", Report::MonthToDate)
            .item("Top services this month", Report::TopServices)
            .item("Idle resource scan", Report::IdleScan)
            .with_back("Back")
            .with_exit();
        match menu.prompt()? {
            Choice::Item(picked) => {
                let outcome = match picked {
                    Report::MonthToDate => month_to_date(ctx).await,
                    Report::TopServices => top_services(ctx).await,
                    Report::IdleScan => idle_scan(ctx).await,
                };
                if let Err(e) = outcome {
                    super::report(&e);
                }
                pause()?;
            }
            Choice::Nav(Nav::Back) => return Ok(Nav::Back),
            Choice::Nav(_) => return Ok(Nav::Exit),
        }
    }
}

async fn month_to_date(ctx: &SessionContext) -> Result<()> {
    let summary = cost::month_to_date(ctx).await?;
    println!();
    println!("Period: {} to {}", summary.start, summary.end);
    println!(
        "Spend so far: {}",
        format!("{:.2} {}", summary.total, summary.unit).bold()
    );
    match summary.forecast {
        Some(forecast) => println!(
            "Forecast for the month: {:.2} {}",
            summary.total + forecast,
            summary.unit
        ),
        None => println!("No forecast available."),
    }
    Ok(())
}

async fn top_services(ctx: &SessionContext) -> Result<()> {
    let costs = cost::top_services(ctx, TOP_SERVICES).await?;
    if costs.is_empty() {
        println!("No cost data for this month yet.");
        return Ok(());
    }
    let mut table = Table::new(["SERVICE", "COST"]);
    for item in &costs {
        table.row([item.service.clone(), format!("{:.2}", item.amount)]);
    }
    table.print();
    Ok(())
}

async fn idle_scan(ctx: &SessionContext) -> Result<()> {
    println!("Scanning for idle resources...");
    let found = cost::idle_resources(ctx).await;
    if found.is_empty() {
        println!("{}", "No idle resources found.".green());
        return Ok(());
    }
    let mut table = Table::new(["KIND", "ID", "NOTE"]);
    for item in &found {
        table.row([item.kind.as_str(), item.id.as_str(), item.note.as_str()]);
    }
    table.print();
    println!(
        "\n{}",
        format!("{} idle resources found.", found.len()).yellow()
    );
    Ok(())
}
