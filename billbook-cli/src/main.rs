mod cli;
mod logger;
mod render;

use anyhow::{Context, bail};
use billbook_client::{HttpRecordStore, OrderCollectionController};
use clap::Parser;
use shared::{BillMode, OrderAggregate};

use crate::cli::{Cli, Command};

type Controller = OrderCollectionController<HttpRecordStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so clap's env fallbacks can see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logger::init_logger(&cli.log_level, cli.log_json);

    let config = cli.client_config();
    config.session().require().context("set BILLBOOK_SESSION_TOKEN or pass --token")?;

    tracing::debug!(url = %config.base_url, "Using record store");
    let store = config.build_record_store()?;
    let mut controller =
        OrderCollectionController::new(store).with_delete_concurrency(config.delete_concurrency);

    run(cli.command, &mut controller).await
}

async fn run(command: Command, controller: &mut Controller) -> anyhow::Result<()> {
    match command {
        Command::List { status } => {
            controller.refresh().await?;
            print!("{}", render::OrderTable(&controller.filtered(status)));
        }
        Command::Show { id } => {
            let order = controller.load(&id).await?;
            print!("{}", render::OrderDetail(&order));
        }
        Command::Stats => {
            controller.refresh().await?;
            print!("{}", render::StatsView(&controller.stats()));
        }
        Command::Create {
            client,
            items,
            half,
            paid,
        } => {
            let mut builder = OrderAggregate::builder(client);
            for item in items {
                builder = builder.line(item.name, item.count, item.price);
            }
            if let Some(paid) = paid {
                builder = builder.amount_paid(paid);
            }
            if half {
                builder = builder.bill_mode(BillMode::Half);
            }
            let draft = builder.build()?;
            let created = controller.create(&draft).await?;
            print!("{}", render::OrderDetail(&created));
        }
        Command::Pay { id, amount } => {
            controller.refresh().await?;
            let updated = controller.record_payment(&id, amount).await?;
            print!("{}", render::OrderDetail(&updated));
        }
        Command::Clear { id } => {
            controller.refresh().await?;
            let updated = controller.clear_payment(&id).await?;
            print!("{}", render::OrderDetail(&updated));
        }
        Command::Delete { id } => {
            controller.delete_one(&id).await?;
            println!("Deleted order {}", id);
        }
        Command::DeleteAll { yes } => {
            if !yes {
                bail!("refusing to delete every order without --yes");
            }
            controller.refresh().await?;
            let count = controller.orders().len();
            if let Err(e) = controller.delete_all().await {
                // Local state is stale after a partial failure; show what is left
                controller.refresh().await.ok();
                bail!("{} ({} orders remain)", e, controller.orders().len());
            }
            println!("Deleted {} orders", count);
        }
    }
    Ok(())
}
