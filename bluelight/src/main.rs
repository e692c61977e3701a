use std::path::PathBuf;

use anyhow::{Context, Result};
use bluelight::{Scenario, setup_environment};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(name = "bluelight", version, about = "Apply conditional offers to a basket")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply offers to a scenario's basket and print a JSON report
    Apply {
        /// Scenario JSON file
        scenario: PathBuf,
    },

    /// Print a product's cosmetic unit price after site offers
    CosmeticPrice {
        /// Scenario JSON file (only its catalog is used)
        scenario: PathBuf,
        product_id: i64,
        /// Unit price excluding tax
        #[arg(long)]
        price: Decimal,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = setup_environment();
    tracing::debug!(environment = %config.environment, "Bluelight starting");

    match args.command {
        Command::Apply { scenario } => {
            let scenario = Scenario::from_path(&scenario)?;
            let report = scenario.run(config)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::CosmeticPrice {
            scenario,
            product_id,
            price,
            quantity,
        } => {
            let scenario = Scenario::from_path(&scenario)?;
            let applicator = scenario.build_applicator(config)?;
            let product = applicator
                .catalog()
                .product(product_id)
                .with_context(|| format!("product {} is not in the scenario", product_id))?;
            let unit_price = applicator.get_cosmetic_price(&product, price, None, quantity)?;
            println!("{}", unit_price);
        }
    }
    Ok(())
}
