//! EVE Industry Calculator
//!
//! Expands a product into the blueprints and raw materials needed to build it.

mod calculator;
mod catalog;
mod config;
mod error;
mod extract;
mod ledger;
mod models;
mod render;
mod sde;
mod search;
mod totals;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::{Connection, OpenFlags};
use tracing_subscriber::EnvFilter;

use crate::calculator::Expander;
use crate::catalog::{Catalog, CatalogData};
use crate::config::{DEFAULT_DATA_DIR, DataPaths};
use crate::models::{Ingredient, ItemId, Recipe, RecipeRecord};
use crate::search::ProductSearch;

#[derive(Parser)]
#[command(name = "industry-calculator")]
#[command(about = "Manufacturing tree calculator for EVE Online industry")]
struct Cli {
    /// Directory holding bp_ids.json, type_names.json and type_ids.json
    #[arg(short, long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Fail instead of continuing when a data file cannot be loaded
    #[arg(long)]
    strict: bool,

    /// Log expansion details
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a product into blueprints and raw materials
    Calc {
        /// Product name (e.g. "Rifter") or type id
        product: String,

        /// Number of units to build
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
        quantity: u64,

        /// Only print this many levels below the product
        #[arg(long)]
        depth: Option<usize>,

        /// Print the resolution as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search product names
    Search {
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show the recipe of a single product
    Show {
        /// Product name or type id
        product: String,
    },

    /// Extract catalog files from an SDE SQLite dump
    Extract {
        /// Path to the SDE SQLite database
        sde: PathBuf,

        /// Market group whose products (and their dependencies) are extracted
        #[arg(long, default_value_t = extract::SHIP_MARKET_GROUP)]
        market_group: i64,
    },

    /// Write a small sample catalog (without an SDE dump)
    Sample,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = DataPaths::new(&cli.data_dir);

    match cli.command {
        Commands::Calc {
            product,
            quantity,
            depth,
            json,
        } => {
            let catalog = load_catalog(&paths, cli.strict)?;
            let resolution = Expander::new(&catalog)
                .resolve_query(&product, quantity)
                .with_context(|| format!("failed to expand {}", product))?;

            let Some(resolution) = resolution else {
                println!("Recipe not found!");
                return Ok(());
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&resolution)?);
            } else {
                println!("Hierarchy:\n");
                println!("{}", render::format_tree(&resolution.root, depth));
                println!("{}", render::TotalsReport::new(&catalog, &resolution));
            }
        }

        Commands::Search { query, limit } => {
            let catalog = load_catalog(&paths, cli.strict)?;
            let found = ProductSearch::new()?.find(&catalog, &query, limit);
            if found.is_empty() {
                println!("No products match '{}'", query);
            } else {
                for name in found {
                    println!("  {}", name);
                }
            }
        }

        Commands::Show { product } => {
            let catalog = load_catalog(&paths, cli.strict)?;
            let Some(id) = catalog.lookup(&product) else {
                println!("Product '{}' not found", product);
                return Ok(());
            };

            println!("Product: {}", catalog.display_name(id));
            println!("  ID: {}", id);
            match catalog.recipe(id) {
                None => println!("  Raw material"),
                Some(Recipe::NoInputs { output_quantity }) => {
                    println!("  Output per run: {}", output_quantity);
                    println!("  No inputs");
                }
                Some(Recipe::Manufactured {
                    output_quantity,
                    blueprint,
                    ingredients,
                }) => {
                    println!("  Output per run: {}", output_quantity);
                    if let Some(bp) = blueprint {
                        println!("  Blueprint: {}", catalog.display_name(*bp));
                    }
                    println!("  Inputs:");
                    for ingredient in ingredients {
                        println!(
                            "    {} x {}",
                            ingredient.quantity,
                            catalog.display_name(ingredient.item)
                        );
                    }
                }
            }
        }

        Commands::Extract { sde, market_group } => {
            let conn = Connection::open_with_flags(&sde, OpenFlags::SQLITE_OPEN_READ_ONLY)
                .with_context(|| format!("failed to open SDE at {}", sde.display()))?;
            let stats = extract::extract_to_files(&conn, market_group, &paths)?;
            println!("{}", stats);
        }

        Commands::Sample => {
            let data = sample_data();
            data.write(&paths)?;
            println!("Sample catalog written to {}", paths.data_dir().display());

            let catalog = data.into_catalog();
            if let Some(resolution) = Expander::new(&catalog).resolve_query(SAMPLE_PRODUCT, 1)? {
                println!("\nTry 'calc {}':", SAMPLE_PRODUCT);
                println!("{}", render::TotalsReport::new(&catalog, &resolution));
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "industry_calculator=debug"
    } else {
        "industry_calculator=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(paths: &DataPaths, strict: bool) -> Result<Catalog> {
    if strict {
        return Ok(Catalog::load_strict(paths)?);
    }
    let catalog = Catalog::load(paths);
    if catalog.is_empty() {
        tracing::warn!(
            "no catalog data in {}; run 'extract' or 'sample' first",
            paths.data_dir().display()
        );
    }
    Ok(catalog)
}

/// Product previewed after writing the sample catalog
const SAMPLE_PRODUCT: &str = "Wolf";

/// Sample EVE industry data for trying the calculator without an SDE dump
fn sample_data() -> CatalogData {
    fn recipe(output: u64, blueprint: u64, inputs: &[(f64, u64)]) -> RecipeRecord {
        RecipeRecord {
            output_quantity: Some(output),
            blueprint: Some(ItemId(blueprint)),
            ingredients: Some(
                inputs
                    .iter()
                    .map(|&(quantity, id)| Ingredient {
                        quantity,
                        item: ItemId(id),
                    })
                    .collect(),
            ),
        }
    }

    let mut data = CatalogData::default();

    // Rifter: minerals only
    data.recipes.insert(
        ItemId(587),
        recipe(1, 691, &[(32000.0, 34), (6000.0, 35), (2500.0, 36), (500.0, 37)]),
    );

    // Wolf: a Rifter hull plus advanced components
    data.recipes.insert(
        ItemId(11371),
        recipe(1, 11372, &[(1.0, 587), (15.0, 11539), (40.0, 11399), (4.0, 11555)]),
    );

    // Components are built in batches, leaving surplus in storage
    data.recipes.insert(
        ItemId(11539),
        recipe(10, 11540, &[(5.0, 16679), (100.0, 35), (1.0, 11399)]),
    );
    data.recipes.insert(
        ItemId(11555),
        recipe(10, 11556, &[(3.0, 16679), (60.0, 34)]),
    );

    // Reaction: one run yields 3000 units
    data.recipes.insert(ItemId(16679), recipe(3000, 46209, &[(100.0, 16634), (100.0, 16633)]));

    let names = [
        (34, "Tritanium"),
        (35, "Pyerite"),
        (36, "Mexallon"),
        (37, "Isogen"),
        (587, "Rifter"),
        (691, "Rifter Blueprint"),
        (11371, "Wolf"),
        (11372, "Wolf Blueprint"),
        (11399, "Morphite"),
        (11539, "Nanoelectrical Microprocessor"),
        (11540, "Nanoelectrical Microprocessor Blueprint"),
        (11555, "Titanium Diborite Armor Plate"),
        (11556, "Titanium Diborite Armor Plate Blueprint"),
        (16633, "Hydrocarbons"),
        (16634, "Atmospheric Gases"),
        (16679, "Fullerides"),
        (46209, "Fullerides Reaction Formula"),
    ];
    for (id, name) in names {
        data.names.insert(ItemId(id), Some(name.to_string()));
    }

    data
}
