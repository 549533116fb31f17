use std::{path::PathBuf, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use client_core::{
    load_client_settings, FareSimulationController, FlightCatalog, HttpFareService,
    SearchController, SearchForm, SearchOutcome,
};
use shared::domain::DEFAULT_FLIGHT_CLASS;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Search flights and simulate fares against the pricing service")]
struct Cli {
    /// Overrides the configured API base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Client settings file; defaults to ./fare_client.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct RouteArgs {
    #[arg(long)]
    source: String,
    #[arg(long)]
    destination: String,
    #[arg(long = "class", default_value = DEFAULT_FLIGHT_CLASS)]
    flight_class: String,
}

#[derive(Args, Debug)]
struct SimulationArgs {
    /// Zero-based position of the flight in the search results.
    #[arg(long, default_value_t = 0)]
    flight: usize,
    /// Travel date (YYYY-MM-DD); wins over --days-left.
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    days_left: Option<u32>,
    #[arg(long)]
    seats: Option<u32>,
    #[arg(long)]
    demand: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List flights for a route.
    Search {
        #[command(flatten)]
        route: RouteArgs,
    },
    /// Recalculate one flight's fare breakdown.
    Explain {
        #[command(flatten)]
        route: RouteArgs,
        #[command(flatten)]
        inputs: SimulationArgs,
    },
    /// Sweep one pricing input for a flight.
    Simulate {
        #[arg(value_enum)]
        sweep: Sweep,
        #[command(flatten)]
        route: RouteArgs,
        #[command(flatten)]
        inputs: SimulationArgs,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Sweep {
    Days,
    Seats,
    Demand,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = load_client_settings(cli.config.as_deref());
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    if let Some(secs) = cli.timeout_secs.filter(|secs| *secs > 0) {
        settings.request_timeout = Duration::from_secs(secs);
    }
    let service = HttpFareService::new(&settings)?;
    info!(base_url = %service.base_url(), "fare service configured");

    match cli.command {
        Command::Search { route } => {
            let catalog = load_catalog(&service, &route).await?;
            let now = Utc::now();
            for (index, card) in catalog.cards_at(now).enumerate() {
                print!("[{index}] {card}");
            }
        }
        Command::Explain { route, inputs } => {
            let mut catalog = load_catalog(&service, &route).await?;
            let card = select_flight(&mut catalog, inputs.flight)?;
            apply_inputs(card, &inputs);
            card.toggle();
            card.recalc(&service).await;
            print!("{}", card.card_at(Utc::now()));
        }
        Command::Simulate {
            sweep,
            route,
            inputs,
        } => {
            let mut catalog = load_catalog(&service, &route).await?;
            let card = select_flight(&mut catalog, inputs.flight)?;
            apply_inputs(card, &inputs);
            let request = card
                .explain_request_at(Utc::now())
                .map_err(|err| anyhow!("cannot simulate {}: {err}", card.flight().airline))?;

            match sweep {
                Sweep::Days => {
                    let response = service.simulate_days(&request).await?;
                    println!("{} {}", response.route, response.flight_class);
                    for point in response.simulation {
                        println!("{:>4} days  ₹{:.2}", point.days_left, point.price);
                    }
                }
                Sweep::Seats => {
                    let response = service.simulate_seats(&request).await?;
                    println!("{} {}", response.route, response.flight_class);
                    for point in response.seat_pressure_simulation {
                        println!(
                            "{:>4} seats  x{:.3}  seat {:.2}  ₹{:.2}",
                            point.seats_left,
                            point.ml_multiplier,
                            point.seat_factor,
                            point.final_price
                        );
                    }
                }
                Sweep::Demand => {
                    let response = service.simulate_demand(&request).await?;
                    println!("{} {}", response.route, response.flight_class);
                    for point in response.demand_simulation {
                        println!(
                            "{:>4.1} demand  x{:.3}  demand {:.2}  ₹{:.2}",
                            point.demand_index,
                            point.ml_multiplier,
                            point.demand_factor,
                            point.final_price
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

async fn load_catalog(service: &HttpFareService, route: &RouteArgs) -> Result<FlightCatalog> {
    let mut form = SearchForm::new();
    form.set_source(route.source.as_str());
    if !form.set_destination(route.destination.as_str()) {
        bail!("destination must differ from source");
    }
    form.set_flight_class(route.flight_class.as_str());
    if !form.is_ready() {
        bail!("source, destination and class are all required");
    }
    let unknown = form.unknown_fields();
    if !unknown.is_empty() {
        bail!("unsupported value for {}", unknown.join(", "));
    }

    let mut search = SearchController::new();
    if let SearchOutcome::Loaded { flights } =
        search.search(form.criteria().clone(), service).await?
    {
        info!(flights, route = ?search.route(), "search complete");
    }

    let mut catalog = FlightCatalog::new();
    catalog.sync(&search);
    Ok(catalog)
}

fn select_flight(
    catalog: &mut FlightCatalog,
    index: usize,
) -> Result<&mut FareSimulationController> {
    let len = catalog.len();
    let key = catalog
        .key_at(index)
        .cloned()
        .with_context(|| format!("no flight at position {index} ({len} found)"))?;
    catalog
        .get_mut(&key)
        .with_context(|| format!("flight {key} disappeared"))
}

fn apply_inputs(card: &mut FareSimulationController, inputs: &SimulationArgs) {
    if let Some(days) = inputs.days_left {
        card.set_days_left_slider(days);
    }
    card.set_selected_date(inputs.date);
    if let Some(seats) = inputs.seats {
        card.set_seats_left(seats);
    }
    if let Some(demand) = inputs.demand {
        card.set_demand_index(demand);
    }
}
