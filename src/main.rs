use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::{ArgGroup, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod config;
mod dashboard;
mod db;
mod error;
mod filters;
mod models;
mod report;
mod severity;
mod stats;

use dashboard::FacilityStore;
use db::PgStore;
use filters::SiteFilter;
use models::Domain;
use severity::{priority_severity, status_severity};

#[derive(Parser)]
#[command(name = "facility-dashboard")]
#[command(about = "Facility management dashboard for rooms, maintenance, transport and catering", long_about = None)]
struct Cli {
    /// Log debug output (overridden by FACILITY_LOG)
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load representative records for every domain
    Seed,
    /// Import records for one domain from a CSV file
    Import {
        #[arg(long, value_enum)]
        domain: Domain,
        #[arg(long)]
        csv: PathBuf,
    },
    /// List the records of one domain
    #[command(group(
        ArgGroup::new("state")
            .args(["open", "closed"])
            .multiple(false)
    ))]
    List {
        #[arg(long, value_enum)]
        domain: Domain,
        /// Site name, or "All Sites"
        #[arg(long)]
        site: Option<String>,
        /// Only open maintenance tickets
        #[arg(long)]
        open: bool,
        /// Only completed maintenance tickets
        #[arg(long)]
        closed: bool,
        /// Print the records as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Print the dashboard summary cards
    Stats {
        #[arg(long)]
        site: Option<String>,
        #[arg(long)]
        json: bool,
        /// Print one set of cards per site from a single load
        #[arg(long, conflicts_with_all = ["site", "json"])]
        by_site: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        site: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("FACILITY_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = config::Config::from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;
    let store = PgStore::new(pool.clone());

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let inserted = db::seed(&pool).await?;
            println!("Seed data applied ({inserted} new records).");
        }
        Commands::Import { domain, csv } => {
            let inserted = db::import_csv(&pool, domain, &csv).await?;
            println!("Inserted {inserted} {domain} records from {}.", csv.display());
        }
        Commands::List {
            domain,
            site,
            open,
            closed,
            json,
        } => {
            let filter = SiteFilter::from_arg(site.as_deref());
            if (open || closed) && domain != Domain::Maintenance {
                tracing::warn!(%domain, "--open/--closed only apply to maintenance tickets");
            }
            let selection = Selection {
                open_only: open,
                closed_only: closed,
                json,
            };
            let printed = list_domain(&store, domain, &filter, selection).await?;
            if printed == 0 && !json {
                println!("No {domain} records for {}.", filter.label());
                if let Some(site) = filter.as_site() {
                    if !filters::KNOWN_SITES.contains(&site) {
                        println!("Known sites: {}", filters::KNOWN_SITES.join(", "));
                    }
                }
            }
        }
        Commands::Stats {
            by_site: true, ..
        } => {
            let data = dashboard::load_all(&store, &SiteFilter::All).await?;
            let now = Local::now();
            for summary in report::summarize_by_site(&data) {
                let site_filter = SiteFilter::Site(summary.site);
                let snapshot = data.restricted_to(&site_filter).stats_at(now);
                let mut cards = String::new();
                report::write_summary_cards(&mut cards, &snapshot);
                println!("{}:", site_filter.label());
                print!("{cards}");
            }
        }
        Commands::Stats { site, json, .. } => {
            let filter = SiteFilter::from_arg(site.as_deref());
            let snapshot = dashboard::load_snapshot(&store, &filter).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("Dashboard for {}:", filter.label());
                let mut cards = String::new();
                report::write_summary_cards(&mut cards, &snapshot);
                print!("{cards}");
            }
        }
        Commands::Report { site, out } => {
            let filter = SiteFilter::from_arg(site.as_deref());
            let data = dashboard::load_all(&store, &filter).await?;
            let report = report::build_report(&filter, &data, Local::now());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Selection {
    open_only: bool,
    closed_only: bool,
    json: bool,
}

fn print_json<T: serde::Serialize>(records: &[T]) -> anyhow::Result<usize> {
    println!("{}", serde_json::to_string_pretty(records)?);
    Ok(records.len())
}

async fn list_domain(
    store: &PgStore,
    domain: Domain,
    filter: &SiteFilter,
    selection: Selection,
) -> anyhow::Result<usize> {
    let now = Local::now();

    let printed = match domain {
        Domain::Rooms => {
            let rooms = store.fetch_rooms(filter).await?;
            if selection.json {
                return print_json(&rooms);
            }
            for room in &rooms {
                println!(
                    "- {} / {} {} ({}): {}, occupant {}",
                    room.site,
                    room.building_name,
                    room.room_number,
                    room.room_type,
                    room.status,
                    room.occupant.as_deref().unwrap_or("-")
                );
            }
            rooms.len()
        }
        Domain::Maintenance => {
            let tickets = store.fetch_maintenance(filter).await?;
            let (open, closed) = filters::split_tickets(&tickets);
            let selected = if selection.open_only {
                open
            } else if selection.closed_only {
                closed
            } else {
                tickets
            };
            if selection.json {
                return print_json(&selected);
            }
            for ticket in &selected {
                let age = stats::days_open(ticket.date_reported.as_deref(), now)
                    .map(|days| format!("{days}d"))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "- {} / {} {}: {} | priority {} [{}] | status {} [{}] | reported by {} | {}",
                    ticket.site,
                    ticket.building_name,
                    ticket.room_number,
                    ticket.issue.as_deref().unwrap_or("-"),
                    ticket.priority.as_deref().unwrap_or("-"),
                    priority_severity(ticket.priority.as_deref()),
                    ticket.status.as_deref().unwrap_or("-"),
                    status_severity(ticket.status.as_deref()),
                    ticket.reporter_name,
                    age
                );
            }
            selected.len()
        }
        Domain::Transport => {
            let fleet = store.fetch_transport(filter).await?;
            if selection.json {
                return print_json(&fleet);
            }
            for vehicle in &fleet {
                println!(
                    "- {} {} [{}] ({}): driver {}, route {}, {} km, next service {}, status {}",
                    vehicle.registration_number,
                    vehicle.vehicle,
                    vehicle.vehicle_type.as_deref().unwrap_or("-"),
                    vehicle.site,
                    vehicle.driver_name,
                    vehicle.route,
                    vehicle.mileage,
                    vehicle.next_maintenance_date.as_deref().unwrap_or("-"),
                    vehicle.status.as_deref().unwrap_or("-")
                );
            }
            fleet.len()
        }
        Domain::Catering => {
            let meals = store.fetch_catering(filter).await?;
            if selection.json {
                return print_json(&meals);
            }
            for meal in &meals {
                println!(
                    "- {} / {}: chef {} ({}), {} x{} on {} | status {} [{}]",
                    meal.site,
                    meal.building_name,
                    meal.chef_name,
                    meal.shift,
                    meal.item.as_deref().unwrap_or("-"),
                    meal.quantity.unwrap_or(0),
                    meal.date_reported.as_deref().unwrap_or("-"),
                    meal.status.as_deref().unwrap_or("N/A"),
                    status_severity(meal.status.as_deref())
                );
            }
            meals.len()
        }
    };

    Ok(printed)
}
