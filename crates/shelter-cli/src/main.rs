mod output;

use clap::{Args, Parser, Subcommand};
use shelter_client::ShelterApiClient;
use shelter_core::{GeoPoint, SearchKind};
use shelter_engine::{
    EngineConfig, FixedLocationProvider, HeadlessMap, MapLinks, QueryOutcome, ShelterDetail,
    ShelterEngine,
};
use tracing_subscriber::EnvFilter;

type CliEngine = ShelterEngine<ShelterApiClient, FixedLocationProvider, HeadlessMap>;

#[derive(Debug, Parser)]
#[command(name = "shelter-cli")]
#[command(about = "Find emergency shelters near a location")]
struct Cli {
    /// Print render models as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ask the backend to reload its shelter dataset
    Init,
    /// Shelters closest to a position
    Nearest {
        #[command(flatten)]
        at: Position,
        /// Number of shelters to request (defaults to SHELTER_NEAREST_LIMIT)
        #[arg(long)]
        limit: Option<u32>,
        #[command(flatten)]
        focus: Focus,
    },
    /// Keyword search by shelter name or address
    Search {
        /// Field to match: name or address
        #[arg(long, default_value = "name")]
        by: SearchKind,
        keyword: String,
        /// Rank results from this latitude (requires --lng)
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Rank results from this longitude (requires --lat)
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
        #[command(flatten)]
        focus: Focus,
    },
    /// Shelters within a radius of a position
    Radius {
        #[command(flatten)]
        at: Position,
        /// Radius in kilometres
        #[arg(long)]
        km: f64,
        #[command(flatten)]
        focus: Focus,
    },
    /// Details of one shelter by backend id
    Show { id: i64 },
}

#[derive(Debug, Args)]
struct Position {
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,
    #[arg(long, allow_negative_numbers = true)]
    lng: f64,
}

impl Position {
    fn point(&self) -> anyhow::Result<GeoPoint> {
        Ok(GeoPoint::new(self.lat, self.lng)?)
    }
}

#[derive(Debug, Args)]
struct Focus {
    /// Focus the shelter at this list index and show its details
    #[arg(long)]
    focus: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = shelter_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(env = %config.env, backend = %config.api_base_url, "shelter-cli starting");

    let client = ShelterApiClient::from_config(&config)?;
    let engine_config = EngineConfig::from_app_config(&config);

    match cli.command {
        Commands::Init => {
            let engine = build_engine(&engine_config, client, None);
            let status = engine.initialize_dataset().await?;
            println!("{status}");
        }
        Commands::Nearest { at, limit, focus } => {
            let origin = at.point()?;
            let engine = build_engine(&engine_config, client, Some(origin));
            engine.acquire_location().await?;
            let outcome = engine
                .nearest(origin, limit.unwrap_or(config.nearest_limit))
                .await?;
            report(&engine, outcome, focus.focus, cli.json).await?;
        }
        Commands::Search {
            by,
            keyword,
            lat,
            lng,
            focus,
        } => {
            let user = match (lat, lng) {
                (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)?),
                _ => None,
            };
            let engine = build_engine(&engine_config, client, user);
            if engine.location_supported() {
                engine.acquire_location().await?;
            }
            let outcome = engine.search(by, &keyword).await?;
            report(&engine, outcome, focus.focus, cli.json).await?;
        }
        Commands::Radius { at, km, focus } => {
            let origin = at.point()?;
            let engine = build_engine(&engine_config, client, Some(origin));
            engine.acquire_location().await?;
            let outcome = engine.within_radius(origin, km).await?;
            report(&engine, outcome, focus.focus, cli.json).await?;
        }
        Commands::Show { id } => {
            let Some(record) = client.shelter_by_id(id).await? else {
                anyhow::bail!("no shelter with id {id}");
            };
            let links = MapLinks::new(&engine_config.map_link_base);
            let detail = ShelterDetail::from_record(0, &record, &links, None);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                output::print_detail(&detail);
            }
        }
    }

    Ok(())
}

fn build_engine(
    config: &EngineConfig,
    client: ShelterApiClient,
    user: Option<GeoPoint>,
) -> CliEngine {
    ShelterEngine::new(
        config,
        client,
        FixedLocationProvider::new(user),
        HeadlessMap::new(),
    )
}

/// Prints the result list and, when requested, the focused shelter.
async fn report(
    engine: &CliEngine,
    outcome: QueryOutcome,
    focus: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    if outcome == QueryOutcome::Superseded {
        tracing::warn!("query superseded; nothing to show");
        return Ok(());
    }

    tracing::debug!(status = %engine.location_status().await, "location");

    let view = engine.directory_view().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        output::print_directory(&view);
    }

    let Some(index) = focus else {
        return Ok(());
    };

    let focused = engine.focus_by_list_index(index).await?;
    let popover = engine
        .with_map(|map| map.marker(focused.marker).and_then(|m| m.popover.clone()))
        .await;
    let detail = engine.open_detail(index).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&(popover, detail))?);
        return Ok(());
    }

    println!();
    if let Some(popover) = popover {
        output::print_popover(&popover);
    }
    if let Some(detail) = detail {
        println!();
        output::print_detail(&detail);
    }

    Ok(())
}
