use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use poimap_client::ApiClient;
use poimap_core::{geometry, AppConfig};
use poimap_map::{
    CameraCommand, CameraController, CameraError, CameraRenderer, ClusterIndex, ClusterOptions,
    HeadlessSheet, LocationError, LocationSink, LocationSource, LocationWatch, MapSession,
    PoiBackend, SheetCoordinator, SheetId, SuggestionFlow, ViewportBounds, WatchId, WatchOptions,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "poimap-cli")]
#[command(about = "Headless driver for the POI map backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every map the backend knows about.
    Maps,
    /// Resolve the initial map the way the app does on start-up.
    Resolve {
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
    },
    /// Print the normalized POIs of a map.
    Pois {
        #[arg(long)]
        map_id: String,
    },
    /// Print the cluster markers of a map at a zoom level.
    Clusters {
        #[arg(long)]
        map_id: String,
        #[arg(long, default_value_t = 15.0)]
        zoom: f64,
    },
    /// List POI categories.
    Categories,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("poimap-cli ready; see --help");
        return Ok(());
    };

    let config = poimap_core::load_app_config().context("loading configuration")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let client = ApiClient::from_app_config(&config)?;
    tracing::debug!(env = %config.env, base_url = %config.api_base_url, "client ready");

    match command {
        Commands::Maps => {
            for map in client.fetch_maps().await? {
                println!("{}\t{}", map.id, map.name);
            }
        }
        Commands::Resolve { lat, lng } => {
            let fix = lat.zip(lng).map(|(lat, lng)| [lng, lat]);
            resolve(client, &config, fix).await?;
        }
        Commands::Pois { map_id } => {
            let pois = client.fetch_pois(&map_id).await?;
            println!("{}", serde_json::to_string_pretty(&pois)?);
        }
        Commands::Clusters { map_id, zoom } => {
            clusters(&client, &map_id, zoom).await?;
        }
        Commands::Categories => {
            for category in client.categories().await {
                println!("{}\t{}", category.category_name, category.icon_name);
            }
        }
    }

    Ok(())
}

async fn resolve(client: ApiClient, config: &AppConfig, fix: Option<[f64; 2]>) -> anyhow::Result<()> {
    let mut sheets = SheetCoordinator::new();
    for id in SheetId::ALL {
        sheets.register(id, Box::new(HeadlessSheet::new()));
    }
    let mut camera = CameraController::new();
    camera.attach(Box::new(LogCamera));

    let mut session = MapSession::new(
        client,
        SuggestionFlow::new(sheets, camera),
        Duration::from_secs(config.poi_refetch_interval_secs),
    );
    session.attach_location(LocationWatch::start(
        Box::new(FixedLocation(fix)),
        &WatchOptions::default(),
    ));

    let resolution = session.bootstrap(Instant::now()).await?;
    println!("resolution: {resolution:?}");
    println!("screen: {:?}", session.flow().screen_state());
    if let Some(map_id) = session.map_id() {
        let cfg = session.config();
        println!("map: {map_id}");
        println!("center: {:?} zoom: {}", cfg.center, cfg.zoom);
        println!("pois: {}", session.pois().len());
        if let Some(bounds) = session.flow().camera().bounds() {
            println!("camera bounds: sw {:?} ne {:?}", bounds.sw, bounds.ne);
        }
        if let Some(image) = session.background_image() {
            println!("image: {} corners {:?}", image.url, image.corners);
        }
    }
    Ok(())
}

async fn clusters(client: &ApiClient, map_id: &str, zoom: f64) -> anyhow::Result<()> {
    let config = client.fetch_map(map_id).await?;
    let pois = client.fetch_pois(map_id).await?;
    let Some(index) = ClusterIndex::build(&pois, ClusterOptions::default()) else {
        println!("[]");
        return Ok(());
    };

    let view = config
        .bounds
        .as_deref()
        .or(config.area.as_deref())
        .and_then(geometry::bounding_box)
        .map_or_else(
            || ViewportBounds::new([-180.0, -85.0], [180.0, 85.0]),
            |(sw, ne)| ViewportBounds::new(sw.lng_lat(), ne.lng_lat()),
        );
    let entries = index.clusters(&view, config.clamp_zoom(zoom));
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

/// Camera renderer that only logs what the app would do.
struct LogCamera;

impl CameraRenderer for LogCamera {
    fn apply(&mut self, command: &CameraCommand) -> Result<(), CameraError> {
        tracing::info!(?command, "camera");
        Ok(())
    }
}

/// Location provider fed from command-line coordinates.
struct FixedLocation(Option<[f64; 2]>);

impl LocationSource for FixedLocation {
    fn request_permission(&mut self) -> Result<bool, LocationError> {
        Ok(self.0.is_some())
    }

    fn watch_position(
        &mut self,
        _options: &WatchOptions,
        sink: LocationSink,
    ) -> Result<WatchId, LocationError> {
        let [lng, lat] = self.0.ok_or(LocationError::PermissionDenied)?;
        sink.publish(lng, lat);
        Ok(WatchId(0))
    }

    fn clear_watch(&mut self, _id: WatchId) {}
}
