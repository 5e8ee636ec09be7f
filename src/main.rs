use std::env;
use std::io;
use std::path::PathBuf;

use log::{info, warn};
use structured_logger::json::new_writer;
use structured_logger::Builder;

use waymap::config::{load_user_config, UserConfig};
use waymap::data::osm::project;
use waymap::errors::Result;
use waymap::etl::parse_osm::ParseOsmEtl;
use waymap::etl::Etl;
use waymap::Map;

const DEFAULT_CONFIG_PATH: &str = "config/default.json";
const LOG_LEVEL_VAR: &str = "WAYMAP_LOG";

fn setup_logging() {
    let level = env::var(LOG_LEVEL_VAR).unwrap_or_else(|_| "info".to_string());
    Builder::with_level(&level)
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

fn config_path() -> PathBuf {
    env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn log_summary(map: &Map) {
    let Some(index) = map.index() else {
        warn!("Input declared no extent and no nodes; map is empty");
        return;
    };
    let extent = index.extent();
    info!(
        features = map.len(),
        max_depth = index.max_depth(),
        min_x = extent.min.x,
        min_y = extent.min.y,
        max_x = extent.max.x,
        max_y = extent.max.y;
        "Map loaded"
    );
    for (tier, count) in index.tier_counts().iter().enumerate() {
        info!(tier = tier, features = *count; "Tier size");
    }
    let composition = map.composition();
    info!(
        closed = composition.closed,
        footways = composition.footways,
        buildings = composition.buildings,
        tracks = composition.tracks,
        major_roads = composition.major_roads;
        "Feature kinds"
    );
}

fn inspect(map: &Map, config: &UserConfig) {
    let Some([lon, lat]) = config.inspect else {
        return;
    };
    let nearest = map.nearest(project(lon, lat), config.priority_cutoff);
    match &nearest.feature {
        Some(feature) => {
            let category = format!("{:?}", feature.category());
            let tags = serde_json::to_string(feature.tags()).unwrap_or_default();
            info!(
                lon = lon,
                lat = lat,
                way_id = feature.id(),
                category = category.as_str(),
                line_width = feature.category().line_width(),
                distance = nearest.distance(),
                tags = tags.as_str();
                "Nearest way"
            );
        }
        None => warn!(lon = lon, lat = lat; "No way near inspected point"),
    }
}

fn main() -> Result<()> {
    setup_logging();

    let user_config = load_user_config(&config_path())?;
    let map = ParseOsmEtl::new(&user_config).process()?;
    log_summary(&map);
    inspect(&map, &user_config);

    Ok(())
}
