use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::data::PRIORITY_COUNT;
use crate::errors::Result;
use crate::index::DEFAULT_MAX_DEPTH;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct UserConfig {
    /// OSM XML export, optionally `.xz` compressed.
    pub data_path: String,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Regex over tag keys; ways with no matching key are not loaded.
    #[serde(default)]
    pub require_tag: Option<String>,
    /// `[lon, lat]` to pick the nearest way at after loading.
    #[serde(default)]
    pub inspect: Option<[f64; 2]>,
    #[serde(default = "default_priority_cutoff")]
    pub priority_cutoff: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_priority_cutoff() -> usize {
    PRIORITY_COUNT
}

pub fn load_user_config(path: &Path) -> Result<UserConfig> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
