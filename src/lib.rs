mod utils;
pub mod common;
pub mod data;

use std::path::Path;
use crate::common::{ConfigOverrides, MaskRcnnConfig};

pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;

/// Resolves `overrides` against the default settings.
pub fn init_config(overrides: ConfigOverrides) -> MaskRcnnConfig {
    let config = MaskRcnnConfig::new(overrides);
    log::info!("Initialized Mask R-CNN config ({}): batch size {}, image shape {}, image meta size {}",
               config.name().unwrap_or("unnamed"), config.batch_size(),
               config.image_shape(), config.image_meta_size());
    config
}

/// Resolves the overrides stored in a JSON file against the default settings.
pub fn init_config_from_file<P: AsRef<Path>>(path: P) -> Result<MaskRcnnConfig> {
    let overrides = ConfigOverrides::from_json_file(path)?;
    Ok(init_config(overrides))
}

/// Resolves a named variant from `<config dir>/bvr/mask_rcnn/<variant>.json`.
pub fn init_named_config(variant: &str) -> Result<MaskRcnnConfig> {
    let overrides = ConfigOverrides::from_config_dir(variant)?;
    Ok(init_config(overrides))
}
