use crate::catalog::Catalog;
use crate::input::TaskConfig;
use log::info;
use std::path::Path;
use std::time::Duration;

pub fn show_greeting(config_path: Option<&str>) {
    info!("=== climviz: climate grid visualizer ===");
    match config_path {
        Some(path) => info!("Loading configuration from: {}", path),
        None => info!("Using configuration from command-line arguments"),
    }
}

pub fn config_echo(config: &TaskConfig) {
    info!("Configuration:");
    info!("  Task: {}", config.task_name);
    info!("  Mode: {}", config.mode);
    info!("  Outputs: {}", config.outputs_dir.display());
    info!("  Datasets: {}", config.data_paths.len());

    for (name, path) in &config.data_paths {
        let steps = config
            .time_steps
            .as_ref()
            .and_then(|s| s.get(name))
            .copied()
            .unwrap_or(1);
        info!("    {}: {} ({} step(s))", name, path.display(), steps);
    }
    if let Some(region) = &config.region {
        info!(
            "  Region: lat {:?} lon {:?} dlat {:?} dlon {:?}",
            region.lat, region.lon, region.dlat, region.dlon
        );
    }
    info!("  Frame rate: {} fps", config.fps);
}

pub fn show_catalog_info(catalog: &Catalog) {
    info!(
        "Catalog ({} cells per degree):",
        catalog.indexer().cells_per_degree()
    );
    for name in catalog.names() {
        if let Some(dataset) = catalog.get(name) {
            let (n_lat, n_lon) = dataset.grid_data().spatial_shape();
            info!(
                "  {} [{}]: {} step(s) on {}x{}",
                name,
                dataset.variable_name(),
                dataset.time_step_count(),
                n_lat,
                n_lon
            );
        }
    }
}

pub fn show_farewell_with_timing(animation: Option<&Path>, elapsed: Duration) {
    match animation {
        Some(path) => info!("Animation written to {}", path.display()),
        None => info!("Frames written; animation skipped"),
    }
    info!("=== Task completed in {:.2?} ===", elapsed);
}
