use std::fs;
use std::path::Path;
use std::sync::mpsc::channel;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info};

use crate::common;
use crate::config::{PageProfile, SiteConfig};
use crate::site::SiteContext;

/// Main function to execute a site build, with optional file watching
pub fn execute_build(config_path: String, watch: bool) -> Result<()> {
    info!("Executing build {}", config_path);

    let config_file_path = std::path::Path::new(&config_path);
    let path_content = std::fs::read_to_string(config_file_path)?;
    let config: SiteConfig = serde_yaml::from_str(&path_content)?;

    debug!("Executing build: {:?}", config);
    run_build(&config, config_file_path)?;

    if watch {
        watch_for_changes(config, config_file_path)?;
    }

    Ok(())
}

/// Renders every configured page, then runs the asset-copy phase. A fresh
/// static-file registry is created per run so re-builds start clean.
fn run_build(config: &SiteConfig, config_file_path: &Path) -> Result<()> {
    if let Some(name) = config.meta.as_ref().and_then(|m| m.name.as_ref()) {
        info!("Building site: {}", name);
    }

    let source = config_file_path
        .parent()
        .ok_or_else(|| anyhow!("Site config file has no parent directory"))?;
    let site = Arc::new(SiteContext::new(source));
    let handlebars = common::get_handlebars(site.clone(), &config.diagram);
    let dest_root = source.join(&config.output);

    for page in &config.pages {
        let template_path = source.join(&page.template);
        info!("Rendering page: {}", template_path.display());
        let template = std::fs::read_to_string(&template_path)?;
        let data = load_page_data(source, page)?;
        let html = handlebars.render_template(&template, &data)?;

        let output_path = dest_root.join(&page.output);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let output_path_str = output_path.to_str().ok_or_else(|| {
            anyhow!(
                "Output path contains invalid UTF-8: {}",
                output_path.display()
            )
        })?;
        common::write_string_to_file(output_path_str, &html)?;
    }

    info!("Copying {} static files", site.static_files().len());
    site.copy_static_files(&dest_root)?;

    Ok(())
}

fn load_page_data(source: &Path, page: &PageProfile) -> Result<serde_json::Value> {
    match &page.data {
        Some(data_file) => {
            let data_path = source.join(data_file);
            debug!("Loading page data: {}", data_path.display());
            let content = std::fs::read_to_string(&data_path)?;
            Ok(serde_yaml::from_str(&content)?)
        }
        None => Ok(serde_json::json!({})),
    }
}

/// Sets up file watching for page templates and data files to re-run the
/// build on changes
fn watch_for_changes(config: SiteConfig, config_file_path: &Path) -> Result<()> {
    info!("Watching for changes");
    let files: Vec<String> = config
        .pages
        .iter()
        .flat_map(|page| {
            std::iter::once(page.template.clone()).chain(page.data.clone())
        })
        .collect();

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(tx, Config::default())?;
    for file in &files {
        let parent_dir = config_file_path
            .parent()
            .ok_or_else(|| anyhow!("Site config file has no parent directory"))?;
        let path = parent_dir.join(file);
        watcher.watch(&path, RecursiveMode::NonRecursive)?;
    }

    loop {
        match rx.recv() {
            Ok(event) => {
                if let Ok(event) = event {
                    if let EventKind::Modify(_) = event.kind {
                        debug!("File modified {:?}", event.paths);
                        info!("Change detected, re-executing build");
                        run_build(&config, config_file_path)?;
                    }
                }
            }
            Err(e) => error!("Watch error: {:?}", e),
        }
    }
}
