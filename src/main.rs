//! Fennica - a static site generator for a trilingual travel and geography blog.

mod cli;
mod config;
mod content;
mod generator;
mod images;
mod logger;
mod output;
mod render;
mod serve;
mod static_dir;
mod utils;
mod watch;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use content::{LoadSettings, SiteIndex, load_site};
use images::{FsImageResolver, ImageSettings};
use output::FsWriter;
use static_dir::StaticDir;
use std::sync::Arc;
use watch::{ContentWatcher, Dispatcher};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Generate { .. } => generate_site(&config),
        Commands::Dev { .. } => dev(&config),
    }
}

/// Loaded site plus everything needed to keep it current.
struct Workspace {
    site: SiteIndex,
    load: LoadSettings,
    images: ImageSettings,
    resolver: FsImageResolver,
    static_dir: StaticDir,
    writer: FsWriter,
}

/// Mirror the static dir, process images, then load all content.
///
/// Any content error here is fatal.
fn prepare(config: &SiteConfig) -> Result<Workspace> {
    let static_dir = StaticDir::new(
        &config.build.content,
        &config.build.output,
        &config.build.static_dir,
    );
    static_dir.init()?;

    let image_settings = ImageSettings::from_config(config);
    images::process_all(&image_settings, config.build.images.force)?;
    let resolver = FsImageResolver::new(image_settings.clone());

    let load = LoadSettings::from_config(config);
    let site = load_site(&load, &resolver).context("failed to load content")?;

    Ok(Workspace {
        site,
        load,
        images: image_settings,
        resolver,
        static_dir,
        writer: FsWriter::new(&config.build.output, config.build.minify),
    })
}

fn generate_site(config: &SiteConfig) -> Result<()> {
    let ws = prepare(config)?;
    let report = generator::generate(config, &ws.site, &ws.writer)?;
    log!(
        "generate";
        "{} pages, {} json files, {} feeds in {}",
        report.pages,
        report.json,
        report.feeds,
        config.build.output.display()
    );
    Ok(())
}

fn dev(config: &SiteConfig) -> Result<()> {
    // Started before loading so edits made meanwhile are queued
    let watcher = if config.serve.watch {
        Some(ContentWatcher::start(&config.build.content)?)
    } else {
        None
    };

    let ws = Arc::new(prepare(config)?);
    for lang in ws.site.languages() {
        if let Some(index) = ws.site.language(lang) {
            generator::write_snapshots(&index, &ws.writer)?;
        }
    }

    if let Some(watcher) = watcher {
        let ws = Arc::clone(&ws);
        std::thread::spawn(move || {
            let dispatcher = Dispatcher {
                site: &ws.site,
                load: &ws.load,
                images: &ws.images,
                resolver: &ws.resolver,
                static_dir: &ws.static_dir,
                writer: &ws.writer,
            };
            watcher.run(&dispatcher);
        });
    }

    serve::serve_site(config, &ws.site)
}
