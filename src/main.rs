// src/main.rs

use anyhow::Result;
use clap::Parser;
use forager::layout::CacheLayout;
use forager::manifest::ManifestStore;
use forager::pipeline::{HostCommands, Pipeline};
use forager::registry::AurClient;
use forager::search::run_search;
use forager::system::Pacman;
use forager::update::compute_update_candidates;
use forager::Error;
use tracing::info;

#[derive(Parser)]
#[command(name = "forager")]
#[command(author, version, about = "AUR helper with local install tracking and update detection", long_about = None)]
struct Cli {
    /// Install a package from the AUR
    #[arg(short, long, value_name = "PKG")]
    install: Option<String>,

    /// Remove an installed package
    #[arg(short, long, value_name = "PKG")]
    remove: Option<String>,

    /// Search the AUR by substring
    #[arg(short, long, value_name = "QUERY")]
    search: Option<String>,

    /// List tracked packages
    #[arg(short, long)]
    list: bool,

    /// Upgrade all tracked packages (runs a system upgrade first)
    #[arg(short, long)]
    upgrade: bool,

    /// Print matching package names only (with --search)
    #[arg(short, long)]
    names_only: bool,

    /// Skip the system upgrade step (with --upgrade)
    #[arg(long)]
    no_sysupgrade: bool,
}

impl Cli {
    /// Number of mutually-exclusive operations selected
    fn selected(&self) -> usize {
        [
            self.install.is_some(),
            self.remove.is_some(),
            self.search.is_some(),
            self.list,
            self.upgrade,
        ]
        .iter()
        .filter(|&&on| on)
        .count()
    }

    fn validate(&self) -> Result<(), Error> {
        if self.selected() > 1 {
            return Err(Error::Usage(
                "only one of --install, --remove, --search, --list, --upgrade may be used at a time"
                    .to_string(),
            ));
        }
        if self.names_only && self.search.is_none() {
            return Err(Error::Usage(
                "--names-only is only valid together with --search".to_string(),
            ));
        }
        if self.no_sysupgrade && !self.upgrade {
            return Err(Error::Usage(
                "--no-sysupgrade is only valid together with --upgrade".to_string(),
            ));
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    cli.validate()?;

    if let Some(query) = &cli.search {
        let registry = AurClient::new()?;
        let pacman = Pacman::new();
        run_search(&registry, &pacman, query, cli.names_only)?;
        return Ok(());
    }

    let layout = CacheLayout::new()?;
    let store = ManifestStore::new(layout.manifest_path());

    if let Some(name) = &cli.install {
        info!("Installing package: {}", name);

        let registry = AurClient::new()?;
        let pacman = Pacman::new();
        let host = HostCommands::new();
        let pipeline = Pipeline::new(&registry, &host, &layout, &store);

        pipeline.install(&pacman, name)?;
        println!("Installed package: {}", name);
        return Ok(());
    }

    if let Some(name) = &cli.remove {
        info!("Removing package: {}", name);

        let pacman = Pacman::new();
        pacman.remove(name)?;

        if store.remove_entry(name)? {
            println!("Removed package: {}", name);
        } else {
            println!("Removed package: {} (was not tracked)", name);
        }
        return Ok(());
    }

    if cli.list {
        let entries = store.load()?;
        if entries.is_empty() {
            println!("No tracked packages.");
        } else {
            for entry in &entries {
                println!("{} {}", entry.name, entry.version);
            }
        }
        return Ok(());
    }

    if cli.upgrade {
        let registry = AurClient::new()?;
        let pacman = Pacman::new();
        let host = HostCommands::new();
        let pipeline = Pipeline::new(&registry, &host, &layout, &store);

        let candidates = compute_update_candidates(&registry, &pacman);
        info!("{} package(s) need an update", candidates.len());

        let updated = pipeline.update_all(&candidates, cli.no_sysupgrade)?;
        if updated.is_empty() {
            println!("All tracked packages are up to date.");
        } else {
            println!("Successfully updated: {}", updated.join(" "));
        }
        return Ok(());
    }

    // No operation selected, show a hint
    println!("Forager v{}", env!("CARGO_PKG_VERSION"));
    println!("Run 'forager --help' for usage information");
    Ok(())
}
