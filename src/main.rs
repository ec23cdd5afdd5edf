//! Marginalia - connection engine for an editorial static site.

use anyhow::{Context, Result, bail};
use clap::Parser;

use marginalia::build::{build_site, connect_essay};
use marginalia::check::check_corpus;
use marginalia::cli::{Cli, Commands};
use marginalia::config::SiteConfig;
use marginalia::corpus::load_corpus;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Build { clean } => build_site(&config, *clean),
        Commands::Connect { slug, pretty } => connect_one(&config, slug, *pretty),
        Commands::Check => check_corpus(&config),
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let root = cli.root.clone().unwrap_or_else(|| "./".into());
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        SiteConfig::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}

/// Compute and print the positioned connections for one essay.
fn connect_one(config: &SiteConfig, slug: &str, pretty: bool) -> Result<()> {
    let store = load_corpus(&config.site.content)?;
    let Some(essay) = store.essay(slug) else {
        bail!("no essay with slug `{slug}`");
    };

    let placements = connect_essay(essay, &store, config)
        .with_context(|| format!("connecting essay `{slug}`"))?;
    let json = if pretty {
        serde_json::to_string_pretty(&placements)?
    } else {
        serde_json::to_string(&placements)?
    };
    println!("{json}");
    Ok(())
}
