//! Static-generation orchestration.
//!
//! Per-essay pipeline, one invocation per essay, each independent:
//!
//! ```text
//! build_site()
//!     │
//!     ├── load_corpus() ──► ContentStore (drafts filtered, slugs checked)
//!     │
//!     └── for each essay (rayon):
//!             render_markdown() ──► base HTML
//!             compute_connections() ──► ranked Connections
//!             position_connections() ──► PositionedConnections
//!             split_placements() ──► {inline, fallback}
//!             inject_callouts() ──► essays/<slug>/index.html
//!             serialize placements ──► essays/<slug>/connections.json
//! ```
//!
//! The fallback half of the JSON is what the margin-rendering collaborator
//! reads; the injected HTML already carries the inline callouts.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;

use crate::config::SiteConfig;
use crate::corpus::{ContentStore, Essay, load_corpus};
use crate::engine::{Placements, compute_connections, position_connections, split_placements};
use crate::inject::inject_callouts;
use crate::log;
use crate::logger::Progress;
use crate::render::render_markdown;

/// Build every essay's connected page and connection JSON.
///
/// If `clean` is set, the output directory is removed first.
pub fn build_site(config: &SiteConfig, clean: bool) -> Result<()> {
    let output = &config.site.output;
    if clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("cleaning output dir {}", output.display()))?;
    }

    let store = load_corpus(&config.site.content)?;
    log!("corpus"; "loaded {} entries ({} essays)", store.len(), store.essays().len());

    if store.essays().is_empty() {
        log!("build"; "no essays to build");
        return Ok(());
    }

    let progress = Progress::new("essays", store.essays().len());
    let has_error = AtomicBool::new(false);

    store.essays().par_iter().try_for_each(|essay| {
        if has_error.load(Ordering::Relaxed) {
            return Err(anyhow!("Aborted"));
        }
        let result = build_essay(essay, &store, config)
            .with_context(|| format!("building essay `{}`", essay.slug));
        if let Err(e) = &result {
            if !has_error.swap(true, Ordering::Relaxed) {
                log!("error"; "{:#}", e);
            }
        }
        if let Some(progress) = &progress {
            progress.inc();
        }
        result.map(|_| ())
    })?;

    if let Some(progress) = progress {
        progress.finish();
    }
    log!("build"; "wrote {} essays to {}", store.essays().len(), output.display());
    Ok(())
}

/// Run the full pipeline for one essay and write its outputs.
///
/// Returns the placements so `connect` can reuse this without touching
/// the filesystem path decisions.
fn build_essay(essay: &Essay, store: &ContentStore, config: &SiteConfig) -> Result<Placements> {
    let (html, placements) = run_pipeline(essay, store, config)?;
    let page = inject_callouts(&html, &placements.inline)?;

    let dir = config.site.output.join("essays").join(&essay.slug);
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    write_file(&dir.join("index.html"), page.as_bytes())?;

    let json = serde_json::to_vec_pretty(&placements)?;
    write_file(&dir.join("connections.json"), &json)?;
    Ok(placements)
}

/// Render, score, and position one essay without writing anything.
pub fn connect_essay(
    essay: &Essay,
    store: &ContentStore,
    config: &SiteConfig,
) -> Result<Placements> {
    run_pipeline(essay, store, config).map(|(_, placements)| placements)
}

fn run_pipeline(
    essay: &Essay,
    store: &ContentStore,
    config: &SiteConfig,
) -> Result<(String, Placements)> {
    let html = render_markdown(&essay.body);
    let connections = compute_connections(essay, store.all(), &config.engine)?;
    let positioned = position_connections(connections, &html)?;
    Ok((html, split_placements(positioned)))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}
