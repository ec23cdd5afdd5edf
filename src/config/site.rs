//! `[site]` section configuration.
//!
//! Content and output directory locations.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[site]` section in marginalia.toml - directory layout.
///
/// # Example
/// ```toml
/// [site]
/// content = "content"
/// output = "public"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteSection {
    /// Content directory holding `essays/`, `notes/`, and `shelf/`.
    #[serde(default = "defaults::site::content")]
    #[educe(Default = defaults::site::content())]
    pub content: PathBuf,

    /// Output directory for generated HTML and connection JSON.
    #[serde(default = "defaults::site::output")]
    #[educe(Default = defaults::site::output())]
    pub output: PathBuf,
}
