//! `[engine]` section configuration.
//!
//! Concrete scoring constants. Only the relative ordering of the weights
//! is load-bearing (explicit > source-match > tag-overlap); the absolute
//! values exist to be tuned per site.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[engine]` section in marginalia.toml - connection scoring knobs.
///
/// # Example
/// ```toml
/// [engine]
/// max_connections = 6
/// min_primary_connections = 3
/// explicit_weight = 1000
/// source_weight = 500
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum connections kept per essay, bounding callout density on
    /// long essays.
    #[serde(default = "defaults::engine::max_connections")]
    #[educe(Default = defaults::engine::max_connections())]
    pub max_connections: usize,

    /// When fewer explicit/source connections than this exist, the
    /// scorer infers additional tag-overlap connections.
    #[serde(default = "defaults::engine::min_primary_connections")]
    #[educe(Default = defaults::engine::min_primary_connections())]
    pub min_primary_connections: usize,

    /// Base weight for `related` links and declared backlinks. Declared
    /// `related` order is encoded as `explicit_weight - position`.
    #[serde(default = "defaults::engine::explicit_weight")]
    #[educe(Default = defaults::engine::explicit_weight())]
    pub explicit_weight: u32,

    /// Base weight for URL-matched sources, decremented by the source's
    /// position in the essay's citation list.
    #[serde(default = "defaults::engine::source_weight")]
    #[educe(Default = defaults::engine::source_weight())]
    pub source_weight: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.max_connections, 6);
        assert_eq!(cfg.min_primary_connections, 3);
        assert_eq!(cfg.explicit_weight, 1000);
        assert_eq!(cfg.source_weight, 500);
    }

    #[test]
    fn test_engine_config_partial_toml() {
        let cfg: EngineConfig = toml::from_str("max_connections = 10").unwrap();
        assert_eq!(cfg.max_connections, 10);
        assert_eq!(cfg.min_primary_connections, 3);
    }

    #[test]
    fn test_engine_config_unknown_field_rejected() {
        let res: Result<EngineConfig, _> = toml::from_str("max_callouts = 10");
        assert!(res.is_err());
    }
}
