//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// [site] Section Defaults
// ============================================================================

pub mod site {
    use std::path::PathBuf;

    pub fn content() -> PathBuf {
        "content".into()
    }

    pub fn output() -> PathBuf {
        "public".into()
    }
}

// ============================================================================
// [engine] Section Defaults
// ============================================================================

pub mod engine {
    /// Truncation cap for an essay's connection list.
    pub fn max_connections() -> usize {
        6
    }

    /// Below this many explicit/source connections, the scorer falls
    /// back to tag-overlap inference.
    pub fn min_primary_connections() -> usize {
        3
    }

    /// Base weight for explicit links and backlinks.
    pub fn explicit_weight() -> u32 {
        1000
    }

    /// Base weight for URL-matched sources.
    pub fn source_weight() -> u32 {
        500
    }
}
