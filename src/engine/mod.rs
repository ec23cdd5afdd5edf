//! The connection engine: scoring, mention location, and positioning.
//!
//! Pure-functional over an immutable corpus snapshot and one essay's
//! rendered HTML. Invoked once per essay during static generation; no
//! global caches, no generation-order dependence, so the host may
//! parallelize per-essay runs freely.

pub mod mention;
pub mod position;
pub mod score;

pub use mention::{TextMatch, TextProjection};
pub use position::{
    MentionAnchor, Placements, PositionedConnection, position_connections, split_placements,
};
pub use score::{Connection, ConnectionKind, compare_connections, compute_connections};
