//! Marginalia - the connection engine behind an editorial site.
//!
//! Cross-references an essay against a corpus of essays, field notes,
//! and shelf entries, ranks the relationships, and positions each one
//! inside the essay's rendered HTML so the site can place inline
//! callouts (when the target is mentioned in the text) or margin dots
//! (when it is not).
//!
//! The engine is pure: one corpus snapshot plus one essay's rendered
//! HTML in, positioned connections out. Everything else in the crate is
//! the static-generation host around it.

pub mod build;
pub mod check;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod inject;
pub mod logger;
pub mod render;
