//! Mention positioning and the inline/fallback partition.
//!
//! Each scored connection moves through exactly one transition:
//! Scored → Positioned. Positioning walks the ranked list in order, so
//! a higher-ranked connection always gets first claim on a text span;
//! a later connection whose mention overlaps an already-claimed span
//! degrades to fallback placement instead of stacking a second marker.

use anyhow::Result;
use serde::Serialize;

use super::mention::{TextMatch, TextProjection};
use super::score::Connection;

/// Anchor of a located mention, in both coordinate spaces.
#[derive(Debug, Clone, Serialize)]
pub struct MentionAnchor {
    /// Byte offset in the tag-stripped text projection.
    pub text_offset: usize,
    pub text_len: usize,
    /// Byte offset in the rendered HTML, where the injector inserts the
    /// callout wrapper.
    pub html_offset: usize,
    pub html_len: usize,
    /// The body text that matched (verbatim, original casing).
    pub matched: String,
}

/// A connection after positioning (terminal state).
#[derive(Debug, Clone, Serialize)]
pub struct PositionedConnection {
    #[serde(flatten)]
    pub connection: Connection,
    /// Present when a mention was located; absent means margin fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mention: Option<MentionAnchor>,
}

impl PositionedConnection {
    pub const fn mention_found(&self) -> bool {
        self.mention.is_some()
    }
}

/// The partition both downstream consumers depend on: inline callouts
/// for the HTML-mutation pass, fallback for the margin renderer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Placements {
    pub inline: Vec<PositionedConnection>,
    pub fallback: Vec<PositionedConnection>,
}

/// Position every connection against the essay's rendered HTML.
///
/// Connections must arrive in scored order; rank decides span ownership.
/// Positioning failures are not errors: a connection whose mention text
/// never appears, or whose span is already claimed, is simply marked for
/// fallback placement.
///
/// # Errors
///
/// Only when the HTML itself cannot be projected, which indicates a
/// renderer contract violation.
pub fn position_connections(
    connections: Vec<Connection>,
    html: &str,
) -> Result<Vec<PositionedConnection>> {
    let projection = TextProjection::of_html(html)?;
    let mut claimed: Vec<TextMatch> = Vec::new();
    let mut positioned = Vec::with_capacity(connections.len());

    for connection in connections {
        let mention = locate(&connection, &projection, &claimed);
        if let Some(anchor) = &mention {
            claimed.push(TextMatch {
                start: anchor.text_offset,
                end: anchor.text_offset + anchor.text_len,
            });
        }
        positioned.push(PositionedConnection {
            connection,
            mention,
        });
    }

    Ok(positioned)
}

/// Try a connection's mention candidates (title first, then aliases)
/// against the projection. First occurrence only: an overlap with an
/// already-claimed span means this candidate loses, not that we probe
/// later occurrences.
fn locate(
    connection: &Connection,
    projection: &TextProjection,
    claimed: &[TextMatch],
) -> Option<MentionAnchor> {
    for candidate in &connection.mention_texts {
        let Some(m) = projection.find_mention(candidate) else {
            continue;
        };
        if claimed.iter().any(|c| c.overlaps(&m)) {
            continue;
        }
        let (html_offset, html_end) = projection.to_html_span(m)?;
        return Some(MentionAnchor {
            text_offset: m.start,
            text_len: m.end - m.start,
            html_offset,
            html_len: html_end - html_offset,
            matched: projection.text()[m.start..m.end].to_owned(),
        });
    }
    None
}

/// Partition positioned connections for the two downstream consumers.
///
/// Pure filter: inline ∪ fallback covers the input, the intersection is
/// empty, and relative order is preserved on both sides.
pub fn split_placements(positioned: Vec<PositionedConnection>) -> Placements {
    let (inline, fallback) = positioned
        .into_iter()
        .partition(PositionedConnection::mention_found);
    Placements { inline, fallback }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::EntryKind;
    use crate::engine::score::ConnectionKind;

    fn conn(target: &str, mention_texts: &[&str]) -> Connection {
        Connection {
            source_slug: "essay".into(),
            target_slug: target.into(),
            target_type: EntryKind::Shelf,
            kind: ConnectionKind::ExplicitRelated,
            weight: 1000,
            target_date: None,
            mention_texts: mention_texts.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    #[test]
    fn test_position_found_and_not_found() {
        let html = "<p>See the Curb Cut Effect study.</p>";
        let conns = vec![
            conn("curb", &["Curb Cut Effect"]),
            conn("ada", &["ADA Standards"]),
        ];

        let positioned = position_connections(conns, html).unwrap();
        assert_eq!(positioned.len(), 2);
        assert!(positioned[0].mention_found());
        assert!(!positioned[1].mention_found());

        let anchor = positioned[0].mention.as_ref().unwrap();
        assert_eq!(anchor.matched, "Curb Cut Effect");
        assert_eq!(
            &html[anchor.html_offset..anchor.html_offset + anchor.html_len],
            "Curb Cut Effect"
        );
    }

    #[test]
    fn test_overlapping_span_degrades_to_fallback() {
        let html = "<p>the Curb Cut Effect in cities</p>";
        // Ranked first claims the span; the overlapping second degrades
        let conns = vec![
            conn("long", &["Curb Cut Effect"]),
            conn("short", &["Curb Cut"]),
        ];

        let positioned = position_connections(conns, html).unwrap();
        assert!(positioned[0].mention_found());
        assert!(!positioned[1].mention_found());
    }

    #[test]
    fn test_disjoint_mentions_both_found() {
        let html = "<p>Curb cuts helped; ramp theory explains why.</p>";
        let conns = vec![conn("a", &["curb cuts"]), conn("b", &["ramp theory"])];

        let positioned = position_connections(conns, html).unwrap();
        assert!(positioned.iter().all(PositionedConnection::mention_found));

        // Span non-overlap holds
        let spans: Vec<_> = positioned
            .iter()
            .filter_map(|p| p.mention.as_ref())
            .map(|a| TextMatch {
                start: a.text_offset,
                end: a.text_offset + a.text_len,
            })
            .collect();
        assert!(!spans[0].overlaps(&spans[1]));
    }

    #[test]
    fn test_alias_used_when_title_absent() {
        let html = "<p>the corridor study of Jane and Finch</p>";
        let conns = vec![conn("s", &["Official Long Title", "corridor study"])];

        let positioned = position_connections(conns, html).unwrap();
        let anchor = positioned[0].mention.as_ref().unwrap();
        assert_eq!(anchor.matched, "corridor study");
    }

    #[test]
    fn test_partition_complete_and_disjoint() {
        let html = "<p>only alpha appears</p>";
        let conns = vec![
            conn("a", &["alpha"]),
            conn("b", &["beta"]),
            conn("c", &["gamma"]),
        ];

        let positioned = position_connections(conns, html).unwrap();
        let placements = split_placements(positioned);

        assert_eq!(placements.inline.len(), 1);
        assert_eq!(placements.fallback.len(), 2);
        assert_eq!(placements.inline[0].connection.target_slug, "a");

        let fallback_slugs: Vec<_> = placements
            .fallback
            .iter()
            .map(|p| p.connection.target_slug.as_str())
            .collect();
        // Relative order preserved
        assert_eq!(fallback_slugs, vec!["b", "c"]);
        assert!(placements.fallback.iter().all(|p| !p.mention_found()));
    }

    #[test]
    fn test_empty_connection_list() {
        let positioned = position_connections(vec![], "<p>text</p>").unwrap();
        assert!(positioned.is_empty());
        let placements = split_placements(positioned);
        assert!(placements.inline.is_empty());
        assert!(placements.fallback.is_empty());
    }

    #[test]
    fn test_positioned_serializes_flat() {
        let html = "<p>alpha</p>";
        let positioned = position_connections(vec![conn("a", &["alpha"])], html).unwrap();
        let json = serde_json::to_value(&positioned[0]).unwrap();
        // Connection fields flattened alongside the mention anchor
        assert_eq!(json["target_slug"], "a");
        assert_eq!(json["mention"]["matched"], "alpha");
    }
}
