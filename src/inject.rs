//! Callout injection: the HTML-mutation pass after positioning.
//!
//! Wraps each inline connection's mention in a marker span the site's
//! stylesheet turns into a callout. Runs strictly after positioning, on
//! the same base HTML the offsets were computed against; insertions are
//! applied back-to-front so earlier offsets stay valid.

use anyhow::{Result, bail, ensure};

use crate::engine::PositionedConnection;

/// Wrap every inline connection's mention in a callout span.
///
/// Fallback connections (no mention) are ignored here; the margin
/// renderer consumes them from the connection JSON instead.
///
/// # Errors
///
/// A recorded offset outside the HTML, or off a UTF-8 boundary, means
/// the offsets were computed against different markup - a pipeline
/// contract violation that aborts the build.
pub fn inject_callouts(html: &str, inline: &[PositionedConnection]) -> Result<String> {
    // (offset, is_close, markup); closes sort after opens in the
    // processing order so adjacent spans come out `</span><span>`.
    let mut insertions: Vec<(usize, bool, String)> = Vec::with_capacity(inline.len() * 2);

    for positioned in inline {
        let Some(anchor) = &positioned.mention else {
            bail!(
                "connection `{}` routed to injection without a mention",
                positioned.connection.target_slug
            );
        };
        let start = anchor.html_offset;
        let end = anchor.html_offset + anchor.html_len;
        ensure!(
            end <= html.len() && html.is_char_boundary(start) && html.is_char_boundary(end),
            "stale mention offsets {start}..{end} for `{}` (html is {} bytes)",
            positioned.connection.target_slug,
            html.len()
        );

        insertions.push((
            start,
            false,
            format!(
                r#"<span class="callout" data-target="{}" data-kind="{}">"#,
                positioned.connection.target_slug,
                kind_attr(positioned)
            ),
        ));
        insertions.push((end, true, "</span>".to_owned()));
    }

    // Back-to-front. At equal offsets an open must be inserted before a
    // close: the later insertion lands further left in the string.
    insertions.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let mut out = html.to_owned();
    for (offset, _, markup) in insertions {
        out.insert_str(offset, &markup);
    }
    Ok(out)
}

fn kind_attr(positioned: &PositionedConnection) -> String {
    // Reuse the serde kebab-case name so the data attribute matches the JSON
    serde_json::to_value(positioned.connection.kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::EntryKind;
    use crate::engine::score::{Connection, ConnectionKind};
    use crate::engine::{position_connections, split_placements};

    fn conn(target: &str, mention: &str) -> Connection {
        Connection {
            source_slug: "essay".into(),
            target_slug: target.into(),
            target_type: EntryKind::Shelf,
            kind: ConnectionKind::SourceMatch,
            weight: 500,
            target_date: None,
            mention_texts: vec![mention.to_owned()],
        }
    }

    #[test]
    fn test_inject_single_callout() {
        let html = "<p>See the Curb Cut Effect study.</p>";
        let positioned = position_connections(vec![conn("curb", "Curb Cut Effect")], html).unwrap();
        let placements = split_placements(positioned);

        let out = inject_callouts(html, &placements.inline).unwrap();
        assert_eq!(
            out,
            "<p>See the <span class=\"callout\" data-target=\"curb\" data-kind=\"source-match\">Curb Cut Effect</span> study.</p>"
        );
    }

    #[test]
    fn test_inject_multiple_preserves_earlier_offsets() {
        let html = "<p>curb cuts and ramp theory</p>";
        let positioned = position_connections(
            vec![conn("a", "curb cuts"), conn("b", "ramp theory")],
            html,
        )
        .unwrap();
        let placements = split_placements(positioned);

        let out = inject_callouts(html, &placements.inline).unwrap();
        assert!(out.contains(r#"data-target="a" data-kind="source-match">curb cuts</span>"#));
        assert!(out.contains(r#"data-target="b" data-kind="source-match">ramp theory</span>"#));
    }

    #[test]
    fn test_inject_nothing() {
        let html = "<p>plain</p>";
        let out = inject_callouts(html, &[]).unwrap();
        assert_eq!(out, html);
    }

    #[test]
    fn test_inject_rejects_stale_offsets() {
        let html = "<p>short</p>";
        // Positioned against longer markup, injected into shorter
        let long_html = "<p>padding padding padding curb cuts</p>";
        let positioned = position_connections(vec![conn("a", "curb cuts")], long_html).unwrap();
        let placements = split_placements(positioned);

        assert!(inject_callouts(html, &placements.inline).is_err());
    }

    #[test]
    fn test_inject_rejects_mentionless_connection() {
        let html = "<p>text</p>";
        let positioned = position_connections(vec![conn("a", "absent words")], html).unwrap();
        // Route the fallback connection to injection by mistake
        assert!(inject_callouts(html, &positioned).is_err());
    }
}
