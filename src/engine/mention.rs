//! Plain-text projection of rendered HTML and mention search.
//!
//! The positioner never searches raw HTML: markup would split mentions
//! (`Curb <em>Cut</em> Effect`) and attribute text would produce false
//! hits. Instead [`TextProjection`] strips tags with a quick-xml event
//! walk, keeping a segment table that maps every projection byte back to
//! a byte offset in the original HTML so a located mention can still be
//! anchored for injection.
//!
//! Search is case-insensitive and whitespace-normalized: any run of
//! whitespace in needle or haystack compares equal to a single space, so
//! a title wrapped across a line break in the rendered body still
//! matches.

use anyhow::{Result, bail};
use quick_xml::Reader;
use quick_xml::events::Event;

/// A located mention, in projection-text byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMatch {
    pub start: usize,
    pub end: usize,
}

impl TextMatch {
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Mapping piece between projection text and source HTML.
///
/// Literal segments are byte-identical in both coordinate spaces; entity
/// segments cover one decoded character whose HTML form (`&amp;`) has a
/// different length.
#[derive(Debug, Clone, Copy)]
struct Segment {
    text_start: usize,
    text_len: usize,
    html_start: usize,
    html_len: usize,
    literal: bool,
}

/// Tag-stripped projection of a rendered HTML body.
///
/// Computed from the base markdown rendering only, before any annotation
/// injection, so injected markup can never shift mention decisions.
#[derive(Debug, Default)]
pub struct TextProjection {
    /// Plain text content, entities decoded, `<script>`/`<style>` excluded.
    text: String,
    segments: Vec<Segment>,
    /// Lowercased, whitespace-collapsed copy of `text` for searching.
    normalized: String,
    /// For each byte of `normalized`, the source byte offset in `text`.
    normalized_map: Vec<usize>,
}

impl TextProjection {
    /// Build the projection of an HTML fragment.
    ///
    /// # Errors
    ///
    /// Fails only on HTML the renderer could not have produced (unclosed
    /// tag soup); this is a contract violation with the renderer.
    pub fn of_html(html: &str) -> Result<Self> {
        let mut reader = Reader::from_reader(html.as_bytes());
        reader.config_mut().trim_text(false);
        reader.config_mut().enable_all_checks(false);

        let mut projection = Self::default();
        // Nesting depth of elements whose text is not content
        let mut skip_depth = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Start(elem)) => {
                    if skip_depth > 0 || is_skipped_element(elem.name().as_ref()) {
                        skip_depth += 1;
                    }
                }
                Ok(Event::End(_)) => {
                    skip_depth = skip_depth.saturating_sub(1);
                }
                Ok(Event::Text(text)) if skip_depth == 0 => {
                    let raw: &[u8] = text.as_ref();
                    #[allow(clippy::cast_possible_truncation)]
                    let html_start = reader.buffer_position() as usize - raw.len();
                    // Un-split text events are literal: quick-xml yields
                    // entity references separately as GeneralRef.
                    let content = std::str::from_utf8(raw)?;
                    projection.push_literal(content, html_start);
                }
                Ok(Event::GeneralRef(reference)) if skip_depth == 0 => {
                    let name = reference.decode()?;
                    let raw_len = name.len() + 2; // & and ;
                    #[allow(clippy::cast_possible_truncation)]
                    let html_start = reader.buffer_position() as usize - raw_len;
                    let decoded = match reference.resolve_char_ref()? {
                        Some(c) => Some(c),
                        None => named_entity(&name),
                    };
                    if let Some(decoded) = decoded {
                        projection.push_entity(decoded, html_start, raw_len);
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => bail!(
                    "HTML parse error at position {}: {e:?}",
                    reader.error_position()
                ),
            }
        }

        projection.build_normalized();
        Ok(projection)
    }

    /// The tag-stripped text content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Locate the first occurrence of `needle`, case-insensitively and
    /// whitespace-normalized. Returns offsets into [`Self::text`].
    pub fn find_mention(&self, needle: &str) -> Option<TextMatch> {
        let needle = normalize_needle(needle);
        if needle.is_empty() {
            return None;
        }
        let at = self.normalized.find(&needle)?;
        let start = self.normalized_map[at];
        let norm_end = at + needle.len();
        let end = if norm_end >= self.normalized.len() {
            self.text.len()
        } else {
            self.normalized_map[norm_end]
        };
        // Guard against zero-width spans from multi-byte case folds
        let end = end.max(next_char_boundary(&self.text, start));
        Some(TextMatch { start, end })
    }

    /// Map a projection-text span back to HTML byte offsets.
    pub fn to_html_span(&self, m: TextMatch) -> Option<(usize, usize)> {
        let start_seg = self.segment_containing(m.start)?;
        let end_seg = self.segment_containing(m.end.checked_sub(1)?)?;

        let html_start = if start_seg.literal {
            start_seg.html_start + (m.start - start_seg.text_start)
        } else {
            start_seg.html_start
        };
        let html_end = if end_seg.literal {
            end_seg.html_start + (m.end - end_seg.text_start)
        } else {
            end_seg.html_start + end_seg.html_len
        };
        Some((html_start, html_end))
    }

    fn segment_containing(&self, text_offset: usize) -> Option<Segment> {
        let idx = self
            .segments
            .partition_point(|s| s.text_start + s.text_len <= text_offset);
        let seg = self.segments.get(idx)?;
        (seg.text_start <= text_offset).then_some(*seg)
    }

    fn push_literal(&mut self, content: &str, html_start: usize) {
        if content.is_empty() {
            return;
        }
        self.segments.push(Segment {
            text_start: self.text.len(),
            text_len: content.len(),
            html_start,
            html_len: content.len(),
            literal: true,
        });
        self.text.push_str(content);
    }

    fn push_entity(&mut self, decoded: char, html_start: usize, html_len: usize) {
        self.segments.push(Segment {
            text_start: self.text.len(),
            text_len: decoded.len_utf8(),
            html_start,
            html_len,
            literal: false,
        });
        self.text.push(decoded);
    }

    /// Build the lowercased, whitespace-collapsed search copy with its
    /// byte-offset map back into `text`.
    fn build_normalized(&mut self) {
        let mut pending_ws: Option<usize> = None;
        for (offset, c) in self.text.char_indices() {
            if c.is_whitespace() {
                pending_ws.get_or_insert(offset);
                continue;
            }
            if let Some(ws_start) = pending_ws.take() {
                if !self.normalized.is_empty() {
                    self.normalized.push(' ');
                    self.normalized_map.push(ws_start);
                }
            }
            for lower in c.to_lowercase() {
                let before = self.normalized.len();
                self.normalized.push(lower);
                for _ in before..self.normalized.len() {
                    self.normalized_map.push(offset);
                }
            }
        }
    }
}

/// Elements whose text content is never body prose.
fn is_skipped_element(name: &[u8]) -> bool {
    matches!(name, b"script" | b"style")
}

/// Named HTML entities the renderer emits; numeric references are
/// resolved by quick-xml before this is consulted.
fn named_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

/// Collapse whitespace runs to single spaces, trim, and lowercase.
fn normalize_needle(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for word in needle.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}

/// First char boundary strictly after `offset`.
fn next_char_boundary(s: &str, offset: usize) -> usize {
    let mut end = offset + 1;
    while end < s.len() && !s.is_char_boundary(end) {
        end += 1;
    }
    end.min(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_strips_tags() {
        let p = TextProjection::of_html("<p>See the <em>Curb Cut Effect</em> study.</p>").unwrap();
        assert_eq!(p.text(), "See the Curb Cut Effect study.");
    }

    #[test]
    fn test_projection_skips_script_and_style() {
        let html = "<p>visible</p><script>var x = 'hidden';</script><style>.a{}</style><p>also</p>";
        let p = TextProjection::of_html(html).unwrap();
        assert!(!p.text().contains("hidden"));
        assert!(p.text().contains("visible"));
        assert!(p.text().contains("also"));
    }

    #[test]
    fn test_projection_decodes_entities() {
        let p = TextProjection::of_html("<p>Jane &amp; Finch &#8212; a study</p>").unwrap();
        assert_eq!(p.text(), "Jane & Finch \u{2014} a study");
    }

    #[test]
    fn test_find_mention_exact() {
        let p = TextProjection::of_html("<p>See the Curb Cut Effect study.</p>").unwrap();
        let m = p.find_mention("Curb Cut Effect").unwrap();
        assert_eq!(&p.text()[m.start..m.end], "Curb Cut Effect");
        assert_eq!(m.start, "See the ".len());
    }

    #[test]
    fn test_find_mention_case_insensitive() {
        let p = TextProjection::of_html("<p>the CURB cut effect</p>").unwrap();
        let m = p.find_mention("Curb Cut Effect").unwrap();
        assert_eq!(&p.text()[m.start..m.end], "CURB cut effect");
    }

    #[test]
    fn test_find_mention_across_inline_markup() {
        let p = TextProjection::of_html("<p>the <em>Curb</em> <strong>Cut</strong> Effect</p>")
            .unwrap();
        let m = p.find_mention("Curb Cut Effect").unwrap();
        assert_eq!(&p.text()[m.start..m.end], "Curb Cut Effect");
    }

    #[test]
    fn test_find_mention_whitespace_normalized() {
        let p = TextProjection::of_html("<p>the Curb\n   Cut\tEffect here</p>").unwrap();
        let m = p.find_mention("Curb Cut Effect").unwrap();
        assert_eq!(&p.text()[m.start..m.end], "Curb\n   Cut\tEffect");
    }

    #[test]
    fn test_find_mention_absent() {
        let p = TextProjection::of_html("<p>nothing relevant here</p>").unwrap();
        assert!(p.find_mention("ADA Standards").is_none());
    }

    #[test]
    fn test_find_mention_empty_needle() {
        let p = TextProjection::of_html("<p>text</p>").unwrap();
        assert!(p.find_mention("").is_none());
        assert!(p.find_mention("   ").is_none());
    }

    #[test]
    fn test_find_mention_first_occurrence_wins() {
        let p = TextProjection::of_html("<p>alpha beta alpha</p>").unwrap();
        let m = p.find_mention("alpha").unwrap();
        assert_eq!(m.start, 0);
    }

    #[test]
    fn test_to_html_span_plain() {
        let html = "<p>See the Curb Cut Effect study.</p>";
        let p = TextProjection::of_html(html).unwrap();
        let m = p.find_mention("Curb Cut Effect").unwrap();
        let (start, end) = p.to_html_span(m).unwrap();
        assert_eq!(&html[start..end], "Curb Cut Effect");
    }

    #[test]
    fn test_to_html_span_behind_markup() {
        let html = "<p>the <em>Curb</em> Cut Effect</p>";
        let p = TextProjection::of_html(html).unwrap();
        let m = p.find_mention("Curb").unwrap();
        let (start, end) = p.to_html_span(m).unwrap();
        assert_eq!(&html[start..end], "Curb");
    }

    #[test]
    fn test_to_html_span_with_entity() {
        let html = "<p>Jane &amp; Finch corridor</p>";
        let p = TextProjection::of_html(html).unwrap();
        let m = p.find_mention("Jane & Finch").unwrap();
        let (start, end) = p.to_html_span(m).unwrap();
        assert_eq!(&html[start..end], "Jane &amp; Finch");
    }

    #[test]
    fn test_match_overlap() {
        let a = TextMatch { start: 0, end: 5 };
        let b = TextMatch { start: 4, end: 9 };
        let c = TextMatch { start: 5, end: 9 };
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_empty_html() {
        let p = TextProjection::of_html("").unwrap();
        assert_eq!(p.text(), "");
        assert!(p.find_mention("anything").is_none());
    }
}
