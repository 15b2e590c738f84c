//! Splits tool-call descriptions around `child_context_id=<digits>` so the UI
//! can turn the reference into a navigation control.
//!
//! Only the first reference in a description becomes a link. Later ones stay
//! in the trailing text.

const PATTERN: &str = "child_context_id=";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionSegment<'a> {
    Text(&'a str),
    /// A child context id (digits only).
    ContextLink(&'a str),
}

/// Split `description` into text / link / text. Empty text segments are
/// omitted. Without a match the whole description is one `Text` segment.
pub fn parse_context_links(description: &str) -> Vec<DescriptionSegment<'_>> {
    let Some((start, id)) = find_first_link(description) else {
        return vec![DescriptionSegment::Text(description)];
    };

    let before = &description[..start];
    let after = &description[start + PATTERN.len() + id.len()..];

    let mut segments = Vec::with_capacity(3);
    if !before.is_empty() {
        segments.push(DescriptionSegment::Text(before));
    }
    segments.push(DescriptionSegment::ContextLink(id));
    if !after.is_empty() {
        segments.push(DescriptionSegment::Text(after));
    }
    segments
}

/// Byte offset of the first `child_context_id=` followed by at least one digit,
/// and the digits themselves.
fn find_first_link(text: &str) -> Option<(usize, &str)> {
    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find(PATTERN) {
        let start = search_from + rel;
        let digits_start = start + PATTERN.len();
        let digits_len = text[digits_start..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits_len > 0 {
            return Some((start, &text[digits_start..digits_start + digits_len]));
        }
        search_from = digits_start;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::DescriptionSegment::{ContextLink, Text};
    use super::*;

    #[test]
    fn splits_around_single_reference() {
        assert_eq!(
            parse_context_links("spawned child_context_id=42 for review"),
            vec![Text("spawned "), ContextLink("42"), Text(" for review")]
        );
    }

    #[test]
    fn no_reference_is_plain_text() {
        assert_eq!(
            parse_context_links("ran the test suite"),
            vec![Text("ran the test suite")]
        );
    }

    #[test]
    fn reference_at_edges_has_no_empty_segments() {
        assert_eq!(parse_context_links("child_context_id=7"), vec![ContextLink("7")]);
        assert_eq!(
            parse_context_links("see child_context_id=7"),
            vec![Text("see "), ContextLink("7")]
        );
    }

    #[test]
    fn only_first_reference_becomes_a_link() {
        assert_eq!(
            parse_context_links("child_context_id=1 and child_context_id=2"),
            vec![ContextLink("1"), Text(" and child_context_id=2")]
        );
    }

    #[test]
    fn pattern_without_digits_is_skipped() {
        assert_eq!(
            parse_context_links("child_context_id=abc then child_context_id=9!"),
            vec![Text("child_context_id=abc then "), ContextLink("9"), Text("!")]
        );
    }
}
