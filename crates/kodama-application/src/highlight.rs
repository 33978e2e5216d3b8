// SPDX-License-Identifier: GPL-3.0-or-later
use regex::RegexBuilder;

/// A run of text, flagged when it matched one of the query terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            matched: false,
        }
    }

    fn hit(text: &str) -> Self {
        Self {
            text: text.to_string(),
            matched: true,
        }
    }
}

/// Split `text` into matched and unmatched segments for the whitespace-separated
/// terms of `query`, case-insensitively. Joining the segments gives back `text`.
pub fn highlight_segments(text: &str, query: &str) -> Vec<Segment> {
    let terms: Vec<String> = query.split_whitespace().map(regex::escape).collect();
    if terms.is_empty() {
        return vec![Segment::plain(text)];
    }

    let pattern = format!("({})", terms.join("|"));
    let Ok(regex) = RegexBuilder::new(&pattern).case_insensitive(true).build() else {
        return vec![Segment::plain(text)];
    };

    let mut segments = Vec::new();
    let mut cursor = 0;
    for found in regex.find_iter(text) {
        if found.start() > cursor {
            segments.push(Segment::plain(&text[cursor..found.start()]));
        }
        segments.push(Segment::hit(found.as_str()));
        cursor = found.end();
    }
    if cursor < text.len() || segments.is_empty() {
        segments.push(Segment::plain(&text[cursor..]));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(segments: &[Segment]) -> String {
        segments
            .iter()
            .map(|s| {
                if s.matched {
                    format!("[{}]", s.text)
                } else {
                    s.text.clone()
                }
            })
            .collect()
    }

    #[test]
    fn empty_query_returns_whole_text() {
        assert_eq!(highlight_segments("Spirited Away", "  "), vec![Segment::plain("Spirited Away")]);
    }

    #[test]
    fn marks_each_term_case_insensitively() {
        let segments = highlight_segments("Castle in the Sky", "castle SKY");
        assert_eq!(render(&segments), "[Castle] in the [Sky]");
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let segments = highlight_segments("Who? (1999) a+b", "(1999) a+b");
        assert_eq!(render(&segments), "Who? [(1999)] [a+b]");
    }

    #[test]
    fn segments_rebuild_original_text() {
        let text = "Howl's Moving Castle";
        let segments = highlight_segments(text, "o");
        let joined: String = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, text);
        assert_eq!(segments.iter().filter(|s| s.matched).count(), 2);
    }

    #[test]
    fn no_match_is_single_plain_segment() {
        assert_eq!(highlight_segments("Ponyo", "totoro"), vec![Segment::plain("Ponyo")]);
        assert_eq!(highlight_segments("", "totoro"), vec![Segment::plain("")]);
    }
}
