//! LRC format parser and timed lookup
//!
//! Parses synchronized lyrics in LRC format:
//! [mm:ss.xx] Lyrics line here
//!
//! The parsed document doubles as the lookup index: lines are kept sorted by
//! timestamp so the active line at any position is one binary search away.

use serde::Serialize;

/// A single line of lyrics with its start time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LyricLine {
    /// Seconds from the start of the track.
    pub timestamp: f64,
    /// The lyrics text.
    pub text: String,
}

/// Parsed lyrics, sorted ascending by timestamp.
///
/// May be empty when the raw text contained no timed lines (or no lyrics were
/// found at all); every lookup then yields no active line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricDocument {
    lines: Vec<LyricLine>,
}

impl LyricDocument {
    /// Parse LRC formatted text.
    ///
    /// Only lines of the shape `[m:ss.ff]text` are kept (minutes: one or more
    /// digits; seconds: digits, dot, digits). Everything else (metadata tags
    /// like `[ti:Title]`, blank lines, malformed timestamps) is silently
    /// skipped; that is expected input, not an error.
    pub fn parse(raw: &str) -> Self {
        let mut lines = Vec::new();

        for line in raw.lines() {
            let Some(rest) = line.strip_prefix('[') else {
                continue;
            };
            let Some((tag, text)) = rest.split_once(']') else {
                continue;
            };
            let Some(timestamp) = parse_timestamp(tag) else {
                continue;
            };
            lines.push(LyricLine {
                timestamp,
                text: text.trim().to_string(),
            });
        }

        // Stable sort: lines sharing a timestamp keep their original order.
        lines.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        Self { lines }
    }

    /// The line active at `position`: the rightmost entry whose timestamp is
    /// `<= position`. `None` when the position precedes every entry or the
    /// document is empty.
    ///
    /// O(log n); called tens of times per second by the poll loop.
    pub fn active_line(&self, position: f64) -> Option<&str> {
        let idx = self.lines.partition_point(|l| l.timestamp <= position);
        idx.checked_sub(1).map(|i| self.lines[i].text.as_str())
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Parse a timestamp tag like "00:12.34" to seconds.
///
/// The fractional part is required; `[00:12]` and metadata tags fail here and
/// get skipped by the caller.
fn parse_timestamp(tag: &str) -> Option<f64> {
    let (minutes, seconds) = tag.split_once(':')?;
    if minutes.is_empty() || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (whole, frac) = seconds.split_once('.')?;
    if whole.is_empty() || frac.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let minutes: f64 = minutes.parse().ok()?;
    let seconds: f64 = seconds.parse().ok()?;
    Some(minutes * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("00:12.34"), Some(12.34));
        assert_eq!(parse_timestamp("01:30.00"), Some(90.0));
        assert_eq!(parse_timestamp("123:05.5"), Some(7385.5));
        // Fractional seconds are mandatory.
        assert_eq!(parse_timestamp("00:12"), None);
        assert_eq!(parse_timestamp("ti:Title"), None);
        assert_eq!(parse_timestamp("00:12."), None);
        assert_eq!(parse_timestamp(":12.34"), None);
    }

    #[test]
    fn test_parse_skips_non_timed_lines() {
        let lrc = r#"
[ti:Test Song]
[ar:Test Artist]
[00:12.34]First line
not a lyric line
[00:15.00]  Second line
[oops]broken
"#;
        let doc = LyricDocument::parse(lrc);
        assert_eq!(doc.lines().len(), 2);
        assert_eq!(doc.lines()[0].timestamp, 12.34);
        assert_eq!(doc.lines()[0].text, "First line");
        assert_eq!(doc.lines()[1].text, "Second line");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let lrc = "[00:05.00]A\n[00:01.00]B\n[00:03.50]C\n";
        let first = LyricDocument::parse(lrc);
        let second = LyricDocument::parse(lrc);
        assert_eq!(first, second);
        // Sorted ascending regardless of input order.
        assert_eq!(first.lines()[0].text, "B");
        assert_eq!(first.lines()[2].text, "A");
    }

    #[test]
    fn test_parse_stable_on_equal_timestamps() {
        let lrc = "[00:10.00]first\n[00:10.00]second\n[00:10.00]third\n";
        let doc = LyricDocument::parse(lrc);
        let texts: Vec<_> = doc.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[test]
    fn test_active_line_boundaries() {
        let doc = LyricDocument::parse("[00:00.00]A\n[00:10.50]B\n[00:20.00]C\n");
        assert_eq!(doc.active_line(5.0), Some("A"));
        assert_eq!(doc.active_line(10.5), Some("B"));
        assert_eq!(doc.active_line(25.0), Some("C"));
        assert_eq!(doc.active_line(-1.0), None);
    }

    #[test]
    fn test_active_line_empty_document() {
        let doc = LyricDocument::default();
        assert_eq!(doc.active_line(0.0), None);
        assert_eq!(doc.active_line(1000.0), None);
    }

    #[test]
    fn test_active_line_matches_linear_scan() {
        let mut rng = rand::rng();

        for _ in 0..50 {
            let n = rng.random_range(0..40);
            let mut lines: Vec<LyricLine> = (0..n)
                .map(|i| LyricLine {
                    timestamp: rng.random_range(0.0..300.0),
                    text: format!("line {i}"),
                })
                .collect();
            lines.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
            let doc = LyricDocument { lines };

            for _ in 0..100 {
                let pos = rng.random_range(-10.0..310.0);
                let expected = doc
                    .lines()
                    .iter()
                    .filter(|l| l.timestamp <= pos)
                    .next_back()
                    .map(|l| l.text.as_str());
                assert_eq!(doc.active_line(pos), expected, "position {pos}");
            }
        }
    }
}
