//! Splitting a concatenated diff into per-file sections.
//!
//! Each section is handed to the unified-diff parser on its own so that one
//! broken file cannot take the others down with it.

use regex::Regex;
use std::sync::OnceLock;

/// Counts taken from a `@@ -a,b +c,d @@ context` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HunkRange {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
}

/// Parse a hunk header. Omitted counts default to 1.
pub(crate) fn parse_hunk_header(line: &str) -> Option<HunkRange> {
    static HUNK_HEADER_REGEX: OnceLock<Regex> = OnceLock::new();

    let re = HUNK_HEADER_REGEX
        .get_or_init(|| Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").unwrap());

    let captures = re.captures(line)?;
    let number = |idx: usize, default: u32| -> Option<u32> {
        match captures.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(default),
        }
    };

    Some(HunkRange {
        old_start: number(1, 0)?,
        old_count: number(2, 1)?,
        new_start: number(3, 0)?,
        new_count: number(4, 1)?,
    })
}

/// One file's worth of raw diff lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Section<'a> {
    /// Position of the section in the input.
    pub index: usize,
    pub lines: Vec<&'a str>,
    /// Header of a hunk that was cut short by the next file's headers.
    pub truncated_hunk: Option<&'a str>,
}

impl<'a> Section<'a> {
    fn new(index: usize) -> Self {
        Self {
            index,
            lines: Vec::new(),
            truncated_hunk: None,
        }
    }
}

impl Section<'_> {
    /// Re-join the lines for the unified-diff parser.
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

/// Lines still owed by the hunk currently being read.
#[derive(Debug, Default, Clone, Copy)]
struct Budget {
    old: u32,
    new: u32,
}

impl Budget {
    fn is_open(&self) -> bool {
        self.old > 0 || self.new > 0
    }

    /// Consume one body line. Returns false if the line is not a body line.
    fn consume(&mut self, line: &str) -> bool {
        match line.as_bytes().first() {
            Some(b' ') | None => {
                self.old = self.old.saturating_sub(1);
                self.new = self.new.saturating_sub(1);
            }
            Some(b'-') => self.old = self.old.saturating_sub(1),
            Some(b'+') => self.new = self.new.saturating_sub(1),
            Some(b'\\') => {}
            Some(_) => return false,
        }
        true
    }
}

/// Split raw diff text into file sections, in order of appearance.
///
/// A section starts at a `diff ` header, or at a `--- `/`+++ ` pair that
/// shows up outside a hunk once the current section already has its file
/// headers. Inside a hunk that still expects lines, a `--- `/`+++ `/`@@`
/// triple also starts a new section and the cut hunk is recorded on the
/// section it belonged to. Anything before the first section (commit
/// messages, mail headers) is dropped.
pub(crate) fn split_sections(input: &str) -> Vec<Section<'_>> {
    let lines: Vec<&str> = input.lines().collect();
    let mut sections: Vec<Section<'_>> = Vec::new();
    let mut current: Option<Section<'_>> = None;
    let mut has_file_header = false;
    let mut budget = Budget::default();
    let mut open_hunk: Option<&str> = None;

    for (i, &line) in lines.iter().enumerate() {
        let starts_git_section = line.starts_with("diff ");
        let starts_file_headers = line.starts_with("--- ")
            && lines.get(i + 1).is_some_and(|next| next.starts_with("+++ "));

        if budget.is_open() {
            let interrupted = starts_git_section
                || (starts_file_headers
                    && lines
                        .get(i + 2)
                        .is_some_and(|next| parse_hunk_header(next).is_some()));

            if interrupted {
                if let (Some(section), Some(header)) = (current.as_mut(), open_hunk) {
                    log::debug!("Hunk {:?} cut short by the next file", header);
                    section.truncated_hunk = Some(header);
                }
                budget = Budget::default();
            } else if budget.consume(line) {
                if let Some(section) = current.as_mut() {
                    section.lines.push(line);
                }
                continue;
            } else {
                log::debug!("Hunk ended early before line {:?}", line);
                budget = Budget::default();
            }
        }

        let starts_plain_section = starts_file_headers && (current.is_none() || has_file_header);

        if starts_git_section || starts_plain_section {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(Section::new(sections.len()));
            has_file_header = false;
        }

        let Some(section) = current.as_mut() else {
            log::trace!("Skipping preamble line {:?}", line);
            continue;
        };

        if line.starts_with("--- ") {
            has_file_header = true;
        } else if line.starts_with("@@") {
            if let Some(range) = parse_hunk_header(line) {
                budget = Budget {
                    old: range.old_count,
                    new: range.new_count,
                };
                open_hunk = Some(line);
            }
        }

        section.lines.push(line);
    }

    if let Some(section) = current {
        sections.push(section);
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_hunk_header() {
        assert_eq!(
            parse_hunk_header("@@ -10,5 +12,7 @@ fn main()"),
            Some(HunkRange {
                old_start: 10,
                old_count: 5,
                new_start: 12,
                new_count: 7,
            })
        );
        assert_eq!(
            parse_hunk_header("@@ -1 +1 @@"),
            Some(HunkRange {
                old_start: 1,
                old_count: 1,
                new_start: 1,
                new_count: 1,
            })
        );
        assert_eq!(parse_hunk_header("@@ bogus @@"), None);
        assert_eq!(parse_hunk_header("@@ -x,1 +1,1 @@"), None);
    }

    #[test]
    fn test_split_git_sections() {
        let input = "diff --git a/a.txt b/a.txt\n--- a/a.txt\n+++ b/a.txt\n@@ -1 +1 @@\n-a\n+b\ndiff --git a/b.txt b/b.txt\n--- a/b.txt\n+++ b/b.txt\n@@ -1 +1 @@\n-c\n+d\n";
        let sections = split_sections(input);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].index, 0);
        assert_eq!(sections[0].lines[0], "diff --git a/a.txt b/a.txt");
        assert_eq!(sections[1].index, 1);
        assert_eq!(sections[1].lines.len(), 6);
    }

    #[test]
    fn test_split_plain_sections() {
        let input = "--- a.txt\n+++ a.txt\n@@ -1 +1 @@\n-a\n+b\n--- b.txt\n+++ b.txt\n@@ -1 +1 @@\n-c\n+d\n";
        let sections = split_sections(input);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].lines[0], "--- b.txt");
    }

    #[test]
    fn test_removed_line_that_looks_like_header_stays_in_hunk() {
        // "--- x" and "+++ y" below are body lines: a removed "-- x" and an added "++ y".
        let input = "--- a.txt\n+++ a.txt\n@@ -1,2 +1,2 @@\n--- x\n+++ y\n same\n";
        let sections = split_sections(input);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].lines.len(), 6);
    }

    #[test]
    fn test_overlong_hunk_stops_at_next_file_headers() {
        let input = "--- a.txt\n+++ a.txt\n@@ -1,5 +1,5 @@\n-a\n+b\n--- b.txt\n+++ b.txt\n@@ -1 +1 @@\n-c\n+d\n";
        let sections = split_sections(input);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].lines, vec!["--- a.txt", "+++ a.txt", "@@ -1,5 +1,5 @@", "-a", "+b"]);
        assert_eq!(sections[0].truncated_hunk, Some("@@ -1,5 +1,5 @@"));
        assert_eq!(sections[1].lines[0], "--- b.txt");
        assert_eq!(sections[1].truncated_hunk, None);
    }

    #[test]
    fn test_overlong_hunk_stops_at_git_header() {
        let input = "diff --git a/a b/a\n--- a/a\n+++ b/a\n@@ -1,3 +1,3 @@\n-x\ndiff --git a/b b/b\n--- a/b\n+++ b/b\n@@ -1 +1 @@\n-y\n+z\n";
        let sections = split_sections(input);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].truncated_hunk, Some("@@ -1,3 +1,3 @@"));
        assert_eq!(sections[1].lines.len(), 6);
    }

    #[test]
    fn test_preamble_is_dropped() {
        let input = "From 1234 Mon Sep 17 00:00:00 2001\nSubject: change\n\ndiff --git a/a b/a\n--- a/a\n+++ b/a\n@@ -1 +1 @@\n-x\n+y\n";
        let sections = split_sections(input);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].lines[0], "diff --git a/a b/a");
    }

    #[test]
    fn test_empty_input_has_no_sections() {
        assert!(split_sections("").is_empty());
        assert!(split_sections("\n\n").is_empty());
    }
}
