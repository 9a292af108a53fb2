//! Parse unified diff format (as returned by `git diff` or the compare API).

use super::sections::{parse_hunk_header, split_sections, Section};
use crate::model::{DiffLine, FileDiff, FileStatus, Hunk, LineKind};
use thiserror::Error;
use unidiff::{Hunk as UnidiffHunk, Line as UnidiffLine, PatchSet};

/// A file section that could not be parsed cleanly.
///
/// Anomalies never abort a parse. The affected file is emitted with zero
/// counts and no hunks, or skipped when not even a path is recoverable.
/// A truncated hunk keeps the lines it does have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAnomaly {
    #[error("section {section}: malformed hunk header {header:?}")]
    MalformedHunkHeader { section: usize, header: String },
    #[error("section {section}: rejected by diff parser: {reason}")]
    Rejected { section: usize, reason: String },
    #[error("section {section}: no file path could be recovered")]
    NoPaths { section: usize },
    #[error("section {section}: hunk {header:?} ends before its line counts are met")]
    TruncatedHunk { section: usize, header: String },
}

/// Parsed files plus whatever went wrong along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub files: Vec<FileDiff>,
    pub anomalies: Vec<ParseAnomaly>,
}

/// Parse a unified diff into one `FileDiff` per file section, in input order.
///
/// Empty input yields an empty list. Broken sections are zero-filled (see
/// [`ParseAnomaly`]) and logged.
///
/// # Example
/// ```ignore
/// let files = parse_unified_diff(diff_text);
/// println!("Changed files: {}", files.len());
/// ```
pub fn parse_unified_diff(diff_text: &str) -> Vec<FileDiff> {
    parse_unified_diff_with_report(diff_text).files
}

/// Like [`parse_unified_diff`], but also returns the anomalies found.
pub fn parse_unified_diff_with_report(diff_text: &str) -> ParseReport {
    let mut report = ParseReport::default();

    for section in split_sections(diff_text) {
        match parse_section(&section) {
            Ok(file) => report.files.push(file),
            Err((file, anomaly)) => {
                log::warn!("Diff parse anomaly: {}", anomaly);
                if let Some(file) = file {
                    report.files.push(file);
                }
                report.anomalies.push(anomaly);
            }
        }
    }

    log::debug!(
        "Parsed {} file(s) with {} anomaly(ies)",
        report.files.len(),
        report.anomalies.len()
    );
    report
}

type SectionError = (Option<FileDiff>, ParseAnomaly);

fn parse_section(section: &Section<'_>) -> Result<FileDiff, SectionError> {
    let header = SectionHeader::scan(&section.lines);
    let (old_path, new_path) = header.paths();

    if old_path.is_none() && new_path.is_none() {
        return Err((None, ParseAnomaly::NoPaths { section: section.index }));
    }

    let mut file_diff = FileDiff::new(old_path, new_path);
    file_diff.is_binary = header.binary;
    if header.copy_from.is_some() || header.copy_to.is_some() {
        file_diff.status = FileStatus::Copied;
    }

    if let Some(bad) = section
        .lines
        .iter()
        .find(|line| line.starts_with("@@") && parse_hunk_header(line).is_none())
    {
        let anomaly = ParseAnomaly::MalformedHunkHeader {
            section: section.index,
            header: bad.to_string(),
        };
        return Err((Some(file_diff), anomaly));
    }

    // Binary files, pure renames and mode changes carry no ---/+++ pair.
    if !header.has_file_headers {
        return Ok(file_diff);
    }

    if let Some(cut) = section.truncated_hunk {
        file_diff.hunks = read_hunks(&section.lines);
        file_diff.recalculate_stats();
        let anomaly = ParseAnomaly::TruncatedHunk {
            section: section.index,
            header: cut.to_string(),
        };
        return Err((Some(file_diff), anomaly));
    }

    let mut patch_set = PatchSet::new();
    if let Err(e) = patch_set.parse(section.text()) {
        file_diff.zero_fill();
        let anomaly = ParseAnomaly::Rejected {
            section: section.index,
            reason: e.to_string(),
        };
        return Err((Some(file_diff), anomaly));
    }

    if let Some(patched_file) = patch_set.files().first() {
        for hunk in patched_file.hunks() {
            file_diff.hunks.push(parse_hunk(hunk));
        }
    }

    file_diff.recalculate_stats();
    Ok(file_diff)
}

fn parse_hunk(hunk: &UnidiffHunk) -> Hunk {
    let mut parsed = Hunk::with_context(
        hunk.source_start as u32,
        hunk.source_length as u32,
        hunk.target_start as u32,
        hunk.target_length as u32,
        hunk.section_header.trim(),
    );

    for line in hunk.lines() {
        parsed.lines.push(parse_line(line));
    }

    parsed
}

/// Read hunks line by line, taking whatever body lines are present.
///
/// Used for sections the unified-diff parser would reject because a hunk is
/// shorter than its header claims.
fn read_hunks(lines: &[&str]) -> Vec<Hunk> {
    let mut hunks: Vec<Hunk> = Vec::new();
    let mut old_line = 0;
    let mut new_line = 0;

    for line in lines {
        if line.starts_with("@@") {
            if let Some(range) = parse_hunk_header(line) {
                let context = line.splitn(3, "@@").nth(2).unwrap_or_default().trim();
                hunks.push(Hunk::with_context(
                    range.old_start,
                    range.old_count,
                    range.new_start,
                    range.new_count,
                    context,
                ));
                old_line = range.old_start;
                new_line = range.new_start;
            }
            continue;
        }

        let Some(hunk) = hunks.last_mut() else {
            continue;
        };

        let parsed = match line.as_bytes().first() {
            Some(b'+') => {
                new_line += 1;
                DiffLine::addition(&line[1..], new_line - 1)
            }
            Some(b'-') => {
                old_line += 1;
                DiffLine::deletion(&line[1..], old_line - 1)
            }
            Some(b' ') | None => {
                old_line += 1;
                new_line += 1;
                DiffLine::context(line.get(1..).unwrap_or_default(), old_line - 1, new_line - 1)
            }
            Some(b'\\') => DiffLine {
                kind: LineKind::NoNewline,
                content: line[1..].trim().to_string(),
                old_line: None,
                new_line: None,
            },
            Some(_) => continue,
        };
        hunk.lines.push(parsed);
    }

    hunks
}

fn parse_line(line: &UnidiffLine) -> DiffLine {
    let kind = match line.line_type.as_str() {
        "+" => LineKind::Addition,
        "-" => LineKind::Deletion,
        "\\" => LineKind::NoNewline,
        _ => LineKind::Context,
    };

    DiffLine {
        kind,
        content: line.value.to_string(),
        old_line: line.source_line_no.map(|n| n as u32),
        new_line: line.target_line_no.map(|n| n as u32),
    }
}

/// Extended header lines found before the first hunk of a section.
#[derive(Debug, Default)]
struct SectionHeader {
    git_old: Option<String>,
    git_new: Option<String>,
    /// `Some(None)` means the side was `/dev/null`.
    source: Option<Option<String>>,
    target: Option<Option<String>>,
    rename_from: Option<String>,
    rename_to: Option<String>,
    copy_from: Option<String>,
    copy_to: Option<String>,
    new_file: bool,
    deleted_file: bool,
    binary: bool,
    has_file_headers: bool,
}

impl SectionHeader {
    fn scan(lines: &[&str]) -> Self {
        let mut header = Self::default();

        for line in lines {
            if line.starts_with("@@") {
                break;
            }

            if let Some(rest) = line.strip_prefix("diff --git ") {
                if let Some((old, new)) = split_git_header(rest) {
                    header.git_old = Some(old);
                    header.git_new = Some(new);
                }
            } else if let Some(path) = line.strip_prefix("--- ") {
                header.source = Some(clean_path(path));
            } else if let Some(path) = line.strip_prefix("+++ ") {
                header.target = Some(clean_path(path));
                header.has_file_headers = header.source.is_some();
            } else if let Some(path) = line.strip_prefix("rename from ") {
                header.rename_from = Some(unquote(path));
            } else if let Some(path) = line.strip_prefix("rename to ") {
                header.rename_to = Some(unquote(path));
            } else if let Some(path) = line.strip_prefix("copy from ") {
                header.copy_from = Some(unquote(path));
            } else if let Some(path) = line.strip_prefix("copy to ") {
                header.copy_to = Some(unquote(path));
            } else if line.starts_with("new file mode") {
                header.new_file = true;
            } else if line.starts_with("deleted file mode") {
                header.deleted_file = true;
            } else if line.starts_with("Binary files ") || line.starts_with("GIT binary patch") {
                header.binary = true;
            }
        }

        header
    }

    /// Resolve the old and new path, most specific source first.
    fn paths(&self) -> (Option<String>, Option<String>) {
        let old = match &self.source {
            Some(side) => side.clone(),
            None if self.new_file => None,
            None => self
                .rename_from
                .clone()
                .or_else(|| self.copy_from.clone())
                .or_else(|| self.git_old.clone()),
        };

        let new = match &self.target {
            Some(side) => side.clone(),
            None if self.deleted_file => None,
            None => self
                .rename_to
                .clone()
                .or_else(|| self.copy_to.clone())
                .or_else(|| self.git_new.clone()),
        };

        (old, new)
    }
}

/// Split `a/old b/new` from a `diff --git` line.
fn split_git_header(rest: &str) -> Option<(String, String)> {
    let rest = rest.trim();
    let idx = rest.rfind(" b/").or_else(|| rest.rfind(" \"b/"))?;
    let old = clean_path(&rest[..idx])?;
    let new = clean_path(&rest[idx + 1..])?;
    Some((old, new))
}

/// Clean a header path: drop timestamps, quotes and a/b prefixes.
///
/// Returns `None` for `/dev/null`.
fn clean_path(path: &str) -> Option<String> {
    let path = path.split('\t').next().unwrap_or_default().trim();
    let path = unquote(path);

    if path == "/dev/null" || path.is_empty() {
        return None;
    }

    // Remove common prefixes
    if let Some(stripped) = path.strip_prefix("a/") {
        return Some(stripped.to_string());
    }
    if let Some(stripped) = path.strip_prefix("b/") {
        return Some(stripped.to_string());
    }

    Some(path)
}

fn unquote(path: &str) -> String {
    let path = path.trim();
    path.strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .unwrap_or(path)
        .to_string()
}
