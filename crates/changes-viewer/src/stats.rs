//! Aggregate line statistics over a list of file changes.

use crate::model::{FileChange, FileDiff};

/// Anything that carries per-file added/deleted line counts.
pub trait LineCounts {
    fn added_lines(&self) -> usize;
    fn deleted_lines(&self) -> usize;
}

impl LineCounts for FileDiff {
    fn added_lines(&self) -> usize {
        self.additions
    }

    fn deleted_lines(&self) -> usize {
        self.deletions
    }
}

impl LineCounts for FileChange {
    fn added_lines(&self) -> usize {
        self.diff.additions
    }

    fn deleted_lines(&self) -> usize {
        self.diff.deletions
    }
}

/// Totals across every file of a comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added_lines: usize,
    pub deleted_lines: usize,
    pub changed_files: usize,
}

impl DiffStats {
    /// "N changed files with X additions and Y deletions".
    pub fn summary_label(&self) -> String {
        format!(
            "{} changed {} with {} {} and {} {}",
            format_count(self.changed_files),
            plural(self.changed_files, "file", "files"),
            format_count(self.added_lines),
            plural(self.added_lines, "addition", "additions"),
            format_count(self.deleted_lines),
            plural(self.deleted_lines, "deletion", "deletions"),
        )
    }
}

/// Fold the counts of every record into fresh totals.
///
/// Always a full recompute; no previous totals are consulted.
pub fn aggregate<T: LineCounts>(records: &[T]) -> DiffStats {
    records.iter().fold(DiffStats::default(), |mut stats, record| {
        stats.added_lines += record.added_lines();
        stats.deleted_lines += record.deleted_lines();
        stats.changed_files += 1;
        stats
    })
}

/// Format a count with thousands separators (`1234567` -> `1,234,567`).
pub fn format_count(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_unified_diff;
    use pretty_assertions::assert_eq;

    const TWO_FILES: &str = "diff --git a/file1.txt b/file1.txt
--- a/file1.txt
+++ b/file1.txt
@@ -1,2 +1,4 @@
 keep
-drop
+one
+two
+three
diff --git a/file2.txt b/file2.txt
--- a/file2.txt
+++ b/file2.txt
@@ -1,3 +1,1 @@
-gone
 stay
-also gone
";

    const THIRD_FILE: &str = "diff --git a/file3.txt b/file3.txt
new file mode 100644
--- /dev/null
+++ b/file3.txt
@@ -0,0 +1,2 @@
+x
+y
";

    #[test]
    fn test_aggregate_empty() {
        let stats = aggregate::<FileDiff>(&[]);
        assert_eq!(stats, DiffStats::default());
        assert_eq!((stats.added_lines, stats.deleted_lines), (0, 0));
    }

    #[test]
    fn test_two_file_scenario() {
        let files = parse_unified_diff(TWO_FILES);

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path(), "file1.txt");
        assert_eq!((files[0].additions, files[0].deletions), (3, 1));
        assert_eq!(files[1].path(), "file2.txt");
        assert_eq!((files[1].additions, files[1].deletions), (0, 2));

        let stats = aggregate(&files);
        assert_eq!(stats.added_lines, 3);
        assert_eq!(stats.deleted_lines, 3);
        assert_eq!(stats.changed_files, 2);
    }

    #[test]
    fn test_appending_a_section_adds_exactly_its_lines() {
        let before = aggregate(&parse_unified_diff(TWO_FILES));
        let combined = format!("{TWO_FILES}{THIRD_FILE}");
        let after = aggregate(&parse_unified_diff(&combined));

        assert_eq!(after.added_lines, before.added_lines + 2);
        assert_eq!(after.deleted_lines, before.deleted_lines);
    }

    #[test]
    fn test_aggregate_over_enriched_changes_matches_raw() {
        let files = parse_unified_diff(TWO_FILES);
        let raw = aggregate(&files);
        let enriched = aggregate(&crate::model::enrich(files));
        assert_eq!(raw, enriched);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_summary_label() {
        let stats = DiffStats {
            added_lines: 1200,
            deleted_lines: 1,
            changed_files: 1,
        };
        assert_eq!(
            stats.summary_label(),
            "1 changed file with 1,200 additions and 1 deletion"
        );
    }
}
