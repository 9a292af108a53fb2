//! Plain text rendering of the changes view.

use changes_viewer::{
    ChangesViewModel, ComparisonKey, FileChange, FileIndexEntry, LayoutStyle, LineKind,
};
use std::fmt::Write;

/// Render the header, the file index and optionally every hunk.
pub fn render(
    view: &ChangesViewModel<'_>,
    comparison: Option<&ComparisonKey>,
    with_hunks: bool,
) -> String {
    let mut out = String::new();

    if let Some(key) = comparison {
        let _ = writeln!(out, "Comparing {}", key);
    }

    if let Some(error) = view.error {
        let _ = writeln!(out, "Failed to load changes: {}", error);
        let _ = writeln!(out, "Run the command again to retry.");
        return out;
    }

    if view.loading {
        let _ = writeln!(out, "Loading changes...");
        return out;
    }

    let _ = writeln!(out, "{}", view.stats.summary_label());
    let _ = writeln!(
        out,
        "layout: {}  line breaks: {}  scroll to top: {}{}",
        view.config.layout_style,
        if view.config.line_breaks_enabled { "on" } else { "off" },
        if view.is_sticky { "shown" } else { "hidden" },
        if view.read_only { "  (read only)" } else { "" },
    );

    if view.files.is_empty() {
        return out;
    }

    out.push('\n');
    for change in view.files {
        let _ = writeln!(out, "{}", index_line(&FileIndexEntry::from(change)));
        let _ = writeln!(out, "    #{}", change.content_id());
    }

    if with_hunks {
        for change in view.files {
            out.push('\n');
            render_file(&mut out, change, view.config.layout_style);
        }
    }

    out
}

fn index_line(entry: &FileIndexEntry) -> String {
    format!(
        "{} {}  +{} -{}  #{}",
        entry.status.as_char(),
        entry.display_name,
        entry.additions,
        entry.deletions,
        entry.container_id
    )
}

fn render_file(out: &mut String, change: &FileChange, layout: LayoutStyle) {
    let _ = writeln!(out, "=== {} ===", change.diff.display_name());

    if change.diff.is_binary {
        let _ = writeln!(out, "Binary file not shown");
        return;
    }

    for hunk in &change.diff.hunks {
        let _ = writeln!(out, "{}", hunk.header);
        for line in &hunk.lines {
            let old = number(line.old_line);
            let new = number(line.new_line);
            match layout {
                LayoutStyle::Unified => {
                    let _ = writeln!(
                        out,
                        "{} {} {}{}",
                        old,
                        new,
                        line.kind.prefix(),
                        line.content
                    );
                }
                LayoutStyle::SideBySide => {
                    let (left, right) = match line.kind {
                        LineKind::Deletion => (line.content.as_str(), ""),
                        LineKind::Addition => ("", line.content.as_str()),
                        LineKind::Context | LineKind::NoNewline => {
                            (line.content.as_str(), line.content.as_str())
                        }
                    };
                    let _ = writeln!(out, "{} {:<40} | {} {}", old, left, new, right);
                }
            }
        }
    }
}

fn number(line: Option<u32>) -> String {
    line.map(|n| format!("{:>5}", n))
        .unwrap_or_else(|| " ".repeat(5))
}

#[cfg(test)]
mod tests {
    use super::*;
    use changes_viewer::{ChangesView, DiffStats, FetchError, ViewConfiguration};
    use pretty_assertions::assert_eq;

    const DIFF: &str = "\
diff --git a/src/lib.rs b/src/lib.rs
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,2 +1,2 @@
 fn main() {}
-old
+new
";

    fn view_model<'a>(
        view: &'a ChangesView,
        error: Option<&'a FetchError>,
    ) -> ChangesViewModel<'a> {
        ChangesViewModel {
            files: &view.files,
            stats: view.stats,
            config: ViewConfiguration::default(),
            is_sticky: false,
            sticky_top_position: 64,
            loading: false,
            error,
            read_only: false,
        }
    }

    #[test]
    fn test_render_summary_and_index() {
        let view = ChangesView::from_raw(DIFF);
        let out = render(&view_model(&view, None), None, false);

        assert_eq!(
            out,
            "\
1 changed file with 1 addition and 1 deletion
layout: side-by-side  line breaks: off  scroll to top: hidden

M src/lib.rs  +1 -1  #container-src/lib.rs::::src/lib.rs
    #content-src/lib.rs::::src/lib.rs
"
        );
    }

    #[test]
    fn test_render_unified_hunks() {
        let view = ChangesView::from_raw(DIFF);
        let mut model = view_model(&view, None);
        model.config.layout_style = LayoutStyle::Unified;

        let out = render(&model, None, true);
        assert!(out.contains("=== src/lib.rs ==="));
        assert!(out.contains("@@ -1,2 +1,2 @@"));
        assert!(out.contains("    2       -old"));
        assert!(out.contains("          2 +new"));
    }

    #[test]
    fn test_render_error_offers_retry() {
        let view = ChangesView {
            files: vec![],
            stats: DiffStats::default(),
        };
        let error = FetchError::Http {
            status: 404,
            message: "Not Found".to_string(),
        };
        let key = ComparisonKey::from_endpoints("acme/widgets", Some("main"), Some("x")).unwrap();

        let out = render(&view_model(&view, Some(&error)), Some(&key), false);
        assert_eq!(
            out,
            "\
Comparing acme/widgets@main...x
Failed to load changes: HTTP 404: Not Found
Run the command again to retry.
"
        );
    }
}
