//! Line diff preview of the changes to one file
//!
//! The changes are replayed on a [`ShadowHost`], so previewing never writes
//! to the real host.

use crate::change::{ChangeCluster, Host, ShadowHost};
use crate::error::ChangeError;
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};

/// Unchanged lines kept on each side of an edit
pub const CONTEXT_LINES: usize = 3;

/// One rendered line of a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    Context(String),
    Added(String),
    Removed(String),
    /// A collapsed run of unchanged lines
    Skipped(usize),
    /// The line before has no trailing newline
    NoNewline,
}

/// Content of a file before and after its changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub before: String,
    pub after: String,
}

impl FileDiff {
    /// Apply the changes for `path` from `cluster` on a shadow of `host`
    pub async fn preview(
        cluster: &ChangeCluster,
        host: &dyn Host,
        path: &Path,
    ) -> Result<Self, ChangeError> {
        let shadow = ShadowHost::new(host);
        let before = shadow.read(path).await?;
        for change in cluster.changes_for(path).unwrap_or_default() {
            change.apply(&shadow).await?;
        }
        let after = shadow.read(path).await?;

        Ok(Self {
            path: path.to_path_buf(),
            before,
            after,
        })
    }

    /// Previews of every file in `cluster`, in cluster order
    pub async fn preview_all(
        cluster: &ChangeCluster,
        host: &dyn Host,
    ) -> Result<Vec<Self>, ChangeError> {
        let mut diffs = Vec::with_capacity(cluster.files().len());
        for path in cluster.files() {
            diffs.push(Self::preview(cluster, host, path).await?);
        }
        Ok(diffs)
    }

    pub fn is_empty(&self) -> bool {
        self.before == self.after
    }

    /// Diff lines with long unchanged runs collapsed
    ///
    /// A run keeps [`CONTEXT_LINES`] lines next to each neighbouring edit. The
    /// leading run keeps none at its start and the trailing run none at its end.
    /// Runs are only collapsed when at least three lines would be skipped.
    pub fn lines(&self) -> Vec<DiffLine> {
        let diff = TextDiff::from_lines(&self.before, &self.after);

        let mut runs: Vec<(ChangeTag, Vec<Line>)> = Vec::new();
        for change in diff.iter_all_changes() {
            let line = Line {
                text: change.value().trim_end_matches('\n').to_string(),
                missing_newline: change.missing_newline(),
            };
            match runs.last_mut() {
                Some((tag, lines)) if *tag == change.tag() => lines.push(line),
                _ => runs.push((change.tag(), vec![line])),
            }
        }

        let last = runs.len().saturating_sub(1);
        let mut out = Vec::new();
        for (index, (tag, lines)) in runs.into_iter().enumerate() {
            match tag {
                ChangeTag::Insert => push_lines(lines, DiffLine::Added, &mut out),
                ChangeTag::Delete => push_lines(lines, DiffLine::Removed, &mut out),
                ChangeTag::Equal => {
                    let keep_begin = if index != 0 { CONTEXT_LINES } else { 0 };
                    let keep_end = if index != last { CONTEXT_LINES } else { 0 };
                    trim_unchanged(lines, keep_begin, keep_end, &mut out);
                }
            }
        }
        out
    }

    /// Printable diff; added lines green, removed red
    pub fn render(&self, colors: bool) -> String {
        self.lines()
            .into_iter()
            .map(|line| {
                let text = match &line {
                    DiffLine::Context(l) => format!(" {}", l),
                    DiffLine::Added(l) => format!("+{}", l),
                    DiffLine::Removed(l) => format!("-{}", l),
                    DiffLine::Skipped(n) => format!(" ... skipped {} lines ...", n),
                    DiffLine::NoNewline => "\\ No newline at end of file".to_string(),
                };
                if !colors {
                    return text;
                }
                match line {
                    DiffLine::Context(_) => text,
                    DiffLine::Added(_) => text.green().to_string(),
                    DiffLine::Removed(_) => text.red().to_string(),
                    DiffLine::Skipped(_) | DiffLine::NoNewline => text.bright_black().to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

struct Line {
    text: String,
    missing_newline: bool,
}

fn push_lines(lines: Vec<Line>, wrap: fn(String) -> DiffLine, out: &mut Vec<DiffLine>) {
    for line in lines {
        out.push(wrap(line.text));
        if line.missing_newline {
            out.push(DiffLine::NoNewline);
        }
    }
}

fn trim_unchanged(lines: Vec<Line>, keep_begin: usize, keep_end: usize, out: &mut Vec<DiffLine>) {
    let len = lines.len();
    if len < keep_begin + keep_end + 3 {
        push_lines(lines, DiffLine::Context, out);
        return;
    }

    let mut lines = lines.into_iter();
    push_lines(lines.by_ref().take(keep_begin).collect(), DiffLine::Context, out);
    out.push(DiffLine::Skipped(len - keep_begin - keep_end));
    push_lines(lines.skip(len - keep_begin - keep_end).collect(), DiffLine::Context, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{Change, MemoryHost};

    fn numbered(n: usize) -> String {
        (1..=n).map(|i| format!("line {}\n", i)).collect()
    }

    fn diff(before: &str, after: &str) -> FileDiff {
        FileDiff {
            path: PathBuf::from("a.rs"),
            before: before.to_string(),
            after: after.to_string(),
        }
    }

    #[test]
    fn test_short_file_is_not_trimmed() {
        let lines = diff("a\nb\n", "a\nc\n").lines();

        assert_eq!(
            lines,
            vec![
                DiffLine::Context("a".into()),
                DiffLine::Removed("b".into()),
                DiffLine::Added("c".into()),
            ]
        );
    }

    #[test]
    fn test_edit_in_middle_keeps_context() {
        let before = numbered(20);
        let after = before.replace("line 10\n", "line ten\n");

        let lines = diff(&before, &after).lines();

        assert_eq!(lines[0], DiffLine::Skipped(6));
        assert_eq!(lines[1], DiffLine::Context("line 7".into()));
        assert_eq!(lines[3], DiffLine::Context("line 9".into()));
        assert_eq!(lines[4], DiffLine::Removed("line 10".into()));
        assert_eq!(lines[5], DiffLine::Added("line ten".into()));
        assert_eq!(lines[8], DiffLine::Context("line 13".into()));
        assert_eq!(lines[9], DiffLine::Skipped(7));
        assert_eq!(lines.len(), 10);
    }

    #[test]
    fn test_inner_run_keeps_both_sides() {
        let before = numbered(30);
        let after = before
            .replace("line 2\n", "line two\n")
            .replace("line 28\n", "line twenty-eight\n");

        let lines = diff(&before, &after).lines();

        assert!(lines.contains(&DiffLine::Skipped(19)));
        let skipped = lines
            .iter()
            .position(|l| *l == DiffLine::Skipped(19))
            .unwrap();
        assert_eq!(lines[skipped - 1], DiffLine::Context("line 5".into()));
        assert_eq!(lines[skipped + 1], DiffLine::Context("line 25".into()));
    }

    #[test]
    fn test_dropped_trailing_newline_is_marked() {
        let lines = diff("a\nb\n", "a\nb").lines();

        assert_eq!(
            lines,
            vec![
                DiffLine::Context("a".into()),
                DiffLine::Removed("b".into()),
                DiffLine::Added("b".into()),
                DiffLine::NoNewline,
            ]
        );
        assert_eq!(
            diff("a\nb\n", "a\nb").render(false),
            " a\n-b\n+b\n\\ No newline at end of file"
        );
    }

    #[test]
    fn test_added_trailing_newline_is_marked() {
        let lines = diff("x", "x\n").lines();

        assert_eq!(
            lines,
            vec![
                DiffLine::Removed("x".into()),
                DiffLine::NoNewline,
                DiffLine::Added("x".into()),
            ]
        );
    }

    #[test]
    fn test_render_marks_lines() {
        let rendered = diff("a\n", "a\nb\n").render(false);
        assert_eq!(rendered, " a\n+b");
    }

    #[tokio::test]
    async fn test_preview_never_writes_host() {
        let host = MemoryHost::with_files([("src/mod.rs", "pub mod a;\n")]);
        let cluster = ChangeCluster::new(vec![Change::insert("src/mod.rs", 11, "pub mod b;\n")]);

        let preview = FileDiff::preview(&cluster, &host, Path::new("src/mod.rs"))
            .await
            .unwrap();

        assert_eq!(preview.before, "pub mod a;\n");
        assert_eq!(preview.after, "pub mod a;\npub mod b;\n");
        assert!(host.writes().await.is_empty());
    }

    #[tokio::test]
    async fn test_preview_new_file() {
        let host = MemoryHost::new();
        let cluster = ChangeCluster::new(vec![Change::insert("src/b.rs", 0, "struct B;\n")]);

        let previews = FileDiff::preview_all(&cluster, &host).await.unwrap();

        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].lines(), vec![DiffLine::Added("struct B;".into())]);
        assert!(host.writes().await.is_empty());
    }
}
