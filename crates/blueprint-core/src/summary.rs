//! Human-readable plan of a change cluster
//!
//! One row per touched file: whether it is created or changed, its path, and
//! how many edits of each kind it receives.

use crate::change::{Change, ChangeCluster, ChangeKind, Host};
use colored::Colorize;
use std::fmt;
use std::path::{Path, PathBuf};

/// What happens to a file when the plan is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Create,
    Change,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileAction::Create => f.write_str("create"),
            FileAction::Change => f.write_str("change"),
        }
    }
}

/// Summary of the changes to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub action: FileAction,
    pub path: PathBuf,
    /// Edit counts per kind label, in first-seen order
    pub stats: Vec<(&'static str, usize)>,
}

impl SummaryRow {
    /// `"2 inserts, 1 replace"`
    pub fn stats_text(&self, colors: bool) -> String {
        self.stats
            .iter()
            .map(|(label, count)| {
                let text = format!("{} {}{}", count, label, if *count == 1 { "" } else { "s" });
                if !colors {
                    return text;
                }
                match *label {
                    "insert" => text.green().to_string(),
                    "remove" => text.red().to_string(),
                    "replace" => text.blue().to_string(),
                    _ => text,
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Per-file plan shown before confirmation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlueprintSummary {
    rows: Vec<SummaryRow>,
}

impl BlueprintSummary {
    /// Summarize `cluster`; the action depends on whether a file exists on `host`
    pub async fn generate(cluster: &ChangeCluster, host: &dyn Host) -> Self {
        let mut rows = Vec::with_capacity(cluster.files().len());
        for (path, changes) in cluster.changes_by_file() {
            let action = if host.exists(path).await {
                FileAction::Change
            } else {
                FileAction::Create
            };
            rows.push(SummaryRow {
                action,
                path: path.to_path_buf(),
                stats: change_stats(changes),
            });
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Files in plan order
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.rows.iter().map(|row| row.path.as_path())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Table with one indented line per file
    pub fn render(&self, colors: bool) -> String {
        let table: Vec<Vec<Cell>> = self
            .rows
            .iter()
            .map(|row| {
                let action = row.action.to_string();
                let action_styled = match (colors, row.action) {
                    (false, _) => action.clone(),
                    (true, FileAction::Create) => action.green().to_string(),
                    (true, FileAction::Change) => action.blue().to_string(),
                };
                let path = row.path.display().to_string();
                let path_styled = if colors {
                    path.cyan().to_string()
                } else {
                    path.clone()
                };
                vec![
                    Cell::styled(action, action_styled),
                    Cell::styled(path, path_styled),
                    Cell::styled(
                        format!("[ {} ]", row.stats_text(false)),
                        format!("[ {} ]", row.stats_text(colors)),
                    ),
                ]
            })
            .collect();

        render_table(&table, 5, 20)
    }
}

/// Count leaf edits per kind; bundles are unrolled and placeholders dropped
pub fn change_stats(changes: &[Change]) -> Vec<(&'static str, usize)> {
    let mut stats: Vec<(&'static str, usize)> = Vec::new();
    for leaf in changes.iter().flat_map(Change::unrolled) {
        if matches!(leaf.kind(), ChangeKind::Noop) {
            continue;
        }
        let label = leaf.kind().label();
        match stats.iter_mut().find(|(l, _)| *l == label) {
            Some((_, count)) => *count += 1,
            None => stats.push((label, 1)),
        }
    }
    stats
}

/// A table cell; width is measured on the plain text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    plain: String,
    styled: String,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        let plain = text.into();
        Self {
            styled: plain.clone(),
            plain,
        }
    }

    pub fn styled(plain: impl Into<String>, styled: impl Into<String>) -> Self {
        Self {
            plain: plain.into(),
            styled: styled.into(),
        }
    }
}

/// Render rows with every column padded to its widest cell, at least `min_pad`
///
/// Columns are separated by one space and every line is indented by `offset`.
pub fn render_table(rows: &[Vec<Cell>], offset: usize, min_pad: usize) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };

    let widths: Vec<usize> = (0..first.len())
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.plain.chars().count())
                .max()
                .unwrap_or(0)
                .max(min_pad)
        })
        .collect();

    let indent = " ".repeat(offset);
    rows.iter()
        .map(|row| {
            let line = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| {
                    let padding = width.saturating_sub(cell.plain.chars().count());
                    format!("{}{}", cell.styled, " ".repeat(padding))
                })
                .collect::<Vec<_>>()
                .join(" ");
            format!("{}{}", indent, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
