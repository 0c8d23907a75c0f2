//! Grouping of generated changes per file, with a global apply order

use super::Change;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Sorted, file-partitioned view of the changes of one blueprint run
///
/// Changes are sorted descending by order. On equal order the change generated
/// later comes first, so late fixups take priority when order values collide.
/// Offsets computed against the original source stay valid because edits
/// further into a file are applied before edits closer to its start.
#[derive(Debug, Clone, Default)]
pub struct ChangeCluster {
    changes: Vec<Change>,
    files: Vec<PathBuf>,
    by_file: HashMap<PathBuf, Vec<Change>>,
    other: Vec<Change>,
}

impl ChangeCluster {
    pub fn new(mut changes: Vec<Change>) -> Self {
        changes.reverse();
        changes.sort_by(|a, b| b.order().cmp(&a.order()));

        let mut files = Vec::new();
        let mut by_file: HashMap<PathBuf, Vec<Change>> = HashMap::new();
        let mut other = Vec::new();

        for change in &changes {
            match change.path() {
                Some(path) => {
                    by_file
                        .entry(path.to_path_buf())
                        .or_insert_with(|| {
                            files.push(path.to_path_buf());
                            Vec::new()
                        })
                        .push(change.clone());
                }
                None => other.push(change.clone()),
            }
        }

        tracing::debug!(
            changes = changes.len(),
            files = files.len(),
            other = other.len(),
            "clustered changes"
        );

        Self {
            changes,
            files,
            by_file,
            other,
        }
    }

    /// All changes in apply order
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Distinct target files, in the order they first appear in [`Self::changes`]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Changes targeting `path`, in apply order
    pub fn changes_for(&self, path: &Path) -> Option<&[Change]> {
        self.by_file.get(path).map(Vec::as_slice)
    }

    /// File buckets in [`Self::files`] order
    pub fn changes_by_file(&self) -> impl Iterator<Item = (&Path, &[Change])> {
        self.files
            .iter()
            .filter_map(|path| self.changes_for(path).map(|changes| (path.as_path(), changes)))
    }

    /// Changes that are not scoped to a file
    pub fn other_changes(&self) -> &[Change] {
        &self.other
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(path: Option<&str>, order: i64, tag: &str) -> Change {
        match path {
            Some(p) => Change::insert(p, 0, tag).with_order(order),
            None => Change::noop(None).with_order(order),
        }
    }

    fn text(change: &Change) -> &str {
        match change.kind() {
            crate::change::ChangeKind::Insert { text, .. } => text,
            _ => "",
        }
    }

    #[test]
    fn test_sorts_descending_by_order() {
        let cluster = ChangeCluster::new(vec![
            tagged(Some("a"), 1, "low"),
            tagged(Some("a"), 10, "high"),
            tagged(Some("a"), 5, "mid"),
        ]);
        let order: Vec<_> = cluster.changes().iter().map(Change::order).collect();
        assert_eq!(order, vec![10, 5, 1]);
    }

    #[test]
    fn test_later_generated_wins_ties() {
        let cluster = ChangeCluster::new(vec![
            tagged(Some("a"), 5, "A"),
            tagged(Some("a"), 5, "B"),
            tagged(Some("b"), 3, "C"),
            tagged(Some("a"), 3, "D"),
            tagged(Some("b"), 1, "E"),
            tagged(Some("b"), 1, "F"),
            tagged(Some("b"), 1, "G"),
        ]);
        let tags: Vec<_> = cluster.changes().iter().map(text).collect();
        assert_eq!(tags, vec!["B", "A", "D", "C", "G", "F", "E"]);
    }

    #[test]
    fn test_partition_reconstructs_sorted_changes() {
        let generated = vec![
            tagged(Some("src/lib.rs"), 4, "1"),
            tagged(None, 2, ""),
            tagged(Some("src/main.rs"), 9, "2"),
            tagged(Some("src/lib.rs"), 4, "3"),
            tagged(Some("src/main.rs"), 0, "4"),
            tagged(None, 7, ""),
            tagged(Some("Cargo.toml"), 2, "5"),
        ];
        let cluster = ChangeCluster::new(generated.clone());

        let mut partitioned: Vec<Change> = cluster.other_changes().to_vec();
        for (_, bucket) in cluster.changes_by_file() {
            partitioned.extend(bucket.iter().cloned());
        }
        assert_eq!(partitioned.len(), generated.len());

        // Restoring the sorted relative order gives back the full list exactly
        let position = |c: &Change| cluster.changes().iter().position(|s| s == c).unwrap();
        let mut restored = partitioned.clone();
        restored.sort_by_key(position);
        assert_eq!(restored, cluster.changes());

        // Each partition keeps the sorted order internally
        for (path, bucket) in cluster.changes_by_file() {
            let expected: Vec<_> = cluster
                .changes()
                .iter()
                .filter(|c| c.path() == Some(path))
                .cloned()
                .collect();
            assert_eq!(bucket, expected.as_slice());
        }
        let expected_other: Vec<_> = cluster
            .changes()
            .iter()
            .filter(|c| c.path().is_none())
            .cloned()
            .collect();
        assert_eq!(cluster.other_changes(), expected_other.as_slice());
    }

    #[test]
    fn test_files_follow_first_appearance() {
        let cluster = ChangeCluster::new(vec![
            tagged(Some("b"), 1, "x"),
            tagged(Some("a"), 2, "y"),
            tagged(Some("b"), 3, "z"),
        ]);
        assert_eq!(cluster.files(), &[PathBuf::from("b"), PathBuf::from("a")]);
        assert_eq!(cluster.changes_for(Path::new("b")).unwrap().len(), 2);
        assert!(cluster.changes_for(Path::new("c")).is_none());
    }

    #[test]
    fn test_empty_cluster() {
        let cluster = ChangeCluster::new(Vec::new());
        assert!(cluster.is_empty());
        assert!(cluster.files().is_empty());
        assert!(cluster.other_changes().is_empty());
    }
}
