//! Storage rebalancing.
//!
//! Runs two phases over the numbered folders of a storage root, ascending by
//! folder number:
//!
//! 1. **Overflow**: every folder above capacity sheds its excess into other
//!    folders with room, or into freshly created ones.
//! 2. **Merge**: folders below capacity are packed first-fit: the first one
//!    pulls files from later ones until it is full, then the next one does.
//!
//! Files whose name already exists at a destination are skipped and stay
//! where they are. Emptied folders are deleted.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::folders::{create_folder, folder_files, list_folders, remove_if_empty};
use super::mover::{move_file, MoveOutcome};
use crate::error::{CatalogError, Result};

/// Summary of one rebalance run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebalanceReport {
    pub moved: usize,
    pub folders_created: usize,
    pub folders_removed: usize,
    /// Moves skipped because the destination already had that name.
    pub collisions: usize,
}

impl RebalanceReport {
    pub fn is_noop(&self) -> bool {
        self.moved == 0 && self.folders_created == 0 && self.folders_removed == 0
    }
}

#[derive(Debug)]
struct FolderState {
    number: u64,
    path: PathBuf,
    files: BTreeSet<OsString>,
    removed: bool,
}

impl FolderState {
    fn len(&self) -> usize {
        self.files.len()
    }
}

struct Rebalancer<'a> {
    root: &'a Path,
    capacity: usize,
    folders: Vec<FolderState>,
    report: RebalanceReport,
}

/// Restores `capacity` on every numbered folder under `root` and merges
/// under-filled folders. Running it again on its own output moves nothing
/// unless name collisions held files back.
pub fn rebalance(root: &Path, capacity: usize) -> Result<RebalanceReport> {
    if capacity == 0 {
        return Err(CatalogError::Validation(
            "folder capacity must be at least 1".to_string(),
        ));
    }

    let mut folders = Vec::new();
    for folder in list_folders(root)? {
        folders.push(FolderState {
            number: folder.number,
            files: folder_files(&folder.path)?.into_iter().collect(),
            path: folder.path,
            removed: false,
        });
    }

    let mut rebalancer = Rebalancer {
        root,
        capacity,
        folders,
        report: RebalanceReport::default(),
    };
    rebalancer.shed_overflow()?;
    rebalancer.merge_underfilled()?;
    rebalancer.remove_empty()?;

    let report = rebalancer.report;
    tracing::info!(
        root = %root.display(),
        capacity,
        moved = report.moved,
        created = report.folders_created,
        removed = report.folders_removed,
        collisions = report.collisions,
        "rebalanced storage"
    );
    Ok(report)
}

impl Rebalancer<'_> {
    fn shed_overflow(&mut self) -> Result<()> {
        // Folders created below are appended and never over capacity.
        let existing = self.folders.len();
        for source in 0..existing {
            let excess = self.folders[source].len().saturating_sub(self.capacity);
            if excess == 0 {
                continue;
            }
            let outgoing = self.folders[source]
                .files
                .iter()
                .rev()
                .take(excess)
                .cloned()
                .collect::<Vec<_>>();
            for name in outgoing {
                self.relocate(source, name)?;
            }
            self.remove_if_emptied(source)?;
        }
        Ok(())
    }

    /// Moves one file out of `source` into the first folder with room,
    /// creating a folder if none will take it.
    fn relocate(&mut self, source: usize, name: OsString) -> Result<()> {
        for target in 0..self.folders.len() {
            let candidate = &self.folders[target];
            if target == source || candidate.removed || candidate.len() >= self.capacity {
                continue;
            }
            if candidate.files.contains(&name) {
                self.note_collision(source, target, &name);
                continue;
            }
            if self.transfer(source, target, &name)? {
                return Ok(());
            }
        }

        let number = next_folder_number_of(&self.folders);
        let folder = create_folder(self.root, number)?;
        self.report.folders_created += 1;
        self.folders.push(FolderState {
            number: folder.number,
            path: folder.path,
            files: BTreeSet::new(),
            removed: false,
        });
        let target = self.folders.len() - 1;
        self.transfer(source, target, &name)?;
        Ok(())
    }

    fn merge_underfilled(&mut self) -> Result<()> {
        let mut underfilled = (0..self.folders.len())
            .filter(|&index| {
                let folder = &self.folders[index];
                !folder.removed && folder.len() < self.capacity
            })
            .collect::<Vec<_>>();
        // Numeric order, so folder 2 merges before folder 10.
        underfilled.sort_by_key(|&index| self.folders[index].number);

        for (position, &sink) in underfilled.iter().enumerate() {
            if self.folders[sink].removed {
                continue;
            }
            for &donor in &underfilled[position + 1..] {
                if self.folders[sink].len() >= self.capacity {
                    break;
                }
                if self.folders[donor].removed {
                    continue;
                }
                let names = self.folders[donor].files.iter().cloned().collect::<Vec<_>>();
                for name in names {
                    if self.folders[sink].len() >= self.capacity {
                        break;
                    }
                    if self.folders[sink].files.contains(&name) {
                        self.note_collision(donor, sink, &name);
                        continue;
                    }
                    self.transfer(donor, sink, &name)?;
                }
                self.remove_if_emptied(donor)?;
            }
        }
        Ok(())
    }

    fn remove_empty(&mut self) -> Result<()> {
        for index in 0..self.folders.len() {
            self.remove_if_emptied(index)?;
        }
        Ok(())
    }

    /// Moves `name` between two folders, keeping the in-memory view in sync.
    /// Returns false when the destination turned out to have the name on disk.
    fn transfer(&mut self, from: usize, to: usize, name: &OsString) -> Result<bool> {
        let source = self.folders[from].path.join(name);
        let destination = self.folders[to].path.join(name);
        match move_file(&source, &destination)? {
            MoveOutcome::Moved => {
                self.folders[from].files.remove(name);
                self.folders[to].files.insert(name.clone());
                self.report.moved += 1;
                tracing::debug!(
                    from = %source.display(),
                    to = %destination.display(),
                    "moved file"
                );
                Ok(true)
            }
            MoveOutcome::Collision => {
                self.note_collision(from, to, name);
                Ok(false)
            }
        }
    }

    fn note_collision(&mut self, from: usize, to: usize, name: &OsString) {
        self.report.collisions += 1;
        tracing::warn!(
            file = %name.to_string_lossy(),
            from = %self.folders[from].path.display(),
            to = %self.folders[to].path.display(),
            "name collision, file left in place"
        );
    }

    fn remove_if_emptied(&mut self, index: usize) -> Result<()> {
        let folder = &mut self.folders[index];
        if folder.removed || !folder.files.is_empty() {
            return Ok(());
        }
        if remove_if_empty(&folder.path)? {
            folder.removed = true;
            self.report.folders_removed += 1;
        }
        Ok(())
    }
}

fn next_folder_number_of(folders: &[FolderState]) -> u64 {
    folders
        .iter()
        .map(|folder| folder.number)
        .max()
        .map_or(0, |max| max + 1)
}
