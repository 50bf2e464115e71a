//! JSON snapshots of the ledger, one file per collection

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Serialize};

use super::state::LibraryState;
use crate::{
    error::{AppError, AppResult},
    models::{Book, Loan, Member, User},
};

/// Persisted collections and their storage keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Books,
    Members,
    Loans,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Users,
        Collection::Books,
        Collection::Members,
        Collection::Loans,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Collection::Users => "ls_users",
            Collection::Books => "ls_books",
            Collection::Members => "ls_members",
            Collection::Loans => "ls_loans",
        }
    }
}

/// Snapshot location; `dir: None` disables persistence
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    dir: Option<PathBuf>,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn in_memory() -> Self {
        Self { dir: None }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    fn path_for(dir: &Path, collection: Collection) -> PathBuf {
        dir.join(format!("{}.json", collection.key()))
    }

    /// Load every collection. Missing files load as empty collections.
    pub async fn load(&self) -> AppResult<LibraryState> {
        let Some(dir) = self.dir.as_deref() else {
            return Ok(LibraryState::default());
        };

        let state = LibraryState {
            users: load_collection(dir, Collection::Users, |u: &User| u.id).await?,
            books: load_collection(dir, Collection::Books, |b: &Book| b.id).await?,
            members: load_collection(dir, Collection::Members, |m: &Member| m.id).await?,
            loans: load_collection(dir, Collection::Loans, |l: &Loan| l.id).await?,
        };

        tracing::info!(
            "Loaded snapshot from {}: {} users, {} books, {} members, {} loans",
            dir.display(),
            state.users.len(),
            state.books.len(),
            state.members.len(),
            state.loans.len()
        );

        Ok(state)
    }

    /// Write the given collections of `state` as one unit.
    ///
    /// Every file is staged as `<key>.json.tmp` first. Each target is then
    /// moved aside to `<key>.json.bak` and replaced by its staged copy. If any
    /// step fails, the targets already replaced are restored from their
    /// backups and the staged files are removed, so the directory holds the
    /// previous snapshot again.
    pub async fn save(&self, state: &LibraryState, collections: &[Collection]) -> AppResult<()> {
        let Some(dir) = self.dir.as_deref() else {
            return Ok(());
        };
        if collections.is_empty() {
            return Ok(());
        }

        let mut bodies = Vec::with_capacity(collections.len());
        for &collection in collections {
            let body = match collection {
                Collection::Users => encode(&state.users)?,
                Collection::Books => encode(&state.books)?,
                Collection::Members => encode(&state.members)?,
                Collection::Loans => encode(&state.loans)?,
            };
            bodies.push((Self::path_for(dir, collection), body));
        }

        tokio::fs::create_dir_all(dir).await?;

        let mut staged = Vec::with_capacity(bodies.len());
        for (target, body) in bodies {
            let tmp = target.with_extension("json.tmp");
            let written = tokio::fs::write(&tmp, body).await;
            staged.push((tmp, target));
            if let Err(e) = written {
                discard(&staged).await;
                return Err(e.into());
            }
        }

        let mut swaps = Vec::with_capacity(staged.len());
        for (tmp, target) in &staged {
            if let Err(e) = swap_in(tmp, target, &mut swaps).await {
                tracing::warn!(
                    "Snapshot write to {} failed, restoring previous files: {}",
                    target.display(),
                    e
                );
                roll_back(&swaps).await;
                discard(&staged).await;
                return Err(e.into());
            }
        }

        for swap in &swaps {
            if let Some(backup) = &swap.backup {
                if let Err(e) = tokio::fs::remove_file(backup).await {
                    tracing::warn!("Could not remove {}: {}", backup.display(), e);
                }
            }
        }

        tracing::debug!(
            "Snapshot written: {}",
            collections
                .iter()
                .map(Collection::key)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(())
    }
}

/// One target replaced during [`SnapshotStore::save`]
struct Swap {
    target: PathBuf,
    /// Where the previous file was moved, if there was one
    backup: Option<PathBuf>,
    /// Whether the staged file reached `target`
    installed: bool,
}

async fn swap_in(tmp: &Path, target: &Path, swaps: &mut Vec<Swap>) -> std::io::Result<()> {
    let backup = if tokio::fs::try_exists(target).await? {
        let backup = target.with_extension("json.bak");
        tokio::fs::rename(target, &backup).await?;
        Some(backup)
    } else {
        None
    };
    swaps.push(Swap {
        target: target.to_path_buf(),
        backup,
        installed: false,
    });

    tokio::fs::rename(tmp, target).await?;
    if let Some(swap) = swaps.last_mut() {
        swap.installed = true;
    }
    Ok(())
}

/// Put back every target touched so far, newest first
async fn roll_back(swaps: &[Swap]) {
    for swap in swaps.iter().rev() {
        let restored = match (&swap.backup, swap.installed) {
            (Some(backup), _) => tokio::fs::rename(backup, &swap.target).await,
            (None, true) => tokio::fs::remove_file(&swap.target).await,
            (None, false) => Ok(()),
        };
        if let Err(e) = restored {
            tracing::error!("Could not restore {}: {}", swap.target.display(), e);
        }
    }
}

/// Remove staged files that never reached their target
async fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        match tokio::fs::remove_file(tmp).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Could not remove {}: {}", tmp.display(), e),
        }
    }
}

fn encode<K, V: Serialize>(records: &IndexMap<K, V>) -> AppResult<Vec<u8>> {
    let values: Vec<&V> = records.values().collect();
    Ok(serde_json::to_vec_pretty(&values)?)
}

async fn load_collection<K, V, F>(
    dir: &Path,
    collection: Collection,
    key_of: F,
) -> AppResult<IndexMap<K, V>>
where
    K: std::hash::Hash + Eq + std::fmt::Display,
    V: DeserializeOwned,
    F: Fn(&V) -> K,
{
    let path = SnapshotStore::path_for(dir, collection);
    let body = match tokio::fs::read(&path).await {
        Ok(body) => body,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(IndexMap::new()),
        Err(e) => return Err(e.into()),
    };

    let records: Vec<V> = serde_json::from_slice(&body)?;
    let mut map = IndexMap::with_capacity(records.len());
    for record in records {
        let key = key_of(&record);
        if map.contains_key(&key) {
            return Err(AppError::Internal(format!(
                "Duplicate id {} in {}",
                key,
                collection.key()
            )));
        }
        map.insert(key, record);
    }
    Ok(map)
}
