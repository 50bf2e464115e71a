//! Repository layer: the in-memory ledger and its snapshots

pub mod books;
pub mod loans;
pub mod members;
pub mod snapshot;
pub mod state;
pub mod users;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::AppResult;
pub use snapshot::{Collection, SnapshotStore};
pub use state::{AvailabilityDrift, LibraryState};

/// Shared handle to the ledger.
///
/// Every write runs under the single write guard: the closure edits a draft
/// copy of the state, the touched collections are persisted, and only then is
/// the draft swapped in. A failing closure or snapshot discards the draft.
#[derive(Clone)]
pub struct Ledger {
    state: Arc<RwLock<LibraryState>>,
    snapshots: Arc<SnapshotStore>,
}

impl Ledger {
    fn new(state: LibraryState, snapshots: SnapshotStore) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            snapshots: Arc::new(snapshots),
        }
    }

    /// Run a read-only closure against the current state
    pub async fn read<T>(&self, f: impl FnOnce(&LibraryState) -> T) -> T {
        let guard = self.state.read().await;
        f(&guard)
    }

    /// Apply `f` atomically and persist `touched`
    pub async fn commit<T>(
        &self,
        touched: &[Collection],
        f: impl FnOnce(&mut LibraryState) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut guard = self.state.write().await;
        let mut draft = guard.clone();
        let out = f(&mut draft)?;
        self.snapshots.save(&draft, touched).await?;
        *guard = draft;
        Ok(out)
    }

    /// Like [`Ledger::commit`], but `Ok(None)` means nothing changed: no
    /// snapshot is written and the state is left as is.
    pub async fn commit_if<T>(
        &self,
        touched: &[Collection],
        f: impl FnOnce(&mut LibraryState) -> AppResult<Option<T>>,
    ) -> AppResult<Option<T>> {
        let mut guard = self.state.write().await;
        let mut draft = guard.clone();
        let Some(out) = f(&mut draft)? else {
            return Ok(None);
        };
        self.snapshots.save(&draft, touched).await?;
        *guard = draft;
        Ok(Some(out))
    }
}

/// Main repository struct holding the ledger handle
#[derive(Clone)]
pub struct Repository {
    pub ledger: Ledger,
    pub books: books::BooksRepository,
    pub members: members::MembersRepository,
    pub loans: loans::LoansRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Open the ledger from its snapshot directory (or empty, in memory)
    pub async fn open(snapshots: SnapshotStore) -> AppResult<Self> {
        let state = snapshots.load().await?;

        for drift in state.availability_drift() {
            tracing::warn!(
                "Book {} has available={} but quantity minus open loans is {}",
                drift.book_id,
                drift.actual,
                drift.expected
            );
        }

        Ok(Self::with_state(state, snapshots))
    }

    /// Empty ledger without persistence
    pub fn in_memory() -> Self {
        Self::with_state(LibraryState::default(), SnapshotStore::in_memory())
    }

    fn with_state(state: LibraryState, snapshots: SnapshotStore) -> Self {
        let ledger = Ledger::new(state, snapshots);
        Self {
            books: books::BooksRepository::new(ledger.clone()),
            members: members::MembersRepository::new(ledger.clone()),
            loans: loans::LoansRepository::new(ledger.clone()),
            users: users::UsersRepository::new(ledger.clone()),
            ledger,
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.ledger.read(LibraryState::is_empty).await
    }

    /// Where this ledger's snapshots live
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.ledger.snapshots
    }

    /// Copy of the whole state for projections
    pub async fn snapshot(&self) -> LibraryState {
        self.ledger.read(LibraryState::clone).await
    }

    /// Replace the whole state (seeding, imports) and persist every collection
    pub async fn replace_all(&self, state: LibraryState) -> AppResult<()> {
        self.ledger
            .commit(&Collection::ALL, move |current| {
                *current = state;
                Ok(())
            })
            .await
    }
}
