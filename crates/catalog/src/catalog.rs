use crate::entry::{Entry, EntryState};
use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use indexmap::IndexMap;
use tracing::instrument;

/// Result of a successful [`Catalog::borrow`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowOutcome {
    /// The entry was available and is now checked out.
    Borrowed,
    /// The entry was already checked out; nothing changed.
    Unavailable,
}
impl BorrowOutcome {
    /// Returns `true` if the call left the catalog unchanged.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

/// Result of a successful [`Catalog::give_back`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// The entry was checked out and is available again.
    Returned,
    /// The entry was never checked out; nothing changed.
    NotCheckedOut,
}
impl ReturnOutcome {
    /// Returns `true` if the call left the catalog unchanged.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NotCheckedOut)
    }
}

/// An in-memory collection of [`Entry`] values keyed by identifier.
///
/// Iteration (and therefore [`search`](Self::search) result order) follows
/// insertion order. Removing an entry keeps the remaining entries in their
/// original order.
///
/// The catalog has no internal locking: mutations take `&mut self`. Callers
/// sharing a catalog between tasks must wrap it in their own lock.
///
/// # Examples
///
/// ```
/// use libris_catalog::{BorrowOutcome, Catalog, Entry, EntryState, ReturnOutcome};
///
/// let mut catalog = Catalog::new();
/// catalog.add(Entry::new("X", "Y", "111")).unwrap();
///
/// assert_eq!(catalog.borrow("111").unwrap(), BorrowOutcome::Borrowed);
/// assert_eq!(catalog.borrow("111").unwrap(), BorrowOutcome::Unavailable);
/// assert_eq!(catalog.get("111").unwrap().state, EntryState::CheckedOut);
///
/// assert_eq!(catalog.give_back("111").unwrap(), ReturnOutcome::Returned);
/// assert_eq!(catalog.get("111").unwrap().state, EntryState::Available);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: IndexMap<String, Entry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog by [`add`](Self::add)ing every entry in order.
    ///
    /// Entries that fail to insert (duplicates, empty identifiers) are
    /// skipped; the first entry for an identifier wins. The returned errors
    /// are in input order.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> (Self, Vec<crate::error::Error>) {
        let mut catalog = Self::new();
        let rejected = entries.into_iter().filter_map(|entry| catalog.add(entry).err()).collect();
        (catalog, rejected)
    }

    /// Insert an entry.
    ///
    /// Returns [`DuplicateIdentifier`](ErrorKind::DuplicateIdentifier) if an
    /// entry with the same identifier already exists (the existing entry is
    /// left untouched), or [`InvalidIdentifier`](ErrorKind::InvalidIdentifier)
    /// if the identifier is blank.
    #[instrument(skip_all, fields(identifier = %entry.identifier))]
    pub fn add(&mut self, mut entry: Entry) -> Result<()> {
        let identifier = entry.identifier.trim();
        if identifier.is_empty() {
            exn::bail!(ErrorKind::InvalidIdentifier(entry.identifier));
        }
        if self.entries.contains_key(identifier) {
            exn::bail!(ErrorKind::DuplicateIdentifier(identifier.to_string()));
        }
        entry.identifier = identifier.to_string();
        tracing::info!(title = %entry.title, "Entry added to catalog");
        self.entries.insert(entry.identifier.clone(), entry);
        Ok(())
    }

    /// Remove an entry, returning it.
    ///
    /// Returns [`NotFound`](ErrorKind::NotFound) if nothing is catalogued
    /// under `identifier`; the catalog is unchanged.
    #[instrument(skip(self))]
    pub fn remove(&mut self, identifier: &str) -> Result<Entry> {
        let entry = self
            .entries
            .shift_remove(identifier.trim())
            .ok_or_raise(|| ErrorKind::NotFound(identifier.to_string()))?;
        tracing::info!(title = %entry.title, "Entry removed from catalog");
        Ok(entry)
    }

    /// Entries whose title or creator contains `term`, ignoring case.
    ///
    /// No match is an empty list, not an error.
    #[instrument(level = "debug", skip(self))]
    pub fn search(&self, term: &str) -> Vec<&Entry> {
        let needle = term.to_lowercase();
        let results: Vec<&Entry> = self.entries.values().filter(|entry| entry.matches(&needle)).collect();
        tracing::debug!(results = results.len(), "Catalog searched");
        results
    }

    /// Check an entry out.
    ///
    /// Borrowing an entry that is already checked out is a successful no-op
    /// reported as [`BorrowOutcome::Unavailable`].
    #[instrument(skip(self))]
    pub fn borrow(&mut self, identifier: &str) -> Result<BorrowOutcome> {
        let entry = self.entry_mut(identifier)?;
        Ok(match entry.state {
            EntryState::Available => {
                entry.state = EntryState::CheckedOut;
                tracing::info!(title = %entry.title, "Entry borrowed");
                BorrowOutcome::Borrowed
            },
            EntryState::CheckedOut => {
                tracing::debug!(title = %entry.title, "Entry is not available");
                BorrowOutcome::Unavailable
            },
        })
    }

    /// Check an entry back in. (`return` is a keyword.)
    ///
    /// Returning an entry that is already available is a successful no-op
    /// reported as [`ReturnOutcome::NotCheckedOut`].
    #[instrument(skip(self))]
    pub fn give_back(&mut self, identifier: &str) -> Result<ReturnOutcome> {
        let entry = self.entry_mut(identifier)?;
        Ok(match entry.state {
            EntryState::CheckedOut => {
                entry.state = EntryState::Available;
                tracing::info!(title = %entry.title, "Entry returned");
                ReturnOutcome::Returned
            },
            EntryState::Available => {
                tracing::debug!(title = %entry.title, "Entry was not checked out");
                ReturnOutcome::NotCheckedOut
            },
        })
    }

    pub fn get(&self, identifier: &str) -> Option<&Entry> {
        self.entries.get(identifier.trim())
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    // Never exposed publicly: the map key must always equal the entry's
    // identifier, and only state may change in place.
    fn entry_mut(&mut self, identifier: &str) -> Result<&mut Entry> {
        self.entries.get_mut(identifier.trim()).ok_or_raise(|| ErrorKind::NotFound(identifier.to_string()))
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Entry;
    type IntoIter = indexmap::map::Values<'a, String, Entry>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
