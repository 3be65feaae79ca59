use std::fmt::{Display, Formatter, Result as FmtResult};

/// Availability of a catalogued book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EntryState {
    /// On the shelf, can be borrowed.
    #[default]
    Available,
    /// Lent out, must be returned before it can be borrowed again.
    CheckedOut,
}
impl EntryState {
    /// Returns the display string for the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryState::Available => "Available",
            EntryState::CheckedOut => "Checked out",
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, EntryState::Available)
    }
}
impl Display for EntryState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// A single catalog record.
///
/// Entries are built by the caller and handed to
/// [`Catalog::add`](crate::Catalog::add). After insertion the only way to
/// change an entry is through [`borrow`](crate::Catalog::borrow) and
/// [`give_back`](crate::Catalog::give_back).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    /// Book title
    pub title: String,
    /// Author (or other creator) of the book
    pub creator: String,
    /// Unique key within a catalog, e.g. an ISBN
    pub identifier: String,
    /// Current availability
    #[cfg_attr(feature = "serde", serde(default))]
    pub state: EntryState,
}
impl Entry {
    /// Create a new, available entry. The identifier is trimmed.
    pub fn new(title: impl Into<String>, creator: impl Into<String>, identifier: impl AsRef<str>) -> Self {
        Self {
            title: title.into(),
            creator: creator.into(),
            identifier: identifier.as_ref().trim().to_string(),
            state: EntryState::Available,
        }
    }

    pub fn with_state(mut self, state: EntryState) -> Self {
        self.state = state;
        self
    }

    /// Case-insensitive substring match against title or creator.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.creator.to_lowercase().contains(needle)
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} by {} (ISBN: {}) - {}", self.title, self.creator, self.identifier, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_new_entry_is_available() {
        let entry = Entry::new("The Great Gatsby", "F. Scott Fitzgerald", "1234567890");
        assert_eq!(entry.state, EntryState::Available);
    }

    #[test]
    fn test_identifier_is_trimmed() {
        let entry = Entry::new("X", "Y", "  111\n");
        assert_eq!(entry.identifier, "111");
    }

    #[rstest]
    #[case(EntryState::Available, "The Great Gatsby by F. Scott Fitzgerald (ISBN: 1234567890) - Available")]
    #[case(EntryState::CheckedOut, "The Great Gatsby by F. Scott Fitzgerald (ISBN: 1234567890) - Checked out")]
    fn test_display(#[case] state: EntryState, #[case] expected: &str) {
        let entry = Entry::new("The Great Gatsby", "F. Scott Fitzgerald", "1234567890").with_state(state);
        assert_eq!(entry.to_string(), expected);
    }

    #[rstest]
    #[case("gatsby", true)]
    #[case("fitzgerald", true)]
    #[case("great g", true)]
    #[case("mockingbird", false)]
    #[case("", true)]
    fn test_matches(#[case] needle: &str, #[case] expected: bool) {
        let entry = Entry::new("The Great Gatsby", "F. Scott Fitzgerald", "1234567890");
        assert_eq!(entry.matches(needle), expected);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_defaults_to_available() {
        let entry: Entry =
            serde_json::from_str(r#"{"title": "X", "creator": "Y", "identifier": "111"}"#).unwrap();
        assert_eq!(entry, Entry::new("X", "Y", "111"));

        let entry: Entry =
            serde_json::from_str(r#"{"title": "X", "creator": "Y", "identifier": "111", "state": "checked_out"}"#)
                .unwrap();
        assert_eq!(entry.state, EntryState::CheckedOut);
    }
}
