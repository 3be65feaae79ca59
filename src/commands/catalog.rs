//! Line-oriented catalog shell.
//!
//! Each input line is split shell-style (so quoted titles work) and parsed
//! with clap:
//!
//! ```text
//! add "The Great Gatsby" "F. Scott Fitzgerald" 1234567890
//! search gatsby
//! borrow 1234567890
//! return 1234567890
//! remove 1234567890
//! list
//! ```

use crate::error::{ErrorKind, Result};
use clap::{Parser, Subcommand};
use exn::ResultExt;
use libris_catalog::error::ErrorKind as CatalogErrorKind;
use libris_catalog::{BorrowOutcome, Catalog, Entry, ReturnOutcome};
use std::io::{BufRead, Write};

#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true, disable_help_subcommand = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub(crate) enum ShellCommand {
    /// Add a book.
    Add { title: String, creator: String, identifier: String },
    /// Remove a book by identifier.
    Remove { identifier: String },
    /// Find books by title or author (case-insensitive).
    Search { term: String },
    /// Check a book out.
    Borrow { identifier: String },
    /// Check a book back in.
    Return { identifier: String },
    /// Show every book.
    List,
    /// Leave the shell.
    #[command(alias = "exit")]
    Quit,
}

/// Read commands from `input` until end of input (or `quit`), writing
/// responses to `output`. Parse errors are reported and the shell carries on.
pub fn run(catalog: &mut Catalog, input: impl BufRead, mut output: impl Write) -> Result<()> {
    for line in input.lines() {
        let line = line.or_raise(|| ErrorKind::Io)?;
        let words = match shell_words::split(&line) {
            Ok(words) if words.is_empty() => continue,
            Ok(words) => words,
            Err(e) => {
                writeln!(output, "Error: {e}").or_raise(|| ErrorKind::Io)?;
                continue;
            },
        };
        if matches!(words[0].as_str(), "help" | "?") {
            writeln!(output, "{}", help()).or_raise(|| ErrorKind::Io)?;
            continue;
        }
        match ShellLine::try_parse_from(words) {
            Ok(ShellLine { command: ShellCommand::Quit }) => break,
            Ok(ShellLine { command }) => execute(catalog, command, &mut output)?,
            Err(e) => write!(output, "{e}").or_raise(|| ErrorKind::Io)?,
        }
    }
    output.flush().or_raise(|| ErrorKind::Io)
}

fn help() -> String {
    use clap::CommandFactory;
    ShellLine::command().render_help().to_string()
}

/// Apply one command and describe the result. Catalog faults are reported to
/// the user, not returned: the shell keeps going.
pub(crate) fn execute(catalog: &mut Catalog, command: ShellCommand, out: &mut impl Write) -> Result<()> {
    let written = match command {
        ShellCommand::Add { title, creator, identifier } => {
            let entry = Entry::new(title, creator, identifier);
            let title = entry.title.clone();
            match catalog.add(entry) {
                Ok(()) => writeln!(out, "Book '{title}' added to the library."),
                Err(e) => writeln!(out, "Error: {}", describe(&e)),
            }
        },
        ShellCommand::Remove { identifier } => match catalog.remove(&identifier) {
            Ok(entry) => writeln!(out, "Book '{}' removed from the library.", entry.title),
            Err(e) => writeln!(out, "Error: {}", describe(&e)),
        },
        ShellCommand::Search { term } => {
            let results = catalog.search(&term);
            match results.is_empty() {
                true => writeln!(out, "No books found."),
                false => {
                    std::iter::once(writeln!(out, "Search Results:"))
                        .chain(results.iter().map(|e| writeln!(out, "{e}")))
                        .collect()
                },
            }
        },
        ShellCommand::Borrow { identifier } => match catalog.borrow(&identifier) {
            Ok(outcome) => {
                let title = title_of(catalog, &identifier);
                match outcome {
                    BorrowOutcome::Borrowed => writeln!(out, "You have borrowed '{title}'."),
                    BorrowOutcome::Unavailable => writeln!(out, "Book '{title}' is not available."),
                }
            },
            Err(e) => writeln!(out, "Error: {}", describe(&e)),
        },
        ShellCommand::Return { identifier } => match catalog.give_back(&identifier) {
            Ok(outcome) => {
                let title = title_of(catalog, &identifier);
                match outcome {
                    ReturnOutcome::Returned => writeln!(out, "You have returned '{title}'."),
                    ReturnOutcome::NotCheckedOut => writeln!(out, "Book '{title}' was not checked out."),
                }
            },
            Err(e) => writeln!(out, "Error: {}", describe(&e)),
        },
        ShellCommand::List => match catalog.is_empty() {
            true => writeln!(out, "The library is empty."),
            false => catalog.iter().try_for_each(|e| writeln!(out, "{e}")),
        },
        ShellCommand::Quit => Ok(()),
    };
    written.or_raise(|| ErrorKind::Io)
}

fn title_of(catalog: &Catalog, identifier: &str) -> String {
    catalog.get(identifier).map(|e| e.title.clone()).unwrap_or_default()
}

fn describe(err: &libris_catalog::error::Error) -> String {
    match &**err {
        CatalogErrorKind::DuplicateIdentifier(id) => format!("Book with ISBN {id} already exists in the library."),
        CatalogErrorKind::NotFound(id) => format!("Book with ISBN {id} not found in the library."),
        other => other.to_string(),
    }
}
