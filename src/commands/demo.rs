use crate::commands::catalog::{ShellCommand, execute};
use crate::error::Result;
use libris_catalog::Catalog;
use std::io::Write;

const GATSBY: &str = "1234567890";

/// The sample scenario: two books, a search, and a borrow/return round trip.
fn script() -> Vec<ShellCommand> {
    vec![
        ShellCommand::Add {
            title: "The Great Gatsby".into(),
            creator: "F. Scott Fitzgerald".into(),
            identifier: GATSBY.into(),
        },
        ShellCommand::Add {
            title: "To Kill a Mockingbird".into(),
            creator: "Harper Lee".into(),
            identifier: "0987654321".into(),
        },
        ShellCommand::Search { term: "gatsby".into() },
        ShellCommand::Borrow { identifier: GATSBY.into() },
        ShellCommand::Return { identifier: GATSBY.into() },
    ]
}

pub fn run(catalog: &mut Catalog, mut out: impl Write) -> Result<()> {
    for command in script() {
        tracing::debug!(?command, "Demo step");
        execute(catalog, command, &mut out)?;
    }
    Ok(())
}
