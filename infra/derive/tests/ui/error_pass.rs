use std::borrow::Cow;
use tally_derive::tally_error;

#[tally_error]
pub enum SnapshotError {
    #[error("I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), SnapshotError> {
    Err(std::io::Error::other("disk")).context("Reading snapshot")
}

fn main() {
    let _ = read();
}
