use std::borrow::Cow;
use tally_derive::tally_error;

#[tally_error]
pub enum StoreError {
    #[error("I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Missing record{}: {message}", format_context(.context))]
    Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal store error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn open(fail: bool) -> Result<u8, std::io::Error> {
    if fail { Err(std::io::Error::other("denied")) } else { Ok(7) }
}

#[test]
fn source_errors_convert_with_question_mark() {
    fn run() -> Result<u8, StoreError> {
        Ok(open(true)?)
    }

    let err = run().unwrap_err();
    assert!(matches!(err, StoreError::Io { context: None, .. }));
    assert_eq!(err.to_string(), "I/O error: denied");
}

#[test]
fn context_is_attached_to_source_results() {
    let err = open(true).context("Opening todos.json").unwrap_err();
    assert_eq!(err.to_string(), "I/O error (Opening todos.json): denied");
}

#[test]
fn context_is_attached_to_own_results() {
    let res: Result<(), StoreError> =
        Err(StoreError::Missing { message: "todo".into(), context: None });
    let err = res.context("Updating item").unwrap_err();
    assert_eq!(err.to_string(), "Missing record (Updating item): todo");
}

#[test]
fn strings_become_internal_errors() {
    let from_static: StoreError = "boom".into();
    let from_owned: StoreError = String::from("bang").into();

    assert!(matches!(from_static, StoreError::Internal { .. }));
    assert_eq!(from_owned.to_string(), "Internal store error: bang");
}

#[test]
fn ok_values_pass_through() {
    assert_eq!(open(false).context("unused").unwrap(), 7);
}

#[test]
fn tally_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/error_pass.rs");
}
