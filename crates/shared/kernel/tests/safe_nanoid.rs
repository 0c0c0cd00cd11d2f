use tally_kernel::safe_nanoid;
use tally_kernel::{ID_LENGTH, SAFE_ALPHABET};

#[test]
fn generates_expected_length_and_charset() {
    let id = safe_nanoid!();
    assert_eq!(id.len(), ID_LENGTH);

    for ch in id.chars() {
        assert!(SAFE_ALPHABET.contains(&ch), "unexpected character in nanoid: {ch}");
    }
}

#[test]
fn custom_length() {
    let id = safe_nanoid!(20);
    assert_eq!(id.len(), 20);
}

#[test]
fn ids_do_not_repeat() {
    let ids: std::collections::HashSet<_> = (0..1000).map(|_| safe_nanoid!()).collect();
    assert_eq!(ids.len(), 1000);
}

#[test]
fn length_may_be_an_expression() {
    let base = 4;
    assert_eq!(safe_nanoid!(base * 2).len(), 8);
    assert_eq!(safe_nanoid!(tally_kernel::ID_LENGTH + 1).len(), ID_LENGTH + 1);
}
