use tally_kernel::safe_nanoid;
use tally_kernel::security::resource::ResourceGuard;

#[test]
fn resource_guard_accepts_only_safe_ids() {
    let id = safe_nanoid!();
    assert!(ResourceGuard::verify(&id).is_ok());

    assert!(ResourceGuard::verify("user:123").is_err());
    assert!(ResourceGuard::verify("OOOOOOOOOOOO").is_err());
    assert!(ResourceGuard::verify("23456789ABCD").is_ok());
}
