//! Constant-time comparison tests for the digest newtypes.

use urna_core::foundation::{Digest, ReportHash, SealHash, VoteHash};

#[test]
fn seal_hash_ct_eq_correctness() {
    let a = SealHash::from([0xABu8; 32]);
    let b = SealHash::from([0xABu8; 32]);
    let c = SealHash::from([0xCDu8; 32]);

    assert!(a.ct_eq(&b), "equal hashes should return true");
    assert!(!a.ct_eq(&c), "different hashes should return false");
}

#[test]
fn ct_eq_detects_single_bit_difference() {
    let base = [0x5Au8; 32];
    let mut flipped = base;
    flipped[31] ^= 0x01;
    assert!(!VoteHash::from(base).ct_eq(&VoteHash::from(flipped)));
    assert!(!Digest::from(base).ct_eq(&Digest::from(flipped)));
}

#[test]
fn ct_eq_with_default_values() {
    assert!(ReportHash::default().ct_eq(&ReportHash::default()));
    assert!(!ReportHash::default().ct_eq(&ReportHash::from([0xFFu8; 32])));
}
