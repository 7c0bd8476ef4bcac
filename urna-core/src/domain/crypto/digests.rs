//! Order-sensitive digests over `|`-joined fields, each namespaced by a version tag.

use crate::foundation::{Digest, ElectionId, ReceiptToken, ReportHash, VoteHash, VoteTransactionId, VoterId};
use chrono::{DateTime, SecondsFormat, Utc};

const VOTE_HASH_TAG: &str = "urna:vote:v1";
const VOTE_SIGNATURE_TAG: &str = "urna:vote-signature:v1";
const CREATION_HASH_TAG: &str = "urna:vote-creation:v1";
const DEVICE_FINGERPRINT_TAG: &str = "urna:device:v1";
const RECEIPT_HASH_TAG: &str = "urna:receipt:v1";
const REPORT_DOMAIN_V1: &[u8] = b"urna:report:v1:";

/// Instants enter digests as RFC 3339 UTC with nanosecond precision.
pub fn canonical_instant(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn digest_fields(tag: &str, fields: &[&str]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(tag.as_bytes());
    for field in fields {
        hasher.update(b"|");
        hasher.update(field.as_bytes());
    }
    *hasher.finalize().as_bytes()
}

pub fn vote_hash(tx_id: &VoteTransactionId, voter_id: VoterId, candidate_id_or_zero: u64, cast_at: &DateTime<Utc>) -> VoteHash {
    let voter = voter_id.to_string();
    let candidate = candidate_id_or_zero.to_string();
    let at = canonical_instant(cast_at);
    VoteHash::new(digest_fields(VOTE_HASH_TAG, &[tx_id.as_str(), &voter, &candidate, &at]))
}

/// Binds the vote hash to the exact ciphertext stored beside it.
pub fn vote_signature(vote_hash: &VoteHash, encrypted_payload: &[u8]) -> Digest {
    let hash = vote_hash.to_hex();
    let payload = hex::encode(encrypted_payload);
    Digest::new(digest_fields(VOTE_SIGNATURE_TAG, &[&hash, &payload]))
}

pub fn creation_hash(tx_id: &VoteTransactionId, voter_id: VoterId, election_id: ElectionId, cast_at: &DateTime<Utc>) -> Digest {
    let voter = voter_id.to_string();
    let election = election_id.to_string();
    let at = canonical_instant(cast_at);
    Digest::new(digest_fields(CREATION_HASH_TAG, &[tx_id.as_str(), &voter, &election, &at]))
}

/// Best-effort client correlation. Missing inputs hash as empty strings.
pub fn device_fingerprint(user_agent: Option<&str>, address: Option<&str>) -> Digest {
    Digest::new(digest_fields(DEVICE_FINGERPRINT_TAG, &[user_agent.unwrap_or_default(), address.unwrap_or_default()]))
}

pub fn receipt_hash(tx_id: &VoteTransactionId, token: &ReceiptToken, cast_at: &DateTime<Utc>) -> Digest {
    let at = canonical_instant(cast_at);
    Digest::new(digest_fields(RECEIPT_HASH_TAG, &[tx_id.as_str(), token.as_str(), &at]))
}

pub fn report_content_hash(canonical_body: &[u8]) -> ReportHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(REPORT_DOMAIN_V1);
    hasher.update(canonical_body);
    ReportHash::new(*hasher.finalize().as_bytes())
}
