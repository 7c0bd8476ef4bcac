pub mod cipher;
pub mod digests;

pub use cipher::VoteCrypto;
pub use digests::{canonical_instant, creation_hash, device_fingerprint, receipt_hash, report_content_hash, vote_hash, vote_signature};
