/// Helper to build storage keys consistently.
pub struct KeyBuilder {
    buf: Vec<u8>,
}

impl KeyBuilder {
    pub fn with_capacity(cap: usize) -> Self {
        Self { buf: Vec::with_capacity(cap) }
    }

    pub fn str(mut self, value: &str) -> Self {
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    pub fn u64_be(mut self, value: u64) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn sep(mut self) -> Self {
        self.buf.push(b':');
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

pub const SCHEMA_VERSION: u32 = 1;
pub const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

pub const CF_DEFAULT: &str = "default";
pub const CF_METADATA: &str = "metadata";
pub const CF_ELECTION: &str = "election";
pub const CF_POSITION: &str = "position";
pub const CF_CANDIDATE: &str = "candidate";
pub const CF_VOTER: &str = "voter";
pub const CF_ADMIN: &str = "admin";
pub const CF_SEAL: &str = "seal";
/// Vote rows keyed `election:tx:position`.
pub const CF_VOTE: &str = "vote";
/// Transaction index `tx:position` -> vote key.
pub const CF_VOTE_TX: &str = "vote_tx";
/// Uniqueness key `election:voter` -> tx id.
pub const CF_BALLOT_KEY: &str = "ballot_key";
pub const CF_RECEIPT: &str = "receipt";
pub const CF_REPORT: &str = "report";
/// Zero-report uniqueness key `election` -> report id.
pub const CF_ZERO_REPORT: &str = "zero_report";

pub const ALL_CFS: &[&str] = &[
    CF_DEFAULT,
    CF_METADATA,
    CF_ELECTION,
    CF_POSITION,
    CF_CANDIDATE,
    CF_VOTER,
    CF_ADMIN,
    CF_SEAL,
    CF_VOTE,
    CF_VOTE_TX,
    CF_BALLOT_KEY,
    CF_RECEIPT,
    CF_REPORT,
    CF_ZERO_REPORT,
];
