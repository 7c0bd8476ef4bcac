use crate::domain::ballot::VotePayload;
use crate::foundation::util::encoding::parse_hex_32bytes;
use crate::foundation::{SealHash, UrnaError, AEAD_NONCE_SIZE, SECRET_KEY_SIZE};
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::XChaCha20Poly1305;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use zeroize::Zeroizing;

const PAYLOAD_KEY_CONTEXT: &str = "urna vote payload v1";
const JUSTIFICATION_KEY_CONTEXT: &str = "urna justification v1";
const JUSTIFICATION_AAD: &[u8] = b"urna:justification";

/// Symmetric vote cryptography keyed by a master secret.
///
/// Immutable once built; share it behind an `Arc`.
pub struct VoteCrypto {
    master: Zeroizing<[u8; SECRET_KEY_SIZE]>,
}

impl fmt::Debug for VoteCrypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoteCrypto").field("master", &"<redacted>").finish()
    }
}

impl VoteCrypto {
    pub fn new(master: [u8; SECRET_KEY_SIZE]) -> Self {
        Self { master: Zeroizing::new(master) }
    }

    pub fn from_hex(value: &str) -> Result<Self, UrnaError> {
        Ok(Self::new(parse_hex_32bytes(value)?))
    }

    /// Fresh random master secret.
    pub fn generate() -> Self {
        let mut master = [0u8; SECRET_KEY_SIZE];
        OsRng.fill_bytes(&mut master);
        Self::new(master)
    }

    fn payload_key(&self, seal_hash: &SealHash) -> Zeroizing<[u8; 32]> {
        let mut material = Zeroizing::new(Vec::with_capacity(SECRET_KEY_SIZE + 32));
        material.extend_from_slice(&self.master[..]);
        material.extend_from_slice(seal_hash.as_ref());
        Zeroizing::new(blake3::derive_key(PAYLOAD_KEY_CONTEXT, &material))
    }

    fn justification_key(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(blake3::derive_key(JUSTIFICATION_KEY_CONTEXT, &self.master[..]))
    }

    /// Encrypts a vote payload under a key derived from the seal hash; the seal hash is also bound as AAD.
    pub fn encrypt_vote_payload(&self, payload: &VotePayload, seal_hash: &SealHash) -> Result<Vec<u8>, UrnaError> {
        let plaintext = Zeroizing::new(serde_json::to_vec(payload)?);
        let key = self.payload_key(seal_hash);
        seal_bytes(&key, &plaintext, seal_hash.as_ref(), "encrypt_vote_payload")
    }

    pub fn decrypt_vote_payload(&self, blob: &[u8], seal_hash: &SealHash) -> Result<VotePayload, UrnaError> {
        let key = self.payload_key(seal_hash);
        let plaintext = Zeroizing::new(open_bytes(&key, blob, seal_hash.as_ref(), "decrypt_vote_payload")?);
        Ok(serde_json::from_slice(&plaintext)?)
    }

    /// Blank or whitespace-only text yields `None`.
    pub fn encrypt_justification(&self, text: Option<&str>) -> Result<Option<Vec<u8>>, UrnaError> {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        let key = self.justification_key();
        seal_bytes(&key, text.as_bytes(), JUSTIFICATION_AAD, "encrypt_justification").map(Some)
    }

    pub fn decrypt_justification(&self, blob: &[u8]) -> Result<String, UrnaError> {
        let key = self.justification_key();
        let plaintext = open_bytes(&key, blob, JUSTIFICATION_AAD, "decrypt_justification")?;
        String::from_utf8(plaintext).map_err(|err| UrnaError::crypto("decrypt_justification", err.to_string()))
    }
}

fn seal_bytes(key: &[u8; 32], plaintext: &[u8], aad: &[u8], operation: &str) -> Result<Vec<u8>, UrnaError> {
    let mut nonce = [0u8; AEAD_NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    let cipher = XChaCha20Poly1305::new(&(*key).into());
    let ciphertext = cipher
        .encrypt(&nonce.into(), Payload { msg: plaintext, aad })
        .map_err(|err| UrnaError::crypto(operation, err.to_string()))?;
    let mut out = Vec::with_capacity(AEAD_NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

fn open_bytes(key: &[u8; 32], blob: &[u8], aad: &[u8], operation: &str) -> Result<Vec<u8>, UrnaError> {
    if blob.len() <= AEAD_NONCE_SIZE {
        return Err(UrnaError::crypto(operation, format!("ciphertext too short: {} bytes", blob.len())));
    }
    let (nonce, ciphertext) = blob.split_at(AEAD_NONCE_SIZE);
    let mut nonce_bytes = [0u8; AEAD_NONCE_SIZE];
    nonce_bytes.copy_from_slice(nonce);
    let cipher = XChaCha20Poly1305::new(&(*key).into());
    cipher
        .decrypt(&nonce_bytes.into(), Payload { msg: ciphertext, aad })
        .map_err(|err| UrnaError::crypto(operation, format!("authentication failed: {}", err)))
}
