use crate::foundation::util::encoding::decode_hex;
use crate::foundation::{MIN_RECEIPT_TOKEN_BYTES, SECRET_KEY_SIZE};
use crate::infrastructure::config::types::{AppConfig, StorageBackend};

const MAX_RECEIPT_TOKEN_BYTES: usize = 128;
const MAX_JUSTIFICATION_LEN: usize = 64 * 1024;

impl AppConfig {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let secret = self.crypto.vote_secret_hex.trim();
        if secret.is_empty() {
            errors.push("crypto.vote_secret_hex is required".to_string());
        } else {
            let stripped = secret.strip_prefix("0x").unwrap_or(secret);
            match decode_hex(stripped) {
                Ok(bytes) if bytes.len() == SECRET_KEY_SIZE => {}
                Ok(bytes) => errors.push(format!("crypto.vote_secret_hex must be {} bytes, got {}", SECRET_KEY_SIZE, bytes.len())),
                Err(_) => errors.push("crypto.vote_secret_hex is not valid hex".to_string()),
            }
        }

        if self.voting.receipt_token_bytes < MIN_RECEIPT_TOKEN_BYTES {
            errors.push(format!("voting.receipt_token_bytes must be >= {}", MIN_RECEIPT_TOKEN_BYTES));
        }
        if self.voting.receipt_token_bytes > MAX_RECEIPT_TOKEN_BYTES {
            errors.push(format!("voting.receipt_token_bytes should not exceed {}", MAX_RECEIPT_TOKEN_BYTES));
        }
        if self.voting.max_justification_len == 0 {
            errors.push("voting.max_justification_len must be > 0".to_string());
        }
        if self.voting.max_justification_len > MAX_JUSTIFICATION_LEN {
            errors.push(format!("voting.max_justification_len should not exceed {}", MAX_JUSTIFICATION_LEN));
        }

        if self.storage.backend == StorageBackend::Rocks && self.storage.data_dir.trim().is_empty() {
            errors.push("storage.data_dir is required for the rocks backend".to_string());
        }

        if let Some(path) = self.audit.file_path.as_ref() {
            if path.trim().is_empty() {
                errors.push("audit.file_path must not be blank when set".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
