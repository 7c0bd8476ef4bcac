use crate::application::ElectionCore;
use crate::domain::ballot::ResolvedSelection;
use crate::domain::election::{Election, Voter};
use crate::domain::{Actor, AuditEvent, Receipt};
use crate::foundation::{ReceiptToken, UrnaError, VoteTransactionId};
use chrono::{DateTime, Utc};
use log::debug;

impl ElectionCore {
    /// Builds the receipt body for a ballot about to be committed. It is persisted by the
    /// ballot commit itself, so it never exists without its votes.
    pub(crate) fn prepare_receipt(
        &self,
        tx_id: &VoteTransactionId,
        voter: &Voter,
        election: &Election,
        selections: &[ResolvedSelection],
        cast_at: DateTime<Utc>,
    ) -> Receipt {
        let token = ReceiptToken::generate(self.settings.receipt_token_bytes);
        Receipt::build(token, tx_id, voter, election, selections, cast_at)
    }

    /// Records issuance of a receipt whose ballot has committed.
    pub(crate) fn receipt_issued(&self, voter: &Voter, receipt: &Receipt) {
        debug!("receipt issued election_id={} tx_id={} details={}", receipt.election_id, receipt.vote_transaction_id, receipt.details.len());
        self.record_audit(
            Actor::Voter(voter.id),
            receipt.election_id,
            AuditEvent::ReceiptIssued {
                vote_transaction_id: receipt.vote_transaction_id.to_string(),
                receipt_hash: receipt.receipt_hash.to_hex(),
            },
        );
    }

    pub fn get_receipt(&self, token: &ReceiptToken) -> Result<Receipt, UrnaError> {
        let token = ReceiptToken::new(token.trim().to_ascii_uppercase());
        self.store.get_receipt(&token)?.ok_or(UrnaError::ReceiptNotFound)?.receipt()
    }
}
