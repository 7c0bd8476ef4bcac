use crate::domain::ballot::{Origin, ResolvedSelection, SecureVote, VotePayload};
use crate::domain::crypto::{creation_hash, device_fingerprint, vote_hash, vote_signature, VoteCrypto};
use crate::domain::election::Voter;
use crate::foundation::{ElectionId, SealHash, UrnaError, VoteTransactionId};
use chrono::{DateTime, Utc};

/// Values shared by every row of one ballot.
pub struct CastContext<'a> {
    pub tx_id: &'a VoteTransactionId,
    pub election_id: ElectionId,
    pub voter: &'a Voter,
    pub seal_hash: SealHash,
    pub cast_at: DateTime<Utc>,
    pub origin: &'a Origin,
    pub encrypted_justification: Option<Vec<u8>>,
}

pub fn build_secure_vote(crypto: &VoteCrypto, ctx: &CastContext<'_>, selection: &ResolvedSelection) -> Result<SecureVote, UrnaError> {
    let payload = VotePayload {
        position_id: selection.position.id,
        candidate_id: selection.choice.candidate_id(),
        kind: selection.choice.kind(),
        weight: ctx.voter.vote_weight,
    };
    let encrypted_payload = crypto.encrypt_vote_payload(&payload, &ctx.seal_hash)?;
    let hash = vote_hash(ctx.tx_id, ctx.voter.id, selection.choice.digest_candidate_id(), &ctx.cast_at);
    let signature = vote_signature(&hash, &encrypted_payload);
    Ok(SecureVote {
        vote_transaction_id: ctx.tx_id.clone(),
        election_id: ctx.election_id,
        position_id: selection.position.id,
        voter_id: ctx.voter.id,
        kind: payload.kind,
        encrypted_payload,
        vote_hash: hash,
        vote_signature: signature,
        creation_hash: creation_hash(ctx.tx_id, ctx.voter.id, ctx.election_id, &ctx.cast_at),
        device_fingerprint: device_fingerprint(ctx.origin.user_agent.as_deref(), ctx.origin.address.as_deref()),
        seal_hash_at_cast: ctx.seal_hash,
        encrypted_justification: ctx.encrypted_justification.clone(),
        cast_at: ctx.cast_at,
        origin_address: ctx.origin.address.clone(),
        origin_user_agent: ctx.origin.user_agent.clone(),
    })
}

/// Recomputes the signature from the stored hash and ciphertext.
pub fn signature_matches(vote: &SecureVote) -> bool {
    vote_signature(&vote.vote_hash, &vote.encrypted_payload).ct_eq(&vote.vote_signature)
}
