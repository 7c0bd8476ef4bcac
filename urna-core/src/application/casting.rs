use crate::application::ElectionCore;
use crate::domain::ballot::{build_secure_vote, validate_ballot, validate_justification, CastContext, Choice, Origin, ResolvedSelection, Selection};
use crate::domain::election::{Election, WindowPosition};
use crate::domain::{Actor, AuditEvent, BallotDefinition, Receipt, VoteReceipt};
use crate::foundation::{ElectionId, PositionId, SealHash, UrnaError, VoteTransactionId, VoterId};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingReadiness {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ElectionCore {
    /// Single-position ballot.
    pub fn cast_vote(
        &self,
        election_id: ElectionId,
        position_id: PositionId,
        choice: Choice,
        voter_id: VoterId,
        justification: Option<&str>,
        origin: &Origin,
    ) -> Result<Receipt, UrnaError> {
        self.cast_multiple_votes(election_id, &[Selection { position_id, choice }], voter_id, justification, origin)
    }

    /// Casts every selection as one all-or-nothing ballot. The receipt row commits together with
    /// the votes, so an error here always means nothing was recorded.
    pub fn cast_multiple_votes(
        &self,
        election_id: ElectionId,
        selections: &[Selection],
        voter_id: VoterId,
        justification: Option<&str>,
        origin: &Origin,
    ) -> Result<Receipt, UrnaError> {
        self.cast_ballot(election_id, selections, voter_id, justification, origin).map_err(|err| {
            warn!("vote rejected election_id={} voter_id={} code={:?} error={}", election_id, voter_id, err.code(), err);
            self.record_audit(
                Actor::Voter(voter_id),
                election_id,
                AuditEvent::VoteRejected { error_code: format!("{:?}", err.code()), reason: err.to_string() },
            );
            err
        })
    }

    pub fn has_voted(&self, voter_id: VoterId, election_id: ElectionId) -> Result<bool, UrnaError> {
        self.store.has_voted(voter_id, election_id)
    }

    /// Everything that would currently stop a ballot from being accepted, voter aside.
    pub fn validate_election_for_voting(&self, election_id: ElectionId) -> Result<VotingReadiness, UrnaError> {
        let definition = self.load_ballot(election_id)?;
        let election = &definition.election;
        let mut errors = Vec::new();

        if sealed_hash(election).is_err() {
            errors.push("election is not sealed".to_string());
        }
        if election.is_terminal() {
            errors.push(format!("election is {}", election.status));
        }
        match election.window.position_of(self.clock.now()) {
            Ok(WindowPosition::Open) => {}
            Ok(WindowPosition::NotStarted) => errors.push("voting has not started".to_string()),
            Ok(WindowPosition::Ended) => errors.push("voting has ended".to_string()),
            Err(err) => errors.push(err.to_string()),
        }
        let ordered = definition.ordered();
        if ordered.is_empty() {
            errors.push("election has no positions".to_string());
        }
        for (position, candidates) in &ordered {
            if !candidates.iter().any(|c| c.active) {
                errors.push(format!("position {} has no active candidates", position.id));
            }
        }

        debug!("voting readiness election_id={} errors={}", election_id, errors.len());
        Ok(VotingReadiness { is_valid: errors.is_empty(), errors })
    }

    fn cast_ballot(
        &self,
        election_id: ElectionId,
        selections: &[Selection],
        voter_id: VoterId,
        justification: Option<&str>,
        origin: &Origin,
    ) -> Result<Receipt, UrnaError> {
        let definition = self.load_ballot(election_id)?;
        let seal_hash = sealed_hash(&definition.election)?;
        if definition.election.is_terminal() {
            return Err(UrnaError::ElectionClosed { election_id: election_id.value(), status: definition.election.status.to_string() });
        }
        let cast_at = self.clock.now();
        ensure_window_open(&definition.election, cast_at)?;

        let voter = self.store.get_voter(voter_id)?.ok_or(UrnaError::VoterNotFound(voter_id.value()))?;
        if !voter.active {
            return Err(UrnaError::VoterInactive { voter_id: voter_id.value() });
        }
        // Fast rejection only; the commit below is what enforces uniqueness.
        if self.store.has_voted(voter_id, election_id)? {
            return Err(UrnaError::AlreadyVoted { voter_id: voter_id.value(), election_id: election_id.value() });
        }

        let resolved = validate_ballot(&definition, selections)?;
        validate_justification(justification, self.settings.max_justification_len)?;

        let tx_id = VoteTransactionId::generate();
        let ctx = CastContext {
            tx_id: &tx_id,
            election_id,
            voter: &voter,
            seal_hash,
            cast_at,
            origin,
            encrypted_justification: self.crypto.encrypt_justification(justification)?,
        };
        let receipt = self.prepare_receipt(&tx_id, &voter, &definition.election, &resolved, cast_at);
        let committed = self.commit_ballot(&definition, &ctx, &resolved, &receipt)?;
        info!("ballot committed election_id={} tx_id={} positions={}", election_id, tx_id, committed);

        self.receipt_issued(&voter, &receipt);
        self.record_audit(
            Actor::Voter(voter_id),
            election_id,
            AuditEvent::VoteCast { vote_transaction_id: tx_id.to_string(), position_count: committed },
        );
        Ok(receipt)
    }

    fn commit_ballot(
        &self,
        definition: &BallotDefinition,
        ctx: &CastContext<'_>,
        resolved: &[ResolvedSelection],
        receipt: &Receipt,
    ) -> Result<usize, UrnaError> {
        let mut ballot = self.store.begin_ballot(definition.election.id, ctx.voter.id)?;
        let mut vote_hashes = Vec::with_capacity(resolved.len());
        for selection in resolved {
            let staged = build_secure_vote(&self.crypto, ctx, selection).and_then(|vote| {
                let hash = vote.vote_hash;
                ballot.stage_vote(vote).map(|()| hash)
            });
            match staged {
                Ok(hash) => vote_hashes.push(hash),
                Err(err) => {
                    debug!("rolling back ballot tx_id={} staged={} error={}", ctx.tx_id, ballot.staged(), err);
                    ballot.rollback();
                    return Err(err);
                }
            }
        }
        let attached = VoteReceipt::from_receipt(receipt, vote_hashes, ctx.voter.id, ctx.cast_at).and_then(|row| ballot.attach_receipt(row));
        if let Err(err) = attached {
            debug!("rolling back ballot tx_id={} at receipt error={}", ctx.tx_id, err);
            ballot.rollback();
            return Err(err);
        }
        ballot.commit()
    }
}

fn sealed_hash(election: &Election) -> Result<SealHash, UrnaError> {
    match (election.is_sealed, election.seal_hash) {
        (true, Some(hash)) => Ok(hash),
        _ => Err(UrnaError::ElectionNotSealed { election_id: election.id.value() }),
    }
}

fn ensure_window_open(election: &Election, now: DateTime<Utc>) -> Result<(), UrnaError> {
    match election.window.position_of(now)? {
        WindowPosition::Open => Ok(()),
        WindowPosition::NotStarted => Err(UrnaError::VotingNotStarted {
            election_id: election.id.value(),
            starts_at: election.window.start_instant()?.to_rfc3339_opts(SecondsFormat::Secs, true),
        }),
        WindowPosition::Ended => Err(UrnaError::VotingEnded {
            election_id: election.id.value(),
            ended_at: election.window.end_instant()?.to_rfc3339_opts(SecondsFormat::Secs, true),
        }),
    }
}
