use crate::application::ElectionCore;
use crate::domain::ballot::{signature_matches, Origin, SecureVote};
use crate::domain::report::{tally_votes, zero_tally, DecodedVote};
use crate::domain::{Actor, AuditEvent, CountingReport, ReportKind, ReportSnapshot, ZeroReport};
use crate::foundation::{AdminId, ElectionId, ReportHash, ReportId, SealHash, UrnaError};
use log::{info, warn};
use std::collections::HashSet;

impl ElectionCore {
    /// Proves the ballot box starts empty. At most once per election and only before any vote.
    pub fn generate_zero_report(&self, election_id: ElectionId, admin_id: AdminId, origin: &Origin) -> Result<ZeroReport, UrnaError> {
        let definition = self.load_ballot(election_id)?;
        let election = &definition.election;
        self.authorize(admin_id, election)?;
        if election.is_terminal() {
            return Err(UrnaError::ElectionClosed { election_id: election_id.value(), status: election.status.to_string() });
        }
        if self.store.get_zero_report(election_id)?.is_some() {
            return Err(UrnaError::ReportAlreadyExists { election_id: election_id.value(), kind: ReportKind::Zero.to_string() });
        }
        // Fast rejection only; `insert_report` repeats both checks against ballot commits.
        if !self.store.list_votes(election_id)?.is_empty() {
            return Err(UrnaError::VotesAlreadyCast { election_id: election_id.value() });
        }

        let report = ReportSnapshot {
            report_id: ReportId::generate(),
            election_id,
            kind: ReportKind::Zero,
            election_title: election.title.clone(),
            seal_hash: election.seal_hash,
            generated_at: self.clock.now(),
            generated_by: admin_id,
            origin_address: origin.address.clone(),
            positions: zero_tally(&definition),
            total_ballots: 0,
            skipped_votes: 0,
            content_hash: ReportHash::default(),
        }
        .seal_content_hash()?;
        if let Err(err) = self.store.insert_report(&report) {
            warn!("zero report rejected by store election_id={} code={:?} error={}", election_id, err.code(), err);
            return Err(err);
        }

        info!("zero report generated election_id={} report_id={} content_hash={}", election_id, report.report_id, report.content_hash);
        self.record_audit(
            Actor::Admin(admin_id),
            election_id,
            AuditEvent::ZeroReportGenerated { report_id: report.report_id.to_string(), content_hash: report.content_hash.to_hex() },
        );
        Ok(report)
    }

    /// Tallies committed votes by decrypting each payload under the election's seal.
    ///
    /// Votes bound to another seal, with a broken signature, or whose payload does not
    /// decrypt are skipped and counted in `skipped_votes`.
    pub fn generate_counting_report(
        &self,
        election_id: ElectionId,
        admin_id: AdminId,
        origin: &Origin,
    ) -> Result<CountingReport, UrnaError> {
        let definition = self.load_ballot(election_id)?;
        let election = &definition.election;
        self.authorize(admin_id, election)?;
        let seal_hash = match (election.is_sealed, election.seal_hash) {
            (true, Some(hash)) => hash,
            _ => return Err(UrnaError::ElectionNotSealed { election_id: election_id.value() }),
        };

        let votes = self.store.list_votes(election_id)?;
        let mut decoded = Vec::with_capacity(votes.len());
        let mut ballots = HashSet::new();
        let mut skipped = 0u64;
        for vote in &votes {
            match self.decode_vote(vote, &seal_hash) {
                Some(entry) => {
                    ballots.insert(vote.vote_transaction_id.clone());
                    decoded.push(entry);
                }
                None => skipped += 1,
            }
        }
        let outcome = tally_votes(&definition, &decoded);
        skipped += outcome.unattributed;
        if skipped > 0 {
            warn!("counting skipped votes election_id={} skipped={} total={}", election_id, skipped, votes.len());
        }

        let report = ReportSnapshot {
            report_id: ReportId::generate(),
            election_id,
            kind: ReportKind::Counting,
            election_title: election.title.clone(),
            seal_hash: Some(seal_hash),
            generated_at: self.clock.now(),
            generated_by: admin_id,
            origin_address: origin.address.clone(),
            positions: outcome.positions,
            total_ballots: ballots.len() as u64,
            skipped_votes: skipped,
            content_hash: ReportHash::default(),
        }
        .seal_content_hash()?;
        self.store.insert_report(&report)?;

        info!(
            "counting report generated election_id={} report_id={} ballots={} skipped={} content_hash={}",
            election_id, report.report_id, report.total_ballots, report.skipped_votes, report.content_hash
        );
        self.record_audit(
            Actor::Admin(admin_id),
            election_id,
            AuditEvent::CountingReportGenerated {
                report_id: report.report_id.to_string(),
                content_hash: report.content_hash.to_hex(),
                total_ballots: report.total_ballots,
                skipped_votes: report.skipped_votes,
            },
        );
        Ok(report)
    }

    fn decode_vote(&self, vote: &SecureVote, seal_hash: &SealHash) -> Option<DecodedVote> {
        if !vote.seal_hash_at_cast.ct_eq(seal_hash) {
            warn!("vote bound to a different seal tx_id={} position_id={}", vote.vote_transaction_id, vote.position_id);
            return None;
        }
        if !signature_matches(vote) {
            warn!("vote signature mismatch tx_id={} position_id={}", vote.vote_transaction_id, vote.position_id);
            return None;
        }
        let payload = match self.crypto.decrypt_vote_payload(&vote.encrypted_payload, seal_hash) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("vote payload did not decrypt tx_id={} position_id={} error={}", vote.vote_transaction_id, vote.position_id, err);
                return None;
            }
        };
        if payload.position_id != vote.position_id || payload.kind != vote.kind {
            warn!("vote payload disagrees with its row tx_id={} position_id={}", vote.vote_transaction_id, vote.position_id);
            return None;
        }
        Some(DecodedVote { position_id: payload.position_id, kind: payload.kind, candidate_id: payload.candidate_id, weight: payload.weight })
    }
}
