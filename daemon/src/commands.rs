//! One-shot requests: build the engine, run one operation, report JSON.

use crate::cli::{ProposalAction, Request};
use crate::config::DaemonConfig;
use anyhow::Context;
use serde::Serialize;
use serde_json::{json, Value};
use stakegov_governance::{GovernanceEngine, GovernanceError};
use stakegov_holdings::{StaticHoldings, TimeoutHoldings};
use stakegov_store_mem::MemStore;
use stakegov_types::{NewProposal, Percent, Thresholds, Timestamp, VotingWindow};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why a one-shot request produced no result body.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The engine refused the request; reported to the client by kind.
    #[error(transparent)]
    Rejected(#[from] GovernanceError),

    #[error("rendering result: {0}")]
    Render(#[from] serde_json::Error),
}

pub type Engine = GovernanceEngine<MemStore, TimeoutHoldings<StaticHoldings>>;

/// Load the store dump and holdings file named by `config`.
pub fn build_engine(config: &DaemonConfig) -> anyhow::Result<Engine> {
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating data dir {}", config.data_dir.display()))?;
    let store = MemStore::load_from_file(&config.state_path())
        .with_context(|| format!("loading store {}", config.state_path().display()))?;

    let holdings = match &config.holdings_file {
        Some(path) => StaticHoldings::from_json_file(path)
            .with_context(|| format!("loading holdings {}", path.display()))?,
        None => {
            tracing::warn!("no holdings file configured; every asset has an empty holder set");
            StaticHoldings::new()
        }
    };
    let holdings = TimeoutHoldings::new(
        holdings,
        Duration::from_millis(config.governance.adapter_timeout_ms),
    );

    Ok(GovernanceEngine::new(
        Arc::new(store),
        Arc::new(holdings),
        config.governance.clone(),
    ))
}

/// Write the store back to its dump file.
pub fn persist(engine: &Engine, config: &DaemonConfig) -> anyhow::Result<()> {
    engine
        .store()
        .dump_to_file(&config.state_path())
        .with_context(|| format!("writing store {}", config.state_path().display()))
}

fn to_json<T: Serialize>(value: T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(value)
}

/// JSON body for a rejected request.
pub fn rejection(err: &GovernanceError) -> Value {
    json!({
        "error": err.kind(),
        "message": err.to_string(),
    })
}

fn percent(value: u8, what: &str) -> Result<Percent, GovernanceError> {
    Percent::new(value).map_err(|e| GovernanceError::InvalidProposal(format!("{what}: {e}")))
}

/// Run `request` at `now`.
pub fn execute(engine: &Engine, request: Request, now: Timestamp) -> Result<Value, CommandError> {
    Ok(match request {
        Request::Proposal { action } => match action {
            ProposalAction::Create {
                creator,
                asset,
                proposal_type,
                starts_at,
                ends_at,
                quorum,
                pass,
            } => {
                let pass_pct = match pass {
                    Some(p) => percent(p, "pass threshold")?,
                    None => engine.params().default_pass_threshold_pct,
                };
                let request = NewProposal {
                    asset,
                    proposal_type,
                    window: VotingWindow::new(
                        Timestamp::new(starts_at),
                        Timestamp::new(ends_at),
                    ),
                    thresholds: Thresholds::new(percent(quorum, "quorum")?, pass_pct),
                };
                to_json(engine.create_proposal(&creator, request, now)?)?
            }
            ProposalAction::Activate { id } => to_json(engine.activate(&id, now)?)?,
            ProposalAction::Close { id } => to_json(engine.close(&id, now)?)?,
            ProposalAction::Cancel { id } => to_json(engine.cancel(&id, now)?)?,
            ProposalAction::Execute { id } => to_json(engine.mark_executed(&id, now)?)?,
            ProposalAction::Show { id } => to_json(engine.proposal(&id)?)?,
            ProposalAction::List { status } => to_json(engine.proposals_by_status(status)?)?,
        },
        Request::Vote {
            proposal,
            voter,
            choice,
        } => to_json(engine.cast_vote(&proposal, &voter, choice, now)?)?,
        Request::Delegate { from, to, scope } => {
            to_json(engine.create_delegation(&from, &to, scope, now)?)?
        }
        Request::Revoke { from, scope } => {
            let revoked = engine.revoke_delegation(&from, &scope, now)?;
            json!({ "revoked": revoked })
        }
        Request::Tally { proposal } => to_json(engine.get_tally(&proposal, now)?)?,
        Request::Power { holder, proposal } => {
            to_json(engine.voting_power(&holder, &proposal, now)?)?
        }
        Request::Ballots { proposal, voter } => {
            to_json(engine.vote_history(&proposal, &voter)?)?
        }
        Request::Delegations { holder } => to_json(engine.delegations_of(&holder)?)?,
    })
}
