//! Command-line interface.

use clap::{Parser, Subcommand};
use stakegov_types::{
    AssetId, DelegationScope, HolderId, ProposalId, ProposalStatus, ProposalType, VoteChoice,
};
use stakegov_utils::LogFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stakegov", about = "Stake-weighted governance with liquid delegation")]
pub struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "STAKEGOV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the store dump.
    #[arg(long, env = "STAKEGOV_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON holdings file: { "asset": { "holder": units } }.
    #[arg(long, env = "STAKEGOV_HOLDINGS_FILE")]
    pub holdings_file: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "STAKEGOV_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "STAKEGOV_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Run one-shot commands as of this unix time instead of now.
    #[arg(long, global = true)]
    pub at: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the periodic sweep until interrupted.
    Run {
        /// Seconds between sweeps.
        #[arg(long, env = "STAKEGOV_SWEEP_INTERVAL_SECS")]
        sweep_interval_secs: Option<u64>,

        /// Also activate drafts whose voting window has started.
        #[arg(long, env = "STAKEGOV_AUTO_ACTIVATE")]
        auto_activate: bool,
    },

    #[command(flatten)]
    Once(Request),
}

/// A one-shot operation against the stored state.
#[derive(Subcommand)]
pub enum Request {
    /// Manage proposals.
    Proposal {
        #[command(subcommand)]
        action: ProposalAction,
    },

    /// Cast or replace a ballot.
    Vote {
        #[arg(long)]
        proposal: ProposalId,
        #[arg(long)]
        voter: HolderId,
        /// "for", "against", or "abstain".
        #[arg(long)]
        choice: VoteChoice,
    },

    /// Delegate voting power.
    Delegate {
        #[arg(long)]
        from: HolderId,
        #[arg(long)]
        to: HolderId,
        /// "global", "type:<proposal type>", or "asset:<asset id>".
        #[arg(long, default_value = "global")]
        scope: DelegationScope,
    },

    /// Revoke a delegation.
    Revoke {
        #[arg(long)]
        from: HolderId,
        #[arg(long, default_value = "global")]
        scope: DelegationScope,
    },

    /// Show a proposal's tally.
    Tally { proposal: ProposalId },

    /// Show a holder's voting power on a proposal.
    Power {
        #[arg(long)]
        holder: HolderId,
        #[arg(long)]
        proposal: ProposalId,
    },

    /// Show every ballot a voter cast on a proposal.
    Ballots {
        #[arg(long)]
        proposal: ProposalId,
        #[arg(long)]
        voter: HolderId,
    },

    /// Show every delegation a holder created.
    Delegations { holder: HolderId },
}

#[derive(Subcommand)]
pub enum ProposalAction {
    /// Create a draft proposal.
    Create {
        #[arg(long)]
        creator: HolderId,
        #[arg(long)]
        asset: AssetId,
        #[arg(long = "type")]
        proposal_type: ProposalType,
        /// Voting start, unix seconds.
        #[arg(long)]
        starts_at: u64,
        /// Voting end (exclusive), unix seconds.
        #[arg(long)]
        ends_at: u64,
        /// Quorum, percent of eligible power.
        #[arg(long)]
        quorum: u8,
        /// Pass threshold, percent of for + against. Defaults to the
        /// configured default.
        #[arg(long)]
        pass: Option<u8>,
    },
    /// Snapshot power and open voting.
    Activate { id: ProposalId },
    /// Tally and close an ended proposal.
    Close { id: ProposalId },
    /// Cancel a draft, or an active proposal without ballots.
    Cancel { id: ProposalId },
    /// Mark a passed proposal executed.
    Execute { id: ProposalId },
    /// Show one proposal.
    Show { id: ProposalId },
    /// List proposals in a status.
    List {
        #[arg(long, default_value = "active")]
        status: ProposalStatus,
    },
}

impl Request {
    /// Whether the request can change the store.
    pub fn mutates(&self) -> bool {
        match self {
            Self::Vote { .. } | Self::Delegate { .. } | Self::Revoke { .. } => true,
            Self::Proposal { action } => !matches!(
                action,
                ProposalAction::Show { .. } | ProposalAction::List { .. }
            ),
            Self::Tally { .. }
            | Self::Power { .. }
            | Self::Ballots { .. }
            | Self::Delegations { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_vote() {
        let cli = Cli::try_parse_from([
            "stakegov", "vote", "--proposal", "P-3", "--voter", "alice", "--choice", "against",
        ])
        .unwrap();
        match cli.command {
            Command::Once(Request::Vote { proposal, voter, choice }) => {
                assert_eq!(proposal, ProposalId::new(3));
                assert_eq!(voter, HolderId::new("alice"));
                assert_eq!(choice, VoteChoice::Against);
            }
            _ => panic!("expected vote"),
        }
    }

    #[test]
    fn delegate_scope_defaults_to_global() {
        let cli =
            Cli::try_parse_from(["stakegov", "delegate", "--from", "a", "--to", "b"]).unwrap();
        match cli.command {
            Command::Once(Request::Delegate { scope, .. }) => {
                assert_eq!(scope, DelegationScope::Global)
            }
            _ => panic!("expected delegate"),
        }
    }

    #[test]
    fn reads_are_not_mutations() {
        let mutates = |args: &[&str]| {
            match Cli::try_parse_from(args.iter().copied()).unwrap().command {
                Command::Once(request) => request.mutates(),
                Command::Run { .. } => panic!("expected a one-shot request"),
            }
        };
        assert!(!mutates(&["stakegov", "tally", "7"]));
        assert!(mutates(&["stakegov", "proposal", "close", "7"]));
    }
}
