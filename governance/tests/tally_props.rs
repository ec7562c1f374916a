//! Property tests: tally conservation over random pools, ballots and
//! acyclic delegation graphs.

use proptest::prelude::*;
use stakegov_governance::GovernanceEngine;
use stakegov_nullables::NullHoldings;
use stakegov_store_mem::MemStore;
use stakegov_types::{
    AssetId, DelegationScope, GovernanceParams, HolderId, NewProposal, Percent, PowerUnits,
    ProposalType, Thresholds, Timestamp, VoteChoice, VotingWindow,
};
use std::collections::HashMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct Member {
    units: u64,
    /// Offset of the delegate among later members; keeps the graph acyclic.
    delegates_to: Option<usize>,
    ballot: Option<u8>,
}

fn member() -> impl Strategy<Value = Member> {
    (1u64..1_000, proptest::option::of(0usize..16), proptest::option::of(0u8..3)).prop_map(
        |(units, delegates_to, ballot)| Member { units, delegates_to, ballot },
    )
}

fn choice(raw: u8) -> VoteChoice {
    match raw {
        0 => VoteChoice::For,
        1 => VoteChoice::Against,
        _ => VoteChoice::Abstain,
    }
}

fn name(i: usize) -> HolderId {
    HolderId::new(format!("m{i}"))
}

/// Resolve each member's delegate index from its offset.
fn targets(members: &[Member]) -> Vec<Option<usize>> {
    let n = members.len();
    members
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let later = n - i - 1;
            match (m.delegates_to, later) {
                (Some(off), later) if later > 0 => Some(i + 1 + off % later),
                _ => None,
            }
        })
        .collect()
}

/// Power each choice should receive: a member's own ballot counts first,
/// otherwise the ballot of the end of its delegation chain.
fn expected(members: &[Member]) -> HashMap<u8, u128> {
    let targets = targets(members);
    let mut totals = HashMap::new();
    for (i, m) in members.iter().enumerate() {
        let mut controller = i;
        while let Some(next) = targets[controller] {
            controller = next;
        }
        let ballot = m.ballot.or(members[controller].ballot);
        if let Some(b) = ballot {
            *totals.entry(b).or_insert(0) += u128::from(m.units);
        }
    }
    totals
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn tally_conserves_power(members in proptest::collection::vec(member(), 1..12)) {
        let asset = AssetId::new("tower-7");
        let holdings = Arc::new(NullHoldings::new());
        for (i, m) in members.iter().enumerate() {
            holdings.set(&asset, &name(i), m.units);
        }
        let engine = GovernanceEngine::new(
            Arc::new(MemStore::new()),
            holdings,
            GovernanceParams::test_defaults(),
        );

        let setup = Timestamp::new(10);
        for (i, target) in targets(&members).into_iter().enumerate() {
            if let Some(j) = target {
                engine
                    .create_delegation(&name(i), &name(j), DelegationScope::Global, setup)
                    .unwrap();
            }
        }

        let id = engine
            .create_proposal(
                &HolderId::new("creator"),
                NewProposal {
                    asset,
                    proposal_type: ProposalType::Financial,
                    window: VotingWindow::new(Timestamp::new(100), Timestamp::new(200)),
                    thresholds: Thresholds::with_quorum(Percent::new(10).unwrap()),
                },
                setup,
            )
            .unwrap()
            .id;
        engine.activate(&id, Timestamp::new(100)).unwrap();

        for (i, m) in members.iter().enumerate() {
            if let Some(b) = m.ballot {
                engine.cast_vote(&id, &name(i), choice(b), Timestamp::new(150)).unwrap();
            }
        }

        let tally = engine.close(&id, Timestamp::new(200)).unwrap();
        let want = expected(&members);
        let get = |b: u8| PowerUnits::new(want.get(&b).copied().unwrap_or(0));

        prop_assert_eq!(tally.for_power, get(0));
        prop_assert_eq!(tally.against_power, get(1));
        prop_assert_eq!(tally.abstain_power, get(2));

        let voted = tally.for_power.raw() + tally.against_power.raw() + tally.abstain_power.raw();
        prop_assert_eq!(tally.total_voted_power.raw(), voted);
        prop_assert!(tally.total_voted_power <= tally.total_eligible_power);
        let eligible: u128 = members.iter().map(|m| u128::from(m.units)).sum();
        prop_assert_eq!(tally.total_eligible_power.raw(), eligible);
    }
}
