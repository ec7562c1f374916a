use proptest::prelude::*;

use stakegov_types::{
    DelegationEdge, DelegationScope, HolderId, Percent, PowerSnapshot, PowerUnits, ProposalId,
    Timestamp, VotingWindow,
};

proptest! {
    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// ratio_at_least agrees with exact rational comparison.
    #[test]
    fn ratio_at_least_matches_rationals(
        part in 0u64..1_000_000,
        whole in 1u64..1_000_000,
        pct in 0u8..=100,
    ) {
        let got = PowerUnits::from(part)
            .ratio_at_least(PowerUnits::from(whole), Percent::new(pct).unwrap())
            .unwrap();
        let expected = u128::from(part) * 100 >= u128::from(whole) * u128::from(pct);
        prop_assert_eq!(got, expected);
    }

    /// ratio_exceeds is never true when ratio_at_least is false.
    #[test]
    fn ratio_exceeds_implies_at_least(
        part in 0u64..1_000_000,
        whole in 1u64..1_000_000,
        pct in 0u8..=100,
    ) {
        let p = Percent::new(pct).unwrap();
        let part = PowerUnits::from(part);
        let whole = PowerUnits::from(whole);
        if part.ratio_exceeds(whole, p).unwrap() {
            prop_assert!(part.ratio_at_least(whole, p).unwrap());
        }
    }

    /// A window contains exactly the instants in [starts, ends).
    #[test]
    fn window_contains_half_open(
        start in 0u64..1_000,
        len in 1u64..1_000,
        instant in 0u64..3_000,
    ) {
        let w = VotingWindow::new(Timestamp::new(start), Timestamp::new(start + len));
        let inside = instant >= start && instant < start + len;
        prop_assert_eq!(w.contains(Timestamp::new(instant)), inside);
    }

    /// Snapshot total equals the sum of its nonzero entries.
    #[test]
    fn snapshot_total_is_sum(units in prop::collection::vec(0u64..10_000, 0..40)) {
        let entries = units
            .iter()
            .enumerate()
            .map(|(i, u)| (HolderId::new(format!("h{i}")), PowerUnits::from(*u)));
        let snap =
            PowerSnapshot::new(ProposalId::new(1), Timestamp::EPOCH, Timestamp::EPOCH, entries)
                .unwrap();
        let expected: u128 = units.iter().map(|u| u128::from(*u)).sum();
        prop_assert_eq!(snap.total_eligible_power().raw(), expected);
        prop_assert_eq!(snap.holder_count(), units.iter().filter(|u| **u > 0).count());
    }

    /// An edge is live at t iff created <= t < revoked.
    #[test]
    fn edge_liveness(
        created in 0u64..1_000,
        revoke_after in prop::option::of(0u64..1_000),
        instant in 0u64..3_000,
    ) {
        let mut edge = DelegationEdge::new(
            HolderId::new("a"),
            HolderId::new("b"),
            DelegationScope::Global,
            Timestamp::new(created),
        );
        edge.revoked_at = revoke_after.map(|d| Timestamp::new(created + d));
        let expected = instant >= created && revoke_after.map_or(true, |d| instant < created + d);
        prop_assert_eq!(edge.was_live_at(Timestamp::new(instant)), expected);
    }
}

#[test]
fn records_survive_bincode() {
    let edge = DelegationEdge::new(
        HolderId::new("a"),
        HolderId::new("b"),
        "asset:tower-7".parse().unwrap(),
        Timestamp::new(9),
    );
    let bytes = bincode::serialize(&edge).unwrap();
    let back: DelegationEdge = bincode::deserialize(&bytes).unwrap();
    assert_eq!(back, edge);
}
