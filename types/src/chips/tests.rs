use super::*;
use commonware_codec::{Encode, ReadExt};
use proptest::prelude::*;
use rand::{rngs::StdRng, RngCore, SeedableRng};

fn sample_settlement() -> SettlementRecord {
    SettlementRecord {
        seq: 12,
        round: 3,
        bet: BetId(7),
        outcome: "Banker".to_string(),
        wager: 100,
        payout: 195,
        kind: SettlementKind::Won,
        timestamp_ms: 42_000,
    }
}

#[test]
fn test_audit_event_roundtrip() {
    let events = [
        AuditEvent::Transfer(TransferRecord {
            seq: 11,
            round: 3,
            from: PileId::Player,
            to: PileId::Bet(BetId(7)),
            value: 100,
            reason: TransferReason::Wager,
            timestamp_ms: 41_000,
        }),
        AuditEvent::Settlement(sample_settlement()),
        AuditEvent::Cash(CashRecord {
            seq: 13,
            inbound: false,
            amount: 1_045,
            timestamp_ms: 43_000,
        }),
    ];
    for event in events {
        let encoded = event.encode();
        assert_eq!(encoded.len(), commonware_codec::EncodeSize::encode_size(&event));
        let decoded = AuditEvent::read(&mut &encoded[..]).unwrap();
        assert_eq!(event, decoded);
    }
}

#[test]
fn test_settlement_net() {
    let won = sample_settlement();
    assert_eq!(won.net(), 95);
    let lost = SettlementRecord {
        payout: 0,
        kind: SettlementKind::Forfeited,
        ..won
    };
    assert_eq!(lost.net(), -100);
}

#[test]
fn test_pile_id_rejects_unknown_tag() {
    let bytes = [9u8];
    assert!(matches!(
        PileId::read(&mut &bytes[..]),
        Err(commonware_codec::Error::InvalidEnum(9))
    ));
}

#[test]
fn test_chip_rejects_zero_denomination() {
    let encoded = 0u64.encode();
    assert!(Chip::read(&mut &encoded[..]).is_err());
}

#[test]
fn test_audit_event_decoding_survives_garbage() {
    let mut rng = StdRng::seed_from_u64(0xfe17);
    for _ in 0..1_000 {
        let len = (rng.next_u32() as usize) % 96;
        let mut buf = vec![0u8; len];
        rng.fill_bytes(&mut buf);
        let _ = AuditEvent::read(&mut buf.as_slice());
    }
}

#[test]
fn test_error_codes_are_distinct() {
    let errors = [
        WagerError::InvalidAmount { amount: 0 },
        WagerError::Unbreakable { value: 1 },
        WagerError::InsufficientFunds {
            available: 40,
            requested: 50,
        },
        WagerError::Unrepresentable { amount: 3 },
        WagerError::ChangeUnavailable { value: 25 },
        WagerError::EmptyBet,
        WagerError::BettingClosed {
            round: 1,
            phase: RoundPhase::Locked,
        },
        WagerError::NotFound(Missing::Bet(BetId(1))),
        WagerError::IllegalTransfer {
            from: PileId::House,
            to: PileId::Player,
        },
        WagerError::UnknownOutcome {
            name: "Dragon".to_string(),
        },
        WagerError::InvalidPhase {
            expected: RoundPhase::Locked,
            actual: RoundPhase::Settled,
        },
    ];
    let mut codes: Vec<u8> = errors.iter().map(WagerError::code).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), errors.len());
}

#[test]
fn test_error_display() {
    let err = WagerError::InsufficientFunds {
        available: 40,
        requested: 50,
    };
    assert!(err.to_string().contains("available=40"));
    let err = WagerError::NotFound(Missing::Area("Dragon".to_string()));
    assert_eq!(err.to_string(), "betting area 'Dragon' not found");
}

proptest! {
    #[test]
    fn cash_to_chips_round_trips(amount in 0u64..5_000_000) {
        let table = DenominationTable::default();
        let chips = table.cash_to_chips(amount).unwrap();
        prop_assert_eq!(chips_to_cash(&chips), amount);
        prop_assert!(chips.windows(2).all(|pair| pair[0].value() >= pair[1].value()));
    }

    #[test]
    fn make_change_for_pays_owed_exactly(index in 1usize..5, owed_seed in 0u64..1_000) {
        let table = DenominationTable::default();
        let value = table.values()[index];
        let owed = owed_seed % value;
        let change = table.make_change_for(value, owed).unwrap();
        prop_assert_eq!(chips_to_cash(&change), value);
        prop_assert!(change.iter().all(|chip| chip.value() < value));
        let head = table.cash_to_chips(owed).unwrap();
        prop_assert_eq!(&change[..head.len()], &head[..]);
    }
}
