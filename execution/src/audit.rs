//! Audit collaborators.
//!
//! The engine reports every committed transfer, settlement and cash movement to an
//! [AuditSink]. Sinks cannot fail the operation that produced the event.

use bytes::BytesMut;
use commonware_codec::{Encode, ReadExt};
use felt_types::{AuditEvent, GameType, SettlementKind};
use std::collections::BTreeSet;

/// Receives audit events in commit order.
pub trait AuditSink {
    fn record(&mut self, event: &AuditEvent);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl AuditSink for NullSink {
    fn record(&mut self, _: &AuditEvent) {}
}

/// Keeps every event in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    events: Vec<AuditEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl AuditSink for MemorySink {
    fn record(&mut self, event: &AuditEvent) {
        self.events.push(event.clone());
    }
}

/// Appends encoded events to a byte log that can be replayed later.
#[derive(Clone, Debug, Default)]
pub struct LogSink {
    buffer: BytesMut,
    count: usize,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Decodes a log produced by this sink.
    pub fn replay(bytes: &[u8]) -> Result<Vec<AuditEvent>, commonware_codec::Error> {
        let mut reader = bytes;
        let mut events = Vec::new();
        while !reader.is_empty() {
            events.push(AuditEvent::read(&mut reader)?);
        }
        Ok(events)
    }
}

impl AuditSink for LogSink {
    fn record(&mut self, event: &AuditEvent) {
        self.buffer.extend_from_slice(&event.encode());
        self.count += 1;
    }
}

/// Per-game wagering statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameStats {
    pub rounds_played: u64,
    pub bets_won: u64,
    pub bets_lost: u64,
    pub bets_pushed: u64,
    pub bets_returned: u64,
    pub total_wagered: u64,
    pub total_returned: u64,
}

impl GameStats {
    /// Player's net result across every settled bet.
    pub fn net(&self) -> i128 {
        self.total_returned as i128 - self.total_wagered as i128
    }
}

/// Folds settlements into [GameStats].
#[derive(Clone, Debug)]
pub struct StatsSink {
    game: GameType,
    stats: GameStats,
    rounds: BTreeSet<u64>,
}

impl StatsSink {
    pub fn new(game: GameType) -> Self {
        Self {
            game,
            stats: GameStats::default(),
            rounds: BTreeSet::new(),
        }
    }

    pub fn game(&self) -> GameType {
        self.game
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }
}

impl AuditSink for StatsSink {
    fn record(&mut self, event: &AuditEvent) {
        let AuditEvent::Settlement(record) = event else {
            return;
        };
        match record.kind {
            SettlementKind::Won => self.stats.bets_won += 1,
            SettlementKind::Forfeited => self.stats.bets_lost += 1,
            SettlementKind::Pushed => self.stats.bets_pushed += 1,
            SettlementKind::Refunded | SettlementKind::CashedOut => {
                self.stats.bets_returned += 1
            }
        }
        if matches!(
            record.kind,
            SettlementKind::Won | SettlementKind::Forfeited | SettlementKind::Pushed
        ) && self.rounds.insert(record.round)
        {
            self.stats.rounds_played += 1;
        }
        self.stats.total_wagered += record.wager;
        self.stats.total_returned += record.payout;
    }
}

impl<A: AuditSink, B: AuditSink> AuditSink for (A, B) {
    fn record(&mut self, event: &AuditEvent) {
        self.0.record(event);
        self.1.record(event);
    }
}

impl<S: AuditSink + ?Sized> AuditSink for Box<S> {
    fn record(&mut self, event: &AuditEvent) {
        (**self).record(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use felt_types::{BetId, CashRecord, SettlementRecord};

    fn settlement(seq: u64, round: u64, kind: SettlementKind, wager: u64, payout: u64) -> AuditEvent {
        AuditEvent::Settlement(SettlementRecord {
            seq,
            round,
            bet: BetId(seq),
            outcome: "Banker".to_string(),
            wager,
            payout,
            kind,
            timestamp_ms: 0,
        })
    }

    #[test]
    fn test_stats_sink_folds_settlements() {
        let mut sink = StatsSink::new(GameType::Baccarat);
        sink.record(&settlement(1, 1, SettlementKind::Won, 100, 195));
        sink.record(&settlement(2, 1, SettlementKind::Forfeited, 50, 0));
        sink.record(&settlement(3, 2, SettlementKind::Pushed, 10, 10));
        sink.record(&AuditEvent::Cash(CashRecord {
            seq: 4,
            inbound: true,
            amount: 1_000,
            timestamp_ms: 0,
        }));
        let stats = sink.stats();
        assert_eq!(stats.rounds_played, 2);
        assert_eq!(stats.bets_won, 1);
        assert_eq!(stats.bets_lost, 1);
        assert_eq!(stats.bets_pushed, 1);
        assert_eq!(stats.net(), 45);
    }

    #[test]
    fn test_log_sink_replays_in_order() {
        let mut sink = LogSink::new();
        let events = [
            settlement(1, 1, SettlementKind::Won, 100, 195),
            settlement(2, 1, SettlementKind::Refunded, 25, 25),
        ];
        for event in &events {
            sink.record(event);
        }
        assert_eq!(sink.len(), 2);
        assert_eq!(LogSink::replay(sink.as_bytes()).unwrap(), events.to_vec());
    }

    #[test]
    fn test_pair_sink_fans_out() {
        let mut sink = (MemorySink::new(), StatsSink::new(GameType::Keno));
        sink.record(&settlement(1, 1, SettlementKind::Won, 10, 20));
        assert_eq!(sink.0.events().len(), 1);
        assert_eq!(sink.1.stats().bets_won, 1);
    }
}
