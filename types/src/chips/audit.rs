use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};

use super::{name_encode_size, read_outcome_name, write_name, BetId, PileId};

/// Why chips moved between two piles.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransferReason {
    /// Player stack into a bet.
    Wager = 0,
    /// Bet back into its owner before the round locks.
    Withdraw = 1,
    /// A chip handed to the house to be broken.
    Break = 2,
    /// Smaller chips the house returns for a broken chip.
    Change = 3,
    /// Losing wager absorbed by the house.
    Forfeit = 4,
    /// Wager returned on a push.
    Push = 5,
    /// Winning wager returned to its owner.
    Payout = 6,
    /// House-funded winnings on a winning wager.
    Winnings = 7,
    /// In-flight bet returned to its owner at cash-out.
    CashOut = 8,
    /// Unsettled bet returned by an administrator.
    Refund = 9,
}

impl TryFrom<u8> for TransferReason {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TransferReason::Wager),
            1 => Ok(TransferReason::Withdraw),
            2 => Ok(TransferReason::Break),
            3 => Ok(TransferReason::Change),
            4 => Ok(TransferReason::Forfeit),
            5 => Ok(TransferReason::Push),
            6 => Ok(TransferReason::Payout),
            7 => Ok(TransferReason::Winnings),
            8 => Ok(TransferReason::CashOut),
            9 => Ok(TransferReason::Refund),
            _ => Err(()),
        }
    }
}

impl Write for TransferReason {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for TransferReason {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        TransferReason::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl FixedSize for TransferReason {
    const SIZE: usize = 1;
}

/// How a bet left the ledger.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettlementKind {
    Won = 0,
    Pushed = 1,
    Forfeited = 2,
    Refunded = 3,
    CashedOut = 4,
}

impl TryFrom<u8> for SettlementKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SettlementKind::Won),
            1 => Ok(SettlementKind::Pushed),
            2 => Ok(SettlementKind::Forfeited),
            3 => Ok(SettlementKind::Refunded),
            4 => Ok(SettlementKind::CashedOut),
            _ => Err(()),
        }
    }
}

impl Write for SettlementKind {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for SettlementKind {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        SettlementKind::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl FixedSize for SettlementKind {
    const SIZE: usize = 1;
}

/// One committed chip movement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRecord {
    pub seq: u64,
    pub round: u64,
    pub from: PileId,
    pub to: PileId,
    pub value: u64,
    pub reason: TransferReason,
    pub timestamp_ms: u64,
}

impl Write for TransferRecord {
    fn write(&self, writer: &mut impl BufMut) {
        self.seq.write(writer);
        self.round.write(writer);
        self.from.write(writer);
        self.to.write(writer);
        self.value.write(writer);
        self.reason.write(writer);
        self.timestamp_ms.write(writer);
    }
}

impl Read for TransferRecord {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            seq: u64::read(reader)?,
            round: u64::read(reader)?,
            from: PileId::read(reader)?,
            to: PileId::read(reader)?,
            value: u64::read(reader)?,
            reason: TransferReason::read(reader)?,
            timestamp_ms: u64::read(reader)?,
        })
    }
}

impl EncodeSize for TransferRecord {
    fn encode_size(&self) -> usize {
        self.seq.encode_size()
            + self.round.encode_size()
            + self.from.encode_size()
            + self.to.encode_size()
            + self.value.encode_size()
            + self.reason.encode_size()
            + self.timestamp_ms.encode_size()
    }
}

/// Outcome of settling (or forcibly closing) one bet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementRecord {
    pub seq: u64,
    pub round: u64,
    pub bet: BetId,
    /// Outcome the bet was placed on, or the tie bucket for the push slot.
    pub outcome: String,
    pub wager: u64,
    /// Total value returned to the owner (stake included).
    pub payout: u64,
    pub kind: SettlementKind,
    pub timestamp_ms: u64,
}

impl SettlementRecord {
    /// Owner's net result on this bet.
    pub fn net(&self) -> i128 {
        self.payout as i128 - self.wager as i128
    }
}

impl Write for SettlementRecord {
    fn write(&self, writer: &mut impl BufMut) {
        self.seq.write(writer);
        self.round.write(writer);
        self.bet.write(writer);
        write_name(&self.outcome, writer);
        self.wager.write(writer);
        self.payout.write(writer);
        self.kind.write(writer);
        self.timestamp_ms.write(writer);
    }
}

impl Read for SettlementRecord {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            seq: u64::read(reader)?,
            round: u64::read(reader)?,
            bet: BetId::read(reader)?,
            outcome: read_outcome_name(reader)?,
            wager: u64::read(reader)?,
            payout: u64::read(reader)?,
            kind: SettlementKind::read(reader)?,
            timestamp_ms: u64::read(reader)?,
        })
    }
}

impl EncodeSize for SettlementRecord {
    fn encode_size(&self) -> usize {
        self.seq.encode_size()
            + self.round.encode_size()
            + self.bet.encode_size()
            + name_encode_size(&self.outcome)
            + self.wager.encode_size()
            + self.payout.encode_size()
            + self.kind.encode_size()
            + self.timestamp_ms.encode_size()
    }
}

/// Cash crossing the table boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CashRecord {
    pub seq: u64,
    /// `true` for cash-in, `false` for cash-out.
    pub inbound: bool,
    pub amount: u64,
    pub timestamp_ms: u64,
}

impl Write for CashRecord {
    fn write(&self, writer: &mut impl BufMut) {
        self.seq.write(writer);
        self.inbound.write(writer);
        self.amount.write(writer);
        self.timestamp_ms.write(writer);
    }
}

impl Read for CashRecord {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            seq: u64::read(reader)?,
            inbound: bool::read(reader)?,
            amount: u64::read(reader)?,
            timestamp_ms: u64::read(reader)?,
        })
    }
}

impl EncodeSize for CashRecord {
    fn encode_size(&self) -> usize {
        self.seq.encode_size()
            + self.inbound.encode_size()
            + self.amount.encode_size()
            + self.timestamp_ms.encode_size()
    }
}

/// Everything the engine reports to its audit collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuditEvent {
    Transfer(TransferRecord),
    Settlement(SettlementRecord),
    Cash(CashRecord),
}

impl AuditEvent {
    pub fn seq(&self) -> u64 {
        match self {
            AuditEvent::Transfer(record) => record.seq,
            AuditEvent::Settlement(record) => record.seq,
            AuditEvent::Cash(record) => record.seq,
        }
    }
}

impl Write for AuditEvent {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            AuditEvent::Transfer(record) => {
                0u8.write(writer);
                record.write(writer);
            }
            AuditEvent::Settlement(record) => {
                1u8.write(writer);
                record.write(writer);
            }
            AuditEvent::Cash(record) => {
                2u8.write(writer);
                record.write(writer);
            }
        }
    }
}

impl Read for AuditEvent {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let tag = u8::read(reader)?;
        match tag {
            0 => Ok(AuditEvent::Transfer(TransferRecord::read(reader)?)),
            1 => Ok(AuditEvent::Settlement(SettlementRecord::read(reader)?)),
            2 => Ok(AuditEvent::Cash(CashRecord::read(reader)?)),
            other => Err(Error::InvalidEnum(other)),
        }
    }
}

impl EncodeSize for AuditEvent {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                AuditEvent::Transfer(record) => record.encode_size(),
                AuditEvent::Settlement(record) => record.encode_size(),
                AuditEvent::Cash(record) => record.encode_size(),
            }
    }
}
