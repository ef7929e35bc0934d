use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use std::fmt;

/// Identifier of a live or settled bet. Never reused within a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BetId(pub u64);

impl fmt::Display for BetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bet#{}", self.0)
    }
}

impl Write for BetId {
    fn write(&self, writer: &mut impl BufMut) {
        self.0.write(writer);
    }
}

impl Read for BetId {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self(u64::read(reader)?))
    }
}

impl FixedSize for BetId {
    const SIZE: usize = u64::SIZE;
}

/// Addresses one chip pile on a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PileId {
    /// The player's stack; the only pile convertible to and from cash.
    Player,
    /// The house stack; supplies change and winnings, absorbs forfeits.
    House,
    /// A wager pile tracked by the ledger.
    Bet(BetId),
}

impl PileId {
    pub fn is_stack(&self) -> bool {
        matches!(self, PileId::Player | PileId::House)
    }

    pub fn bet(&self) -> Option<BetId> {
        match self {
            PileId::Bet(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for PileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PileId::Player => write!(f, "player"),
            PileId::House => write!(f, "house"),
            PileId::Bet(id) => write!(f, "{id}"),
        }
    }
}

impl Write for PileId {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            PileId::Player => 0u8.write(writer),
            PileId::House => 1u8.write(writer),
            PileId::Bet(id) => {
                2u8.write(writer);
                id.write(writer);
            }
        }
    }
}

impl Read for PileId {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let tag = u8::read(reader)?;
        match tag {
            0 => Ok(PileId::Player),
            1 => Ok(PileId::House),
            2 => Ok(PileId::Bet(BetId::read(reader)?)),
            other => Err(Error::InvalidEnum(other)),
        }
    }
}

impl EncodeSize for PileId {
    fn encode_size(&self) -> usize {
        match self {
            PileId::Bet(_) => u8::SIZE + BetId::SIZE,
            _ => u8::SIZE,
        }
    }
}

/// Phases of a betting round.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoundPhase {
    AcceptingBets = 0,
    Locked = 1,
    Resolving = 2,
    Settled = 3,
}

impl RoundPhase {
    /// Whether chips may move between the player stack and betting areas.
    pub fn accepts_bets(&self) -> bool {
        matches!(self, RoundPhase::AcceptingBets)
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundPhase::AcceptingBets => "accepting_bets",
            RoundPhase::Locked => "locked",
            RoundPhase::Resolving => "resolving",
            RoundPhase::Settled => "settled",
        };
        f.write_str(name)
    }
}

impl TryFrom<u8> for RoundPhase {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RoundPhase::AcceptingBets),
            1 => Ok(RoundPhase::Locked),
            2 => Ok(RoundPhase::Resolving),
            3 => Ok(RoundPhase::Settled),
            _ => Err(()),
        }
    }
}

impl Write for RoundPhase {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for RoundPhase {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        RoundPhase::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl EncodeSize for RoundPhase {
    fn encode_size(&self) -> usize {
        u8::SIZE
    }
}
