use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Game variants that wager through the chip engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum GameType {
    Baccarat = 0,
    Keno = 1,
    Bingo = 2,
}

impl GameType {
    pub const ALL: [GameType; 3] = [GameType::Baccarat, GameType::Keno, GameType::Bingo];

    pub fn name(&self) -> &'static str {
        match self {
            GameType::Baccarat => "baccarat",
            GameType::Keno => "keno",
            GameType::Bingo => "bingo",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for GameType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GameType::Baccarat),
            1 => Ok(GameType::Keno),
            2 => Ok(GameType::Bingo),
            _ => Err(()),
        }
    }
}

impl Write for GameType {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for GameType {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        GameType::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl FixedSize for GameType {
    const SIZE: usize = 1;
}
