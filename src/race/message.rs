/// Race messages: one ASCII byte each, no framing, no payload.
///
///   's' start race      'u' 'd' 'l' 'r' move
///   'f' I finished      'e' timeout / end
///
/// Stream order is the only state; each message on its own is stateless.

use std::fmt;

use thiserror::Error;

use crate::domain::entity::Direction;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RaceMessage {
    Start,
    Move(Direction),
    Finished,
    End,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown race message byte 0x{0:02x}")]
pub struct UnknownMessage(pub u8);

impl RaceMessage {
    pub fn to_byte(self) -> u8 {
        match self {
            RaceMessage::Start => b's',
            RaceMessage::Move(Direction::Up) => b'u',
            RaceMessage::Move(Direction::Down) => b'd',
            RaceMessage::Move(Direction::Left) => b'l',
            RaceMessage::Move(Direction::Right) => b'r',
            RaceMessage::Finished => b'f',
            RaceMessage::End => b'e',
        }
    }
}

impl TryFrom<u8> for RaceMessage {
    type Error = UnknownMessage;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            b's' => Ok(RaceMessage::Start),
            b'u' => Ok(RaceMessage::Move(Direction::Up)),
            b'd' => Ok(RaceMessage::Move(Direction::Down)),
            b'l' => Ok(RaceMessage::Move(Direction::Left)),
            b'r' => Ok(RaceMessage::Move(Direction::Right)),
            b'f' => Ok(RaceMessage::Finished),
            b'e' => Ok(RaceMessage::End),
            other => Err(UnknownMessage(other)),
        }
    }
}

impl fmt::Display for RaceMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_byte() as char)
    }
}
