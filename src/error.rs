//! Startup failures. Steady-state dispatch has no error path.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("no MIDI {direction} port name contains '{device}'")]
    DeviceNotFound { direction: Direction, device: String },

    #[error("no MIDI {direction} ports available")]
    NoPorts { direction: Direction },

    #[error("cannot open MIDI {direction} port: {reason}")]
    PortOpen { direction: Direction, reason: String },

    #[error("MIDI backend initialisation failed: {0}")]
    Init(String),

    #[error("MIDI channel {0} out of range 0-15")]
    InvalidChannel(u8),
}

impl From<midir::InitError> for BridgeError {
    fn from(e: midir::InitError) -> Self {
        BridgeError::Init(e.to_string())
    }
}

impl From<midir::ConnectError<midir::MidiInput>> for BridgeError {
    fn from(e: midir::ConnectError<midir::MidiInput>) -> Self {
        BridgeError::PortOpen {
            direction: Direction::Input,
            reason: e.to_string(),
        }
    }
}

impl From<midir::ConnectError<midir::MidiOutput>> for BridgeError {
    fn from(e: midir::ConnectError<midir::MidiOutput>) -> Self {
        BridgeError::PortOpen {
            direction: Direction::Output,
            reason: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
