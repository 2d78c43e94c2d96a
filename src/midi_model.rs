use crate::error::BridgeError;
use crate::program_counter::ProgramState;

/*
    CHARTING:

    message structure (status high nibble = kind, low nibble = channel):

    program change: [0xC0 | ch, program]
    bank select LSB: [0xB0 | ch, 0x20, bank]
        - bank MSB (controller 0x00) is never sent by the target keyboard, fixed at 0
    pedal: [0xB0 | ch, pedal cc, value]
        - press: nonzero (usually 127), release: 0
*/

pub const CONTROL_CHANGE: u8 = 0xB0;
pub const PROGRAM_CHANGE: u8 = 0xC0;
pub const BANK_SELECT_LSB: u8 = 0x20;

pub const STATUS_MASK: u8 = 0xF0;
pub const CHANNEL_MASK: u8 = 0x0F;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel(u8);

impl Channel {
    pub fn new(value: u8) -> Result<Channel, BridgeError> {
        if value > CHANNEL_MASK {
            return Err(BridgeError::InvalidChannel(value));
        }
        Ok(Channel(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn status(self, kind: u8) -> u8 {
        kind | self.0
    }
}

/// Messages the bridge transmits. Always sent as a bank select followed by a program change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundMessage {
    BankSelectLsb { channel: Channel, bank: u8 },
    ProgramChange { channel: Channel, program: u8 },
}

impl OutboundMessage {
    pub fn preset_pair(channel: Channel, state: ProgramState) -> [OutboundMessage; 2] {
        [
            OutboundMessage::BankSelectLsb {
                channel,
                bank: state.bank_lsb,
            },
            OutboundMessage::ProgramChange {
                channel,
                program: state.program_number,
            },
        ]
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            OutboundMessage::BankSelectLsb { channel, bank } => {
                vec![channel.status(CONTROL_CHANGE), BANK_SELECT_LSB, bank]
            }
            OutboundMessage::ProgramChange { channel, program } => {
                vec![channel.status(PROGRAM_CHANGE), program]
            }
        }
    }
}
