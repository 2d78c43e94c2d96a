use crate::midi_model::{
    Channel, BANK_SELECT_LSB, CHANNEL_MASK, CONTROL_CHANGE, PROGRAM_CHANGE, STATUS_MASK,
};

/*
    Channel-scoped predicates over raw inbound bytes.

    Each predicate describes the leading bytes it needs as a pattern. A message shorter
    than its pattern never matches, so truncated input is simply ignored.
*/

#[derive(Clone, Copy)]
enum IntMatch {
    Abs(u8),
    Status { kind: u8, channel: u8 },
    Any,
}

fn matches(event: &[u8], structure: &[IntMatch]) -> bool {
    if event.len() < structure.len() {
        return false;
    }

    event.iter().zip(structure).all(|(&content, expected)| match *expected {
        IntMatch::Abs(value) => value == content,
        IntMatch::Status { kind, channel } => {
            content & STATUS_MASK == kind && content & CHANNEL_MASK == channel
        }
        IntMatch::Any => true,
    })
}

fn status(kind: u8, channel: Channel) -> IntMatch {
    IntMatch::Status {
        kind,
        channel: channel.value(),
    }
}

pub fn program_change(event: &[u8], channel: Channel) -> Option<u8> {
    matches(event, &[status(PROGRAM_CHANGE, channel), IntMatch::Any]).then(|| event[1])
}

pub fn bank_lsb_change(event: &[u8], channel: Channel) -> Option<u8> {
    matches(
        event,
        &[
            status(CONTROL_CHANGE, channel),
            IntMatch::Abs(BANK_SELECT_LSB),
            IntMatch::Any,
        ],
    )
    .then(|| event[2])
}

/// Value of a pedal control change (`pedal_cc`) on `channel`. 0 is release, anything else press.
pub fn pedal_value(event: &[u8], channel: Channel, pedal_cc: u8) -> Option<u8> {
    matches(
        event,
        &[
            status(CONTROL_CHANGE, channel),
            IntMatch::Abs(pedal_cc),
            IntMatch::Any,
        ],
    )
    .then(|| event[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEDAL: u8 = 114;

    fn ch(value: u8) -> Channel {
        Channel::new(value).unwrap()
    }

    #[test]
    fn detects_program_change() {
        assert_eq!(program_change(&[0xC0, 42], ch(0)), Some(42));
        assert_eq!(program_change(&[0xC3, 7], ch(3)), Some(7));
        assert_eq!(program_change(&[0xC1, 42], ch(0)), None);
        assert_eq!(program_change(&[0xB0, 42, 0], ch(0)), None);
        assert_eq!(program_change(&[0xC0], ch(0)), None);
    }

    #[test]
    fn detects_bank_lsb() {
        assert_eq!(bank_lsb_change(&[0xB0, 0x20, 2], ch(0)), Some(2));
        assert_eq!(bank_lsb_change(&[0xB0, 0x00, 2], ch(0)), None);
        assert_eq!(bank_lsb_change(&[0xB2, 0x20, 2], ch(0)), None);
        assert_eq!(bank_lsb_change(&[0xB0, 0x20], ch(0)), None);
    }

    #[test]
    fn detects_pedal() {
        assert_eq!(pedal_value(&[0xB1, PEDAL, 127], ch(1), PEDAL), Some(127));
        assert_eq!(pedal_value(&[0xB1, PEDAL, 0], ch(1), PEDAL), Some(0));
        assert_eq!(pedal_value(&[0xB1, 64, 0], ch(1), PEDAL), None);
        assert_eq!(pedal_value(&[0xB0, PEDAL, 0], ch(1), PEDAL), None);
        assert_eq!(pedal_value(&[0x91, PEDAL, 0], ch(1), PEDAL), None);
    }

    #[test]
    fn truncated_messages_never_match() {
        for event in [&[][..], &[0xB0][..], &[0xB0, PEDAL][..], &[0xC0][..]] {
            assert_eq!(program_change(event, ch(0)), None);
            assert_eq!(bank_lsb_change(event, ch(0)), None);
            assert_eq!(pedal_value(event, ch(0), PEDAL), None);
        }
    }

    #[test]
    fn trailing_bytes_are_tolerated() {
        assert_eq!(program_change(&[0xC0, 9, 0], ch(0)), Some(9));
    }
}
