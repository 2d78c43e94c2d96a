use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, trace};

use crate::midi_mapping;
use crate::midi_model::{Channel, OutboundMessage};
use crate::program_counter::{ProgramCounter, ProgramState};

/// Which edge of the pedal advances the preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Fires on every pedal control change regardless of value, so a full
    /// press/release cycle advances twice.
    OnPress,
    /// Fires only when the pedal value is 0.
    OnRelease,
}

impl TriggerMode {
    pub fn fires(self, pedal_value: u8) -> bool {
        match self {
            TriggerMode::OnPress => true,
            TriggerMode::OnRelease => pedal_value == 0,
        }
    }
}

// Fire-and-forget
pub trait OutboundSender {
    fn send(&mut self, bytes: &[u8]);
}

// Per-message trace, wall clock reconstructed from the transport's deltatimes
struct Trace {
    port: String,
    wallclock: f64,
    verbose: bool,
}

pub struct Interpreter<S: OutboundSender> {
    channel: Channel,
    pedal_cc: u8,
    mode: TriggerMode,
    counter: ProgramCounter,
    sender: S,
    trace: Option<Trace>,
}

impl<S: OutboundSender> Interpreter<S> {
    pub fn new(channel: Channel, pedal_cc: u8, mode: TriggerMode, sender: S) -> Interpreter<S> {
        Interpreter {
            channel,
            pedal_cc,
            mode,
            counter: ProgramCounter::new(),
            sender,
            trace: None,
        }
    }

    /// Log every inbound message with the port name and an accumulated wall clock.
    /// `verbose` emits at debug level instead of trace.
    pub fn with_trace(mut self, port: impl Into<String>, verbose: bool) -> Interpreter<S> {
        let wallclock = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        self.trace = Some(Trace {
            port: port.into(),
            wallclock,
            verbose,
        });
        self
    }

    pub fn state(&self) -> ProgramState {
        self.counter.state()
    }

    pub fn into_parts(self) -> (ProgramCounter, S) {
        (self.counter, self.sender)
    }

    // All three checks run independently
    pub fn handle(&mut self, message: &[u8], deltatime: f64) {
        self.trace_message(message, deltatime);

        if let Some(program) = midi_mapping::program_change(message, self.channel) {
            self.counter.set_program(program);
        }

        if let Some(bank) = midi_mapping::bank_lsb_change(message, self.channel) {
            self.counter.set_bank_lsb(bank);
        }

        if let Some(value) = midi_mapping::pedal_value(message, self.channel, self.pedal_cc) {
            if self.mode.fires(value) {
                self.counter.increment();
                self.send_preset();
            }
        }
    }

    fn send_preset(&mut self) {
        let state = self.counter.state();
        debug!(
            bank = state.bank_lsb,
            program = state.program_number,
            "pedal trigger, selecting preset"
        );
        for message in OutboundMessage::preset_pair(self.channel, state) {
            self.sender.send(&message.to_bytes());
        }
    }

    fn trace_message(&mut self, message: &[u8], deltatime: f64) {
        let Some(t) = self.trace.as_mut() else {
            return;
        };
        t.wallclock += deltatime;
        if t.verbose {
            debug!("[{}] @{:0.6} {:?}", t.port, t.wallclock, message);
        } else {
            trace!("[{}] @{:0.6} {:?}", t.port, t.wallclock, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl OutboundSender for Vec<Vec<u8>> {
        fn send(&mut self, bytes: &[u8]) {
            self.push(bytes.to_vec());
        }
    }

    const PEDAL: u8 = 114;

    fn interpreter(channel: u8, mode: TriggerMode) -> Interpreter<Vec<Vec<u8>>> {
        Interpreter::new(Channel::new(channel).unwrap(), PEDAL, mode, Vec::new())
    }

    fn state(program_number: u8, bank_lsb: u8) -> ProgramState {
        ProgramState {
            program_number,
            bank_lsb,
        }
    }

    fn sent(interpreter: Interpreter<Vec<Vec<u8>>>) -> Vec<Vec<u8>> {
        interpreter.into_parts().1
    }

    #[test]
    fn release_mode_ignores_press_and_fires_on_release() {
        let mut bridge = interpreter(1, TriggerMode::OnRelease);

        bridge.handle(&[0xB1, PEDAL, 127], 0.0);
        assert_eq!(bridge.state(), state(0, 0));

        bridge.handle(&[0xB1, PEDAL, 0], 0.2);
        assert_eq!(bridge.state(), state(1, 0));
        assert_eq!(sent(bridge), vec![vec![0xB1, 0x20, 0], vec![0xC1, 1]]);
    }

    #[test]
    fn press_mode_fires_on_any_pedal_value() {
        let mut bridge = interpreter(0, TriggerMode::OnPress);

        bridge.handle(&[0xB0, PEDAL, 127], 0.0);
        assert_eq!(bridge.state(), state(1, 0));

        bridge.handle(&[0xB0, PEDAL, 0], 0.3);
        assert_eq!(bridge.state(), state(2, 0));

        assert_eq!(
            sent(bridge),
            vec![
                vec![0xB0, 0x20, 0],
                vec![0xC0, 1],
                vec![0xB0, 0x20, 0],
                vec![0xC0, 2],
            ]
        );
    }

    #[test]
    fn tracks_program_change_silently() {
        let mut bridge = interpreter(0, TriggerMode::OnRelease);
        bridge.handle(&[0xB0, 0x20, 1], 0.0);
        bridge.handle(&[0xC0, 42], 0.0);
        assert_eq!(bridge.state(), state(42, 1));
        assert!(sent(bridge).is_empty());
    }

    #[test]
    fn tracks_bank_select_silently() {
        let mut bridge = interpreter(0, TriggerMode::OnRelease);
        bridge.handle(&[0xB0, 0x20, 2], 0.0);
        assert_eq!(bridge.state(), state(0, 2));
        assert!(sent(bridge).is_empty());
    }

    #[test]
    fn trigger_uses_tracked_position() {
        let mut bridge = interpreter(2, TriggerMode::OnRelease);
        bridge.handle(&[0xB2, 0x20, 1], 0.0);
        bridge.handle(&[0xC2, 99], 0.0);
        bridge.handle(&[0xB2, PEDAL, 0], 0.0);

        assert_eq!(bridge.state(), state(0, 2));
        assert_eq!(sent(bridge), vec![vec![0xB2, 0x20, 2], vec![0xC2, 0]]);
    }

    #[test]
    fn ceiling_resends_same_preset() {
        let mut bridge = interpreter(0, TriggerMode::OnRelease);
        bridge.handle(&[0xB0, 0x20, 3], 0.0);
        bridge.handle(&[0xC0, 99], 0.0);
        bridge.handle(&[0xB0, PEDAL, 0], 0.0);
        bridge.handle(&[0xB0, PEDAL, 0], 0.0);

        assert_eq!(bridge.state(), state(99, 3));
        assert_eq!(
            sent(bridge),
            vec![
                vec![0xB0, 0x20, 3],
                vec![0xC0, 99],
                vec![0xB0, 0x20, 3],
                vec![0xC0, 99],
            ]
        );
    }

    #[test]
    fn other_channels_are_ignored() {
        let mut bridge = interpreter(0, TriggerMode::OnPress);
        for other in 1..16u8 {
            bridge.handle(&[0xC0 | other, 42], 0.0);
            bridge.handle(&[0xB0 | other, 0x20, 2], 0.0);
            bridge.handle(&[0xB0 | other, PEDAL, 0], 0.0);
            bridge.handle(&[0xB0 | other, PEDAL, 127], 0.0);
        }
        assert_eq!(bridge.state(), state(0, 0));
        assert!(sent(bridge).is_empty());
    }

    #[test]
    fn truncated_and_unrelated_messages_are_ignored() {
        let mut bridge = interpreter(0, TriggerMode::OnPress).with_trace("test", false);
        bridge.handle(&[], 0.0);
        bridge.handle(&[0xB0], 0.0);
        bridge.handle(&[0xB0, PEDAL], 0.0);
        bridge.handle(&[0xC0], 0.0);
        bridge.handle(&[0x90, 60, 100], 0.0);
        bridge.handle(&[0xB0, 64, 127], 0.0);
        assert_eq!(bridge.state(), state(0, 0));
        assert!(sent(bridge).is_empty());
    }

    #[test]
    fn trace_clock_accumulates_deltatimes() {
        let mut bridge = interpreter(0, TriggerMode::OnRelease).with_trace("test", true);
        let start = bridge.trace.as_ref().unwrap().wallclock;
        assert!(start > 0.0);

        bridge.handle(&[0xC0, 1], 0.0);
        bridge.handle(&[0xC0, 2], 1.5);
        bridge.handle(&[0xB0], 0.25);

        let elapsed = bridge.trace.as_ref().unwrap().wallclock - start;
        assert!((elapsed - 1.75).abs() < 1e-6);
    }

    #[test]
    fn no_trace_by_default() {
        assert!(interpreter(0, TriggerMode::OnPress).trace.is_none());
    }

    #[test]
    fn trigger_modes() {
        assert!(TriggerMode::OnPress.fires(0));
        assert!(TriggerMode::OnPress.fires(127));
        assert!(TriggerMode::OnRelease.fires(0));
        assert!(!TriggerMode::OnRelease.fires(1));
    }
}
