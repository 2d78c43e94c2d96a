use itertools::Itertools;
use midir::{Ignore, MidiIO, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use tracing::{debug, info, warn};

use crate::config::PortSelection;
use crate::error::{BridgeError, Direction, Result};
use crate::interpreter::{Interpreter, OutboundSender};

/*
    midir plumbing around the interpreter: find ports, open them, and hand every
    inbound message to the interpreter from the input callback.
*/

/// Index into `names` picked by `selection`. Among several name matches the last one wins.
pub fn select_port(
    names: &[String],
    selection: &PortSelection,
    direction: Direction,
) -> Result<usize> {
    match selection {
        PortSelection::First if names.is_empty() => Err(BridgeError::NoPorts { direction }),
        PortSelection::First => Ok(0),
        PortSelection::NameContains(device) => names
            .iter()
            .rposition(|name| name.contains(device.as_str()))
            .ok_or_else(|| BridgeError::DeviceNotFound {
                direction,
                device: device.clone(),
            }),
    }
}

fn find_port<IO: MidiIO>(
    io: &IO,
    selection: &PortSelection,
    direction: Direction,
) -> Result<(IO::Port, String)> {
    let mut ports = io.ports();
    let names: Vec<String> = ports
        .iter()
        .enumerate()
        .map(|(index, port)| {
            io.port_name(port)
                .unwrap_or_else(|_| format!("Port {index}"))
        })
        .collect();

    debug!("available MIDI {} ports: [{}]", direction, names.iter().join(", "));

    let index = select_port(&names, selection, direction)?;
    let port = ports.swap_remove(index);
    let name = names[index].clone();
    info!("Found MIDI {}: {}", direction, name);
    Ok((port, name))
}

// midir stamps are microseconds; the interpreter wants seconds since the previous message
#[derive(Debug, Default)]
pub struct DeltaClock {
    last_stamp: Option<u64>,
}

impl DeltaClock {
    pub fn next(&mut self, stamp: u64) -> f64 {
        let deltatime = self
            .last_stamp
            .map(|last| stamp.saturating_sub(last) as f64 / 1_000_000.0)
            .unwrap_or(0.0);
        self.last_stamp = Some(stamp);
        deltatime
    }
}

pub struct MidiOut {
    name: String,
    connection: MidiOutputConnection,
}

impl MidiOut {
    pub fn open(client_name: &str, selection: &PortSelection) -> Result<MidiOut> {
        let midi_out = MidiOutput::new(client_name)?;
        let (port, name) = find_port(&midi_out, selection, Direction::Output)?;
        let connection = midi_out.connect(&port, &format!("{client_name}-output"))?;
        info!("Opened MIDI output '{}'", name);
        Ok(MidiOut { name, connection })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn close(self) {
        debug!("Closing MIDI output '{}'", self.name);
        let _midi_out = self.connection.close();
    }
}

impl OutboundSender for MidiOut {
    fn send(&mut self, bytes: &[u8]) {
        if let Err(err) = self.connection.send(bytes) {
            warn!(port = %self.name, ?bytes, "failed to send MIDI message: {err}");
        }
    }
}

// Found but not yet connected
pub struct MidiIn {
    name: String,
    midi_in: MidiInput,
    port: midir::MidiInputPort,
}

impl MidiIn {
    pub fn find(client_name: &str, selection: &PortSelection) -> Result<MidiIn> {
        let mut midi_in = MidiInput::new(client_name)?;
        midi_in.ignore(Ignore::All);
        let (port, name) = find_port(&midi_in, selection, Direction::Input)?;
        Ok(MidiIn {
            name,
            midi_in,
            port,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // Connect and make `interpreter` the callback target for every inbound message.
    pub fn attach<S>(self, client_name: &str, interpreter: Interpreter<S>) -> Result<InputLink<S>>
    where
        S: OutboundSender + Send + 'static,
    {
        let mut clock = DeltaClock::default();

        let connection = self.midi_in.connect(
            &self.port,
            &format!("{client_name}-input"),
            move |stamp, message, interpreter: &mut Interpreter<S>| {
                interpreter.handle(message, clock.next(stamp));
            },
            interpreter,
        )?;

        info!("Attached MIDI input handler to '{}'", self.name);
        Ok(InputLink {
            name: self.name,
            connection,
        })
    }
}

/// Live input connection. Must be kept alive for messages to keep flowing.
pub struct InputLink<S: OutboundSender + Send + 'static> {
    name: String,
    connection: MidiInputConnection<Interpreter<S>>,
}

impl<S: OutboundSender + Send + 'static> InputLink<S> {
    pub fn close(self) -> Interpreter<S> {
        info!("Closing MIDI input '{}'", self.name);
        let (_midi_in, interpreter) = self.connection.close();
        interpreter
    }
}
