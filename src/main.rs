use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{BridgeConfig, CLIENT_NAME};
use crate::heartbeat::{Heartbeat, Indicator, NoIndicator, SysfsLed};
use crate::interpreter::Interpreter;
use crate::midi_model::Channel;
use crate::transport::{MidiIn, MidiOut};

mod config;
mod error;
mod heartbeat;
mod interpreter;
mod midi_mapping;
mod midi_model;
mod program_counter;
mod transport;

// How often the main loop checks for an interrupt between heartbeat ticks
const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .ok();

    match run(BridgeConfig::default()) {
        Ok(_) => (),
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(1);
        }
    }
}

fn run(config: BridgeConfig) -> anyhow::Result<()> {
    let channel = Channel::new(config.channel)?;

    let midi_in = MidiIn::find(CLIENT_NAME, &config.port_selection)
        .context("probing MIDI input")?;
    let midi_out = MidiOut::open(CLIENT_NAME, &config.port_selection)
        .context("opening MIDI output")?;

    info!(
        input = midi_in.name(),
        output = midi_out.name(),
        channel = channel.value(),
        mode = ?config.trigger_mode,
        "bridging pedal CC {} to program changes",
        config.pedal_cc
    );

    let interpreter = Interpreter::new(channel, config.pedal_cc, config.trigger_mode, midi_out)
        .with_trace(midi_in.name(), config.verbose_trace);

    let running = Arc::new(AtomicBool::new(true));
    let running_handler = Arc::clone(&running);
    ctrlc::set_handler(move || {
        running_handler.store(false, Ordering::SeqCst);
    })
    .context("installing interrupt handler")?;

    let link = midi_in
        .attach(CLIENT_NAME, interpreter)
        .context("opening MIDI input")?;

    let indicator: Box<dyn Indicator> = match &config.heartbeat {
        Some(hb) => match SysfsLed::open(&hb.led) {
            Ok(led) => Box::new(led),
            Err(err) => {
                warn!("heartbeat LED {} unavailable, running without it: {}", hb.led, err);
                Box::new(NoIndicator)
            }
        },
        None => Box::new(NoIndicator),
    };
    let half_period = config.tick_period();

    info!("Entering main loop. Press Control-C to exit.");

    let mut heartbeat = Heartbeat::new(indicator);
    while running.load(Ordering::SeqCst) {
        heartbeat.tick();
        wait(&running, half_period);
    }

    heartbeat.stop();

    let interpreter = link.close();
    let state = interpreter.state();
    info!(
        bank = state.bank_lsb,
        program = state.program_number,
        "Exit."
    );
    let (_counter, midi_out) = interpreter.into_parts();
    midi_out.close();

    Ok(())
}

fn wait(running: &AtomicBool, period: Duration) {
    let deadline = Instant::now() + period;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        sleep(POLL_INTERVAL.min(deadline - now));
    }
}
