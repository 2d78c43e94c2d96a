use std::time::Duration;

use crate::interpreter::TriggerMode;

/*
    Deployment constants. Nothing here is read at runtime: the `bench` cargo feature
    switches to the desk-testing profile, everything else is the stage rig.
*/

pub const CHANNEL: u8 = 0;
pub const PEDAL_PRESS_CC: u8 = 114;
pub const KEYBOARD_STRING: &str = "Nord";

pub const CLIENT_NAME: &str = "pedal-preset-bridge";

pub const LED_NAME: &str = "led0";
pub const LED_HALF_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSelection {
    /// First port whose name contains the given substring.
    NameContains(String),
    First,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatConfig {
    pub led: String,
    pub half_period: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    pub channel: u8,
    pub pedal_cc: u8,
    pub port_selection: PortSelection,
    pub trigger_mode: TriggerMode,
    pub heartbeat: Option<HeartbeatConfig>,
    /// Log every inbound message at debug level rather than trace.
    pub verbose_trace: bool,
}

impl BridgeConfig {
    /// Release-triggered, finds the keyboard by name, blinks the board LED.
    pub fn stage() -> BridgeConfig {
        BridgeConfig {
            channel: CHANNEL,
            pedal_cc: PEDAL_PRESS_CC,
            port_selection: PortSelection::NameContains(KEYBOARD_STRING.to_string()),
            trigger_mode: TriggerMode::OnRelease,
            heartbeat: Some(HeartbeatConfig {
                led: LED_NAME.to_string(),
                half_period: LED_HALF_PERIOD,
            }),
            verbose_trace: false,
        }
    }

    /// Press-triggered, takes the first ports found, no LED.
    pub fn bench() -> BridgeConfig {
        BridgeConfig {
            channel: CHANNEL,
            pedal_cc: PEDAL_PRESS_CC,
            port_selection: PortSelection::First,
            trigger_mode: TriggerMode::OnPress,
            heartbeat: None,
            verbose_trace: true,
        }
    }
}

impl BridgeConfig {
    // Main loop cadence: the LED half period, or the default one when there is no LED
    pub fn tick_period(&self) -> Duration {
        self.heartbeat
            .as_ref()
            .map(|hb| hb.half_period)
            .unwrap_or(LED_HALF_PERIOD)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        if cfg!(feature = "bench") {
            BridgeConfig::bench()
        } else {
            BridgeConfig::stage()
        }
    }
}
