use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

pub trait Indicator {
    fn set(&mut self, on: bool);
}

impl<I: Indicator + ?Sized> Indicator for Box<I> {
    fn set(&mut self, on: bool) {
        (**self).set(on)
    }
}

pub struct NoIndicator;

impl Indicator for NoIndicator {
    fn set(&mut self, _on: bool) {}
}

const LED_CLASS_ROOT: &str = "/sys/class/leds";

/// LED driven through the kernel LED class interface (e.g. the Raspberry Pi ACT led).
pub struct SysfsLed {
    brightness: PathBuf,
    failed: bool,
}

impl SysfsLed {
    pub fn open(name: &str) -> io::Result<SysfsLed> {
        SysfsLed::open_in(Path::new(LED_CLASS_ROOT), name)
    }

    /// Detach the kernel trigger so brightness writes stick.
    pub fn open_in(root: &Path, name: &str) -> io::Result<SysfsLed> {
        let dir = root.join(name);
        fs::write(dir.join("trigger"), "none")?;
        let brightness = dir.join("brightness");
        fs::write(&brightness, "0")?;
        debug!("LED {} ready", dir.display());
        Ok(SysfsLed {
            brightness,
            failed: false,
        })
    }
}

impl Indicator for SysfsLed {
    fn set(&mut self, on: bool) {
        let value = if on { "1" } else { "0" };
        match fs::write(&self.brightness, value) {
            Ok(()) => self.failed = false,
            // Only report the first failure of a streak, the loop retries every tick
            Err(err) if !self.failed => {
                self.failed = true;
                warn!("cannot write {}: {}", self.brightness.display(), err);
            }
            Err(_) => {}
        }
    }
}

pub struct Heartbeat<I: Indicator> {
    indicator: I,
    lit: bool,
}

impl<I: Indicator> Heartbeat<I> {
    pub fn new(indicator: I) -> Heartbeat<I> {
        Heartbeat {
            indicator,
            lit: false,
        }
    }

    pub fn tick(&mut self) {
        self.lit = !self.lit;
        self.indicator.set(self.lit);
    }

    pub fn stop(mut self) -> I {
        self.lit = false;
        self.indicator.set(false);
        self.indicator
    }
}
