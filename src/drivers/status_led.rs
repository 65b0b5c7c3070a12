//! RGB status LED driver.
//!
//! Three PWM channels drive discrete R/G/B LEDs (or a common-cathode RGB
//! LED).  Duty is the 8-bit colour component over 255.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: the channels are LEDC drivers.
//! On host/test: any `SetDutyCycle` implementation, typically a recording fake.

use embedded_hal::pwm::SetDutyCycle;

use crate::decision::effects::{COLOUR_OFF, Rgb};

pub struct StatusLed<P: SetDutyCycle> {
    red: P,
    green: P,
    blue: P,
    current: Rgb,
}

impl<P: SetDutyCycle> StatusLed<P> {
    pub fn new(red: P, green: P, blue: P) -> Self {
        Self {
            red,
            green,
            blue,
            current: COLOUR_OFF,
        }
    }

    /// Write `colour`; repeated writes of the same colour are skipped.
    pub fn set_colour(&mut self, colour: Rgb) -> Result<(), P::Error> {
        if colour == self.current {
            return Ok(());
        }
        let (r, g, b) = colour;
        self.red.set_duty_cycle_fraction(r.into(), 255)?;
        self.green.set_duty_cycle_fraction(g.into(), 255)?;
        self.blue.set_duty_cycle_fraction(b.into(), 255)?;
        self.current = colour;
        Ok(())
    }

    pub fn off(&mut self) -> Result<(), P::Error> {
        self.set_colour(COLOUR_OFF)
    }

    pub fn current_colour(&self) -> Rgb {
        self.current
    }
}
