/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Reset and power-down GPIO sequencing

use core::convert::Infallible;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

#[cfg(feature = "rttdebug")]
use panic_rtt_core::rprintln;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// One step of a timed GPIO sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerStep {
    Reset(Level),
    PowerDown(Level),
    DelayMs(u32),
}

/// Placeholder for a pin the board does not wire up
pub struct NoPin;

impl OutputPin for NoPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// The optional reset and power-down lines of one sensor
pub struct PowerPins<RST, PWDN> {
    pub reset: Option<RST>,
    pub pwdn: Option<PWDN>,
}

impl PowerPins<NoPin, NoPin> {
    /// Neither line is wired
    pub fn none() -> Self {
        Self {
            reset: None,
            pwdn: None,
        }
    }
}

impl<RST, PWDN> PowerPins<RST, PWDN>
where
    RST: OutputPin,
    PWDN: OutputPin,
{
    pub fn new(reset: Option<RST>, pwdn: Option<PWDN>) -> Self {
        Self { reset, pwdn }
    }

    /// Run a GPIO sequence to completion.
    /// Steps for absent pins are skipped. A pin that fails to drive is
    /// logged and otherwise ignored: the sequence always finishes.
    pub fn run(
        &mut self,
        steps: &[PowerStep],
        delay_source: &mut impl DelayMs<u32>,
    ) {
        for step in steps {
            match *step {
                PowerStep::Reset(level) => {
                    if let Some(pin) = self.reset.as_mut() {
                        if drive(pin, level).is_err() {
                            #[cfg(feature = "rttdebug")]
                            rprintln!("reset gpio failed");
                        }
                    }
                }
                PowerStep::PowerDown(level) => {
                    if let Some(pin) = self.pwdn.as_mut() {
                        if drive(pin, level).is_err() {
                            #[cfg(feature = "rttdebug")]
                            rprintln!("pwdn gpio failed");
                        }
                    }
                }
                PowerStep::DelayMs(ms) => delay_source.delay_ms(ms),
            }
        }
    }
}

fn drive<P: OutputPin>(pin: &mut P, level: Level) -> Result<(), P::Error> {
    match level {
        Level::Low => pin.set_low(),
        Level::High => pin.set_high(),
    }
}

#[cfg(test)]
mod test {
    extern crate std;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    use super::*;
    use crate::test::*;

    const SEQUENCE: &[PowerStep] = &[
        PowerStep::Reset(Level::High),
        PowerStep::DelayMs(5),
        PowerStep::Reset(Level::Low),
        PowerStep::DelayMs(10),
        PowerStep::Reset(Level::High),
        PowerStep::DelayMs(10),
        PowerStep::PowerDown(Level::Low),
        PowerStep::DelayMs(10),
    ];

    #[test]
    fn drives_pins_in_order() {
        let log: PinLog = Rc::new(RefCell::new(Vec::new()));
        let mut pins = PowerPins::new(
            Some(MockPin::new("rst", &log)),
            Some(MockPin::new("pwdn", &log)),
        );
        let mut delay = MockDelay::default();
        pins.run(SEQUENCE, &mut delay);
        assert_eq!(
            *log.borrow(),
            [
                ("rst", Level::High),
                ("rst", Level::Low),
                ("rst", Level::High),
                ("pwdn", Level::Low)
            ]
        );
        assert_eq!(delay.total_ms, 35);
    }

    #[test]
    fn absent_pins_keep_the_timing() {
        let mut pins = PowerPins::none();
        let mut delay = MockDelay::default();
        pins.run(SEQUENCE, &mut delay);
        assert_eq!(delay.total_ms, 35);
        assert_eq!(delay.calls, 4);
    }

    #[test]
    fn failing_pin_does_not_stop_sequence() {
        let log: PinLog = Rc::new(RefCell::new(Vec::new()));
        let mut pins =
            PowerPins::new(Some(BrokenPin), Some(MockPin::new("pwdn", &log)));
        let mut delay = MockDelay::default();
        pins.run(SEQUENCE, &mut delay);
        assert_eq!(*log.borrow(), [("pwdn", Level::Low)]);
        assert_eq!(delay.total_ms, 35);
    }
}
