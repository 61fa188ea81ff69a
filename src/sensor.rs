/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! The per-instance driver: probe, the subdevice operations, and the
//! control command multiplexer.

use core::marker::PhantomData;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c::{Write, WriteRead};
use embedded_hal::digital::v2::OutputPin;

#[cfg(feature = "rttdebug")]
use panic_rtt_core::rprintln;

use crate::attr::{BayerOrder, PixelFormat, SensorAttr, SensorMode};
use crate::bus::SensorBus;
use crate::command::Command;
use crate::config::SensorConfig;
use crate::gain::{alloc_dgain, Allocation, GAIN_UNITY};
use crate::model::SensorModel;
use crate::power::PowerPins;
use crate::regs::RegisterAddress;
use crate::timing::Fps;
use crate::Error;

/// Lifecycle of one sensor instance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Constructed, chip not yet identified
    Unprobed,
    /// Chip identified, registers in power-on state
    Ready,
    /// Active mode programmed
    Initialized,
    Streaming,
}

/// Identity reported for `g_chip_ident`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChipIdent {
    pub name: &'static str,
    pub chip_id: u16,
    pub i2c_address: u8,
}

/// Last exposure settings written to the sensor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exposure {
    pub integration_time: u32,
    pub again: Allocation,
    pub dgain: Allocation,
}

/// Driver for one sensor of model `M` on bus `I2C`
pub struct Sensor<M: SensorModel, I2C, RST, PWDN> {
    bus: SensorBus<I2C, M::Addr>,
    pins: PowerPins<RST, PWDN>,
    config: SensorConfig,
    state: State,
    mode: usize,
    attr: SensorAttr,
    exposure: Exposure,
    hflip: bool,
    vflip: bool,
    _model: PhantomData<M>,
}

impl<M: SensorModel, I2C, RST, PWDN> Sensor<M, I2C, RST, PWDN> {
    /// Create an unprobed instance. Nothing touches the bus until `probe`.
    pub fn new(
        i2c: I2C,
        pins: PowerPins<RST, PWDN>,
        config: SensorConfig,
    ) -> Self {
        let address = config.i2c_address.unwrap_or(M::I2C_ADDRESS);
        let mut attr = SensorAttr {
            name: M::NAME,
            chip_id: M::CHIP_ID,
            i2c_address: address,
            interface: M::INTERFACE,
            format: PixelFormat {
                order: BayerOrder::Mono,
                bits: 0,
            },
            width: 0,
            height: 0,
            fps: Fps::new(0, 1),
            total_width: 0,
            total_height: 0,
            max_again: M::AGAIN.max_gain(M::MAX_AGAIN),
            max_dgain: M::MAX_DGAIN,
            min_integration_time: M::MIN_INTEGRATION_TIME,
            max_integration_time: 0,
            integration_time_limit: 0,
        };
        if let Some(mode) = M::MODES.get(config.mode) {
            apply_mode::<M>(&mut attr, mode);
        }
        let exposure = Exposure {
            integration_time: 0,
            again: M::AGAIN.allocate(0, M::MAX_AGAIN),
            dgain: alloc_dgain(M::DGAIN.as_ref(), GAIN_UNITY, M::MAX_DGAIN),
        };

        Self {
            bus: SensorBus::new(i2c, address, M::MARKERS),
            pins,
            config,
            state: State::Unprobed,
            mode: config.mode,
            attr,
            exposure,
            hflip: false,
            vflip: false,
            _model: PhantomData,
        }
    }

    /// Attributes the ISP synchronizes against
    pub fn attr(&self) -> &SensorAttr {
        &self.attr
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn exposure(&self) -> Exposure {
        self.exposure
    }

    pub fn mode_index(&self) -> usize {
        self.mode
    }

    pub fn mode(&self) -> Option<&'static SensorMode<M::Addr>> {
        M::MODES.get(self.mode)
    }

    pub fn flip(&self) -> (bool, bool) {
        (self.hflip, self.vflip)
    }
}

impl<M, I2C, RST, PWDN, CommE> Sensor<M, I2C, RST, PWDN>
where
    M: SensorModel,
    I2C: Write<Error = CommE> + WriteRead<Error = CommE>,
    RST: OutputPin,
    PWDN: OutputPin,
{
    /// Power the sensor up and confirm it is the expected chip.
    /// A chip ID mismatch fails the probe; there is no retry.
    pub fn probe(
        &mut self,
        delay_source: &mut impl DelayMs<u32>,
    ) -> Result<ChipIdent, Error<CommE>> {
        #[cfg(feature = "rttdebug")]
        rprintln!("{} probe start", M::NAME);

        if let Some(interface) = self.config.data_interface {
            if interface != M::INTERFACE {
                return Err(Error::UnsupportedInterface(interface));
            }
        }
        let mode = M::MODES
            .get(self.config.mode)
            .ok_or(Error::InvalidMode(self.config.mode))?;

        self.pins.run(M::POWER_UP, delay_source);

        let found = self.detect()?;
        if found != M::CHIP_ID {
            #[cfg(feature = "rttdebug")]
            rprintln!(
                "{} unknown chip id 0x{:x} expected 0x{:x}",
                M::NAME,
                found,
                M::CHIP_ID
            );
            return Err(Error::UnknownChipId {
                expected: M::CHIP_ID,
                found,
            });
        }

        self.mode = self.config.mode;
        apply_mode::<M>(&mut self.attr, mode);
        self.state = State::Ready;

        #[cfg(feature = "rttdebug")]
        rprintln!("{} probe done", M::NAME);
        Ok(self.ident())
    }

    /// Read the chip ID registers
    pub fn detect(&mut self) -> Result<u16, Error<CommE>> {
        let (upper, lower) = M::CHIP_ID_REGS;
        self.bus.read_reg_u16(upper, lower)
    }

    pub fn chip_ident(&self) -> Result<ChipIdent, Error<CommE>> {
        self.ensure_probed()?;
        Ok(self.ident())
    }

    /// Hardware reset through the GPIO power-up sequence.
    /// Register contents are lost, so the sensor must be initialized again.
    pub fn reset(
        &mut self,
        delay_source: &mut impl DelayMs<u32>,
    ) -> Result<(), Error<CommE>> {
        self.ensure_probed()?;
        self.pins.run(M::POWER_UP, delay_source);
        self.state = State::Ready;
        Ok(())
    }

    /// Program the active mode (`enable`), or drop back to the
    /// uninitialized state (stopping the stream first if needed).
    /// A table that fails partway leaves the sensor uninitialized.
    pub fn init(
        &mut self,
        enable: bool,
        delay_source: &mut impl DelayMs<u32>,
    ) -> Result<(), Error<CommE>> {
        self.ensure_probed()?;
        if !enable {
            self.stream(false, delay_source)?;
            self.state = State::Ready;
            return Ok(());
        }
        self.load_mode(self.mode, delay_source)
    }

    /// Start or stop pixel output. Starting requires a prior `init(true)`;
    /// stopping a sensor that is not streaming does nothing.
    pub fn s_stream(
        &mut self,
        enable: bool,
        delay_source: &mut impl DelayMs<u32>,
    ) -> Result<(), Error<CommE>> {
        self.ensure_probed()?;
        self.stream(enable, delay_source)
    }

    /// Raw register read for debugging
    pub fn read_register(&mut self, raw: u16) -> Result<u8, Error<CommE>> {
        self.ensure_probed()?;
        let reg = M::Addr::from_raw(raw).ok_or(Error::InvalidRegister(raw))?;
        self.bus.read_reg_u8(reg)
    }

    /// Raw register write for debugging
    pub fn write_register(
        &mut self,
        raw: u16,
        val: u8,
    ) -> Result<(), Error<CommE>> {
        self.ensure_probed()?;
        let reg = M::Addr::from_raw(raw).ok_or(Error::InvalidRegister(raw))?;
        self.bus.write_reg_u8(reg, val)
    }

    /// Read back every register the active mode table programs
    pub fn read_back_mode(
        &mut self,
        delay_source: &mut impl DelayMs<u32>,
        mut visit: impl FnMut(u16, u8),
    ) -> Result<(), Error<CommE>> {
        self.ensure_probed()?;
        let mode = self.active_mode()?;
        self.bus
            .read_array(mode.regs, delay_source, |reg, val| {
                visit(reg.to_raw(), val)
            })
    }

    /// Decode and run a raw (code, argument) control command
    pub fn ioctl_raw(
        &mut self,
        code: u32,
        arg: u32,
        delay_source: &mut impl DelayMs<u32>,
    ) -> Result<(), Error<CommE>> {
        let cmd =
            Command::from_raw(code, arg).ok_or(Error::UnsupportedCommand(code))?;
        self.ioctl(cmd, delay_source)
    }

    pub fn ioctl(
        &mut self,
        cmd: Command,
        delay_source: &mut impl DelayMs<u32>,
    ) -> Result<(), Error<CommE>> {
        self.ensure_probed()?;
        match cmd {
            Command::IntegrationTime(lines) => {
                self.set_integration_time(lines)?;
            }
            Command::AnalogGain(gain) => {
                self.set_again(gain)?;
            }
            Command::DigitalGain(gain) => {
                self.set_dgain(gain)?;
            }
            Command::Exposure {
                integration_time,
                again,
            } => {
                self.set_integration_time(integration_time)?;
                self.set_again(again)?;
            }
            Command::Fps(fps) => self.set_fps(fps)?,
            Command::HFlip(enable) => self.set_flip(enable, self.vflip)?,
            Command::VFlip(enable) => self.set_flip(self.hflip, enable)?,
            Command::Mode(index) => self.set_mode(index, delay_source)?,
        }
        Ok(())
    }

    /// Exposure in lines, clamped to the current integration bounds.
    /// Returns the value written.
    pub fn set_integration_time(
        &mut self,
        lines: u32,
    ) -> Result<u32, Error<CommE>> {
        self.ensure_probed()?;
        let lines = lines
            .min(self.attr.max_integration_time)
            .max(self.attr.min_integration_time);
        M::write_integration_time::<I2C, CommE>(&mut self.bus, lines)?;
        self.exposure.integration_time = lines;
        Ok(lines)
    }

    /// Apply the closest supported analog gain not above `gain`
    pub fn set_again(&mut self, gain: u32) -> Result<Allocation, Error<CommE>> {
        self.ensure_probed()?;
        let alloc = M::AGAIN.allocate(gain, self.attr.max_again);
        M::write_again::<I2C, CommE>(&mut self.bus, alloc.code)?;
        self.exposure.again = alloc;
        Ok(alloc)
    }

    /// Apply digital gain; models without it stay at unity and
    /// nothing is written.
    pub fn set_dgain(&mut self, gain: u32) -> Result<Allocation, Error<CommE>> {
        self.ensure_probed()?;
        let alloc = alloc_dgain(M::DGAIN.as_ref(), gain, self.attr.max_dgain);
        if M::DGAIN.is_some() {
            M::write_dgain::<I2C, CommE>(&mut self.bus, alloc.code)?;
        }
        self.exposure.dgain = alloc;
        Ok(alloc)
    }

    /// Stretch or shrink the frame to run at `fps`.
    /// Out-of-range requests are rejected before any register is touched.
    pub fn set_fps(&mut self, fps: Fps) -> Result<(), Error<CommE>> {
        self.ensure_probed()?;
        if !M::FPS_RANGE.contains(fps) {
            #[cfg(feature = "rttdebug")]
            rprintln!("{} fps {:x} out of range", M::NAME, fps.raw());
            return Err(Error::FpsOutOfRange(fps));
        }
        let mode = self.active_mode()?;
        let hts = M::read_hts::<I2C, CommE>(&mut self.bus)?;
        let vts = M::vts_for(mode.pclk, hts, fps)
            .ok_or(Error::InvalidTiming)?
            .max(mode.vts as u32);
        M::write_vts::<I2C, CommE>(&mut self.bus, vts)?;

        self.attr.fps = fps;
        self.attr.total_width = hts;
        self.attr.total_height = vts;
        self.attr.max_integration_time =
            vts.saturating_sub(M::INTEGRATION_MARGIN);
        self.attr.integration_time_limit = self.attr.max_integration_time;
        Ok(())
    }

    pub fn set_flip(
        &mut self,
        hflip: bool,
        vflip: bool,
    ) -> Result<(), Error<CommE>> {
        self.ensure_probed()?;
        M::write_flip::<I2C, CommE>(&mut self.bus, hflip, vflip)?;
        self.hflip = hflip;
        self.vflip = vflip;
        Ok(())
    }

    /// Switch resolution/frame rate. A streaming sensor is stopped,
    /// reprogrammed and restarted.
    pub fn set_mode(
        &mut self,
        index: usize,
        delay_source: &mut impl DelayMs<u32>,
    ) -> Result<(), Error<CommE>> {
        self.ensure_probed()?;
        if index >= M::MODES.len() {
            return Err(Error::InvalidMode(index));
        }

        #[cfg(feature = "rttdebug")]
        rprintln!("{} mode {}", M::NAME, index);

        let was_streaming = self.state == State::Streaming;
        self.stream(false, delay_source)?;
        self.load_mode(index, delay_source)?;
        if was_streaming {
            self.stream(true, delay_source)?;
        }
        Ok(())
    }

    /// Stop streaming if needed, run the power-down sequence and hand back
    /// the bus and pins. Failure to stop the stream is not fatal here.
    pub fn release(
        mut self,
        delay_source: &mut impl DelayMs<u32>,
    ) -> (I2C, PowerPins<RST, PWDN>) {
        if self.state == State::Streaming {
            let res = M::set_streaming::<I2C, CommE, _>(
                &mut self.bus,
                false,
                delay_source,
            );
            if res.is_err() {
                #[cfg(feature = "rttdebug")]
                rprintln!("{} stream off failed on release", M::NAME);
            }
        }
        self.pins.run(M::POWER_DOWN, delay_source);
        (self.bus.release(), self.pins)
    }

    fn stream(
        &mut self,
        enable: bool,
        delay_source: &mut impl DelayMs<u32>,
    ) -> Result<(), Error<CommE>> {
        match (enable, self.state) {
            (true, State::Streaming) | (false, State::Ready) => Ok(()),
            (false, State::Initialized) => Ok(()),
            (true, State::Initialized) => {
                M::set_streaming::<I2C, CommE, _>(
                    &mut self.bus,
                    true,
                    delay_source,
                )?;
                self.state = State::Streaming;
                Ok(())
            }
            (false, State::Streaming) => {
                M::set_streaming::<I2C, CommE, _>(
                    &mut self.bus,
                    false,
                    delay_source,
                )?;
                self.state = State::Initialized;
                Ok(())
            }
            (true, State::Ready) => Err(Error::NotInitialized),
            (_, State::Unprobed) => Err(Error::NotProbed),
        }
    }

    /// Write a mode table and adopt it. Mode tables reset the flip bits,
    /// so a flip in effect is written again afterwards.
    fn load_mode(
        &mut self,
        index: usize,
        delay_source: &mut impl DelayMs<u32>,
    ) -> Result<(), Error<CommE>> {
        let mode = M::MODES.get(index).ok_or(Error::InvalidMode(index))?;
        if let Err(e) = self.bus.write_array(mode.regs, delay_source) {
            // half a table is no mode at all
            self.state = State::Ready;
            return Err(e);
        }
        self.mode = index;
        apply_mode::<M>(&mut self.attr, mode);
        self.state = State::Initialized;
        if self.hflip || self.vflip {
            self.set_flip(self.hflip, self.vflip)?;
        }
        Ok(())
    }

    fn ensure_probed(&self) -> Result<(), Error<CommE>> {
        if self.state == State::Unprobed {
            Err(Error::NotProbed)
        } else {
            Ok(())
        }
    }

    fn active_mode(&self) -> Result<&'static SensorMode<M::Addr>, Error<CommE>> {
        M::MODES.get(self.mode).ok_or(Error::InvalidMode(self.mode))
    }

    fn ident(&self) -> ChipIdent {
        ChipIdent {
            name: M::NAME,
            chip_id: M::CHIP_ID,
            i2c_address: self.bus.address(),
        }
    }
}

/// Reset the mode-derived attributes to `mode`'s nominal timing
fn apply_mode<M: SensorModel>(attr: &mut SensorAttr, mode: &SensorMode<M::Addr>) {
    let vts = mode.vts as u32;
    attr.format = mode.format;
    attr.width = mode.width;
    attr.height = mode.height;
    attr.fps = mode.fps;
    attr.total_width = mode.hts as u32;
    attr.total_height = vts;
    attr.max_integration_time = vts.saturating_sub(M::INTEGRATION_MARGIN);
    attr.integration_time_limit = attr.max_integration_time;
}
