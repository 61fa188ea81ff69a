/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! What distinguishes one sensor from another: its constants, tables,
//! and the handful of registers the ISP drives at run time.

use embedded_hal::blocking::delay::DelayMs;

use crate::attr::{DataInterface, SensorMode};
use crate::bus::{I2cBus, SensorBus};
use crate::gain::{GainTable, GAIN_UNITY};
use crate::power::PowerStep;
use crate::regs::{Markers, RegValue, RegisterAddress};
use crate::timing::{self, Fps, FpsRange};
use crate::Error;

pub trait SensorModel {
    type Addr: RegisterAddress + 'static;

    const NAME: &'static str;
    /// Default 7-bit i2c address
    const I2C_ADDRESS: u8;
    const CHIP_ID: u16;
    /// Registers holding the (upper, lower) chip ID bytes
    const CHIP_ID_REGS: (Self::Addr, Self::Addr);
    const MARKERS: Markers<Self::Addr>;
    const INTERFACE: DataInterface;
    const FPS_RANGE: FpsRange;
    const MODES: &'static [SensorMode<Self::Addr>];

    const AGAIN: GainTable;
    const MAX_AGAIN: u32;
    const DGAIN: Option<GainTable> = None;
    const MAX_DGAIN: u32 = GAIN_UNITY;

    const MIN_INTEGRATION_TIME: u32;
    /// Lines reserved between the longest exposure and the frame length
    const INTEGRATION_MARGIN: u32;

    const POWER_UP: &'static [PowerStep];
    const POWER_DOWN: &'static [PowerStep] = &[];

    const STREAM_ON: &'static [RegValue<Self::Addr>];
    const STREAM_OFF: &'static [RegValue<Self::Addr>];

    /// Current line length in pixel clocks, as programmed in the sensor
    fn read_hts<I2C, E>(
        bus: &mut SensorBus<I2C, Self::Addr>,
    ) -> Result<u32, Error<E>>
    where
        I2C: I2cBus<E>;

    fn write_vts<I2C, E>(
        bus: &mut SensorBus<I2C, Self::Addr>,
        vts: u32,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>;

    fn write_integration_time<I2C, E>(
        bus: &mut SensorBus<I2C, Self::Addr>,
        lines: u32,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>;

    fn write_again<I2C, E>(
        bus: &mut SensorBus<I2C, Self::Addr>,
        code: u16,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>;

    /// Only called for models with a `DGAIN` table
    fn write_dgain<I2C, E>(
        _bus: &mut SensorBus<I2C, Self::Addr>,
        _code: u16,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>,
    {
        Ok(())
    }

    fn write_flip<I2C, E>(
        bus: &mut SensorBus<I2C, Self::Addr>,
        hflip: bool,
        vflip: bool,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>;

    fn set_streaming<I2C, E, D>(
        bus: &mut SensorBus<I2C, Self::Addr>,
        enable: bool,
        delay_source: &mut D,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>,
        D: DelayMs<u32>,
    {
        if enable {
            bus.write_array(Self::STREAM_ON, delay_source)
        } else {
            bus.write_array(Self::STREAM_OFF, delay_source)
        }
    }

    /// Frame length for `fps`. Models override this where their
    /// reference timing rounds differently.
    fn vts_for(pclk: u32, hts: u32, fps: Fps) -> Option<u32> {
        timing::vts_for(pclk, hts, fps)
    }
}
