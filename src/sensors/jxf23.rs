/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! SOI JX-F23: 1920x1080 RAW10 over a 10-bit DVP bus, 8-bit register addresses.
//! Standby, mirror and flip share one control register, so all three
//! are updated read-modify-write.

use embedded_hal::blocking::delay::DelayMs;

use crate::attr::{BayerOrder, DataInterface, PixelFormat, SensorMode};
use crate::bus::{I2cBus, SensorBus};
use crate::gain::{GainStep, GainTable};
use crate::model::SensorModel;
use crate::power::{Level, PowerStep};
use crate::reg_table;
use crate::regs::{Markers, RegValue};
use crate::timing::{Fps, FpsRange};
use crate::Error;

pub struct Jxf23;

#[repr(u8)]
pub enum Register {
    /// [7:4] octave, [3:0] sixteenths
    Gain = 0x00,
    ExposureLow = 0x01,
    ExposureHigh = 0x02,
    ChipIdHigh = 0x0a,
    ChipIdLow = 0x0b,
    Control = 0x12,
    HtsLow = 0x20,
    HtsHigh = 0x21,
    VtsLow = 0x22,
    VtsHigh = 0x23,
}

const PCLK: u32 = 86_400_000;
const STANDBY: u8 = 0x40;
const MIRROR: u8 = 0x20;
const FLIP: u8 = 0x10;

const AGAIN_STEPS: &[GainStep] = &[
    GainStep { code: 0x0000, gain: 1_000_000 }, GainStep { code: 0x0001, gain: 1_062_500 },
    GainStep { code: 0x0002, gain: 1_125_000 }, GainStep { code: 0x0003, gain: 1_187_500 },
    GainStep { code: 0x0004, gain: 1_250_000 }, GainStep { code: 0x0005, gain: 1_312_500 },
    GainStep { code: 0x0006, gain: 1_375_000 }, GainStep { code: 0x0007, gain: 1_437_500 },
    GainStep { code: 0x0008, gain: 1_500_000 }, GainStep { code: 0x0009, gain: 1_562_500 },
    GainStep { code: 0x000a, gain: 1_625_000 }, GainStep { code: 0x000b, gain: 1_687_500 },
    GainStep { code: 0x000c, gain: 1_750_000 }, GainStep { code: 0x000d, gain: 1_812_500 },
    GainStep { code: 0x000e, gain: 1_875_000 }, GainStep { code: 0x000f, gain: 1_937_500 },
    GainStep { code: 0x0010, gain: 2_000_000 }, GainStep { code: 0x0011, gain: 2_125_000 },
    GainStep { code: 0x0012, gain: 2_250_000 }, GainStep { code: 0x0013, gain: 2_375_000 },
    GainStep { code: 0x0014, gain: 2_500_000 }, GainStep { code: 0x0015, gain: 2_625_000 },
    GainStep { code: 0x0016, gain: 2_750_000 }, GainStep { code: 0x0017, gain: 2_875_000 },
    GainStep { code: 0x0018, gain: 3_000_000 }, GainStep { code: 0x0019, gain: 3_125_000 },
    GainStep { code: 0x001a, gain: 3_250_000 }, GainStep { code: 0x001b, gain: 3_375_000 },
    GainStep { code: 0x001c, gain: 3_500_000 }, GainStep { code: 0x001d, gain: 3_625_000 },
    GainStep { code: 0x001e, gain: 3_750_000 }, GainStep { code: 0x001f, gain: 3_875_000 },
    GainStep { code: 0x0020, gain: 4_000_000 }, GainStep { code: 0x0021, gain: 4_250_000 },
    GainStep { code: 0x0022, gain: 4_500_000 }, GainStep { code: 0x0023, gain: 4_750_000 },
    GainStep { code: 0x0024, gain: 5_000_000 }, GainStep { code: 0x0025, gain: 5_250_000 },
    GainStep { code: 0x0026, gain: 5_500_000 }, GainStep { code: 0x0027, gain: 5_750_000 },
    GainStep { code: 0x0028, gain: 6_000_000 }, GainStep { code: 0x0029, gain: 6_250_000 },
    GainStep { code: 0x002a, gain: 6_500_000 }, GainStep { code: 0x002b, gain: 6_750_000 },
    GainStep { code: 0x002c, gain: 7_000_000 }, GainStep { code: 0x002d, gain: 7_250_000 },
    GainStep { code: 0x002e, gain: 7_500_000 }, GainStep { code: 0x002f, gain: 7_750_000 },
    GainStep { code: 0x0030, gain: 8_000_000 }, GainStep { code: 0x0031, gain: 8_500_000 },
    GainStep { code: 0x0032, gain: 9_000_000 }, GainStep { code: 0x0033, gain: 9_500_000 },
    GainStep { code: 0x0034, gain: 10_000_000 }, GainStep { code: 0x0035, gain: 10_500_000 },
    GainStep { code: 0x0036, gain: 11_000_000 }, GainStep { code: 0x0037, gain: 11_500_000 },
    GainStep { code: 0x0038, gain: 12_000_000 }, GainStep { code: 0x0039, gain: 12_500_000 },
    GainStep { code: 0x003a, gain: 13_000_000 }, GainStep { code: 0x003b, gain: 13_500_000 },
    GainStep { code: 0x003c, gain: 14_000_000 }, GainStep { code: 0x003d, gain: 14_500_000 },
    GainStep { code: 0x003e, gain: 15_000_000 }, GainStep { code: 0x003f, gain: 15_500_000 },
];

pub const INIT_1080P: &[RegValue<u8>] = reg_table![
    0x12 => 0x40,
    0x0e => 0x11,
    0x0f => 0x14,
    0x10 => 0x36,
    0x11 => 0x80,
    0x0d => 0xf0,
    0x5f => 0x41,
    0x60 => 0x20,
    0x58 => 0x12,
    0x57 => 0x60,
    0x9d => 0x00,
    0x20 => 0x00,
    0x21 => 0x0a,
    0x22 => 0x65,
    0x23 => 0x04,
    0x24 => 0xc0,
    0x25 => 0x38,
    0x26 => 0x43,
    0x27 => 0x1a,
    0x28 => 0x15,
    0x29 => 0x07,
    0x2a => 0x0a,
    0x2b => 0x17,
    0x2c => 0x00,
    0x2d => 0x00,
    0x2e => 0x14,
    0x2f => 0x44,
    0x41 => 0xc5,
    0x42 => 0x3b,
    0x47 => 0x42,
    0x76 => 0x60,
    0x77 => 0x09,
    0x1d => 0x00,
    0x1e => 0x04,
    0x6c => 0x40,
    0x6e => 0x2c,
    0x70 => 0xdc,
    0x71 => 0xd3,
    0x72 => 0xd4,
    0x73 => 0x58,
    0x74 => 0x02,
    0x78 => 0x96,
    0x89 => 0x01,
    0x6b => 0x20,
    0x86 => 0x40,
    0x31 => 0x0a,
    0x32 => 0x21,
    0x33 => 0x5c,
    0x34 => 0x44,
    0x35 => 0x40,
    0x3a => 0xa0,
    0x3b => 0x38,
    0x3c => 0xb8,
    0x3d => 0x1c,
    0x3e => 0x93,
    0x3f => 0x0c,
    0x40 => 0x11,
    0x56 => 0xb2,
    0x59 => 0xd8,
    0x5a => 0x04,
    0x85 => 0x4c,
    0x8a => 0x04,
    0x91 => 0x10,
    0x9c => 0xe1,
    0x5b => 0xa0,
    0x5c => 0x80,
    0x5d => 0xf0,
    0x5e => 0x1e,
    0x64 => 0xe0,
    0x66 => 0x04,
    0x67 => 0x77,
    0x68 => 0x00,
    0x69 => 0x41,
    0x7a => 0xa0,
    0x8f => 0x91,
    0xae => 0x30,
    0x13 => 0x81,
    0x96 => 0x04,
    0x4a => 0x05,
    0x7e => 0xcd,
    0x50 => 0x02,
    0x49 => 0x10,
    0x7b => 0x4a,
    0x7c => 0x0f,
    0x7f => 0x57,
    0x62 => 0x21,
    0x90 => 0x00,
    0x8c => 0xff,
    0x8d => 0xc7,
    0x8e => 0x00,
    0x8b => 0x01,
    0x0c => 0x00,
    0x19 => 0x20,
    0x46 => 0x00,
    0xfe => 10,
    0x12 => 0x40,
    0xff => 0x00,
];

const MODE_LIST: &[SensorMode<u8>] = &[SensorMode {
    width: 1920,
    height: 1080,
    format: PixelFormat {
        order: BayerOrder::Bggr,
        bits: 10,
    },
    fps: Fps::new(30, 1),
    pclk: PCLK,
    hts: 2560,
    vts: 1125,
    regs: INIT_1080P,
}];

impl SensorModel for Jxf23 {
    type Addr = u8;

    const NAME: &'static str = "jxf23";
    const I2C_ADDRESS: u8 = 0x40;
    const CHIP_ID: u16 = 0x0f23;
    const CHIP_ID_REGS: (u8, u8) =
        (Register::ChipIdHigh as u8, Register::ChipIdLow as u8);
    const MARKERS: Markers<u8> = Markers {
        end: 0xff,
        delay: 0xfe,
    };
    const INTERFACE: DataInterface = DataInterface::Dvp;
    const FPS_RANGE: FpsRange = FpsRange { min: 5, max: 30 };
    const MODES: &'static [SensorMode<u8>] = MODE_LIST;

    const AGAIN: GainTable = GainTable::new(AGAIN_STEPS);
    const MAX_AGAIN: u32 = 15_500_000;

    const MIN_INTEGRATION_TIME: u32 = 1;
    const INTEGRATION_MARGIN: u32 = 4;

    const POWER_UP: &'static [PowerStep] = &[
        PowerStep::Reset(Level::Low),
        PowerStep::DelayMs(20),
        PowerStep::Reset(Level::High),
        PowerStep::DelayMs(10),
        PowerStep::PowerDown(Level::Low),
        PowerStep::DelayMs(10),
    ];
    const POWER_DOWN: &'static [PowerStep] =
        &[PowerStep::PowerDown(Level::High)];

    // streaming is toggled through the standby bit, see set_streaming
    const STREAM_ON: &'static [RegValue<u8>] = reg_table![0xff => 0x00];
    const STREAM_OFF: &'static [RegValue<u8>] = reg_table![0xff => 0x00];

    fn read_hts<I2C, E>(bus: &mut SensorBus<I2C, u8>) -> Result<u32, Error<E>>
    where
        I2C: I2cBus<E>,
    {
        let hts =
            bus.read_reg_u16(Register::HtsHigh as u8, Register::HtsLow as u8)?;
        Ok(hts as u32)
    }

    fn write_vts<I2C, E>(
        bus: &mut SensorBus<I2C, u8>,
        vts: u32,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>,
    {
        bus.write_reg_u16(
            Register::VtsHigh as u8,
            Register::VtsLow as u8,
            vts.min(0xffff) as u16,
        )
    }

    fn write_integration_time<I2C, E>(
        bus: &mut SensorBus<I2C, u8>,
        lines: u32,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>,
    {
        bus.write_reg_u16(
            Register::ExposureHigh as u8,
            Register::ExposureLow as u8,
            lines.min(0xffff) as u16,
        )
    }

    fn write_again<I2C, E>(
        bus: &mut SensorBus<I2C, u8>,
        code: u16,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>,
    {
        bus.write_reg_u8(Register::Gain as u8, (code & 0xff) as u8)
    }

    fn write_flip<I2C, E>(
        bus: &mut SensorBus<I2C, u8>,
        hflip: bool,
        vflip: bool,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>,
    {
        let mut val = 0;
        if hflip {
            val |= MIRROR;
        }
        if vflip {
            val |= FLIP;
        }
        bus.update_reg_u8(Register::Control as u8, MIRROR | FLIP, val)
    }

    fn set_streaming<I2C, E, D>(
        bus: &mut SensorBus<I2C, u8>,
        enable: bool,
        _delay_source: &mut D,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>,
        D: DelayMs<u32>,
    {
        let val = if enable { 0 } else { STANDBY };
        bus.update_reg_u8(Register::Control as u8, STANDBY, val)
    }
}

#[cfg(test)]
mod test {
    extern crate std;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    use super::*;
    use crate::command::Command;
    use crate::config::SensorConfig;
    use crate::power::PowerPins;
    use crate::sensor::{Sensor, State};
    use crate::test::*;

    fn mock_jxf23() -> MockBus {
        let mock = MockBus::new(1);
        mock.set_reg(Register::ChipIdHigh as u16, 0x0f);
        mock.set_reg(Register::ChipIdLow as u16, 0x23);
        mock
    }

    #[test]
    fn standby_bit_drives_streaming() {
        let mock = mock_jxf23();
        let log: PinLog = Rc::new(RefCell::new(Vec::new()));
        let pins = PowerPins::new(
            Some(MockPin::new("rst", &log)),
            Some(MockPin::new("pwdn", &log)),
        );
        let config = SensorConfig::default()
            .with_data_interface(DataInterface::Dvp)
            .with_address(0x42);
        let mut cam: Sensor<Jxf23, _, _, _> =
            Sensor::new(mock.clone(), pins, config);
        let mut delay = MockDelay::default();
        assert_eq!(cam.probe(&mut delay).unwrap().i2c_address, 0x42);
        cam.init(true, &mut delay).unwrap();
        assert_eq!(mock.reg(Register::Control as u16), Some(0x40));

        cam.ioctl(Command::HFlip(true), &mut delay).unwrap();
        assert_eq!(mock.reg(Register::Control as u16), Some(0x60));

        cam.s_stream(true, &mut delay).unwrap();
        assert_eq!(mock.reg(Register::Control as u16), Some(0x20));
        cam.s_stream(false, &mut delay).unwrap();
        assert_eq!(mock.reg(Register::Control as u16), Some(0x60));
        assert_eq!(cam.state(), State::Initialized);

        for (address, _) in mock.writes() {
            assert_eq!(address, 0x42);
        }

        cam.release(&mut delay);
        assert_eq!(log.borrow().last(), Some(&("pwdn", Level::High)));
    }

    #[test]
    fn fps_from_line_length() {
        let mock = mock_jxf23();
        let mut cam: Sensor<Jxf23, _, crate::NoPin, crate::NoPin> =
            Sensor::new(mock.clone(), PowerPins::none(), SensorConfig::default());
        let mut delay = MockDelay::default();
        cam.probe(&mut delay).unwrap();
        cam.init(true, &mut delay).unwrap();
        // 86.4MHz / 2560 / 20
        cam.ioctl_raw(0x04, Fps::new(20, 1).raw(), &mut delay).unwrap();
        assert_eq!(cam.attr().total_height, 1687);
        assert_eq!(mock.reg(Register::VtsHigh as u16), Some(0x06));
        assert_eq!(mock.reg(Register::VtsLow as u16), Some(0x97));

        let alloc = cam.set_again(3_100_000).unwrap();
        assert_eq!(alloc.gain, 3_000_000);
        assert_eq!(mock.reg(Register::Gain as u16), Some(0x18));
    }

    fn initialized(
        mock: &MockBus,
    ) -> Sensor<Jxf23, MockBus, crate::NoPin, crate::NoPin> {
        let mut cam =
            Sensor::new(mock.clone(), PowerPins::none(), SensorConfig::default());
        let mut delay = MockDelay::default();
        cam.probe(&mut delay).unwrap();
        cam.init(true, &mut delay).unwrap();
        cam
    }

    #[test]
    fn reinit_keeps_the_flip() {
        let mock = mock_jxf23();
        let mut cam = initialized(&mock);
        let mut delay = MockDelay::default();
        cam.ioctl(Command::HFlip(true), &mut delay).unwrap();
        // the mode table rewrites the control register to standby only
        cam.init(true, &mut delay).unwrap();
        assert_eq!(cam.flip(), (true, false));
        assert_eq!(mock.reg(Register::Control as u16), Some(0x60));

        cam.s_stream(true, &mut delay).unwrap();
        assert_eq!(mock.reg(Register::Control as u16), Some(MIRROR));
    }

    #[test]
    fn failed_mode_switch_needs_init() {
        let mock = mock_jxf23();
        let mut cam = initialized(&mock);
        let mut delay = MockDelay::default();
        cam.s_stream(true, &mut delay).unwrap();

        mock.clear_operations();
        mock.fail_after(12);
        let res = cam.ioctl(Command::Mode(0), &mut delay);
        assert!(matches!(res, Err(Error::Comm(MockError))));
        assert_eq!(cam.state(), State::Ready);
        assert!(matches!(
            cam.s_stream(true, &mut delay),
            Err(Error::NotInitialized)
        ));
        assert_eq!(cam.state(), State::Ready);
    }

    #[test]
    fn failed_init_stays_uninitialized() {
        let mock = mock_jxf23();
        let mut cam: Sensor<Jxf23, _, crate::NoPin, crate::NoPin> =
            Sensor::new(mock.clone(), PowerPins::none(), SensorConfig::default());
        let mut delay = MockDelay::default();
        cam.probe(&mut delay).unwrap();
        mock.clear_operations();
        mock.fail_after(3);
        assert!(cam.init(true, &mut delay).is_err());
        assert_eq!(mock.operation_count(), 4);
        assert!(matches!(
            cam.s_stream(true, &mut delay),
            Err(Error::NotInitialized)
        ));
    }
}
