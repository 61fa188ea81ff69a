/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! GalaxyCore GC2053: 1920x1080 RAW10 over two-lane MIPI.
//! Registers are 8-bit addresses spread over pages selected through 0xfe;
//! every table leaves page 0 selected, which is where the run-time
//! registers live.

use crate::attr::{BayerOrder, DataInterface, PixelFormat, SensorMode};
use crate::bus::{I2cBus, SensorBus};
use crate::gain::{GainStep, GainTable};
use crate::model::SensorModel;
use crate::power::{Level, PowerStep};
use crate::reg_table;
use crate::regs::{Markers, RegValue};
use crate::timing::{self, Fps, FpsRange};
use crate::Error;

pub struct Gc2053;

#[repr(u8)]
pub enum Register {
    ExposureHigh = 0x03,
    ExposureLow = 0x04,
    /// Line length in units of two pixel clocks
    HtsHigh = 0x05,
    HtsLow = 0x06,
    /// bit 0 mirror, bit 1 flip
    MirrorFlip = 0x17,
    StreamCtrl = 0x3e,
    VtsHigh = 0x41,
    VtsLow = 0x42,
    GainCol = 0xb3,
    GainRow = 0xb4,
    PreGainHigh = 0xb8,
    PreGainLow = 0xb9,
    ChipIdHigh = 0xf0,
    ChipIdLow = 0xf1,
    PageSelect = 0xfe,
}

const PCLK: u32 = 74_250_000;
const MIRROR_FLIP_BASE: u8 = 0x80;

/// Codes index `AGAIN_REGS`
const AGAIN_STEPS: &[GainStep] = &[
    GainStep { code: 0x0000, gain: 1_000_000 }, GainStep { code: 0x0001, gain: 1_187_500 },
    GainStep { code: 0x0002, gain: 1_406_250 }, GainStep { code: 0x0003, gain: 1_656_250 },
    GainStep { code: 0x0004, gain: 2_000_000 }, GainStep { code: 0x0005, gain: 2_375_000 },
    GainStep { code: 0x0006, gain: 2_796_875 }, GainStep { code: 0x0007, gain: 3_312_500 },
    GainStep { code: 0x0008, gain: 4_000_000 }, GainStep { code: 0x0009, gain: 4_734_375 },
    GainStep { code: 0x000a, gain: 5_593_750 }, GainStep { code: 0x000b, gain: 6_640_625 },
    GainStep { code: 0x000c, gain: 8_000_000 }, GainStep { code: 0x000d, gain: 9_484_375 },
    GainStep { code: 0x000e, gain: 11_187_500 }, GainStep { code: 0x000f, gain: 13_250_000 },
    GainStep { code: 0x0010, gain: 16_000_000 }, GainStep { code: 0x0011, gain: 18_968_750 },
    GainStep { code: 0x0012, gain: 22_406_250 }, GainStep { code: 0x0013, gain: 26_546_875 },
    GainStep { code: 0x0014, gain: 32_000_000 }, GainStep { code: 0x0015, gain: 37_921_875 },
    GainStep { code: 0x0016, gain: 44_765_625 }, GainStep { code: 0x0017, gain: 53_078_125 },
    GainStep { code: 0x0018, gain: 64_000_000 },
];

/// (0xb4, 0xb3, 0xb8, 0xb9) for each entry of `AGAIN_STEPS`
const AGAIN_REGS: [[u8; 4]; 25] = [
    [0x00, 0x00, 0x01, 0x00],
    [0x00, 0x10, 0x01, 0x0c],
    [0x00, 0x20, 0x01, 0x1b],
    [0x00, 0x30, 0x01, 0x2c],
    [0x00, 0x40, 0x01, 0x3f],
    [0x00, 0x50, 0x02, 0x16],
    [0x00, 0x60, 0x02, 0x35],
    [0x00, 0x70, 0x03, 0x16],
    [0x00, 0x80, 0x04, 0x02],
    [0x00, 0x90, 0x04, 0x31],
    [0x00, 0xa0, 0x05, 0x32],
    [0x00, 0xb0, 0x06, 0x35],
    [0x00, 0xc0, 0x08, 0x04],
    [0x00, 0x5a, 0x09, 0x19],
    [0x00, 0x83, 0x0b, 0x0f],
    [0x00, 0x93, 0x0d, 0x12],
    [0x00, 0x84, 0x10, 0x00],
    [0x00, 0x94, 0x12, 0x3a],
    [0x01, 0x2c, 0x1a, 0x02],
    [0x01, 0x3c, 0x1b, 0x20],
    [0x00, 0x8c, 0x20, 0x0f],
    [0x00, 0x9c, 0x26, 0x07],
    [0x02, 0x64, 0x36, 0x21],
    [0x02, 0x74, 0x37, 0x3a],
    [0x00, 0xc6, 0x3d, 0x02],
];

pub const INIT_1080P: &[RegValue<u8>] = reg_table![
    0xfe => 0x80,
    0xfe => 0x80,
    0xfe => 0x80,
    0x00 => 5,
    0xfe => 0x00,
    0xf2 => 0x00,
    0xf3 => 0x00,
    0xf4 => 0x36,
    0xf5 => 0xc0,
    0xf6 => 0x44,
    0xf7 => 0x01,
    0xf8 => 0x2c,
    0xf9 => 0x42,
    0xfc => 0x8e,
    0xfe => 0x00,
    0x87 => 0x18,
    0xee => 0x30,
    0xd0 => 0xb7,
    0x03 => 0x04,
    0x04 => 0x60,
    0x05 => 0x04,
    0x06 => 0x4c,
    0x07 => 0x00,
    0x08 => 0x11,
    0x09 => 0x00,
    0x0a => 0x02,
    0x0b => 0x00,
    0x0c => 0x02,
    0x0d => 0x04,
    0x0e => 0x40,
    0x12 => 0xe2,
    0x13 => 0x16,
    0x19 => 0x0a,
    0x21 => 0x1c,
    0x28 => 0x0a,
    0x29 => 0x24,
    0x2b => 0x04,
    0x32 => 0xf8,
    0x37 => 0x03,
    0x39 => 0x15,
    0x43 => 0x07,
    0x44 => 0x40,
    0x46 => 0x0b,
    0x4b => 0x20,
    0x4e => 0x08,
    0x55 => 0x20,
    0x66 => 0x05,
    0x67 => 0x05,
    0x77 => 0x01,
    0x78 => 0x00,
    0x7c => 0x93,
    0x8c => 0x12,
    0x8d => 0x92,
    0x90 => 0x00,
    0x41 => 0x04,
    0x42 => 0x65,
    0x9d => 0x10,
    0xce => 0x7c,
    0xd2 => 0x41,
    0xd3 => 0xdc,
    0xe6 => 0x50,
    0xb6 => 0xc0,
    0xb0 => 0x70,
    0xb1 => 0x01,
    0xb2 => 0x00,
    0xb3 => 0x00,
    0xb4 => 0x00,
    0xb8 => 0x01,
    0xb9 => 0x00,
    0x26 => 0x30,
    0xfe => 0x01,
    0x40 => 0x23,
    0x55 => 0x07,
    0x60 => 0x40,
    0xfe => 0x04,
    0x14 => 0x78,
    0x15 => 0x78,
    0x16 => 0x78,
    0x17 => 0x78,
    0xfe => 0x01,
    0x92 => 0x00,
    0x94 => 0x03,
    0x95 => 0x04,
    0x96 => 0x38,
    0x97 => 0x07,
    0x98 => 0x80,
    0xfe => 0x01,
    0x01 => 0x05,
    0x02 => 0x89,
    0x04 => 0x01,
    0x07 => 0xa6,
    0x08 => 0xa9,
    0x09 => 0xa8,
    0x0a => 0xa7,
    0x0b => 0xff,
    0x0c => 0xff,
    0x0f => 0x00,
    0x50 => 0x1c,
    0x89 => 0x03,
    0xfe => 0x04,
    0x28 => 0x86,
    0x29 => 0x86,
    0x2a => 0x86,
    0x2b => 0x68,
    0x2c => 0x68,
    0x2d => 0x68,
    0x2e => 0x68,
    0x2f => 0x68,
    0x30 => 0x4f,
    0x31 => 0x68,
    0x32 => 0x67,
    0x33 => 0x66,
    0x34 => 0x66,
    0x35 => 0x66,
    0x36 => 0x66,
    0x37 => 0x66,
    0x38 => 0x62,
    0x39 => 0x62,
    0x3a => 0x62,
    0x3b => 0x62,
    0x3c => 0x62,
    0x3d => 0x62,
    0x3e => 0x62,
    0x3f => 0x62,
    0xfe => 0x01,
    0x9a => 0x06,
    0xfe => 0x00,
    0x7b => 0x2a,
    0x23 => 0x2d,
    0xfe => 0x03,
    0x01 => 0x27,
    0x02 => 0x56,
    0x03 => 0x8e,
    0x12 => 0x80,
    0x13 => 0x07,
    0xfe => 0x00,
    0x3e => 0x40,
    0xff => 0x00,
];

const MODE_LIST: &[SensorMode<u8>] = &[SensorMode {
    width: 1920,
    height: 1080,
    format: PixelFormat {
        order: BayerOrder::Rggb,
        bits: 10,
    },
    fps: Fps::new(30, 1),
    pclk: PCLK,
    hts: 2200,
    vts: 1125,
    regs: INIT_1080P,
}];

impl SensorModel for Gc2053 {
    type Addr = u8;

    const NAME: &'static str = "gc2053";
    const I2C_ADDRESS: u8 = 0x37;
    const CHIP_ID: u16 = 0x2053;
    const CHIP_ID_REGS: (u8, u8) =
        (Register::ChipIdHigh as u8, Register::ChipIdLow as u8);
    /// 0xfe is the page register here, so delays use 0x00
    const MARKERS: Markers<u8> = Markers {
        end: 0xff,
        delay: 0x00,
    };
    const INTERFACE: DataInterface = DataInterface::Mipi { lanes: 2 };
    const FPS_RANGE: FpsRange = FpsRange { min: 5, max: 30 };
    const MODES: &'static [SensorMode<u8>] = MODE_LIST;

    const AGAIN: GainTable = GainTable::new(AGAIN_STEPS);
    const MAX_AGAIN: u32 = 64_000_000;

    const MIN_INTEGRATION_TIME: u32 = 1;
    const INTEGRATION_MARGIN: u32 = 1;

    const POWER_UP: &'static [PowerStep] = &[
        PowerStep::PowerDown(Level::High),
        PowerStep::DelayMs(5),
        PowerStep::PowerDown(Level::Low),
        PowerStep::DelayMs(5),
        PowerStep::Reset(Level::Low),
        PowerStep::DelayMs(10),
        PowerStep::Reset(Level::High),
        PowerStep::DelayMs(10),
    ];
    const POWER_DOWN: &'static [PowerStep] =
        &[PowerStep::PowerDown(Level::High)];

    const STREAM_ON: &'static [RegValue<u8>] =
        reg_table![0xfe => 0x00, 0x3e => 0x91, 0xff => 0x00];
    const STREAM_OFF: &'static [RegValue<u8>] =
        reg_table![0xfe => 0x00, 0x3e => 0x00, 0xff => 0x00];

    fn read_hts<I2C, E>(bus: &mut SensorBus<I2C, u8>) -> Result<u32, Error<E>>
    where
        I2C: I2cBus<E>,
    {
        let hts =
            bus.read_reg_u16(Register::HtsHigh as u8, Register::HtsLow as u8)?;
        Ok((hts as u32 & 0x0fff) << 1)
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
            (vts & 0x3fff) as u16,
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
            (lines & 0x3fff) as u16,
        )
    }

    fn write_again<I2C, E>(
        bus: &mut SensorBus<I2C, u8>,
        code: u16,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>,
    {
        let regs = AGAIN_REGS[(code as usize).min(AGAIN_REGS.len() - 1)];
        bus.write_reg_u8(Register::GainRow as u8, regs[0])?;
        bus.write_reg_u8(Register::GainCol as u8, regs[1])?;
        bus.write_reg_u8(Register::PreGainHigh as u8, regs[2])?;
        bus.write_reg_u8(Register::PreGainLow as u8, regs[3])
    }

    fn write_flip<I2C, E>(
        bus: &mut SensorBus<I2C, u8>,
        hflip: bool,
        vflip: bool,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>,
    {
        let val = MIRROR_FLIP_BASE | (vflip as u8) << 1 | hflip as u8;
        bus.write_reg_u8(Register::MirrorFlip as u8, val)
    }

    fn vts_for(pclk: u32, hts: u32, fps: Fps) -> Option<u32> {
        timing::vts_for_rounded(pclk, hts, fps)
    }
}
