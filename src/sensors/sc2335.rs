/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! SmartSens SC2335: 1920x1080 RAW10 over two-lane MIPI, 16-bit register addresses

use crate::attr::{BayerOrder, DataInterface, PixelFormat, SensorMode};
use crate::bus::{I2cBus, SensorBus};
use crate::gain::{GainStep, GainTable};
use crate::model::SensorModel;
use crate::power::{Level, PowerStep};
use crate::reg_table;
use crate::regs::{Markers, RegValue};
use crate::timing::{Fps, FpsRange};
use crate::Error;

pub struct Sc2335;

#[repr(u16)]
pub enum Register {
    StreamCtrl = 0x0100,
    SoftReset = 0x0103,
    ChipIdHigh = 0x3107,
    ChipIdLow = 0x3108,
    HtsHigh = 0x320c,
    HtsLow = 0x320d,
    VtsHigh = 0x320e,
    VtsLow = 0x320f,
    /// bits [2:1] mirror, bits [6:5] flip
    MirrorFlip = 0x3221,
    /// exposure [19:16]
    ExposureHigh = 0x3e00,
    /// exposure [15:8]
    ExposureMid = 0x3e01,
    /// exposure [7:4]
    ExposureLow = 0x3e02,
    DigitalCoarse = 0x3e06,
    DigitalFine = 0x3e07,
    AnalogCoarse = 0x3e08,
    AnalogFine = 0x3e09,
}

const PCLK: u32 = 74_250_000;
const MIRROR_BITS: u8 = 0x06;
const FLIP_BITS: u8 = 0x60;

/// Coarse code in the upper byte, fine code in the lower byte
const AGAIN_STEPS: &[GainStep] = &[
    GainStep { code: 0x0320, gain: 1_000_000 }, GainStep { code: 0x0322, gain: 1_062_500 },
    GainStep { code: 0x0324, gain: 1_125_000 }, GainStep { code: 0x0326, gain: 1_187_500 },
    GainStep { code: 0x0328, gain: 1_250_000 }, GainStep { code: 0x032a, gain: 1_312_500 },
    GainStep { code: 0x032c, gain: 1_375_000 }, GainStep { code: 0x032e, gain: 1_437_500 },
    GainStep { code: 0x0330, gain: 1_500_000 }, GainStep { code: 0x0332, gain: 1_562_500 },
    GainStep { code: 0x0334, gain: 1_625_000 }, GainStep { code: 0x0336, gain: 1_687_500 },
    GainStep { code: 0x0338, gain: 1_750_000 }, GainStep { code: 0x033a, gain: 1_812_500 },
    GainStep { code: 0x033c, gain: 1_875_000 }, GainStep { code: 0x033e, gain: 1_937_500 },
    GainStep { code: 0x0720, gain: 2_000_000 }, GainStep { code: 0x0722, gain: 2_125_000 },
    GainStep { code: 0x0724, gain: 2_250_000 }, GainStep { code: 0x0726, gain: 2_375_000 },
    GainStep { code: 0x0728, gain: 2_500_000 }, GainStep { code: 0x072a, gain: 2_625_000 },
    GainStep { code: 0x072c, gain: 2_750_000 }, GainStep { code: 0x072e, gain: 2_875_000 },
    GainStep { code: 0x0730, gain: 3_000_000 }, GainStep { code: 0x0732, gain: 3_125_000 },
    GainStep { code: 0x0734, gain: 3_250_000 }, GainStep { code: 0x0736, gain: 3_375_000 },
    GainStep { code: 0x0738, gain: 3_500_000 }, GainStep { code: 0x073a, gain: 3_625_000 },
    GainStep { code: 0x073c, gain: 3_750_000 }, GainStep { code: 0x073e, gain: 3_875_000 },
    GainStep { code: 0x0f20, gain: 4_000_000 }, GainStep { code: 0x0f22, gain: 4_250_000 },
    GainStep { code: 0x0f24, gain: 4_500_000 }, GainStep { code: 0x0f26, gain: 4_750_000 },
    GainStep { code: 0x0f28, gain: 5_000_000 }, GainStep { code: 0x0f2a, gain: 5_250_000 },
    GainStep { code: 0x0f2c, gain: 5_500_000 }, GainStep { code: 0x0f2e, gain: 5_750_000 },
    GainStep { code: 0x0f30, gain: 6_000_000 }, GainStep { code: 0x0f32, gain: 6_250_000 },
    GainStep { code: 0x0f34, gain: 6_500_000 }, GainStep { code: 0x0f36, gain: 6_750_000 },
    GainStep { code: 0x0f38, gain: 7_000_000 }, GainStep { code: 0x0f3a, gain: 7_250_000 },
    GainStep { code: 0x0f3c, gain: 7_500_000 }, GainStep { code: 0x0f3e, gain: 7_750_000 },
    GainStep { code: 0x1f20, gain: 8_000_000 }, GainStep { code: 0x1f22, gain: 8_500_000 },
    GainStep { code: 0x1f24, gain: 9_000_000 }, GainStep { code: 0x1f26, gain: 9_500_000 },
    GainStep { code: 0x1f28, gain: 10_000_000 }, GainStep { code: 0x1f2a, gain: 10_500_000 },
    GainStep { code: 0x1f2c, gain: 11_000_000 }, GainStep { code: 0x1f2e, gain: 11_500_000 },
    GainStep { code: 0x1f30, gain: 12_000_000 }, GainStep { code: 0x1f32, gain: 12_500_000 },
    GainStep { code: 0x1f34, gain: 13_000_000 }, GainStep { code: 0x1f36, gain: 13_500_000 },
    GainStep { code: 0x1f38, gain: 14_000_000 }, GainStep { code: 0x1f3a, gain: 14_500_000 },
    GainStep { code: 0x1f3c, gain: 15_000_000 }, GainStep { code: 0x1f3e, gain: 15_500_000 },
];

const DGAIN_STEPS: &[GainStep] = &[
    GainStep { code: 0x0080, gain: 1_000_000 },
    GainStep { code: 0x0180, gain: 2_000_000 },
    GainStep { code: 0x0380, gain: 4_000_000 },
    GainStep { code: 0x0780, gain: 8_000_000 },
];

pub const INIT_1080P: &[RegValue<u16>] = reg_table![
    0x0103 => 0x01,
    0xfffe => 10,
    0x0100 => 0x00,
    0x36e9 => 0x80,
    0x36f9 => 0x80,
    0x301f => 0x02,
    0x3200 => 0x00,
    0x3201 => 0x00,
    0x3202 => 0x00,
    0x3203 => 0x00,
    0x3204 => 0x07,
    0x3205 => 0x87,
    0x3206 => 0x04,
    0x3207 => 0x3f,
    0x3208 => 0x07,
    0x3209 => 0x80,
    0x320a => 0x04,
    0x320b => 0x38,
    0x320c => 0x08,
    0x320d => 0x98,
    0x320e => 0x04,
    0x320f => 0x65,
    0x3210 => 0x00,
    0x3211 => 0x04,
    0x3212 => 0x00,
    0x3213 => 0x04,
    0x3248 => 0x04,
    0x3253 => 0x0a,
    0x3301 => 0x06,
    0x3302 => 0x0c,
    0x3306 => 0x48,
    0x3308 => 0x10,
    0x330b => 0xb8,
    0x330d => 0x10,
    0x3314 => 0x14,
    0x331f => 0x59,
    0x3333 => 0x10,
    0x3334 => 0x40,
    0x335d => 0x60,
    0x3364 => 0x56,
    0x3390 => 0x08,
    0x3391 => 0x09,
    0x3392 => 0x0b,
    0x3393 => 0x0a,
    0x3394 => 0x2a,
    0x3395 => 0x2a,
    0x3396 => 0x48,
    0x3397 => 0x49,
    0x3398 => 0x4b,
    0x3399 => 0x06,
    0x339a => 0x0a,
    0x339b => 0x30,
    0x339c => 0x48,
    0x33ad => 0x2c,
    0x33ae => 0x38,
    0x33b3 => 0x40,
    0x349f => 0x02,
    0x34a6 => 0x09,
    0x34a7 => 0x0f,
    0x34a8 => 0x30,
    0x34a9 => 0x28,
    0x34f8 => 0x5f,
    0x34f9 => 0x28,
    0x3630 => 0xc6,
    0x3633 => 0x33,
    0x3637 => 0x6b,
    0x363c => 0xc1,
    0x363e => 0xc2,
    0x3670 => 0x2e,
    0x3674 => 0xc5,
    0x3675 => 0xc7,
    0x3676 => 0xcb,
    0x3677 => 0x44,
    0x3678 => 0x48,
    0x3679 => 0x48,
    0x367e => 0x48,
    0x367f => 0x78,
    0x3690 => 0x34,
    0x3691 => 0x34,
    0x3692 => 0x54,
    0x369c => 0x48,
    0x369d => 0x78,
    0x36ea => 0x35,
    0x36eb => 0x0c,
    0x36ec => 0x0a,
    0x36ed => 0x34,
    0x36fa => 0x35,
    0x36fb => 0x04,
    0x36fc => 0x00,
    0x36fd => 0x14,
    0x3904 => 0x04,
    0x3908 => 0x41,
    0x391f => 0x10,
    0x3e00 => 0x00,
    0x3e01 => 0x8c,
    0x3e02 => 0x20,
    0x3e16 => 0x00,
    0x3e17 => 0x80,
    0x4500 => 0x88,
    0x4509 => 0x20,
    0x4800 => 0x24,
    0x5799 => 0x06,
    0x57aa => 0x2f,
    0x57ab => 0xff,
    0x36e9 => 0x20,
    0x36f9 => 0x24,
    0xffff => 0x00,
];

/// Centered 1280x720 window of the 1080p array, same line and frame timing
pub const INIT_720P: &[RegValue<u16>] = reg_table![
    0x0103 => 0x01,
    0xfffe => 10,
    0x0100 => 0x00,
    0x36e9 => 0x80,
    0x36f9 => 0x80,
    0x301f => 0x02,
    0x3200 => 0x00,
    0x3201 => 0x00,
    0x3202 => 0x00,
    0x3203 => 0x00,
    0x3204 => 0x07,
    0x3205 => 0x87,
    0x3206 => 0x04,
    0x3207 => 0x3f,
    0x3208 => 0x05,
    0x3209 => 0x00,
    0x320a => 0x02,
    0x320b => 0xd0,
    0x320c => 0x08,
    0x320d => 0x98,
    0x320e => 0x04,
    0x320f => 0x65,
    0x3210 => 0x01,
    0x3211 => 0x44,
    0x3212 => 0x00,
    0x3213 => 0xb8,
    0x3248 => 0x04,
    0x3253 => 0x0a,
    0x3301 => 0x06,
    0x3302 => 0x0c,
    0x3306 => 0x48,
    0x3308 => 0x10,
    0x330b => 0xb8,
    0x330d => 0x10,
    0x3314 => 0x14,
    0x331f => 0x59,
    0x3333 => 0x10,
    0x3334 => 0x40,
    0x335d => 0x60,
    0x3364 => 0x56,
    0x3390 => 0x08,
    0x3391 => 0x09,
    0x3392 => 0x0b,
    0x3393 => 0x0a,
    0x3394 => 0x2a,
    0x3395 => 0x2a,
    0x3396 => 0x48,
    0x3397 => 0x49,
    0x3398 => 0x4b,
    0x3399 => 0x06,
    0x339a => 0x0a,
    0x339b => 0x30,
    0x339c => 0x48,
    0x33ad => 0x2c,
    0x33ae => 0x38,
    0x33b3 => 0x40,
    0x349f => 0x02,
    0x34a6 => 0x09,
    0x34a7 => 0x0f,
    0x34a8 => 0x30,
    0x34a9 => 0x28,
    0x34f8 => 0x5f,
    0x34f9 => 0x28,
    0x3630 => 0xc6,
    0x3633 => 0x33,
    0x3637 => 0x6b,
    0x363c => 0xc1,
    0x363e => 0xc2,
    0x3670 => 0x2e,
    0x3674 => 0xc5,
    0x3675 => 0xc7,
    0x3676 => 0xcb,
    0x3677 => 0x44,
    0x3678 => 0x48,
    0x3679 => 0x48,
    0x367e => 0x48,
    0x367f => 0x78,
    0x3690 => 0x34,
    0x3691 => 0x34,
    0x3692 => 0x54,
    0x369c => 0x48,
    0x369d => 0x78,
    0x36ea => 0x35,
    0x36eb => 0x0c,
    0x36ec => 0x0a,
    0x36ed => 0x34,
    0x36fa => 0x35,
    0x36fb => 0x04,
    0x36fc => 0x00,
    0x36fd => 0x14,
    0x3904 => 0x04,
    0x3908 => 0x41,
    0x391f => 0x10,
    0x3e00 => 0x00,
    0x3e01 => 0x8c,
    0x3e02 => 0x20,
    0x3e16 => 0x00,
    0x3e17 => 0x80,
    0x4500 => 0x88,
    0x4509 => 0x20,
    0x4800 => 0x24,
    0x5799 => 0x06,
    0x57aa => 0x2f,
    0x57ab => 0xff,
    0x36e9 => 0x20,
    0x36f9 => 0x24,
    0xffff => 0x00,
];

const MODE_LIST: &[SensorMode<u16>] = &[
    SensorMode {
        width: 1920,
        height: 1080,
        format: PixelFormat {
            order: BayerOrder::Bggr,
            bits: 10,
        },
        fps: Fps::new(30, 1),
        pclk: PCLK,
        hts: 2200,
        vts: 1125,
        regs: INIT_1080P,
    },
    SensorMode {
        width: 1280,
        height: 720,
        format: PixelFormat {
            order: BayerOrder::Bggr,
            bits: 10,
        },
        fps: Fps::new(30, 1),
        pclk: PCLK,
        hts: 2200,
        vts: 1125,
        regs: INIT_720P,
    },
];

impl SensorModel for Sc2335 {
    type Addr = u16;

    const NAME: &'static str = "sc2335";
    const I2C_ADDRESS: u8 = 0x30;
    const CHIP_ID: u16 = 0xcb14;
    const CHIP_ID_REGS: (u16, u16) =
        (Register::ChipIdHigh as u16, Register::ChipIdLow as u16);
    const MARKERS: Markers<u16> = Markers {
        end: 0xffff,
        delay: 0xfffe,
    };
    const INTERFACE: DataInterface = DataInterface::Mipi { lanes: 2 };
    const FPS_RANGE: FpsRange = FpsRange { min: 5, max: 30 };
    const MODES: &'static [SensorMode<u16>] = MODE_LIST;

    const AGAIN: GainTable = GainTable::new(AGAIN_STEPS);
    const MAX_AGAIN: u32 = 15_500_000;
    const DGAIN: Option<GainTable> = Some(GainTable::new(DGAIN_STEPS));
    const MAX_DGAIN: u32 = 8_000_000;

    const MIN_INTEGRATION_TIME: u32 = 2;
    const INTEGRATION_MARGIN: u32 = 4;

    const POWER_UP: &'static [PowerStep] = &[
        PowerStep::Reset(Level::High),
        PowerStep::DelayMs(5),
        PowerStep::Reset(Level::Low),
        PowerStep::DelayMs(10),
        PowerStep::Reset(Level::High),
        PowerStep::DelayMs(10),
        PowerStep::PowerDown(Level::Low),
        PowerStep::DelayMs(10),
        PowerStep::PowerDown(Level::High),
        PowerStep::DelayMs(10),
    ];
    /// PWDN is active low on this part
    const POWER_DOWN: &'static [PowerStep] =
        &[PowerStep::PowerDown(Level::Low)];

    const STREAM_ON: &'static [RegValue<u16>] =
        reg_table![0x0100 => 0x01, 0xffff => 0x00];
    const STREAM_OFF: &'static [RegValue<u16>] =
        reg_table![0x0100 => 0x00, 0xffff => 0x00];

    fn read_hts<I2C, E>(bus: &mut SensorBus<I2C, u16>) -> Result<u32, Error<E>>
    where
        I2C: I2cBus<E>,
    {
        let hts =
            bus.read_reg_u16(Register::HtsHigh as u16, Register::HtsLow as u16)?;
        Ok(hts as u32)
    }

    fn write_vts<I2C, E>(
        bus: &mut SensorBus<I2C, u16>,
        vts: u32,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>,
    {
        bus.write_reg_u16(
            Register::VtsHigh as u16,
            Register::VtsLow as u16,
            vts.min(0xffff) as u16,
        )
    }

    /// Exposure is programmed in sixteenths of a line
    fn write_integration_time<I2C, E>(
        bus: &mut SensorBus<I2C, u16>,
        lines: u32,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>,
    {
        let it = (lines & 0xffff) << 4;
        bus.write_reg_u8(Register::ExposureHigh as u16, ((it >> 16) & 0x0f) as u8)?;
        bus.write_reg_u8(Register::ExposureMid as u16, ((it >> 8) & 0xff) as u8)?;
        bus.write_reg_u8(Register::ExposureLow as u16, (it & 0xf0) as u8)
    }

    fn write_again<I2C, E>(
        bus: &mut SensorBus<I2C, u16>,
        code: u16,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>,
    {
        bus.write_reg_u16(
            Register::AnalogCoarse as u16,
            Register::AnalogFine as u16,
            code,
        )
    }

    fn write_dgain<I2C, E>(
        bus: &mut SensorBus<I2C, u16>,
        code: u16,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>,
    {
        bus.write_reg_u16(
            Register::DigitalCoarse as u16,
            Register::DigitalFine as u16,
            code,
        )
    }

    fn write_flip<I2C, E>(
        bus: &mut SensorBus<I2C, u16>,
        hflip: bool,
        vflip: bool,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>,
    {
        let mut val = 0;
        if hflip {
            val |= MIRROR_BITS;
        }
        if vflip {
            val |= FLIP_BITS;
        }
        bus.update_reg_u8(
            Register::MirrorFlip as u16,
            MIRROR_BITS | FLIP_BITS,
            val,
        )
    }
}
