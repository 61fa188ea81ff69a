/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! ON Semiconductor MT9V034: 752x480 global shutter, parallel pixel out.
//! Registers are 16 bits wide behind 8-bit addresses. Each value is moved
//! as two byte transfers: the upper byte at the register itself, then the
//! lower byte through the byte-wise follow-up address.

use crate::attr::{BayerOrder, DataInterface, PixelFormat, SensorMode};
use crate::bus::{I2cBus, SensorBus};
use crate::gain::{GainStep, GainTable};
use crate::model::SensorModel;
use crate::power::{Level, PowerStep};
use crate::reg_table;
use crate::regs::{Markers, RegValue};
use crate::timing::{Fps, FpsRange};
use crate::Error;

pub struct Mt9v034;

/// Used for reading and writing a second byte on registers: aka "Byte-Wise Address register"
pub const FOLLOW_UP_ADDRESS: u8 = 0xF0;

// Array format: Wide-VGA, Active 752 H x 480 V
pub const MAX_FRAME_HEIGHT: u16 = 480;
pub const MAX_FRAME_WIDTH: u16 = 752;

const PCLK: u32 = 26_649_000;
const HBLANK: u16 = 94;
const VBLANK: u16 = 45;

/// Bits 4 and 5 of read mode; the rest is the power-on default
const READ_MODE_BASE: u16 = 0x0300;
const ROW_FLIP: u16 = 1 << 4;
const COLUMN_FLIP: u16 = 1 << 5;

#[repr(u8)]
pub enum GeneralRegisters {
    ChipVersion = 0x00,
    Control = 0x07,
    SoftReset = 0x0c,
    AecAgcEnable = 0xaf,
}

/// Allows switching quickly between two separate configuration contexts
#[repr(u16)]
pub enum ParamContext {
    ContextA = 0x0188,
    ContextB = 0x8188,
}

/// Output disabled, context A selected
const CONTROL_STANDBY: u16 = 0x0108;

#[repr(u8)]
pub enum ContextARegisters {
    ColumnStart = 0x01,
    RowStart = 0x02,
    WindowHeight = 0x03,
    WindowWidth = 0x04,
    HorizontalBlanking = 0x05,
    VerticalBlanking = 0x06,
    CoarseShutterWidthTotal = 0x0b,
    ReadMode = 0x0d,
    AnalogGain = 0x35,
}

const AGAIN_STEPS: &[GainStep] = &[
    GainStep { code: 0x0010, gain: 1_000_000 }, GainStep { code: 0x0011, gain: 1_062_500 },
    GainStep { code: 0x0012, gain: 1_125_000 }, GainStep { code: 0x0013, gain: 1_187_500 },
    GainStep { code: 0x0014, gain: 1_250_000 }, GainStep { code: 0x0015, gain: 1_312_500 },
    GainStep { code: 0x0016, gain: 1_375_000 }, GainStep { code: 0x0017, gain: 1_437_500 },
    GainStep { code: 0x0018, gain: 1_500_000 }, GainStep { code: 0x0019, gain: 1_562_500 },
    GainStep { code: 0x001a, gain: 1_625_000 }, GainStep { code: 0x001b, gain: 1_687_500 },
    GainStep { code: 0x001c, gain: 1_750_000 }, GainStep { code: 0x001d, gain: 1_812_500 },
    GainStep { code: 0x001e, gain: 1_875_000 }, GainStep { code: 0x001f, gain: 1_937_500 },
    GainStep { code: 0x0020, gain: 2_000_000 }, GainStep { code: 0x0021, gain: 2_062_500 },
    GainStep { code: 0x0022, gain: 2_125_000 }, GainStep { code: 0x0023, gain: 2_187_500 },
    GainStep { code: 0x0024, gain: 2_250_000 }, GainStep { code: 0x0025, gain: 2_312_500 },
    GainStep { code: 0x0026, gain: 2_375_000 }, GainStep { code: 0x0027, gain: 2_437_500 },
    GainStep { code: 0x0028, gain: 2_500_000 }, GainStep { code: 0x0029, gain: 2_562_500 },
    GainStep { code: 0x002a, gain: 2_625_000 }, GainStep { code: 0x002b, gain: 2_687_500 },
    GainStep { code: 0x002c, gain: 2_750_000 }, GainStep { code: 0x002d, gain: 2_812_500 },
    GainStep { code: 0x002e, gain: 2_875_000 }, GainStep { code: 0x002f, gain: 2_937_500 },
    GainStep { code: 0x0030, gain: 3_000_000 }, GainStep { code: 0x0031, gain: 3_062_500 },
    GainStep { code: 0x0032, gain: 3_125_000 }, GainStep { code: 0x0033, gain: 3_187_500 },
    GainStep { code: 0x0034, gain: 3_250_000 }, GainStep { code: 0x0035, gain: 3_312_500 },
    GainStep { code: 0x0036, gain: 3_375_000 }, GainStep { code: 0x0037, gain: 3_437_500 },
    GainStep { code: 0x0038, gain: 3_500_000 }, GainStep { code: 0x0039, gain: 3_562_500 },
    GainStep { code: 0x003a, gain: 3_625_000 }, GainStep { code: 0x003b, gain: 3_687_500 },
    GainStep { code: 0x003c, gain: 3_750_000 }, GainStep { code: 0x003d, gain: 3_812_500 },
    GainStep { code: 0x003e, gain: 3_875_000 }, GainStep { code: 0x003f, gain: 3_937_500 },
    GainStep { code: 0x0040, gain: 4_000_000 },
];

pub const INIT_WVGA: &[RegValue<u8>] = reg_table![
    0x0c => 0x00,
    0xf0 => 0x03,
    0xfd => 10,
    0x07 => 0x01,
    0xf0 => 0x08,
    0x01 => 0x00,
    0xf0 => 0x01,
    0x02 => 0x00,
    0xf0 => 0x04,
    0x03 => 0x01,
    0xf0 => 0xe0,
    0x04 => 0x02,
    0xf0 => 0xf0,
    0x05 => 0x00,
    0xf0 => 0x5e,
    0x06 => 0x00,
    0xf0 => 0x2d,
    0x0b => 0x01,
    0xf0 => 0xe0,
    0x0d => 0x03,
    0xf0 => 0x00,
    0x35 => 0x00,
    0xf0 => 0x10,
    0xaf => 0x00,
    0xf0 => 0x00,
    0xff => 0x00,
];

const MODE_LIST: &[SensorMode<u8>] = &[SensorMode {
    width: MAX_FRAME_WIDTH,
    height: MAX_FRAME_HEIGHT,
    format: PixelFormat {
        order: BayerOrder::Mono,
        bits: 10,
    },
    fps: Fps::new(60, 1),
    pclk: PCLK,
    hts: MAX_FRAME_WIDTH + HBLANK,
    vts: MAX_FRAME_HEIGHT + VBLANK,
    regs: INIT_WVGA,
}];

impl SensorModel for Mt9v034 {
    type Addr = u8;

    const NAME: &'static str = "mt9v034";
    /// 0xB8 as an 8-bit write address; other straps give 0x48, 0x4C, 0x58
    const I2C_ADDRESS: u8 = 0x5c;
    const CHIP_ID: u16 = 0x1324;
    const CHIP_ID_REGS: (u8, u8) =
        (GeneralRegisters::ChipVersion as u8, FOLLOW_UP_ADDRESS);
    const MARKERS: Markers<u8> = Markers {
        end: 0xff,
        delay: 0xfd,
    };
    const INTERFACE: DataInterface = DataInterface::Dvp;
    const FPS_RANGE: FpsRange = FpsRange { min: 5, max: 60 };
    const MODES: &'static [SensorMode<u8>] = MODE_LIST;

    const AGAIN: GainTable = GainTable::new(AGAIN_STEPS);
    const MAX_AGAIN: u32 = 4_000_000;

    const MIN_INTEGRATION_TIME: u32 = 1;
    const INTEGRATION_MARGIN: u32 = 2;

    const POWER_UP: &'static [PowerStep] = &[
        PowerStep::PowerDown(Level::Low),
        PowerStep::Reset(Level::Low),
        PowerStep::DelayMs(1),
        PowerStep::Reset(Level::High),
        PowerStep::DelayMs(1),
    ];
    const POWER_DOWN: &'static [PowerStep] =
        &[PowerStep::PowerDown(Level::High)];

    const STREAM_ON: &'static [RegValue<u8>] = reg_table![
        GeneralRegisters::Control as u8 => (ParamContext::ContextA as u16 >> 8) as u8,
        FOLLOW_UP_ADDRESS => (ParamContext::ContextA as u16 & 0xff) as u8,
        0xff => 0x00,
    ];
    const STREAM_OFF: &'static [RegValue<u8>] = reg_table![
        GeneralRegisters::Control as u8 => (CONTROL_STANDBY >> 8) as u8,
        FOLLOW_UP_ADDRESS => (CONTROL_STANDBY & 0xff) as u8,
        0xff => 0x00,
    ];

    /// Line length is the window width plus horizontal blanking
    fn read_hts<I2C, E>(bus: &mut SensorBus<I2C, u8>) -> Result<u32, Error<E>>
    where
        I2C: I2cBus<E>,
    {
        let width = bus.read_reg_u16(
            ContextARegisters::WindowWidth as u8,
            FOLLOW_UP_ADDRESS,
        )?;
        let hblank = bus.read_reg_u16(
            ContextARegisters::HorizontalBlanking as u8,
            FOLLOW_UP_ADDRESS,
        )?;
        Ok(width as u32 + hblank as u32)
    }

    /// The frame length is not a register here; vertical blanking is
    fn write_vts<I2C, E>(
        bus: &mut SensorBus<I2C, u8>,
        vts: u32,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>,
    {
        let height = bus.read_reg_u16(
            ContextARegisters::WindowHeight as u8,
            FOLLOW_UP_ADDRESS,
        )?;
        let vblank = vts.saturating_sub(height as u32).min(0x7fff) as u16;
        bus.write_reg_u16(
            ContextARegisters::VerticalBlanking as u8,
            FOLLOW_UP_ADDRESS,
            vblank,
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
            ContextARegisters::CoarseShutterWidthTotal as u8,
            FOLLOW_UP_ADDRESS,
            lines.min(0x7fff) as u16,
        )
    }

    fn write_again<I2C, E>(
        bus: &mut SensorBus<I2C, u8>,
        code: u16,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>,
    {
        bus.write_reg_u16(
            ContextARegisters::AnalogGain as u8,
            FOLLOW_UP_ADDRESS,
            code,
        )
    }

    fn write_flip<I2C, E>(
        bus: &mut SensorBus<I2C, u8>,
        hflip: bool,
        vflip: bool,
    ) -> Result<(), Error<E>>
    where
        I2C: I2cBus<E>,
    {
        let mut val = READ_MODE_BASE;
        if vflip {
            val |= ROW_FLIP;
        }
        if hflip {
            val |= COLUMN_FLIP;
        }
        bus.write_reg_u16(
            ContextARegisters::ReadMode as u8,
            FOLLOW_UP_ADDRESS,
            val,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::command::Command;
    use crate::config::SensorConfig;
    use crate::power::PowerPins;
    use crate::sensor::Sensor;
    use crate::test::*;
    use crate::NoPin;

    fn mock_mt9v034() -> MockBus {
        let mock = MockBus::new(1);
        mock.set_reg(GeneralRegisters::ChipVersion as u16, 0x13);
        mock.set_reg(FOLLOW_UP_ADDRESS as u16, 0x24);
        mock
    }

    #[test]
    fn chip_version_through_follow_up() {
        let mock = mock_mt9v034();
        let mut cam: Sensor<Mt9v034, _, NoPin, NoPin> =
            Sensor::new(mock.clone(), PowerPins::none(), SensorConfig::default());
        let mut delay = MockDelay::default();
        let ident = cam.probe(&mut delay).unwrap();
        assert_eq!(ident.chip_id, 0x1324);
        assert_eq!(ident.i2c_address, 0x5c);
        assert_eq!(mock.operation_count(), 2);

        let attr = cam.attr();
        assert_eq!(attr.total_width, 846);
        assert_eq!(attr.total_height, 525);
        assert_eq!(attr.max_integration_time, 523);
        assert_eq!(attr.max_again, 4_000_000);
    }

    #[test]
    fn gain_is_written_byte_wise() {
        let mock = mock_mt9v034();
        let mut cam: Sensor<Mt9v034, _, NoPin, NoPin> =
            Sensor::new(mock.clone(), PowerPins::none(), SensorConfig::default());
        let mut delay = MockDelay::default();
        cam.probe(&mut delay).unwrap();
        mock.clear_operations();

        cam.ioctl(Command::AnalogGain(2_500_000), &mut delay).unwrap();
        assert_eq!(mock.written_regs(), [(0x35, 0x00), (0xf0, 0x28)]);
        assert_eq!(cam.exposure().again.gain, 2_500_000);

        mock.clear_operations();
        let alloc = cam.set_again(u32::MAX).unwrap();
        assert_eq!(alloc.code, 64);
        assert_eq!(mock.written_regs(), [(0x35, 0x00), (0xf0, 0x40)]);
    }

    #[test]
    fn stream_selects_context_a() {
        let mock = mock_mt9v034();
        let mut cam: Sensor<Mt9v034, _, NoPin, NoPin> =
            Sensor::new(mock.clone(), PowerPins::none(), SensorConfig::default());
        let mut delay = MockDelay::default();
        cam.probe(&mut delay).unwrap();
        let powered_at = delay.total_ms;
        cam.init(true, &mut delay).unwrap();
        assert_eq!(delay.total_ms - powered_at, 10);

        mock.clear_operations();
        cam.s_stream(true, &mut delay).unwrap();
        assert_eq!(mock.written_regs(), [(0x07, 0x01), (0xf0, 0x88)]);
    }

    #[test]
    fn sixty_fps_is_the_ceiling() {
        let mock = mock_mt9v034();
        let mut cam: Sensor<Mt9v034, _, NoPin, NoPin> =
            Sensor::new(mock.clone(), PowerPins::none(), SensorConfig::default());
        let mut delay = MockDelay::default();
        cam.probe(&mut delay).unwrap();
        mock.clear_operations();
        assert!(matches!(
            cam.set_fps(Fps::new(61, 1)),
            Err(Error::FpsOutOfRange(_))
        ));
        assert_eq!(mock.operation_count(), 0);
    }
}
