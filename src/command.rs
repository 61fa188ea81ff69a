/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Control commands the ISP sends to a running sensor

use crate::timing::Fps;

/// Integer codes for commands arriving through the raw ioctl path
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandCode {
    IntegrationTime = 0x01,
    AnalogGain = 0x02,
    DigitalGain = 0x03,
    Fps = 0x04,
    HFlip = 0x05,
    VFlip = 0x06,
    Mode = 0x07,
}

impl CommandCode {
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            0x01 => Some(CommandCode::IntegrationTime),
            0x02 => Some(CommandCode::AnalogGain),
            0x03 => Some(CommandCode::DigitalGain),
            0x04 => Some(CommandCode::Fps),
            0x05 => Some(CommandCode::HFlip),
            0x06 => Some(CommandCode::VFlip),
            0x07 => Some(CommandCode::Mode),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Exposure in lines
    IntegrationTime(u32),
    /// Requested linear analog gain, `GAIN_UNITY` = 1x
    AnalogGain(u32),
    /// Requested linear digital gain, `GAIN_UNITY` = 1x
    DigitalGain(u32),
    /// Integration time and analog gain applied together
    Exposure { integration_time: u32, again: u32 },
    Fps(Fps),
    HFlip(bool),
    VFlip(bool),
    /// Switch to another entry of the model's mode list
    Mode(usize),
}

impl Command {
    /// Decode a raw (code, argument) pair. `Exposure` has no raw form.
    pub fn from_raw(code: u32, arg: u32) -> Option<Self> {
        let cmd = match CommandCode::from_u32(code)? {
            CommandCode::IntegrationTime => Command::IntegrationTime(arg),
            CommandCode::AnalogGain => Command::AnalogGain(arg),
            CommandCode::DigitalGain => Command::DigitalGain(arg),
            CommandCode::Fps => Command::Fps(Fps::from_raw(arg)),
            CommandCode::HFlip => Command::HFlip(arg != 0),
            CommandCode::VFlip => Command::VFlip(arg != 0),
            CommandCode::Mode => Command::Mode(arg as usize),
        };
        Some(cmd)
    }
}
