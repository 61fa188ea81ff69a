/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Sensor attributes shared with the ISP, and the static mode descriptions
//! they are derived from

use crate::regs::RegValue;
use crate::timing::Fps;

/// Physical bus carrying pixel data to the ISP
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataInterface {
    /// Parallel Digital Video Port
    Dvp,
    /// MIPI CSI-2 with the given number of data lanes
    Mipi { lanes: u8 },
}

/// Color filter array order of the first two rows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BayerOrder {
    Bggr,
    Gbrg,
    Grbg,
    Rggb,
    /// Monochrome sensor, no color filter
    Mono,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelFormat {
    pub order: BayerOrder,
    pub bits: u8,
}

/// One resolution/frame-rate configuration a sensor can run in
#[derive(Debug)]
pub struct SensorMode<A: 'static> {
    pub width: u16,
    pub height: u16,
    pub format: PixelFormat,
    /// Nominal (maximum) frame rate for this mode
    pub fps: Fps,
    /// Pixel clock feeding the line timing
    pub pclk: u32,
    /// Pixel clocks per line, blanking included
    pub hts: u16,
    /// Lines per frame at the nominal frame rate; the shortest frame allowed
    pub vts: u16,
    /// Register table programming this mode, terminated by the end marker
    pub regs: &'static [RegValue<A>],
}

/// Live description of the sensor as the ISP should see it.
/// Rebuilt from the mode on probe and mode switch, adjusted by frame-rate changes.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorAttr {
    pub name: &'static str,
    pub chip_id: u16,
    pub i2c_address: u8,
    pub interface: DataInterface,
    pub format: PixelFormat,
    pub width: u16,
    pub height: u16,
    pub fps: Fps,
    /// HTS
    pub total_width: u32,
    /// VTS
    pub total_height: u32,
    pub max_again: u32,
    pub max_dgain: u32,
    pub min_integration_time: u32,
    pub max_integration_time: u32,
    pub integration_time_limit: u32,
}
