/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/
#![no_std]

//! Configuration drivers for camera image sensors feeding an ISP.
//! These imaging sensors have multiple interfaces:
//! - Two-wire i2c (or SCCB) for configuration registers
//! - pixel data out, either parallel DVP or MIPI CSI-2
//! - reset and power-down GPIO lines
//! This crate is concerned with the i2c interface and the GPIO sequencing.
//!
//! Every sensor follows the same pattern: a static register table programs
//! each resolution, a gain table maps ISP gains onto sensor register codes,
//! and a small set of registers (exposure, gain, frame length, flip) is
//! driven at run time. The per-sensor data lives in a [`SensorModel`]
//! implementation; [`Sensor`] drives any of them.
//!
//! ```ignore
//! let mut cam: Sensor<Sc2335, _, _, _> =
//!     Sensor::new(i2c, PowerPins::new(Some(rst), None::<NoPin>), SensorConfig::default());
//! cam.probe(&mut delay)?;
//! cam.init(true, &mut delay)?;
//! cam.s_stream(true, &mut delay)?;
//! cam.ioctl(Command::Fps(Fps::new(25, 1)), &mut delay)?;
//! ```

pub mod attr;
pub mod bus;
pub mod command;
pub mod config;
pub mod gain;
pub mod model;
pub mod power;
pub mod regs;
pub mod sensor;
pub mod sensors;
pub mod timing;


pub use attr::{DataInterface, SensorAttr, SensorMode};
pub use command::{Command, CommandCode};
pub use config::SensorConfig;
pub use model::SensorModel;
pub use power::{NoPin, PowerPins};
pub use sensor::{ChipIdent, Sensor, State};
pub use timing::Fps;

/// Errors in this crate
#[derive(Debug)]
pub enum Error<CommE> {
    /// Sensor communication error
    Comm(CommE),

    /// The chip ID registers did not hold the expected value
    UnknownChipId { expected: u16, found: u16 },

    /// Requested frame rate is outside the sensor's range
    FpsOutOfRange(Fps),

    /// Line length read back as zero; no frame length can be derived
    InvalidTiming,

    /// No such mode for this sensor
    InvalidMode(usize),

    /// The configured data bus is not the one this sensor drives
    UnsupportedInterface(DataInterface),

    /// Raw register address too wide for this sensor
    InvalidRegister(u16),

    /// Unknown raw control command code
    UnsupportedCommand(u32),

    /// The sensor has not been probed
    NotProbed,

    /// Streaming requested before the mode was programmed
    NotInitialized,
}
