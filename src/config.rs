/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

use crate::attr::DataInterface;

/// Board-level choices for one sensor instance, fixed at construction
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SensorConfig {
    /// Override the model's default 7-bit i2c address
    pub i2c_address: Option<u8>,
    /// Data bus the board routes to the ISP; must match the model if set
    pub data_interface: Option<DataInterface>,
    /// Index into the model's mode list used at probe
    pub mode: usize,
}

impl SensorConfig {
    pub fn with_address(mut self, address: u8) -> Self {
        self.i2c_address = Some(address);
        self
    }

    pub fn with_data_interface(mut self, interface: DataInterface) -> Self {
        self.data_interface = Some(interface);
        self
    }

    pub fn with_mode(mut self, mode: usize) -> Self {
        self.mode = mode;
        self
    }
}
