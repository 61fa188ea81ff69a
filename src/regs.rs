/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Register addressing and static register tables

use core::fmt::Debug;

/// A sensor register address as it travels on the wire.
/// Values are always a single byte; addresses are one or two bytes, big-endian.
pub trait RegisterAddress: Copy + PartialEq + Debug {
    /// Number of address bytes sent before the data byte
    const WIDTH: usize;

    /// Write the big-endian address into the front of `buf`
    fn encode(self, buf: &mut [u8]);

    /// Narrow a raw debug address to this width
    fn from_raw(raw: u16) -> Option<Self>;

    fn to_raw(self) -> u16;
}

impl RegisterAddress for u8 {
    const WIDTH: usize = 1;

    fn encode(self, buf: &mut [u8]) {
        buf[0] = self;
    }

    fn from_raw(raw: u16) -> Option<Self> {
        if raw > 0xFF {
            None
        } else {
            Some(raw as u8)
        }
    }

    fn to_raw(self) -> u16 {
        self as u16
    }
}

impl RegisterAddress for u16 {
    const WIDTH: usize = 2;

    fn encode(self, buf: &mut [u8]) {
        buf[0] = (self >> 8) as u8;
        buf[1] = (self & 0xFF) as u8;
    }

    fn from_raw(raw: u16) -> Option<Self> {
        Some(raw)
    }

    fn to_raw(self) -> u16 {
        self
    }
}

/// One entry of a register table
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegValue<A> {
    pub reg: A,
    pub val: u8,
}

/// Sentinel addresses embedded in register tables.
/// An entry at `end` terminates the table; an entry at `delay`
/// sleeps for `val` milliseconds instead of touching the bus.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Markers<A> {
    pub end: A,
    pub delay: A,
}

/// Build a static register table: `reg_table![0x0103 => 0x01, ...]`
#[macro_export]
macro_rules! reg_table {
    ($($reg:expr => $val:expr),* $(,)?) => {
        &[$($crate::regs::RegValue { reg: $reg, val: $val }),*]
    };
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encode_is_big_endian() {
        let mut buf = [0u8; 2];
        0x3e01u16.encode(&mut buf);
        assert_eq!(buf, [0x3e, 0x01]);

        let mut buf = [0u8; 2];
        0xf0u8.encode(&mut buf);
        assert_eq!(buf, [0xf0, 0x00]);
    }

    #[test]
    fn narrow_addresses_reject_wide_raw_values() {
        assert_eq!(<u8 as RegisterAddress>::from_raw(0x00fe), Some(0xfe));
        assert_eq!(<u8 as RegisterAddress>::from_raw(0x0100), None);
        assert_eq!(<u16 as RegisterAddress>::from_raw(0x3107), Some(0x3107));
    }

    #[test]
    fn table_macro_keeps_order() {
        let table: &[RegValue<u16>] = reg_table![0x0103 => 0x01, 0x0100 => 0x00];
        assert_eq!(table.len(), 2);
        assert_eq!(table[0], RegValue { reg: 0x0103, val: 0x01 });
        assert_eq!(table[1].reg, 0x0100);
    }
}
