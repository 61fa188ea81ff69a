/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Two-wire register transport shared by every sensor model

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c::{Write, WriteRead};

#[cfg(feature = "rttdebug")]
use panic_rtt_core::rprintln;

use crate::regs::{Markers, RegValue, RegisterAddress};
use crate::Error;

/// The i2c capabilities a sensor needs: plain writes and write-then-read.
/// Implemented for every bus that has both.
pub trait I2cBus<CommE>:
    Write<Error = CommE> + WriteRead<Error = CommE>
{
}

impl<T, CommE> I2cBus<CommE> for T where
    T: Write<Error = CommE> + WriteRead<Error = CommE>
{
}

/// Register access for one sensor at one i2c address
pub struct SensorBus<I2C, A> {
    i2c: I2C,
    address: u8,
    markers: Markers<A>,
}

impl<I2C, A> SensorBus<I2C, A> {
    pub fn new(i2c: I2C, address: u8, markers: Markers<A>) -> Self {
        Self {
            i2c,
            address,
            markers,
        }
    }

    /// The 7-bit i2c address of the sensor
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give back the underlying i2c bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, CommE, A> SensorBus<I2C, A>
where
    I2C: Write<Error = CommE> + WriteRead<Error = CommE>,
    A: RegisterAddress,
{
    /// Read a u8 from a register: one address write followed by a one byte read
    pub fn read_reg_u8(&mut self, reg: A) -> Result<u8, Error<CommE>> {
        let mut cmd_buf = [0u8; 2];
        reg.encode(&mut cmd_buf);
        let mut recv_buf = [0u8];
        self.i2c
            .write_read(self.address, &cmd_buf[..A::WIDTH], &mut recv_buf)
            .map_err(Error::Comm)?;
        Ok(recv_buf[0])
    }

    /// Write a u8 to a register as a single message: address bytes then data
    pub fn write_reg_u8(&mut self, reg: A, val: u8) -> Result<(), Error<CommE>> {
        let mut write_buf = [0u8; 3];
        reg.encode(&mut write_buf);
        write_buf[A::WIDTH] = val;
        self.i2c
            .write(self.address, &write_buf[..A::WIDTH + 1])
            .map_err(Error::Comm)?;
        Ok(())
    }

    /// Read a u16 whose upper byte lives at `upper` and lower byte at `lower`
    pub fn read_reg_u16(
        &mut self,
        upper: A,
        lower: A,
    ) -> Result<u16, Error<CommE>> {
        let hi = (self.read_reg_u8(upper)? as u16) << 8;
        let lo = self.read_reg_u8(lower)? as u16;
        Ok(hi | lo)
    }

    /// Write a u16 split across `upper` and `lower`, upper byte first
    pub fn write_reg_u16(
        &mut self,
        upper: A,
        lower: A,
        data: u16,
    ) -> Result<(), Error<CommE>> {
        self.write_reg_u8(upper, (data >> 8) as u8)?;
        self.write_reg_u8(lower, (data & 0xFF) as u8)?;
        Ok(())
    }

    /// Read-modify-write the bits selected by `mask`
    pub fn update_reg_u8(
        &mut self,
        reg: A,
        mask: u8,
        val: u8,
    ) -> Result<(), Error<CommE>> {
        let current = self.read_reg_u8(reg)?;
        self.write_reg_u8(reg, (current & !mask) | (val & mask))
    }

    /// Push a register table to the sensor, stopping at the end marker
    /// (or the end of the slice). Delay entries sleep instead of writing.
    /// The first failed transaction aborts the table.
    pub fn write_array(
        &mut self,
        table: &[RegValue<A>],
        delay_source: &mut impl DelayMs<u32>,
    ) -> Result<(), Error<CommE>> {
        for entry in table {
            if entry.reg == self.markers.end {
                break;
            }
            if entry.reg == self.markers.delay {
                delay_source.delay_ms(entry.val as u32);
                continue;
            }
            if let Err(e) = self.write_reg_u8(entry.reg, entry.val) {
                #[cfg(feature = "rttdebug")]
                rprintln!("write_array abort at {:x?}", entry.reg);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Walk a register table reading back every register it names,
    /// handing each (address, value) to `visit`.
    pub fn read_array(
        &mut self,
        table: &[RegValue<A>],
        delay_source: &mut impl DelayMs<u32>,
        mut visit: impl FnMut(A, u8),
    ) -> Result<(), Error<CommE>> {
        for entry in table {
            if entry.reg == self.markers.end {
                break;
            }
            if entry.reg == self.markers.delay {
                delay_source.delay_ms(entry.val as u32);
                continue;
            }
            let val = self.read_reg_u8(entry.reg)?;
            visit(entry.reg, val);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    extern crate std;
    use std::vec::Vec;

    use super::*;
    use crate::reg_table;
    use crate::test::*;

    const MARKERS16: Markers<u16> = Markers {
        end: 0xffff,
        delay: 0xfffe,
    };

    const MARKERS8: Markers<u8> = Markers {
        end: 0xff,
        delay: 0xfe,
    };

    #[test]
    fn end_marker_only_is_a_noop() {
        let mock = MockBus::new(2);
        let mut bus = SensorBus::new(mock.clone(), 0x30, MARKERS16);
        let mut delay = MockDelay::default();
        bus.write_array(reg_table![0xffff => 0x00], &mut delay)
            .unwrap();
        assert_eq!(mock.operation_count(), 0);
        assert_eq!(delay.total_ms, 0);
    }

    #[test]
    fn delay_entry_sleeps_without_bus_traffic() {
        let mock = MockBus::new(2);
        let mut bus = SensorBus::new(mock.clone(), 0x30, MARKERS16);
        let mut delay = MockDelay::default();
        bus.write_array(
            reg_table![0xfffe => 10, 0xfffe => 5, 0xffff => 0x00],
            &mut delay,
        )
        .unwrap();
        assert_eq!(mock.operation_count(), 0);
        assert_eq!(delay.total_ms, 15);
    }

    #[test]
    fn write_array_stops_at_end_marker() {
        let mock = MockBus::new(2);
        let mut bus = SensorBus::new(mock.clone(), 0x30, MARKERS16);
        let mut delay = MockDelay::default();
        bus.write_array(
            reg_table![
                0x0103 => 0x01,
                0xfffe => 2,
                0x0100 => 0x00,
                0xffff => 0x00,
                0x3e01 => 0x55,
            ],
            &mut delay,
        )
        .unwrap();
        assert_eq!(
            mock.writes(),
            [
                (0x30, std::vec![0x01, 0x03, 0x01]),
                (0x30, std::vec![0x01, 0x00, 0x00])
            ]
        );
        assert_eq!(mock.reg(0x3e01), None);
        assert_eq!(delay.total_ms, 2);
    }

    #[test]
    fn write_array_aborts_on_first_failure() {
        let mock = MockBus::new(1);
        mock.fail_after(1);
        let mut bus = SensorBus::new(mock.clone(), 0x37, MARKERS8);
        let mut delay = MockDelay::default();
        let res = bus.write_array(
            reg_table![0x17 => 0x80, 0x03 => 0x04, 0x04 => 0x10, 0xff => 0x00],
            &mut delay,
        );
        assert!(matches!(res, Err(Error::Comm(MockError))));
        // the failed write is attempted, nothing after it
        assert_eq!(mock.operation_count(), 2);
        assert_eq!(mock.reg(0x17), Some(0x80));
        assert_eq!(mock.reg(0x03), None);
        assert_eq!(mock.reg(0x04), None);
    }

    #[test]
    fn eight_bit_writes_send_two_bytes() {
        let mock = MockBus::new(1);
        let mut bus = SensorBus::new(mock.clone(), 0x37, MARKERS8);
        bus.write_reg_u16(0x41, 0x42, 0x0465).unwrap();
        assert_eq!(
            mock.writes(),
            [(0x37, std::vec![0x41, 0x04]), (0x37, std::vec![0x42, 0x65])]
        );
        assert_eq!(bus.read_reg_u16(0x41, 0x42).unwrap(), 0x0465);
    }

    #[test]
    fn read_uses_write_then_read() {
        let mock = MockBus::new(2);
        mock.set_reg(0x3107, 0xcb);
        let mut bus = SensorBus::new(mock.clone(), 0x30, MARKERS16);
        assert_eq!(bus.read_reg_u8(0x3107).unwrap(), 0xcb);
        assert_eq!(mock.operation_count(), 1);
        assert_eq!(mock.writes().len(), 0);
    }

    #[test]
    fn update_preserves_unmasked_bits() {
        let mock = MockBus::new(1);
        mock.set_reg(0x12, 0x40);
        let mut bus = SensorBus::new(mock.clone(), 0x40, MARKERS8);
        bus.update_reg_u8(0x12, 0x30, 0x20).unwrap();
        assert_eq!(mock.reg(0x12), Some(0x60));
    }

    #[test]
    fn read_array_visits_each_register() {
        let mock = MockBus::new(1);
        mock.set_reg(0x20, 0x00);
        mock.set_reg(0x21, 0x0a);
        let mut bus = SensorBus::new(mock.clone(), 0x40, MARKERS8);
        let mut delay = MockDelay::default();
        let mut seen = Vec::new();
        bus.read_array(
            reg_table![0x20 => 0x00, 0xfe => 1, 0x21 => 0x0a, 0xff => 0x00],
            &mut delay,
            |reg, val| seen.push((reg, val)),
        )
        .unwrap();
        assert_eq!(seen, [(0x20, 0x00), (0x21, 0x0a)]);
        assert_eq!(delay.total_ms, 1);
    }
}
