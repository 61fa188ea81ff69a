/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Supported sensor models

pub mod gc2053;
pub mod jxf23;
pub mod mt9v034;
pub mod sc2335;

pub use gc2053::Gc2053;
pub use jxf23::Jxf23;
pub use mt9v034::Mt9v034;
pub use sc2335::Sc2335;
