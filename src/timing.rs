/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Frame rate representation and vertical timing derivation

/// Frame rate as a ratio packed into one word:
/// numerator in the upper 16 bits, denominator in the lower 16.
/// `Fps::new(30, 1)` is 30 fps, `Fps::new(25, 2)` is 12.5 fps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fps(u32);

impl Fps {
    pub const fn new(numerator: u16, denominator: u16) -> Self {
        Self(((numerator as u32) << 16) | denominator as u32)
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn numerator(self) -> u32 {
        self.0 >> 16
    }

    pub const fn denominator(self) -> u32 {
        self.0 & 0xFFFF
    }

    /// Frames per second in 24.8 fixed point, or None for a zero denominator
    pub fn q8(self) -> Option<u32> {
        let num = self.numerator();
        let den = self.denominator();
        if den == 0 {
            return None;
        }
        Some(((num / den) << 8) + (((num % den) << 8) / den))
    }
}

/// Inclusive range of whole frame rates a sensor accepts
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FpsRange {
    pub min: u32,
    pub max: u32,
}

impl FpsRange {
    /// Whether `fps` is usable: non-zero ratio within `min..=max`
    pub fn contains(&self, fps: Fps) -> bool {
        if fps.numerator() == 0 {
            return false;
        }
        match fps.q8() {
            Some(q8) => q8 >= (self.min << 8) && q8 <= (self.max << 8),
            None => false,
        }
    }
}

/// Lines per frame needed to run at `fps` with pixel clock `pclk`
/// and `hts` pixel clocks per line: `pclk * den / hts / num`.
/// None when the timing is degenerate (zero hts or zero fps).
pub fn vts_for(pclk: u32, hts: u32, fps: Fps) -> Option<u32> {
    let num = fps.numerator() as u64;
    let den = fps.denominator() as u64;
    if hts == 0 || num == 0 || den == 0 {
        return None;
    }
    let vts = pclk as u64 * den / hts as u64 / num;
    if vts > u32::MAX as u64 {
        None
    } else {
        Some(vts as u32)
    }
}

/// Same as `vts_for` but rounded to the nearest line instead of down
pub fn vts_for_rounded(pclk: u32, hts: u32, fps: Fps) -> Option<u32> {
    let num = fps.numerator() as u64;
    let den = fps.denominator() as u64;
    if hts == 0 || num == 0 || den == 0 {
        return None;
    }
    let line_rate = hts as u64 * num;
    let vts = (pclk as u64 * den + line_rate / 2) / line_rate;
    if vts > u32::MAX as u64 {
        None
    } else {
        Some(vts as u32)
    }
}
