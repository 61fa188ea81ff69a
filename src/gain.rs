/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Gain lookup tables.
//!
//! Gains are linear and fixed-point: `GAIN_UNITY` (one million) is 1x.
//! A table maps each gain the sensor can actually realize to the register
//! code that selects it. The ISP asks for arbitrary gains; allocation picks
//! the largest supported gain that does not exceed the request.

/// Linear gain of 1x
pub const GAIN_UNITY: u32 = 1_000_000;

/// One gain the sensor supports and the register code that selects it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GainStep {
    pub code: u16,
    pub gain: u32,
}

/// Result of a gain allocation: the gain actually applied and its register code
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allocation {
    pub gain: u32,
    pub code: u16,
}

impl From<GainStep> for Allocation {
    fn from(step: GainStep) -> Self {
        Self {
            gain: step.gain,
            code: step.code,
        }
    }
}

/// A non-empty table of gain steps in strictly increasing gain order
#[derive(Clone, Copy, Debug)]
pub struct GainTable {
    steps: &'static [GainStep],
}

impl GainTable {
    /// Panics (at compile time, for constant tables) if `steps` is empty
    /// or not strictly increasing in gain.
    pub const fn new(steps: &'static [GainStep]) -> Self {
        assert!(!steps.is_empty(), "gain table is empty");
        let mut i = 1;
        while i < steps.len() {
            assert!(
                steps[i].gain > steps[i - 1].gain,
                "gain table is not increasing"
            );
            i += 1;
        }
        Self { steps }
    }

    pub fn steps(&self) -> &'static [GainStep] {
        self.steps
    }

    /// Lowest gain the table can produce
    pub fn min_gain(&self) -> u32 {
        self.steps[0].gain
    }

    /// Highest gain in the table not above `limit` (the floor if none is)
    pub fn max_gain(&self, limit: u32) -> u32 {
        self.allocate(u32::MAX, limit).gain
    }

    /// Map a requested gain onto the table.
    ///
    /// Requests at or below the floor get the floor. Requests between two
    /// steps get the lower step. Steps above `max_gain` are never chosen, so
    /// requests at or above it get the highest step not exceeding it.
    pub fn allocate(&self, requested: u32, max_gain: u32) -> Allocation {
        let mut chosen = self.steps[0];
        for step in &self.steps[1..] {
            if step.gain > requested || step.gain > max_gain {
                break;
            }
            chosen = *step;
        }
        chosen.into()
    }
}

/// Allocate digital gain for sensors that may lack it entirely:
/// without a table the sensor stays at unity.
pub fn alloc_dgain(
    table: Option<&GainTable>,
    requested: u32,
    max_dgain: u32,
) -> Allocation {
    match table {
        Some(table) => table.allocate(requested, max_dgain),
        None => Allocation {
            gain: GAIN_UNITY,
            code: 0,
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const STEPS: &[GainStep] = &[
        GainStep { code: 0x10, gain: 1_000_000 },
        GainStep { code: 0x11, gain: 1_500_000 },
        GainStep { code: 0x12, gain: 2_000_000 },
        GainStep { code: 0x13, gain: 4_000_000 },
        GainStep { code: 0x14, gain: 8_000_000 },
    ];
    const TABLE: GainTable = GainTable::new(STEPS);
    const MAX_AGAIN: u32 = 4_000_000;

    #[test]
    fn requests_below_floor_get_floor() {
        for requested in &[0, 1, 999_999, 1_000_000] {
            let alloc = TABLE.allocate(*requested, MAX_AGAIN);
            assert_eq!(alloc, Allocation { gain: 1_000_000, code: 0x10 });
        }
    }

    #[test]
    fn requests_at_or_above_ceiling_get_ceiling() {
        for requested in &[4_000_000, 4_000_001, 8_000_000, u32::MAX] {
            let alloc = TABLE.allocate(*requested, MAX_AGAIN);
            assert_eq!(alloc, Allocation { gain: 4_000_000, code: 0x13 });
        }
    }

    #[test]
    fn requests_between_steps_round_down() {
        assert_eq!(TABLE.allocate(1_499_999, MAX_AGAIN).code, 0x10);
        assert_eq!(TABLE.allocate(1_500_000, MAX_AGAIN).code, 0x11);
        assert_eq!(TABLE.allocate(1_999_999, MAX_AGAIN).code, 0x11);
        assert_eq!(TABLE.allocate(3_000_000, MAX_AGAIN).code, 0x12);
    }

    #[test]
    fn allocation_never_exceeds_request_or_ceiling() {
        let mut last = 0;
        let mut requested = 0u32;
        while requested < 10_000_000 {
            let alloc = TABLE.allocate(requested, MAX_AGAIN);
            assert!(alloc.gain <= MAX_AGAIN);
            assert!(alloc.gain <= requested.max(TABLE.min_gain()));
            // monotonic in the request
            assert!(alloc.gain >= last);
            last = alloc.gain;
            requested += 12_345;
        }
    }

    #[test]
    fn ceiling_between_steps_uses_lower_step() {
        assert_eq!(TABLE.max_gain(3_000_000), 2_000_000);
        assert_eq!(TABLE.max_gain(u32::MAX), 8_000_000);
        assert_eq!(TABLE.allocate(u32::MAX, 3_000_000).code, 0x12);
    }

    #[test]
    fn missing_dgain_table_stays_at_unity() {
        let alloc = alloc_dgain(None, 5_000_000, 8_000_000);
        assert_eq!(alloc, Allocation { gain: GAIN_UNITY, code: 0 });
        let alloc = alloc_dgain(Some(&TABLE), 5_000_000, 8_000_000);
        assert_eq!(alloc.code, 0x13);
    }
}
