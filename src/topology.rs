//! The fixed shape of the LUT network searched by a run.

use std::fmt::Display;

use crate::error::ConfigError;

/// Above this many global inputs, enumerating every case is not reasonable anymore.
const MAX_GLOBAL_INPUTS: usize = 24;
/// Above this LUT arity, truth tables get too large.
const MAX_LUT_INPUTS: usize = 16;

/// Immutable topology of a run.
///
/// Every LUT input can be wired to one of [`signal_slots`] candidate sources:
/// first the global inputs, then the outputs of the LUTs, in LUT order.
/// A LUT can only read the outputs of the LUTs placed before it, so the network is feed-forward.
///
/// [`signal_slots`]: Topology::signal_slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    pub lut_count: usize,
    pub lut_inputs: usize,
    pub lut_outputs: usize,
    pub global_inputs: usize,
    pub global_outputs: usize,
}

impl Topology {
    pub fn new(
        lut_count: usize,
        lut_inputs: usize,
        lut_outputs: usize,
        global_inputs: usize,
        global_outputs: usize,
    ) -> Self {
        Topology {
            lut_count,
            lut_inputs,
            lut_outputs,
            global_inputs,
            global_outputs,
        }
    }

    /// Checks the topology can be encoded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("lut_count", self.lut_count),
            ("lut_inputs", self.lut_inputs),
            ("lut_outputs", self.lut_outputs),
            ("global_inputs", self.global_inputs),
            ("global_outputs", self.global_outputs),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroField(name));
            }
        }
        if self.global_inputs < self.lut_inputs {
            return Err(ConfigError::LutLargerThanInputs {
                global_inputs: self.global_inputs,
                lut_inputs: self.lut_inputs,
            });
        }
        if self.global_inputs > MAX_GLOBAL_INPUTS {
            return Err(ConfigError::TooLarge(format!(
                "{} global inputs (at most {})",
                self.global_inputs, MAX_GLOBAL_INPUTS
            )));
        }
        if self.lut_inputs > MAX_LUT_INPUTS {
            return Err(ConfigError::TooLarge(format!(
                "{} LUT inputs (at most {})",
                self.lut_inputs, MAX_LUT_INPUTS
            )));
        }
        Ok(())
    }

    /// Number of candidate wiring sources of any LUT input.
    pub fn signal_slots(&self) -> usize {
        self.global_inputs + (self.lut_count - 1) * self.lut_outputs
    }

    /// Number of sources actually available to `lut`: the global inputs and the outputs of earlier LUTs.
    pub fn available_slots(&self, lut: usize) -> usize {
        self.global_inputs + lut * self.lut_outputs
    }

    /// Number of LUT output slots, ie candidate producers of a global output.
    pub fn lut_output_slots(&self) -> usize {
        self.lut_count * self.lut_outputs
    }

    /// Number of rows of a LUT truth table.
    pub fn rows(&self) -> usize {
        1 << self.lut_inputs
    }

    /// Number of cases, ie assignments of the global inputs.
    pub fn cases(&self) -> usize {
        1 << self.global_inputs
    }

    /// Values of the global inputs for the given case, most significant bit first.
    pub fn case_inputs(&self, case: usize) -> Vec<bool> {
        bits_msb_first(case, self.global_inputs)
    }
}

impl Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Global I / O: {} / {}\tLUTs / I / O: {} / {} / {}\tidx length: {}",
            self.global_inputs,
            self.global_outputs,
            self.lut_count,
            self.lut_inputs,
            self.lut_outputs,
            self.signal_slots()
        )
    }
}

/// The `width` low bits of `value`, most significant first.
pub(crate) fn bits_msb_first(value: usize, width: usize) -> Vec<bool> {
    (0..width)
        .map(|i| (value >> (width - 1 - i)) & 1 == 1)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn signal_slots_test() {
        let t = Topology::new(2, 4, 1, 6, 1);
        assert_eq!(t.signal_slots(), 7);
        assert_eq!(t.available_slots(0), 6);
        assert_eq!(t.available_slots(1), 7);

        let t = Topology::new(3, 5, 2, 5, 3);
        assert_eq!(t.signal_slots(), 9);
        assert_eq!(t.lut_output_slots(), 6);
        assert_eq!(t.rows(), 32);
    }

    #[test]
    fn case_inputs_msb_first_test() {
        let t = Topology::new(1, 2, 1, 3, 1);
        assert_eq!(t.case_inputs(0), vec![false, false, false]);
        assert_eq!(t.case_inputs(1), vec![false, false, true]);
        assert_eq!(t.case_inputs(6), vec![true, true, false]);
    }

    #[test]
    fn validate_test() {
        assert!(Topology::new(2, 4, 1, 6, 1).validate().is_ok());
        assert_eq!(
            Topology::new(2, 4, 1, 3, 1).validate(),
            Err(ConfigError::LutLargerThanInputs {
                global_inputs: 3,
                lut_inputs: 4
            })
        );
        assert_eq!(
            Topology::new(0, 4, 1, 6, 1).validate(),
            Err(ConfigError::ZeroField("lut_count"))
        );
        assert!(matches!(
            Topology::new(1, 2, 1, 40, 1).validate(),
            Err(ConfigError::TooLarge(_))
        ));
    }
}
