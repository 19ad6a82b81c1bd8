use crate::{
    error::InternalError,
    sketch::{MergeableSketch, Sketch},
};
use std::mem::size_of;

///
/// SketchConfig
///
/// Precision policy for dense sketches. `2^precision` one-byte registers are
/// allocated per sketch, so precision is also the per-group memory knob.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SketchConfig {
    precision: u8,
}

impl SketchConfig {
    pub const MIN_PRECISION: u8 = 4;
    pub const MAX_PRECISION: u8 = 16;

    /// 4096 registers, ~1.6% standard error.
    pub const DEFAULT_PRECISION: u8 = 12;

    /// Build one validated precision configuration.
    pub fn new(precision: u8) -> Result<Self, InternalError> {
        if !(Self::MIN_PRECISION..=Self::MAX_PRECISION).contains(&precision) {
            return Err(InternalError::sketch_invalid_argument(format!(
                "sketch precision must be within {}..={}: {precision}",
                Self::MIN_PRECISION,
                Self::MAX_PRECISION,
            )));
        }

        Ok(Self { precision })
    }

    #[must_use]
    pub const fn precision(&self) -> u8 {
        self.precision
    }

    #[must_use]
    pub const fn register_count(&self) -> usize {
        1 << self.precision
    }
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            precision: Self::DEFAULT_PRECISION,
        }
    }
}

///
/// DenseHll
///
/// Dense HyperLogLog sketch over 64-bit hashes.
/// Each register holds the maximum observed rank for its bucket.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DenseHll {
    precision: u8,
    registers: Vec<u8>,
}

impl DenseHll {
    /// Build one empty sketch for the given precision policy.
    #[must_use]
    pub fn new(config: SketchConfig) -> Self {
        Self {
            precision: config.precision(),
            registers: vec![0; config.register_count()],
        }
    }

    /// Build one empty sketch, validating the raw precision first.
    pub fn with_precision(precision: u8) -> Result<Self, InternalError> {
        SketchConfig::new(precision).map(Self::new)
    }

    #[must_use]
    pub const fn precision(&self) -> u8 {
        self.precision
    }

    /// Hash and fold one raw value.
    pub fn insert_bytes(&mut self, bytes: &[u8]) {
        self.insert_hash(super::hash_bytes(bytes));
    }

    #[expect(clippy::cast_precision_loss)]
    fn raw_estimate(&self) -> f64 {
        let m = self.registers.len() as f64;
        let alpha = match self.registers.len() {
            16 => 0.673,
            32 => 0.697,
            64 => 0.709,
            _ => 0.7213 / (1.0 + 1.079 / m),
        };

        let harmonic: f64 = self
            .registers
            .iter()
            .map(|&rank| 2_f64.powi(-i32::from(rank)))
            .sum();
        let estimate = alpha * m * m / harmonic;

        // small-range correction
        if estimate <= 2.5 * m {
            let zeros = self.registers.iter().filter(|&&rank| rank == 0).count();
            if zeros > 0 {
                return m * (m / zeros as f64).ln();
            }
        }

        estimate
    }
}

impl Default for DenseHll {
    fn default() -> Self {
        Self::new(SketchConfig::default())
    }
}

impl Sketch for DenseHll {
    fn size_bytes(&self) -> u64 {
        let bytes = size_of::<Self>().saturating_add(self.registers.capacity());

        u64::try_from(bytes).unwrap_or(u64::MAX)
    }
}

impl MergeableSketch for DenseHll {
    fn insert_hash(&mut self, hash: u64) {
        let precision = u32::from(self.precision);
        let index = usize::try_from(hash >> (64 - precision)).unwrap_or(0);

        // sentinel bit bounds the rank at 64 - precision + 1
        let remaining = (hash << precision) | (1 << (precision - 1));
        let rank = u8::try_from(remaining.leading_zeros() + 1).unwrap_or(u8::MAX);

        if let Some(register) = self.registers.get_mut(index)
            && *register < rank
        {
            *register = rank;
        }
    }

    fn merge(&mut self, other: &Self) -> Result<(), InternalError> {
        if self.precision != other.precision {
            return Err(InternalError::sketch_invalid_argument(format!(
                "cannot merge sketches with different precision: {} != {}",
                self.precision, other.precision
            )));
        }

        for (mine, &theirs) in self.registers.iter_mut().zip(&other.registers) {
            if *mine < theirs {
                *mine = theirs;
            }
        }

        Ok(())
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn estimate(&self) -> u64 {
        self.raw_estimate().round() as u64
    }
}
