use crate::{CUSTOM_EPOCH, ConfigError, IdLayout, Result, TWITTER_EPOCH};

/// Number of bits shared between the machine ID and sequence fields.
///
/// A 64-bit word keeps 1 sign bit and 41 timestamp bits, leaving 22 bits to
/// split between the two lower fields.
pub const MAX_ADJUSTABLE_BITS: i8 = 22;

/// The four numbers that fully describe an ID layout.
///
/// Values are usually supplied by the host process (environment, CLI, config
/// file) and are checked once by [`SnowflakeConfig::validate`] when a
/// generator or parser is built. Bit widths are signed so that bad host input
/// is reported as [`ConfigError::NegativeMachineBits`] or
/// [`ConfigError::NegativeSequenceBits`] rather than silently wrapping.
///
/// ```text
///  Bit Index:  63     63 62                   tl tl-1            ml ml-1          0
///              +--------+----------------------+-------------------+---------------+
///  Field:      | sign   | timestamp - epoch    | machine ID        | sequence      |
///              +--------+----------------------+-------------------+---------------+
///  tl = sequence_bits + machine_id_bits, ml = sequence_bits
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SnowflakeConfig {
    /// Reference point, in milliseconds since the Unix epoch, that ID
    /// timestamps are measured from.
    pub epoch_start: i64,
    /// Milliseconds added to `epoch_start` by generators that honour it.
    pub epoch_offset: i64,
    /// Width of the machine ID field, in `[0, 22]`.
    pub machine_id_bits: i8,
    /// Width of the per-millisecond sequence field, in `[0, 22]`.
    pub sequence_bits: i8,
}

impl Default for SnowflakeConfig {
    /// [`CUSTOM_EPOCH`] with 10 machine ID bits (1024 machines) and 12
    /// sequence bits (4096 IDs per millisecond).
    fn default() -> Self {
        Self::new(CUSTOM_EPOCH, 0, 10, 12)
    }
}

impl SnowflakeConfig {
    pub const fn new(
        epoch_start: i64,
        epoch_offset: i64,
        machine_id_bits: i8,
        sequence_bits: i8,
    ) -> Self {
        Self {
            epoch_start,
            epoch_offset,
            machine_id_bits,
            sequence_bits,
        }
    }

    /// The Twitter layout: [`TWITTER_EPOCH`], 10 machine ID bits and 12
    /// sequence bits.
    pub const fn twitter() -> Self {
        Self::new(TWITTER_EPOCH, 0, 10, 12)
    }

    /// `epoch_start + epoch_offset`.
    pub const fn effective_epoch(&self) -> i64 {
        self.epoch_start.wrapping_add(self.epoch_offset)
    }

    /// Checks the bit widths.
    ///
    /// The width sum is checked before the sign of each width, so a
    /// configuration such as `(-1, 0)` is reported as negative machine bits
    /// while `(30, -1)` is reported as an illegal width.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::IllegalBitWidth`] if the widths sum to more than
    ///   [`MAX_ADJUSTABLE_BITS`]
    /// - [`ConfigError::NegativeMachineBits`] if `machine_id_bits < 0`
    /// - [`ConfigError::NegativeSequenceBits`] if `sequence_bits < 0`
    ///
    /// # Example
    /// ```
    /// use tickflake::{ConfigError, SnowflakeConfig};
    ///
    /// let config = SnowflakeConfig::new(0, 0, 10, 13);
    /// assert!(matches!(
    ///     config.validate(),
    ///     Err(ConfigError::IllegalBitWidth { .. })
    /// ));
    /// ```
    pub fn validate(&self) -> Result<()> {
        let (machine_id_bits, sequence_bits) = (self.machine_id_bits, self.sequence_bits);

        // widen first: two i8 widths can overflow when summed
        if i16::from(machine_id_bits) + i16::from(sequence_bits) > i16::from(MAX_ADJUSTABLE_BITS) {
            return Err(ConfigError::IllegalBitWidth {
                machine_id_bits,
                sequence_bits,
            });
        }
        if machine_id_bits < 0 {
            return Err(ConfigError::NegativeMachineBits(machine_id_bits));
        }
        if sequence_bits < 0 {
            return Err(ConfigError::NegativeSequenceBits(sequence_bits));
        }
        Ok(())
    }

    /// Validates the configuration and derives its [`IdLayout`].
    ///
    /// # Errors
    ///
    /// Any error returned by [`Self::validate`].
    pub fn layout(&self) -> Result<IdLayout> {
        self.validate()?;
        Ok(IdLayout::new(
            self.machine_id_bits.unsigned_abs(),
            self.sequence_bits.unsigned_abs(),
        ))
    }
}
