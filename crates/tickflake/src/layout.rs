/// Bit positions and masks for a validated pair of field widths.
///
/// This is the single place where IDs are packed and unpacked. Both
/// generators and [`IdParser`] hold a copy and defer to it, so every producer
/// and consumer of an ID agrees on the layout.
///
/// Widths of zero are legal: the field's mask is `0` and the field always
/// reads as zero.
///
/// A layout only comes from [`SnowflakeConfig::layout`] (or a generator
/// built from one), so its widths always fit the 22-bit budget. Raw widths
/// cannot be turned into a layout directly:
///
/// ```compile_fail
/// let layout = tickflake::IdLayout::new(40, 40);
/// ```
///
/// # Example
/// ```
/// use tickflake::SnowflakeConfig;
///
/// let layout = SnowflakeConfig::new(0, 0, 10, 12).layout()?;
/// assert_eq!(layout.machine_left(), 12);
/// assert_eq!(layout.timestamp_left(), 22);
/// assert_eq!(layout.max_machine_id(), 1023);
/// assert_eq!(layout.max_sequence(), 4095);
///
/// let id = layout.compose(1_000, 7, 3);
/// assert_eq!(layout.decompose(id), (1_000, 7, 3));
/// # Ok::<(), tickflake::ConfigError>(())
/// ```
///
/// [`IdParser`]: crate::IdParser
/// [`SnowflakeConfig::layout`]: crate::SnowflakeConfig::layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IdLayout {
    machine_id_bits: u8,
    sequence_bits: u8,
}

impl IdLayout {
    /// Creates a layout from widths already checked by
    /// [`SnowflakeConfig::validate`].
    ///
    /// [`SnowflakeConfig::validate`]: crate::SnowflakeConfig::validate
    pub(crate) const fn new(machine_id_bits: u8, sequence_bits: u8) -> Self {
        debug_assert!(
            machine_id_bits as u16 + sequence_bits as u16 <= 63,
            "layout overflows 64 bits"
        );
        Self {
            machine_id_bits,
            sequence_bits,
        }
    }

    pub const fn machine_id_bits(&self) -> u8 {
        self.machine_id_bits
    }

    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    /// Width left for the timestamp delta below the sign bit.
    pub const fn timestamp_bits(&self) -> u8 {
        63 - self.machine_id_bits - self.sequence_bits
    }

    /// Shift applied to the machine ID (equal to the sequence width).
    pub const fn machine_left(&self) -> u32 {
        self.sequence_bits as u32
    }

    /// Shift applied to the timestamp delta.
    pub const fn timestamp_left(&self) -> u32 {
        self.machine_left() + self.machine_id_bits as u32
    }

    pub const fn max_machine_id(&self) -> u64 {
        mask(self.machine_id_bits)
    }

    pub const fn max_sequence(&self) -> u64 {
        mask(self.sequence_bits)
    }

    /// Packs the three fields into one word.
    ///
    /// Fields are OR-ed in place without masking, matching what generators
    /// emit: callers guarantee `machine_id` and `sequence` are in range, and
    /// a timestamp delta wider than [`Self::timestamp_bits`] spills into the
    /// sign bit (or off the top of the word).
    #[inline]
    pub const fn compose(&self, timestamp: u64, machine_id: u64, sequence: u64) -> u64 {
        timestamp << self.timestamp_left() | machine_id << self.machine_left() | sequence
    }

    /// Splits a word into `(timestamp, machine_id, sequence)`.
    ///
    /// Each lower field is masked with its own width, so timestamp bits never
    /// leak into the machine ID. The timestamp is everything above
    /// [`Self::timestamp_left`], sign bit included.
    #[inline]
    pub const fn decompose(&self, id: u64) -> (u64, u64, u64) {
        (
            id >> self.timestamp_left(),
            (id >> self.machine_left()) & self.max_machine_id(),
            id & self.max_sequence(),
        )
    }
}

const fn mask(bits: u8) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1 << bits) - 1
    }
}
