/// A result type whose error defaults to [`ConfigError`].
///
/// Only construction is fallible in `tickflake`. Generating and parsing IDs
/// never fail once a generator or parser exists.
pub type Result<T, E = ConfigError> = core::result::Result<T, E>;

/// All errors that `tickflake` can produce.
///
/// Every variant describes a configuration mistake and is raised while
/// building a generator or parser. None of them are retried internally and no
/// partially built value is ever returned alongside them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The machine ID and sequence fields together claim more than
    /// [`MAX_ADJUSTABLE_BITS`](crate::MAX_ADJUSTABLE_BITS) bits, which would
    /// eat into the 41-bit timestamp or the sign bit.
    #[error(
        "the sum of machine id bits ({machine_id_bits}) and sequence bits ({sequence_bits}) is greater than 22"
    )]
    IllegalBitWidth {
        machine_id_bits: i8,
        sequence_bits: i8,
    },

    /// The machine ID field width is negative.
    #[error("the machine id bits must not be negative (got {0})")]
    NegativeMachineBits(i8),

    /// The sequence field width is negative.
    #[error("the sequence bits must not be negative (got {0})")]
    NegativeSequenceBits(i8),

    /// The supplied machine ID is negative.
    #[error("machine id must not be negative (got {0})")]
    NegativeMachineId(i64),

    /// The supplied machine ID does not fit in the configured machine ID
    /// field.
    #[error("machine id {machine_id} is greater than the max machine id {max}")]
    MachineIdTooLarge { machine_id: i64, max: u64 },
}
