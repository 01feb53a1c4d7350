use crate::{ConfigError, IdLayout, Result, SnowflakeConfig};

/// Everything a generator needs to turn `(timestamp, sequence)` into an ID.
///
/// Built once at construction; all validation for both generator variants
/// lives in [`IdEncoder::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct IdEncoder {
    layout: IdLayout,
    machine_id: u64,
    epoch: i64,
}

impl IdEncoder {
    /// Validates `config` and `machine_id` and binds them to `epoch`.
    pub(crate) fn new(config: &SnowflakeConfig, machine_id: i64, epoch: i64) -> Result<Self> {
        let layout = config.layout()?;

        let Ok(unsigned_id) = u64::try_from(machine_id) else {
            return Err(ConfigError::NegativeMachineId(machine_id));
        };
        if unsigned_id > layout.max_machine_id() {
            return Err(ConfigError::MachineIdTooLarge {
                machine_id,
                max: layout.max_machine_id(),
            });
        }

        Ok(Self {
            layout,
            machine_id: unsigned_id,
            epoch,
        })
    }

    pub(crate) const fn layout(&self) -> IdLayout {
        self.layout
    }

    pub(crate) const fn machine_id(&self) -> u64 {
        self.machine_id
    }

    pub(crate) const fn epoch(&self) -> i64 {
        self.epoch
    }

    pub(crate) const fn max_sequence(&self) -> u64 {
        self.layout.max_sequence()
    }

    /// `(timestamp - epoch) << timestamp_left | machine_id << machine_left | sequence`
    ///
    /// A timestamp before the epoch wraps to a two's complement delta, the
    /// same bits a signed 64-bit subtraction would produce.
    #[inline]
    pub(crate) const fn encode(&self, timestamp: i64, sequence: u64) -> u64 {
        let delta = timestamp.wrapping_sub(self.epoch) as u64;
        self.layout.compose(delta, self.machine_id, sequence)
    }
}
