use core::fmt;

use crate::{IdLayout, Result, SnowflakeConfig};

/// The three fields recovered from an ID.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParsedId {
    /// Milliseconds since the Unix epoch (the packed delta plus the epoch).
    pub timestamp: i64,
    pub machine_id: u64,
    pub sequence: u64,
}

impl fmt::Display for ParsedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "timestamp={} machine_id={} sequence={}",
            self.timestamp, self.machine_id, self.sequence
        )
    }
}

/// Decodes IDs back into their fields.
///
/// A parser is a pure function of its layout and epoch, so it is `Copy` and
/// can be shared across threads freely. It accepts any 64-bit input and does
/// not check that the ID could have come from this configuration.
///
/// [`IdParser::new`] measures from `epoch_start` and ignores `epoch_offset`,
/// matching [`SequentialGenerator`]. To decode IDs from a generator that
/// honours the offset, use [`IdSource::parser`].
///
/// # Example
/// ```
/// use tickflake::{IdParser, IdSource, SequentialGenerator, SnowflakeConfig};
///
/// let config = SnowflakeConfig::default();
/// let generator = SequentialGenerator::new(&config, 42)?;
/// let parsed = IdParser::new(&config)?.parse(generator.next_id());
/// assert_eq!(parsed.machine_id, 42);
/// # Ok::<(), tickflake::ConfigError>(())
/// ```
///
/// [`IdSource::parser`]: crate::IdSource::parser
/// [`SequentialGenerator`]: crate::SequentialGenerator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IdParser {
    layout: IdLayout,
    epoch: i64,
}

impl IdParser {
    /// Creates a parser for `config`, measuring from `epoch_start`.
    ///
    /// # Errors
    ///
    /// Any error from [`SnowflakeConfig::validate`].
    pub fn new(config: &SnowflakeConfig) -> Result<Self> {
        Ok(Self::from_layout(config.layout()?, config.epoch_start))
    }

    /// Creates a parser for a layout obtained from [`SnowflakeConfig::layout`]
    /// or [`IdSource::layout`](crate::IdSource::layout).
    pub const fn from_layout(layout: IdLayout, epoch: i64) -> Self {
        Self { layout, epoch }
    }

    pub const fn layout(&self) -> IdLayout {
        self.layout
    }

    pub const fn epoch(&self) -> i64 {
        self.epoch
    }

    /// Splits `id` into its fields, adding the epoch back to the timestamp.
    pub const fn parse(&self, id: u64) -> ParsedId {
        let (delta, machine_id, sequence) = self.layout.decompose(id);
        ParsedId {
            timestamp: self.epoch.wrapping_add(delta as i64),
            machine_id,
            sequence,
        }
    }

    /// Returns a printable view of `id` with a bit-layout table.
    ///
    /// ```
    /// use tickflake::{IdParser, SnowflakeConfig};
    ///
    /// let parser = IdParser::new(&SnowflakeConfig::new(0, 0, 10, 12))?;
    /// let text = parser.breakdown(1 << 22 | 5 << 12 | 3).to_string();
    /// assert!(text.contains("machine id (10)"));
    /// # Ok::<(), tickflake::ConfigError>(())
    /// ```
    pub const fn breakdown(&self, id: u64) -> IdBreakdown {
        IdBreakdown {
            id,
            layout: self.layout,
            parsed: self.parse(id),
        }
    }
}

/// A single ID rendered with its layout. See [`IdParser::breakdown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdBreakdown {
    id: u64,
    layout: IdLayout,
    parsed: ParsedId,
}

impl IdBreakdown {
    pub const fn parsed(&self) -> ParsedId {
        self.parsed
    }
}

struct Column {
    label: String,
    dec: String,
    hex: String,
}

impl fmt::Display for IdBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (delta, machine_id, sequence) = self.layout.decompose(self.id);
        let columns: Vec<Column> = [
            ("timestamp", self.layout.timestamp_bits() + 1, delta),
            ("machine id", self.layout.machine_id_bits(), machine_id),
            ("sequence", self.layout.sequence_bits(), sequence),
        ]
        .into_iter()
        .filter(|&(_, bits, _)| bits > 0)
        .map(|(name, bits, value)| Column {
            label: format!("{name} ({bits})"),
            dec: value.to_string(),
            hex: format!("0x{value:x}"),
        })
        .collect();

        let widths: Vec<usize> = columns
            .iter()
            .map(|c| c.label.len().max(c.dec.len()).max(c.hex.len()) + 2)
            .collect();

        writeln!(f, "id         : 0x{:016x} ({})", self.id, self.id)?;
        writeln!(f, "timestamp  : {}", self.parsed.timestamp)?;
        writeln!(f, "machine id : {}", self.parsed.machine_id)?;
        writeln!(f, "sequence   : {}", self.parsed.sequence)?;
        writeln!(f, "layout     :")?;

        let border = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
            write!(f, "    +")?;
            for &w in &widths {
                write!(f, "{}+", "-".repeat(w))?;
            }
            writeln!(f)
        };
        let row = |f: &mut fmt::Formatter<'_>, cell: fn(&Column) -> &str| -> fmt::Result {
            write!(f, "    |")?;
            for (column, &w) in columns.iter().zip(&widths) {
                write!(f, "{:^w$}|", cell(column))?;
            }
            writeln!(f)
        };

        border(f)?;
        row(f, |c| &c.label)?;
        border(f)?;
        row(f, |c| &c.dec)?;
        row(f, |c| &c.hex)?;
        border(f)
    }
}
