//! Configurable 64-bit Snowflake-style identifiers.
//!
//! An ID packs three unsigned fields below a zero sign bit:
//!
//! ```text
//!  +------+----------------------+--------------------+------------------+
//!  | sign | timestamp - epoch    | machine ID         | sequence         |
//!  +------+----------------------+--------------------+------------------+
//!           >= 41 bits             machine_id_bits      sequence_bits
//! ```
//!
//! The machine ID and sequence widths are chosen per deployment through
//! [`SnowflakeConfig`] and together may use at most 22 bits.
//!
//! - [`SequentialGenerator`] and [`ConcurrentGenerator`] mint IDs through the
//!   common [`IdSource`] trait.
//! - [`IdParser`] recovers the fields from an ID.
//! - [`TimeSource`] is the clock seam; [`SystemClock`] and
//!   [`MonotonicClock`] are provided.
//!
//! Neither generator ever blocks. When a millisecond's sequence space is used
//! up, the generator advances its own logical clock instead of waiting for
//! the real one.
//!
//! ```
//! use tickflake::{ConcurrentGenerator, IdSource, SnowflakeConfig};
//!
//! let generator = ConcurrentGenerator::new(&SnowflakeConfig::default(), 3)?;
//! let id = generator.next_id();
//!
//! let parsed = generator.parser().parse(id);
//! assert_eq!(parsed.machine_id, 3);
//! # Ok::<(), tickflake::ConfigError>(())
//! ```

mod config;
mod error;
mod generator;
mod layout;
mod parser;
mod time;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::generator::{ConcurrentGenerator, IdSource, SequentialGenerator};
pub use crate::layout::*;
pub use crate::parser::*;
pub use crate::time::*;
