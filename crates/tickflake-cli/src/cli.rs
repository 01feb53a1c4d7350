use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tickflake::{CUSTOM_EPOCH, SnowflakeConfig};

/// Command-line and environment configuration for the `tickflake` binary.
///
/// Layout options are global, so they may appear before or after the
/// subcommand. Every layout option also reads from an environment variable,
/// and a `.env` file in the working directory is loaded first.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tickflake",
    version,
    about = "Mint and decode configurable Snowflake-style IDs"
)]
pub struct CliArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// The four layout numbers plus the identity of this host.
#[derive(Args, Debug, Clone)]
pub struct LayoutArgs {
    /// Epoch, in Unix milliseconds, that ID timestamps are measured from.
    ///
    /// Environment variable: `EPOCH_START`
    #[arg(
        long,
        env = "EPOCH_START",
        default_value_t = CUSTOM_EPOCH,
        allow_negative_numbers = true,
        global = true,
    )]
    pub epoch_start: i64,

    /// Milliseconds added to the epoch by the concurrent generator.
    ///
    /// The sequential generator (used by `generate` with one thread) and
    /// `parse` ignore it unless `parse --with-offset` is given.
    ///
    /// Environment variable: `EPOCH_OFFSET`
    #[arg(
        long,
        env = "EPOCH_OFFSET",
        default_value_t = 0,
        allow_negative_numbers = true,
        global = true,
    )]
    pub epoch_offset: i64,

    /// Width of the machine ID field. Together with `--sequence-bits` at
    /// most 22.
    ///
    /// Environment variable: `MACHINE_ID_BITS`
    #[arg(
        long,
        env = "MACHINE_ID_BITS",
        default_value_t = 10,
        allow_negative_numbers = true,
        global = true,
    )]
    pub machine_id_bits: i8,

    /// Width of the per-millisecond sequence field.
    ///
    /// Environment variable: `SEQUENCE_BITS`
    #[arg(
        long,
        env = "SEQUENCE_BITS",
        default_value_t = 12,
        allow_negative_numbers = true,
        global = true,
    )]
    pub sequence_bits: i8,

    /// Machine ID of this host. Must fit in `--machine-id-bits`.
    ///
    /// Environment variable: `MACHINE_ID`
    #[arg(
        long,
        env = "MACHINE_ID",
        default_value_t = 0,
        allow_negative_numbers = true,
        global = true,
    )]
    pub machine_id: i64,

    /// Clock used to timestamp IDs.
    ///
    /// Environment variable: `CLOCK`
    #[arg(long, env = "CLOCK", value_enum, default_value_t = ClockKind::System, global = true)]
    pub clock: ClockKind,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    /// Read the system wall clock on every ID.
    System,
    /// Anchor to the wall clock once, then tick monotonically.
    Monotonic,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Mint IDs and print one per line, in ascending order.
    Generate {
        /// Number of IDs to mint.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Number of threads sharing one concurrent generator.
        #[arg(short, long, default_value_t = 1)]
        threads: usize,

        /// Use the concurrent generator even with a single thread.
        #[arg(long, default_value_t = false)]
        concurrent: bool,
    },

    /// Decode IDs into timestamp, machine ID and sequence.
    Parse {
        /// IDs to decode.
        #[arg(required = true)]
        ids: Vec<u64>,

        /// Print one JSON object per line.
        #[arg(long, default_value_t = false, conflicts_with = "table")]
        json: bool,

        /// Print a bit-layout table for each ID.
        #[arg(long, default_value_t = false)]
        table: bool,

        /// Decode against `--epoch-start` plus `--epoch-offset`, for IDs
        /// minted by the concurrent generator.
        #[arg(long, default_value_t = false)]
        with_offset: bool,
    },

    /// Print the shifts and masks derived from the layout options.
    Layout,
}

/// Validated host configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub config: SnowflakeConfig,
    pub machine_id: i64,
    pub clock: ClockKind,
    pub command: Command,
}

impl TryFrom<CliArgs> for HostConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let LayoutArgs {
            epoch_start,
            epoch_offset,
            machine_id_bits,
            sequence_bits,
            machine_id,
            clock,
        } = args.layout;

        let config =
            SnowflakeConfig::new(epoch_start, epoch_offset, machine_id_bits, sequence_bits);
        config.validate().context("invalid ID layout")?;

        if let Command::Generate { threads: 0, .. } = args.command {
            bail!("--threads must be greater than 0");
        }

        Ok(Self {
            config,
            machine_id,
            clock,
            command: args.command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(args: &[&str]) -> anyhow::Result<HostConfig> {
        let argv = std::iter::once("tickflake").chain(args.iter().copied());
        HostConfig::try_from(CliArgs::try_parse_from(argv)?)
    }

    #[test]
    fn defaults_match_library_default() {
        let host = host(&["layout"]).unwrap();
        assert_eq!(host.config, SnowflakeConfig::default());
        assert_eq!(host.machine_id, 0);
        assert_eq!(host.clock, ClockKind::System);
        assert_eq!(host.command, Command::Layout);
    }

    #[test]
    fn layout_options_are_global() {
        let host = host(&[
            "generate",
            "--count",
            "5",
            "--machine-id-bits",
            "4",
            "--sequence-bits",
            "6",
            "--machine-id",
            "15",
            "--clock",
            "monotonic",
        ])
        .unwrap();

        assert_eq!(host.config.machine_id_bits, 4);
        assert_eq!(host.config.sequence_bits, 6);
        assert_eq!(host.machine_id, 15);
        assert_eq!(host.clock, ClockKind::Monotonic);
        assert_eq!(
            host.command,
            Command::Generate {
                count: 5,
                threads: 1,
                concurrent: false
            }
        );
    }

    #[test]
    fn rejects_wide_layout() {
        let args = ["--machine-id-bits", "10", "--sequence-bits", "13", "layout"];
        let err = host(&args).unwrap_err();
        assert!(err.to_string().contains("invalid ID layout"));
    }

    #[test]
    fn accepts_negative_values_for_library_to_reject() {
        let err = host(&["--machine-id-bits", "-1", "layout"]).unwrap_err();
        assert!(format!("{err:#}").contains("must not be negative"));
    }

    #[test]
    fn rejects_zero_threads() {
        let err = host(&["generate", "--threads", "0"]).unwrap_err();
        assert!(err.to_string().contains("--threads"));
    }

    #[test]
    fn parse_requires_ids() {
        assert!(CliArgs::try_parse_from(["tickflake", "parse"]).is_err());
    }

    #[test]
    fn json_and_table_conflict() {
        assert!(CliArgs::try_parse_from(["tickflake", "parse", "1", "--json", "--table"]).is_err());
    }
}
