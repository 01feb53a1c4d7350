use std::{
    io::{self, BufWriter, Write},
    thread,
    time::Instant,
};

use anyhow::{Context, anyhow};
use serde::Serialize;
use tickflake::{
    ConcurrentGenerator, IdLayout, IdParser, IdSource, MonotonicClock, ParsedId,
    SequentialGenerator, SnowflakeConfig, SystemClock, TimeSource,
};
use tracing::info;

use crate::cli::{ClockKind, Command, HostConfig};

/// Runs the configured subcommand, writing results to stdout.
pub fn run(host: &HostConfig) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match &host.command {
        Command::Generate {
            count,
            threads,
            concurrent,
        } => {
            let started = Instant::now();
            let ids = match host.clock {
                ClockKind::System => generate(host, SystemClock, *count, *threads, *concurrent)?,
                ClockKind::Monotonic => {
                    generate(host, MonotonicClock::new(), *count, *threads, *concurrent)?
                }
            };
            write_ids(&mut out, &ids)?;
            info!(
                count = ids.len(),
                threads,
                elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                "minted IDs"
            );
        }
        Command::Parse {
            ids,
            json,
            table,
            with_offset,
        } => {
            let parser = parser_for(&host.config, *with_offset)?;
            let format = if *json {
                ParseFormat::Json
            } else if *table {
                ParseFormat::Table
            } else {
                ParseFormat::Plain
            };
            write_parsed(&mut out, &parser, ids, format)?;
        }
        Command::Layout => write_layout(&mut out, &host.config)?,
    }

    out.flush().context("failed to flush stdout")
}

/// Mints `count` IDs, returned in ascending order.
///
/// A single thread without `--concurrent` uses the sequential generator; any
/// other combination shares one concurrent generator across `threads` scoped
/// threads.
fn generate<T>(
    host: &HostConfig,
    clock: T,
    count: usize,
    threads: usize,
    concurrent: bool,
) -> anyhow::Result<Vec<u64>>
where
    T: TimeSource + Send + Sync,
{
    let mut ids = if threads <= 1 && !concurrent {
        let generator = SequentialGenerator::with_clock(&host.config, host.machine_id, clock)
            .context("failed to build sequential generator")?;
        mint(&generator, count)
    } else {
        let generator = ConcurrentGenerator::with_clock(&host.config, host.machine_id, clock)
            .context("failed to build concurrent generator")?;
        mint_parallel(&generator, count, threads.max(1))?
    };

    ids.sort_unstable();
    Ok(ids)
}

fn mint(generator: &impl IdSource, count: usize) -> Vec<u64> {
    (0..count).map(|_| generator.next_id()).collect()
}

/// Splits `count` across `threads` workers sharing `generator`.
fn mint_parallel<G>(generator: &G, count: usize, threads: usize) -> anyhow::Result<Vec<u64>>
where
    G: IdSource + Sync,
{
    let per_thread = count / threads;
    let remainder = count % threads;

    thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let quota = per_thread + usize::from(i < remainder);
                s.spawn(move || mint(generator, quota))
            })
            .collect();

        let mut ids = Vec::with_capacity(count);
        for handle in handles {
            let batch = handle
                .join()
                .map_err(|_| anyhow!("worker thread panicked"))?;
            ids.extend(batch);
        }
        Ok(ids)
    })
}

fn write_ids(out: &mut impl Write, ids: &[u64]) -> io::Result<()> {
    for id in ids {
        writeln!(out, "{id}")?;
    }
    Ok(())
}

/// IDs minted by the concurrent generator are measured from
/// `epoch_start + epoch_offset`, so `--with-offset` adds the offset back when
/// decoding them.
fn parser_for(config: &SnowflakeConfig, with_offset: bool) -> anyhow::Result<IdParser> {
    let parser = IdParser::new(config).context("invalid ID layout")?;
    if with_offset {
        Ok(IdParser::from_layout(parser.layout(), config.effective_epoch()))
    } else {
        Ok(parser)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParseFormat {
    Plain,
    Json,
    Table,
}

#[derive(Serialize)]
struct ParsedRecord {
    id: u64,
    #[serde(flatten)]
    parsed: ParsedId,
}

fn write_parsed(
    out: &mut impl Write,
    parser: &IdParser,
    ids: &[u64],
    format: ParseFormat,
) -> anyhow::Result<()> {
    for &id in ids {
        match format {
            ParseFormat::Plain => writeln!(out, "{id} {}", parser.parse(id))?,
            ParseFormat::Json => {
                let record = ParsedRecord {
                    id,
                    parsed: parser.parse(id),
                };
                serde_json::to_writer(&mut *out, &record)
                    .context("failed to serialize parsed ID")?;
                writeln!(out)?;
            }
            ParseFormat::Table => writeln!(out, "{}", parser.breakdown(id))?,
        }
    }
    Ok(())
}

fn write_layout(out: &mut impl Write, config: &SnowflakeConfig) -> anyhow::Result<()> {
    let layout: IdLayout = config.layout().context("invalid ID layout")?;

    writeln!(out, "epoch start      : {}", config.epoch_start)?;
    writeln!(out, "epoch offset     : {}", config.epoch_offset)?;
    writeln!(out, "effective epoch  : {}", config.effective_epoch())?;
    writeln!(out, "timestamp bits   : {}", layout.timestamp_bits())?;
    writeln!(out, "machine id bits  : {}", layout.machine_id_bits())?;
    writeln!(out, "sequence bits    : {}", layout.sequence_bits())?;
    writeln!(out, "timestamp shift  : {}", layout.timestamp_left())?;
    writeln!(out, "machine id shift : {}", layout.machine_left())?;
    writeln!(out, "max machine id   : {}", layout.max_machine_id())?;
    writeln!(out, "max sequence     : {}", layout.max_sequence())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    struct FixedClock(i64);

    impl TimeSource for FixedClock {
        fn current_millis(&self) -> i64 {
            self.0
        }
    }

    fn host(config: SnowflakeConfig, machine_id: i64, command: Command) -> HostConfig {
        HostConfig {
            config,
            machine_id,
            clock: ClockKind::System,
            command,
        }
    }

    fn parser_at(epoch_start: i64) -> IdParser {
        IdParser::new(&SnowflakeConfig::new(epoch_start, 0, 10, 12)).unwrap()
    }

    fn generate_host(config: SnowflakeConfig) -> HostConfig {
        host(
            config,
            3,
            Command::Generate {
                count: 0,
                threads: 1,
                concurrent: false,
            },
        )
    }

    #[test]
    fn sequential_ids_are_sorted_and_unique() {
        let config = SnowflakeConfig::new(0, 0, 4, 4);
        let ids = generate(&generate_host(config), FixedClock(100), 50, 1, false).unwrap();

        assert_eq!(ids.len(), 50);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));

        let parser = parser_for(&config, false).unwrap();
        assert!(ids.iter().all(|&id| parser.parse(id).machine_id == 3));
    }

    #[test]
    fn parallel_ids_cover_every_quota() {
        let config = SnowflakeConfig::new(0, 0, 4, 8);
        let ids = generate(&generate_host(config), FixedClock(100), 1_001, 4, true).unwrap();

        assert_eq!(ids.len(), 1_001);
        let unique: HashSet<_> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn offset_flag_matches_generator_variant() {
        let config = SnowflakeConfig::new(0, 40, 0, 0);

        let ids = generate(&generate_host(config), FixedClock(100), 1, 1, true).unwrap();
        assert_eq!(parser_for(&config, true).unwrap().parse(ids[0]).timestamp, 100);

        let ids = generate(&generate_host(config), FixedClock(100), 1, 1, false).unwrap();
        assert_eq!(parser_for(&config, false).unwrap().parse(ids[0]).timestamp, 100);
    }

    #[test]
    fn machine_id_outside_layout_is_reported_by_library() {
        let config = SnowflakeConfig::new(0, 0, 2, 12);
        let mut host = generate_host(config);

        host.machine_id = 4;
        let err = generate(&host, FixedClock(100), 1, 1, false).unwrap_err();
        assert!(format!("{err:#}").contains("greater than the max machine id 3"));

        host.machine_id = -1;
        let err = generate(&host, FixedClock(100), 1, 4, true).unwrap_err();
        assert!(format!("{err:#}").contains("machine id must not be negative"));
    }

    #[test]
    fn plain_output_has_one_line_per_id() {
        let parser = parser_at(1_000);
        let mut out = Vec::new();
        write_parsed(&mut out, &parser, &[5 << 22 | 2 << 12 | 1, 0], ParseFormat::Plain).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "20979713 timestamp=1005 machine_id=2 sequence=1");
        assert_eq!(lines[1], "0 timestamp=1000 machine_id=0 sequence=0");
    }

    #[test]
    fn json_output_flattens_fields() {
        let parser = parser_at(0);
        let mut out = Vec::new();
        write_parsed(&mut out, &parser, &[7 << 22 | 3], ParseFormat::Json).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["id"], 7_u64 << 22 | 3);
        assert_eq!(value["timestamp"], 7);
        assert_eq!(value["machine_id"], 0);
        assert_eq!(value["sequence"], 3);
    }

    #[test]
    fn table_output_includes_layout() {
        let parser = parser_at(0);
        let mut out = Vec::new();
        write_parsed(&mut out, &parser, &[1 << 22], ParseFormat::Table).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("timestamp (42)"));
    }

    #[test]
    fn layout_output_reports_shifts_and_masks() {
        let mut out = Vec::new();
        write_layout(&mut out, &SnowflakeConfig::new(1_000, 5, 10, 12)).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("effective epoch  : 1005"));
        assert!(text.contains("timestamp shift  : 22"));
        assert!(text.contains("max machine id   : 1023"));
        assert!(text.contains("max sequence     : 4095"));
    }

    #[test]
    fn parser_uses_epoch_start_unless_offset_requested() {
        let config = SnowflakeConfig::new(1_000, 5, 10, 12);
        assert_eq!(parser_for(&config, false).unwrap().epoch(), 1_000);
        assert_eq!(parser_for(&config, true).unwrap().epoch(), 1_005);
    }
}
