// demos/plx_dump.rs
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::{error, info};
use plx_rs::*;

#[derive(Parser, Debug)]
#[command(
    name = "plx_dump",
    version = env!("CARGO_PKG_VERSION"),
    about = "Inspect PLX recordings",
    long_about = None,
)]
struct Cli {
    /// PLX file to read
    file: PathBuf,
    /// Memory-map the file instead of buffered reads
    #[arg(long)]
    mmap: bool,
    /// Reject files without the PLX magic number
    #[arg(long)]
    check_magic: bool,
    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// File header, channel headers and summary counts (default)
    Info,
    /// Print the first data blocks
    Blocks {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Spike timestamps of one DSP channel
    Spikes {
        #[arg(short, long)]
        channel: i32,
        /// 0 = unsorted, 1..4 = units a..d; all units when omitted
        #[arg(short, long)]
        unit: Option<i16>,
    },
    /// Spike waveforms in volts
    Waveforms {
        #[arg(short, long)]
        channel: i32,
        #[arg(short, long)]
        unit: Option<i16>,
    },
    /// Event timestamps of one event channel
    Events {
        #[arg(short, long)]
        channel: i32,
    },
    /// Continuous samples of one 0-based A/D channel
    Ad {
        #[arg(short, long)]
        channel: i32,
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Compare header summary counts with the data blocks
    Audit,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };

    env_logger::Builder::new()
        .filter_level(level.parse().unwrap())
        .format_target(false)
        .init();

    let options = ReaderOptions::new().with_magic_check(cli.check_magic);
    let command = cli.command.unwrap_or(Command::Info);

    let result = if cli.mmap {
        open_mmap(&cli.file, options).and_then(|mut reader| run(&mut reader, command))
    } else {
        PlxReader::open_with_options(&cli.file, options).and_then(|mut reader| run(&mut reader, command))
    };

    if let Err(e) = result {
        error!("{}: {e}", cli.file.display());
        std::process::exit(1);
    }
}

#[cfg(feature = "mmap")]
fn open_mmap(path: &Path, options: ReaderOptions) -> Result<PlxReader<std::io::Cursor<memmap2::Mmap>>> {
    PlxReader::open_mmap_with_options(path, options)
}

#[cfg(not(feature = "mmap"))]
fn open_mmap(path: &Path, options: ReaderOptions) -> Result<PlxReader<std::fs::File>> {
    log::warn!("Built without the mmap feature, reading unbuffered");
    let file = std::fs::File::open(path)?;
    PlxReader::with_options(file, options)
}

fn run<R: raw_data::ReadSeek>(reader: &mut PlxReader<R>, command: Command) -> Result<()> {
    match command {
        Command::Info => print_info(reader),
        Command::Blocks { limit } => print_blocks(reader, limit)?,
        Command::Spikes { channel, unit } => {
            let spikes = reader.spike_timestamps(channel, unit.map(SortedUnit::from_raw))?;
            info!("{} spikes on DSP channel {}", spikes.len(), channel);
            for spike in spikes {
                println!("{:>14} {:>14.6} {}", spike.ticks, spike.seconds, spike.unit);
            }
        }
        Command::Waveforms { channel, unit } => {
            let spikes = reader.spike_waveforms(channel, unit.map(SortedUnit::from_raw))?;
            info!("{} waveforms on DSP channel {}", spikes.len(), channel);
            for spike in spikes {
                let volts: Vec<String> = spike.volts.iter().map(|v| format!("{:.6}", v)).collect();
                println!("{:>14.6} {} [{}]", spike.seconds, spike.unit, volts.join(", "));
            }
        }
        Command::Events { channel } => {
            let events = reader.event_timestamps(channel)?;
            info!("{} events on channel {}", events.len(), channel);
            for event in events {
                match event.strobed {
                    Some(value) => println!("{:>14} {:>14.6} strobed {}", event.ticks, event.seconds, value),
                    None => println!("{:>14} {:>14.6}", event.ticks, event.seconds),
                }
            }
        }
        Command::Ad { channel, limit } => {
            let data = reader.continuous(channel)?;
            info!(
                "A/D channel {}: {} samples in {} blocks",
                channel,
                data.samples.len(),
                data.blocks
            );
            for sample in data.samples.iter().take(limit) {
                println!("{:>14} {:>14.6} {:>7} {:>12.6}", sample.ticks, sample.seconds, sample.raw, sample.volts);
            }
        }
        Command::Audit => {
            let audit = reader.audit_counts()?;
            println!("{} blocks, {} outside the summary tables", audit.blocks, audit.untracked);
            if audit.is_consistent() {
                println!("Summary counts match the data blocks");
            }
            for mismatch in &audit.mismatches {
                println!("  {}", mismatch);
            }
        }
    }
    Ok(())
}

fn print_info<R: raw_data::ReadSeek>(reader: &PlxReader<R>) {
    let header = reader.header();
    println!("Version:            {}", header.version);
    println!("Comment:            {}", header.comment);
    println!("Created:            {}", header.created());
    println!("Timestamp clock:    {} Hz", header.ad_frequency);
    println!("Waveform frequency: {} Hz", header.waveform_frequency);
    println!("Points per wave:    {} ({} pre-threshold)", header.num_points_wave, header.num_points_pre_threshold);
    println!("Last timestamp:     {:.6} s", header.ticks_to_seconds(header.last_timestamp.max(0.0) as u64));
    println!("Data starts at:     {}", reader.data_start());

    for class in ChannelClass::ALL {
        let channels = reader.channels(class);
        println!("\n{} channels: {}", class, channels.len());
        for channel in channels {
            match channel.gain() {
                Some(gain) => println!("  {:>4} {:<32} gain {}", channel.channel(), channel.name(), gain),
                None => println!("  {:>4} {}", channel.channel(), channel.name()),
            }
        }
    }

    println!("\nDeclared spike counts:");
    for count in header.spike_counts() {
        println!("  channel {:>3} unit {} : {}", count.channel, count.unit, count.count);
    }
    println!("Declared event counts:");
    for (channel, count) in header.event_counts() {
        println!("  channel {:>3} : {}", channel, count);
    }
    println!("Declared A/D sample counts:");
    for (channel, count) in header.ad_counts() {
        println!("  channel {:>3} : {}", channel, count);
    }
}

fn print_blocks<R: raw_data::ReadSeek>(reader: &mut PlxReader<R>, limit: usize) -> Result<()> {
    let blocks: Vec<DataBlock> = reader.scan().take(limit).collect::<Result<_>>()?;
    for block in &blocks {
        let description = match reader.classify(block) {
            ClassifiedRecord::Spike(spike) => format!(
                "spike  ch {:>3} unit {:<9} {} words",
                spike.channel,
                spike.unit.to_string(),
                spike.waveform.len()
            ),
            ClassifiedRecord::Event(event) => match event.kind {
                EventKind::Strobed(value) => format!("event  ch {:>3} strobed {}", event.channel, value),
                EventKind::Plain => format!("event  ch {:>3}", event.channel),
            },
            ClassifiedRecord::Continuous(ad) => {
                format!("A/D    ch {:>3} {} samples", ad.channel, ad.samples.len())
            }
            ClassifiedRecord::Unknown { tag, .. } => format!("type {}", tag),
        };
        println!("{:>14} {}", block.timestamp, description);
    }
    Ok(())
}
