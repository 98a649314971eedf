//! e-CzasPL Stream Simulator
//!
//! Synthesizes the demodulated sample stream for a run of time frames, for
//! exercising the decoder without a receiver.
//!
//! **Usage**:
//! ```bash
//! eczassim -n 3 | eczasdecode
//! eczassim -n 10 --noise 7000 -o run.wav
//! ```
//!
//! Output is raw little-endian signed 16-bit samples on stdout, or a WAV
//! file with `-o`.

use std::env;
use std::io::Write;

use rustyeczas::time::EPOCH_2000_UNIX_OFFSET;
use rustyeczas::{
    sim, tracing_init, wav, FrameEncoder, TimeData, TimeZoneOffset, TransmitterState,
};

struct Options {
    frames: u32,
    start_unix: u64,
    offset_hours: u8,
    samples_per_bit: u8,
    seconds_per_frame: usize,
    noise: i16,
    leap_second: bool,
    leap_negative: bool,
    tz_change: bool,
    state: u8,
    output: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            frames: 5,
            // 2024-05-12T12:34:24Z, a 96-second-aligned broadcast instant
            start_unix: 1_715_516_064,
            offset_hours: 2,
            samples_per_bit: 10,
            seconds_per_frame: 3,
            noise: 0,
            leap_second: false,
            leap_negative: false,
            tz_change: false,
            state: 0,
            output: None,
        }
    }
}

fn offset_from_hours(hours: u8) -> TimeZoneOffset {
    match hours {
        0 => TimeZoneOffset::OffsetPlus0h,
        1 => TimeZoneOffset::OffsetPlus1h,
        2 => TimeZoneOffset::OffsetPlus2h,
        3 => TimeZoneOffset::OffsetPlus3h,
        _ => {
            eprintln!("time zone offset must be 0..=3 hours");
            std::process::exit(1);
        }
    }
}

fn parse_options(args: &[String]) -> Options {
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        let take_value = |i: &mut usize| -> String {
            *i += 1;
            args.get(*i).cloned().unwrap_or_else(|| {
                eprintln!("{} expects a value", args[*i - 1]);
                std::process::exit(1);
            })
        };

        match args[i].as_str() {
            "-n" | "--frames" => {
                options.frames = parse_number(&take_value(&mut i));
            }
            "-t" | "--unix-time" => {
                options.start_unix = parse_number(&take_value(&mut i));
            }
            "-z" | "--zone-offset" => {
                options.offset_hours = parse_number(&take_value(&mut i));
            }
            "-s" | "--samples-per-bit" => {
                options.samples_per_bit = parse_number(&take_value(&mut i));
            }
            "-p" | "--period" => {
                options.seconds_per_frame = parse_number(&take_value(&mut i));
            }
            "--noise" => {
                options.noise = parse_number(&take_value(&mut i));
            }
            "--state" => {
                options.state = parse_number(&take_value(&mut i));
            }
            "--leap" => options.leap_second = true,
            "--leap-negative" => {
                options.leap_second = true;
                options.leap_negative = true;
            }
            "--tz-change" => options.tz_change = true,
            "-o" | "--output" => {
                options.output = Some(take_value(&mut i));
            }
            "-h" | "--help" => {
                print_usage(&args[0]);
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                print_usage(&args[0]);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if options.start_unix < EPOCH_2000_UNIX_OFFSET {
        eprintln!("start time predates the broadcast epoch (2000-01-01)");
        std::process::exit(1);
    }
    options
}

fn parse_number<T: std::str::FromStr>(value: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("invalid numeric value: {value}");
        std::process::exit(1);
    })
}

fn main() {
    tracing_init::init_tracing();

    let args: Vec<String> = env::args().collect();
    let options = parse_options(&args);

    let encoder = FrameEncoder::new();
    let spb = options.samples_per_bit as usize;
    let gap = sim::inter_frame_gap(spb, options.seconds_per_frame);

    let mut samples: Vec<i16> = Vec::new();
    // Lead-in so the first sync word is preceded by idle carrier
    samples.extend(sim::idle_samples(4 * spb));

    for frame_no in 0..options.frames {
        let utc = options.start_unix - EPOCH_2000_UNIX_OFFSET
            + u64::from(frame_no) * options.seconds_per_frame as u64;
        let time = TimeData {
            utc_seconds_since_2000: utc,
            unix_seconds: utc + EPOCH_2000_UNIX_OFFSET,
            offset: offset_from_hours(options.offset_hours),
            time_zone_change_announced: options.tz_change,
            leap_second_announced: options.leap_second,
            leap_second_positive: options.leap_second && !options.leap_negative,
            transmitter_state: TransmitterState::from_wire(options.state),
        };

        let frame = encoder.encode(&time);
        samples.extend(sim::frame_samples(&frame, spb, sim::DEFAULT_AMPLITUDE));
        samples.extend(sim::idle_samples(gap));
    }

    if options.noise > 0 {
        sim::add_uniform_noise(&mut samples, options.noise, 0xECA5);
    }

    let sample_rate = (sim::BITS_PER_SECOND * spb) as u32;
    tracing::info!(
        frames = options.frames,
        samples = samples.len(),
        sample_rate,
        "synthesized frame stream"
    );

    match options.output {
        Some(path) => {
            if let Err(message) = wav::write_wav_file(&path, &samples, sample_rate) {
                eprintln!("Error: {message}");
                std::process::exit(1);
            }
        }
        None => {
            let stdout = std::io::stdout();
            let mut stdout = stdout.lock();
            for sample in samples {
                if stdout.write_all(&sample.to_le_bytes()).is_err() {
                    return;
                }
            }
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {program} [OPTIONS]");
    eprintln!();
    eprintln!("Synthesizes a demodulated e-CzasPL sample stream.");
    eprintln!("Raw little-endian int16 samples go to stdout unless -o is given.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -n, --frames N            Number of frames to emit (default: 5)");
    eprintln!("  -t, --unix-time SECONDS   Start time as Unix seconds");
    eprintln!("  -z, --zone-offset HOURS   Transmitter zone offset 0..=3 (default: 2)");
    eprintln!("  -s, --samples-per-bit N   Oversampling rate (default: 10)");
    eprintln!("  -p, --period SECONDS      Frame cadence in seconds (default: 3)");
    eprintln!("      --noise MAX           Overlay uniform in-band noise up to MAX");
    eprintln!("      --state N             Transmitter state wire code 0..=3");
    eprintln!("      --leap                Announce a positive leap second");
    eprintln!("      --leap-negative       Announce a negative leap second");
    eprintln!("      --tz-change           Announce a time zone change");
    eprintln!("  -o, --output FILE.wav     Write a WAV file instead of stdout");
}
