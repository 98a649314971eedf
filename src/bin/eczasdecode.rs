//! e-CzasPL Stream Decoder
//!
//! Reads a demodulated sample stream and prints decoded time messages.
//!
//! **Usage**:
//! ```bash
//! eczassim | eczasdecode
//! eczasdecode recording.wav
//! ```
//!
//! Input is raw little-endian signed 16-bit samples on stdin, or a 16-bit
//! mono WAV file given as an argument. Use `-v` to also print the frame at
//! each pipeline stage.

use std::cell::Cell;
use std::env;
use std::io::Read;
use std::rc::Rc;

use rustyeczas::{tracing_init, Decoder, TimeData, TimeFrame};
use tracing::{debug, warn};

fn format_hex(frame: &TimeFrame) -> String {
    let mut out = String::with_capacity(frame.len() * 3);
    for (i, byte) in frame.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

fn format_binary(frame: &TimeFrame) -> String {
    let mut out = String::with_capacity(frame.len() * 9);
    for (i, byte) in frame.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{byte:08b}"));
    }
    out
}

fn print_stage(stage: &str, frame: &TimeFrame, first_sample: u32) {
    println!("{stage} frame at {first_sample}: {}", format_hex(frame));
    println!("{:width$}  {}", "", format_binary(frame), width = stage.len());
}

fn print_time_data(frame_no: u32, time: &TimeData, first_sample: u32) {
    println!(
        "Time frame {frame_no} at {first_sample}: utc2000 {}, unix {}, UTC+{}h{}{}{} [{:?}]",
        time.utc_seconds_since_2000,
        time.unix_seconds,
        time.offset.hours(),
        if time.time_zone_change_announced {
            ", TZ change announced"
        } else {
            ""
        },
        if time.leap_second_announced {
            ", leap second announced"
        } else {
            ""
        },
        if time.leap_second_announced {
            if time.leap_second_positive {
                " (positive)"
            } else {
                " (negative)"
            }
        } else {
            ""
        },
        time.transmitter_state,
    );
}

/// Read 16-bit mono PCM samples from a WAV file.
fn read_wav(path: &str) -> Result<Vec<i16>, String> {
    let mut reader =
        hound::WavReader::open(path).map_err(|e| format!("Failed to open '{path}': {e}"))?;
    let spec = reader.spec();
    if spec.channels != 1 || spec.bits_per_sample != 16 {
        return Err(format!(
            "'{path}' is not 16-bit mono (channels: {}, bits: {})",
            spec.channels, spec.bits_per_sample
        ));
    }
    reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("Failed to read samples: {e}"))
}

fn main() {
    tracing_init::init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut samples_per_bit: u8 = 10;
    let mut verbose = false;
    let mut input_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-v" | "--verbose" => verbose = true,
            "-s" | "--samples-per-bit" => {
                i += 1;
                samples_per_bit = args
                    .get(i)
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("-s expects a number of samples per bit");
                        std::process::exit(1);
                    });
            }
            "-h" | "--help" => {
                print_usage(&args[0]);
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => input_path = Some(arg.to_string()),
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                print_usage(&args[0]);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut decoder = Decoder::new(samples_per_bit);

    if verbose {
        decoder.on_raw_frame(|frame, n| print_stage("raw", frame, n));
        decoder.on_rs_frame(|frame, n| print_stage("rs ", frame, n));
        decoder.on_crc_frame(|frame, n| print_stage("crc", frame, n));
    }

    let frame_counter = Rc::new(Cell::new(0u32));
    {
        let frame_counter = frame_counter.clone();
        decoder.on_time_data(move |time, n| {
            frame_counter.set(frame_counter.get() + 1);
            print_time_data(frame_counter.get(), time, n);
        });
    }

    let error_counter = Rc::new(Cell::new(0u32));
    {
        let error_counter = error_counter.clone();
        decoder.on_processing_error(move |error| {
            error_counter.set(error_counter.get() + 1);
            debug!("frame dropped: {error}");
        });
    }

    let mut processed: u64 = 0;
    let mut was_full = false;

    let mut feed = |decoder: &mut Decoder, sample: i16| {
        let full = decoder.process_sample(sample);
        if full && !was_full {
            warn!("stream buffer full, decoder is falling behind");
        }
        was_full = full;
        processed += 1;
    };

    match input_path {
        Some(path) => {
            let samples = match read_wav(&path) {
                Ok(samples) => samples,
                Err(message) => {
                    eprintln!("Error: {message}");
                    std::process::exit(1);
                }
            };
            for sample in samples {
                feed(&mut decoder, sample);
            }
        }
        None => {
            let mut stdin = std::io::stdin().lock();
            let mut chunk = [0u8; 2];
            while stdin.read_exact(&mut chunk).is_ok() {
                feed(&mut decoder, i16::from_le_bytes(chunk));
            }
        }
    }

    drop(feed);
    println!(
        "Processed {processed} samples: {} time frame(s), {} dropped frame(s), {} false detection(s).",
        frame_counter.get(),
        error_counter.get(),
        decoder.false_detections()
    );
}

fn print_usage(program: &str) {
    eprintln!("Usage: {program} [OPTIONS] [input.wav]");
    eprintln!();
    eprintln!("Decodes e-CzasPL time frames from a demodulated sample stream.");
    eprintln!("Without a WAV file, raw little-endian int16 samples are read from stdin.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --samples-per-bit N   Oversampling rate of the stream (default: 10)");
    eprintln!("  -v, --verbose             Print raw/RS/CRC frames for every detection");
    eprintln!("  -h, --help                Show this help");
}
