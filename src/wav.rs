//! WAV File Generation
//!
//! Wraps synthesized sample streams in a minimal 16-bit PCM mono WAV
//! container so simulator output can be archived and replayed with
//! standard tooling. Byte generation is freestanding; writing to disk
//! needs `std`.

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

/// WAV file header (44 bytes for 16-bit PCM mono).
struct WavHeader {
    sample_rate: u32,
    num_samples: u32,
}

impl WavHeader {
    fn new(sample_rate: u32, num_samples: u32) -> Self {
        Self {
            sample_rate,
            num_samples,
        }
    }

    fn to_bytes(&self) -> [u8; 44] {
        let mut header = [0u8; 44];
        let data_size = self.num_samples * 2;
        let file_size = data_size + 36;

        // RIFF chunk descriptor
        header[0..4].copy_from_slice(b"RIFF");
        header[4..8].copy_from_slice(&file_size.to_le_bytes());
        header[8..12].copy_from_slice(b"WAVE");

        // fmt sub-chunk: PCM, mono, 16 bits
        header[12..16].copy_from_slice(b"fmt ");
        header[16..20].copy_from_slice(&16u32.to_le_bytes());
        header[20..22].copy_from_slice(&1u16.to_le_bytes());
        header[22..24].copy_from_slice(&1u16.to_le_bytes());
        header[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());

        let byte_rate = self.sample_rate * 2;
        header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
        header[32..34].copy_from_slice(&2u16.to_le_bytes());
        header[34..36].copy_from_slice(&16u16.to_le_bytes());

        // data sub-chunk
        header[36..40].copy_from_slice(b"data");
        header[40..44].copy_from_slice(&data_size.to_le_bytes());

        header
    }
}

/// Generate WAV file bytes from 16-bit samples.
pub fn generate_wav_bytes(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    let header = WavHeader::new(sample_rate, samples.len() as u32);

    let mut wav_data = Vec::with_capacity(44 + samples.len() * 2);
    wav_data.extend_from_slice(&header.to_bytes());
    for &sample in samples {
        wav_data.extend_from_slice(&sample.to_le_bytes());
    }

    wav_data
}

/// Write a WAV file to disk (requires the `std` feature).
#[cfg(any(feature = "std", test))]
pub fn write_wav_file(path: &str, samples: &[i16], sample_rate: u32) -> Result<(), String> {
    extern crate std;
    use std::io::Write;

    let wav_bytes = generate_wav_bytes(samples, sample_rate);

    let mut file = std::fs::File::create(path)
        .map_err(|e| alloc::format!("Failed to create file '{}': {}", path, e))?;
    file.write_all(&wav_bytes)
        .map_err(|e| alloc::format!("Failed to write to file '{}': {}", path, e))?;

    Ok(())
}
