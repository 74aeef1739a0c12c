use hound::{SampleFormat, WavReader};
use std::path::Path;

/// Stream properties and waveform of a WAV file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub duration_ms: i64,
    /// Bits per second of the PCM stream
    pub bitrate: u32,
    /// Peak amplitude per bucket, on a 16-bit scale
    pub amps: Vec<i32>,
}

/// Read a WAV file's header and compute its amplitude envelope
pub fn read_wav_info(path: &Path, buckets: usize) -> Result<WavInfo, hound::Error> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let frames = reader.duration() as i64;
    let duration_ms = if spec.sample_rate > 0 {
        frames * 1000 / spec.sample_rate as i64
    } else {
        0
    };

    let samples: Vec<i32> = match spec.sample_format {
        SampleFormat::Int => reader
            .samples::<i32>()
            .map(|s| s.map(|v| to_16_bit(v, spec.bits_per_sample)))
            .collect::<Result<_, _>>()?,
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i32))
            .collect::<Result<_, _>>()?,
    };

    Ok(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        duration_ms,
        bitrate: spec.sample_rate * spec.channels as u32 * spec.bits_per_sample as u32,
        amps: amplitude_envelope(&samples, buckets),
    })
}

fn to_16_bit(sample: i32, bits: u16) -> i32 {
    if bits > 16 {
        sample >> (bits - 16)
    } else {
        sample << (16 - bits)
    }
}

/// Split samples into `buckets` equal chunks and keep each chunk's peak
/// absolute value. Fewer samples than buckets yields one value per sample.
pub fn amplitude_envelope(samples: &[i32], buckets: usize) -> Vec<i32> {
    if samples.is_empty() || buckets == 0 {
        return Vec::new();
    }
    let chunk = samples.len().div_ceil(buckets);
    samples
        .chunks(chunk)
        .map(|c| c.iter().map(|s| s.saturating_abs()).max().unwrap_or(0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    #[test]
    fn test_amplitude_envelope_peaks() {
        let samples = [1, -5, 3, 2, -8, 0];
        assert_eq!(amplitude_envelope(&samples, 3), vec![5, 3, 8]);
    }

    #[test]
    fn test_amplitude_envelope_short_input() {
        assert_eq!(amplitude_envelope(&[4, -2], 10), vec![4, 2]);
        assert!(amplitude_envelope(&[], 10).is_empty());
    }

    #[test]
    fn test_to_16_bit_scaling() {
        assert_eq!(to_16_bit(1 << 23, 24), 1 << 15);
        assert_eq!(to_16_bit(100, 16), 100);
        assert_eq!(to_16_bit(1, 8), 256);
    }

    #[test]
    fn test_read_wav_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for i in 0..8000 {
            writer.write_sample(((i % 100) * 10) as i16).unwrap();
        }
        writer.finalize().unwrap();

        let info = read_wav_info(&path, 10).unwrap();
        assert_eq!(info.sample_rate, 8000);
        assert_eq!(info.channels, 1);
        assert_eq!(info.duration_ms, 1000);
        assert_eq!(info.bitrate, 128_000);
        assert_eq!(info.amps.len(), 10);
        assert!(info.amps.iter().all(|a| *a == 990));
    }
}
