//! WAV file I/O
//!
//! Import reads 16/24/32-bit integer and 32-bit float WAV into
//! [`StereoBuffer`] at the file's native sample rate; export writes the
//! same formats. The processor adapts to any sample rate, so no
//! resampling happens here.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::info;

use super::buffer::StereoBuffer;
use crate::error::{EfectoError, Result};

/// Export format configuration
#[derive(Debug, Clone, Copy)]
pub struct ExportFormat {
    /// Bit depth: 16, 24 (integer) or 32 (float)
    pub bit_depth: u16,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat { bit_depth: 24 }
    }
}

/// Import a WAV file
///
/// Mono files are duplicated to stereo; more than two channels is
/// rejected.
pub fn import_wav(path: &Path) -> Result<StereoBuffer> {
    if !path.exists() {
        return Err(EfectoError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let reader = WavReader::open(path).map_err(|e| EfectoError::InvalidAudio {
        reason: format!("failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let num_channels = spec.channels as usize;
    if num_channels > 2 {
        return Err(EfectoError::UnsupportedFormat {
            format: format!(
                "{}-channel audio (only mono/stereo supported)",
                num_channels
            ),
        });
    }

    let samples = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;

    let buffer = StereoBuffer::from_interleaved(&samples, num_channels, spec.sample_rate)?;
    info!(
        path = %path.display(),
        sample_rate = spec.sample_rate,
        channels = num_channels,
        duration_secs = buffer.duration_secs(),
        "imported WAV"
    );
    Ok(buffer)
}

fn read_samples_as_f32(
    reader: WavReader<std::io::BufReader<std::fs::File>>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let map_err = |e: hound::Error| EfectoError::InvalidAudio {
        reason: format!("failed to read samples: {}", e),
        source: Some(Box::new(e)),
    };

    match (sample_format, bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(map_err),
        (SampleFormat::Int, 16) => reader
            .into_samples::<i16>()
            .map(|s| s.map(|v| f32::from(v) / 32768.0))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(map_err),
        (SampleFormat::Int, 24) => reader
            .into_samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8_388_608.0))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(map_err),
        (SampleFormat::Int, 32) => reader
            .into_samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2_147_483_648.0))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(map_err),
        (format, bits) => Err(EfectoError::UnsupportedFormat {
            format: format!("{:?} {}-bit WAV", format, bits),
        }),
    }
}

/// Export a stereo buffer to a WAV file
pub fn export_wav(path: &Path, buffer: &StereoBuffer, format: ExportFormat) -> Result<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: format.bit_depth,
        sample_format: if format.bit_depth == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| EfectoError::InvalidAudio {
        reason: format!("failed to create WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let write_err = |e: hound::Error| EfectoError::InvalidAudio {
        reason: format!("failed to write samples: {}", e),
        source: Some(Box::new(e)),
    };

    let interleaved = buffer.to_interleaved();
    match format.bit_depth {
        16 => {
            for &s in &interleaved {
                let v = (s.clamp(-1.0, 1.0) * 32767.0).round() as i16;
                writer.write_sample(v).map_err(write_err)?;
            }
        }
        24 => {
            for &s in &interleaved {
                let v = (s.clamp(-1.0, 1.0) * 8_388_607.0).round() as i32;
                writer.write_sample(v).map_err(write_err)?;
            }
        }
        32 => {
            for &s in &interleaved {
                writer.write_sample(s).map_err(write_err)?;
            }
        }
        bits => {
            return Err(EfectoError::UnsupportedFormat {
                format: format!("{}-bit export", bits),
            })
        }
    }

    writer.finalize().map_err(write_err)?;
    info!(path = %path.display(), bit_depth = format.bit_depth, "exported WAV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_tone(sample_rate: u32, num_samples: usize) -> StereoBuffer {
        let mut buf = StereoBuffer::new(num_samples, sample_rate);
        let (left, right) = buf.channels_mut();
        for i in 0..num_samples {
            let t = i as f64 / f64::from(sample_rate);
            let s = (2.0 * std::f64::consts::PI * 440.0 * t).sin() as f32 * 0.5;
            left[i] = s;
            right[i] = -s;
        }
        buf
    }

    #[test]
    fn test_wav_round_trip_float() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let original = test_tone(48000, 4800);
        export_wav(&path, &original, ExportFormat { bit_depth: 32 }).unwrap();

        let imported = import_wav(&path).unwrap();
        assert_eq!(imported.sample_rate(), 48000);
        assert_eq!(imported.num_samples(), 4800);
        for (a, b) in original.left().iter().zip(imported.left()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_wav_round_trip_16_bit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone16.wav");

        let original = test_tone(44100, 4410);
        export_wav(&path, &original, ExportFormat { bit_depth: 16 }).unwrap();

        let imported = import_wav(&path).unwrap();
        // 16-bit quantization error stays below one LSB
        for (a, b) in original.right().iter().zip(imported.right()) {
            assert!((a - b).abs() < 1.0 / 32000.0);
        }
    }

    #[test]
    fn test_missing_file() {
        let err = import_wav(Path::new("/nonexistent/audio.wav")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_unsupported_export_depth() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.wav");
        let buf = StereoBuffer::new(16, 44100);
        let err = export_wav(&path, &buf, ExportFormat { bit_depth: 12 }).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }
}
