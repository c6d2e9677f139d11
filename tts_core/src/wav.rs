use std::io::Cursor;

use anyhow::Context;

/// Encode mono f32 samples as an in-memory WAV (RIFF) file.
///
/// Samples are stored as 32-bit IEEE float so the model output reaches the
/// client unquantized.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> anyhow::Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    // WAV header plus 4 bytes per sample; float WAVs carry a fact chunk, so
    // leave some slack for it.
    let mut cursor = Cursor::new(Vec::<u8>::with_capacity(64 + samples.len() * 4));
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).context("failed to start WAV stream")?;
        for &s in samples {
            writer
                .write_sample(s)
                .context("failed to write WAV sample")?;
        }
        writer.finalize().context("failed to finalize WAV header")?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_wav_header() {
        let bytes = encode_wav(&[0.0, 0.25, -0.25, 1.0], 24_000).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
    }

    #[test]
    fn test_encode_wav_preserves_rate_and_samples() {
        let samples = vec![0.5f32; 480];
        let bytes = encode_wav(&samples, 22_050).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 22_050);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_format, hound::SampleFormat::Float);

        let decoded: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded.len(), 480);
        assert!(decoded.iter().all(|&s| (s - 0.5).abs() < f32::EPSILON));
    }

    #[test]
    fn test_encode_wav_empty() {
        let bytes = encode_wav(&[], 16_000).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.len(), 0);
    }
}
