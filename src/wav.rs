//! RIFF/WAVE container writer for unsigned PCM samples.
//!
//! The container is a fixed 44-byte header followed by the raw payload,
//! every multi-byte field little-endian. `write_wav` serializes into any
//! byte sink; `save_wav` is the file-backed entry point.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, WavError};

/// Fixed size of the container header in bytes.
pub const HEADER_LEN: u64 = 44;

/// Header bytes covered by the RIFF chunk size field in addition to the
/// payload: "WAVE" + "fmt " chunk + "data" chunk header.
const RIFF_FORM_OVERHEAD: u32 = 36;

const FMT_CHUNK_LEN: u32 = 16;
const FORMAT_TAG_PCM: u16 = 1;

/// PCM format parameters for one write operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Bytes per sample per channel (1 for 8-bit up to 4 for 32-bit)
    pub sample_width: u16,
    /// Number of interleaved channels
    pub channels: u16,
}

impl PcmFormat {
    /// Create a validated format.
    pub fn new(sample_rate: u32, sample_width: u16, channels: u16) -> Result<Self> {
        let format = Self {
            sample_rate,
            sample_width,
            channels,
        };
        format.validate()?;
        Ok(format)
    }

    /// Payload bytes consumed per second of audio.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.sample_width as u32 * self.channels as u32
    }

    /// Bytes per frame (one sample across all channels).
    pub fn block_align(&self) -> u16 {
        self.sample_width * self.channels
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.sample_width * 8
    }

    /// Largest value representable in `sample_width` bytes, or `None`
    /// when the full `u32` range fits (width 4).
    pub fn max_sample(&self) -> Option<u32> {
        match self.sample_width {
            4 => None,
            width => Some((1u32 << (width * 8)) - 1),
        }
    }

    /// Check that the parameters are positive and that every derived
    /// header field fits its fixed-width encoding.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(WavError::InvalidFormat(
                "sample rate must be positive".to_string(),
            ));
        }
        if self.channels == 0 {
            return Err(WavError::InvalidFormat(
                "channel count must be positive".to_string(),
            ));
        }
        if !(1..=4).contains(&self.sample_width) {
            return Err(WavError::InvalidFormat(format!(
                "sample width must be 1-4 bytes, got {}",
                self.sample_width
            )));
        }
        if self.sample_width.checked_mul(self.channels).is_none() {
            return Err(WavError::InvalidFormat(format!(
                "block alignment {}x{} overflows 16 bits",
                self.sample_width, self.channels
            )));
        }
        if self
            .sample_rate
            .checked_mul(self.sample_width as u32 * self.channels as u32)
            .is_none()
        {
            return Err(WavError::InvalidFormat(format!(
                "byte rate overflows 32 bits at {} Hz",
                self.sample_rate
            )));
        }
        Ok(())
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            sample_width: 1,
            channels: 1,
        }
    }
}

/// Serialize `samples` as unsigned PCM into a WAV container at `path`.
///
/// Creates or truncates the file, writes header and payload in one pass
/// and syncs to disk before returning. On failure a partially written
/// file may remain at `path`.
pub fn save_wav(path: impl AsRef<Path>, format: &PcmFormat, samples: &[u32]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_wav(&mut writer, format, samples)?;
    let file = writer
        .into_inner()
        .map_err(|e| WavError::Io(e.into_error()))?;
    file.sync_all()?;
    log::debug!(
        "Wrote {} bytes to {}",
        HEADER_LEN + samples.len() as u64 * format.sample_width as u64,
        path.display()
    );
    Ok(())
}

/// Serialize `samples` into any byte sink.
///
/// Format parameters are validated before anything is written; a sample
/// that does not fit `sample_width` bytes aborts the write at the
/// offending index.
pub fn write_wav<W: Write>(writer: &mut W, format: &PcmFormat, samples: &[u32]) -> Result<()> {
    format.validate()?;
    let data_len = payload_len(format, samples.len())?;

    // RIFF descriptor
    writer.write_all(b"RIFF")?;
    writer.write_all(&(data_len + RIFF_FORM_OVERHEAD).to_le_bytes())?;
    writer.write_all(b"WAVE")?;

    // "fmt " chunk
    writer.write_all(b"fmt ")?;
    writer.write_all(&FMT_CHUNK_LEN.to_le_bytes())?;
    writer.write_all(&FORMAT_TAG_PCM.to_le_bytes())?;
    writer.write_all(&format.channels.to_le_bytes())?;
    writer.write_all(&format.sample_rate.to_le_bytes())?;
    writer.write_all(&format.byte_rate().to_le_bytes())?;
    writer.write_all(&format.block_align().to_le_bytes())?;
    writer.write_all(&format.bits_per_sample().to_le_bytes())?;

    // "data" chunk
    writer.write_all(b"data")?;
    writer.write_all(&data_len.to_le_bytes())?;
    write_samples(writer, format, samples)
}

fn payload_len(format: &PcmFormat, count: usize) -> Result<u32> {
    let bytes = count as u64 * format.sample_width as u64;
    if bytes > (u32::MAX - RIFF_FORM_OVERHEAD) as u64 {
        return Err(WavError::PayloadTooLarge(bytes));
    }
    Ok(bytes as u32)
}

fn write_samples<W: Write>(writer: &mut W, format: &PcmFormat, samples: &[u32]) -> Result<()> {
    let width = format.sample_width as usize;
    let limit = format.max_sample();
    for (index, &value) in samples.iter().enumerate() {
        if let Some(max) = limit
            && value > max
        {
            return Err(WavError::SampleOverflow {
                index,
                value,
                width: format.sample_width,
            });
        }
        writer.write_all(&value.to_le_bytes()[..width])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(format: &PcmFormat, samples: &[u32]) -> Vec<u8> {
        let mut buf = Vec::new();
        write_wav(&mut buf, format, samples).unwrap();
        buf
    }

    fn u16_at(buf: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(buf[offset..offset + 2].try_into().unwrap())
    }

    fn u32_at(buf: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_chunk_tags_at_fixed_offsets() {
        let buf = render(&PcmFormat::default(), &[0, 255]);
        assert_eq!(&buf[0..4], b"RIFF");
        assert_eq!(&buf[8..12], b"WAVE");
        assert_eq!(&buf[12..16], b"fmt ");
        assert_eq!(&buf[36..40], b"data");
    }

    #[test]
    fn test_eight_bit_mono_layout() {
        let format = PcmFormat::new(8000, 1, 1).unwrap();
        let buf = render(&format, &[0, 255]);

        assert_eq!(buf.len(), 46);
        assert_eq!(u32_at(&buf, 4), 2 + 36, "RIFF chunk size");
        assert_eq!(u32_at(&buf, 16), 16, "fmt chunk length");
        assert_eq!(u16_at(&buf, 20), 1, "PCM format tag");
        assert_eq!(u16_at(&buf, 22), 1, "channels");
        assert_eq!(u32_at(&buf, 24), 8000, "sample rate");
        assert_eq!(u32_at(&buf, 28), 8000, "byte rate");
        assert_eq!(u16_at(&buf, 32), 1, "block align");
        assert_eq!(u16_at(&buf, 34), 8, "bits per sample");
        assert_eq!(&buf[40..44], &[0x02, 0x00, 0x00, 0x00]);
        assert_eq!(&buf[44..46], &[0x00, 0xFF]);
    }

    #[test]
    fn test_sixteen_bit_stereo_layout() {
        let format = PcmFormat::new(44100, 2, 2).unwrap();
        let buf = render(&format, &[1, 2, 3, 4]);

        assert_eq!(buf.len(), 52);
        assert_eq!(u32_at(&buf, 40), 8, "data length");
        assert_eq!(u16_at(&buf, 32), 4, "block align");
        assert_eq!(u16_at(&buf, 34), 16, "bits per sample");
        assert_eq!(&buf[44..52], &[1, 0, 2, 0, 3, 0, 4, 0]);
    }

    #[test]
    fn test_empty_payload_is_header_only() {
        let buf = render(&PcmFormat::default(), &[]);
        assert_eq!(buf.len(), 44);
        assert_eq!(u32_at(&buf, 4), 36);
        assert_eq!(u32_at(&buf, 40), 0);
    }

    #[test]
    fn test_riff_size_tracks_data_length() {
        let format = PcmFormat::new(22050, 2, 1).unwrap();
        for count in [0usize, 1, 7, 200] {
            let buf = render(&format, &vec![0; count]);
            let data_len = u32_at(&buf, 40);
            assert_eq!(data_len as usize, count * 2);
            assert_eq!(u32_at(&buf, 4), data_len + 36);
        }
    }

    #[test]
    fn test_byte_rate_equals_rate_times_block_align() {
        let format = PcmFormat::new(48000, 3, 2).unwrap();
        let buf = render(&format, &[0, 0]);
        assert_eq!(u32_at(&buf, 28), u32_at(&buf, 24) * u16_at(&buf, 32) as u32);
    }

    #[test]
    fn test_oversized_sample_rejected() {
        let format = PcmFormat::new(8000, 1, 1).unwrap();
        let mut buf = Vec::new();
        let err = write_wav(&mut buf, &format, &[0, 256]).unwrap_err();
        match err {
            WavError::SampleOverflow { index, value, width } => {
                assert_eq!(index, 1);
                assert_eq!(value, 256);
                assert_eq!(width, 1);
            }
            other => panic!("expected SampleOverflow, got {other}"),
        }
    }

    #[test]
    fn test_max_value_per_width_fits() {
        let format = PcmFormat::new(8000, 3, 1).unwrap();
        let buf = render(&format, &[0xFF_FFFF]);
        assert_eq!(&buf[44..47], &[0xFF, 0xFF, 0xFF]);

        let format = PcmFormat::new(8000, 4, 1).unwrap();
        let buf = render(&format, &[u32::MAX]);
        assert_eq!(&buf[44..48], &[0xFF; 4]);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(PcmFormat::new(0, 1, 1).is_err());
        assert!(PcmFormat::new(8000, 0, 1).is_err());
        assert!(PcmFormat::new(8000, 5, 1).is_err());
        assert!(PcmFormat::new(8000, 1, 0).is_err());
    }

    #[test]
    fn test_max_sample_per_width() {
        assert_eq!(PcmFormat::new(8000, 1, 1).unwrap().max_sample(), Some(255));
        assert_eq!(
            PcmFormat::new(8000, 2, 1).unwrap().max_sample(),
            Some(65535)
        );
        assert_eq!(PcmFormat::new(8000, 4, 1).unwrap().max_sample(), None);
    }
}
