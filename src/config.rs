//! Configuration for the wavforge generator.
//!
//! Defaults reproduce the classic hardcoded invocation: 200,000
//! eight-bit mono samples alternating 0/255 at 44.1 kHz, written to
//! `sound.wav`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::pattern::{DEFAULT_HIGH, DEFAULT_LOW, TestPattern, silence_level};
use crate::wav::PcmFormat;

/// Bit depth of one sample per channel.
///
/// Stored as the byte width the container serializes with.
///
/// # Parsing formats
/// - `8`, `16`, `24`, `32` - bits, bare
/// - `8bit`, `16-bit`, `24 bits` - bits with suffix
///
/// # Example
/// ```
/// use wavforge::config::BitDepth;
///
/// let depth: BitDepth = "16bit".parse().unwrap();
/// assert_eq!(depth.bytes(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitDepth(u16);

impl BitDepth {
    /// Create from a bit count; only whole-byte PCM depths are accepted.
    pub fn from_bits(bits: u16) -> Result<Self, String> {
        match bits {
            8 | 16 | 24 | 32 => Ok(Self(bits / 8)),
            _ => Err(format!("unsupported bit depth: {}", bits)),
        }
    }

    /// Bytes per sample per channel.
    pub fn bytes(&self) -> u16 {
        self.0
    }

    pub fn bits(&self) -> u16 {
        self.0 * 8
    }
}

impl Default for BitDepth {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bit", self.bits())
    }
}

impl FromStr for BitDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();

        let num = lower
            .strip_suffix("bits")
            .or_else(|| lower.strip_suffix("bit"))
            .unwrap_or(&lower)
            .trim_end_matches(['-', ' ']);

        let bits: u16 = num
            .parse()
            .map_err(|_| format!("invalid bit depth: {}", s))?;
        Self::from_bits(bits)
    }
}

/// Test pattern selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PatternKind {
    /// Two-level square-like pattern (the classic 0/255 test signal)
    Alternating,
    /// Constant level, silence midpoint unless overridden
    Constant,
    /// Rising ramp through the configured range
    Ramp,
}

/// Format parameters for the produced container
#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Bit depth per sample per channel
    pub bit_depth: BitDepth,
    /// Number of interleaved channels
    pub channels: u16,
}

impl FormatConfig {
    /// Resolve to the writer's format parameters.
    pub fn pcm(&self) -> PcmFormat {
        PcmFormat {
            sample_rate: self.sample_rate,
            sample_width: self.bit_depth.bytes(),
            channels: self.channels,
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            bit_depth: BitDepth::default(),
            channels: 1,
        }
    }
}

/// Pattern synthesis parameters
#[derive(Debug, Clone)]
pub struct PatternConfig {
    /// Which pattern to synthesize
    pub kind: PatternKind,
    /// Low level for alternating/ramp patterns
    pub low: u32,
    /// High level for alternating/ramp patterns
    pub high: u32,
    /// Constant pattern level; `None` selects the silence midpoint of
    /// the configured bit depth
    pub level: Option<u32>,
    /// Total number of samples (interleaved channel-samples)
    pub samples: usize,
}

impl PatternConfig {
    /// Resolve to a concrete pattern producer for the given sample width.
    pub fn resolve(&self, sample_width: u16) -> TestPattern {
        match self.kind {
            PatternKind::Alternating => TestPattern::Alternating {
                low: self.low,
                high: self.high,
            },
            PatternKind::Constant => TestPattern::Constant {
                level: self.level.unwrap_or_else(|| silence_level(sample_width)),
            },
            PatternKind::Ramp => TestPattern::Ramp {
                low: self.low,
                high: self.high,
            },
        }
    }
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            kind: PatternKind::Alternating,
            low: DEFAULT_LOW,
            high: DEFAULT_HIGH,
            level: None,
            samples: 200_000,
        }
    }
}

/// Top-level generator configuration
///
/// # Example
/// ```
/// use wavforge::config::OutputConfig;
///
/// let mut config = OutputConfig::default();
/// config.format.sample_rate = 8000;
/// ```
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Destination file
    pub path: PathBuf,
    /// Container format parameters
    pub format: FormatConfig,
    /// Pattern synthesis parameters
    pub pattern: PatternConfig,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sound.wav"),
            format: FormatConfig::default(),
            pattern: PatternConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_depth_bare_bits() {
        let depth: BitDepth = "8".parse().unwrap();
        assert_eq!(depth.bytes(), 1);

        let depth: BitDepth = "32".parse().unwrap();
        assert_eq!(depth.bytes(), 4);
    }

    #[test]
    fn test_bit_depth_with_suffix() {
        let depth: BitDepth = "16bit".parse().unwrap();
        assert_eq!(depth.bytes(), 2);

        let depth: BitDepth = "24-bit".parse().unwrap();
        assert_eq!(depth.bytes(), 3);

        let depth: BitDepth = "16 bits".parse().unwrap();
        assert_eq!(depth.bytes(), 2);
    }

    #[test]
    fn test_bit_depth_invalid() {
        assert!("abc".parse::<BitDepth>().is_err());
        assert!("12".parse::<BitDepth>().is_err());
        assert!("0".parse::<BitDepth>().is_err());
        assert!("-8".parse::<BitDepth>().is_err());
    }

    #[test]
    fn test_bit_depth_display_round_trip() {
        let depth = BitDepth::from_bits(16).unwrap();
        assert_eq!(depth.to_string().parse::<BitDepth>().unwrap(), depth);
    }

    #[test]
    fn test_default_config_matches_classic_invocation() {
        let config = OutputConfig::default();
        assert_eq!(config.path, PathBuf::from("sound.wav"));
        assert_eq!(config.format.sample_rate, 44100);
        assert_eq!(config.format.bit_depth.bytes(), 1);
        assert_eq!(config.format.channels, 1);
        assert_eq!(config.pattern.samples, 200_000);
        assert_eq!(
            config.pattern.resolve(1),
            TestPattern::Alternating { low: 0, high: 255 }
        );
    }

    #[test]
    fn test_constant_defaults_to_silence_midpoint() {
        let config = PatternConfig {
            kind: PatternKind::Constant,
            ..PatternConfig::default()
        };
        assert_eq!(config.resolve(1), TestPattern::Constant { level: 128 });
        assert_eq!(config.resolve(2), TestPattern::Constant { level: 32768 });
    }
}
