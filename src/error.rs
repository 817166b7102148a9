use thiserror::Error;

#[derive(Error, Debug)]
pub enum WavError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Sample {value} at index {index} does not fit in {width} byte(s)")]
    SampleOverflow {
        index: usize,
        value: u32,
        width: u16,
    },

    #[error("Payload of {0} bytes exceeds the 32-bit RIFF size limit")]
    PayloadTooLarge(u64),
}

pub type Result<T> = std::result::Result<T, WavError>;
