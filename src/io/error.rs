use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("corrupt record at line {line}: {message}")]
    CorruptRecord { line: usize, message: String },

    #[error("unknown record type at line {line}: {record_type:02X}")]
    UnknownRecordType { line: usize, record_type: u8 },

    #[error("truncated line {line}: need at least {needed} characters, got {found}")]
    TruncatedLine {
        line: usize,
        needed: usize,
        found: usize,
    },

    #[error(
        "unsupported gap at line {line}: {length} bytes at {address:#06X} do not touch run {run_start:#06X}..{run_end:#06X}"
    )]
    UnsupportedGap {
        line: usize,
        address: u32,
        length: usize,
        run_start: u32,
        run_end: u32,
    },

    #[error("duplicate address at line {line}: {address:#06X} is already inside the current run")]
    DuplicateAddress { line: usize, address: u32 },

    #[error(
        "duplicate start address at line {line}: {found:#010X} conflicts with {existing:#010X}"
    )]
    DuplicateStartAddress {
        line: usize,
        existing: u32,
        found: u32,
    },

    #[error("invalid class byte at line {line}: expected 00, got {class:02X}")]
    InvalidClass { line: usize, class: u8 },

    #[error("address overflow at line {line}: {base:#010X} + {offset:#06X}")]
    AddressOverflow { line: usize, base: u32, offset: u32 },

    #[error("missing end-of-file record")]
    MissingEndOfFile,
}

impl ParseError {
    pub(crate) fn corrupt(line: usize, message: impl Into<String>) -> Self {
        Self::CorruptRecord {
            line,
            message: message.into(),
        }
    }

    /// Line the error was raised on, if it belongs to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::CorruptRecord { line, .. }
            | Self::UnknownRecordType { line, .. }
            | Self::TruncatedLine { line, .. }
            | Self::UnsupportedGap { line, .. }
            | Self::DuplicateAddress { line, .. }
            | Self::DuplicateStartAddress { line, .. }
            | Self::InvalidClass { line, .. }
            | Self::AddressOverflow { line, .. } => Some(*line),
            Self::MissingEndOfFile => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("segment at {address:#010X} with {length} bytes exceeds the 32-bit address space")]
    AddressOverflow { address: u32, length: usize },

    #[error("bytes per record must be 1..=255, got {0}")]
    InvalidRecordLength(usize),
}
