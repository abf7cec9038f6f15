//! Fixed-width checksum-protected record shared by Intel HEX and the
//! S-Record sibling format: `<start>LLAAAATT<data>CC`.

use super::{ComposeError, ParseError, parse_hex_bytes, push_hex_byte, push_hex_bytes};

/// Hex characters in the shortest valid record body (`LLAAAATTCC`).
const MIN_BODY_DIGITS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Data,
    EndOfFile,
    ExtendedSegmentAddress,
    StartSegmentAddress,
    ExtendedLinearAddress,
    StartLinearAddress,
}

impl RecordKind {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(Self::Data),
            0x01 => Some(Self::EndOfFile),
            0x02 => Some(Self::ExtendedSegmentAddress),
            0x03 => Some(Self::StartSegmentAddress),
            0x04 => Some(Self::ExtendedLinearAddress),
            0x05 => Some(Self::StartLinearAddress),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Data => 0x00,
            Self::EndOfFile => 0x01,
            Self::ExtendedSegmentAddress => 0x02,
            Self::StartSegmentAddress => 0x03,
            Self::ExtendedLinearAddress => 0x04,
            Self::StartLinearAddress => 0x05,
        }
    }

    /// Payload length the record kind requires, if fixed.
    pub fn required_length(self) -> Option<usize> {
        match self {
            Self::ExtendedSegmentAddress | Self::ExtendedLinearAddress => Some(2),
            Self::StartSegmentAddress | Self::StartLinearAddress => Some(4),
            Self::Data | Self::EndOfFile => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub kind: RecordKind,
    pub address: u16,
    pub payload: Vec<u8>,
    pub checksum: u8,
}

/// Two's complement of the byte sum of `bytes`.
pub fn checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    (sum ^ 0xFF).wrapping_add(1)
}

impl Record {
    /// Builds a record and computes its checksum. Payloads longer than the
    /// one-byte length field are rejected.
    pub fn new(kind: RecordKind, address: u16, payload: &[u8]) -> Result<Self, ComposeError> {
        if payload.len() > u8::MAX as usize {
            return Err(ComposeError::InvalidRecordLength(payload.len()));
        }
        let mut record = Self {
            kind,
            address,
            payload: payload.to_vec(),
            checksum: 0,
        };
        record.checksum = checksum(&record.body());
        Ok(record)
    }

    pub fn length(&self) -> u8 {
        self.payload.len() as u8
    }

    /// Length, address, type and payload bytes (everything the checksum covers).
    fn body(&self) -> Vec<u8> {
        let addr = self.address.to_be_bytes();
        let mut body = Vec::with_capacity(4 + self.payload.len());
        body.push(self.length());
        body.extend_from_slice(&addr);
        body.push(self.kind.code());
        body.extend_from_slice(&self.payload);
        body
    }

    /// Decodes one trimmed, non-empty line.
    pub fn decode(line: &str, start_code: char, line_num: usize) -> Result<Self, ParseError> {
        let Some(hex_str) = line.strip_prefix(start_code) else {
            return Err(ParseError::corrupt(
                line_num,
                format!("line does not start with '{start_code}'"),
            ));
        };

        if hex_str.len() < MIN_BODY_DIGITS {
            return Err(ParseError::TruncatedLine {
                line: line_num,
                needed: MIN_BODY_DIGITS + start_code.len_utf8(),
                found: line.len(),
            });
        }

        let bytes = parse_hex_bytes(hex_str, line_num)?;
        let byte_count = bytes[0] as usize;
        if bytes.len() != 5 + byte_count {
            return Err(ParseError::corrupt(
                line_num,
                format!(
                    "byte count mismatch: header says {}, got {}",
                    byte_count,
                    bytes.len() - 5
                ),
            ));
        }

        let sum = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        if sum != 0 {
            let expected = checksum(&bytes[..bytes.len() - 1]);
            return Err(ParseError::corrupt(
                line_num,
                format!(
                    "checksum mismatch: expected {:02X}, got {:02X}",
                    expected,
                    bytes[bytes.len() - 1]
                ),
            ));
        }

        let record_type = bytes[3];
        let kind = RecordKind::from_code(record_type).ok_or(ParseError::UnknownRecordType {
            line: line_num,
            record_type,
        })?;

        if let Some(required) = kind.required_length()
            && byte_count != required
        {
            return Err(ParseError::corrupt(
                line_num,
                format!("{kind:?} record must carry {required} bytes, got {byte_count}"),
            ));
        }

        Ok(Self {
            kind,
            address: u16::from_be_bytes([bytes[1], bytes[2]]),
            payload: bytes[4..4 + byte_count].to_vec(),
            checksum: bytes[4 + byte_count],
        })
    }

    /// Renders the record without a line terminator.
    pub fn encode(&self, start_code: char) -> String {
        let body = self.body();
        let mut out = String::with_capacity(1 + 2 * (body.len() + 1));
        out.push(start_code);
        push_hex_bytes(&mut out, &body);
        push_hex_byte(&mut out, self.checksum);
        out
    }

    /// Payload as a big-endian integer (address-register and start records).
    pub fn payload_value(&self) -> u32 {
        self.payload
            .iter()
            .take(4)
            .fold(0u32, |acc, &b| (acc << 8) | b as u32)
    }
}
