//! Smart-card programmer script: one APDU per line, `CLA INS P1 P2 LC [DATA]`.
//!
//! `//` starts a comment. Lines starting with `.` are programmer directives
//! (`.reset`, `.end`) and carry no image data.

use tracing::trace;

use super::{ComposeError, ParseError, numbered_lines, parse_hex_bytes, push_hex_bytes};
use crate::accumulator::Accumulator;
use crate::format::{Codec, FormatKind};
use crate::splitter::{Splitter, Step};
use crate::Segment;

const CLASS: u8 = 0x00;
const COMMENT: &str = "//";
const DIRECTIVE: char = '.';
/// Hex characters of the `CLA INS P1 P2 LC` header.
const HEADER_DIGITS: usize = 10;
const MAX_ERASE_LENGTH: usize = 0xFFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    SetHighAddress,
    Erase,
    Write,
    SetStartAddress,
}

impl Instruction {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::SetHighAddress),
            0x02 => Some(Self::Erase),
            0x03 => Some(Self::Write),
            0x04 => Some(Self::SetStartAddress),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::SetHighAddress => 0x01,
            Self::Erase => 0x02,
            Self::Write => 0x03,
            Self::SetStartAddress => 0x04,
        }
    }

    fn required_length(self) -> Option<usize> {
        match self {
            Self::SetHighAddress | Self::Erase => Some(2),
            Self::SetStartAddress => Some(4),
            Self::Write => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub instruction: Instruction,
    pub p1: u8,
    pub p2: u8,
    pub data: Vec<u8>,
}

impl Command {
    pub fn new(instruction: Instruction, p1p2: u16, data: &[u8]) -> Self {
        let [p1, p2] = p1p2.to_be_bytes();
        Self {
            instruction,
            p1,
            p2,
            data: data.to_vec(),
        }
    }

    /// `P1‖P2` as one 16-bit value.
    pub fn p1p2(&self) -> u16 {
        u16::from_be_bytes([self.p1, self.p2])
    }

    pub fn data_value(&self) -> u32 {
        self.data
            .iter()
            .take(4)
            .fold(0u32, |acc, &b| (acc << 8) | b as u32)
    }

    /// Decodes a line with comments already stripped. Whitespace between
    /// hex digits is insignificant.
    pub fn decode(line: &str, line_num: usize) -> Result<Self, ParseError> {
        let compact: String = line.split_whitespace().collect();
        if compact.len() < HEADER_DIGITS {
            return Err(ParseError::TruncatedLine {
                line: line_num,
                needed: HEADER_DIGITS,
                found: compact.len(),
            });
        }

        let bytes = parse_hex_bytes(&compact, line_num)?;
        if bytes[0] != CLASS {
            return Err(ParseError::InvalidClass {
                line: line_num,
                class: bytes[0],
            });
        }

        let instruction = Instruction::from_code(bytes[1]).ok_or(ParseError::UnknownRecordType {
            line: line_num,
            record_type: bytes[1],
        })?;

        let lc = bytes[4] as usize;
        let data = &bytes[5..];
        if data.len() != lc {
            return Err(ParseError::corrupt(
                line_num,
                format!("expected {lc:#04X} bytes of data, got {}", data.len()),
            ));
        }
        if let Some(required) = instruction.required_length()
            && lc != required
        {
            return Err(ParseError::corrupt(
                line_num,
                format!("{instruction:?} command must carry {required} bytes, got {lc}"),
            ));
        }

        Ok(Self {
            instruction,
            p1: bytes[2],
            p2: bytes[3],
            data: data.to_vec(),
        })
    }

    /// Renders `CLA INS P1P2 LC DATA` without a line terminator.
    pub fn encode(&self) -> String {
        let mut out = format!(
            "{:02X} {:02X} {:04X} {:02X}",
            CLASS,
            self.instruction.code(),
            self.p1p2(),
            self.data.len()
        );
        if !self.data.is_empty() {
            out.push(' ');
            push_hex_bytes(&mut out, &self.data);
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SmartCardCodec;

impl SmartCardCodec {
    fn push_commented(
        out: &mut Vec<String>,
        comment: &str,
        command: &Command,
        line_termination: &str,
    ) {
        out.push(line_termination.to_string());
        out.push(format!("{COMMENT} {comment}{line_termination}"));
        out.push(format!("{}{line_termination}", command.encode()));
    }
}

impl Codec for SmartCardCodec {
    const KIND: FormatKind = FormatKind::SmartCard;
    const MAX_DATA_LENGTH: usize = 16;

    fn decode(&self, text: &str, line_termination: &str) -> Result<Vec<Segment>, ParseError> {
        let mut acc = Accumulator::new();
        let mut last_line = 0;

        for (line_num, raw) in numbered_lines(text, line_termination) {
            last_line = line_num;
            let line = match raw.find(COMMENT) {
                Some(idx) => raw[..idx].trim(),
                None => raw,
            };
            if line.is_empty() || line.starts_with(DIRECTIVE) {
                continue;
            }

            let command = Command::decode(line, line_num)?;
            trace!(
                line = line_num,
                instruction = ?command.instruction,
                p1p2 = command.p1p2(),
                len = command.data.len(),
                "command decoded"
            );

            match command.instruction {
                Instruction::SetHighAddress => {
                    acc.set_segment_base(command.data_value() << 16, line_num)?;
                }
                Instruction::Erase => {}
                Instruction::Write => {
                    acc.write(command.p1p2() as u32, &command.data, line_num)?;
                }
                Instruction::SetStartAddress => {
                    acc.set_start_address(command.data_value(), line_num)?;
                }
            }
        }

        acc.finish(last_line)
    }

    fn preamble(&self, line_termination: &str) -> Vec<String> {
        vec![format!(".reset{line_termination}")]
    }

    fn compose_segment(
        &self,
        segment: &Segment,
        splitter: &Splitter,
        line_termination: &str,
        out: &mut Vec<String>,
    ) -> Result<(), ComposeError> {
        for step in splitter.split(segment)? {
            match step {
                Step::StartAddress(address) => {
                    let command =
                        Command::new(Instruction::SetStartAddress, 0, &address.to_be_bytes());
                    Self::push_commented(out, "Set start address", &command, line_termination);
                }
                Step::Bank {
                    high,
                    offset,
                    length,
                } => {
                    let command =
                        Command::new(Instruction::SetHighAddress, 0, &high.to_be_bytes());
                    Self::push_commented(
                        out,
                        "Set segment high address",
                        &command,
                        line_termination,
                    );

                    // a full 64 KiB bank needs two erase commands
                    let mut erase_offset = offset as usize;
                    let mut remaining = length;
                    while remaining > 0 {
                        let chunk = remaining.min(MAX_ERASE_LENGTH);
                        let command = Command::new(
                            Instruction::Erase,
                            erase_offset as u16,
                            &(chunk as u16).to_be_bytes(),
                        );
                        Self::push_commented(out, "Erase segment", &command, line_termination);
                        erase_offset += chunk;
                        remaining -= chunk;
                    }

                    out.push(line_termination.to_string());
                    out.push(format!("{COMMENT} Write segment{line_termination}"));
                }
                Step::Data { offset, data } => {
                    let command = Command::new(Instruction::Write, offset, data);
                    out.push(format!("{}{line_termination}", command.encode()));
                }
            }
        }
        Ok(())
    }

    fn trailer(&self, line_termination: &str) -> Vec<String> {
        vec![
            format!(".reset{line_termination}"),
            format!(".end{line_termination}"),
        ]
    }
}
