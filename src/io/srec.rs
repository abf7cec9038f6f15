//! Motorola S-Record sibling format.
//!
//! Records use the Intel HEX layout and type codes behind an `S` start code,
//! with at most 16 data bytes per record.

use super::intel_hex::{compose_records, end_of_file_line, parse_records};
use super::{ComposeError, ParseError};
use crate::format::{Codec, FormatKind};
use crate::splitter::Splitter;
use crate::Segment;

const START_CODE: char = 'S';

#[derive(Debug, Clone, Copy, Default)]
pub struct SRecordCodec;

impl Codec for SRecordCodec {
    const KIND: FormatKind = FormatKind::MotorolaSRecord;
    const MAX_DATA_LENGTH: usize = 16;

    fn decode(&self, text: &str, line_termination: &str) -> Result<Vec<Segment>, ParseError> {
        parse_records(text, line_termination, START_CODE)
    }

    fn compose_segment(
        &self,
        segment: &Segment,
        splitter: &Splitter,
        line_termination: &str,
        out: &mut Vec<String>,
    ) -> Result<(), ComposeError> {
        compose_records(segment, splitter, line_termination, START_CODE, out)
    }

    fn trailer(&self, _line_termination: &str) -> Vec<String> {
        vec![end_of_file_line(START_CODE)]
    }
}
