use tracing::trace;

use super::record::{Record, RecordKind};
use super::{ComposeError, ParseError, numbered_lines};
use crate::accumulator::Accumulator;
use crate::format::{Codec, FormatKind};
use crate::splitter::{Splitter, Step};
use crate::Segment;

const START_CODE: char = ':';
/// Zero-length type 01 record at address 0, checksum included.
const END_OF_FILE_BODY: &str = "00000001FF";

/// Intel HEX (`:LLAAAATT…CC`).
#[derive(Debug, Clone, Copy, Default)]
pub struct IntelHexCodec;

impl Codec for IntelHexCodec {
    const KIND: FormatKind = FormatKind::IntelHex;
    const MAX_DATA_LENGTH: usize = 32;

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

/// Parses a document of fixed-width records introduced by `start_code`.
///
/// Blank lines are skipped. Everything after the end-of-file record is ignored.
pub(crate) fn parse_records(
    text: &str,
    line_termination: &str,
    start_code: char,
) -> Result<Vec<Segment>, ParseError> {
    let mut acc = Accumulator::new();

    for (line_num, line) in numbered_lines(text, line_termination) {
        if line.is_empty() {
            continue;
        }

        let record = Record::decode(line, start_code, line_num)?;
        trace!(
            line = line_num,
            kind = ?record.kind,
            address = record.address,
            len = record.payload.len(),
            "record decoded"
        );

        match record.kind {
            RecordKind::Data => {
                acc.write(record.address as u32, &record.payload, line_num)?;
            }
            RecordKind::EndOfFile => {
                return acc.finish(line_num);
            }
            RecordKind::ExtendedSegmentAddress => {
                acc.set_segment_base(record.payload_value() << 8, line_num)?;
            }
            RecordKind::ExtendedLinearAddress => {
                acc.set_segment_base(record.payload_value() << 16, line_num)?;
            }
            RecordKind::StartSegmentAddress | RecordKind::StartLinearAddress => {
                acc.set_start_address(record.payload_value(), line_num)?;
            }
        }
    }

    Err(ParseError::MissingEndOfFile)
}

pub(crate) fn compose_records(
    segment: &Segment,
    splitter: &Splitter,
    line_termination: &str,
    start_code: char,
    out: &mut Vec<String>,
) -> Result<(), ComposeError> {
    for step in splitter.split(segment)? {
        let record = match step {
            Step::StartAddress(address) => {
                Record::new(RecordKind::StartLinearAddress, 0, &address.to_be_bytes())?
            }
            Step::Bank { high, .. } => {
                Record::new(RecordKind::ExtendedLinearAddress, 0, &high.to_be_bytes())?
            }
            Step::Data { offset, data } => Record::new(RecordKind::Data, offset, data)?,
        };
        let mut line = record.encode(start_code);
        line.push_str(line_termination);
        out.push(line);
    }
    Ok(())
}

/// The end-of-file record. It is the last line of a document and carries no
/// terminator.
pub(crate) fn end_of_file_line(start_code: char) -> String {
    format!("{start_code}{END_OF_FILE_BODY}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compose(segments: &[Segment]) -> Vec<String> {
        let codec = IntelHexCodec;
        let splitter = Splitter::new(IntelHexCodec::MAX_DATA_LENGTH).unwrap();
        let mut lines = Vec::new();
        for seg in segments {
            codec.compose_segment(seg, &splitter, "\n", &mut lines).unwrap();
        }
        lines.extend(codec.trailer("\n"));
        lines
    }

    #[test]
    fn test_parse_extended_linear() {
        let input = ":020000040400F6\n:040000000011223396\n:00000001FF";
        let segments = IntelHexCodec.decode(input, "\n").unwrap();
        assert_eq!(
            segments,
            vec![Segment::new(0x0400_0000, vec![0x00, 0x11, 0x22, 0x33])]
        );
    }

    #[test]
    fn test_compose_extended_linear() {
        let lines = compose(&[Segment::new(0x0400_0000, vec![0x00, 0x11, 0x22, 0x33])]);
        assert_eq!(
            lines,
            vec![
                ":020000040400F6\n".to_string(),
                ":040000000011223396\n".to_string(),
                ":00000001FF".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_simple() {
        let input = ":10010000214601360121470136007EFE09D2190140\n\
                     :100110002146017E17C20001FF5F16002148011928\n\
                     :00000001FF\n";
        let segments = IntelHexCodec.decode(input, "\n").unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].address, 0x0100);
        assert_eq!(segments[0].len(), 32);
    }

    #[test]
    fn test_parse_extended_segment_shifts_by_eight() {
        let input = ":020000021000EC\n\
                     :10000000FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF00\n\
                     :00000001FF\n";
        let segments = IntelHexCodec.decode(input, "\n").unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].address, 0x0010_0000);
    }

    #[test]
    fn test_start_address_records() {
        let input = ":0400000508000100EE\n:0400000508000100EE\n:00000001FF";
        let segments = IntelHexCodec.decode(input, "\n").unwrap();
        assert_eq!(segments, vec![Segment::start_marker(0x0800_0100)]);

        let input = ":0400000508000100EE\n:0400000308000200EF\n:00000001FF";
        assert!(matches!(
            IntelHexCodec.decode(input, "\n"),
            Err(ParseError::DuplicateStartAddress {
                line: 2,
                existing: 0x0800_0100,
                found: 0x0800_0200
            })
        ));
    }

    #[test]
    fn test_lines_after_eof_are_ignored() {
        let input = ":0100000055AA\n:00000001FF\ngarbage\n";
        let segments = IntelHexCodec.decode(input, "\n").unwrap();
        assert_eq!(segments, vec![Segment::new(0, vec![0x55])]);
    }

    #[test]
    fn test_missing_eof() {
        let input = ":10010000214601360121470136007EFE09D2190140\n";
        assert_eq!(
            IntelHexCodec.decode(input, "\n").unwrap_err(),
            ParseError::MissingEndOfFile
        );
    }

    #[test]
    fn test_malformed_line_fails_parse() {
        let input = ":0100000055AA\n:01000100\n:00000001FF";
        assert!(matches!(
            IntelHexCodec.decode(input, "\n"),
            Err(ParseError::TruncatedLine { line: 2, .. })
        ));

        let input = "0100000055AA\n:00000001FF";
        assert!(matches!(
            IntelHexCodec.decode(input, "\n"),
            Err(ParseError::CorruptRecord { line: 1, .. })
        ));
    }

    #[test]
    fn test_gap_is_rejected() {
        let input = ":0401000000010203F5\n:0402000000010203F4\n:00000001FF";
        assert!(matches!(
            IntelHexCodec.decode(input, "\n"),
            Err(ParseError::UnsupportedGap { line: 2, .. })
        ));
    }

    #[test]
    fn test_crlf_line_termination() {
        let input = ":020000040400F6\r\n:040000000011223396\r\n:00000001FF\r\n";
        let segments = IntelHexCodec.decode(input, "\r\n").unwrap();
        assert_eq!(segments[0].address, 0x0400_0000);
        // "\n" splitting leaves the '\r' to be trimmed
        assert_eq!(IntelHexCodec.decode(input, "\n").unwrap(), segments);
    }

    #[test]
    fn test_roundtrip_with_start_marker_position() {
        let segments = vec![
            Segment::new(0x0800_0000, (0..70).collect()),
            Segment::start_marker(0x0800_0004),
            Segment::new(0x2000_0000, vec![0xAA; 3]),
        ];
        let text = compose(&segments).concat();
        assert_eq!(IntelHexCodec.decode(&text, "\n").unwrap(), segments);
    }

    #[test]
    fn test_bank_crossing_parses_back_split() {
        let text = compose(&[Segment::new(0x0001_FFFE, vec![1, 2, 3, 4])]).concat();
        assert_eq!(
            IntelHexCodec.decode(&text, "\n").unwrap(),
            vec![
                Segment::new(0x0001_FFFE, vec![1, 2]),
                Segment::new(0x0002_0000, vec![3, 4]),
            ]
        );
    }
}
