mod error;
mod intel_hex;
mod record;
mod smart_card;
mod srec;

pub use error::{ComposeError, ParseError};
pub use intel_hex::IntelHexCodec;
pub use record::{Record, RecordKind, checksum};
pub use smart_card::{Command, Instruction, SmartCardCodec};
pub use srec::SRecordCodec;

const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

/// Splits `text` on `line_termination` and yields `(line_number, trimmed_line)`.
pub(crate) fn numbered_lines<'a>(
    text: &'a str,
    line_termination: &'a str,
) -> impl Iterator<Item = (usize, &'a str)> {
    let terminator = if line_termination.is_empty() {
        "\n"
    } else {
        line_termination
    };
    text.split(terminator)
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
}

pub(crate) fn push_hex_byte(output: &mut String, byte: u8) {
    output.push(HEX_CHARS[(byte >> 4) as usize] as char);
    output.push(HEX_CHARS[(byte & 0x0F) as usize] as char);
}

pub(crate) fn push_hex_bytes(output: &mut String, bytes: &[u8]) {
    for &b in bytes {
        push_hex_byte(output, b);
    }
}

pub(crate) fn parse_hex_bytes(hex_str: &str, line_num: usize) -> Result<Vec<u8>, ParseError> {
    let bytes = hex_str.as_bytes();
    if !bytes.len().is_multiple_of(2) {
        return Err(ParseError::corrupt(line_num, "odd number of hex digits"));
    }

    let mut out = Vec::with_capacity(bytes.len() / 2);
    for chunk in bytes.chunks_exact(2) {
        let high = hex_digit(chunk[0], line_num)?;
        let low = hex_digit(chunk[1], line_num)?;
        out.push((high << 4) | low);
    }

    Ok(out)
}

fn hex_digit(b: u8, line_num: usize) -> Result<u8, ParseError> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        _ => Err(ParseError::corrupt(
            line_num,
            format!("invalid hex digit {:?}", b as char),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_bytes() {
        assert_eq!(parse_hex_bytes("00aF10", 1).unwrap(), vec![0x00, 0xAF, 0x10]);
        assert!(matches!(
            parse_hex_bytes("0G", 3),
            Err(ParseError::CorruptRecord { line: 3, .. })
        ));
        assert!(matches!(
            parse_hex_bytes("ABC", 2),
            Err(ParseError::CorruptRecord { line: 2, .. })
        ));
    }

    #[test]
    fn test_numbered_lines_trims_crlf() {
        let lines: Vec<_> = numbered_lines(":00\r\n\n  x  ", "\n").collect();
        assert_eq!(lines, vec![(1, ":00"), (2, ""), (3, "x")]);
    }

    #[test]
    fn test_push_hex_bytes() {
        let mut s = String::new();
        push_hex_bytes(&mut s, &[0x0A, 0xFF]);
        assert_eq!(s, "0AFF");
    }
}
