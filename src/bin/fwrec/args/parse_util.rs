use fwrec::FormatKind;

use super::types::ParseArgError;

pub(super) fn split_option(opt: &str) -> Option<(&str, &str)> {
    if let Some(pos) = opt.find(':') {
        Some((&opt[..pos], &opt[pos + 1..]))
    } else if let Some(pos) = opt.find('=') {
        Some((&opt[..pos], &opt[pos + 1..]))
    } else {
        None
    }
}

pub(super) fn strip_quotes(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '\'')
}

/// Decimal, or hex with a `0x` prefix or `h` suffix.
pub(super) fn parse_number(s: &str) -> Result<usize, ParseArgError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ParseArgError::InvalidNumber("empty".to_string()));
    }

    let (radix, digits) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (16, hex)
    } else if let Some(hex) = s.strip_suffix('h').or_else(|| s.strip_suffix('H')) {
        (16, hex)
    } else {
        (10, s)
    };

    usize::from_str_radix(digits, radix).map_err(|e| ParseArgError::InvalidNumber(format!("{s}: {e}")))
}

pub(super) fn parse_format(s: &str) -> Result<FormatKind, ParseArgError> {
    strip_quotes(s)
        .parse()
        .map_err(|_| ParseArgError::InvalidFormat(s.to_string()))
}

pub(super) fn parse_line_termination(s: &str) -> Result<String, ParseArgError> {
    match strip_quotes(s).to_ascii_lowercase().as_str() {
        "lf" | "\\n" | "unix" => Ok("\n".to_string()),
        "crlf" | "\\r\\n" | "dos" | "windows" => Ok("\r\n".to_string()),
        "cr" | "\\r" => Ok("\r".to_string()),
        _ => Err(ParseArgError::InvalidLineTermination(s.to_string())),
    }
}
