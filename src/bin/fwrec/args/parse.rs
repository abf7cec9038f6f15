use std::path::PathBuf;

use fwrec::FormatKind;

use super::parse_util::{
    parse_format, parse_line_termination, parse_number, split_option, strip_quotes,
};
use super::types::{Args, ParseArgError};

type ValueParser = fn(&mut Args, &str, &str) -> Result<bool, ParseArgError>;

fn set_output_format(args: &mut Args, format: FormatKind) -> Result<(), ParseArgError> {
    if args.output_format.is_some() {
        return Err(ParseArgError::DuplicateOutputFormat);
    }
    args.output_format = Some(format);
    Ok(())
}

fn parse_simple_flag(args: &mut Args, opt_upper: &str) -> Result<bool, ParseArgError> {
    match opt_upper {
        "S" => {
            args.silent = true;
            Ok(true)
        }
        "XI" => {
            set_output_format(args, FormatKind::IntelHex)?;
            Ok(true)
        }
        "XS" => {
            set_output_format(args, FormatKind::MotorolaSRecord)?;
            Ok(true)
        }
        "XA" => {
            set_output_format(args, FormatKind::SmartCard)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn parse_format_option(
    args: &mut Args,
    key_upper: &str,
    value: &str,
) -> Result<bool, ParseArgError> {
    match key_upper {
        "IF" => {
            args.input_format = Some(parse_format(value)?);
            Ok(true)
        }
        "X" => {
            set_output_format(args, parse_format(value)?)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn parse_path_option(args: &mut Args, key_upper: &str, value: &str) -> Result<bool, ParseArgError> {
    match key_upper {
        "E" => {
            args.error_log = Some(PathBuf::from(strip_quotes(value)));
            Ok(true)
        }
        "P" => {
            args.ini_file = Some(PathBuf::from(strip_quotes(value)));
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn parse_layout_option(
    args: &mut Args,
    key_upper: &str,
    value: &str,
) -> Result<bool, ParseArgError> {
    match key_upper {
        "LT" => {
            args.line_termination = Some(parse_line_termination(value)?);
            Ok(true)
        }
        "BL" => {
            args.bytes_per_record = Some(parse_number(value)?);
            Ok(true)
        }
        _ => Ok(false),
    }
}

pub(super) fn parse_option(args: &mut Args, opt: &str) -> Result<(), ParseArgError> {
    let opt_upper = opt.to_ascii_uppercase();

    if parse_simple_flag(args, &opt_upper)? {
        return Ok(());
    }

    let Some((key, value)) = split_option(opt) else {
        return Err(ParseArgError::InvalidOption(opt.to_string()));
    };
    if value.is_empty() {
        return Err(ParseArgError::MissingValue(key.to_string()));
    }

    let key_upper = key.to_ascii_uppercase();
    let parsers: &[ValueParser] = &[parse_format_option, parse_path_option, parse_layout_option];
    for parser in parsers {
        if parser(args, &key_upper, value)? {
            return Ok(());
        }
    }
    Err(ParseArgError::InvalidOption(opt.to_string()))
}

#[cfg(test)]
mod tests;
