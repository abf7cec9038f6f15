use super::*;

#[test]
fn test_output_format_flags() {
    let mut args = Args::default();
    parse_option(&mut args, "xa").unwrap();
    assert_eq!(args.output_format, Some(FormatKind::SmartCard));
}

#[test]
fn test_duplicate_output_format() {
    let mut args = Args::default();
    parse_option(&mut args, "XI").unwrap();
    assert!(matches!(
        parse_option(&mut args, "X:srec"),
        Err(ParseArgError::DuplicateOutputFormat)
    ));
}

#[test]
fn test_value_options() {
    let mut args = Args::default();
    parse_option(&mut args, "IF:apdu").unwrap();
    parse_option(&mut args, "LT=crlf").unwrap();
    parse_option(&mut args, "BL:0x10").unwrap();
    parse_option(&mut args, "E:'err.log'").unwrap();
    assert_eq!(args.input_format, Some(FormatKind::SmartCard));
    assert_eq!(args.line_termination.as_deref(), Some("\r\n"));
    assert_eq!(args.bytes_per_record, Some(16));
    assert_eq!(args.error_log, Some(PathBuf::from("err.log")));
}

#[test]
fn test_unknown_option() {
    let mut args = Args::default();
    assert!(matches!(
        parse_option(&mut args, "ZZ:1"),
        Err(ParseArgError::InvalidOption(_))
    ));
    assert!(matches!(
        parse_option(&mut args, "IF:"),
        Err(ParseArgError::MissingValue(_))
    ));
    assert!(matches!(
        parse_option(&mut args, "IF:elf"),
        Err(ParseArgError::InvalidFormat(_))
    ));
}
