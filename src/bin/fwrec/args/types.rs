use std::path::PathBuf;

use fwrec::FormatKind;

use super::parse::parse_option;

#[derive(Debug, Default)]
pub struct Args {
    // Inputs (positional)
    pub input_files: Vec<PathBuf>,
    // Input format override: /IF:fmt
    pub input_format: Option<FormatKind>,

    // Output (special: uses space separator)
    pub output_file: Option<PathBuf>,
    // Output format: /XI, /XS, /XA or /X:fmt
    pub output_format: Option<FormatKind>,

    // INI file: /P:file
    pub ini_file: Option<PathBuf>,

    // Error log: /E=file
    pub error_log: Option<PathBuf>,

    // Silent mode: /S
    pub silent: bool,

    // Line termination: /LT:lf|crlf|cr
    pub line_termination: Option<String>,
    // Data bytes per record: /BL:n
    pub bytes_per_record: Option<usize>,
}

#[derive(Debug)]
pub enum ParseArgError {
    MissingInputFile,
    InvalidOption(String),
    InvalidNumber(String),
    InvalidFormat(String),
    InvalidLineTermination(String),
    DuplicateOutputFormat,
    MissingValue(String),
}

impl std::fmt::Display for ParseArgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingInputFile => write!(f, "missing input file"),
            Self::InvalidOption(s) => write!(f, "invalid option: {s}"),
            Self::InvalidNumber(s) => write!(f, "invalid number: {s}"),
            Self::InvalidFormat(s) => write!(f, "invalid format: {s}"),
            Self::InvalidLineTermination(s) => write!(f, "invalid line termination: {s}"),
            Self::DuplicateOutputFormat => write!(f, "multiple output formats specified"),
            Self::MissingValue(s) => write!(f, "missing value for {s}"),
        }
    }
}

impl std::error::Error for ParseArgError {}

impl Args {
    pub fn parse() -> Result<Self, ParseArgError> {
        Self::parse_from(std::env::args().skip(1).collect())
    }

    pub fn parse_from(args: Vec<String>) -> Result<Self, ParseArgError> {
        let mut result = Args::default();

        let mut args_iter = args.iter();
        let mut force_positional = false;

        while let Some(arg) = args_iter.next() {
            if arg == "--" {
                force_positional = true;
                continue;
            }

            if force_positional {
                result.input_files.push(PathBuf::from(arg));
                continue;
            }

            if arg.eq_ignore_ascii_case("-o") {
                let next = args_iter
                    .next()
                    .ok_or(ParseArgError::MissingValue("-o".into()))?;
                result.output_file = Some(PathBuf::from(next));
                continue;
            }

            if let Some(opt) = arg.strip_prefix('/').or_else(|| arg.strip_prefix('-')) {
                match parse_option(&mut result, opt) {
                    Ok(()) => {}
                    // absolute unix paths look like options
                    Err(ParseArgError::InvalidOption(_))
                        if arg.starts_with('/') && std::path::Path::new(arg).exists() =>
                    {
                        result.input_files.push(PathBuf::from(arg));
                    }
                    Err(e) => return Err(e),
                }
            } else {
                result.input_files.push(PathBuf::from(arg));
            }
        }

        if result.input_files.is_empty() {
            return Err(ParseArgError::MissingInputFile);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::Args;
    use super::ParseArgError;
    use std::path::PathBuf;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_double_dash_forces_positional() {
        let parsed = Args::parse_from(args(&["--", "/XI", "b.hex"])).unwrap();
        assert_eq!(
            parsed.input_files,
            vec![PathBuf::from("/XI"), PathBuf::from("b.hex")]
        );
        assert_eq!(parsed.output_format, None);
    }

    #[test]
    fn test_parse_absolute_path_existing_file() {
        let path = std::env::temp_dir().join("fwrec_parse_input_test.hex");
        std::fs::write(&path, ":00000001FF").unwrap();
        let parsed = Args::parse_from(vec![path.to_string_lossy().to_string()]).unwrap();
        assert_eq!(parsed.input_files, vec![path.clone()]);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_parse_multiple_inputs_and_output() {
        let parsed = Args::parse_from(args(&["a.hex", "b.txt", "-o", "out.s", "/XS"])).unwrap();
        assert_eq!(parsed.input_files.len(), 2);
        assert_eq!(parsed.output_file, Some(PathBuf::from("out.s")));
        assert_eq!(parsed.output_format, Some(fwrec::FormatKind::MotorolaSRecord));
    }

    #[test]
    fn test_missing_input() {
        assert!(matches!(
            Args::parse_from(args(&["/XI"])),
            Err(ParseArgError::MissingInputFile)
        ));
    }

    #[test]
    fn test_missing_output_value() {
        assert!(matches!(
            Args::parse_from(args(&["a.hex", "-o"])),
            Err(ParseArgError::MissingValue(_))
        ));
    }
}
