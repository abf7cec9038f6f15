//! Reading and writing documents on disk.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::format::{FormatKind, FormatOptions, Input};
use crate::{Error, Segment};

/// A file to read, with its format if known. Unknown formats are detected
/// from the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub kind: Option<FormatKind>,
}

impl InputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: None,
        }
    }

    pub fn with_kind(path: impl Into<PathBuf>, kind: FormatKind) -> Self {
        Self {
            path: path.into(),
            kind: Some(kind),
        }
    }
}

pub fn read_document(path: &Path) -> Result<String, Error> {
    Ok(std::fs::read_to_string(path)?)
}

/// Writes `lines` verbatim; they already carry their terminators.
pub fn write_lines(path: &Path, lines: &[String]) -> Result<(), Error> {
    std::fs::write(path, lines.concat())?;
    info!(path = %path.display(), lines = lines.len(), "output written");
    Ok(())
}

pub fn parse_file(input: &InputFile, options: FormatOptions) -> Result<Vec<Segment>, Error> {
    let text = read_document(&input.path)?;
    let kind = input.kind.unwrap_or_else(|| FormatKind::detect(&text));
    info!(path = %input.path.display(), format = %kind, "parsing");

    let mut doc = kind.create(options);
    Ok(doc.parse(&text)?.to_vec())
}

/// Merges every input into one `output_kind` document. The lines are written
/// to `output_path` when given and returned either way.
pub fn merge_files(
    output_kind: FormatKind,
    output_path: Option<&Path>,
    inputs: &[InputFile],
    options: FormatOptions,
) -> Result<Vec<String>, Error> {
    let texts = inputs
        .iter()
        .map(|input| read_document(&input.path))
        .collect::<Result<Vec<_>, _>>()?;

    let documents: Vec<Input<'_>> = inputs
        .iter()
        .zip(&texts)
        .map(|(input, text)| match input.kind {
            Some(kind) => Input::new(kind, text),
            None => Input::detect(text),
        })
        .collect();
    for (input, doc) in inputs.iter().zip(&documents) {
        info!(path = %input.path.display(), format = %doc.kind, "merging input");
    }

    let mut output = output_kind.create(options);
    let lines = output.merge(&documents)?.to_vec();

    if let Some(path) = output_path {
        write_lines(path, &lines)?;
    }
    Ok(lines)
}

pub fn convert_file(
    input: &InputFile,
    output_kind: FormatKind,
    output_path: Option<&Path>,
    options: FormatOptions,
) -> Result<Vec<String>, Error> {
    merge_files(output_kind, output_path, std::slice::from_ref(input), options)
}
