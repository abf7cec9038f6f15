//! Document-level `parse` / `compose` / `merge` over a record codec.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::io::{ComposeError, IntelHexCodec, ParseError, SRecordCodec, SmartCardCodec};
use crate::splitter::Splitter;
use crate::{Error, Segment};

/// Per-format line codec. Implementations hold no state between calls.
pub trait Codec: Default + Send {
    const KIND: FormatKind;
    /// Default number of data bytes per composed record.
    const MAX_DATA_LENGTH: usize;

    fn decode(&self, text: &str, line_termination: &str) -> Result<Vec<Segment>, ParseError>;

    /// Lines emitted before the first segment.
    fn preamble(&self, _line_termination: &str) -> Vec<String> {
        Vec::new()
    }

    fn compose_segment(
        &self,
        segment: &Segment,
        splitter: &Splitter,
        line_termination: &str,
        out: &mut Vec<String>,
    ) -> Result<(), ComposeError>;

    /// Lines closing the document. Dropped and re-emitted when segments are
    /// appended to an already composed document.
    fn trailer(&self, line_termination: &str) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    IntelHex,
    MotorolaSRecord,
    SmartCard,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown format: {0}")]
pub struct UnknownFormat(pub String);

impl FormatKind {
    /// Guesses the format from the first non-blank line.
    pub fn detect(text: &str) -> Self {
        let first = text
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or_default();
        match first.chars().next() {
            Some(':') => Self::IntelHex,
            Some('S') => Self::MotorolaSRecord,
            _ => Self::SmartCard,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::IntelHex => "ihex",
            Self::MotorolaSRecord => "srec",
            Self::SmartCard => "apdu",
        }
    }

    pub fn max_data_length(self) -> usize {
        match self {
            Self::IntelHex => IntelHexCodec::MAX_DATA_LENGTH,
            Self::MotorolaSRecord => SRecordCodec::MAX_DATA_LENGTH,
            Self::SmartCard => SmartCardCodec::MAX_DATA_LENGTH,
        }
    }

    /// Fresh, empty document of this format.
    pub fn create(self, options: FormatOptions) -> Box<dyn Format> {
        match self {
            Self::IntelHex => Box::new(IntelHex::with_options(options)),
            Self::MotorolaSRecord => Box::new(MotorolaSRecord::with_options(options)),
            Self::SmartCard => Box::new(SmartCard::with_options(options)),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormatKind {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ihex" | "hex" | "intel" | "intelhex" | "i" => Ok(Self::IntelHex),
            "srec" | "s19" | "mot" | "motorola" | "s" => Ok(Self::MotorolaSRecord),
            "apdu" | "smartcard" | "script" | "a" => Ok(Self::SmartCard),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    pub line_termination: String,
    /// Data bytes per composed record; `None` uses the format default.
    pub bytes_per_record: Option<usize>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            line_termination: "\n".to_string(),
            bytes_per_record: None,
        }
    }
}

/// One document to merge: its text, the format it is written in and the
/// terminator its lines are split on (`"\n"` unless set).
#[derive(Debug, Clone, Copy)]
pub struct Input<'a> {
    pub kind: FormatKind,
    pub text: &'a str,
    pub line_termination: &'a str,
}

impl<'a> Input<'a> {
    pub fn new(kind: FormatKind, text: &'a str) -> Self {
        Self {
            kind,
            text,
            line_termination: "\n",
        }
    }

    pub fn detect(text: &'a str) -> Self {
        Self::new(FormatKind::detect(text), text)
    }

    pub fn with_line_termination(self, line_termination: &'a str) -> Self {
        Self {
            line_termination,
            ..self
        }
    }

    fn parse_options(&self, output: &FormatOptions) -> FormatOptions {
        FormatOptions {
            line_termination: self.line_termination.to_string(),
            ..output.clone()
        }
    }
}

pub trait Format: Send {
    fn kind(&self) -> FormatKind;

    fn options(&self) -> &FormatOptions;

    /// Segments held by this document (parsed, passed in, or composed).
    fn segments(&self) -> &[Segment];

    /// Parses `text`. Only the first call reads its input; later calls
    /// return the cached segments.
    fn parse(&mut self, text: &str) -> Result<&[Segment], ParseError>;

    /// Composes the held segments plus `segments`, which are appended to the
    /// document. Returns every line with its terminator, except a closing
    /// end-of-file record which is left unterminated.
    fn compose(&mut self, segments: Option<Vec<Segment>>) -> Result<&[String], ComposeError>;

    /// Parses every input with a fresh document of its own format and
    /// composes the concatenated segments into this one. Inputs are split on
    /// their own terminator; `options().line_termination` only shapes output.
    fn merge(&mut self, inputs: &[Input<'_>]) -> Result<&[String], Error> {
        let mut collected = Vec::new();
        for input in inputs {
            let mut doc = input.kind.create(input.parse_options(self.options()));
            collected.extend_from_slice(doc.parse(input.text)?);
        }
        debug!(
            inputs = inputs.len(),
            segments = collected.len(),
            output = %self.kind(),
            "merging"
        );
        Ok(self.compose(Some(collected))?)
    }

    /// Composed output as one string.
    fn text(&mut self) -> Result<String, ComposeError> {
        Ok(self.compose(None)?.concat())
    }
}

/// A document in the format described by `C`.
#[derive(Debug, Default)]
pub struct Document<C: Codec> {
    codec: C,
    options: FormatOptions,
    segments: Vec<Segment>,
    parsed: bool,
    lines: Option<Vec<String>>,
}

pub type IntelHex = Document<IntelHexCodec>;
pub type MotorolaSRecord = Document<SRecordCodec>;
pub type SmartCard = Document<SmartCardCodec>;

impl<C: Codec> Document<C> {
    pub fn new() -> Self {
        Self::with_options(FormatOptions::default())
    }

    pub fn with_options(options: FormatOptions) -> Self {
        Self {
            codec: C::default(),
            options,
            segments: Vec::new(),
            parsed: false,
            lines: None,
        }
    }

    pub fn with_segments(segments: Vec<Segment>, options: FormatOptions) -> Self {
        Self {
            segments,
            ..Self::with_options(options)
        }
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    fn splitter(&self) -> Result<Splitter, ComposeError> {
        Splitter::new(self.options.bytes_per_record.unwrap_or(C::MAX_DATA_LENGTH))
    }

    fn compose_all(&self, segments: &[Segment], out: &mut Vec<String>) -> Result<(), ComposeError> {
        let splitter = self.splitter()?;
        for segment in segments {
            self.codec
                .compose_segment(segment, &splitter, &self.options.line_termination, out)?;
        }
        Ok(())
    }
}

impl<C: Codec> Format for Document<C> {
    fn kind(&self) -> FormatKind {
        C::KIND
    }

    fn options(&self) -> &FormatOptions {
        &self.options
    }

    fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn parse(&mut self, text: &str) -> Result<&[Segment], ParseError> {
        if !self.parsed {
            let parsed = self.codec.decode(text, &self.options.line_termination)?;
            debug!(format = %C::KIND, segments = parsed.len(), "document parsed");
            self.segments.extend(parsed);
            self.parsed = true;
            self.lines = None;
        }
        Ok(&self.segments)
    }

    fn compose(&mut self, segments: Option<Vec<Segment>>) -> Result<&[String], ComposeError> {
        let lt = &self.options.line_termination;
        let trailer = self.codec.trailer(lt);

        let mut lines = match self.lines.take() {
            Some(lines) => lines,
            None => {
                let mut lines = self.codec.preamble(lt);
                self.compose_all(&self.segments, &mut lines)?;
                lines.extend(trailer.iter().cloned());
                lines
            }
        };

        if let Some(new) = segments.filter(|s| !s.is_empty()) {
            let mut appended = Vec::new();
            if let Err(e) = self.compose_all(&new, &mut appended) {
                self.lines = Some(lines);
                return Err(e);
            }
            lines.truncate(lines.len() - trailer.len());
            lines.extend(appended);
            lines.extend(trailer);
            self.segments.extend(new);
        }

        debug!(format = %C::KIND, lines = lines.len(), "document composed");
        Ok(self.lines.insert(lines).as_slice())
    }
}

/// Parses each input and composes all segments into a new `output` document.
pub fn merge(
    output: FormatKind,
    inputs: &[Input<'_>],
    options: FormatOptions,
) -> Result<Vec<String>, Error> {
    let mut doc = output.create(options);
    Ok(doc.merge(inputs)?.to_vec())
}
