pub mod accumulator;
pub mod error;
pub mod file;
pub mod format;
pub mod io;
pub mod segment;
pub mod splitter;

pub use accumulator::{AccumulationContext, Accumulator};
pub use error::Error;
pub use file::{InputFile, convert_file, merge_files, parse_file, read_document, write_lines};
pub use format::{
    Codec, Document, Format, FormatKind, FormatOptions, Input, IntelHex, MotorolaSRecord,
    SmartCard, UnknownFormat, merge,
};
pub use io::{
    Command, ComposeError, Instruction, IntelHexCodec, ParseError, Record, RecordKind,
    SRecordCodec, SmartCardCodec, checksum,
};
pub use segment::Segment;
pub use splitter::{Splitter, Step};
