//! Folds decoded record events into [`Segment`]s.
//!
//! Data writes are collected into a single contiguous run. A write may extend
//! the run at either end; anything else is rejected. The run is flushed into a
//! segment whenever the address register changes and when the document ends.

use tracing::{debug, trace};

use crate::Segment;
use crate::io::ParseError;

/// Mutable state of one parse call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccumulationContext {
    /// High-order address bits installed by the last address-register record.
    pub segment_base: u32,
    /// Offset (relative to `segment_base`) of the first byte of the run.
    pub run_start: u32,
    pub run_bytes_collected: usize,
    pub run_data: Vec<u8>,
    pub start_address: Option<u32>,
}

impl AccumulationContext {
    fn run_end(&self) -> u64 {
        self.run_start as u64 + self.run_bytes_collected as u64
    }

    fn clear_run(&mut self) {
        self.run_start = 0;
        self.run_bytes_collected = 0;
        self.run_data.clear();
    }
}

#[derive(Debug, Default)]
pub struct Accumulator {
    context: AccumulationContext,
    segments: Vec<Segment>,
    // Entry point seen while a run was open; emitted right after that run.
    pending_start: Option<u32>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.context = AccumulationContext::default();
        self.segments.clear();
        self.pending_start = None;
    }

    pub fn context(&self) -> &AccumulationContext {
        &self.context
    }

    /// Segments flushed so far.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Flushes the open run and installs a new high-order address base.
    pub fn set_segment_base(&mut self, base: u32, line: usize) -> Result<(), ParseError> {
        self.flush(line)?;
        debug!(line, base = format_args!("{base:#010X}"), "address register updated");
        self.context.segment_base = base;
        Ok(())
    }

    /// Adds `data` at `offset` (relative to the current segment base).
    pub fn write(&mut self, offset: u32, data: &[u8], line: usize) -> Result<(), ParseError> {
        if data.is_empty() {
            trace!(line, offset, "ignoring empty data record");
            return Ok(());
        }

        let ctx = &mut self.context;
        if ctx.run_data.is_empty() {
            ctx.run_start = offset;
        }

        let record_end = offset as u64 + data.len() as u64;
        if record_end == ctx.run_start as u64 && !ctx.run_data.is_empty() {
            ctx.run_data.splice(0..0, data.iter().copied());
            ctx.run_start = offset;
        } else if ctx.run_end() == offset as u64 {
            ctx.run_data.extend_from_slice(data);
        } else if record_end < ctx.run_start as u64 || ctx.run_end() < offset as u64 {
            return Err(ParseError::UnsupportedGap {
                line,
                address: offset,
                length: data.len(),
                run_start: ctx.run_start,
                run_end: ctx.run_end() as u32,
            });
        } else {
            return Err(ParseError::DuplicateAddress {
                line,
                address: offset,
            });
        }

        ctx.run_bytes_collected += data.len();
        trace!(
            line,
            offset,
            len = data.len(),
            collected = ctx.run_bytes_collected,
            "data merged into run"
        );
        Ok(())
    }

    /// Records the program entry point. Repeating the same value is a no-op.
    pub fn set_start_address(&mut self, address: u32, line: usize) -> Result<(), ParseError> {
        match self.context.start_address {
            Some(existing) if existing == address => {
                trace!(line, "repeated start address ignored");
                Ok(())
            }
            Some(existing) => Err(ParseError::DuplicateStartAddress {
                line,
                existing,
                found: address,
            }),
            None => {
                self.context.start_address = Some(address);
                if self.context.run_data.is_empty() {
                    self.segments.push(Segment::start_marker(address));
                } else {
                    self.pending_start = Some(address);
                }
                Ok(())
            }
        }
    }

    /// Closes the open run, if any, into a segment.
    pub fn flush(&mut self, line: usize) -> Result<(), ParseError> {
        let ctx = &mut self.context;
        if !ctx.run_data.is_empty() {
            let address = ctx.segment_base.checked_add(ctx.run_start);
            let fits = address.is_some_and(|a| {
                a as u64 + ctx.run_bytes_collected as u64 - 1 <= u32::MAX as u64
            });
            let address = match address {
                Some(address) if fits => address,
                _ => {
                    return Err(ParseError::AddressOverflow {
                        line,
                        base: ctx.segment_base,
                        offset: ctx.run_start,
                    });
                }
            };

            debug!(
                address = format_args!("{address:#010X}"),
                len = ctx.run_bytes_collected,
                "run flushed"
            );
            self.segments
                .push(Segment::new(address, std::mem::take(&mut ctx.run_data)));
            ctx.clear_run();
        }

        if let Some(address) = self.pending_start.take() {
            self.segments.push(Segment::start_marker(address));
        }
        Ok(())
    }

    /// Flushes the open run and hands back every segment, leaving the
    /// accumulator reset.
    pub fn finish(&mut self, line: usize) -> Result<Vec<Segment>, ParseError> {
        self.flush(line)?;
        let segments = std::mem::take(&mut self.segments);
        self.reset();
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_merges_into_one_segment() {
        let mut acc = Accumulator::new();
        acc.write(0x100, &[1, 2, 3, 4], 1).unwrap();
        acc.write(0x104, &[5, 6, 7, 8], 2).unwrap();
        let segments = acc.finish(3).unwrap();
        assert_eq!(
            segments,
            vec![Segment::new(0x100, vec![1, 2, 3, 4, 5, 6, 7, 8])]
        );
    }

    #[test]
    fn test_prepend_merges_into_one_segment() {
        let mut acc = Accumulator::new();
        acc.write(0x104, &[5, 6, 7, 8], 1).unwrap();
        acc.write(0x100, &[1, 2, 3, 4], 2).unwrap();
        let segments = acc.finish(3).unwrap();
        assert_eq!(
            segments,
            vec![Segment::new(0x100, vec![1, 2, 3, 4, 5, 6, 7, 8])]
        );
    }

    #[test]
    fn test_gap_after_run_is_rejected() {
        let mut acc = Accumulator::new();
        acc.write(0x100, &[0; 4], 1).unwrap();
        let err = acc.write(0x200, &[0; 4], 2).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnsupportedGap {
                line: 2,
                address: 0x200,
                run_start: 0x100,
                run_end: 0x104,
                ..
            }
        ));
    }

    #[test]
    fn test_gap_before_run_is_rejected() {
        let mut acc = Accumulator::new();
        acc.write(0x200, &[0; 4], 1).unwrap();
        let err = acc.write(0x100, &[0; 4], 2).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedGap { .. }));
    }

    #[test]
    fn test_overlap_is_duplicate_address() {
        let mut acc = Accumulator::new();
        acc.write(0x100, &[0; 8], 1).unwrap();
        let err = acc.write(0x102, &[0; 2], 2).unwrap_err();
        assert_eq!(
            err,
            ParseError::DuplicateAddress {
                line: 2,
                address: 0x102
            }
        );
    }

    #[test]
    fn test_base_change_flushes_run() {
        let mut acc = Accumulator::new();
        acc.set_segment_base(0x0001_0000, 1).unwrap();
        acc.write(0x0000, &[0xAA], 2).unwrap();
        acc.set_segment_base(0x0002_0000, 3).unwrap();
        acc.write(0x0000, &[0xBB], 4).unwrap();
        let segments = acc.finish(5).unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::new(0x0001_0000, vec![0xAA]),
                Segment::new(0x0002_0000, vec![0xBB]),
            ]
        );
    }

    #[test]
    fn test_start_address_rules() {
        let mut acc = Accumulator::new();
        acc.set_start_address(0x1234, 1).unwrap();
        acc.set_start_address(0x1234, 2).unwrap();
        let err = acc.set_start_address(0x5678, 3).unwrap_err();
        assert_eq!(
            err,
            ParseError::DuplicateStartAddress {
                line: 3,
                existing: 0x1234,
                found: 0x5678
            }
        );
        assert_eq!(acc.segments(), &[Segment::start_marker(0x1234)]);
    }

    #[test]
    fn test_start_address_follows_open_run() {
        let mut acc = Accumulator::new();
        acc.write(0x10, &[1, 2], 1).unwrap();
        acc.set_start_address(0x10, 2).unwrap();
        acc.write(0x12, &[3], 3).unwrap();
        let segments = acc.finish(4).unwrap();
        assert_eq!(
            segments,
            vec![Segment::new(0x10, vec![1, 2, 3]), Segment::start_marker(0x10)]
        );
    }

    #[test]
    fn test_flush_overflow() {
        let mut acc = Accumulator::new();
        acc.set_segment_base(0xFFFF_0000, 1).unwrap();
        acc.write(0xFFFF, &[1, 2], 2).unwrap();
        assert!(matches!(
            acc.finish(3),
            Err(ParseError::AddressOverflow { line: 3, .. })
        ));
    }

    #[test]
    fn test_reset_clears_state() {
        let mut acc = Accumulator::new();
        acc.set_segment_base(0x10000, 1).unwrap();
        acc.write(0, &[1], 2).unwrap();
        acc.set_start_address(1, 3).unwrap();
        acc.reset();
        assert_eq!(acc.context(), &AccumulationContext::default());
        assert!(acc.segments().is_empty());
    }
}
