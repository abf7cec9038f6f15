//! Turns a [`Segment`] back into the record steps that rebuild it.

use crate::Segment;
use crate::io::ComposeError;

const BANK_SIZE: usize = 0x1_0000;

/// One record-level step emitted for a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<'a> {
    /// Program entry point (from a zero-length segment).
    StartAddress(u32),
    /// Address-register update. `length` bytes of data follow inside this bank.
    Bank { high: u16, offset: u16, length: usize },
    Data { offset: u16, data: &'a [u8] },
}

#[derive(Debug, Clone, Copy)]
pub struct Splitter {
    max_data_length: usize,
}

impl Splitter {
    pub fn new(max_data_length: usize) -> Result<Self, ComposeError> {
        if max_data_length == 0 || max_data_length > u8::MAX as usize {
            return Err(ComposeError::InvalidRecordLength(max_data_length));
        }
        Ok(Self { max_data_length })
    }

    pub fn max_data_length(&self) -> usize {
        self.max_data_length
    }

    /// Split `segment` into an address-register step per 64 KiB bank it
    /// touches, each followed by data steps of at most `max_data_length`.
    pub fn split<'a>(&self, segment: &'a Segment) -> Result<Vec<Step<'a>>, ComposeError> {
        if segment.is_start_marker() {
            return Ok(vec![Step::StartAddress(segment.address)]);
        }
        if segment.end_address().is_none() {
            return Err(ComposeError::AddressOverflow {
                address: segment.address,
                length: segment.len(),
            });
        }

        let mut steps = Vec::new();
        let mut address = segment.address;
        let mut pos = 0;

        while pos < segment.len() {
            let offset = (address & 0xFFFF) as usize;
            let bank_len = (BANK_SIZE - offset).min(segment.len() - pos);
            steps.push(Step::Bank {
                high: (address >> 16) as u16,
                offset: offset as u16,
                length: bank_len,
            });

            let bank = &segment.data[pos..pos + bank_len];
            let mut chunk_offset = offset;
            for chunk in bank.chunks(self.max_data_length) {
                steps.push(Step::Data {
                    offset: chunk_offset as u16,
                    data: chunk,
                });
                chunk_offset += chunk.len();
            }

            pos += bank_len;
            address = address.wrapping_add(bank_len as u32);
        }

        Ok(steps)
    }
}
