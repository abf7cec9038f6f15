use std::fmt;

/// A contiguous memory region, or an entry-point marker when `data` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub address: u32,
    pub data: Vec<u8>,
}

impl Segment {
    pub fn new(address: u32, data: Vec<u8>) -> Self {
        debug_assert!(
            data.len() <= u32::MAX as usize,
            "segment data exceeds u32::MAX bytes"
        );
        Self { address, data }
    }

    /// Zero-length segment carrying a program entry point.
    pub fn start_marker(address: u32) -> Self {
        Self {
            address,
            data: Vec::new(),
        }
    }

    pub fn is_start_marker(&self) -> bool {
        self.data.is_empty()
    }

    /// Address of the last byte, or `None` for start markers and segments
    /// that run past the 32-bit address space.
    pub fn end_address(&self) -> Option<u32> {
        if self.data.is_empty() {
            return None;
        }
        u32::try_from(self.data.len() - 1)
            .ok()
            .and_then(|last| self.address.checked_add(last))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_start_marker() {
            return write!(f, "start at {:08X}", self.address);
        }
        write!(f, "data at {:08X}: ", self.address)?;
        for b in &self.data {
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}
