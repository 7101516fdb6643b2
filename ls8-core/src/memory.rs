use std::fmt;

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("address 0x{address:04X} is outside of {size} bytes of memory")]
    AddressOutOfRange { address: usize, size: usize },
    #[error("image of {length} bytes does not fit in {size} bytes of memory")]
    ImageTooLarge { length: usize, size: usize },
}

pub type Result<T> = std::result::Result<T, MemoryError>;

/// Flat, zero-initialized byte storage of `N` cells.
#[derive(Clone)]
pub struct Memory<const N: usize> {
    buffer: [u8; N],
    num_reads: usize,
    num_writes: usize,
}

impl<const N: usize> fmt::Debug for Memory<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Memory[{} bytes, {} reads, {} writes]",
            N, self.num_reads, self.num_writes
        )
    }
}

impl<const N: usize> Default for Memory<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Memory<N> {
    pub const SIZE: usize = N;

    pub fn new() -> Self {
        Self {
            buffer: [0; N],
            num_reads: 0,
            num_writes: 0,
        }
    }

    fn check(address: usize) -> Result<usize> {
        if address < N {
            Ok(address)
        } else {
            Err(MemoryError::AddressOutOfRange { address, size: N })
        }
    }

    pub fn read(&mut self, address: usize) -> Result<u8> {
        let address = Self::check(address)?;
        self.num_reads += 1;
        Ok(self.buffer[address])
    }

    /// Reads without touching the access counters; used for tracing.
    pub fn peek(&self, address: usize) -> Option<u8> {
        self.buffer.get(address).copied()
    }

    pub fn write(&mut self, address: usize, value: u8) -> Result<()> {
        let address = Self::check(address)?;
        self.num_writes += 1;
        self.buffer[address] = value;
        Ok(())
    }

    /// Copies `image` into memory starting at `address`.
    pub fn load(&mut self, address: usize, image: &[u8]) -> Result<()> {
        let end = address + image.len();
        if end > N {
            return Err(MemoryError::ImageTooLarge {
                length: image.len(),
                size: N - address.min(N),
            });
        }
        self.buffer[address..end].copy_from_slice(image);
        tracing::debug!("loaded {} bytes at 0x{:04X}", image.len(), address);
        Ok(())
    }

    pub fn num_reads(&self) -> usize {
        self.num_reads
    }

    pub fn num_writes(&self) -> usize {
        self.num_writes
    }
}
