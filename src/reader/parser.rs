//! Cursor-based byte stream parser for CIL bytecode.
//!
//! [`Parser`] keeps a position within a borrowed byte slice and offers bounds-checked,
//! little-endian reads. It is the cursor the instruction decoder walks forward over a
//! method body; every read either succeeds and advances, or fails with
//! [`crate::Error::OutOfBounds`] and leaves the position unchanged.
//!
//! # Examples
//!
//! ```rust
//! use cildasm::Parser;
//!
//! let data = [0x2B, 0x05, 0x2A];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_le::<u8>()?, 0x2B);
//! assert_eq!(parser.read_le::<i8>()?, 5);
//! assert_eq!(parser.remaining(), 1);
//! # Ok::<(), cildasm::Error>(())
//! ```

use crate::{
    reader::io::{read_le_at, CilIO},
    Result,
};

/// A forward-reading binary parser over a byte slice.
///
/// The parser never reads outside of its slice. Higher layers use [`Parser::remaining`] to
/// detect truncated operands before attempting a read, and [`Parser::advance_by`] to skip
/// whatever is left of one.
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cildasm::Parser;
    /// let data = [0x01];
    /// let mut parser = Parser::new(&data);
    /// assert!(parser.has_more_data());
    ///
    /// let _byte = parser.read_le::<u8>()?;
    /// assert!(!parser.has_more_data());
    /// # Ok::<(), cildasm::Error>(())
    /// ```
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get access to the underlying data buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Number of bytes left between the current position and the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Peek at the next byte without advancing the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is at or beyond the data length.
    pub fn peek_byte(&self) -> Result<u8> {
        self.data
            .get(self.position)
            .copied()
            .ok_or(out_of_bounds_error!())
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing by step would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        if step > self.remaining() {
            return Err(out_of_bounds_error!());
        }

        self.position += step;
        Ok(())
    }

    /// Skip everything that is left in the buffer, returning how many bytes were skipped.
    pub fn skip_remaining(&mut self) -> usize {
        let skipped = self.remaining();
        self.position = self.data.len();
        skipped
    }

    /// Read a type `T` from the current position in little-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    pub fn read_le<T: CilIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }
}
