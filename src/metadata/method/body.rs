//! Parsing of raw CIL method bodies.
//!
//! A method body as stored in a PE image starts with a tiny (1 byte) or fat (12 byte) header
//! that gives the code size, and for fat headers the max stack depth, the local variable
//! signature token and a few flags. [`MethodBody::from`] decodes that header and locates the
//! code bytes that follow it, so a body dumped straight from an image can be handed to the
//! disassembler.
//!
//! Extra data sections (exception handling tables) following the code are not decoded; their
//! presence is reported through [`MethodBody::has_data_sections`].
//!
//! # Examples
//!
//! ```rust
//! use cildasm::metadata::method::MethodBody;
//!
//! // Tiny header: code size 2 (0x02 << 2 | 0x2), followed by `nop; ret`
//! let data = [0x0A, 0x00, 0x2A];
//! let body = MethodBody::from(&data)?;
//!
//! assert!(!body.is_fat);
//! assert_eq!(body.max_stack, 8);
//! assert_eq!(body.code(&data), &[0x00, 0x2A]);
//! # Ok::<(), cildasm::Error>(())
//! ```
//!
//! # References
//! - ECMA-335 6th Edition, Partition II, Section 25.4 - Method Header Format

use std::ops::Range;

use crate::{
    metadata::{
        method::{
            MethodBodyFlags, METHOD_BODY_FAT_FLAGS_MASK, METHOD_BODY_FORMAT_MASK,
            TINY_HEADER_MAX_STACK,
        },
        token::Token,
    },
    reader::io::read_le,
    Result,
};

/// Size of a fat method header in bytes
const FAT_HEADER_SIZE: usize = 12;

/// Header information of one method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBody {
    /// Size of the method (length of all instructions, not counting the header) in bytes
    pub size_code: usize,
    /// Size of the method header in bytes
    pub size_header: usize,
    /// Token of the signature describing the local variables. Null if there are none
    pub local_var_sig_token: Token,
    /// Maximum number of items on the operand stack
    pub max_stack: u32,
    /// Flag, indicating the type of the method header
    pub is_fat: bool,
    /// Flag, indicating to call default constructor on all local variables
    pub is_init_local: bool,
    /// Flag, indicating that data sections follow the code
    pub has_data_sections: bool,
}

impl MethodBody {
    /// Create a `MethodBody` object from a sequence of bytes starting at the header.
    ///
    /// # Arguments
    /// * `data` - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] for empty input, [`crate::Error::OutOfBounds`] if the
    /// header or the code it announces does not fit into `data`, and
    /// [`crate::Error::Malformed`] for an unknown header format.
    pub fn from(data: &[u8]) -> Result<MethodBody> {
        if data.is_empty() {
            return Err(crate::Error::Empty);
        }

        let first_byte = read_le::<u8>(data)?;
        match MethodBodyFlags::from_bits_truncate(u16::from(first_byte & METHOD_BODY_FORMAT_MASK))
        {
            MethodBodyFlags::TINY_FORMAT => {
                let size_code = (first_byte >> 2) as usize;
                if size_code + 1 > data.len() {
                    return Err(out_of_bounds_error!());
                }

                Ok(MethodBody {
                    size_code,
                    size_header: 1,
                    local_var_sig_token: Token::new(0),
                    max_stack: TINY_HEADER_MAX_STACK,
                    is_fat: false,
                    is_init_local: false,
                    has_data_sections: false,
                })
            }
            MethodBodyFlags::FAT_FORMAT => {
                if data.len() < FAT_HEADER_SIZE {
                    return Err(out_of_bounds_error!());
                }

                let first_duo = read_le::<u16>(data)?;
                let size_header = usize::from(first_duo >> 12) * 4;
                if size_header < FAT_HEADER_SIZE {
                    return Err(malformed_error!(
                        "Fat method header declares a size of {} bytes",
                        size_header
                    ));
                }

                let size_code = read_le::<u32>(&data[4..])? as usize;
                let Some(size_total) = size_header.checked_add(size_code) else {
                    return Err(out_of_bounds_error!());
                };
                if data.len() < size_total {
                    return Err(out_of_bounds_error!());
                }

                let flags_header =
                    MethodBodyFlags::from_bits_truncate(first_duo & METHOD_BODY_FAT_FLAGS_MASK);

                Ok(MethodBody {
                    size_code,
                    size_header,
                    local_var_sig_token: Token::new(read_le::<u32>(&data[8..])?),
                    max_stack: u32::from(read_le::<u16>(&data[2..])?),
                    is_fat: true,
                    is_init_local: flags_header.contains(MethodBodyFlags::INIT_LOCALS),
                    has_data_sections: flags_header.contains(MethodBodyFlags::MORE_SECTS),
                })
            }
            _ => Err(malformed_error!(
                "MethodHeader is neither FAT nor TINY - {}",
                first_byte
            )),
        }
    }

    /// Get the full size of this method (header and code)
    #[must_use]
    pub fn size(&self) -> usize {
        self.size_code + self.size_header
    }

    /// Byte range of the code within the data this body was parsed from.
    #[must_use]
    pub fn code_range(&self) -> Range<usize> {
        self.size_header..self.size()
    }

    /// The code bytes within `data`, which must be the slice passed to [`MethodBody::from`].
    ///
    /// Returns an empty slice if `data` is too short.
    #[must_use]
    pub fn code<'d>(&self, data: &'d [u8]) -> &'d [u8] {
        data.get(self.code_range()).unwrap_or(&[])
    }
}
