//! Method body header flags (ECMA-335 II.25.4).

use bitflags::bitflags;

/// Mask selecting the header format bits of the first header byte
pub const METHOD_BODY_FORMAT_MASK: u8 = 0b_0000_0011;

/// Mask selecting the flag bits of a fat header's first 16-bit word
pub const METHOD_BODY_FAT_FLAGS_MASK: u16 = 0b_0000_1111_1111_1111;

/// Max stack implied by a tiny method header
pub const TINY_HEADER_MAX_STACK: u32 = 8;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Flags of a method body header
    pub struct MethodBodyFlags: u16 {
        /// Tiny method header format
        const TINY_FORMAT = 0x2;
        /// Fat method header format
        const FAT_FORMAT = 0x3;
        /// Flag of the fat method header, showing that there are more data sections appended to the header
        const MORE_SECTS = 0x8;
        /// Flag to indicate that this method should call the default constructor on all local variables
        const INIT_LOCALS = 0x10;
    }
}
