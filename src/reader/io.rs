//! Endian-aware, bounds-checked primitive reads.
//!
//! [`CilIO`] abstracts over the fixed-size primitive types that appear in CIL operands and
//! method headers, so that [`read_le`] and [`read_le_at`] can decode any of them from a byte
//! slice without panicking on short input. Every read returns [`crate::Error::OutOfBounds`]
//! instead of indexing past the end of the buffer.
//!
//! # Examples
//!
//! ```rust,ignore
//! use cildasm::reader::io::read_le_at;
//!
//! let data = [0x01, 0x00, 0x02, 0x00];
//! let mut offset = 0;
//!
//! let first: u16 = read_le_at(&data, &mut offset)?;
//! let second: u16 = read_le_at(&data, &mut offset)?;
//! assert_eq!((first, second, offset), (1, 2, 4));
//! # Ok::<(), cildasm::Error>(())
//! ```

use crate::Result;

/// Trait for type-specific safe binary data reading operations.
///
/// Each implementation names the fixed-size byte array used for the type (e.g. `[u8; 4]`
/// for `u32`) and converts from it in little-endian order.
pub trait CilIO: Sized {
    /// Byte array representation of this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_cil_io {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CilIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_cil_io!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Safely reads a value of type `T` in little-endian byte order from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le<T: CilIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Safely reads a value of type `T` in little-endian byte order at `offset`, advancing the
/// offset by the size of `T` on success.
///
/// The offset is left untouched when the read fails.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(out_of_bounds_error!());
    };
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn read_signed_and_unsigned() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF];

        assert_eq!(read_le::<u8>(&data).unwrap(), 0xFF);
        assert_eq!(read_le::<i8>(&data).unwrap(), -1);
        assert_eq!(read_le::<u16>(&data).unwrap(), 0xFFFF);
        assert_eq!(read_le::<i16>(&data).unwrap(), -1);
        assert_eq!(read_le::<u32>(&data).unwrap(), 0xFFFF_FFFF);
        assert_eq!(read_le::<i32>(&data).unwrap(), -1);
    }

    #[test]
    fn read_floats() {
        let single = 1.5f32.to_le_bytes();
        let double = (-0.25f64).to_le_bytes();

        assert_eq!(read_le::<f32>(&single).unwrap(), 1.5);
        assert_eq!(read_le::<f64>(&double).unwrap(), -0.25);
    }

    #[test]
    fn read_at_advances_offset() {
        let data = [0x01, 0x00, 0x02, 0x00, 0x00, 0x00];
        let mut offset = 0;

        assert_eq!(read_le_at::<u16>(&data, &mut offset).unwrap(), 1);
        assert_eq!(offset, 2);
        assert_eq!(read_le_at::<u32>(&data, &mut offset).unwrap(), 2);
        assert_eq!(offset, 6);
    }

    #[test]
    fn read_past_end_fails_without_moving() {
        let data = [0x01, 0x02, 0x03];
        let mut offset = 1;

        let result = read_le_at::<u32>(&data, &mut offset);
        assert!(matches!(result, Err(Error::OutOfBounds { .. })));
        assert_eq!(offset, 1);
    }

    #[test]
    fn read_with_overflowing_offset() {
        let data = [0x00];
        let mut offset = usize::MAX;

        assert!(read_le_at::<u16>(&data, &mut offset).is_err());
    }
}
