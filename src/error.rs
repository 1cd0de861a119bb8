use std::any::Any;

use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Most of these never reach a caller of [`crate::disassemble`]: the disassembler degrades
/// truncated operands and failed token lookups to placeholder text and renders anything else
/// as an error line. They surface through the structured API
/// ([`crate::decode_method_body`], [`crate::disassembler::decode_instruction`],
/// [`crate::metadata::method::MethodBody::from`]) and from [`crate::metadata::MetadataResolver`]
/// implementations.
///
/// # Error Categories
///
/// ## Byte stream errors
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of the buffer
/// - [`Error::Malformed`] - Corrupted or invalid structure
/// - [`Error::Empty`] - Empty input provided
///
/// ## Metadata resolution errors
/// - [`Error::TokenNotFound`] - A resolver backend has no entry for a token
/// - [`Error::Resolver`] - A resolver backend failed for another reason
/// - [`Error::NotSupported`] - A resolver backend does not implement a lookup
///
/// # Examples
///
/// ```rust
/// use cildasm::{Error, metadata::method::MethodBody};
///
/// match MethodBody::from(&[0x07]) {
///     Ok(body) => println!("{} bytes of code", body.size_code),
///     Err(Error::OutOfBounds { .. }) => eprintln!("body is truncated"),
///     Err(Error::Malformed { message, .. }) => eprintln!("malformed body: {message}"),
///     Err(e) => eprintln!("other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An out of bound access was attempted while parsing.
    ///
    /// Carries the source location that detected the overrun.
    #[error("Out of Bound read would have occurred - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The data is damaged and could not be parsed.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The requested operation is not supported by this backend.
    #[error("This operation is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// The metadata backend has no entry for this token.
    #[error("Failed to resolve token - {0}")]
    TokenNotFound(Token),

    /// The metadata backend failed while resolving a token.
    ///
    /// Used by [`crate::metadata::MetadataResolver`] implementations to report
    /// failures of the underlying metadata system.
    #[error("Resolver failure - {0}")]
    Resolver(String),
}

impl Error {
    /// A short, stable name for the kind of failure, used in rendered error lines.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Error::OutOfBounds { .. } => "OutOfBounds",
            Error::Malformed { .. } => "Malformed",
            Error::NotSupported => "NotSupported",
            Error::Empty => "Empty",
            Error::TokenNotFound(_) => "TokenNotFound",
            Error::Resolver(_) => "Resolver",
        }
    }
}

/// Extract the message carried by a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::panic;

    use super::*;

    #[test]
    fn panic_payload_messages() {
        let payload = panic::catch_unwind(|| panic!("static message")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let code = 7;
        let payload = panic::catch_unwind(|| panic!("formatted {code}")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "formatted 7");

        let payload = panic::catch_unwind(|| panic::panic_any(42_u32)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[test]
    fn categories() {
        assert_eq!(malformed_error!("bad").category(), "Malformed");
        assert_eq!(out_of_bounds_error!().category(), "OutOfBounds");
        assert_eq!(Error::Resolver("x".into()).category(), "Resolver");
    }
}
