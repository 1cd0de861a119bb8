use log::debug;

use crate::metadata::{
    method::MethodBody,
    resolver::{guarded_lookup, MetadataResolver},
};

/// Header information of the method whose code is being disassembled.
///
/// This is what a host knows about a method besides its code bytes: whether it has an IL body
/// at all, the declared max stack depth and the types of its local variables. A `None` local
/// type is a local whose type cannot be named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodHeader {
    /// `false` for abstract, extern, runtime-implemented and interface methods
    pub has_body: bool,
    /// Declared maximum operand stack depth
    pub max_stack: u32,
    /// Local variable types in declaration order
    pub local_types: Vec<Option<String>>,
}

impl MethodHeader {
    /// Header of a method with an IL body and no locals.
    #[must_use]
    pub fn new(max_stack: u32) -> Self {
        MethodHeader {
            has_body: true,
            max_stack,
            local_types: Vec::new(),
        }
    }

    /// Header of a method without an IL body.
    #[must_use]
    pub fn no_body() -> Self {
        MethodHeader {
            has_body: false,
            max_stack: 0,
            local_types: Vec::new(),
        }
    }

    /// Append a local variable; `None` if its type cannot be named.
    #[must_use]
    pub fn with_local(mut self, type_name: Option<&str>) -> Self {
        self.local_types.push(type_name.map(str::to_string));
        self
    }

    /// Derive the header of a parsed raw method body.
    ///
    /// Local types are looked up through the body's local variable signature token. A body
    /// without a signature has no locals; a signature the backend cannot resolve is logged
    /// and treated the same way.
    pub fn from_body(body: &MethodBody, resolver: &dyn MetadataResolver) -> Self {
        let token = body.local_var_sig_token;
        let local_types = if token.is_null() {
            Vec::new()
        } else {
            match guarded_lookup(token, || resolver.resolve_local_signature(token)) {
                Ok(locals) => locals,
                Err(error) => {
                    debug!("local signature {token} not resolved: {error}");
                    Vec::new()
                }
            }
        };

        MethodHeader {
            has_body: true,
            max_stack: body.max_stack,
            local_types,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{sample_symbols, FailingResolver, PanickingResolver};

    #[test]
    fn builder() {
        let header = MethodHeader::new(4)
            .with_local(Some("System.Int32"))
            .with_local(None);

        assert!(header.has_body);
        assert_eq!(header.max_stack, 4);
        assert_eq!(
            header.local_types,
            vec![Some("System.Int32".to_string()), None]
        );
        assert!(!MethodHeader::no_body().has_body);
    }

    #[test]
    fn from_fat_body_resolves_locals() {
        let data = [
            0x13, 0x30, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x11, 0x2A,
        ];
        let body = MethodBody::from(&data).unwrap();

        let header = MethodHeader::from_body(&body, &sample_symbols());
        assert_eq!(header.max_stack, 2);
        assert_eq!(
            header.local_types,
            vec![Some("System.Int32".to_string()), None]
        );

        let header = MethodHeader::from_body(&body, &FailingResolver);
        assert!(header.has_body);
        assert!(header.local_types.is_empty());

        let header = MethodHeader::from_body(&body, &PanickingResolver);
        assert_eq!(header.max_stack, 2);
        assert!(header.local_types.is_empty());
    }

    #[test]
    fn from_tiny_body() {
        let data = [0x06, 0x2A];
        let body = MethodBody::from(&data).unwrap();

        let header = MethodHeader::from_body(&body, &sample_symbols());
        assert_eq!(header, MethodHeader::new(8));
    }
}
