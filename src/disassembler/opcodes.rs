//! The CIL opcode tables (ECMA-335 Partition III).
//!
//! Opcodes are encoded either as a single byte or as the escape byte [`FE_PREFIX`] followed by
//! a second byte. Both spaces are described by a fixed 256-entry table built at compile time:
//! [`INSTRUCTIONS`] for the one-byte space and [`INSTRUCTIONS_FE`] for the byte following the
//! escape. Byte values that encode no instruction hold [`Opcode::UNKNOWN`], so a lookup never
//! fails.
//!
//! # Examples
//!
//! ```rust
//! use cildasm::disassembler::{lookup, lookup_fe, OperandKind};
//!
//! assert_eq!(lookup(0x28).mnemonic, "call");
//! assert_eq!(lookup(0x28).operand_kind, OperandKind::MethodToken);
//! assert_eq!(lookup_fe(0x01).mnemonic, "ceq");
//! assert!(!lookup(0x24).is_defined());
//! ```

use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

/// Lead byte of every two-byte opcode
pub const FE_PREFIX: u8 = 0xFE;

/// How the bytes following an opcode are read and rendered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount, IntoStaticStr,
)]
pub enum OperandKind {
    /// No operand present
    None,
    /// Signed 32-bit integer constant
    ConstInt32,
    /// Signed 64-bit integer constant
    ConstInt64,
    /// Signed 8-bit integer constant
    ConstByte,
    /// 64-bit floating point constant
    ConstFloat64,
    /// 32-bit floating point constant
    ConstFloat32,
    /// Token of a user string
    StringToken,
    /// Token of a method
    MethodToken,
    /// Token of a field
    FieldToken,
    /// Token of a type
    TypeToken,
    /// Token that may name a method, field, type or signature
    GenericToken,
    /// Signed 8-bit branch displacement
    ShortBranchTarget,
    /// Signed 32-bit branch displacement
    LongBranchTarget,
    /// Unsigned 8-bit argument or local index
    ShortVarIndex,
    /// 16-bit argument or local index
    VarIndex,
    /// Jump table: a 32-bit count followed by that many 32-bit displacements
    Switch,
}

impl OperandKind {
    /// Returns the size in bytes of this operand kind.
    ///
    /// Returns `Some(size)` for fixed-size operands, or `None` for [`OperandKind::Switch`]
    /// whose size depends on the case count read from the stream.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cildasm::disassembler::OperandKind;
    ///
    /// assert_eq!(OperandKind::None.size(), Some(0));
    /// assert_eq!(OperandKind::ShortBranchTarget.size(), Some(1));
    /// assert_eq!(OperandKind::FieldToken.size(), Some(4));
    /// assert_eq!(OperandKind::ConstFloat64.size(), Some(8));
    /// assert_eq!(OperandKind::Switch.size(), None);
    /// ```
    #[must_use]
    pub const fn size(&self) -> Option<usize> {
        match self {
            OperandKind::None => Some(0),
            OperandKind::ConstByte
            | OperandKind::ShortBranchTarget
            | OperandKind::ShortVarIndex => Some(1),
            OperandKind::VarIndex => Some(2),
            OperandKind::ConstInt32
            | OperandKind::ConstFloat32
            | OperandKind::StringToken
            | OperandKind::MethodToken
            | OperandKind::FieldToken
            | OperandKind::TypeToken
            | OperandKind::GenericToken
            | OperandKind::LongBranchTarget => Some(4),
            OperandKind::ConstInt64 | OperandKind::ConstFloat64 => Some(8),
            OperandKind::Switch => None,
        }
    }

    /// Returns `true` for kinds whose operand is a metadata token.
    #[must_use]
    pub const fn is_token(&self) -> bool {
        matches!(
            self,
            OperandKind::StringToken
                | OperandKind::MethodToken
                | OperandKind::FieldToken
                | OperandKind::TypeToken
                | OperandKind::GenericToken
        )
    }
}

/// A CIL instruction as described by its encoding: mnemonic and operand layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode {
    /// Textual mnemonic, e.g. `ldarg.0`
    pub mnemonic: &'static str,
    /// Operand following the opcode byte(s)
    pub operand_kind: OperandKind,
}

impl Opcode {
    /// Placeholder for byte values that encode no instruction.
    pub const UNKNOWN: Opcode = Opcode::new("unknown", OperandKind::None);

    /// Create an opcode description.
    #[must_use]
    pub const fn new(mnemonic: &'static str, operand_kind: OperandKind) -> Self {
        Opcode {
            mnemonic,
            operand_kind,
        }
    }

    /// Returns `false` for the [`Opcode::UNKNOWN`] placeholder.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        *self != Opcode::UNKNOWN
    }
}

use OperandKind as K;

const ONE_BYTE: &[(u8, &str, OperandKind)] = &[
    (0x00, "nop", K::None),
    (0x01, "break", K::None),
    (0x02, "ldarg.0", K::None),
    (0x03, "ldarg.1", K::None),
    (0x04, "ldarg.2", K::None),
    (0x05, "ldarg.3", K::None),
    (0x06, "ldloc.0", K::None),
    (0x07, "ldloc.1", K::None),
    (0x08, "ldloc.2", K::None),
    (0x09, "ldloc.3", K::None),
    (0x0A, "stloc.0", K::None),
    (0x0B, "stloc.1", K::None),
    (0x0C, "stloc.2", K::None),
    (0x0D, "stloc.3", K::None),
    (0x0E, "ldarg.s", K::ShortVarIndex),
    (0x0F, "ldarga.s", K::ShortVarIndex),
    (0x10, "starg.s", K::ShortVarIndex),
    (0x11, "ldloc.s", K::ShortVarIndex),
    (0x12, "ldloca.s", K::ShortVarIndex),
    (0x13, "stloc.s", K::ShortVarIndex),
    (0x14, "ldnull", K::None),
    (0x15, "ldc.i4.m1", K::None),
    (0x16, "ldc.i4.0", K::None),
    (0x17, "ldc.i4.1", K::None),
    (0x18, "ldc.i4.2", K::None),
    (0x19, "ldc.i4.3", K::None),
    (0x1A, "ldc.i4.4", K::None),
    (0x1B, "ldc.i4.5", K::None),
    (0x1C, "ldc.i4.6", K::None),
    (0x1D, "ldc.i4.7", K::None),
    (0x1E, "ldc.i4.8", K::None),
    (0x1F, "ldc.i4.s", K::ConstByte),
    (0x20, "ldc.i4", K::ConstInt32),
    (0x21, "ldc.i8", K::ConstInt64),
    (0x22, "ldc.r4", K::ConstFloat32),
    (0x23, "ldc.r8", K::ConstFloat64),
    (0x25, "dup", K::None),
    (0x26, "pop", K::None),
    (0x27, "jmp", K::MethodToken),
    (0x28, "call", K::MethodToken),
    (0x29, "calli", K::GenericToken),
    (0x2A, "ret", K::None),
    (0x2B, "br.s", K::ShortBranchTarget),
    (0x2C, "brfalse.s", K::ShortBranchTarget),
    (0x2D, "brtrue.s", K::ShortBranchTarget),
    (0x2E, "beq.s", K::ShortBranchTarget),
    (0x2F, "bge.s", K::ShortBranchTarget),
    (0x30, "bgt.s", K::ShortBranchTarget),
    (0x31, "ble.s", K::ShortBranchTarget),
    (0x32, "blt.s", K::ShortBranchTarget),
    (0x33, "bne.un.s", K::ShortBranchTarget),
    (0x34, "bge.un.s", K::ShortBranchTarget),
    (0x35, "bgt.un.s", K::ShortBranchTarget),
    (0x36, "ble.un.s", K::ShortBranchTarget),
    (0x37, "blt.un.s", K::ShortBranchTarget),
    (0x38, "br", K::LongBranchTarget),
    (0x39, "brfalse", K::LongBranchTarget),
    (0x3A, "brtrue", K::LongBranchTarget),
    (0x3B, "beq", K::LongBranchTarget),
    (0x3C, "bge", K::LongBranchTarget),
    (0x3D, "bgt", K::LongBranchTarget),
    (0x3E, "ble", K::LongBranchTarget),
    (0x3F, "blt", K::LongBranchTarget),
    (0x40, "bne.un", K::LongBranchTarget),
    (0x41, "bge.un", K::LongBranchTarget),
    (0x42, "bgt.un", K::LongBranchTarget),
    (0x43, "ble.un", K::LongBranchTarget),
    (0x44, "blt.un", K::LongBranchTarget),
    (0x45, "switch", K::Switch),
    (0x46, "ldind.i1", K::None),
    (0x47, "ldind.u1", K::None),
    (0x48, "ldind.i2", K::None),
    (0x49, "ldind.u2", K::None),
    (0x4A, "ldind.i4", K::None),
    (0x4B, "ldind.u4", K::None),
    (0x4C, "ldind.i8", K::None),
    (0x4D, "ldind.i", K::None),
    (0x4E, "ldind.r4", K::None),
    (0x4F, "ldind.r8", K::None),
    (0x50, "ldind.ref", K::None),
    (0x51, "stind.ref", K::None),
    (0x52, "stind.i1", K::None),
    (0x53, "stind.i2", K::None),
    (0x54, "stind.i4", K::None),
    (0x55, "stind.i8", K::None),
    (0x56, "stind.r4", K::None),
    (0x57, "stind.r8", K::None),
    (0x58, "add", K::None),
    (0x59, "sub", K::None),
    (0x5A, "mul", K::None),
    (0x5B, "div", K::None),
    (0x5C, "div.un", K::None),
    (0x5D, "rem", K::None),
    (0x5E, "rem.un", K::None),
    (0x5F, "and", K::None),
    (0x60, "or", K::None),
    (0x61, "xor", K::None),
    (0x62, "shl", K::None),
    (0x63, "shr", K::None),
    (0x64, "shr.un", K::None),
    (0x65, "neg", K::None),
    (0x66, "not", K::None),
    (0x67, "conv.i1", K::None),
    (0x68, "conv.i2", K::None),
    (0x69, "conv.i4", K::None),
    (0x6A, "conv.i8", K::None),
    (0x6B, "conv.r4", K::None),
    (0x6C, "conv.r8", K::None),
    (0x6D, "conv.u4", K::None),
    (0x6E, "conv.u8", K::None),
    (0x6F, "callvirt", K::MethodToken),
    (0x70, "cpobj", K::TypeToken),
    (0x71, "ldobj", K::TypeToken),
    (0x72, "ldstr", K::StringToken),
    (0x73, "newobj", K::MethodToken),
    (0x74, "castclass", K::TypeToken),
    (0x75, "isinst", K::TypeToken),
    (0x76, "conv.r.un", K::None),
    (0x79, "unbox", K::TypeToken),
    (0x7A, "throw", K::None),
    (0x7B, "ldfld", K::FieldToken),
    (0x7C, "ldflda", K::FieldToken),
    (0x7D, "stfld", K::FieldToken),
    (0x7E, "ldsfld", K::FieldToken),
    (0x7F, "ldsflda", K::FieldToken),
    (0x80, "stsfld", K::FieldToken),
    (0x81, "stobj", K::TypeToken),
    (0x82, "conv.ovf.i1.un", K::None),
    (0x83, "conv.ovf.i2.un", K::None),
    (0x84, "conv.ovf.i4.un", K::None),
    (0x85, "conv.ovf.i8.un", K::None),
    (0x86, "conv.ovf.u1.un", K::None),
    (0x87, "conv.ovf.u2.un", K::None),
    (0x88, "conv.ovf.u4.un", K::None),
    (0x89, "conv.ovf.u8.un", K::None),
    (0x8A, "conv.ovf.i.un", K::None),
    (0x8B, "conv.ovf.u.un", K::None),
    (0x8C, "box", K::TypeToken),
    (0x8D, "newarr", K::TypeToken),
    (0x8E, "ldlen", K::None),
    (0x8F, "ldelema", K::TypeToken),
    (0x90, "ldelem.i1", K::None),
    (0x91, "ldelem.u1", K::None),
    (0x92, "ldelem.i2", K::None),
    (0x93, "ldelem.u2", K::None),
    (0x94, "ldelem.i4", K::None),
    (0x95, "ldelem.u4", K::None),
    (0x96, "ldelem.i8", K::None),
    (0x97, "ldelem.i", K::None),
    (0x98, "ldelem.r4", K::None),
    (0x99, "ldelem.r8", K::None),
    (0x9A, "ldelem.ref", K::None),
    (0x9B, "stelem.i", K::None),
    (0x9C, "stelem.i1", K::None),
    (0x9D, "stelem.i2", K::None),
    (0x9E, "stelem.i4", K::None),
    (0x9F, "stelem.i8", K::None),
    (0xA0, "stelem.r4", K::None),
    (0xA1, "stelem.r8", K::None),
    (0xA2, "stelem.ref", K::None),
    (0xA3, "ldelem", K::TypeToken),
    (0xA4, "stelem", K::TypeToken),
    (0xA5, "unbox.any", K::TypeToken),
    (0xB3, "conv.ovf.i1", K::None),
    (0xB4, "conv.ovf.u1", K::None),
    (0xB5, "conv.ovf.i2", K::None),
    (0xB6, "conv.ovf.u2", K::None),
    (0xB7, "conv.ovf.i4", K::None),
    (0xB8, "conv.ovf.u4", K::None),
    (0xB9, "conv.ovf.i8", K::None),
    (0xBA, "conv.ovf.u8", K::None),
    (0xC2, "refanyval", K::TypeToken),
    (0xC3, "ckfinite", K::None),
    (0xC6, "mkrefany", K::TypeToken),
    (0xD0, "ldtoken", K::GenericToken),
    (0xD1, "conv.u2", K::None),
    (0xD2, "conv.u1", K::None),
    (0xD3, "conv.i", K::None),
    (0xD4, "conv.ovf.i", K::None),
    (0xD5, "conv.ovf.u", K::None),
    (0xD6, "add.ovf", K::None),
    (0xD7, "add.ovf.un", K::None),
    (0xD8, "mul.ovf", K::None),
    (0xD9, "mul.ovf.un", K::None),
    (0xDA, "sub.ovf", K::None),
    (0xDB, "sub.ovf.un", K::None),
    (0xDC, "endfinally", K::None),
    (0xDD, "leave", K::LongBranchTarget),
    (0xDE, "leave.s", K::ShortBranchTarget),
    (0xDF, "stind.i", K::None),
    (0xE0, "conv.u", K::None),
];

const TWO_BYTE: &[(u8, &str, OperandKind)] = &[
    (0x00, "arglist", K::None),
    (0x01, "ceq", K::None),
    (0x02, "cgt", K::None),
    (0x03, "cgt.un", K::None),
    (0x04, "clt", K::None),
    (0x05, "clt.un", K::None),
    (0x06, "ldftn", K::MethodToken),
    (0x07, "ldvirtftn", K::MethodToken),
    (0x09, "ldarg", K::VarIndex),
    (0x0A, "ldarga", K::VarIndex),
    (0x0B, "starg", K::VarIndex),
    (0x0C, "ldloc", K::VarIndex),
    (0x0D, "ldloca", K::VarIndex),
    (0x0E, "stloc", K::VarIndex),
    (0x0F, "localloc", K::None),
    (0x11, "endfilter", K::None),
    (0x12, "unaligned.", K::ConstByte),
    (0x13, "volatile.", K::None),
    (0x14, "tail.", K::None),
    (0x15, "initobj", K::TypeToken),
    (0x16, "constrained.", K::TypeToken),
    (0x17, "cpblk", K::None),
    (0x18, "initblk", K::None),
    // Carries a one-byte mask of the checks that may be skipped.
    (0x19, "no.", K::ConstByte),
    (0x1A, "rethrow", K::None),
    (0x1C, "sizeof", K::TypeToken),
    (0x1D, "refanytype", K::None),
    (0x1E, "readonly.", K::None),
];

const fn build_table(entries: &[(u8, &'static str, OperandKind)]) -> [Opcode; 256] {
    let mut table = [Opcode::UNKNOWN; 256];
    let mut i = 0;
    while i < entries.len() {
        let (byte, mnemonic, operand_kind) = entries[i];
        table[byte as usize] = Opcode::new(mnemonic, operand_kind);
        i += 1;
    }
    table
}

/// One-byte opcodes, indexed by the opcode byte.
pub static INSTRUCTIONS: [Opcode; 256] = build_table(ONE_BYTE);

/// Two-byte opcodes, indexed by the byte following [`FE_PREFIX`].
pub static INSTRUCTIONS_FE: [Opcode; 256] = build_table(TWO_BYTE);

/// Look up a one-byte opcode.
#[must_use]
pub fn lookup(byte: u8) -> &'static Opcode {
    &INSTRUCTIONS[usize::from(byte)]
}

/// Look up a two-byte opcode by the byte following [`FE_PREFIX`].
#[must_use]
pub fn lookup_fe(byte: u8) -> &'static Opcode {
    &INSTRUCTIONS_FE[usize::from(byte)]
}

/// Iterate all defined opcodes in encoding order, paired with their raw encoding
/// (`0x00XX` for one-byte, `0xFEXX` for two-byte opcodes).
pub fn defined_opcodes() -> impl Iterator<Item = (u16, &'static Opcode)> {
    let one_byte = INSTRUCTIONS
        .iter()
        .enumerate()
        .map(|(byte, opcode)| (byte as u16, opcode));
    let two_byte = INSTRUCTIONS_FE
        .iter()
        .enumerate()
        .map(|(byte, opcode)| ((u16::from(FE_PREFIX) << 8) | byte as u16, opcode));

    one_byte
        .chain(two_byte)
        .filter(|(_, opcode)| opcode.is_defined())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn table_sizes() {
        assert_eq!(ONE_BYTE.len(), 191);
        assert_eq!(TWO_BYTE.len(), 28);
        assert_eq!(defined_opcodes().count(), ONE_BYTE.len() + TWO_BYTE.len());
    }

    #[test]
    fn entries_are_unique() {
        for entries in [ONE_BYTE, TWO_BYTE] {
            let bytes: HashSet<u8> = entries.iter().map(|(byte, _, _)| *byte).collect();
            assert_eq!(bytes.len(), entries.len());
        }

        let mnemonics: HashSet<&str> = defined_opcodes().map(|(_, op)| op.mnemonic).collect();
        assert_eq!(mnemonics.len(), defined_opcodes().count());
    }

    #[test]
    fn gaps_are_unknown() {
        for byte in [
            0x24, 0x77, 0x78, 0xA6, 0xB2, 0xBB, 0xC1, 0xC4, 0xC5, 0xC7, 0xCF, 0xE1, 0xFE, 0xFF,
        ] {
            let opcode = lookup(byte);
            assert!(!opcode.is_defined(), "0x{byte:02X} should be undefined");
            assert_eq!(opcode.operand_kind, OperandKind::None);
        }
        for byte in [0x08, 0x10, 0x1B, 0x1F, 0x30, 0xFF] {
            assert!(!lookup_fe(byte).is_defined(), "0xFE 0x{byte:02X}");
        }
    }

    #[test]
    fn known_encodings() {
        assert_eq!(*lookup(0x00), Opcode::new("nop", OperandKind::None));
        assert_eq!(*lookup(0x72), Opcode::new("ldstr", OperandKind::StringToken));
        assert_eq!(*lookup(0x45), Opcode::new("switch", OperandKind::Switch));
        assert_eq!(*lookup(0xE0), Opcode::new("conv.u", OperandKind::None));
        assert_eq!(*lookup_fe(0x0C), Opcode::new("ldloc", OperandKind::VarIndex));
        assert_eq!(*lookup_fe(0x1E), Opcode::new("readonly.", OperandKind::None));
    }

    #[test]
    fn operand_kind_groups() {
        let kind_of = |code: u16| {
            if code >> 8 == u16::from(FE_PREFIX) {
                lookup_fe(code as u8).operand_kind
            } else {
                lookup(code as u8).operand_kind
            }
        };

        for code in 0x0E..=0x13 {
            assert_eq!(kind_of(code), OperandKind::ShortVarIndex);
        }
        for code in 0xFE09..=0xFE0E {
            assert_eq!(kind_of(code), OperandKind::VarIndex);
        }
        for code in (0x2B..=0x37).chain([0xDE]) {
            assert_eq!(kind_of(code), OperandKind::ShortBranchTarget);
        }
        for code in (0x38..=0x44).chain([0xDD]) {
            assert_eq!(kind_of(code), OperandKind::LongBranchTarget);
        }
        for code in 0x7B..=0x80 {
            assert_eq!(kind_of(code), OperandKind::FieldToken);
        }
        for code in [0x27, 0x28, 0x6F, 0x73, 0xFE06, 0xFE07] {
            assert_eq!(kind_of(code), OperandKind::MethodToken);
        }
        for code in [
            0x70, 0x71, 0x74, 0x75, 0x79, 0x81, 0x8C, 0x8D, 0x8F, 0xA3, 0xA4, 0xA5, 0xC2, 0xC6,
            0xFE15, 0xFE16, 0xFE1C,
        ] {
            assert_eq!(kind_of(code), OperandKind::TypeToken);
        }
        assert_eq!(kind_of(0xD0), OperandKind::GenericToken);
        assert_eq!(kind_of(0x29), OperandKind::GenericToken);
    }

    #[test]
    fn operand_sizes() {
        for kind in OperandKind::iter() {
            match kind {
                OperandKind::Switch => assert_eq!(kind.size(), None),
                _ => assert!(kind.size().is_some()),
            }
        }
        assert_eq!(OperandKind::VarIndex.size(), Some(2));
        assert_eq!(OperandKind::GenericToken.size(), Some(4));
        assert_eq!(OperandKind::COUNT, 16);
        assert!(OperandKind::GenericToken.is_token());
        assert!(!OperandKind::LongBranchTarget.is_token());
    }

    #[test]
    fn operand_kind_display() {
        assert_eq!(OperandKind::ShortBranchTarget.to_string(), "ShortBranchTarget");
        let name: &'static str = OperandKind::ConstByte.into();
        assert_eq!(name, "ConstByte");
    }
}
