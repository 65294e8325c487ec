//! Carries unresolved references through layout, relaxes absolute
//! addressing to zero-page when the final value fits in 8 bits, and
//! patches encoded bytes in place.

use crate::error::{AssemblerError, SourceSpan};
use crate::expr::ExprValue;
use crate::opcode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixupKind {
    Branch,
    Symbol8,
    Symbol16,
    AddrRef,
}

impl FixupKind {
    /// `(target_offset_bits, target_size_bits)` of the payload this fixup
    /// patches. The offset is always 8: every instruction's opcode occupies the low
    /// 8 bits of the fragment, and every fixup payload starts right after it.
    fn offset_and_size_bits(self) -> (u32, u32) {
        match self {
            FixupKind::Branch => (8, 8),
            FixupKind::Symbol8 => (8, 8),
            FixupKind::Symbol16 => (8, 16),
            FixupKind::AddrRef => (8, 16),
        }
    }

    fn byte_span(self) -> usize {
        let (offset, size) = self.offset_and_size_bits();
        ((offset + size) as usize).div_ceil(8)
    }
}

/// A deferred patch against a fragment's bytes, pending symbol resolution.
/// `offset` is always 0 for single-instruction fragments; it is kept as an
/// explicit field rather than assumed so a future multi-instruction
/// fragment could use a nonzero value.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixup {
    pub offset: usize,
    pub kind: FixupKind,
    pub expr: ExprValue,
    /// Set for the `/expr` high-byte-immediate syntax: the resolved value
    /// is shifted right 8 bits and masked before being applied.
    pub high_byte: bool,
    pub span: SourceSpan,
}

impl Fixup {
    pub fn new(kind: FixupKind, expr: ExprValue, high_byte: bool, span: SourceSpan) -> Self {
        Self { offset: 0, kind, expr, high_byte, span }
    }
}

/// If `fragment` carries an `AddrRef` fixup whose resolved `value` fits in
/// a byte, shrink it to the zero-page encoding and reclassify the fixup as
/// `Symbol8`. Idempotent: calling this again on an already-shrunk fragment
/// (kind already `Symbol8`) is a no-op.
pub fn maybe_relax(bytes: &mut Vec<u8>, fixup: &mut Fixup, value: i32) {
    if fixup.kind != FixupKind::AddrRef {
        return;
    }
    if !(0..=0xFF).contains(&value) {
        return;
    }
    let relaxed = opcode::relaxed_opcode(bytes[0]);
    if relaxed == bytes[0] {
        return;
    }
    bytes[0] = relaxed;
    bytes.truncate(2);
    fixup.kind = FixupKind::Symbol8;
}

/// Apply a resolved fixup value to a fragment's bytes. `value` is the
/// PC-relative delta for `Branch` fixups, and the absolute resolved
/// operand value for every other kind.
pub fn apply_fixup(bytes: &mut [u8], fixup: &Fixup, value: i32) -> Result<(), AssemblerError> {
    if value == 0 {
        // Zero is the placeholder default the encoder already wrote.
        return Ok(());
    }

    let applied_value = if fixup.high_byte { (value >> 8) & 0xFF } else { value };

    if fixup.kind == FixupKind::Branch {
        if !(-0x80..=0x7F).contains(&value) {
            return Err(AssemblerError::BranchOutOfRange { delta: value });
        }
    }

    let (offset_bits, _) = fixup.kind.offset_and_size_bits();
    let shifted = (applied_value as i64) << offset_bits;
    let byte_count = fixup.kind.byte_span();
    for i in 0..byte_count {
        let idx = fixup.offset + i;
        if idx >= bytes.len() {
            return Err(AssemblerError::InvalidFixupKind);
        }
        let contribution = ((shifted >> (i * 8)) & 0xFF) as u8;
        bytes[idx] |= contribution;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceSpan;

    fn fixup(kind: FixupKind) -> Fixup {
        Fixup::new(kind, ExprValue::Const(0), false, SourceSpan::default())
    }

    #[test]
    fn symbol8_fixup_only_touches_payload_byte() {
        let mut bytes = vec![0xA5, 0x00]; // LDA zp, placeholder
        apply_fixup(&mut bytes, &fixup(FixupKind::Symbol8), 0x12).unwrap();
        assert_eq!(bytes, vec![0xA5, 0x12]);
    }

    #[test]
    fn symbol16_fixup_writes_little_endian() {
        let mut bytes = vec![0xAD, 0x00, 0x00]; // LDA absolute, placeholder
        apply_fixup(&mut bytes, &fixup(FixupKind::Symbol16), 0x1234).unwrap();
        assert_eq!(bytes, vec![0xAD, 0x34, 0x12]);
    }

    #[test]
    fn branch_fixup_writes_signed_byte() {
        let mut bytes = vec![0xF0, 0x00]; // BEQ, placeholder
        apply_fixup(&mut bytes, &fixup(FixupKind::Branch), 0x10).unwrap();
        assert_eq!(bytes, vec![0xF0, 0x10]);

        let mut bytes = vec![0xF0, 0x00];
        apply_fixup(&mut bytes, &fixup(FixupKind::Branch), -0x7E).unwrap();
        assert_eq!(bytes, vec![0xF0, 0x82]);
    }

    #[test]
    fn branch_fixup_out_of_range_is_rejected() {
        let mut bytes = vec![0xF0, 0x00];
        assert!(matches!(
            apply_fixup(&mut bytes, &fixup(FixupKind::Branch), 0x80),
            Err(AssemblerError::BranchOutOfRange { .. })
        ));
        assert!(matches!(
            apply_fixup(&mut bytes, &fixup(FixupKind::Branch), -0x81),
            Err(AssemblerError::BranchOutOfRange { .. })
        ));
    }

    #[test]
    fn relaxation_shrinks_addrref_and_reclassifies_as_symbol8() {
        let mut bytes = vec![0xBD, 0x00, 0x00]; // LDA absolute,X placeholder
        let mut fx = fixup(FixupKind::AddrRef);
        maybe_relax(&mut bytes, &mut fx, 0x00A0);
        assert_eq!(fx.kind, FixupKind::Symbol8);
        assert_eq!(bytes, vec![0xB5, 0x00]); // relaxed to zero page,X

        apply_fixup(&mut bytes, &fx, 0x00A0).unwrap();
        assert_eq!(bytes, vec![0xB5, 0xA0]);
    }

    #[test]
    fn relaxation_leaves_large_values_absolute() {
        let mut bytes = vec![0xBD, 0x00, 0x00];
        let mut fx = fixup(FixupKind::AddrRef);
        maybe_relax(&mut bytes, &mut fx, 0x1234);
        assert_eq!(fx.kind, FixupKind::AddrRef);
        assert_eq!(bytes.len(), 3);
    }

    #[test]
    fn relaxation_is_idempotent() {
        let mut bytes = vec![0xBD, 0x00, 0x00];
        let mut fx = fixup(FixupKind::AddrRef);
        maybe_relax(&mut bytes, &mut fx, 0x00A0);
        let bytes_after_first = bytes.clone();
        maybe_relax(&mut bytes, &mut fx, 0x00A0);
        assert_eq!(bytes, bytes_after_first);
    }

    #[test]
    fn zero_value_leaves_fragment_untouched() {
        let mut bytes = vec![0xAD, 0x00, 0x00];
        apply_fixup(&mut bytes, &fixup(FixupKind::Symbol16), 0).unwrap();
        assert_eq!(bytes, vec![0xAD, 0x00, 0x00]);
    }
}
