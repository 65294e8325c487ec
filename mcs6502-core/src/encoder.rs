//! Turn a matched `MCInst` into its byte fragment, deferring anything that
//! depends on a symbol's final address to a `Fixup`.

use crate::addressing::AddressingMode;
use crate::fixup::{Fixup, FixupKind};
use crate::inst::MCInst;

/// One instruction's encoded bytes, plus the fixup (if any) still needed
/// before those bytes are final.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub bytes: Vec<u8>,
    pub fixup: Option<Fixup>,
}

/// Encode `inst` to its fragment. Resolved operands (`ExprValue::try_const`
/// succeeds) are written directly; anything still symbolic gets a zero
/// placeholder and an accompanying `Fixup` for the layout pass to apply.
pub fn encode(inst: &MCInst) -> Fragment {
    let len = inst.mode.instruction_len();
    let mut bytes = vec![0u8; len];
    bytes[0] = inst.opcode;

    if inst.mode == AddressingMode::Implied || inst.mode == AddressingMode::Accumulator {
        return Fragment { bytes, fixup: None };
    }

    if inst.mode == AddressingMode::Relative {
        // The branch target's delta depends on this instruction's own
        // address, which isn't known until layout — always defer, even
        // when the expression already folds to a constant.
        let fixup = Fixup::new(FixupKind::Branch, inst.operand.clone(), false, inst.span);
        return Fragment { bytes, fixup: Some(fixup) };
    }

    if let Some(value) = inst.operand.try_const() {
        write_resolved(&mut bytes, inst, value);
        return Fragment { bytes, fixup: None };
    }

    let kind = match inst.mode {
        AddressingMode::Absolute | AddressingMode::AbsoluteX | AddressingMode::AbsoluteY => {
            if inst.relaxable {
                FixupKind::AddrRef
            } else {
                FixupKind::Symbol16
            }
        }
        AddressingMode::Indirect => FixupKind::Symbol16,
        _ => FixupKind::Symbol8,
    };
    let fixup = Fixup::new(kind, inst.operand.clone(), inst.high_byte, inst.span);
    Fragment { bytes, fixup: Some(fixup) }
}

fn write_resolved(bytes: &mut [u8], inst: &MCInst, value: i32) {
    match inst.mode {
        AddressingMode::Immediate8 if inst.high_byte => {
            bytes[1] = ((value >> 8) & 0xFF) as u8;
        }
        AddressingMode::Absolute | AddressingMode::AbsoluteX | AddressingMode::AbsoluteY
        | AddressingMode::Indirect => {
            let v = value as u32;
            bytes[1] = (v & 0xFF) as u8;
            bytes[2] = ((v >> 8) & 0xFF) as u8;
        }
        _ => {
            bytes[1] = (value & 0xFF) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceSpan;
    use crate::expr::ExprValue;
    use crate::mnemonic::Mnemonic;

    fn inst(mode: AddressingMode, opcode: u8, operand: ExprValue, relaxable: bool) -> MCInst {
        MCInst {
            mnemonic: Mnemonic::LDA,
            mode,
            opcode,
            operand,
            relaxable,
            high_byte: false,
            span: SourceSpan::default(),
        }
    }

    #[test]
    fn resolved_zero_page_writes_one_byte_directly() {
        let i = inst(AddressingMode::ZeroPage, 0xA5, ExprValue::Const(0x10), false);
        let frag = encode(&i);
        assert_eq!(frag.bytes, vec![0xA5, 0x10]);
        assert!(frag.fixup.is_none());
    }

    #[test]
    fn resolved_absolute_writes_little_endian() {
        let i = inst(AddressingMode::Absolute, 0xAD, ExprValue::Const(0x1234), false);
        let frag = encode(&i);
        assert_eq!(frag.bytes, vec![0xAD, 0x34, 0x12]);
    }

    #[test]
    fn unresolved_absolute_relaxable_gets_addrref_fixup() {
        let i = inst(
            AddressingMode::Absolute,
            0xAD,
            ExprValue::Symbol("target".into()),
            true,
        );
        let frag = encode(&i);
        assert_eq!(frag.bytes, vec![0xAD, 0x00, 0x00]);
        assert_eq!(frag.fixup.unwrap().kind, FixupKind::AddrRef);
    }

    #[test]
    fn unresolved_indirect_gets_symbol16_never_addrref() {
        let i = inst(
            AddressingMode::Indirect,
            0x6C,
            ExprValue::Symbol("vec".into()),
            false,
        );
        let frag = encode(&i);
        assert_eq!(frag.fixup.unwrap().kind, FixupKind::Symbol16);
    }

    #[test]
    fn relative_always_defers_to_branch_fixup() {
        let i = inst(AddressingMode::Relative, 0xF0, ExprValue::Const(0x10), false);
        let frag = encode(&i);
        assert_eq!(frag.bytes, vec![0xF0, 0x00]);
        assert_eq!(frag.fixup.unwrap().kind, FixupKind::Branch);
    }

    #[test]
    fn implied_has_no_operand_bytes() {
        let i = inst(AddressingMode::Implied, 0xEA, ExprValue::Const(0), false);
        let frag = encode(&i);
        assert_eq!(frag.bytes, vec![0xEA]);
        assert!(frag.fixup.is_none());
    }

    #[test]
    fn resolved_high_byte_immediate_shifts_value() {
        let mut i = inst(AddressingMode::Immediate8, 0xA9, ExprValue::Const(0x1234), false);
        i.high_byte = true;
        let frag = encode(&i);
        assert_eq!(frag.bytes, vec![0xA9, 0x12]);
    }
}
