//! `(mnemonic, operand) -> MCInst`: commit a parsed statement to one opcode.

use crate::addressing::AddressingMode;
use crate::error::{AssemblerError, SourceSpan};
use crate::inst::MCInst;
use crate::mnemonic::Mnemonic;
use crate::opcode;
use crate::operand::Operand;

const ACCUMULATOR_SHIFTS: [Mnemonic; 4] =
    [Mnemonic::ASL, Mnemonic::LSR, Mnemonic::ROL, Mnemonic::ROR];

/// Match a mnemonic and its parsed operand against the opcode table,
/// applying the branch-rewrite and accumulator-shorthand special cases,
/// and commit to a single opcode.
pub fn match_instruction(
    mnemonic: Mnemonic,
    operand: Operand,
) -> Result<MCInst, (AssemblerError, SourceSpan)> {
    let span = operand.span;

    // Historical 6502 convention: ASL/LSR/ROL/ROR with no operand at all
    // mean "operate on the accumulator", same as writing `ASL A` explicitly.
    let mode = if operand.mode == AddressingMode::Implied
        && ACCUMULATOR_SHIFTS.contains(&mnemonic)
    {
        AddressingMode::Accumulator
    } else if mnemonic.is_branch()
        && matches!(operand.mode, AddressingMode::ZeroPage | AddressingMode::Absolute)
    {
        // Branches only ever have one addressing mode; rewrite whatever
        // magnitude-based classification the operand parser produced into
        // Relative, keeping the expression for the PC-relative fixup.
        AddressingMode::Relative
    } else {
        operand.mode
    };

    let entry = opcode::lookup(mnemonic, mode).ok_or_else(|| {
        (
            AssemblerError::NoMatchingAddressingMode { mnemonic: mnemonic.to_string() },
            span,
        )
    })?;

    // Relaxability can only survive onto an opcode whose absolute form
    // actually has a zero-page counterpart.
    let relaxable = operand.relaxable && entry.mode.zero_page_counterpart().is_some();

    Ok(MCInst {
        mnemonic,
        mode: entry.mode,
        opcode: entry.opcode,
        operand: operand.value,
        relaxable,
        high_byte: operand.high_byte,
        span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceSpan;
    use crate::expr::ExprValue;

    fn operand(mode: AddressingMode, value: ExprValue) -> Operand {
        crate::operand::Operand {
            mode,
            value,
            relaxable: false,
            high_byte: false,
            span: SourceSpan::default(),
        }
    }

    #[test]
    fn branch_rewrites_zero_page_operand_to_relative() {
        let op = operand(AddressingMode::ZeroPage, ExprValue::Const(0x10));
        let inst = match_instruction(Mnemonic::BEQ, op).unwrap();
        assert_eq!(inst.mode, AddressingMode::Relative);
        assert_eq!(inst.opcode, 0xF0);
    }

    #[test]
    fn asl_with_no_operand_selects_accumulator_encoding() {
        let op = operand(AddressingMode::Implied, ExprValue::Const(0));
        let inst = match_instruction(Mnemonic::ASL, op).unwrap();
        assert_eq!(inst.mode, AddressingMode::Accumulator);
        assert_eq!(inst.opcode, 0x0A);
    }

    #[test]
    fn ldx_with_wrong_index_register_has_no_match() {
        let op = operand(AddressingMode::ZeroPageX, ExprValue::Const(0x10));
        assert!(matches!(
            match_instruction(Mnemonic::LDX, op),
            Err((AssemblerError::NoMatchingAddressingMode { .. }, _))
        ));
    }

    #[test]
    fn jmp_indirect_never_relaxable() {
        let op = {
            let mut o = operand(AddressingMode::Absolute, ExprValue::Symbol("target".into()));
            o.relaxable = true;
            o
        };
        let inst = match_instruction(Mnemonic::JMP, op).unwrap();
        assert!(!inst.relaxable);
        assert_eq!(inst.opcode, 0x4C);
    }

    #[test]
    fn lda_absolute_symbol_stays_relaxable() {
        let op = {
            let mut o = operand(AddressingMode::Absolute, ExprValue::Symbol("target".into()));
            o.relaxable = true;
            o
        };
        let inst = match_instruction(Mnemonic::LDA, op).unwrap();
        assert!(inst.relaxable);
    }
}
