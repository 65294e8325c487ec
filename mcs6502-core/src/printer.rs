//! `MCInst` → textual assembly.

use crate::addressing::AddressingMode;
use crate::expr::ExprValue;
use crate::inst::MCInst;

/// Render `inst` in canonical textual form. When the operand is still a
/// symbolic expression, its rendered text takes the numeric literal's
/// place, keeping the surrounding punctuation untouched.
pub fn print_instruction(inst: &MCInst) -> String {
    let mnemonic = inst.mnemonic.to_string();
    match inst.mode {
        AddressingMode::Implied => mnemonic,
        AddressingMode::Accumulator => format!("{mnemonic} A"),
        AddressingMode::Immediate8 => format!("{mnemonic} #{}", render_hex(&inst.operand, 2)),
        AddressingMode::ZeroPage => format!("{mnemonic} {}", render_hex(&inst.operand, 2)),
        AddressingMode::ZeroPageX => format!("{mnemonic} {}, X", render_hex(&inst.operand, 2)),
        AddressingMode::ZeroPageY => format!("{mnemonic} {}, Y", render_hex(&inst.operand, 2)),
        AddressingMode::Absolute => format!("{mnemonic} {}", render_hex(&inst.operand, 4)),
        AddressingMode::AbsoluteX => format!("{mnemonic} {}, X", render_hex(&inst.operand, 4)),
        AddressingMode::AbsoluteY => format!("{mnemonic} {}, Y", render_hex(&inst.operand, 4)),
        AddressingMode::Indirect => format!("{mnemonic} ({})", render_hex(&inst.operand, 4)),
        AddressingMode::IndirectX => format!("{mnemonic} ({}, X)", render_hex(&inst.operand, 2)),
        AddressingMode::IndirectY => format!("{mnemonic} ({}), Y", render_hex(&inst.operand, 2)),
        AddressingMode::Relative => format!("{mnemonic} #{}", render_decimal(&inst.operand)),
    }
}

fn render_hex(value: &ExprValue, width_nibbles: usize) -> String {
    match value.try_const() {
        Some(v) => {
            let mask: i64 = if width_nibbles == 2 { 0xFF } else { 0xFFFF };
            format!("0x{:0width$x}", (v as i64) & mask, width = width_nibbles)
        }
        None => value.render(),
    }
}

fn render_decimal(value: &ExprValue) -> String {
    match value.try_const() {
        Some(v) => v.to_string(),
        None => value.render(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceSpan;
    use crate::mnemonic::Mnemonic;

    fn inst(mnemonic: Mnemonic, mode: AddressingMode, operand: ExprValue) -> MCInst {
        MCInst {
            mnemonic,
            mode,
            opcode: 0,
            operand,
            relaxable: false,
            high_byte: false,
            span: SourceSpan::default(),
        }
    }

    #[test]
    fn implied_prints_bare_mnemonic() {
        assert_eq!(print_instruction(&inst(Mnemonic::CLC, AddressingMode::Implied, ExprValue::Const(0))), "CLC");
    }

    #[test]
    fn accumulator_prints_trailing_a() {
        assert_eq!(
            print_instruction(&inst(Mnemonic::ASL, AddressingMode::Accumulator, ExprValue::Const(0))),
            "ASL A"
        );
    }

    #[test]
    fn immediate_prints_two_hex_digits() {
        assert_eq!(
            print_instruction(&inst(Mnemonic::LDA, AddressingMode::Immediate8, ExprValue::Const(1))),
            "LDA #0x01"
        );
    }

    #[test]
    fn absolute_indexed_prints_four_hex_digits_and_register() {
        assert_eq!(
            print_instruction(&inst(Mnemonic::LDA, AddressingMode::AbsoluteX, ExprValue::Const(0x1234))),
            "LDA 0x1234, X"
        );
    }

    #[test]
    fn indirect_forms_print_expected_punctuation() {
        assert_eq!(
            print_instruction(&inst(Mnemonic::JMP, AddressingMode::Indirect, ExprValue::Const(0x1234))),
            "JMP (0x1234)"
        );
        assert_eq!(
            print_instruction(&inst(Mnemonic::STA, AddressingMode::IndirectX, ExprValue::Const(0x20))),
            "STA (0x20, X)"
        );
        assert_eq!(
            print_instruction(&inst(Mnemonic::STA, AddressingMode::IndirectY, ExprValue::Const(0x20))),
            "STA (0x20), Y"
        );
    }

    #[test]
    fn relative_prints_signed_decimal_not_hex() {
        assert_eq!(
            print_instruction(&inst(Mnemonic::BEQ, AddressingMode::Relative, ExprValue::Const(-0x7E))),
            "BEQ #-126"
        );
    }

    #[test]
    fn unresolved_symbol_substitutes_for_the_literal() {
        assert_eq!(
            print_instruction(&inst(
                Mnemonic::LDA,
                AddressingMode::Absolute,
                ExprValue::Symbol("target".into())
            )),
            "LDA target"
        );
    }
}
