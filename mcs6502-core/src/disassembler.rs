//! Byte stream → `MCInst`, the inverse of encoding.

use crate::addressing::AddressingMode;
use crate::error::{AssemblerError, SourceSpan};
use crate::expr::ExprValue;
use crate::inst::MCInst;
use crate::opcode;

/// Decode one instruction starting at `bytes[0]`. Returns the instruction
/// and its size in bytes, matching `opcode::decode`'s shortest-match-first
/// procedure: a valid 1-byte instruction is never extended.
pub fn disassemble_one(bytes: &[u8]) -> Result<(MCInst, usize), AssemblerError> {
    let opcode_byte = *bytes.first().ok_or(AssemblerError::UnknownOpcode { byte: 0 })?;
    let (entry, size) = opcode::decode(opcode_byte).ok_or(AssemblerError::UnknownOpcode { byte: opcode_byte })?;
    if bytes.len() < size {
        return Err(AssemblerError::UnknownOpcode { byte: opcode_byte });
    }

    let operand = match entry.mode {
        AddressingMode::Implied | AddressingMode::Accumulator => ExprValue::Const(0),
        AddressingMode::Relative => {
            // Sign-extend the 8-bit PC-relative displacement.
            ExprValue::Const(bytes[1] as i8 as i32)
        }
        AddressingMode::Absolute | AddressingMode::AbsoluteX | AddressingMode::AbsoluteY
        | AddressingMode::Indirect => {
            // Zero-extend the little-endian 16-bit payload.
            let low = bytes[1] as u16;
            let high = bytes[2] as u16;
            ExprValue::Const(((high << 8) | low) as i32)
        }
        _ => {
            // ZeroPage*, Immediate8, IndirectX/Y: zero-extend the 8-bit payload.
            ExprValue::Const(bytes[1] as i32)
        }
    };

    Ok((
        MCInst {
            mnemonic: entry.mnemonic,
            mode: entry.mode,
            opcode: entry.opcode,
            operand,
            relaxable: false,
            high_byte: false,
            span: SourceSpan::default(),
        },
        size,
    ))
}

/// Decode every instruction in `bytes` in sequence, stopping at the first
/// byte that doesn't decode (or the end of the slice).
pub fn disassemble_all(bytes: &[u8]) -> Vec<Result<MCInst, AssemblerError>> {
    let mut out = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        match disassemble_one(&bytes[offset..]) {
            Ok((inst, size)) => {
                offset += size;
                out.push(Ok(inst));
            }
            Err(e) => {
                out.push(Err(e));
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnemonic::Mnemonic;

    #[test]
    fn decodes_immediate_lda() {
        let (inst, size) = disassemble_one(&[0xA9, 0x01]).unwrap();
        assert_eq!(size, 2);
        assert_eq!(inst.mnemonic, Mnemonic::LDA);
        assert_eq!(inst.mode, AddressingMode::Immediate8);
        assert_eq!(inst.operand, ExprValue::Const(1));
    }

    #[test]
    fn decodes_absolute_lda_little_endian() {
        let (inst, size) = disassemble_one(&[0xAD, 0x34, 0x12]).unwrap();
        assert_eq!(size, 3);
        assert_eq!(inst.operand, ExprValue::Const(0x1234));
    }

    #[test]
    fn decodes_branch_with_sign_extension() {
        let (inst, _) = disassemble_one(&[0xF0, 0x82]).unwrap();
        assert_eq!(inst.mode, AddressingMode::Relative);
        assert_eq!(inst.operand, ExprValue::Const(-0x7E));

        let (inst, _) = disassemble_one(&[0xF0, 0x10]).unwrap();
        assert_eq!(inst.operand, ExprValue::Const(0x10));
    }

    #[test]
    fn decodes_implied_as_single_byte() {
        let (inst, size) = disassemble_one(&[0xEA, 0xEA, 0xEA]).unwrap();
        assert_eq!(size, 1);
        assert_eq!(inst.mnemonic, Mnemonic::NOP);
    }

    #[test]
    fn unknown_opcode_byte_fails() {
        // 0x02 has no entry in the official opcode table.
        assert!(disassemble_one(&[0x02]).is_err());
    }

    #[test]
    fn disassemble_all_walks_a_byte_stream() {
        let bytes = [0xA9, 0x01, 0xEA, 0xEA];
        let insts = disassemble_all(&bytes);
        assert_eq!(insts.len(), 3);
        assert!(insts.iter().all(|r| r.is_ok()));
    }
}
