//! The 13 MOS 6502 addressing modes.
//!
//! `Operand` carries an instruction's *syntactic* shape as parsed from
//! source text; this enum carries its *encoded* shape once a mnemonic and
//! operand have been matched to a concrete opcode.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate8,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

impl AddressingMode {
    /// Total instruction size in bytes, including the opcode byte.
    pub fn instruction_len(&self) -> usize {
        use AddressingMode::*;
        match self {
            Implied | Accumulator => 1,
            Immediate8 | ZeroPage | ZeroPageX | ZeroPageY | IndirectX | IndirectY | Relative => 2,
            Absolute | AbsoluteX | AbsoluteY | Indirect => 3,
        }
    }

    /// The zero-page-indexed counterpart of an indexed absolute mode, if any.
    pub fn zero_page_counterpart(&self) -> Option<AddressingMode> {
        match self {
            AddressingMode::Absolute => Some(AddressingMode::ZeroPage),
            AddressingMode::AbsoluteX => Some(AddressingMode::ZeroPageX),
            AddressingMode::AbsoluteY => Some(AddressingMode::ZeroPageY),
            _ => None,
        }
    }
}
