//! The machine-instruction intermediate representation.

use crate::addressing::AddressingMode;
use crate::error::SourceSpan;
use crate::expr::ExprValue;
use crate::mnemonic::Mnemonic;

/// An instruction the matcher has committed to a specific opcode. Its size
/// in bytes is recoverable from `opcode` via the opcode table
/// (`opcode::decode`), so it isn't stored redundantly here.
#[derive(Debug, Clone, PartialEq)]
pub struct MCInst {
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    pub opcode: u8,
    pub operand: ExprValue,
    /// Mirrors `Operand::relaxable`: only meaningful for the Absolute
    /// family, and only ever set when the mnemonic has a zero-page
    /// counterpart. An `AddrRef` fixup may only appear on an opcode whose
    /// absolute form has a zero-page counterpart.
    pub relaxable: bool,
    pub high_byte: bool,
    pub span: SourceSpan,
}
