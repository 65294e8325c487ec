//! The error taxonomy for parsing, matching, encoding and layout, plus the
//! driver-level errors a runnable assembler needs beyond per-instruction
//! failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A half-open `[line, line+len)` style pointer into source text, attached
/// to operands, instructions and fixups so diagnostics can report where
/// they came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    pub line: u32,
    pub column: u32,
    pub len: u32,
}

impl SourceSpan {
    pub fn new(line: u32, column: u32, len: u32) -> Self {
        Self { line, column, len }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssemblerError {
    #[error("unrecognized mnemonic `{mnemonic}`")]
    UnrecognizedMnemonic { mnemonic: String },

    #[error("invalid operand syntax at `{text}`")]
    InvalidOperandSyntax { text: String },

    #[error("operand `{value}` out of range")]
    OperandOutOfRange { value: i64 },

    #[error("`{mnemonic}` has no addressing mode matching this operand")]
    NoMatchingAddressingMode { mnemonic: String },

    #[error("invalid indirect index register `{register}`")]
    InvalidIndirectIndex { register: String },

    #[error("trailing garbage after operand: `{text}`")]
    TrailingGarbage { text: String },

    #[error("branch target out of range: delta {delta} does not fit in i8")]
    BranchOutOfRange { delta: i32 },

    /// Fatal: a fixup was constructed with an offset/size combination the
    /// encoder never produces. Indicates a bug in the core, not bad input.
    #[error("invalid fixup kind (programmer error)")]
    InvalidFixupKind,

    #[error("symbol `{symbol}` was never defined")]
    UndefinedSymbol { symbol: String },

    #[error("label `{label}` is already defined")]
    DuplicateLabel { label: String },

    #[error(".org may not rewind the address below {current:#06x} (requested {requested:#06x})")]
    OrgRewind { current: u16, requested: u16 },

    #[error("no instruction decodes from opcode byte {byte:#04x}")]
    UnknownOpcode { byte: u8 },
}

/// One reported error together with the source span it applies to. The
/// statement driver accumulates these instead of aborting the whole run on
/// the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub error: AssemblerError,
    pub span: SourceSpan,
}

impl Diagnostic {
    pub fn new(error: AssemblerError, span: SourceSpan) -> Self {
        Self { error, span }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.span.line, self.span.column, self.error)
    }
}
