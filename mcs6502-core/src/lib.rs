//! Assembler/disassembler core for the MOS 6502.
//!
//! This crate owns the addressing-mode model, opcode table, operand parser,
//! instruction matcher, encoder, and fixup/relaxation engine, the printer
//! and disassembler, and the statement driver that ties them into a
//! single-source-file assembler. It deliberately does not own object-file
//! emission or a CLI — see the `mcs6502-obj`, `mcs6502-asm`, and
//! `mcs6502-objdump` crates in this workspace.

pub mod addressing;
pub mod disassembler;
pub mod driver;
pub mod encoder;
pub mod error;
pub mod expr;
pub mod fixup;
pub mod inst;
pub mod matcher;
pub mod mnemonic;
pub mod opcode;
pub mod operand;
pub mod printer;

pub use addressing::AddressingMode;
pub use disassembler::{disassemble_all, disassemble_one};
pub use driver::{assemble, AssembleResult};
pub use encoder::{encode, Fragment};
pub use error::{AssemblerError, Diagnostic, SourceSpan};
pub use expr::{ExprContext, ExprOp, ExprValue, SymbolTable};
pub use fixup::{apply_fixup, maybe_relax, Fixup, FixupKind};
pub use inst::MCInst;
pub use matcher::match_instruction;
pub use mnemonic::Mnemonic;
pub use opcode::OpcodeEntry;
pub use operand::{parse_operand, Operand};
pub use printer::print_instruction;
