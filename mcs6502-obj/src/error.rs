//! Errors specific to reading/writing the ELF32 object container.
//!
//! Kept separate from `mcs6502_core::AssemblerError`: this crate's failures
//! are about the container format, not about assembly semantics.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ObjError {
    #[error("truncated object file: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("not an ELF file (bad magic)")]
    BadMagic,

    #[error("unexpected e_machine {machine:#06x} (expected {expected:#06x})")]
    WrongMachine { machine: u16, expected: u16 },

    #[error("section `{name}` not found in object file")]
    MissingSection { name: String },

    #[error("malformed relocation type {raw}")]
    BadRelocationType { raw: u32 },

    #[error("symbol index {index} out of range (symtab has {len} entries)")]
    BadSymbolIndex { index: u32, len: usize },
}
