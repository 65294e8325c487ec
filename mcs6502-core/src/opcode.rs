//! The total function from `(mnemonic, addressing mode)` to `(opcode byte,
//! size, branch?)`, plus decode tables keyed by instruction width for the
//! disassembler.
//!
//! Covers only the official NMOS opcode set; the unofficial/illegal
//! opcodes some NES emulator cores track for cycle-accurate compatibility
//! are out of scope here.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::addressing::AddressingMode;
use crate::mnemonic::Mnemonic;

/// `(mnemonic, addressing mode) -> (opcode byte, size, branch?)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeEntry {
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    pub opcode: u8,
    pub size: usize,
}

macro_rules! entry {
    ($mnemonic:ident, $mode:ident, $opcode:expr) => {
        OpcodeEntry {
            mnemonic: Mnemonic::$mnemonic,
            mode: AddressingMode::$mode,
            opcode: $opcode,
            size: AddressingMode::$mode.instruction_len(),
        }
    };
}

static TABLE: Lazy<Vec<OpcodeEntry>> = Lazy::new(|| {
    use AddressingMode::*;
    use Mnemonic::*;
    vec![
        // ADC
        entry!(ADC, Immediate8, 0x69), entry!(ADC, ZeroPage, 0x65), entry!(ADC, ZeroPageX, 0x75),
        entry!(ADC, Absolute, 0x6D), entry!(ADC, AbsoluteX, 0x7D), entry!(ADC, AbsoluteY, 0x79),
        entry!(ADC, IndirectX, 0x61), entry!(ADC, IndirectY, 0x71),
        // AND
        entry!(AND, Immediate8, 0x29), entry!(AND, ZeroPage, 0x25), entry!(AND, ZeroPageX, 0x35),
        entry!(AND, Absolute, 0x2D), entry!(AND, AbsoluteX, 0x3D), entry!(AND, AbsoluteY, 0x39),
        entry!(AND, IndirectX, 0x21), entry!(AND, IndirectY, 0x31),
        // ASL
        entry!(ASL, Accumulator, 0x0A), entry!(ASL, ZeroPage, 0x06), entry!(ASL, ZeroPageX, 0x16),
        entry!(ASL, Absolute, 0x0E), entry!(ASL, AbsoluteX, 0x1E),
        // Branches
        entry!(BCC, Relative, 0x90), entry!(BCS, Relative, 0xB0), entry!(BEQ, Relative, 0xF0),
        entry!(BMI, Relative, 0x30), entry!(BNE, Relative, 0xD0), entry!(BPL, Relative, 0x10),
        entry!(BVC, Relative, 0x50), entry!(BVS, Relative, 0x70),
        // BIT
        entry!(BIT, ZeroPage, 0x24), entry!(BIT, Absolute, 0x2C),
        // BRK
        entry!(BRK, Implied, 0x00),
        // Flags
        entry!(CLC, Implied, 0x18), entry!(CLD, Implied, 0xD8), entry!(CLI, Implied, 0x58),
        entry!(CLV, Implied, 0xB8), entry!(SEC, Implied, 0x38), entry!(SED, Implied, 0xF8),
        entry!(SEI, Implied, 0x78),
        // CMP / CPX / CPY
        entry!(CMP, Immediate8, 0xC9), entry!(CMP, ZeroPage, 0xC5), entry!(CMP, ZeroPageX, 0xD5),
        entry!(CMP, Absolute, 0xCD), entry!(CMP, AbsoluteX, 0xDD), entry!(CMP, AbsoluteY, 0xD9),
        entry!(CMP, IndirectX, 0xC1), entry!(CMP, IndirectY, 0xD1),
        entry!(CPX, Immediate8, 0xE0), entry!(CPX, ZeroPage, 0xE4), entry!(CPX, Absolute, 0xEC),
        entry!(CPY, Immediate8, 0xC0), entry!(CPY, ZeroPage, 0xC4), entry!(CPY, Absolute, 0xCC),
        // DEC / DEX / DEY
        entry!(DEC, ZeroPage, 0xC6), entry!(DEC, ZeroPageX, 0xD6), entry!(DEC, Absolute, 0xCE),
        entry!(DEC, AbsoluteX, 0xDE),
        entry!(DEX, Implied, 0xCA), entry!(DEY, Implied, 0x88),
        // EOR
        entry!(EOR, Immediate8, 0x49), entry!(EOR, ZeroPage, 0x45), entry!(EOR, ZeroPageX, 0x55),
        entry!(EOR, Absolute, 0x4D), entry!(EOR, AbsoluteX, 0x5D), entry!(EOR, AbsoluteY, 0x59),
        entry!(EOR, IndirectX, 0x41), entry!(EOR, IndirectY, 0x51),
        // INC / INX / INY
        entry!(INC, ZeroPage, 0xE6), entry!(INC, ZeroPageX, 0xF6), entry!(INC, Absolute, 0xEE),
        entry!(INC, AbsoluteX, 0xFE),
        entry!(INX, Implied, 0xE8), entry!(INY, Implied, 0xC8),
        // JMP / JSR
        entry!(JMP, Absolute, 0x4C), entry!(JMP, Indirect, 0x6C),
        entry!(JSR, Absolute, 0x20),
        // LDA / LDX / LDY
        entry!(LDA, Immediate8, 0xA9), entry!(LDA, ZeroPage, 0xA5), entry!(LDA, ZeroPageX, 0xB5),
        entry!(LDA, Absolute, 0xAD), entry!(LDA, AbsoluteX, 0xBD), entry!(LDA, AbsoluteY, 0xB9),
        entry!(LDA, IndirectX, 0xA1), entry!(LDA, IndirectY, 0xB1),
        entry!(LDX, Immediate8, 0xA2), entry!(LDX, ZeroPage, 0xA6), entry!(LDX, ZeroPageY, 0xB6),
        entry!(LDX, Absolute, 0xAE), entry!(LDX, AbsoluteY, 0xBE),
        entry!(LDY, Immediate8, 0xA0), entry!(LDY, ZeroPage, 0xA4), entry!(LDY, ZeroPageX, 0xB4),
        entry!(LDY, Absolute, 0xAC), entry!(LDY, AbsoluteX, 0xBC),
        // LSR
        entry!(LSR, Accumulator, 0x4A), entry!(LSR, ZeroPage, 0x46), entry!(LSR, ZeroPageX, 0x56),
        entry!(LSR, Absolute, 0x4E), entry!(LSR, AbsoluteX, 0x5E),
        // NOP
        entry!(NOP, Implied, 0xEA),
        // ORA
        entry!(ORA, Immediate8, 0x09), entry!(ORA, ZeroPage, 0x05), entry!(ORA, ZeroPageX, 0x15),
        entry!(ORA, Absolute, 0x0D), entry!(ORA, AbsoluteX, 0x1D), entry!(ORA, AbsoluteY, 0x19),
        entry!(ORA, IndirectX, 0x01), entry!(ORA, IndirectY, 0x11),
        // Stack
        entry!(PHA, Implied, 0x48), entry!(PHP, Implied, 0x08),
        entry!(PLA, Implied, 0x68), entry!(PLP, Implied, 0x28),
        // ROL / ROR
        entry!(ROL, Accumulator, 0x2A), entry!(ROL, ZeroPage, 0x26), entry!(ROL, ZeroPageX, 0x36),
        entry!(ROL, Absolute, 0x2E), entry!(ROL, AbsoluteX, 0x3E),
        entry!(ROR, Accumulator, 0x6A), entry!(ROR, ZeroPage, 0x66), entry!(ROR, ZeroPageX, 0x76),
        entry!(ROR, Absolute, 0x6E), entry!(ROR, AbsoluteX, 0x7E),
        // RTI / RTS
        entry!(RTI, Implied, 0x40), entry!(RTS, Implied, 0x60),
        // SBC
        entry!(SBC, Immediate8, 0xE9), entry!(SBC, ZeroPage, 0xE5), entry!(SBC, ZeroPageX, 0xF5),
        entry!(SBC, Absolute, 0xED), entry!(SBC, AbsoluteX, 0xFD), entry!(SBC, AbsoluteY, 0xF9),
        entry!(SBC, IndirectX, 0xE1), entry!(SBC, IndirectY, 0xF1),
        // STA / STX / STY
        entry!(STA, ZeroPage, 0x85), entry!(STA, ZeroPageX, 0x95), entry!(STA, Absolute, 0x8D),
        entry!(STA, AbsoluteX, 0x9D), entry!(STA, AbsoluteY, 0x99),
        entry!(STA, IndirectX, 0x81), entry!(STA, IndirectY, 0x91),
        entry!(STX, ZeroPage, 0x86), entry!(STX, ZeroPageY, 0x96), entry!(STX, Absolute, 0x8E),
        entry!(STY, ZeroPage, 0x84), entry!(STY, ZeroPageX, 0x94), entry!(STY, Absolute, 0x8C),
        // Transfers
        entry!(TAX, Implied, 0xAA), entry!(TAY, Implied, 0xA8), entry!(TSX, Implied, 0xBA),
        entry!(TXA, Implied, 0x8A), entry!(TXS, Implied, 0x9A), entry!(TYA, Implied, 0x98),
    ]
});

/// Keyed by `(mnemonic, addressing mode)`, for the instruction matcher.
static BY_MNEMONIC_MODE: Lazy<HashMap<(Mnemonic, AddressingMode), OpcodeEntry>> = Lazy::new(|| {
    TABLE.iter().map(|e| ((e.mnemonic, e.mode), *e)).collect()
});

/// Keyed by raw opcode byte, split by instruction width, for the
/// disassembler's shortest-match-first decode. The 6502 opcode map happens
/// to be a total, unambiguous function of the byte alone, but the three
/// tables are kept separate (rather than one flat `u8 -> OpcodeEntry` map)
/// because a variant ISA could, in principle, have width-dependent
/// collisions.
static BY_OPCODE_1: Lazy<HashMap<u8, OpcodeEntry>> = Lazy::new(|| by_opcode_of_size(1));
static BY_OPCODE_2: Lazy<HashMap<u8, OpcodeEntry>> = Lazy::new(|| by_opcode_of_size(2));
static BY_OPCODE_3: Lazy<HashMap<u8, OpcodeEntry>> = Lazy::new(|| by_opcode_of_size(3));

fn by_opcode_of_size(size: usize) -> HashMap<u8, OpcodeEntry> {
    TABLE
        .iter()
        .filter(|e| e.size == size)
        .map(|e| (e.opcode, *e))
        .collect()
}

/// Look up the opcode entry for a `(mnemonic, mode)` pair.
pub fn lookup(mnemonic: Mnemonic, mode: AddressingMode) -> Option<OpcodeEntry> {
    BY_MNEMONIC_MODE.get(&(mnemonic, mode)).copied()
}

/// Decode a single opcode byte, trying 1-, then 2-, then 3-byte tables.
pub fn decode(byte: u8) -> Option<(OpcodeEntry, usize)> {
    if let Some(e) = BY_OPCODE_1.get(&byte) {
        return Some((*e, 1));
    }
    if let Some(e) = BY_OPCODE_2.get(&byte) {
        return Some((*e, 2));
    }
    if let Some(e) = BY_OPCODE_3.get(&byte) {
        return Some((*e, 3));
    }
    None
}

/// The zero-page-family opcode for an absolute-family opcode byte, or `op`
/// unchanged if no such relaxation exists. JMP (`0x4C`) and JSR (`0x20`)
/// have no zero-page counterpart and always return themselves: JMP/JSR
/// never relax.
pub fn relaxed_opcode(op: u8) -> u8 {
    let Some((entry, _)) = decode(op) else {
        return op;
    };
    let Some(zp_mode) = entry.mode.zero_page_counterpart() else {
        return op;
    };
    lookup(entry.mnemonic, zp_mode).map_or(op, |zp| zp.opcode)
}
