//! The fixed NMOS 6502 mnemonic set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AssemblerError;

/// One of the 56 canonical NMOS 6502 mnemonics.
///
/// Unofficial/illegal opcodes are out of scope: stock NMOS opcode set
/// only, not the documented-plus-illegal superset some emulator cores
/// track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum Mnemonic {
    ADC, AND, ASL, BCC, BCS, BEQ, BIT, BMI, BNE, BPL, BRK, BVC, BVS,
    CLC, CLD, CLI, CLV, CMP, CPX, CPY,
    DEC, DEX, DEY, EOR, INC, INX, INY,
    JMP, JSR,
    LDA, LDX, LDY, LSR, NOP, ORA,
    PHA, PHP, PLA, PLP, ROL, ROR, RTI, RTS,
    SBC, SEC, SED, SEI, STA, STX, STY,
    TAX, TAY, TSX, TXA, TXS, TYA,
}

impl Mnemonic {
    pub const ALL: [Mnemonic; 56] = [
        Mnemonic::ADC, Mnemonic::AND, Mnemonic::ASL, Mnemonic::BCC, Mnemonic::BCS,
        Mnemonic::BEQ, Mnemonic::BIT, Mnemonic::BMI, Mnemonic::BNE, Mnemonic::BPL,
        Mnemonic::BRK, Mnemonic::BVC, Mnemonic::BVS, Mnemonic::CLC, Mnemonic::CLD,
        Mnemonic::CLI, Mnemonic::CLV, Mnemonic::CMP, Mnemonic::CPX, Mnemonic::CPY,
        Mnemonic::DEC, Mnemonic::DEX, Mnemonic::DEY, Mnemonic::EOR, Mnemonic::INC,
        Mnemonic::INX, Mnemonic::INY, Mnemonic::JMP, Mnemonic::JSR, Mnemonic::LDA,
        Mnemonic::LDX, Mnemonic::LDY, Mnemonic::LSR, Mnemonic::NOP, Mnemonic::ORA,
        Mnemonic::PHA, Mnemonic::PHP, Mnemonic::PLA, Mnemonic::PLP, Mnemonic::ROL,
        Mnemonic::ROR, Mnemonic::RTI, Mnemonic::RTS, Mnemonic::SBC, Mnemonic::SEC,
        Mnemonic::SED, Mnemonic::SEI, Mnemonic::STA, Mnemonic::STX, Mnemonic::STY,
        Mnemonic::TAX, Mnemonic::TAY, Mnemonic::TSX, Mnemonic::TXA, Mnemonic::TXS,
        Mnemonic::TYA,
    ];

    /// Branch mnemonics take only `Relative` operands.
    pub fn is_branch(&self) -> bool {
        matches!(
            self,
            Mnemonic::BCC
                | Mnemonic::BCS
                | Mnemonic::BEQ
                | Mnemonic::BMI
                | Mnemonic::BNE
                | Mnemonic::BPL
                | Mnemonic::BVC
                | Mnemonic::BVS
        )
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Mnemonic {
    type Err = AssemblerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Ok(match upper.as_str() {
            "ADC" => Mnemonic::ADC,
            "AND" => Mnemonic::AND,
            "ASL" => Mnemonic::ASL,
            "BCC" => Mnemonic::BCC,
            "BCS" => Mnemonic::BCS,
            "BEQ" => Mnemonic::BEQ,
            "BIT" => Mnemonic::BIT,
            "BMI" => Mnemonic::BMI,
            "BNE" => Mnemonic::BNE,
            "BPL" => Mnemonic::BPL,
            "BRK" => Mnemonic::BRK,
            "BVC" => Mnemonic::BVC,
            "BVS" => Mnemonic::BVS,
            "CLC" => Mnemonic::CLC,
            "CLD" => Mnemonic::CLD,
            "CLI" => Mnemonic::CLI,
            "CLV" => Mnemonic::CLV,
            "CMP" => Mnemonic::CMP,
            "CPX" => Mnemonic::CPX,
            "CPY" => Mnemonic::CPY,
            "DEC" => Mnemonic::DEC,
            "DEX" => Mnemonic::DEX,
            "DEY" => Mnemonic::DEY,
            "EOR" => Mnemonic::EOR,
            "INC" => Mnemonic::INC,
            "INX" => Mnemonic::INX,
            "INY" => Mnemonic::INY,
            "JMP" => Mnemonic::JMP,
            "JSR" => Mnemonic::JSR,
            "LDA" => Mnemonic::LDA,
            "LDX" => Mnemonic::LDX,
            "LDY" => Mnemonic::LDY,
            "LSR" => Mnemonic::LSR,
            "NOP" => Mnemonic::NOP,
            "ORA" => Mnemonic::ORA,
            "PHA" => Mnemonic::PHA,
            "PHP" => Mnemonic::PHP,
            "PLA" => Mnemonic::PLA,
            "PLP" => Mnemonic::PLP,
            "ROL" => Mnemonic::ROL,
            "ROR" => Mnemonic::ROR,
            "RTI" => Mnemonic::RTI,
            "RTS" => Mnemonic::RTS,
            "SBC" => Mnemonic::SBC,
            "SEC" => Mnemonic::SEC,
            "SED" => Mnemonic::SED,
            "SEI" => Mnemonic::SEI,
            "STA" => Mnemonic::STA,
            "STX" => Mnemonic::STX,
            "STY" => Mnemonic::STY,
            "TAX" => Mnemonic::TAX,
            "TAY" => Mnemonic::TAY,
            "TSX" => Mnemonic::TSX,
            "TXA" => Mnemonic::TXA,
            "TXS" => Mnemonic::TXS,
            "TYA" => Mnemonic::TYA,
            _ => return Err(AssemblerError::UnrecognizedMnemonic { mnemonic: s.to_string() }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_mnemonic() {
        for m in Mnemonic::ALL {
            let text = m.to_string();
            let parsed: Mnemonic = text.parse().unwrap();
            assert_eq!(parsed, m);
        }
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!("lda".parse::<Mnemonic>().unwrap(), Mnemonic::LDA);
        assert_eq!("Lda".parse::<Mnemonic>().unwrap(), Mnemonic::LDA);
    }

    #[test]
    fn rejects_unknown_mnemonic() {
        assert!(matches!(
            "FOO".parse::<Mnemonic>(),
            Err(AssemblerError::UnrecognizedMnemonic { .. })
        ));
    }

    #[test]
    fn branch_set_matches_spec() {
        let branches = [
            Mnemonic::BCC, Mnemonic::BCS, Mnemonic::BEQ, Mnemonic::BMI,
            Mnemonic::BNE, Mnemonic::BPL, Mnemonic::BVC, Mnemonic::BVS,
        ];
        for m in Mnemonic::ALL {
            assert_eq!(m.is_branch(), branches.contains(&m));
        }
    }
}
