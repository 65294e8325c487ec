//! ELF32 object container for the MOS 6502 assembler toolchain. Writes a
//! relocatable `.o`: a `.text` section holding the assembled image, a
//! `.symtab`/`.strtab` pair for every defined label, and a `.rela.text`
//! entry for every fixup that did not resolve directly to bytes. This
//! crate owns only the container format, not assembly semantics.

mod elf;
mod error;

use std::collections::HashMap;

pub use error::ObjError;

use elf::{Ehdr, Rela, Shdr, Sym};
use mcs6502_core::FixupKind;

/// `FixupKind::AddrRef` never reaches the writer: it is relaxed to
/// `Symbol8` or widened to `Symbol16` before a fragment's fixup is
/// finalized, so there is no `AddrRef` variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationKind {
    Symbol8,
    Symbol16,
    Branch,
}

impl RelocationKind {
    const R_MCS6502_SYMBOL8: u32 = 1;
    const R_MCS6502_SYMBOL16: u32 = 2;
    const R_MCS6502_BRANCH: u32 = 3;

    fn to_raw(self) -> u32 {
        match self {
            RelocationKind::Symbol8 => Self::R_MCS6502_SYMBOL8,
            RelocationKind::Symbol16 => Self::R_MCS6502_SYMBOL16,
            RelocationKind::Branch => Self::R_MCS6502_BRANCH,
        }
    }

    fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            Self::R_MCS6502_SYMBOL8 => Some(RelocationKind::Symbol8),
            Self::R_MCS6502_SYMBOL16 => Some(RelocationKind::Symbol16),
            Self::R_MCS6502_BRANCH => Some(RelocationKind::Branch),
            _ => None,
        }
    }
}

impl TryFrom<FixupKind> for RelocationKind {
    type Error = ();

    fn try_from(kind: FixupKind) -> Result<Self, Self::Error> {
        match kind {
            FixupKind::Symbol8 => Ok(RelocationKind::Symbol8),
            FixupKind::Symbol16 => Ok(RelocationKind::Symbol16),
            FixupKind::Branch => Ok(RelocationKind::Branch),
            FixupKind::AddrRef => Err(()),
        }
    }
}

/// One `.rela.text` entry: a fixup that could not be folded directly into
/// `.text` bytes because its symbol was not resolved by the driver (this
/// toolchain's single-file `as` never produces these in practice, but the
/// writer supports them for object files produced by a future multi-file
/// frontend).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElfRelocation {
    pub offset: u32,
    pub symbol: String,
    pub kind: RelocationKind,
    pub addend: i32,
}

/// The result of reading an object file back: `.text` bytes, every symbol
/// with its resolved value, and any relocations still outstanding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectFile {
    pub text: Vec<u8>,
    pub symbols: Vec<(String, u32)>,
    pub relocations: Vec<ElfRelocation>,
}

const SECTION_NAMES: [&str; 6] = ["", ".text", ".symtab", ".strtab", ".rela.text", ".shstrtab"];
const SH_TEXT: usize = 1;
const SH_SYMTAB: usize = 2;
const SH_STRTAB: usize = 3;
const SH_RELA_TEXT: usize = 4;
const SH_SHSTRTAB: usize = 5;

/// Write `image` plus `symbols` and `relocations` as an ELF32 relocatable
/// object. `symbols` need not be sorted; output order is stable (insertion
/// order of the caller's slice).
pub fn write_object(image: &[u8], symbols: &[(String, u32)], relocations: &[ElfRelocation]) -> Vec<u8> {
    log::debug!(
        "writing object: {} bytes of .text, {} symbols, {} relocations",
        image.len(),
        symbols.len(),
        relocations.len()
    );

    let mut shstrtab = Vec::new();
    let name_offsets: Vec<u32> =
        SECTION_NAMES.iter().map(|n| elf::strtab_push(&mut shstrtab, n)).collect();

    let mut strtab = vec![0u8]; // index 0 is always the empty string.
    let mut symtab = Vec::new();
    symtab.extend_from_slice(&Sym { st_name: 0, st_value: 0, st_shndx: 0 }.to_bytes(0, 0));
    let mut symbol_index = HashMap::new();
    for (i, (name, value)) in symbols.iter().enumerate() {
        let st_name = elf::strtab_push(&mut strtab, name);
        symtab.extend_from_slice(
            &Sym { st_name, st_value: *value, st_shndx: SH_TEXT as u16 }
                .to_bytes(elf::STB_GLOBAL, elf::STT_NOTYPE),
        );
        symbol_index.insert(name.as_str(), (i + 1) as u32);
    }

    let mut rela = Vec::new();
    for reloc in relocations {
        let sym_idx = *symbol_index.get(reloc.symbol.as_str()).unwrap_or(&0);
        rela.extend_from_slice(
            &Rela {
                r_offset: reloc.offset,
                symbol_index: sym_idx,
                reloc_type: reloc.kind.to_raw(),
                r_addend: reloc.addend,
            }
            .to_bytes(),
        );
    }

    let mut out = Vec::new();
    let text_off = elf::EHDR_SIZE as u32;
    let symtab_off = text_off + image.len() as u32;
    let strtab_off = symtab_off + symtab.len() as u32;
    let rela_off = strtab_off + strtab.len() as u32;
    let shstrtab_off = rela_off + rela.len() as u32;
    let shoff = shstrtab_off + shstrtab.len() as u32;

    out.extend_from_slice(
        &Ehdr {
            e_type: elf::ET_REL,
            e_machine: elf::EM_MCS6502,
            e_shoff: shoff,
            e_shnum: SECTION_NAMES.len() as u16,
            e_shstrndx: SH_SHSTRTAB as u16,
        }
        .to_bytes(),
    );
    out.extend_from_slice(image);
    out.extend_from_slice(&symtab);
    out.extend_from_slice(&strtab);
    out.extend_from_slice(&rela);
    out.extend_from_slice(&shstrtab);

    let shdrs = [
        Shdr::default(), // SHT_NULL
        Shdr {
            sh_name: name_offsets[SH_TEXT],
            sh_type: elf::SHT_PROGBITS,
            sh_flags: elf::SHF_ALLOC | elf::SHF_EXECINSTR,
            sh_offset: text_off,
            sh_size: image.len() as u32,
            ..Default::default()
        },
        Shdr {
            sh_name: name_offsets[SH_SYMTAB],
            sh_type: elf::SHT_SYMTAB,
            sh_offset: symtab_off,
            sh_size: symtab.len() as u32,
            sh_link: SH_STRTAB as u32,
            sh_info: 1, // index of the first non-local symbol
            sh_entsize: elf::SYM_SIZE as u32,
            ..Default::default()
        },
        Shdr {
            sh_name: name_offsets[SH_STRTAB],
            sh_type: elf::SHT_STRTAB,
            sh_offset: strtab_off,
            sh_size: strtab.len() as u32,
            ..Default::default()
        },
        Shdr {
            sh_name: name_offsets[SH_RELA_TEXT],
            sh_type: elf::SHT_RELA,
            sh_offset: rela_off,
            sh_size: rela.len() as u32,
            sh_link: SH_SYMTAB as u32,
            sh_info: SH_TEXT as u32,
            sh_entsize: elf::RELA_SIZE as u32,
            ..Default::default()
        },
        Shdr {
            sh_name: name_offsets[SH_SHSTRTAB],
            sh_type: elf::SHT_STRTAB,
            sh_offset: shstrtab_off,
            sh_size: shstrtab.len() as u32,
            ..Default::default()
        },
    ];
    for shdr in &shdrs {
        out.extend_from_slice(&shdr.to_bytes());
    }
    out
}

/// Read an object file back (the `objdump` CLI's entry point into this
/// crate): locate `.text`, `.symtab`/`.strtab`, and `.rela.text` by name
/// and return their decoded contents.
pub fn read_object(bytes: &[u8]) -> Result<ObjectFile, ObjError> {
    if bytes.len() < elf::EHDR_SIZE {
        return Err(ObjError::Truncated { expected: elf::EHDR_SIZE, actual: bytes.len() });
    }
    let ehdr = Ehdr::from_bytes(bytes).ok_or(ObjError::BadMagic)?;
    if ehdr.e_machine != elf::EM_MCS6502 {
        return Err(ObjError::WrongMachine { machine: ehdr.e_machine, expected: elf::EM_MCS6502 });
    }

    let shoff = ehdr.e_shoff as usize;
    let shnum = ehdr.e_shnum as usize;
    let shdrs: Vec<Shdr> = (0..shnum)
        .map(|i| {
            let start = shoff + i * elf::SHDR_SIZE;
            Shdr::from_bytes(&bytes[start..start + elf::SHDR_SIZE])
        })
        .collect();

    let shstrtab_bytes = section_bytes(bytes, &shdrs[ehdr.e_shstrndx as usize]);
    let find = |name: &str| -> Result<&Shdr, ObjError> {
        shdrs
            .iter()
            .find(|s| elf::strtab_read(shstrtab_bytes, s.sh_name) == name)
            .ok_or_else(|| ObjError::MissingSection { name: name.to_string() })
    };

    let text = section_bytes(bytes, find(".text")?).to_vec();
    let strtab = section_bytes(bytes, find(".strtab")?);
    let symtab_bytes = section_bytes(bytes, find(".symtab")?);

    let sym_count = symtab_bytes.len() / elf::SYM_SIZE;
    let mut symbols = Vec::new();
    let mut names_by_index = Vec::with_capacity(sym_count);
    for i in 0..sym_count {
        let raw = &symtab_bytes[i * elf::SYM_SIZE..(i + 1) * elf::SYM_SIZE];
        let sym = Sym::from_bytes(raw);
        let name = elf::strtab_read(strtab, sym.st_name);
        if i > 0 {
            symbols.push((name.clone(), sym.st_value));
        }
        names_by_index.push(name);
    }

    let mut relocations = Vec::new();
    if let Ok(rela_shdr) = find(".rela.text") {
        let rela_bytes = section_bytes(bytes, rela_shdr);
        let count = rela_bytes.len() / elf::RELA_SIZE;
        for i in 0..count {
            let raw = &rela_bytes[i * elf::RELA_SIZE..(i + 1) * elf::RELA_SIZE];
            let rela = Rela::from_bytes(raw);
            let kind = RelocationKind::from_raw(rela.reloc_type)
                .ok_or(ObjError::BadRelocationType { raw: rela.reloc_type })?;
            let symbol = names_by_index.get(rela.symbol_index as usize).cloned().ok_or(
                ObjError::BadSymbolIndex { index: rela.symbol_index, len: names_by_index.len() },
            )?;
            relocations.push(ElfRelocation { offset: rela.r_offset, symbol, kind, addend: rela.r_addend });
        }
    }

    Ok(ObjectFile { text, symbols, relocations })
}

fn section_bytes<'a>(bytes: &'a [u8], shdr: &Shdr) -> &'a [u8] {
    let start = shdr.sh_offset as usize;
    let end = start + shdr.sh_size as usize;
    &bytes[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_text_and_symbols_with_no_relocations() {
        let image = vec![0xA9, 0x01, 0xEA, 0xEA];
        let symbols = vec![("start".to_string(), 0u32), ("loop".to_string(), 2u32)];
        let bytes = write_object(&image, &symbols, &[]);

        let obj = read_object(&bytes).unwrap();
        assert_eq!(obj.text, image);
        assert_eq!(obj.symbols.len(), 2);
        assert!(obj.symbols.contains(&("start".to_string(), 0)));
        assert!(obj.symbols.contains(&("loop".to_string(), 2)));
        assert!(obj.relocations.is_empty());
    }

    #[test]
    fn round_trips_a_relocation_against_a_known_symbol() {
        let image = vec![0x4C, 0x00, 0x00]; // JMP $0000 (placeholder)
        let symbols = vec![("target".to_string(), 0x1234u32)];
        let relocations = vec![ElfRelocation {
            offset: 1,
            symbol: "target".to_string(),
            kind: RelocationKind::Symbol16,
            addend: 0,
        }];
        let bytes = write_object(&image, &symbols, &relocations);

        let obj = read_object(&bytes).unwrap();
        assert_eq!(obj.relocations.len(), 1);
        assert_eq!(obj.relocations[0].symbol, "target");
        assert_eq!(obj.relocations[0].kind, RelocationKind::Symbol16);
        assert_eq!(obj.relocations[0].offset, 1);
    }

    #[test]
    fn rejects_wrong_machine_type() {
        let mut bytes = write_object(&[0xEA], &[], &[]);
        bytes[18] = 0x00; // corrupt e_machine low byte
        bytes[19] = 0x00;
        assert!(matches!(read_object(&bytes), Err(ObjError::WrongMachine { .. })));
    }

    #[test]
    fn rejects_truncated_input() {
        assert!(matches!(read_object(&[0x7F, b'E', b'L', b'F']), Err(ObjError::Truncated { .. })));
    }

    #[test]
    fn empty_program_round_trips() {
        let bytes = write_object(&[], &[], &[]);
        let obj = read_object(&bytes).unwrap();
        assert!(obj.text.is_empty());
        assert!(obj.symbols.is_empty());
        assert!(obj.relocations.is_empty());
    }

    #[test]
    fn fixupkind_addrref_has_no_relocation_mapping() {
        assert!(RelocationKind::try_from(FixupKind::AddrRef).is_err());
        assert_eq!(RelocationKind::try_from(FixupKind::Symbol8), Ok(RelocationKind::Symbol8));
        assert_eq!(RelocationKind::try_from(FixupKind::Symbol16), Ok(RelocationKind::Symbol16));
        assert_eq!(RelocationKind::try_from(FixupKind::Branch), Ok(RelocationKind::Branch));
    }
}
