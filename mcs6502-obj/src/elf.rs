//! Byte-level ELF32 structure layout: header, section header, symbol table
//! entry, and RELA entry sizes/offsets, little-endian throughout. Plain
//! structs with `to_bytes`/`from_bytes`, no derive-based binary codec.

pub const EI_NIDENT: usize = 16;
pub const ELFCLASS32: u8 = 1;
pub const ELFDATA2LSB: u8 = 1;
pub const EV_CURRENT: u8 = 1;

pub const ET_REL: u16 = 1;

/// Placeholder machine type for the MOS 6502 (§6): chosen outside the
/// range of real `EM_*` constants registered with the ELF spec, so this
/// never collides with an actual architecture's object files.
pub const EM_MCS6502: u16 = 0xFEA5;

pub const SHT_NULL: u32 = 0;
pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_RELA: u32 = 4;

pub const SHF_ALLOC: u32 = 0x2;
pub const SHF_EXECINSTR: u32 = 0x4;

pub const STB_GLOBAL: u8 = 1;
pub const STT_NOTYPE: u8 = 0;

pub const EHDR_SIZE: usize = 52;
pub const SHDR_SIZE: usize = 40;
pub const SYM_SIZE: usize = 16;
pub const RELA_SIZE: usize = 12;

/// `Elf32_Ehdr`.
pub struct Ehdr {
    pub e_type: u16,
    pub e_machine: u16,
    pub e_shoff: u32,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

impl Ehdr {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(EHDR_SIZE);
        out.extend_from_slice(&[0x7F, b'E', b'L', b'F']);
        out.push(ELFCLASS32);
        out.push(ELFDATA2LSB);
        out.push(EV_CURRENT);
        out.resize(EI_NIDENT, 0); // OSABI, ABI version, padding all zero.
        out.extend_from_slice(&self.e_type.to_le_bytes());
        out.extend_from_slice(&self.e_machine.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes()); // e_version
        out.extend_from_slice(&0u32.to_le_bytes()); // e_entry
        out.extend_from_slice(&0u32.to_le_bytes()); // e_phoff
        out.extend_from_slice(&self.e_shoff.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // e_flags
        out.extend_from_slice(&(EHDR_SIZE as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // e_phentsize
        out.extend_from_slice(&0u16.to_le_bytes()); // e_phnum
        out.extend_from_slice(&(SHDR_SIZE as u16).to_le_bytes());
        out.extend_from_slice(&self.e_shnum.to_le_bytes());
        out.extend_from_slice(&self.e_shstrndx.to_le_bytes());
        debug_assert_eq!(out.len(), EHDR_SIZE);
        out
    }

    pub fn from_bytes(b: &[u8]) -> Option<Self> {
        if b.len() < EHDR_SIZE || b[0..4] != [0x7F, b'E', b'L', b'F'] {
            return None;
        }
        if b[4] != ELFCLASS32 || b[5] != ELFDATA2LSB {
            return None;
        }
        Some(Ehdr {
            e_type: u16::from_le_bytes([b[16], b[17]]),
            e_machine: u16::from_le_bytes([b[18], b[19]]),
            e_shoff: u32::from_le_bytes([b[32], b[33], b[34], b[35]]),
            e_shnum: u16::from_le_bytes([b[48], b[49]]),
            e_shstrndx: u16::from_le_bytes([b[50], b[51]]),
        })
    }
}

/// `Elf32_Shdr`.
#[derive(Clone, Copy, Default)]
pub struct Shdr {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u32,
    pub sh_offset: u32,
    pub sh_size: u32,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_entsize: u32,
}

impl Shdr {
    pub fn to_bytes(&self) -> [u8; SHDR_SIZE] {
        let mut out = [0u8; SHDR_SIZE];
        out[0..4].copy_from_slice(&self.sh_name.to_le_bytes());
        out[4..8].copy_from_slice(&self.sh_type.to_le_bytes());
        out[8..12].copy_from_slice(&self.sh_flags.to_le_bytes());
        out[12..16].copy_from_slice(&0u32.to_le_bytes()); // sh_addr
        out[16..20].copy_from_slice(&self.sh_offset.to_le_bytes());
        out[20..24].copy_from_slice(&self.sh_size.to_le_bytes());
        out[24..28].copy_from_slice(&self.sh_link.to_le_bytes());
        out[28..32].copy_from_slice(&self.sh_info.to_le_bytes());
        out[32..36].copy_from_slice(&1u32.to_le_bytes()); // sh_addralign
        out[36..40].copy_from_slice(&self.sh_entsize.to_le_bytes());
        out
    }

    pub fn from_bytes(b: &[u8]) -> Shdr {
        Shdr {
            sh_name: u32::from_le_bytes(b[0..4].try_into().unwrap()),
            sh_type: u32::from_le_bytes(b[4..8].try_into().unwrap()),
            sh_flags: u32::from_le_bytes(b[8..12].try_into().unwrap()),
            sh_offset: u32::from_le_bytes(b[16..20].try_into().unwrap()),
            sh_size: u32::from_le_bytes(b[20..24].try_into().unwrap()),
            sh_link: u32::from_le_bytes(b[24..28].try_into().unwrap()),
            sh_info: u32::from_le_bytes(b[28..32].try_into().unwrap()),
            sh_entsize: u32::from_le_bytes(b[36..40].try_into().unwrap()),
        }
    }
}

/// `Elf32_Sym`.
pub struct Sym {
    pub st_name: u32,
    pub st_value: u32,
    pub st_shndx: u16,
}

impl Sym {
    pub fn to_bytes(&self, binding: u8, sym_type: u8) -> [u8; SYM_SIZE] {
        let mut out = [0u8; SYM_SIZE];
        out[0..4].copy_from_slice(&self.st_name.to_le_bytes());
        out[4..8].copy_from_slice(&self.st_value.to_le_bytes());
        out[8..12].copy_from_slice(&0u32.to_le_bytes()); // st_size
        out[12] = (binding << 4) | (sym_type & 0xF);
        out[13] = 0; // st_other
        out[14..16].copy_from_slice(&self.st_shndx.to_le_bytes());
        out
    }

    pub fn from_bytes(b: &[u8]) -> Sym {
        Sym {
            st_name: u32::from_le_bytes(b[0..4].try_into().unwrap()),
            st_value: u32::from_le_bytes(b[4..8].try_into().unwrap()),
            st_shndx: u16::from_le_bytes(b[14..16].try_into().unwrap()),
        }
    }
}

/// `Elf32_Rela`.
pub struct Rela {
    pub r_offset: u32,
    pub symbol_index: u32,
    pub reloc_type: u32,
    pub r_addend: i32,
}

impl Rela {
    pub fn to_bytes(&self) -> [u8; RELA_SIZE] {
        let mut out = [0u8; RELA_SIZE];
        let r_info = (self.symbol_index << 8) | (self.reloc_type & 0xFF);
        out[0..4].copy_from_slice(&self.r_offset.to_le_bytes());
        out[4..8].copy_from_slice(&r_info.to_le_bytes());
        out[8..12].copy_from_slice(&self.r_addend.to_le_bytes());
        out
    }

    pub fn from_bytes(b: &[u8]) -> Rela {
        let r_info = u32::from_le_bytes(b[4..8].try_into().unwrap());
        Rela {
            r_offset: u32::from_le_bytes(b[0..4].try_into().unwrap()),
            symbol_index: r_info >> 8,
            reloc_type: r_info & 0xFF,
            r_addend: i32::from_le_bytes(b[8..12].try_into().unwrap()),
        }
    }
}

/// Append `name` plus a terminating NUL to a string table buffer, returning
/// the offset at which it was written.
pub fn strtab_push(table: &mut Vec<u8>, name: &str) -> u32 {
    let offset = table.len() as u32;
    table.extend_from_slice(name.as_bytes());
    table.push(0);
    offset
}

/// Read a NUL-terminated string out of a string table at `offset`.
pub fn strtab_read(table: &[u8], offset: u32) -> String {
    let start = offset as usize;
    let end = table[start..].iter().position(|&b| b == 0).map_or(table.len(), |p| start + p);
    String::from_utf8_lossy(&table[start..end]).into_owned()
}
