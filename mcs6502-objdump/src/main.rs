//! `objdump -d`: disassemble an ELF32 6502 object's `.text` section
//! (C12, §4.10). Thin glue over `mcs6502_obj::read_object` and
//! `mcs6502_core`'s disassembler (C8) and printer (C7).

use std::env::args;
use std::fs;
use std::process::exit;

use mcs6502_core::{disassemble_one, print_instruction, ExprValue};
use mcs6502_obj::ObjectFile;

fn usage(program: &str) -> ! {
    eprintln!("USAGE: {} -d <out.o>", program);
    exit(2);
}

fn main() {
    env_logger::init();

    let argv: Vec<String> = args().collect();
    let program = argv.first().map(String::as_str).unwrap_or("objdump");
    if argv.len() != 3 || argv[1] != "-d" {
        usage(program);
    }
    let input_path = &argv[2];

    let bytes = match fs::read(input_path) {
        Ok(b) => b,
        Err(err) => {
            log::error!("{}: {}", input_path, err);
            exit(1);
        }
    };

    let object = match mcs6502_obj::read_object(&bytes) {
        Ok(o) => o,
        Err(err) => {
            log::error!("{}: {}", input_path, err);
            exit(1);
        }
    };

    println!("{}:     file format elf32-mcs6502", input_path);
    println!();
    println!("Disassembly of section .text:");
    println!();
    dump_text(&object);
}

/// Walk `.text` address by address, printing each decoded instruction
/// (§4.6 shortest-match-first). An instruction whose operand byte(s) are
/// covered by a relocation is printed with the symbol's name substituted
/// for the numeric literal, matching `print_instruction`'s existing
/// symbolic-operand rendering (§4.10).
fn dump_text(object: &ObjectFile) {
    let mut offset = 0usize;
    while offset < object.text.len() {
        match disassemble_one(&object.text[offset..]) {
            Ok((mut inst, size)) => {
                if let Some(reloc) = object.relocations.iter().find(|r| r.offset as usize == offset + 1) {
                    inst.operand = ExprValue::Symbol(reloc.symbol.clone());
                }
                let bytes_col: String = object.text[offset..offset + size]
                    .iter()
                    .map(|b| format!("{:02x}", b))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("{:6x}:\t{:<9}\t{}", offset, bytes_col, print_instruction(&inst));
                offset += size;
            }
            Err(err) => {
                println!("{:6x}:\t{:02x}\t\t.byte {:#04x} ; {}", offset, object.text[offset], object.text[offset], err);
                offset += 1;
            }
        }
    }
}
