//! `as`: assemble a 6502 source file into an ELF32 relocatable object.
//! Thin glue over `mcs6502_core::assemble` and `mcs6502_obj::write_object`;
//! all of the interesting work happens in those two crates.

use std::env::args;
use std::fs;
use std::process::exit;

fn usage(program: &str) -> ! {
    eprintln!("USAGE: {} <input.s> -o <out.o>", program);
    exit(2);
}

fn main() {
    env_logger::init();

    let argv: Vec<String> = args().collect();
    let program = argv.first().map(String::as_str).unwrap_or("as");
    if argv.len() != 4 || argv[2] != "-o" {
        usage(program);
    }
    let input_path = &argv[1];
    let output_path = &argv[3];

    let source = match fs::read_to_string(input_path) {
        Ok(s) => s,
        Err(err) => {
            log::error!("{}: {}", input_path, err);
            exit(1);
        }
    };

    let result = mcs6502_core::assemble(&source);
    if !result.diagnostics.is_empty() {
        for diagnostic in &result.diagnostics {
            log::error!("{}: {}", input_path, diagnostic);
        }
        exit(1);
    }

    let symbols: Vec<(String, u32)> =
        result.symbols.entries().map(|(name, value)| (name.to_string(), value as u32)).collect();
    // This single-file driver resolves every fixup against its own symbol
    // table before returning (§4.8's non-goal: no cross-object linking), so
    // there is never an outstanding relocation to emit here — see
    // DESIGN.md. `write_object` still accepts a relocation list so a
    // future multi-file frontend can populate it.
    let object_bytes = mcs6502_obj::write_object(&result.image, &symbols, &[]);

    if let Err(err) = fs::write(output_path, &object_bytes) {
        log::error!("{}: {}", output_path, err);
        exit(1);
    }
    log::info!(
        "assembled {} ({} bytes) -> {} ({} bytes)",
        input_path,
        result.image.len(),
        output_path,
        object_bytes.len()
    );
}
