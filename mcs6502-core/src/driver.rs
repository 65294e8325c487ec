//! The statement driver: turns a source file into a byte image and a
//! resolved symbol table through an iterative layout that relaxes every
//! eligible fragment to a fixpoint before any fixup is finally applied.

use std::collections::HashSet;

use crate::encoder;
use crate::error::{AssemblerError, Diagnostic, SourceSpan};
use crate::expr::{ExprContext, ExprOp, ExprValue, SymbolTable};
use crate::fixup::{self, Fixup, FixupKind};
use crate::matcher;
use crate::mnemonic::Mnemonic;
use crate::operand;

const NOP_OPCODE: u8 = 0xEA;

/// One parsed source line, split into its label, mnemonic, and remaining
/// operand text. `.org` is recognized here as a pseudo-mnemonic; everything
/// else is handed to the operand parser, matcher, and encoder in turn.
struct Line<'a> {
    label: Option<&'a str>,
    mnemonic: Option<&'a str>,
    operand_text: &'a str,
}

fn is_label_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn split_line(raw: &str) -> Line<'_> {
    let without_comment = match raw.find(';') {
        Some(i) => &raw[..i],
        None => raw,
    };
    let trimmed = without_comment.trim();
    if trimmed.is_empty() {
        return Line { label: None, mnemonic: None, operand_text: "" };
    }

    let (label, rest) = match trimmed.find(':') {
        Some(colon) if is_label_token(&trimmed[..colon]) => {
            (Some(&trimmed[..colon]), trimmed[colon + 1..].trim_start())
        }
        _ => (None, trimmed),
    };

    if rest.is_empty() {
        return Line { label, mnemonic: None, operand_text: "" };
    }

    let (mnemonic, operand_text) = match rest.find(char::is_whitespace) {
        Some(i) => (&rest[..i], rest[i..].trim()),
        None => (rest, ""),
    };
    Line { label, mnemonic: Some(mnemonic), operand_text }
}

/// One statement's worth of layout state. Labels and `.org` directives carry
/// no bytes of their own; they only perturb where the next `Code` item
/// lands. A `Code` item's `bytes` can still shrink after it is first
/// encoded, once `AddrRef` relaxation resolves its symbol to a zero-page
/// value.
enum Item {
    Label { name: String, span: SourceSpan },
    Org { text: String, span: SourceSpan },
    Code { bytes: Vec<u8>, fixup: Option<Fixup> },
}

/// The finished result of assembling one source file: the byte image laid
/// out from `base_address`, the resolved symbol table, and every
/// diagnostic reported along the way. A non-empty `diagnostics` means the
/// caller should treat the assembly as failed.
pub struct AssembleResult {
    pub image: Vec<u8>,
    pub base_address: u16,
    pub symbols: SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
}

/// Run the full pipeline over `source`: line lexing, then per statement
/// parse operand, match instruction, and encode into an `Item` list, then an
/// iterative layout that relaxes fragments to a fixpoint before a final
/// pass applies every fixup and writes the image.
pub fn assemble(source: &str) -> AssembleResult {
    let base_address: u16 = 0;
    let mut items: Vec<Item> = Vec::new();
    let mut diagnostics = Vec::new();
    let mut seen_labels: HashSet<String> = HashSet::new();

    // No label is registered here: every symbol reference, forward or
    // backward, stays symbolic through parsing and is only resolved once
    // the layout below has addresses to offer it.
    let unresolved = SymbolTable::new();

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx as u32 + 1;
        let parsed = split_line(raw_line);

        if let Some(label) = parsed.label {
            let span = SourceSpan::new(line_no, 1, label.len() as u32);
            if seen_labels.insert(label.to_string()) {
                items.push(Item::Label { name: label.to_string(), span });
            } else {
                diagnostics.push(Diagnostic::new(
                    AssemblerError::DuplicateLabel { label: label.to_string() },
                    span,
                ));
            }
        }

        let Some(mnemonic_text) = parsed.mnemonic else { continue };
        let span = SourceSpan::new(line_no, 1, raw_line.len() as u32);

        if mnemonic_text.eq_ignore_ascii_case(".org") {
            items.push(Item::Org { text: parsed.operand_text.to_string(), span });
            continue;
        }

        let mnemonic: Mnemonic = match mnemonic_text.parse() {
            Ok(m) => m,
            Err(e) => {
                diagnostics.push(Diagnostic::new(e, span));
                continue;
            }
        };

        let operand = match operand::parse_operand(parsed.operand_text, span, &unresolved) {
            Ok(o) => o,
            Err((e, s)) => {
                diagnostics.push(Diagnostic::new(e, s));
                continue;
            }
        };

        let inst = match matcher::match_instruction(mnemonic, operand) {
            Ok(i) => i,
            Err((e, s)) => {
                diagnostics.push(Diagnostic::new(e, s));
                continue;
            }
        };

        let fragment = encoder::encode(&inst);
        items.push(Item::Code { bytes: fragment.bytes, fixup: fragment.fixup });
    }

    // Relax to a fixpoint: recompute every item's address from the current
    // fragment sizes, rebuild the symbol table from those addresses, then
    // shrink every `AddrRef` fragment that now resolves to a byte. Shrinking
    // only ever removes bytes, so each round either shrinks something or
    // this terminates.
    let mut symbols = SymbolTable::new();
    loop {
        let addresses = compute_addresses(&items, &symbols, base_address, None);
        symbols = symbols_from_addresses(&items, &addresses);

        let mut shrank = false;
        for item in items.iter_mut() {
            if let Item::Code { bytes, fixup: Some(fx) } = item {
                if fx.kind == FixupKind::AddrRef {
                    if let Some(value) = resolve_expr(&fx.expr, &symbols) {
                        let before = bytes.len();
                        fixup::maybe_relax(bytes, fx, value);
                        shrank |= bytes.len() < before;
                    }
                }
            }
        }
        if !shrank {
            break;
        }
    }

    // Addresses are now stable. Recompute them once more (this time keeping
    // `.org` diagnostics, suppressed above to avoid false rewinds against
    // the oversized provisional addresses of earlier rounds), then apply
    // every fixup against that stable layout and write the image.
    let addresses = compute_addresses(&items, &symbols, base_address, Some(&mut diagnostics));
    let symbols = symbols_from_addresses(&items, &addresses);
    apply_fixups(&mut items, &addresses, &symbols, &mut diagnostics);
    let image = build_image(&items, &addresses, base_address);

    AssembleResult { image, base_address, symbols, diagnostics }
}

/// Walk `items` in order, tracking the address each one lands at. `.org`
/// moves the cursor forward (never back); labels and code fragments record
/// their current address but only code advances it, by its current byte
/// length. Diagnostics for an invalid or rewinding `.org` are only
/// collected when `diagnostics` is `Some` — the caller skips them on every
/// round but the last, since earlier rounds see addresses that are still
/// shrinking.
fn compute_addresses(
    items: &[Item],
    symbols: &SymbolTable,
    base_address: u16,
    mut diagnostics: Option<&mut Vec<Diagnostic>>,
) -> Vec<u16> {
    let mut addresses = vec![0u16; items.len()];
    let mut address = base_address;

    for (i, item) in items.iter().enumerate() {
        addresses[i] = address;
        match item {
            Item::Label { .. } => {}
            Item::Code { bytes, .. } => {
                address = address.wrapping_add(bytes.len() as u16);
            }
            Item::Org { text, span } => match symbols.eval(text).try_const() {
                Some(v) if (0..=0xFFFF).contains(&v) => {
                    if (v as u16) < address {
                        if let Some(diags) = diagnostics.as_deref_mut() {
                            diags.push(Diagnostic::new(
                                AssemblerError::OrgRewind { current: address, requested: v as u16 },
                                *span,
                            ));
                        }
                    } else {
                        address = v as u16;
                    }
                }
                Some(v) => {
                    if let Some(diags) = diagnostics.as_deref_mut() {
                        diags.push(Diagnostic::new(AssemblerError::OperandOutOfRange { value: v as i64 }, *span));
                    }
                }
                None => {
                    if let Some(diags) = diagnostics.as_deref_mut() {
                        diags.push(Diagnostic::new(
                            AssemblerError::InvalidOperandSyntax { text: text.clone() },
                            *span,
                        ));
                    }
                }
            },
        }
    }

    addresses
}

/// Rebuild a fresh symbol table from this round's label addresses. Labels
/// were already deduplicated during parsing, so every `define` here
/// succeeds.
fn symbols_from_addresses(items: &[Item], addresses: &[u16]) -> SymbolTable {
    let mut symbols = SymbolTable::new();
    for (item, &address) in items.iter().zip(addresses) {
        if let Item::Label { name, .. } = item {
            symbols.define(name, address as i32);
        }
    }
    symbols
}

fn resolve_expr(expr: &ExprValue, symbols: &SymbolTable) -> Option<i32> {
    match expr {
        ExprValue::Const(v) => Some(*v),
        ExprValue::Symbol(name) => symbols.lookup(name),
        ExprValue::BinOp(lhs, op, rhs) => {
            let l = resolve_expr(lhs, symbols)?;
            let r = resolve_expr(rhs, symbols)?;
            Some(match op {
                ExprOp::Add => l + r,
                ExprOp::Sub => l - r,
            })
        }
    }
}

/// Resolve every fragment's fixup against the stable symbol table and
/// apply it in place. `addresses` gives each item's final address, needed
/// for the branch-delta computation.
fn apply_fixups(items: &mut [Item], addresses: &[u16], symbols: &SymbolTable, diagnostics: &mut Vec<Diagnostic>) {
    for (item, &address) in items.iter_mut().zip(addresses) {
        let Item::Code { bytes, fixup } = item else { continue };
        let Some(mut fx) = fixup.take() else { continue };

        let value = match resolve_expr(&fx.expr, symbols) {
            Some(v) => v,
            None => {
                let symbol = fx.expr.free_symbol().unwrap_or_default().to_string();
                diagnostics.push(Diagnostic::new(AssemblerError::UndefinedSymbol { symbol }, fx.span));
                continue;
            }
        };

        let applied_value = if fx.kind == FixupKind::Branch {
            value - (address as i32 + bytes.len() as i32)
        } else {
            value
        };

        if fx.kind == FixupKind::AddrRef {
            fixup::maybe_relax(bytes, &mut fx, value);
        }

        if let Err(e) = fixup::apply_fixup(bytes, &fx, applied_value) {
            diagnostics.push(Diagnostic::new(e, fx.span));
        }
    }
}

/// Concatenate every code fragment into the final image at its resolved
/// address, padding any gap a forward `.org` left behind with NOPs, one
/// byte at a time.
fn build_image(items: &[Item], addresses: &[u16], base_address: u16) -> Vec<u8> {
    let mut image = Vec::new();
    let mut cursor = base_address;
    for (item, &address) in items.iter().zip(addresses) {
        let Item::Code { bytes, .. } = item else { continue };
        while cursor < address {
            image.push(NOP_OPCODE);
            cursor = cursor.wrapping_add(1);
        }
        image.extend_from_slice(bytes);
        cursor = cursor.wrapping_add(bytes.len() as u16);
    }
    image
}
