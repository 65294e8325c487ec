//! Tokens → typed operand.
//!
//! The grammar itself (`operand.pest`) only recognizes surface *shape*
//! (is it parenthesized, indexed, prefixed with `#`/`/`?); this module does
//! the magnitude-based classification, consulting an `ExprContext` to
//! resolve the expression text but never the opcode table — that's the
//! matcher's job.

use pest::Parser;
use pest_derive::Parser;

use crate::addressing::AddressingMode;
use crate::error::{AssemblerError, SourceSpan};
use crate::expr::{ExprContext, ExprValue};

#[derive(Parser)]
#[grammar = "operand.pest"]
struct OperandParser;

/// A parsed operand: its addressing mode, its value (resolved or still
/// symbolic), and the bookkeeping the encoder and relaxation engine need.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    pub mode: AddressingMode,
    pub value: ExprValue,
    /// Set when the operand was written in bare/indexed/indirect position
    /// with a still-symbolic expression: the matcher picked the widest
    /// (Absolute-family) form and the encoder must record an `AddrRef`
    /// fixup rather than a plain `Symbol16`.
    pub relaxable: bool,
    /// Set for the `/expr` reserved high-byte-immediate syntax: the
    /// encoder must emit `(expr >> 8) & 0xFF` rather than `expr & 0xFF`.
    pub high_byte: bool,
    pub span: SourceSpan,
}

impl Operand {
    fn new(mode: AddressingMode, value: ExprValue, span: SourceSpan) -> Self {
        Self { mode, value, relaxable: false, high_byte: false, span }
    }
}

const ZERO_PAGE_RANGE: std::ops::Range<i32> = 0..0x100;
const ZERO_PAGE_NEGATIVE_RANGE: std::ops::RangeInclusive<i32> = -0x80..=-1;
const FULL_RANGE_LOW: i32 = -0x80;
const FULL_RANGE_HIGH: i32 = 0xFFFF;

fn is_zero_page_magnitude(v: i32) -> bool {
    ZERO_PAGE_RANGE.contains(&v) || ZERO_PAGE_NEGATIVE_RANGE.contains(&v)
}

fn check_range(v: i32, span: SourceSpan) -> Result<(), (AssemblerError, SourceSpan)> {
    if v < FULL_RANGE_LOW || v > FULL_RANGE_HIGH {
        Err((AssemblerError::OperandOutOfRange { value: v as i64 }, span))
    } else {
        Ok(())
    }
}

/// Parse the operand text following a mnemonic. `ctx` resolves expression
/// text to constants or symbols; it is not mutated here.
pub fn parse_operand(
    text: &str,
    span: SourceSpan,
    ctx: &dyn ExprContext,
) -> Result<Operand, (AssemblerError, SourceSpan)> {
    let trimmed = text.trim();
    let operand_pair = match OperandParser::parse(Rule::operand, trimmed) {
        Ok(mut pairs) => pairs.next().expect("operand rule always produces one pair"),
        Err(_) => return Err(classify_unparseable(trimmed, span)),
    };
    let Some(shape) = operand_pair.into_inner().next() else {
        // Nothing but SOI/EOI matched: empty operand, i.e. Implied.
        return Ok(Operand::new(AddressingMode::Implied, ExprValue::Const(0), span));
    };

    match shape.as_rule() {
        Rule::accumulator_only => Ok(Operand::new(AddressingMode::Accumulator, ExprValue::Const(0), span)),

        Rule::immediate => {
            let expr_text = shape.into_inner().next().unwrap().as_str();
            let value = ctx.eval(expr_text);
            if let Some(v) = value.try_const() {
                check_range(v, span)?;
            }
            Ok(Operand::new(AddressingMode::Immediate8, value, span))
        }

        Rule::immediate_hi => {
            let expr_text = shape.into_inner().next().unwrap().as_str();
            let value = ctx.eval(expr_text);
            if let Some(v) = value.try_const() {
                check_range(v, span)?;
            }
            let mut operand = Operand::new(AddressingMode::Immediate8, value, span);
            operand.high_byte = true;
            Ok(operand)
        }

        Rule::indexed_indirect => {
            let mut inner = shape.into_inner();
            let expr_text = inner.next().unwrap().as_str();
            let reg = inner.next().unwrap().as_str();
            if !reg.eq_ignore_ascii_case("x") {
                return Err((
                    AssemblerError::InvalidIndirectIndex { register: reg.to_string() },
                    span,
                ));
            }
            let value = ctx.eval(expr_text);
            if let Some(v) = value.try_const() {
                if !is_zero_page_magnitude(v) {
                    return Err((AssemblerError::OperandOutOfRange { value: v as i64 }, span));
                }
            }
            Ok(Operand::new(AddressingMode::IndirectX, value, span))
        }

        Rule::indirect_indexed => {
            let mut inner = shape.into_inner();
            let expr_text = inner.next().unwrap().as_str();
            let reg = inner.next().unwrap().as_str();
            if !reg.eq_ignore_ascii_case("y") {
                return Err((
                    AssemblerError::InvalidIndirectIndex { register: reg.to_string() },
                    span,
                ));
            }
            let value = ctx.eval(expr_text);
            if let Some(v) = value.try_const() {
                if !is_zero_page_magnitude(v) {
                    return Err((AssemblerError::OperandOutOfRange { value: v as i64 }, span));
                }
            }
            Ok(Operand::new(AddressingMode::IndirectY, value, span))
        }

        Rule::indirect => {
            let expr_text = shape.into_inner().next().unwrap().as_str();
            let value = ctx.eval(expr_text);
            if let Some(v) = value.try_const() {
                check_range(v, span)?;
            }
            Ok(Operand::new(AddressingMode::Indirect, value, span))
        }

        Rule::indexed => {
            let mut inner = shape.into_inner();
            let expr_text = inner.next().unwrap().as_str();
            let reg = inner.next().unwrap().as_str();
            let value = ctx.eval(expr_text);
            classify_indexed(value, reg, span)
        }

        Rule::bare => {
            let expr_text = shape.as_str();
            let value = ctx.eval(expr_text);
            classify_bare(value, span)
        }

        _ => unreachable!("operand grammar has no other top-level alternative"),
    }
}

/// Distinguish "not an operand shape at all" (`InvalidOperandSyntax`) from
/// "a valid shape followed by leftover tokens" (`TrailingGarbage`).
fn classify_unparseable(trimmed: &str, span: SourceSpan) -> (AssemblerError, SourceSpan) {
    match OperandParser::parse(Rule::operand_prefix, trimmed) {
        Ok(mut pairs) => {
            let consumed = pairs.next().map(|p| p.as_span().end()).unwrap_or(0);
            let remainder = trimmed[consumed..].trim_start();
            if remainder.is_empty() {
                (AssemblerError::InvalidOperandSyntax { text: trimmed.to_string() }, span)
            } else {
                (AssemblerError::TrailingGarbage { text: remainder.to_string() }, span)
            }
        }
        Err(_) => (AssemblerError::InvalidOperandSyntax { text: trimmed.to_string() }, span),
    }
}

fn classify_bare(value: ExprValue, span: SourceSpan) -> Result<Operand, (AssemblerError, SourceSpan)> {
    match value.try_const() {
        Some(v) => {
            check_range(v, span)?;
            if is_zero_page_magnitude(v) {
                Ok(Operand::new(AddressingMode::ZeroPage, value, span))
            } else {
                Ok(Operand::new(AddressingMode::Absolute, value, span))
            }
        }
        None => {
            // Symbolic: widest compatible surface form, flagged relaxable.
            let mut operand = Operand::new(AddressingMode::Absolute, value, span);
            operand.relaxable = true;
            Ok(operand)
        }
    }
}

fn classify_indexed(
    value: ExprValue,
    reg: &str,
    span: SourceSpan,
) -> Result<Operand, (AssemblerError, SourceSpan)> {
    let is_x = reg.eq_ignore_ascii_case("x");
    let is_y = reg.eq_ignore_ascii_case("y");
    if !is_x && !is_y {
        return Err((AssemblerError::InvalidOperandSyntax { text: format!(",{}", reg) }, span));
    }
    match value.try_const() {
        Some(v) => {
            check_range(v, span)?;
            let mode = match (is_zero_page_magnitude(v), is_x) {
                (true, true) => AddressingMode::ZeroPageX,
                (true, false) => AddressingMode::ZeroPageY,
                (false, true) => AddressingMode::AbsoluteX,
                (false, false) => AddressingMode::AbsoluteY,
            };
            Ok(Operand::new(mode, value, span))
        }
        None => {
            let mode = if is_x { AddressingMode::AbsoluteX } else { AddressingMode::AbsoluteY };
            let mut operand = Operand::new(mode, value, span);
            operand.relaxable = true;
            Ok(operand)
        }
    }
}
