//! Expression evaluation and symbol resolution. `ExprContext` is the trait
//! the operand parser consumes to resolve an expression's token text;
//! `SymbolTable` is the concrete implementation that makes the CLI
//! binaries and tests runnable. A full multi-term expression grammar is
//! deliberately not attempted here — this evaluator only ever folds a
//! single `+`/`-` against one symbol or literal.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The value an operand's expression carries before it either folds to a
/// plain integer or stays symbolic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExprValue {
    Const(i32),
    Symbol(String),
    BinOp(Box<ExprValue>, ExprOp, Box<ExprValue>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExprOp {
    Add,
    Sub,
}

impl ExprValue {
    /// Fold to a constant if every symbol referenced is already resolved.
    pub fn try_const(&self) -> Option<i32> {
        match self {
            ExprValue::Const(v) => Some(*v),
            ExprValue::Symbol(_) => None,
            ExprValue::BinOp(lhs, op, rhs) => {
                let l = lhs.try_const()?;
                let r = rhs.try_const()?;
                Some(match op {
                    ExprOp::Add => l + r,
                    ExprOp::Sub => l - r,
                })
            }
        }
    }

    /// The first (and, for this grammar's single-symbol subset, only)
    /// symbol name this expression still depends on.
    pub fn free_symbol(&self) -> Option<&str> {
        match self {
            ExprValue::Const(_) => None,
            ExprValue::Symbol(name) => Some(name),
            ExprValue::BinOp(lhs, _, rhs) => lhs.free_symbol().or_else(|| rhs.free_symbol()),
        }
    }

    /// Render for the printer when an operand stayed symbolic.
    pub fn render(&self) -> String {
        match self {
            ExprValue::Const(v) => format!("{:#x}", v),
            ExprValue::Symbol(name) => name.clone(),
            ExprValue::BinOp(lhs, op, rhs) => {
                let op_char = match op {
                    ExprOp::Add => '+',
                    ExprOp::Sub => '-',
                };
                format!("{}{}{}", lhs.render(), op_char, rhs.render())
            }
        }
    }
}

/// Resolves the token text of one operand's expression to either a
/// constant or a symbolic value. A concrete implementation owns whatever
/// symbol table and literal grammar it likes; the operand parser only
/// depends on this trait.
pub trait ExprContext {
    fn eval(&self, text: &str) -> ExprValue;

    /// Define (or redefine) `name` at the given value. Returns `false` if
    /// `name` was already defined (the driver turns that into
    /// `AssemblerError::DuplicateLabel`).
    fn define(&mut self, name: &str, value: i32) -> bool;

    fn lookup(&self, name: &str) -> Option<i32>;
}

/// A `HashMap<String, i32>` plus decimal / `0x`&`$`-hex / `%`-binary
/// literal parsing and single-symbol `+`/`-` folding. Deliberately small:
/// a full Pratt-style expression parser is left to whatever frontend
/// needs one.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, i32>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn parse_literal(token: &str) -> Option<i32> {
        let (neg, token) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        let magnitude = if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16).ok()?
        } else if let Some(hex) = token.strip_prefix('$') {
            i64::from_str_radix(hex, 16).ok()?
        } else if let Some(bin) = token.strip_prefix('%') {
            i64::from_str_radix(bin, 2).ok()?
        } else {
            token.parse::<i64>().ok()?
        };
        let value = if neg { -magnitude } else { magnitude };
        i32::try_from(value).ok()
    }

    fn split_binop(text: &str) -> Option<(&str, ExprOp, &str)> {
        // Split on the last top-level '+'/'-' so a leading '-' (sign of a
        // negative literal) isn't mistaken for the operator.
        let bytes = text.as_bytes();
        for i in (1..bytes.len()).rev() {
            match bytes[i] {
                b'+' => return Some((&text[..i], ExprOp::Add, &text[i + 1..])),
                b'-' => return Some((&text[..i], ExprOp::Sub, &text[i + 1..])),
                _ => {}
            }
        }
        None
    }
}

impl ExprContext for SymbolTable {
    fn eval(&self, text: &str) -> ExprValue {
        let text = text.trim();
        if let Some(v) = Self::parse_literal(text) {
            return ExprValue::Const(v);
        }
        if let Some((lhs, op, rhs)) = Self::split_binop(text) {
            let lhs_val = self.eval(lhs.trim());
            let rhs_val = self.eval(rhs.trim());
            let combined = ExprValue::BinOp(Box::new(lhs_val), op, Box::new(rhs_val));
            return match combined.try_const() {
                Some(v) => ExprValue::Const(v),
                None => combined,
            };
        }
        match self.symbols.get(text) {
            Some(v) => ExprValue::Const(*v),
            None => ExprValue::Symbol(text.to_string()),
        }
    }

    fn define(&mut self, name: &str, value: i32) -> bool {
        if self.symbols.contains_key(name) {
            return false;
        }
        self.symbols.insert(name.to_string(), value);
        true
    }

    fn lookup(&self, name: &str) -> Option<i32> {
        self.symbols.get(name).copied()
    }
}

impl SymbolTable {
    /// Every defined label and its resolved address, for the object
    /// writer's symbol table.
    pub fn entries(&self) -> impl Iterator<Item = (&str, i32)> {
        self.symbols.iter().map(|(name, value)| (name.as_str(), *value))
    }
}
