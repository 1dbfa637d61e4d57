//! Restricted arithmetic formulas over other fields of the same schema
//!
//! Grammar: numeric literals, field names (`price`, `unit_cost`, or
//! `[Unit Price]` for names containing spaces or punctuation), unary `-`/`+`,
//! binary `+ - * /` with the usual precedence, and parentheses.

mod evaluator;
mod parser;

pub use evaluator::{evaluate_formula, FormulaEngine, FormulaError};
pub use parser::{parse_formula, BinaryOperator, FormulaExpr, FormulaParseError};
