use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    Number(f64),
    /// Reference to another field by its display name
    FieldRef(String),
    Negate(Box<FormulaExpr>),
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaParseError {
    pub pos: usize,
    pub message: String,
}

impl fmt::Display for FormulaParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "formula parse error at {}: {}", self.pos, self.message)
    }
}

impl std::error::Error for FormulaParseError {}

/// Longest formula text accepted, in bytes after trimming
pub const MAX_FORMULA_LEN: usize = 4096;

/// Deepest nesting of parentheses and unary signs the parser descends into
pub const MAX_NESTING: usize = 256;

pub fn parse_formula(formula: &str) -> Result<FormulaExpr, FormulaParseError> {
    let s = formula.trim();
    let s = s.strip_prefix('=').unwrap_or(s);
    if s.len() > MAX_FORMULA_LEN {
        return Err(FormulaParseError {
            pos: 0,
            message: format!("formula longer than {} characters", MAX_FORMULA_LEN),
        });
    }
    let mut p = Parser::new(s);
    p.skip_ws();
    if p.eof() {
        return Err(p.err("empty formula"));
    }
    let expr = p.parse_expr(0)?;
    p.skip_ws();
    if !p.eof() {
        return Err(p.err("trailing characters"));
    }
    Ok(expr)
}

impl FormulaExpr {
    /// Field names referenced by this expression, in first-seen order
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            FormulaExpr::Number(_) => {}
            FormulaExpr::FieldRef(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            FormulaExpr::Negate(inner) => inner.collect_refs(out),
            FormulaExpr::BinaryOp { left, right, .. } => {
                left.collect_refs(out);
                right.collect_refs(out);
            }
        }
    }
}

struct Parser<'a> {
    s: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            s: input.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    fn eof(&self) -> bool {
        self.pos >= self.s.len()
    }

    fn peek(&self) -> Option<u8> {
        self.s.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn err(&self, msg: &str) -> FormulaParseError {
        FormulaParseError {
            pos: self.pos,
            message: msg.to_string(),
        }
    }

    fn descend(&mut self) -> Result<(), FormulaParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.err("formula nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<FormulaExpr, FormulaParseError> {
        self.skip_ws();

        let mut lhs = match self.peek() {
            Some(b'-') => {
                self.bump();
                self.descend()?;
                let operand = self.parse_expr(90)?;
                self.depth -= 1;
                FormulaExpr::Negate(Box::new(operand))
            }
            Some(b'+') => {
                self.bump();
                self.descend()?;
                let operand = self.parse_expr(90)?;
                self.depth -= 1;
                operand
            }
            _ => self.parse_primary()?,
        };

        loop {
            self.skip_ws();

            let (op, l_bp, r_bp) = match self.peek_infix_op() {
                Some(x) => x,
                None => break,
            };

            if l_bp < min_bp {
                break;
            }

            self.bump();
            let rhs = self.parse_expr(r_bp)?;
            lhs = FormulaExpr::BinaryOp {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn peek_infix_op(&self) -> Option<(BinaryOperator, u8, u8)> {
        match self.peek()? {
            b'+' => Some((BinaryOperator::Add, 50, 51)),
            b'-' => Some((BinaryOperator::Sub, 50, 51)),
            b'*' => Some((BinaryOperator::Mul, 60, 61)),
            b'/' => Some((BinaryOperator::Div, 60, 61)),
            _ => None,
        }
    }

    fn parse_primary(&mut self) -> Result<FormulaExpr, FormulaParseError> {
        self.skip_ws();
        match self.peek() {
            Some(b'(') => {
                self.bump();
                self.descend()?;
                let e = self.parse_expr(0)?;
                self.depth -= 1;
                self.skip_ws();
                if self.bump() != Some(b')') {
                    return Err(self.err("expected ')'"));
                }
                Ok(e)
            }
            Some(b'[') => self.parse_bracketed_name().map(FormulaExpr::FieldRef),
            Some(b'0'..=b'9' | b'.') => self.parse_number(),
            Some(b) if is_ident_start(b) => self.parse_identifier().map(FormulaExpr::FieldRef),
            None => Err(self.err("unexpected end of formula")),
            _ => Err(self.err("unexpected token")),
        }
    }

    fn parse_number(&mut self) -> Result<FormulaExpr, FormulaParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        let txt = std::str::from_utf8(&self.s[start..self.pos])
            .map_err(|_| self.err("invalid utf-8 in number"))?;
        let n: f64 = txt.parse().map_err(|_| self.err("invalid number"))?;
        Ok(FormulaExpr::Number(n))
    }

    fn parse_identifier(&mut self) -> Result<String, FormulaParseError> {
        let start = self.pos;
        self.pos += 1;
        while let Some(b) = self.peek() {
            if is_ident_continue(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
        let ident = std::str::from_utf8(&self.s[start..self.pos])
            .map_err(|_| self.err("invalid utf-8 in identifier"))?
            .to_string();
        Ok(ident)
    }

    fn parse_bracketed_name(&mut self) -> Result<String, FormulaParseError> {
        debug_assert_eq!(self.peek(), Some(b'['));
        self.bump();
        let start = self.pos;
        loop {
            match self.bump() {
                Some(b']') => break,
                Some(_) => {}
                None => return Err(self.err("unterminated field name")),
            }
        }
        let name = std::str::from_utf8(&self.s[start..self.pos - 1])
            .map_err(|_| self.err("invalid utf-8 in field name"))?
            .trim()
            .to_string();
        if name.is_empty() {
            return Err(self.err("empty field name"));
        }
        Ok(name)
    }
}

// Bytes >= 0x80 belong to non-ASCII letters; slicing stays on char boundaries
// because a multi-byte sequence is always consumed whole.
fn is_ident_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_') || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}
