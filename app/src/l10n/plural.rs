//! Gettext plural expressions.
//!
//! The server ships the locale's plural rule as a C expression over `n`
//! (for example `(n != 1)` or the three-form Slavic rule). The expression is
//! parsed once into a small AST and evaluated for every `ngettext` call.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct PluralParseError {
    pub offset: usize,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    N,
    Literal(u64),
    Not(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
}

impl Expr {
    fn eval(&self, n: u64) -> u64 {
        match self {
            Self::N => n,
            Self::Literal(value) => *value,
            Self::Not(inner) => u64::from(inner.eval(n) == 0),
            Self::Conditional(test, then, otherwise) => {
                if test.eval(n) == 0 {
                    otherwise.eval(n)
                } else {
                    then.eval(n)
                }
            }
            Self::Binary(op, lhs, rhs) => {
                let lhs = lhs.eval(n);
                // `||` and `&&` short-circuit like C.
                match op {
                    BinaryOp::Or if lhs != 0 => return 1,
                    BinaryOp::And if lhs == 0 => return 0,
                    _ => {}
                }
                let rhs = rhs.eval(n);
                match op {
                    BinaryOp::Or | BinaryOp::And => u64::from(rhs != 0),
                    BinaryOp::Eq => u64::from(lhs == rhs),
                    BinaryOp::Ne => u64::from(lhs != rhs),
                    BinaryOp::Lt => u64::from(lhs < rhs),
                    BinaryOp::Le => u64::from(lhs <= rhs),
                    BinaryOp::Gt => u64::from(lhs > rhs),
                    BinaryOp::Ge => u64::from(lhs >= rhs),
                    BinaryOp::Add => lhs.wrapping_add(rhs),
                    BinaryOp::Sub => lhs.wrapping_sub(rhs),
                    BinaryOp::Mul => lhs.wrapping_mul(rhs),
                    BinaryOp::Div => lhs.checked_div(rhs).unwrap_or(0),
                    BinaryOp::Rem => lhs.checked_rem(rhs).unwrap_or(0),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    N,
    Number(u64),
    Op(&'static str),
    Open,
    Close,
    Question,
    Colon,
}

fn tokenize(source: &str) -> Result<Vec<(usize, Token)>, PluralParseError> {
    const OPERATORS: [&str; 15] = [
        "||", "&&", "==", "!=", "<=", ">=", "<", ">", "+", "-", "*", "/", "%", "!", "=",
    ];

    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let c = bytes[pos];
        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        let start = pos;
        let token = match c {
            b'n' => {
                pos += 1;
                Token::N
            }
            b'(' => {
                pos += 1;
                Token::Open
            }
            b')' => {
                pos += 1;
                Token::Close
            }
            b'?' => {
                pos += 1;
                Token::Question
            }
            b':' => {
                pos += 1;
                Token::Colon
            }
            b'0'..=b'9' => {
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
                let value = source[start..pos].parse().map_err(|_| PluralParseError {
                    offset: start,
                    message: "number out of range".to_owned(),
                })?;
                Token::Number(value)
            }
            _ => {
                let op = OPERATORS
                    .iter()
                    .find(|op| source[pos..].starts_with(**op))
                    .filter(|op| **op != "=")
                    .ok_or_else(|| PluralParseError {
                        offset: start,
                        message: format!("unexpected character {:?}", char::from(c)),
                    })?;
                pos += op.len();
                Token::Op(*op)
            }
        };
        tokens.push((start, token));
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    cursor: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.cursor).map(|(_, token)| *token)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.cursor).map_or(self.end, |(offset, _)| *offset)
    }

    fn error(&self, message: &str) -> PluralParseError {
        PluralParseError {
            offset: self.offset(),
            message: message.to_owned(),
        }
    }

    fn expect(&mut self, expected: Token, message: &str) -> Result<(), PluralParseError> {
        if self.peek() == Some(expected) {
            self.cursor += 1;
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn conditional(&mut self) -> Result<Expr, PluralParseError> {
        let test = self.binary(0)?;
        if self.peek() != Some(Token::Question) {
            return Ok(test);
        }
        self.cursor += 1;
        let then = self.conditional()?;
        self.expect(Token::Colon, "expected ':' in conditional")?;
        let otherwise = self.conditional()?;
        Ok(Expr::Conditional(
            Box::new(test),
            Box::new(then),
            Box::new(otherwise),
        ))
    }

    /// Precedence climbing over the left-associative binary operators.
    fn binary(&mut self, level: usize) -> Result<Expr, PluralParseError> {
        const LEVELS: [&[(&str, BinaryOp)]; 6] = [
            &[("||", BinaryOp::Or)],
            &[("&&", BinaryOp::And)],
            &[("==", BinaryOp::Eq), ("!=", BinaryOp::Ne)],
            &[
                ("<", BinaryOp::Lt),
                ("<=", BinaryOp::Le),
                (">", BinaryOp::Gt),
                (">=", BinaryOp::Ge),
            ],
            &[("+", BinaryOp::Add), ("-", BinaryOp::Sub)],
            &[("*", BinaryOp::Mul), ("/", BinaryOp::Div), ("%", BinaryOp::Rem)],
        ];

        let Some(operators) = LEVELS.get(level) else {
            return self.unary();
        };
        let mut lhs = self.binary(level + 1)?;
        while let Some(Token::Op(symbol)) = self.peek() {
            let Some((_, op)) = operators.iter().find(|(s, _)| *s == symbol) else {
                break;
            };
            self.cursor += 1;
            let rhs = self.binary(level + 1)?;
            lhs = Expr::Binary(*op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, PluralParseError> {
        match self.peek() {
            Some(Token::Op("!")) => {
                self.cursor += 1;
                Ok(Expr::Not(Box::new(self.unary()?)))
            }
            Some(Token::N) => {
                self.cursor += 1;
                Ok(Expr::N)
            }
            Some(Token::Number(value)) => {
                self.cursor += 1;
                Ok(Expr::Literal(value))
            }
            Some(Token::Open) => {
                self.cursor += 1;
                let inner = self.conditional()?;
                self.expect(Token::Close, "expected ')'")?;
                Ok(inner)
            }
            Some(_) => Err(self.error("expected 'n', a number or '('")),
            None => Err(self.error("unexpected end of expression")),
        }
    }
}

/// A parsed plural rule mapping a count to a plural form index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralRule {
    expr: Expr,
}

impl PluralRule {
    /// Parses a plural rule.
    ///
    /// Accepts either the bare expression or a full gettext header such as
    /// `nplurals=2; plural=(n != 1);`.
    ///
    /// # Errors
    ///
    /// Returns a [`PluralParseError`] if the expression is not valid.
    pub fn parse(source: &str) -> Result<Self, PluralParseError> {
        let source = source
            .split(';')
            .find_map(|part| part.trim().strip_prefix("plural="))
            .unwrap_or(source);
        let mut parser = Parser {
            tokens: tokenize(source)?,
            cursor: 0,
            end: source.len(),
        };
        let expr = parser.conditional()?;
        if parser.peek().is_some() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(Self { expr })
    }

    /// English-style rule: singular for one, plural otherwise.
    #[must_use]
    pub fn germanic() -> Self {
        Self {
            expr: Expr::Binary(BinaryOp::Ne, Box::new(Expr::N), Box::new(Expr::Literal(1))),
        }
    }

    /// Returns the plural form index for `n`.
    #[must_use]
    pub fn index(&self, n: u64) -> usize {
        usize::try_from(self.expr.eval(n)).unwrap_or(usize::MAX)
    }
}

impl Default for PluralRule {
    fn default() -> Self {
        Self::germanic()
    }
}
