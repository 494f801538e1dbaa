use crate::ast::value::parse_decimal;
use crate::error::FormulaError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Text(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    EqEq,
    BangEq,
    EqEqEq,
    BangEqEq,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    AndAnd,
    OrOr,
    Question,
    Colon,
    Comma,
    LParen,
    RParen,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            TokenKind::Number(n) => return write!(f, "{}", n),
            TokenKind::Text(s) => return write!(f, "{:?}", s),
            TokenKind::Ident(name) => return write!(f, "{}", name),
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Bang => "!",
            TokenKind::EqEq => "==",
            TokenKind::BangEq => "!=",
            TokenKind::EqEqEq => "===",
            TokenKind::BangEqEq => "!==",
            TokenKind::Greater => ">",
            TokenKind::GreaterEq => ">=",
            TokenKind::Less => "<",
            TokenKind::LessEq => "<=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Character offset of the token's first character.
    pub position: usize,
}

/// Splits formula source into tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token>, FormulaError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        let start = pos;

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let kind = if c.is_ascii_digit() || (c == '.' && chars.get(pos + 1).is_some_and(|n| n.is_ascii_digit())) {
            pos = scan_number(&chars, pos);
            let literal: String = chars[start..pos].iter().collect();
            TokenKind::Number(
                parse_decimal(&literal).ok_or(FormulaError::InvalidNumber(literal))?,
            )
        } else if is_ident_start(c) {
            while pos < chars.len() && is_ident_continue(chars[pos]) {
                pos += 1;
            }
            TokenKind::Ident(chars[start..pos].iter().collect())
        } else if c == '"' || c == '\'' {
            let (text, next) = scan_string(&chars, pos)?;
            pos = next;
            TokenKind::Text(text)
        } else {
            let (kind, width) = scan_operator(&chars, pos)?;
            pos += width;
            kind
        };

        tokens.push(Token {
            kind,
            position: start,
        });
    }

    Ok(tokens)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn scan_number(chars: &[char], mut pos: usize) -> usize {
    while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
        pos += 1;
    }
    if pos < chars.len() && matches!(chars[pos], 'e' | 'E') {
        let mut exp = pos + 1;
        if exp < chars.len() && matches!(chars[exp], '+' | '-') {
            exp += 1;
        }
        if exp < chars.len() && chars[exp].is_ascii_digit() {
            pos = exp;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }
    pos
}

fn scan_string(chars: &[char], start: usize) -> Result<(String, usize), FormulaError> {
    let quote = chars[start];
    let mut text = String::new();
    let mut pos = start + 1;

    while pos < chars.len() {
        match chars[pos] {
            c if c == quote => return Ok((text, pos + 1)),
            '\\' => {
                let escaped = chars
                    .get(pos + 1)
                    .ok_or(FormulaError::UnterminatedString(start))?;
                text.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => *other,
                });
                pos += 2;
            }
            c => {
                text.push(c);
                pos += 1;
            }
        }
    }

    Err(FormulaError::UnterminatedString(start))
}

fn scan_operator(chars: &[char], pos: usize) -> Result<(TokenKind, usize), FormulaError> {
    let at = |offset: usize| chars.get(pos + offset).copied();

    let token = match (chars[pos], at(1), at(2)) {
        ('=', Some('='), Some('=')) => (TokenKind::EqEqEq, 3),
        ('!', Some('='), Some('=')) => (TokenKind::BangEqEq, 3),
        ('=', Some('='), _) => (TokenKind::EqEq, 2),
        ('!', Some('='), _) => (TokenKind::BangEq, 2),
        ('>', Some('='), _) => (TokenKind::GreaterEq, 2),
        ('<', Some('='), _) => (TokenKind::LessEq, 2),
        ('&', Some('&'), _) => (TokenKind::AndAnd, 2),
        ('|', Some('|'), _) => (TokenKind::OrOr, 2),
        ('+', ..) => (TokenKind::Plus, 1),
        ('-', ..) => (TokenKind::Minus, 1),
        ('*', ..) => (TokenKind::Star, 1),
        ('/', ..) => (TokenKind::Slash, 1),
        ('%', ..) => (TokenKind::Percent, 1),
        ('!', ..) => (TokenKind::Bang, 1),
        ('>', ..) => (TokenKind::Greater, 1),
        ('<', ..) => (TokenKind::Less, 1),
        ('?', ..) => (TokenKind::Question, 1),
        (':', ..) => (TokenKind::Colon, 1),
        (',', ..) => (TokenKind::Comma, 1),
        ('(', ..) => (TokenKind::LParen, 1),
        (')', ..) => (TokenKind::RParen, 1),
        (found, ..) => {
            return Err(FormulaError::UnexpectedCharacter {
                found,
                position: pos,
            });
        }
    };
    Ok(token)
}
