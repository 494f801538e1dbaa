use super::lexer::{Token, TokenKind};
use crate::ast::{BinaryOp, Builtin, Expression, UnaryOp, Value};
use crate::error::FormulaError;

/// Recursive-descent parser over a token stream.
pub(super) struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn new(tokens: &'a [Token], max_depth: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth,
        }
    }

    /// Parses the whole token stream as a single expression.
    pub(super) fn parse(mut self) -> Result<Expression, FormulaError> {
        if self.tokens.is_empty() {
            return Err(FormulaError::Empty);
        }
        let expr = self.expression()?;
        match self.peek() {
            None => Ok(expr),
            Some(token) => Err(unexpected(token, "end of formula")),
        }
    }

    fn expression(&mut self) -> Result<Expression, FormulaError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FormulaError::TooDeep(self.max_depth));
        }
        let result = self.ternary();
        self.depth -= 1;
        result
    }

    fn ternary(&mut self) -> Result<Expression, FormulaError> {
        let condition = self.or()?;
        if !self.eat(&TokenKind::Question) {
            return Ok(condition);
        }
        let then = self.expression()?;
        self.expect(&TokenKind::Colon, "':'")?;
        let otherwise = self.expression()?;
        Ok(Expression::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn or(&mut self) -> Result<Expression, FormulaError> {
        let mut left = self.and()?;
        while self.eat(&TokenKind::OrOr) {
            let right = self.and()?;
            left = Expression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expression, FormulaError> {
        let mut left = self.equality()?;
        while self.eat(&TokenKind::AndAnd) {
            let right = self.equality()?;
            left = Expression::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Expression, FormulaError> {
        self.binary_level(Self::comparison, |kind| match kind {
            TokenKind::EqEq => Some(BinaryOp::Equal),
            TokenKind::BangEq => Some(BinaryOp::NotEqual),
            TokenKind::EqEqEq => Some(BinaryOp::StrictEqual),
            TokenKind::BangEqEq => Some(BinaryOp::StrictNotEqual),
            _ => None,
        })
    }

    fn comparison(&mut self) -> Result<Expression, FormulaError> {
        self.binary_level(Self::additive, |kind| match kind {
            TokenKind::Greater => Some(BinaryOp::GreaterThan),
            TokenKind::GreaterEq => Some(BinaryOp::GreaterThanOrEqual),
            TokenKind::Less => Some(BinaryOp::SmallerThan),
            TokenKind::LessEq => Some(BinaryOp::SmallerThanOrEqual),
            _ => None,
        })
    }

    fn additive(&mut self) -> Result<Expression, FormulaError> {
        self.binary_level(Self::term, |kind| match kind {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Subtract),
            _ => None,
        })
    }

    fn term(&mut self) -> Result<Expression, FormulaError> {
        self.binary_level(Self::unary, |kind| match kind {
            TokenKind::Star => Some(BinaryOp::Multiply),
            TokenKind::Slash => Some(BinaryOp::Divide),
            TokenKind::Percent => Some(BinaryOp::Remainder),
            _ => None,
        })
    }

    /// Parses a left-associative chain of operators from one precedence level.
    fn binary_level(
        &mut self,
        operand: fn(&mut Self) -> Result<Expression, FormulaError>,
        operator: fn(&TokenKind) -> Option<BinaryOp>,
    ) -> Result<Expression, FormulaError> {
        let mut left = operand(self)?;
        while let Some(op) = self.peek().and_then(|t| operator(&t.kind)) {
            self.pos += 1;
            let right = operand(self)?;
            left = Expression::binary(op, left, right);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expression, FormulaError> {
        let op = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Minus) => UnaryOp::Negate,
            Some(TokenKind::Plus) => UnaryOp::Plus,
            Some(TokenKind::Bang) => UnaryOp::Not,
            _ => return self.primary(),
        };
        self.pos += 1;

        // Unary chains such as `---x` recurse without passing through `expression`.
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FormulaError::TooDeep(self.max_depth));
        }
        let operand = self.unary();
        self.depth -= 1;
        Ok(Expression::unary(op, operand?))
    }

    fn primary(&mut self) -> Result<Expression, FormulaError> {
        let token = self
            .advance()
            .ok_or_else(|| FormulaError::UnexpectedEnd("a value".to_string()))?;

        match &token.kind {
            TokenKind::Number(n) => Ok(Expression::Literal(Value::Number(*n))),
            TokenKind::Text(s) => Ok(Expression::Literal(Value::Text(s.clone()))),
            TokenKind::Ident(name) => match name.as_str() {
                "true" => Ok(Expression::Literal(Value::Bool(true))),
                "false" => Ok(Expression::Literal(Value::Bool(false))),
                "null" => Ok(Expression::Literal(Value::Null)),
                _ if self.eat(&TokenKind::LParen) => self.call(name),
                _ => Ok(Expression::variable(name)),
            },
            TokenKind::LParen => {
                let inner = self.expression()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(unexpected(token, "a value")),
        }
    }

    /// Parses the argument list of a builtin call; the opening paren is already consumed.
    fn call(&mut self, name: &str) -> Result<Expression, FormulaError> {
        let function =
            Builtin::from_name(name).ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;

        let mut args = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            loop {
                args.push(self.expression()?);
                if self.eat(&TokenKind::RParen) {
                    break;
                }
                self.expect(&TokenKind::Comma, "',' or ')'")?;
            }
        }

        let (min, max) = function.arity();
        if args.len() < min || max.is_some_and(|max| args.len() > max) {
            let expected = match max {
                Some(max) if max == min => min.to_string(),
                Some(max) => format!("{} to {}", min, max),
                None => format!("at least {}", min),
            };
            return Err(FormulaError::WrongArity {
                name: name.to_string(),
                expected,
                found: args.len(),
            });
        }

        Ok(Expression::Call { function, args })
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().is_some_and(|t| &t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<(), FormulaError> {
        match self.peek() {
            Some(token) if &token.kind == kind => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => Err(unexpected(token, expected)),
            None => Err(FormulaError::UnexpectedEnd(expected.to_string())),
        }
    }
}

fn unexpected(token: &Token, expected: &str) -> FormulaError {
    FormulaError::UnexpectedToken {
        found: token.kind.to_string(),
        expected: expected.to_string(),
        position: token.position,
    }
}
