//! Precedence-climbing parser for gate-matrix expressions.

use crate::ast::{BinOp, Expr, Function};
use crate::error::{ExprError, ExprResult};
use crate::lexer::{Token, tokenize};
use crate::value::Value;

/// Parse an expression string into a syntax tree.
pub fn parse(source: &str) -> ExprResult<Expr> {
    let mut parser = Parser::new(source)?;
    let expr = parser.parse_expression()?;
    if let Some(token) = parser.peek() {
        return Err(parser.unexpected("end of expression", token));
    }
    Ok(expr)
}

/// Parser state.
struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> ExprResult<Self> {
        Ok(Self {
            source,
            tokens: tokenize(source)?,
            pos: 0,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> ExprResult<()> {
        match self.advance() {
            Some(found)
                if std::mem::discriminant(&found) == std::mem::discriminant(expected) =>
            {
                Ok(())
            }
            Some(found) => Err(self.unexpected(&expected.to_string(), &found)),
            None => Err(self.eof(&expected.to_string())),
        }
    }

    fn unexpected(&self, expected: &str, found: &Token) -> ExprError {
        ExprError::UnexpectedToken {
            expression: self.source.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    fn eof(&self, expected: &str) -> ExprError {
        ExprError::UnexpectedEof {
            expression: self.source.to_string(),
            expected: expected.to_string(),
        }
    }

    fn parse_expression(&mut self) -> ExprResult<Expr> {
        self.parse_binary_expr(0)
    }

    /// Parse `+ - * /` with precedence climbing.
    fn parse_binary_expr(&mut self, min_prec: u8) -> ExprResult<Expr> {
        let mut left = self.parse_unary_expr()?;

        while let Some(op) = self.peek_binary_op() {
            let prec = op_precedence(op);
            if prec < min_prec {
                break;
            }
            self.advance();

            let right = self.parse_binary_expr(prec + 1)?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Unary signs bind looser than `^`, so `-2^2` is `-(2^2)`.
    fn parse_unary_expr(&mut self) -> ExprResult<Expr> {
        if self.consume(&Token::Minus) {
            let expr = self.parse_unary_expr()?;
            return Ok(Expr::Neg(Box::new(expr)));
        }
        if self.consume(&Token::Plus) {
            return self.parse_unary_expr();
        }
        self.parse_power_expr()
    }

    /// `^` is right associative and its exponent may carry a sign.
    fn parse_power_expr(&mut self) -> ExprResult<Expr> {
        let base = self.parse_primary_expr()?;
        if self.consume(&Token::Caret) {
            let exponent = self.parse_unary_expr()?;
            return Ok(Expr::BinaryOp {
                op: BinOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn parse_primary_expr(&mut self) -> ExprResult<Expr> {
        let token = self.advance().ok_or_else(|| self.eof("expression"))?;

        match token {
            Token::Number(v) => {
                // `2i` is a coefficient, decided by the previous token being a number.
                if self.peek().is_some_and(Token::is_imaginary_unit) {
                    self.advance();
                    Ok(Expr::Literal(Value::imaginary(v)))
                } else {
                    Ok(Expr::Literal(Value::Real(v)))
                }
            }
            Token::Identifier(name) => {
                if self.consume(&Token::LParen) {
                    let args = self.parse_argument_list()?;
                    self.expect(&Token::RParen)?;
                    self.make_call(&name, args)
                } else if name == "i" || name == "j" {
                    Ok(Expr::Literal(Value::I))
                } else {
                    Ok(Expr::Identifier(name))
                }
            }
            Token::LParen => {
                let expr = self.parse_expression()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            other => Err(self.unexpected("expression", &other)),
        }
    }

    fn parse_argument_list(&mut self) -> ExprResult<Vec<Expr>> {
        if self.check(&Token::RParen) {
            return Ok(vec![]);
        }
        let mut args = vec![self.parse_expression()?];
        while self.consume(&Token::Comma) {
            args.push(self.parse_expression()?);
        }
        Ok(args)
    }

    fn make_call(&self, name: &str, args: Vec<Expr>) -> ExprResult<Expr> {
        let function = Function::from_name(name).ok_or_else(|| ExprError::UnknownFunction {
            expression: self.source.to_string(),
            name: name.to_string(),
        })?;
        if args.len() != function.arity() {
            return Err(ExprError::WrongArgumentCount {
                expression: self.source.to_string(),
                name: name.to_string(),
                expected: function.arity(),
                got: args.len(),
            });
        }
        Ok(Expr::Call { function, args })
    }

    fn peek_binary_op(&self) -> Option<BinOp> {
        match self.peek()? {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            Token::Star => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            _ => None,
        }
    }
}

/// Get operator precedence.
fn op_precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Add | BinOp::Sub => 1,
        BinOp::Mul | BinOp::Div => 2,
        BinOp::Pow => 3,
    }
}
