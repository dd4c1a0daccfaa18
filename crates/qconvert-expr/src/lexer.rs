//! Lexer for gate-matrix expressions.

use logos::Logos;

use crate::error::{ExprError, ExprResult};

/// Parameter names that cannot be used verbatim as identifiers in the
/// evaluator's environment, paired with the name they are stored under.
const RESERVED_ALIASES: &[(&str, &str)] = &[("lambda", "_lambda")];

/// Map a domain parameter name to the name used inside the evaluator.
///
/// Applied both to identifiers in expression text and to the keys of
/// [`Bindings`](crate::Bindings), so the two always agree.
pub fn internal_name(name: &str) -> &str {
    RESERVED_ALIASES
        .iter()
        .find(|(public, _)| *public == name)
        .map_or(name, |(_, alias)| alias)
}

/// Tokens of the expression language.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // Literals
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| internal_name(lex.slice()).to_string())]
    Identifier(String),

    // Operators and punctuation
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("^")]
    Caret,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,
}

impl Token {
    /// Whether this token is the imaginary unit `i` or `j`.
    pub fn is_imaginary_unit(&self) -> bool {
        matches!(self, Token::Identifier(s) if s == "i" || s == "j")
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(v) => write!(f, "{v}"),
            Token::Identifier(s) => write!(f, "{s}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Caret => write!(f, "^"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// Tokenize an expression, failing on the first invalid character.
pub fn tokenize(source: &str) -> ExprResult<Vec<Token>> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push(token),
            Err(()) => {
                return Err(ExprError::InvalidToken {
                    expression: source.to_string(),
                    position: lexer.span().start,
                    token: lexer.slice().to_string(),
                });
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_and_operators() {
        let tokens = tokenize("1.5 * (2 - .25e1)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Number(1.5),
                Token::Star,
                Token::LParen,
                Token::Number(2.0),
                Token::Minus,
                Token::Number(2.5),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_coefficient_imaginary_is_two_tokens() {
        let tokens = tokenize("2i").unwrap();
        assert_eq!(tokens, vec![Token::Number(2.0), Token::Identifier("i".into())]);
        assert!(tokens[1].is_imaginary_unit());
    }

    #[test]
    fn test_lambda_is_aliased() {
        let tokens = tokenize("exp(i * lambda)").unwrap();
        assert!(tokens.contains(&Token::Identifier("_lambda".into())));
        assert!(!tokens.contains(&Token::Identifier("lambda".into())));
    }

    #[test]
    fn test_lambda_prefix_is_not_aliased() {
        let tokens = tokenize("lambda2").unwrap();
        assert_eq!(tokens, vec![Token::Identifier("lambda2".into())]);
    }

    #[test]
    fn test_invalid_character() {
        let err = tokenize("theta $ 2").unwrap_err();
        assert!(matches!(err, ExprError::InvalidToken { position: 6, .. }));
    }
}
