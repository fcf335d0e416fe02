//! # Lexer for MiMa Assembly Language

use logos::Logos;
use std::ops::Range;

/// Tokens for MiMa assembly
///
/// Whitespace, newlines included, only separates tokens.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r";[^\n]*")] // Skip comments
pub enum Token {
    /// Identifier (instruction mnemonics, labels)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    /// Signed decimal number
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse().ok())]
    Number(i64),

    /// Colon (for labels)
    #[token(":")]
    Colon,
}

/// Token with its byte range in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Range<usize>,
}

/// Line/column of a byte offset, both 1-based
pub fn position(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(newline) => before[newline + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}

/// Tokenize `source`, stopping at the first unrecognised input
///
/// On failure, returns the byte range that could not be lexed.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, Range<usize>> {
    let mut lex = Token::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lex.next() {
        match result {
            Ok(token) => tokens.push(Spanned {
                token,
                span: lex.span(),
            }),
            Err(()) => return Err(lex.span()),
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_numbers() {
        let mut lex = Token::lexer("42 -10 0");
        assert_eq!(lex.next(), Some(Ok(Token::Number(42))));
        assert_eq!(lex.next(), Some(Ok(Token::Number(-10))));
        assert_eq!(lex.next(), Some(Ok(Token::Number(0))));
        assert_eq!(lex.next(), None);
    }

    #[test]
    fn test_lexer_label_definition() {
        let mut lex = Token::lexer("loop: HALT");
        assert_eq!(lex.next(), Some(Ok(Token::Identifier("loop".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Colon)));
        assert_eq!(lex.next(), Some(Ok(Token::Identifier("HALT".to_string()))));
    }

    #[test]
    fn test_lexer_skips_comments_and_newlines() {
        let mut lex = Token::lexer("LDC 1 ; load one\n\n  HALT ; done");
        assert_eq!(lex.next(), Some(Ok(Token::Identifier("LDC".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Number(1))));
        assert_eq!(lex.next(), Some(Ok(Token::Identifier("HALT".to_string()))));
        assert_eq!(lex.next(), None);
    }

    #[test]
    fn test_lexer_rejects_unknown_characters() {
        let mut lex = Token::lexer("LDC #1");
        assert_eq!(lex.next(), Some(Ok(Token::Identifier("LDC".to_string()))));
        assert_eq!(lex.next(), Some(Err(())));
    }

    #[test]
    fn test_lexer_number_overflow_is_error() {
        let mut lex = Token::lexer("99999999999999999999");
        assert_eq!(lex.next(), Some(Err(())));
    }

    #[test]
    fn test_tokenize_spans() {
        let tokens = tokenize("LDC -1").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].span, 0..3);
        assert_eq!(tokens[1].span, 4..6);

        assert_eq!(tokenize("HALT $"), Err(5..6));
    }

    #[test]
    fn test_position() {
        let source = "LDC 1\n  HALT";
        assert_eq!(position(source, 0), (1, 1));
        assert_eq!(position(source, 4), (1, 5));
        assert_eq!(position(source, 8), (2, 3));
    }
}
