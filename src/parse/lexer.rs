use chumsky::span::SimpleSpan;
use logos::Logos;

use super::ParseError;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip(r"//[^\n\r]*", allow_greedy = true))]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum Token<'src> {
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident(&'src str),
    #[regex(r"-?[0-9]+")]
    Int(&'src str),

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("=")]
    Equal,
    #[token(".")]
    Dot,
    #[token("::")]
    DoubleColon,
}

impl std::fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident(s) | Token::Int(s) => write!(f, "{}", s),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Equal => write!(f, "="),
            Token::Dot => write!(f, "."),
            Token::DoubleColon => write!(f, "::"),
        }
    }
}

/// Tokenizes `src`, pairing each token with its byte span.
pub fn lex(src: &str) -> Result<Vec<(Token<'_>, SimpleSpan)>, ParseError> {
    Token::lexer(src)
        .spanned()
        .map(|(token, span)| match token {
            Ok(token) => Ok((token, SimpleSpan::from(span))),
            Err(_) => Err(ParseError::Lex {
                line: line_of(src, span.start),
                text: src[span].to_string(),
            }),
        })
        .collect()
}

/// 1-based line of the byte `offset`.
pub fn line_of(src: &str, offset: usize) -> usize {
    src[..offset].matches('\n').count() + 1
}
