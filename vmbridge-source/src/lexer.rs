//! Tokenizer for declaration sources.
//!
//! Only the structure of declarations matters to the parser, so keywords are
//! lexed as plain identifiers and checked by text. Literals are recognized so
//! that braces inside strings never unbalance a skipped body.

use std::ops::Range;

use logos::Logos;

use crate::{Result, SourceContext};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f\u{feff}]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    #[regex(r"@?[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex(r"[0-9][0-9A-Za-z_.]*")]
    Number,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r#"@"([^"]|"")*""#)]
    #[regex(r#"\$@?"([^"\\\n]|\\.)*""#)]
    #[regex(r#"\$*"""+"#, raw_string)]
    Str,
    #[regex(r"'([^'\\\n]|\\.)*'")]
    Char,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token("::")]
    DoubleColon,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
    #[token("=")]
    Eq,
    #[token("=>")]
    Arrow,
    #[regex(r"[+\-*/%&|^!~]")]
    Op,
}

/// Consumes the body of a raw string literal whose opening delimiter was just
/// matched. The literal closes at the first run of at least as many quotes.
fn raw_string(lex: &mut logos::Lexer<Token>) -> bool {
    let quotes = lex.slice().trim_start_matches('$').len();
    let rest = lex.remainder();
    let mut run = 0;
    for (i, c) in rest.char_indices() {
        if c == '"' {
            run += 1;
            continue;
        }
        if run >= quotes {
            lex.bump(i);
            return true;
        }
        run = 0;
    }
    if run >= quotes {
        lex.bump(rest.len());
        return true;
    }
    false
}

impl Token {
    /// Human-readable description used in parse errors.
    pub fn describe(&self) -> &'static str {
        match self {
            Token::Ident => "identifier",
            Token::Number => "number",
            Token::Str => "string literal",
            Token::Char => "character literal",
            Token::LBrace => "'{'",
            Token::RBrace => "'}'",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::LBracket => "'['",
            Token::RBracket => "']'",
            Token::Lt => "'<'",
            Token::Gt => "'>'",
            Token::Comma => "','",
            Token::Semi => "';'",
            Token::Colon => "':'",
            Token::DoubleColon => "'::'",
            Token::Dot => "'.'",
            Token::Question => "'?'",
            Token::Eq => "'='",
            Token::Arrow => "'=>'",
            Token::Op => "operator",
        }
    }
}

/// A token with its byte range in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub span: Range<usize>,
}

/// Tokenize a whole source file.
pub fn lex(ctx: &SourceContext) -> Result<Vec<Spanned>> {
    let mut lexer = Token::lexer(ctx.src());
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => tokens.push(Spanned { token, span }),
            Err(()) => return Err(ctx.invalid_character(span.start..span.end)),
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        let ctx = SourceContext::new(src, "test.cs");
        lex(&ctx).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_skips_comments_and_directives() {
        let tokens = kinds("// line\n/* block\n */\n#nullable enable\nclass");
        assert_eq!(tokens, vec![Token::Ident]);
    }

    #[test]
    fn test_strings_hide_braces() {
        let tokens = kinds(r#"{ "}" @"{""}" $"{x}" '}' }"#);
        assert_eq!(
            tokens,
            vec![
                Token::LBrace,
                Token::Str,
                Token::Str,
                Token::Str,
                Token::Char,
                Token::RBrace
            ]
        );
    }

    #[test]
    fn test_raw_strings_hide_braces() {
        let src = "public string Json() => \"\"\"\n    {\"a\": 1}\n    \"\"\";\n";
        let tokens = kinds(src);
        assert_eq!(
            tokens,
            vec![
                Token::Ident,
                Token::Ident,
                Token::Ident,
                Token::LParen,
                Token::RParen,
                Token::Arrow,
                Token::Str,
                Token::Semi
            ]
        );
    }

    #[test]
    fn test_raw_strings_with_longer_delimiters() {
        let tokens = kinds(r#"{ $$""""{{x}} """ }"""" x }"#);
        assert_eq!(
            tokens,
            vec![Token::LBrace, Token::Str, Token::Ident, Token::RBrace]
        );

        let tokens = kinds(r#"{ $"""{x}""" """a"b""" }"#);
        assert_eq!(
            tokens,
            vec![Token::LBrace, Token::Str, Token::Str, Token::RBrace]
        );
    }

    #[test]
    fn test_unterminated_raw_string_is_an_error() {
        let ctx = SourceContext::new("class A { string s = \"\"\" } ", "test.cs");
        assert!(lex(&ctx).is_err());
    }

    #[test]
    fn test_generic_closers_are_separate_tokens() {
        let tokens = kinds("List<List<int>>");
        assert_eq!(
            tokens,
            vec![
                Token::Ident,
                Token::Lt,
                Token::Ident,
                Token::Lt,
                Token::Ident,
                Token::Gt,
                Token::Gt
            ]
        );
    }

    #[test]
    fn test_invalid_character_is_reported() {
        let ctx = SourceContext::new("class A { ` }", "test.cs");
        let err = lex(&ctx).unwrap_err();
        assert!(matches!(*err, crate::Error::InvalidCharacter { .. }));
    }
}
