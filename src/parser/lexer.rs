//! Lexer: source text to positioned tokens.
//!
//! Built on `logos`. Whitespace and comments are dropped from the output but
//! still advance positions, since every token records its own range. Input
//! the grammar does not recognise becomes [`TokenKind::Unknown`] instead of
//! aborting, so the parser decides how to report it.

use logos::Logos;
use smol_str::SmolStr;

use crate::base::{PositionCursor, SourcePos, SourceRange, TextRange, TextSize};

/// Kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Definition,
    Relation,
    Permission,
    Nil,
    Ident,
    Plus,
    Amp,
    Minus,
    Arrow,
    Colon,
    Eq,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Hash,
    Pipe,
    Star,
    Slash,
    /// A character (or unterminated comment) the grammar does not recognise.
    Unknown,
}

impl TokenKind {
    /// Human-readable description used in parse errors.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Definition => "`definition`",
            TokenKind::Relation => "`relation`",
            TokenKind::Permission => "`permission`",
            TokenKind::Nil => "`nil`",
            TokenKind::Ident => "identifier",
            TokenKind::Plus => "`+`",
            TokenKind::Amp => "`&`",
            TokenKind::Minus => "`-`",
            TokenKind::Arrow => "`->`",
            TokenKind::Colon => "`:`",
            TokenKind::Eq => "`=`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::Hash => "`#`",
            TokenKind::Pipe => "`|`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Unknown => "unknown token",
        }
    }

    /// Keywords that start a declaration; used as recovery points.
    pub fn is_declaration_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Definition | TokenKind::Relation | TokenKind::Permission
        )
    }
}

/// A token with its text and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: SmolStr,
    /// Byte span in the source
    pub span: TextRange,
    /// Line/column range in the source
    pub range: SourceRange,
}

/// The token stream for one document.
#[derive(Debug, Clone)]
pub struct Tokens {
    pub tokens: Vec<Token>,
    /// Position just past the end of the input
    pub end: SourcePos,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum Lexeme {
    #[token("//", line_comment)]
    LineComment,
    #[token("/*", block_comment)]
    BlockComment,

    #[token("definition")]
    Definition,
    #[token("relation")]
    Relation,
    #[token("permission")]
    Permission,
    #[token("nil")]
    Nil,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[token("+")]
    Plus,
    #[token("&")]
    Amp,
    #[token("-")]
    Minus,
    #[token("->")]
    Arrow,
    #[token(":")]
    Colon,
    #[token("=")]
    Eq,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("#")]
    Hash,
    #[token("|")]
    Pipe,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
}

fn line_comment(lex: &mut logos::Lexer<'_, Lexeme>) -> logos::Skip {
    let rest = lex.remainder();
    lex.bump(rest.find('\n').unwrap_or(rest.len()));
    logos::Skip
}

/// Consumes through the closing `*/`. An unterminated comment swallows the
/// rest of the input and is reported as an error.
fn block_comment(lex: &mut logos::Lexer<'_, Lexeme>) -> bool {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(rest.len());
            false
        }
    }
}

impl Lexeme {
    /// Map to the public kind; `None` for trivia.
    fn kind(self) -> Option<TokenKind> {
        let kind = match self {
            Lexeme::LineComment | Lexeme::BlockComment => return None,
            Lexeme::Definition => TokenKind::Definition,
            Lexeme::Relation => TokenKind::Relation,
            Lexeme::Permission => TokenKind::Permission,
            Lexeme::Nil => TokenKind::Nil,
            Lexeme::Ident => TokenKind::Ident,
            Lexeme::Plus => TokenKind::Plus,
            Lexeme::Amp => TokenKind::Amp,
            Lexeme::Minus => TokenKind::Minus,
            Lexeme::Arrow => TokenKind::Arrow,
            Lexeme::Colon => TokenKind::Colon,
            Lexeme::Eq => TokenKind::Eq,
            Lexeme::LBrace => TokenKind::LBrace,
            Lexeme::RBrace => TokenKind::RBrace,
            Lexeme::LParen => TokenKind::LParen,
            Lexeme::RParen => TokenKind::RParen,
            Lexeme::Hash => TokenKind::Hash,
            Lexeme::Pipe => TokenKind::Pipe,
            Lexeme::Star => TokenKind::Star,
            Lexeme::Slash => TokenKind::Slash,
        };
        Some(kind)
    }
}

/// Tokenize `source`. Never fails; unrecognised input yields `Unknown` tokens.
pub fn tokenize(source: &str) -> Tokens {
    let mut cursor = PositionCursor::new(source);
    let mut tokens = Vec::new();

    for (result, span) in Lexeme::lexer(source).spanned() {
        let kind = match result {
            Ok(lexeme) => match lexeme.kind() {
                Some(kind) => kind,
                None => continue,
            },
            Err(()) => TokenKind::Unknown,
        };

        let span = TextRange::new(
            TextSize::from(span.start as u32),
            TextSize::from(span.end as u32),
        );
        tokens.push(Token {
            kind,
            text: SmolStr::new(&source[span]),
            span,
            range: cursor.range(span),
        });
    }

    Tokens {
        tokens,
        end: cursor.advance_to(TextSize::of(source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::LineIndex;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("definition relation permission nil definitions user_1"),
            vec![
                TokenKind::Definition,
                TokenKind::Relation,
                TokenKind::Permission,
                TokenKind::Nil,
                TokenKind::Ident,
                TokenKind::Ident,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("+ & - -> : = { } ( ) # | * /"),
            vec![
                TokenKind::Plus,
                TokenKind::Amp,
                TokenKind::Minus,
                TokenKind::Arrow,
                TokenKind::Colon,
                TokenKind::Eq,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Hash,
                TokenKind::Pipe,
                TokenKind::Star,
                TokenKind::Slash,
            ]
        );
    }

    #[test]
    fn test_arrow_without_spaces() {
        assert_eq!(
            kinds("parent->view"),
            vec![TokenKind::Ident, TokenKind::Arrow, TokenKind::Ident]
        );
    }

    #[test]
    fn test_comments_are_dropped_but_advance_positions() {
        let tokens = tokenize("// leading\n/* block\n comment */ user").tokens;

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "user");
        assert_eq!(tokens[0].range.start, SourcePos::new(3, 13));
        assert_eq!(tokens[0].range.end, SourcePos::new(3, 17));
    }

    #[test]
    fn test_unknown_character_does_not_abort() {
        let tokens = tokenize("user $ group").tokens;

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].kind, TokenKind::Unknown);
        assert_eq!(tokens[1].text, "$");
        assert_eq!(tokens[2].text, "group");
    }

    #[test]
    fn test_unterminated_block_comment_is_unknown() {
        let tokens = tokenize("user /* never closed").tokens;

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind, TokenKind::Unknown);
    }

    #[test]
    fn test_columns_on_one_long_line() {
        let source: String = std::iter::once("/* é */".to_string())
            .chain((0..3000).map(|i| format!(" definition d{i} {{}}")))
            .collect();

        let tokens = tokenize(&source);
        assert_eq!(tokens.tokens.len(), 4 * 3000);

        let index = LineIndex::new(&source);
        for token in tokens.tokens.iter().rev().take(8) {
            assert_eq!(token.range, index.range(&source, token.span));
        }

        let width = source.chars().count() as u32;
        assert_eq!(tokens.tokens[0].range.start, SourcePos::new(1, 9));
        assert_eq!(tokens.tokens.last().unwrap().range.end, SourcePos::new(1, width + 1));
        assert_eq!(tokens.end, SourcePos::new(1, width + 1));
    }

    #[test]
    fn test_end_position() {
        assert_eq!(tokenize("").end, SourcePos::new(1, 1));
        assert_eq!(tokenize("a\nbc").end, SourcePos::new(2, 3));
    }
}
