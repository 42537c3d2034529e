//! Recursive-descent parser over the token stream.
//!
//! ```text
//! Schema      := Definition*
//! Definition  := 'definition' Path '{' (Relation | Permission)* '}'
//! Relation    := 'relation' Name ':' TypeRef ('|' TypeRef)*
//! Permission  := 'permission' Name '=' Expression
//! TypeRef     := Path ('#' Name | ':' '*')?
//! Path        := Name ('/' Name)?
//! Expression  := Term (('+' | '-') Term)*
//! Term        := Factor ('&' Factor)*
//! Factor      := Name ('->' Name)? | 'nil' | '(' Expression ')'
//! ```
//!
//! Binary operators are left-associative and `&` binds tighter than `+`/`-`.

use smol_str::SmolStr;

use super::error::{ParseError, ParseErrorKind};
use super::lexer::{Token, TokenKind, Tokens};
use super::{ParseOptions, ParseOutput};
use crate::base::{SourcePos, SourceRange};
use crate::syntax::{
    ArrowExpr, BinaryExpr, BinaryOp, Definition, Expression, Permission, Relation, RelationRef,
    Schema, TypeRef,
};

type PResult<T> = Result<T, ParseError>;

/// Parenthesis nesting beyond this is rejected rather than risking the stack.
const MAX_NESTING: usize = 128;

pub(super) struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    /// Position just past the input
    end: SourcePos,
    /// End of the most recently consumed token
    prev_end: SourcePos,
    depth: usize,
    options: ParseOptions,
    errors: Vec<ParseError>,
}

impl<'t> Parser<'t> {
    pub(super) fn new(tokens: &'t Tokens, options: &ParseOptions) -> Self {
        Self {
            tokens: &tokens.tokens,
            pos: 0,
            end: tokens.end,
            prev_end: SourcePos::new(1, 1),
            depth: 0,
            options: *options,
            errors: Vec::new(),
        }
    }

    pub(super) fn parse_schema(mut self) -> ParseOutput {
        let mut definitions = Vec::new();

        while !self.at_end() && !self.error_budget_exhausted() {
            let result = if self.at(TokenKind::Definition) {
                self.parse_definition()
            } else {
                Err(self.error_here("`definition`"))
            };

            match result {
                Ok(definition) => definitions.push(definition),
                Err(error) if self.options.recover => {
                    self.errors.push(error);
                    self.skip_until(|kind| kind == TokenKind::Definition);
                }
                Err(error) => {
                    return ParseOutput {
                        schema: None,
                        errors: vec![error],
                    };
                }
            }
        }

        ParseOutput {
            schema: Some(Schema { definitions }),
            errors: self.errors,
        }
    }

    fn parse_definition(&mut self) -> PResult<Definition> {
        let start = self.expect(TokenKind::Definition, "`definition`")?.range.start;
        let (name, name_range) = self.parse_path("definition name")?;
        self.expect(TokenKind::LBrace, "`{`")?;

        let mut relations = Vec::new();
        let mut permissions = Vec::new();

        while !self.error_budget_exhausted() {
            match self.peek_kind() {
                Some(TokenKind::RBrace) => {
                    self.bump();
                    break;
                }
                Some(TokenKind::Relation) => match self.parse_relation() {
                    Ok(relation) => relations.push(relation),
                    Err(error) => self.member_error(error)?,
                },
                Some(TokenKind::Permission) => match self.parse_permission() {
                    Ok(permission) => permissions.push(permission),
                    Err(error) => self.member_error(error)?,
                },
                Some(TokenKind::Definition) | None => {
                    // Unclosed body: the definition ends where the next one starts
                    let error = self.error_here("`}`");
                    if !self.options.recover {
                        return Err(error);
                    }
                    self.errors.push(error);
                    break;
                }
                Some(_) => {
                    let error = self.error_here("`relation`, `permission` or `}`");
                    self.member_error(error)?;
                }
            }
        }

        Ok(Definition {
            name,
            name_range,
            range: SourceRange::new(start, self.prev_end),
            relations,
            permissions,
        })
    }

    fn parse_relation(&mut self) -> PResult<Relation> {
        let start = self.expect(TokenKind::Relation, "`relation`")?.range.start;
        let name = self.expect(TokenKind::Ident, "relation name")?;
        self.expect(TokenKind::Colon, "`:`")?;

        let mut allowed_types = vec![self.parse_type_ref()?];
        while self.eat(TokenKind::Pipe).is_some() {
            allowed_types.push(self.parse_type_ref()?);
        }

        Ok(Relation {
            name: name.text.clone(),
            name_range: name.range,
            range: SourceRange::new(start, self.prev_end),
            allowed_types,
        })
    }

    fn parse_type_ref(&mut self) -> PResult<TypeRef> {
        let (path, path_range) = self.parse_path("type name")?;
        let mut relation_name = None;
        let mut relation_name_range = None;
        let mut wildcard = false;

        if self.eat(TokenKind::Hash).is_some() {
            let relation = self.expect(TokenKind::Ident, "relation name after `#`")?;
            relation_name = Some(relation.text.clone());
            relation_name_range = Some(relation.range);
        } else if self.eat(TokenKind::Colon).is_some() {
            self.expect(TokenKind::Star, "`*` after `:`")?;
            wildcard = true;
        }

        Ok(TypeRef {
            path,
            path_range,
            relation_name,
            relation_name_range,
            wildcard,
            range: SourceRange::new(path_range.start, self.prev_end),
        })
    }

    /// `name` or `prefix/name`, written without whitespace.
    fn parse_path(&mut self, expected: &'static str) -> PResult<(SmolStr, SourceRange)> {
        let first = self.expect(TokenKind::Ident, expected)?;
        let Some(slash) = self.eat(TokenKind::Slash) else {
            return Ok((first.text.clone(), first.range));
        };
        let second = self.expect(TokenKind::Ident, "type name after `/`")?;

        let path = SmolStr::from(format!("{}/{}", first.text, second.text));
        let range = first.range.cover(second.range);
        if first.span.end() != slash.span.start() || slash.span.end() != second.span.start() {
            return Err(ParseError::new(ParseErrorKind::SpacedPath(path), range));
        }
        Ok((path, range))
    }

    fn parse_permission(&mut self) -> PResult<Permission> {
        let start = self.expect(TokenKind::Permission, "`permission`")?.range.start;
        let name = self.expect(TokenKind::Ident, "permission name")?;
        self.expect(TokenKind::Eq, "`=`")?;
        let expression = self.parse_expression()?;

        Ok(Permission {
            name: name.text.clone(),
            name_range: name.range,
            range: SourceRange::new(start, self.prev_end),
            expression,
        })
    }

    fn parse_expression(&mut self) -> PResult<Expression> {
        let start = self.peek_start();
        let mut lhs = self.parse_term()?;

        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinaryOp::Union,
                Some(TokenKind::Minus) => BinaryOp::Exclusion,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_term()?;
            lhs = self.binary(op, lhs, rhs, start);
        }

        Ok(lhs)
    }

    fn parse_term(&mut self) -> PResult<Expression> {
        let start = self.peek_start();
        let mut lhs = self.parse_factor()?;

        while self.eat(TokenKind::Amp).is_some() {
            let rhs = self.parse_factor()?;
            lhs = self.binary(BinaryOp::Intersection, lhs, rhs, start);
        }

        Ok(lhs)
    }

    fn parse_factor(&mut self) -> PResult<Expression> {
        if let Some(nil) = self.eat(TokenKind::Nil) {
            return Ok(Expression::Nil(nil.range));
        }

        if let Some(open) = self.eat(TokenKind::LParen) {
            if self.depth >= MAX_NESTING {
                return Err(ParseError::new(ParseErrorKind::TooDeep, open.range));
            }
            self.depth += 1;
            let inner = self.parse_expression();
            self.depth -= 1;
            let inner = inner?;
            self.expect(TokenKind::RParen, "`)`")?;
            return Ok(inner);
        }

        let left = self.relation_ref("relation or permission name")?;
        if self.eat(TokenKind::Arrow).is_none() {
            return Ok(Expression::Reference(left));
        }
        let right = self.relation_ref("relation or permission name after `->`")?;

        Ok(Expression::Arrow(ArrowExpr {
            range: left.range.cover(right.range),
            left,
            right,
        }))
    }

    fn relation_ref(&mut self, expected: &'static str) -> PResult<RelationRef> {
        let token = self.expect(TokenKind::Ident, expected)?;
        Ok(RelationRef {
            relation_name: token.text.clone(),
            range: token.range,
        })
    }

    fn binary(&self, op: BinaryOp, lhs: Expression, rhs: Expression, start: SourcePos) -> Expression {
        Expression::Binary(Box::new(BinaryExpr {
            op,
            lhs,
            rhs,
            range: SourceRange::new(start, self.prev_end),
        }))
    }

    // ------------------------------------------------------------------------
    // Recovery
    // ------------------------------------------------------------------------

    /// Record `error` and skip to the next member when recovering;
    /// otherwise propagate it.
    fn member_error(&mut self, error: ParseError) -> PResult<()> {
        if !self.options.recover {
            return Err(error);
        }
        self.errors.push(error);
        self.skip_until(|kind| kind.is_declaration_keyword() || kind == TokenKind::RBrace);
        Ok(())
    }

    fn skip_until(&mut self, stop: impl Fn(TokenKind) -> bool) {
        let from = self.pos;
        while let Some(kind) = self.peek_kind() {
            if stop(kind) {
                break;
            }
            self.bump();
        }
        tracing::trace!(skipped = self.pos - from, "recovered after syntax error");
    }

    /// Only a recovering parse has a budget; a strict one stops at its
    /// first error anyway.
    fn error_budget_exhausted(&self) -> bool {
        self.options.recover && self.errors.len() >= self.options.max_errors.max(1)
    }

    // ------------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------------

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn peek_start(&self) -> SourcePos {
        self.peek().map_or(self.end, |t| t.range.start)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn bump(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        self.prev_end = token.range.end;
        Some(token)
    }

    fn eat(&mut self, kind: TokenKind) -> Option<&'t Token> {
        if self.at(kind) { self.bump() } else { None }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> PResult<&'t Token> {
        match self.eat(kind) {
            Some(token) => Ok(token),
            None => Err(self.error_here(expected)),
        }
    }

    fn error_here(&self, expected: &'static str) -> ParseError {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Unknown => ParseError::new(
                ParseErrorKind::UnknownToken(token.text.clone()),
                token.range,
            ),
            Some(token) => ParseError::new(
                ParseErrorKind::Unexpected {
                    expected,
                    found: token.text.clone(),
                },
                token.range,
            ),
            None => ParseError::new(
                ParseErrorKind::UnexpectedEof { expected },
                SourceRange::empty(self.end),
            ),
        }
    }
}
