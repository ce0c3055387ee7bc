//! AMR recursive descent parser.
//!
//! Parses token streams into an [`Instance`] tree. Rejects unbalanced
//! brackets, instances without a `/` separator, roles without a tail and
//! trailing content after the root.

use crate::{Error, Result};
use super::ast::{Instance, TreeTail};
use super::lexer::{Token, TokenKind};

/// Deepest instance nesting accepted.
pub const MAX_DEPTH: usize = 512;

/// Parser state: a token slice, a cursor and the current nesting depth.
struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0, depth: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn advance(&mut self) -> &Token {
        let tok = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<&Token> {
        if self.peek_kind() == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn unexpected(&self, what: &str) -> Error {
        let tok = self.peek();
        let found = if tok.kind == TokenKind::Eof {
            "end of input".to_string()
        } else {
            format!("'{}'", tok.text)
        };
        Error::SyntaxError {
            position: tok.span.start,
            message: format!("Expected {what}, got {found}"),
        }
    }
}

/// Parse exactly one root instance from tokens.
pub fn parse_root(tokens: &[Token]) -> Result<Instance> {
    if tokens.is_empty() {
        return Err(Error::SyntaxError { position: 0, message: "Empty token stream".into() });
    }
    let mut p = Parser::new(tokens);
    let root = parse_instance(&mut p)?;
    if !p.at(TokenKind::Eof) {
        return Err(Error::SyntaxError {
            position: p.peek().span.start,
            message: format!("Unexpected content after root instance: '{}'", p.peek().text),
        });
    }
    Ok(root)
}

// ============================================================================
// Grammar rules
// ============================================================================

fn parse_instance(p: &mut Parser) -> Result<Instance> {
    if p.depth >= MAX_DEPTH {
        return Err(Error::SyntaxError {
            position: p.peek().span.start,
            message: format!("Instances nested deeper than {MAX_DEPTH}"),
        });
    }
    p.depth += 1;
    let instance = parse_instance_body(p);
    p.depth -= 1;
    instance
}

fn parse_instance_body(p: &mut Parser) -> Result<Instance> {
    p.expect(TokenKind::LParen, "'('")?;
    let short = p.expect(TokenKind::Symbol, "short name")?.text.clone();
    p.expect(TokenKind::Slash, "'/' after short name")?;
    let concept = match p.peek_kind() {
        TokenKind::Symbol | TokenKind::Quoted => p.advance().text.clone(),
        _ => return Err(p.unexpected("concept")),
    };

    let mut instance = Instance::new(short, concept);
    while p.at(TokenKind::Role) {
        let role = p.advance().text.clone();
        let tail = parse_tail(p)?;
        instance.relations.push((role, tail));
    }

    p.expect(TokenKind::RParen, "role or ')'")?;
    Ok(instance)
}

fn parse_tail(p: &mut Parser) -> Result<TreeTail> {
    match p.peek_kind() {
        TokenKind::LParen => Ok(TreeTail::Instance(Box::new(parse_instance(p)?))),
        TokenKind::Symbol => Ok(TreeTail::Symbol(p.advance().text.clone())),
        TokenKind::Quoted => Ok(TreeTail::Quoted(p.advance().text.clone())),
        _ => Err(p.unexpected("relation tail")),
    }
}
