use dnd_core::{CompareOp, DndError};

use super::lexer::{parse_error, tokenize, Token, TokenKind};

/// Names the root of every query resolves to.
pub const ROOT_NAMES: [&str; 2] = ["draggables", "dragabbles"];

/// Deepest nesting of brackets, calls and `not` a constraint may use.
const MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Count,
    X,
    Y,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    List(Vec<Expr>),
    Root,
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Property {
        target: Box<Expr>,
        property: Property,
    },
    On {
        target: Box<Expr>,
        target_id: Box<Expr>,
    },
    Contains {
        target: Box<Expr>,
        ids: Vec<Expr>,
        exact: Option<Box<Expr>>,
    },
    Compare {
        op: CompareOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

pub fn parse_expression(source: &str) -> Result<Expr, DndError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        position: 0,
        source_len: source.chars().count(),
        depth: 0,
    };
    let expr = parser.parse_or()?;
    if let Some(token) = parser.peek() {
        return Err(parse_error(
            token.offset,
            "Unexpected trailing input after expression.",
        ));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    source_len: usize,
    depth: usize,
}

enum Argument {
    Positional(Expr),
    Keyword(String, Expr, usize),
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|token| &token.kind)
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek_kind(), Some(TokenKind::Ident(name)) if name == keyword)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn offset(&self) -> usize {
        self.peek().map(|token| token.offset).unwrap_or(self.source_len)
    }

    fn expect(&mut self, kind: TokenKind, label: &str) -> Result<(), DndError> {
        match self.peek_kind() {
            Some(found) if *found == kind => {
                self.position += 1;
                Ok(())
            }
            _ => Err(parse_error(self.offset(), format!("Expected {}.", label))),
        }
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, DndError>,
    ) -> Result<T, DndError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(parse_error(
                self.offset(),
                format!("Expression nests deeper than {} levels.", MAX_NESTING_DEPTH),
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_or(&mut self) -> Result<Expr, DndError> {
        self.nested(Self::parse_or_chain)
    }

    fn parse_or_chain(&mut self) -> Result<Expr, DndError> {
        let mut lhs = self.parse_and()?;
        while matches!(self.peek_kind(), Some(TokenKind::OrOr)) || self.peek_keyword("or") {
            self.position += 1;
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, DndError> {
        let mut lhs = self.parse_not()?;
        while matches!(self.peek_kind(), Some(TokenKind::AndAnd)) || self.peek_keyword("and") {
            self.position += 1;
            let rhs = self.parse_not()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr, DndError> {
        if matches!(self.peek_kind(), Some(TokenKind::Bang)) || self.peek_keyword("not") {
            self.position += 1;
            let inner = self.nested(Self::parse_not)?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    /// `a < b < c` reads as `a < b and b < c`.
    fn parse_comparison(&mut self) -> Result<Expr, DndError> {
        let first = self.parse_postfix()?;
        let mut links = Vec::new();
        let mut lhs = first.clone();
        while let Some(TokenKind::Compare(op)) = self.peek_kind() {
            let op = *op;
            self.position += 1;
            let rhs = self.parse_postfix()?;
            links.push(Expr::Compare {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs.clone()),
            });
            lhs = rhs;
        }

        let mut links = links.into_iter();
        let Some(mut chained) = links.next() else {
            return Ok(first);
        };
        for link in links {
            chained = Expr::And(Box::new(chained), Box::new(link));
        }
        Ok(chained)
    }

    fn parse_postfix(&mut self) -> Result<Expr, DndError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                Some(TokenKind::LBracket) => {
                    self.position += 1;
                    let index = self.parse_or()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    expr = Expr::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                Some(TokenKind::Dot) => {
                    self.position += 1;
                    let offset = self.offset();
                    let Some(Token {
                        kind: TokenKind::Ident(name),
                        ..
                    }) = self.advance()
                    else {
                        return Err(parse_error(offset, "Expected a name after '.'."));
                    };
                    expr = self.parse_member(expr, &name, offset)?;
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_member(&mut self, target: Expr, name: &str, offset: usize) -> Result<Expr, DndError> {
        let property = match name {
            "count" => Some(Property::Count),
            "x" => Some(Property::X),
            "y" => Some(Property::Y),
            _ => None,
        };
        if let Some(property) = property {
            return Ok(Expr::Property {
                target: Box::new(target),
                property,
            });
        }

        match name {
            "on" => {
                let args = self.parse_call_arguments()?;
                let mut positional = Vec::new();
                for argument in args {
                    match argument {
                        Argument::Positional(expr) => positional.push(expr),
                        Argument::Keyword(key, _, at) => {
                            return Err(argument_error(
                                at,
                                format!("on() does not accept keyword \"{}\".", key),
                            ))
                        }
                    }
                }
                if positional.len() != 1 {
                    return Err(argument_error(
                        offset,
                        format!("on() takes exactly one target id, got {}.", positional.len()),
                    ));
                }
                Ok(Expr::On {
                    target: Box::new(target),
                    target_id: Box::new(positional.remove(0)),
                })
            }
            "contains" => {
                let args = self.parse_call_arguments()?;
                let mut ids = Vec::new();
                let mut exact = None;
                for argument in args {
                    match argument {
                        Argument::Positional(expr) if exact.is_none() => ids.push(expr),
                        Argument::Positional(_) => {
                            return Err(argument_error(
                                offset,
                                "contains() positional ids must precede exact=.",
                            ))
                        }
                        Argument::Keyword(key, expr, _) if key == "exact" && exact.is_none() => {
                            exact = Some(Box::new(expr));
                        }
                        Argument::Keyword(key, _, at) => {
                            return Err(argument_error(
                                at,
                                format!("contains() does not accept keyword \"{}\".", key),
                            ))
                        }
                    }
                }
                if ids.is_empty() {
                    return Err(argument_error(
                        offset,
                        "contains() needs at least one draggable id.",
                    ));
                }
                Ok(Expr::Contains {
                    target: Box::new(target),
                    ids,
                    exact,
                })
            }
            _ => Err(DndError::new(
                "EXPR_UNKNOWN_PROPERTY",
                format!(
                    "at {}: Unknown property \"{}\"; expected count, x, y, on() or contains().",
                    offset, name
                ),
            )),
        }
    }

    fn parse_call_arguments(&mut self) -> Result<Vec<Argument>, DndError> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if matches!(self.peek_kind(), Some(TokenKind::RParen)) {
            self.position += 1;
            return Ok(args);
        }
        loop {
            let is_keyword = matches!(self.peek_kind(), Some(TokenKind::Ident(_)))
                && matches!(
                    self.tokens.get(self.position + 1).map(|token| &token.kind),
                    Some(TokenKind::Assign)
                );
            if is_keyword {
                let offset = self.offset();
                let Some(Token {
                    kind: TokenKind::Ident(key),
                    ..
                }) = self.advance()
                else {
                    return Err(parse_error(offset, "Expected keyword name."));
                };
                self.position += 1;
                args.push(Argument::Keyword(key, self.parse_or()?, offset));
            } else {
                args.push(Argument::Positional(self.parse_or()?));
            }

            match self.peek_kind() {
                Some(TokenKind::Comma) => self.position += 1,
                Some(TokenKind::RParen) => {
                    self.position += 1;
                    return Ok(args);
                }
                _ => return Err(parse_error(self.offset(), "Expected ',' or ')'.")),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, DndError> {
        let offset = self.offset();
        let Some(token) = self.advance() else {
            return Err(parse_error(offset, "Unexpected end of expression."));
        };
        match token.kind {
            TokenKind::Number(value) => Ok(Expr::Number(value)),
            TokenKind::Str(value) => Ok(Expr::Str(value)),
            TokenKind::LParen => {
                let expr = self.parse_or()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                let mut items = Vec::new();
                if matches!(self.peek_kind(), Some(TokenKind::RBracket)) {
                    self.position += 1;
                    return Ok(Expr::List(items));
                }
                loop {
                    items.push(self.parse_or()?);
                    match self.peek_kind() {
                        Some(TokenKind::Comma) => {
                            self.position += 1;
                            if matches!(self.peek_kind(), Some(TokenKind::RBracket)) {
                                self.position += 1;
                                return Ok(Expr::List(items));
                            }
                        }
                        Some(TokenKind::RBracket) => {
                            self.position += 1;
                            return Ok(Expr::List(items));
                        }
                        _ => return Err(parse_error(self.offset(), "Expected ',' or ']'.")),
                    }
                }
            }
            TokenKind::Ident(name) => match name.as_str() {
                "true" | "True" => Ok(Expr::Bool(true)),
                "false" | "False" => Ok(Expr::Bool(false)),
                _ if ROOT_NAMES.contains(&name.as_str()) => Ok(Expr::Root),
                _ => Err(DndError::new(
                    "EXPR_UNKNOWN_NAME",
                    format!(
                        "at {}: Unknown name \"{}\"; queries start from \"draggables\".",
                        offset, name
                    ),
                )),
            },
            _ => Err(parse_error(offset, "Expected a value.")),
        }
    }
}

fn argument_error(offset: usize, message: impl Into<String>) -> DndError {
    DndError::new(
        "EXPR_ARGUMENT_INVALID",
        format!("at {}: {}", offset, message.into()),
    )
}
