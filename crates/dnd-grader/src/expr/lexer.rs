use dnd_core::{CompareOp, DndError};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    Str(String),
    Ident(String),
    LBracket,
    RBracket,
    LParen,
    RParen,
    Dot,
    Comma,
    Assign,
    Compare(CompareOp),
    AndAnd,
    OrOr,
    Bang,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    /// Character offset into the source.
    pub(crate) offset: usize,
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, DndError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut index = 0usize;

    while index < chars.len() {
        let ch = chars[index];
        let offset = index;

        if ch.is_whitespace() {
            index += 1;
            continue;
        }

        if ch == '#' {
            while index < chars.len() && chars[index] != '\n' {
                index += 1;
            }
            continue;
        }

        if ch.is_ascii_digit() || (ch == '.' && peek_is_digit(&chars, index + 1)) {
            let start = index;
            while index < chars.len() && (chars[index].is_ascii_digit() || chars[index] == '.') {
                index += 1;
            }
            let text: String = chars[start..index].iter().collect();
            let value = text.parse::<f64>().map_err(|_| {
                parse_error(offset, format!("Invalid number literal \"{}\".", text))
            })?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                offset,
            });
            continue;
        }

        if ch.is_alphabetic() || ch == '_' {
            let start = index;
            while index < chars.len() && (chars[index].is_alphanumeric() || chars[index] == '_') {
                index += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident(chars[start..index].iter().collect()),
                offset,
            });
            continue;
        }

        if ch == '\'' || ch == '"' {
            let quote = ch;
            index += 1;
            let mut value = String::new();
            loop {
                let Some(&next) = chars.get(index) else {
                    return Err(parse_error(offset, "Unterminated string literal."));
                };
                index += 1;
                match next {
                    '\\' => {
                        let Some(&escaped) = chars.get(index) else {
                            return Err(parse_error(offset, "Unterminated string literal."));
                        };
                        value.push(escaped);
                        index += 1;
                    }
                    c if c == quote => break,
                    c => value.push(c),
                }
            }
            tokens.push(Token {
                kind: TokenKind::Str(value),
                offset,
            });
            continue;
        }

        let next = chars.get(index + 1).copied();
        let (kind, width) = match (ch, next) {
            ('=', Some('=')) => (TokenKind::Compare(CompareOp::Eq), 2),
            ('!', Some('=')) => (TokenKind::Compare(CompareOp::Ne), 2),
            ('<', Some('=')) => (TokenKind::Compare(CompareOp::Le), 2),
            ('>', Some('=')) => (TokenKind::Compare(CompareOp::Ge), 2),
            ('&', Some('&')) => (TokenKind::AndAnd, 2),
            ('|', Some('|')) => (TokenKind::OrOr, 2),
            ('<', _) => (TokenKind::Compare(CompareOp::Lt), 1),
            ('>', _) => (TokenKind::Compare(CompareOp::Gt), 1),
            ('=', _) => (TokenKind::Assign, 1),
            ('!', _) => (TokenKind::Bang, 1),
            ('[', _) => (TokenKind::LBracket, 1),
            (']', _) => (TokenKind::RBracket, 1),
            ('(', _) => (TokenKind::LParen, 1),
            (')', _) => (TokenKind::RParen, 1),
            ('.', _) => (TokenKind::Dot, 1),
            (',', _) => (TokenKind::Comma, 1),
            _ => {
                return Err(parse_error(
                    offset,
                    format!("Unexpected character '{}'.", ch),
                ))
            }
        };
        tokens.push(Token { kind, offset });
        index += width;
    }

    Ok(tokens)
}

fn peek_is_digit(chars: &[char], index: usize) -> bool {
    chars.get(index).is_some_and(|ch| ch.is_ascii_digit())
}

pub(crate) fn parse_error(offset: usize, message: impl Into<String>) -> DndError {
    DndError::new(
        "EXPR_PARSE_ERROR",
        format!("at {}: {}", offset, message.into()),
    )
}
