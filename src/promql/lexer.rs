use crate::promql::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Number(f64),
    /// `5m`, `1h30m`
    Duration(String),
    Str(String),
    /// Raw text between `[` and `]`.
    Range(String),

    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,

    Assign,
    EqEq,
    Ne,
    ReMatch,
    NotReMatch,
    Lt,
    Le,
    Gt,
    Ge,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    At,

    Eof,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == ':'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == ':'
}

pub(crate) fn lex(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0usize;
    let err = |offset: usize, msg: &str| ParseError::new(input, offset, msg);

    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        // Line comment.
        if c == '#' {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        let start = i;

        // Number: [0-9]+(.[0-9]+)?([eE][+-]?[0-9]+)? or .[0-9]+, or a duration [0-9]+[a-z]...
        if c.is_ascii_digit()
            || (c == '.' && i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit())
        {
            let mut plain_int = c != '.';
            if c == '.' {
                i += 1;
            }
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if plain_int
                && i + 1 < bytes.len()
                && bytes[i] == b'.'
                && bytes[i + 1].is_ascii_digit()
            {
                plain_int = false;
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }

            let exp_digits_at = |j: usize| -> Option<usize> {
                let mut k = j + 1;
                if k < bytes.len() && matches!(bytes[k], b'+' | b'-') {
                    k += 1;
                }
                (k < bytes.len() && bytes[k].is_ascii_digit()).then_some(k)
            };

            if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
                if let Some(k) = exp_digits_at(i) {
                    plain_int = false;
                    i = k;
                    while i < bytes.len() && bytes[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }

            if plain_int && i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                out.push(Token {
                    kind: TokenKind::Duration(input[start..i].to_owned()),
                    span: Span { start, end: i },
                });
                continue;
            }

            let v: f64 = input[start..i]
                .parse()
                .map_err(|_| err(start, "invalid number"))?;
            out.push(Token {
                kind: TokenKind::Number(v),
                span: Span { start, end: i },
            });
            continue;
        }

        if is_ident_start(c) {
            i += 1;
            while i < bytes.len() && is_ident_continue(bytes[i] as char) {
                i += 1;
            }
            out.push(Token {
                kind: TokenKind::Ident(input[start..i].to_owned()),
                span: Span { start, end: i },
            });
            continue;
        }

        if matches!(c, '"' | '\'' | '`') {
            let (value, end) = lex_string(input, start)?;
            i = end;
            out.push(Token {
                kind: TokenKind::Str(value),
                span: Span { start, end },
            });
            continue;
        }

        if c == '[' {
            let Some(close) = input[start..].find(']') else {
                return Err(err(start, "unterminated range, expected ']'"));
            };
            i = start + close + 1;
            out.push(Token {
                kind: TokenKind::Range(input[start + 1..start + close].trim().to_owned()),
                span: Span { start, end: i },
            });
            continue;
        }

        // Two-char operators
        if i + 1 < bytes.len() {
            let kind = match &bytes[i..i + 2] {
                b"==" => Some(TokenKind::EqEq),
                b"!=" => Some(TokenKind::Ne),
                b"=~" => Some(TokenKind::ReMatch),
                b"!~" => Some(TokenKind::NotReMatch),
                b"<=" => Some(TokenKind::Le),
                b">=" => Some(TokenKind::Ge),
                _ => None,
            };
            if let Some(kind) = kind {
                i += 2;
                out.push(Token {
                    kind,
                    span: Span { start, end: i },
                });
                continue;
            }
        }

        let kind = match c {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '=' => TokenKind::Assign,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '^' => TokenKind::Caret,
            '@' => TokenKind::At,
            _ => {
                let ch = input[start..].chars().next().unwrap_or(c);
                return Err(err(start, &format!("unexpected character {ch:?}")));
            }
        };
        i += 1;
        out.push(Token {
            kind,
            span: Span { start, end: i },
        });
    }

    out.push(Token {
        kind: TokenKind::Eof,
        span: Span {
            start: input.len(),
            end: input.len(),
        },
    });
    Ok(out)
}

/// Scan a quoted string starting at `start`; returns the unescaped value and the end offset.
///
/// Backtick strings are raw. Quote and backslash are ASCII, so byte scanning stays on UTF-8
/// boundaries.
fn lex_string(input: &str, start: usize) -> Result<(String, usize), ParseError> {
    let bytes = input.as_bytes();
    let quote = bytes[start];
    let raw = quote == b'`';
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if !raw => i += 2,
            b if b == quote => {
                let body = &input[start + 1..i];
                let value = if raw { body.to_owned() } else { unescape(body) };
                return Ok((value, i + 1));
            }
            _ => i += 1,
        }
    }
    Err(ParseError::new(input, start, "unterminated string literal"))
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/promql/lexer.rs"]
mod tests;
