use std::collections::BTreeMap;

use crate::error::UiError;
use crate::script::expand::ExpandedScript;
use crate::selector::selector_model::MatchCriterion;
use crate::trace::record::CodeRef;

/// One parsed statement, carrying its attribution back to the authored line.
#[derive(Debug, Clone)]
pub enum Stmt {
    Assign {
        var: String,
        expr: Expr,
        code: CodeRef,
    },
    Expr {
        expr: Expr,
        code: CodeRef,
    },
    For {
        var: String,
        iterable: Expr,
        body: Vec<Stmt>,
        code: CodeRef,
    },
}

impl Stmt {
    pub fn code(&self) -> &CodeRef {
        match self {
            Stmt::Assign { code, .. } | Stmt::Expr { code, .. } | Stmt::For { code, .. } => code,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Var(String),
    Str(String),
    Num(i64),
    /// `base[i]`: positional child selection.
    Index(Box<Expr>, usize),
    /// `base.match(criterion)`: children filtered by text or attributes.
    Match(Box<Expr>, MatchCriterion),
    /// API call: `tap(x)`, `len(x)`, `element("name")`, ...
    Call { name: String, args: Vec<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(i64),
    Bool(bool),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Eq,
}

struct Line {
    indent: usize,
    tokens: Vec<Token>,
    code: CodeRef,
}

/// Parse the expanded script into an instruction sequence.
///
/// The grammar covers what authored scripts actually use: assignments,
/// recognized API calls, indexing, `.match(…)`, `len(…)`, and
/// indentation-delimited `for … in …:` loops.
pub fn parse(expanded: &ExpandedScript) -> Result<Vec<Stmt>, UiError> {
    let mut lines = Vec::new();
    for (i, line) in expanded.lines.iter().enumerate() {
        let stripped = line.text.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }
        let code = expanded.code_ref(i).unwrap_or(CodeRef {
            current_code: line.text.clone(),
            original_lineno: line.original_lineno,
            original_code: String::new(),
        });
        let tokens = tokenize(&line.text, line.original_lineno)?;
        lines.push(Line {
            indent: indent_width(&line.text),
            tokens,
            code,
        });
    }

    let mut idx = 0;
    let base_indent = lines.first().map(|l| l.indent).unwrap_or(0);
    let stmts = parse_block(&lines, &mut idx, base_indent)?;
    if idx < lines.len() {
        return Err(UiError::ScriptSyntax {
            line: lines[idx].code.original_lineno,
            message: "unexpected indentation".into(),
        });
    }
    Ok(stmts)
}

fn parse_block(lines: &[Line], idx: &mut usize, indent: usize) -> Result<Vec<Stmt>, UiError> {
    let mut stmts = Vec::new();
    while *idx < lines.len() {
        let line = &lines[*idx];
        if line.indent < indent {
            break;
        }
        if line.indent > indent {
            return Err(UiError::ScriptSyntax {
                line: line.code.original_lineno,
                message: "unexpected indentation".into(),
            });
        }
        stmts.push(parse_stmt(lines, idx)?);
    }
    Ok(stmts)
}

fn parse_stmt(lines: &[Line], idx: &mut usize) -> Result<Stmt, UiError> {
    let line = &lines[*idx];
    let code = line.code.clone();
    let lineno = code.original_lineno;
    let tokens = &line.tokens;

    // for <var> in <expr>:
    if tokens.first() == Some(&Token::Ident("for".into())) {
        let var = match tokens.get(1) {
            Some(Token::Ident(v)) => v.clone(),
            _ => {
                return Err(UiError::ScriptSyntax {
                    line: lineno,
                    message: "expected loop variable after 'for'".into(),
                });
            }
        };
        if tokens.get(2) != Some(&Token::Ident("in".into())) {
            return Err(UiError::ScriptSyntax {
                line: lineno,
                message: "expected 'in' in for loop".into(),
            });
        }
        let mut cursor = 3;
        let iterable = parse_expr(tokens, &mut cursor, lineno)?;
        if tokens.get(cursor) != Some(&Token::Colon) {
            return Err(UiError::ScriptSyntax {
                line: lineno,
                message: "expected ':' at end of for loop header".into(),
            });
        }
        let header_indent = line.indent;
        *idx += 1;
        let body_indent = match lines.get(*idx) {
            Some(next) if next.indent > header_indent => next.indent,
            _ => {
                return Err(UiError::ScriptSyntax {
                    line: lineno,
                    message: "for loop has an empty body".into(),
                });
            }
        };
        let body = parse_block(lines, idx, body_indent)?;
        return Ok(Stmt::For {
            var,
            iterable,
            body,
            code,
        });
    }

    // <var> = <expr>
    if let (Some(Token::Ident(var)), Some(Token::Eq)) = (tokens.first(), tokens.get(1)) {
        let mut cursor = 2;
        let expr = parse_expr(tokens, &mut cursor, lineno)?;
        expect_end(tokens, cursor, lineno)?;
        *idx += 1;
        return Ok(Stmt::Assign {
            var: var.clone(),
            expr,
            code,
        });
    }

    // bare expression (an API call)
    let mut cursor = 0;
    let expr = parse_expr(tokens, &mut cursor, lineno)?;
    expect_end(tokens, cursor, lineno)?;
    *idx += 1;
    Ok(Stmt::Expr { expr, code })
}

fn expect_end(tokens: &[Token], cursor: usize, lineno: usize) -> Result<(), UiError> {
    if cursor < tokens.len() {
        return Err(UiError::ScriptSyntax {
            line: lineno,
            message: "trailing tokens after statement".into(),
        });
    }
    Ok(())
}

fn parse_expr(tokens: &[Token], cursor: &mut usize, lineno: usize) -> Result<Expr, UiError> {
    let mut expr = parse_primary(tokens, cursor, lineno)?;

    loop {
        match tokens.get(*cursor) {
            Some(Token::LBracket) => {
                *cursor += 1;
                let index = match tokens.get(*cursor) {
                    Some(Token::Num(n)) if *n >= 0 => *n as usize,
                    _ => {
                        return Err(UiError::ScriptSyntax {
                            line: lineno,
                            message: "expected a non-negative integer index".into(),
                        });
                    }
                };
                *cursor += 1;
                if tokens.get(*cursor) != Some(&Token::RBracket) {
                    return Err(UiError::ScriptSyntax {
                        line: lineno,
                        message: "expected ']'".into(),
                    });
                }
                *cursor += 1;
                expr = Expr::Index(Box::new(expr), index);
            }
            Some(Token::Dot) => {
                *cursor += 1;
                let method = match tokens.get(*cursor) {
                    Some(Token::Ident(name)) => name.clone(),
                    _ => {
                        return Err(UiError::ScriptSyntax {
                            line: lineno,
                            message: "expected method name after '.'".into(),
                        });
                    }
                };
                *cursor += 1;
                if method != "match" {
                    return Err(UiError::ScriptSyntax {
                        line: lineno,
                        message: format!("unknown method '{}'", method),
                    });
                }
                if tokens.get(*cursor) != Some(&Token::LParen) {
                    return Err(UiError::ScriptSyntax {
                        line: lineno,
                        message: "expected '(' after 'match'".into(),
                    });
                }
                *cursor += 1;
                let criterion = parse_criterion(tokens, cursor, lineno)?;
                if tokens.get(*cursor) != Some(&Token::RParen) {
                    return Err(UiError::ScriptSyntax {
                        line: lineno,
                        message: "expected ')' after match argument".into(),
                    });
                }
                *cursor += 1;
                expr = Expr::Match(Box::new(expr), criterion);
            }
            _ => break,
        }
    }
    Ok(expr)
}

fn parse_primary(tokens: &[Token], cursor: &mut usize, lineno: usize) -> Result<Expr, UiError> {
    match tokens.get(*cursor) {
        Some(Token::Ident(name)) => {
            let name = name.clone();
            *cursor += 1;
            if tokens.get(*cursor) == Some(&Token::LParen) {
                *cursor += 1;
                let mut args = Vec::new();
                if tokens.get(*cursor) != Some(&Token::RParen) {
                    loop {
                        args.push(parse_expr(tokens, cursor, lineno)?);
                        match tokens.get(*cursor) {
                            Some(Token::Comma) => *cursor += 1,
                            _ => break,
                        }
                    }
                }
                if tokens.get(*cursor) != Some(&Token::RParen) {
                    return Err(UiError::ScriptSyntax {
                        line: lineno,
                        message: format!("expected ')' in call to '{}'", name),
                    });
                }
                *cursor += 1;
                Ok(Expr::Call { name, args })
            } else {
                Ok(Expr::Var(name))
            }
        }
        Some(Token::Str(s)) => {
            let s = s.clone();
            *cursor += 1;
            Ok(Expr::Str(s))
        }
        Some(Token::Num(n)) => {
            let n = *n;
            *cursor += 1;
            Ok(Expr::Num(n))
        }
        other => Err(UiError::ScriptSyntax {
            line: lineno,
            message: format!("unexpected token {:?}", other),
        }),
    }
}

/// A match argument: a quoted text substring or a `{"field": value}` map.
fn parse_criterion(
    tokens: &[Token],
    cursor: &mut usize,
    lineno: usize,
) -> Result<MatchCriterion, UiError> {
    match tokens.get(*cursor) {
        Some(Token::Str(s)) => {
            let s = s.clone();
            *cursor += 1;
            Ok(MatchCriterion::Text(s))
        }
        Some(Token::LBrace) => {
            *cursor += 1;
            let mut map = BTreeMap::new();
            if tokens.get(*cursor) != Some(&Token::RBrace) {
                loop {
                    let key = match tokens.get(*cursor) {
                        Some(Token::Str(k)) => k.clone(),
                        _ => {
                            return Err(UiError::ScriptSyntax {
                                line: lineno,
                                message: "expected quoted key in match map".into(),
                            });
                        }
                    };
                    *cursor += 1;
                    if tokens.get(*cursor) != Some(&Token::Colon) {
                        return Err(UiError::ScriptSyntax {
                            line: lineno,
                            message: "expected ':' in match map".into(),
                        });
                    }
                    *cursor += 1;
                    let value = match tokens.get(*cursor) {
                        Some(Token::Str(v)) => serde_json::json!(v),
                        Some(Token::Num(n)) => serde_json::json!(n),
                        Some(Token::Bool(b)) => serde_json::json!(b),
                        _ => {
                            return Err(UiError::ScriptSyntax {
                                line: lineno,
                                message: "expected value in match map".into(),
                            });
                        }
                    };
                    *cursor += 1;
                    map.insert(key, value);
                    match tokens.get(*cursor) {
                        Some(Token::Comma) => *cursor += 1,
                        _ => break,
                    }
                }
            }
            if tokens.get(*cursor) != Some(&Token::RBrace) {
                return Err(UiError::ScriptSyntax {
                    line: lineno,
                    message: "expected '}' in match map".into(),
                });
            }
            *cursor += 1;
            Ok(MatchCriterion::Attrs(map))
        }
        other => Err(UiError::ScriptSyntax {
            line: lineno,
            message: format!("match expects a string or a map, got {:?}", other),
        }),
    }
}

fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += 4,
            _ => break,
        }
    }
    width
}

fn tokenize(line: &str, lineno: usize) -> Result<Vec<Token>, UiError> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '#' => break,
            '(' => push_symbol(&mut tokens, &mut chars, Token::LParen),
            ')' => push_symbol(&mut tokens, &mut chars, Token::RParen),
            '[' => push_symbol(&mut tokens, &mut chars, Token::LBracket),
            ']' => push_symbol(&mut tokens, &mut chars, Token::RBracket),
            '{' => push_symbol(&mut tokens, &mut chars, Token::LBrace),
            '}' => push_symbol(&mut tokens, &mut chars, Token::RBrace),
            ',' => push_symbol(&mut tokens, &mut chars, Token::Comma),
            ':' => push_symbol(&mut tokens, &mut chars, Token::Colon),
            '.' => push_symbol(&mut tokens, &mut chars, Token::Dot),
            '=' => push_symbol(&mut tokens, &mut chars, Token::Eq),
            '\'' | '"' => {
                let quote = c;
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                for ch in chars.by_ref() {
                    if ch == quote {
                        closed = true;
                        break;
                    }
                    value.push(ch);
                }
                if !closed {
                    return Err(UiError::ScriptSyntax {
                        line: lineno,
                        message: "unterminated string literal".into(),
                    });
                }
                tokens.push(Token::Str(value));
            }
            c if c.is_ascii_digit() => {
                let mut value = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        value.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n = value.parse::<i64>().map_err(|_| UiError::ScriptSyntax {
                    line: lineno,
                    message: format!("invalid number '{}'", value),
                })?;
                tokens.push(Token::Num(n));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match ident.as_str() {
                    "true" | "True" => tokens.push(Token::Bool(true)),
                    "false" | "False" => tokens.push(Token::Bool(false)),
                    _ => tokens.push(Token::Ident(ident)),
                }
            }
            other => {
                return Err(UiError::ScriptSyntax {
                    line: lineno,
                    message: format!("unexpected character '{}'", other),
                });
            }
        }
    }
    Ok(tokens)
}

fn push_symbol(
    tokens: &mut Vec<Token>,
    chars: &mut std::iter::Peekable<std::str::Chars>,
    token: Token,
) {
    chars.next();
    tokens.push(token);
}
