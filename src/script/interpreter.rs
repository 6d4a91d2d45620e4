use std::collections::{BTreeMap, HashMap};

use crate::device::event::ScrollDirection;
use crate::error::UiError;
use crate::script::expand::API_NAMES;
use crate::script::parser::{Expr, Stmt};
use crate::selector::selector_model::Selector;
use crate::selector::session::ScriptSession;
use crate::trace::record::CodeRef;

/// Runtime value of a script expression.
#[derive(Debug, Clone)]
pub enum Value {
    Selector(Selector),
    SelectorList(Vec<Selector>),
    Text(String),
    Attrs(BTreeMap<String, serde_json::Value>),
    Bool(bool),
    Num(i64),
    Unit,
}

/// Executes a parsed instruction sequence against a session.
///
/// Strictly sequential: one UI action at a time, each blocking until its
/// observation is available. Any error carries the authored-line attribution
/// of the statement that raised it.
pub struct Interpreter<'a> {
    session: &'a mut ScriptSession,
    env: HashMap<String, Value>,
}

impl<'a> Interpreter<'a> {
    pub fn new(session: &'a mut ScriptSession) -> Self {
        Interpreter {
            session,
            env: HashMap::new(),
        }
    }

    pub fn run(&mut self, stmts: &[Stmt]) -> Result<(), UiError> {
        for stmt in stmts {
            self.exec(stmt)?;
        }
        Ok(())
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<(), UiError> {
        match stmt {
            Stmt::Assign { var, expr, code } => {
                let value = self.eval(expr, code)?;
                self.env.insert(var.clone(), value);
                Ok(())
            }
            Stmt::Expr { expr, code } => {
                self.eval(expr, code)?;
                Ok(())
            }
            Stmt::For {
                var,
                iterable,
                body,
                code,
            } => match self.eval(iterable, code)? {
                Value::Selector(mut base) => {
                    while let Some(item) = self.session.next_item(&mut base, Some(code))? {
                        self.env.insert(var.clone(), Value::Selector(item));
                        self.run(body)?;
                    }
                    Ok(())
                }
                Value::SelectorList(items) => {
                    for item in items {
                        self.env.insert(var.clone(), Value::Selector(item));
                        self.run(body)?;
                    }
                    Ok(())
                }
                _ => Err(UiError::ScriptSyntax {
                    line: code.original_lineno,
                    message: "for loop expects an element or element list".into(),
                }),
            },
        }
    }

    fn eval(&mut self, expr: &Expr, code: &CodeRef) -> Result<Value, UiError> {
        match expr {
            Expr::Var(name) => {
                self.env
                    .get(name)
                    .cloned()
                    .ok_or_else(|| UiError::ScriptSyntax {
                        line: code.original_lineno,
                        message: format!("undefined variable '{}'", name),
                    })
            }
            Expr::Str(s) => Ok(Value::Text(s.clone())),
            Expr::Num(n) => Ok(Value::Num(*n)),
            Expr::Index(base, index) => match self.eval(base, code)? {
                Value::Selector(sel) => {
                    let item = self.session.index(&sel, *index, Some(code))?;
                    Ok(Value::Selector(item))
                }
                Value::SelectorList(items) => {
                    items.get(*index).cloned().map(Value::Selector).ok_or_else(|| {
                        UiError::ElementNotFound {
                            selector: format!("[{}]", index),
                            context: format!(
                                "index {} out of range, match produced {} elements (line {})",
                                index,
                                items.len(),
                                code.original_lineno + 1
                            ),
                        }
                    })
                }
                _ => Err(UiError::InvalidSelector(format!(
                    "cannot index a non-element value (line {})",
                    code.original_lineno + 1
                ))),
            },
            Expr::Match(base, criterion) => {
                let sel = self.selector_value(base, code)?;
                let matched = self.session.match_children(&sel, criterion, Some(code))?;
                Ok(Value::SelectorList(matched))
            }
            Expr::Call { name, args } => self.call(name, args, code),
        }
    }

    fn call(&mut self, name: &str, args: &[Expr], code: &CodeRef) -> Result<Value, UiError> {
        match name {
            "element" => {
                let api_name = self.text_arg(args, 0, name, code)?;
                Ok(Value::Selector(self.session.selector(&api_name)?))
            }
            "tap" => {
                let sel = self.selector_arg(args, 0, name, code)?;
                self.session.tap(&sel, Some(code))?;
                Ok(Value::Unit)
            }
            "long_tap" => {
                let sel = self.selector_arg(args, 0, name, code)?;
                self.session.long_tap(&sel, Some(code))?;
                Ok(Value::Unit)
            }
            "set_text" => {
                let sel = self.selector_arg(args, 0, name, code)?;
                let text = self.text_arg(args, 1, name, code)?;
                self.session.set_text(&sel, &text, Some(code))?;
                Ok(Value::Unit)
            }
            "scroll" => {
                let sel = self.selector_arg(args, 0, name, code)?;
                let direction_text = self.text_arg(args, 1, name, code)?;
                let direction = ScrollDirection::parse(&direction_text).ok_or_else(|| {
                    UiError::InvalidSelector(format!(
                        "unknown scroll direction '{}' (line {})",
                        direction_text,
                        code.original_lineno + 1
                    ))
                })?;
                self.session.scroll(&sel, direction, Some(code))?;
                Ok(Value::Unit)
            }
            "back" => {
                self.session.back(Some(code))?;
                Ok(Value::Unit)
            }
            "get_text" => {
                let sel = self.selector_arg(args, 0, name, code)?;
                Ok(Value::Text(self.session.get_text(&sel, Some(code))?))
            }
            "get_attributes" => {
                let sel = self.selector_arg(args, 0, name, code)?;
                Ok(Value::Attrs(self.session.get_attributes(&sel, Some(code))?))
            }
            "check_ele_exist" => {
                let sel = self.selector_arg(args, 0, name, code)?;
                Ok(Value::Bool(self.session.check_exists(&sel, Some(code))?))
            }
            "get_ui_tree" => Ok(Value::Text(self.session.ui_tree(Some(code))?)),
            "len" => {
                match self.eval(
                    args.first().ok_or_else(|| missing_arg(name, 0, code))?,
                    code,
                )? {
                    Value::SelectorList(items) => Ok(Value::Num(items.len() as i64)),
                    Value::Selector(sel) => {
                        Ok(Value::Num(self.session.count(&sel, Some(code))? as i64))
                    }
                    _ => Err(UiError::InvalidSelector(format!(
                        "len expects an element or element list (line {})",
                        code.original_lineno + 1
                    ))),
                }
            }
            other => Err(UiError::ScriptSyntax {
                line: code.original_lineno,
                message: format!(
                    "unknown function '{}' (recognized APIs: {})",
                    other,
                    API_NAMES.join(", ")
                ),
            }),
        }
    }

    fn selector_arg(
        &mut self,
        args: &[Expr],
        index: usize,
        api: &str,
        code: &CodeRef,
    ) -> Result<Selector, UiError> {
        let arg = args.get(index).ok_or_else(|| missing_arg(api, index, code))?;
        self.selector_value(arg, code)
    }

    /// Coerce an expression to one selector. An element list stands for its
    /// first element, matching the documented first-match policy.
    fn selector_value(&mut self, expr: &Expr, code: &CodeRef) -> Result<Selector, UiError> {
        match self.eval(expr, code)? {
            Value::Selector(sel) => Ok(sel),
            Value::SelectorList(items) => items.into_iter().next().ok_or_else(|| {
                UiError::ElementNotFound {
                    selector: "<match result>".into(),
                    context: format!(
                        "match produced no elements (line {})",
                        code.original_lineno + 1
                    ),
                }
            }),
            _ => Err(UiError::InvalidSelector(format!(
                "expected an element selector (line {})",
                code.original_lineno + 1
            ))),
        }
    }

    fn text_arg(
        &mut self,
        args: &[Expr],
        index: usize,
        api: &str,
        code: &CodeRef,
    ) -> Result<String, UiError> {
        let arg = args.get(index).ok_or_else(|| missing_arg(api, index, code))?;
        match self.eval(arg, code)? {
            Value::Text(s) => Ok(s),
            _ => Err(UiError::ScriptSyntax {
                line: code.original_lineno,
                message: format!("argument {} of '{}' must be a string", index + 1, api),
            }),
        }
    }
}

fn missing_arg(api: &str, index: usize, code: &CodeRef) -> UiError {
    UiError::ScriptSyntax {
        line: code.original_lineno,
        message: format!("'{}' is missing argument {}", api, index + 1),
    }
}
