use crate::error::UiError;
use crate::selector::session::ScriptSession;

pub mod expand;
pub mod interpreter;
pub mod parser;

/// Expand, parse, and execute an authored script against a session.
pub fn run_script(script: &str, session: &mut ScriptSession) -> Result<(), UiError> {
    let expanded = expand::expand(script);
    let stmts = parser::parse(&expanded)?;
    interpreter::Interpreter::new(session).run(&stmts)
}
