use std::path::Path;

use crate::device::RawObservation;
use crate::device::replay::ReplayDevice;
use crate::error::UiError;
use crate::script::run_script;
use crate::selector::catalog::NameCatalog;
use crate::selector::context::ExecContext;
use crate::selector::session::ScriptSession;
use crate::state::state_model::DeviceState;
use crate::trace::logger::TraceLogger;

// ============================================================================
// describe subcommand
// ============================================================================

pub fn cmd_describe(state_path: &str, verbose: u8) -> Result<(), Box<dyn std::error::Error>> {
    let state = load_state(state_path)?;

    println!("activity:  {}", state.foreground_activity);
    println!("state:     {}", state.state_str());
    println!("structure: {}", state.structure_str());
    if state.is_popup {
        println!("popup:     yes");
    }

    let rendering = state.rendering();
    println!("\n{}", rendering.tree.render());

    if verbose > 0 {
        eprintln!(
            "{} views, {} descriptive, {} tree nodes",
            state.views().len(),
            rendering.indexed.len(),
            rendering.tree.node_count()
        );
    }
    Ok(())
}

// ============================================================================
// actions subcommand
// ============================================================================

pub fn cmd_actions(state_path: &str, verbose: u8) -> Result<(), Box<dyn std::error::Error>> {
    let state = load_state(state_path)?;
    let events = state.possible_input();

    for (i, event) in events.iter().enumerate() {
        match event.target() {
            Some(target) => println!(
                "{:3}  {:<12} view {} [{}]",
                i,
                event.action_name(),
                target.view_id,
                target.resource_id.as_deref().unwrap_or("-")
            ),
            None => println!("{:3}  {}", i, event.action_name()),
        }
    }

    if verbose > 0 {
        eprintln!("{} possible events", events.len());
    }
    Ok(())
}

// ============================================================================
// run subcommand
// ============================================================================

/// Run an authored script against recorded frames. Returns whether the
/// execution completed without error.
pub fn cmd_run(
    script_path: &str,
    catalog_path: &str,
    frames_dir: &str,
    trace_path: Option<&str>,
    max_actions: u32,
    verbose: u8,
) -> Result<bool, Box<dyn std::error::Error>> {
    let script = std::fs::read_to_string(script_path)?;
    let catalog = NameCatalog::from_path(Path::new(catalog_path))?;
    let device = ReplayDevice::from_dir(Path::new(frames_dir))?;

    let tracer = match trace_path {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };

    let mut session = ScriptSession::new(Box::new(device), catalog, tracer)
        .with_context(ExecContext::with_limit(max_actions));

    if verbose > 0 {
        eprintln!("Running {} (budget {})...", script_path, max_actions);
    }

    match run_script(&script, &mut session) {
        Ok(()) => {
            println!(
                "Script completed, {} actions used",
                session.context().action_count()
            );
            Ok(true)
        }
        Err(e) => {
            eprintln!("Script failed: {}", e);
            if let UiError::ActionBudgetExceeded { .. } = e {
                eprintln!("Execution aborted.");
            }
            Ok(false)
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn load_state(path: &str) -> Result<DeviceState, UiError> {
    let content = std::fs::read_to_string(path).map_err(|e| UiError::Io {
        context: format!("reading observation {}", path),
        source: e,
    })?;
    let raw: RawObservation = serde_json::from_str(&content).map_err(|e| UiError::JsonParse {
        context: format!("observation {}", path),
        source: e,
    })?;
    Ok(DeviceState::from_observation(raw))
}
