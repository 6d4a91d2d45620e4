use std::collections::BTreeMap;
use std::sync::Arc;

use crate::device::Device;
use crate::device::event::{InputEvent, ScrollDirection, ViewTarget};
use crate::element::attr::EleAttr;
use crate::error::UiError;
use crate::selector::catalog::{DependencyStep, NameCatalog};
use crate::selector::context::ExecContext;
use crate::selector::selector_model::{MatchCriterion, Selector};
use crate::state::state_model::DeviceState;
use crate::trace::logger::TraceLogger;
use crate::trace::record::{CodeRef, TraceRecord};

/// Executes selector operations against a live device.
///
/// Every operation observes fresh, resolves against the freshly built pruned
/// tree, charges the execution budget, and appends a trace record with
/// original-line attribution. A named selector that misses gets one
/// dependency-chain replay before the miss becomes an error.
pub struct ScriptSession {
    device: Box<dyn Device>,
    catalog: NameCatalog,
    ctx: ExecContext,
    tracer: TraceLogger,
    /// Most recent non-popup state; popups observed later chain to it.
    last_base: Option<Arc<DeviceState>>,
}

impl ScriptSession {
    pub fn new(device: Box<dyn Device>, catalog: NameCatalog, tracer: TraceLogger) -> Self {
        ScriptSession {
            device,
            catalog,
            ctx: ExecContext::new(),
            tracer,
            last_base: None,
        }
    }

    pub fn with_context(mut self, ctx: ExecContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn context(&self) -> &ExecContext {
        &self.ctx
    }

    pub fn catalog(&self) -> &NameCatalog {
        &self.catalog
    }

    /// Fetch the current state. Popup states are chained to the most recent
    /// non-popup state so their compared signatures stay distinct across
    /// different base screens.
    pub fn observe(&mut self) -> Result<Arc<DeviceState>, UiError> {
        let raw = self.device.observe()?;
        let state = Arc::new(DeviceState::from_observation(raw));
        if state.is_popup {
            if let Some(base) = &self.last_base {
                state.set_parent(Arc::clone(base));
            }
        } else {
            self.last_base = Some(Arc::clone(&state));
        }
        Ok(state)
    }

    /// Handle for a named element. The name must exist in the catalog.
    pub fn selector(&self, name: &str) -> Result<Selector, UiError> {
        match self.catalog.xpath(name) {
            Some(xpath) => Ok(Selector::named(name, xpath)),
            None => Err(UiError::ElementNotFound {
                selector: name.to_string(),
                context: "element does not exist in the app's catalog; use a real element name"
                    .into(),
            }),
        }
    }

    // ---- interaction APIs ----

    pub fn tap(&mut self, sel: &Selector, code: Option<&CodeRef>) -> Result<(), UiError> {
        self.ctx.charge()?;
        let (state, ele) = self.resolve(sel, code)?;
        self.log_action(&state, "touch", sel, None, code);
        self.device.dispatch(&InputEvent::Touch {
            target: target_of(&ele),
        })
    }

    pub fn long_tap(&mut self, sel: &Selector, code: Option<&CodeRef>) -> Result<(), UiError> {
        self.ctx.charge()?;
        let (state, ele) = self.resolve(sel, code)?;
        self.log_action(&state, "long_touch", sel, None, code);
        self.device.dispatch(&InputEvent::LongTouch {
            target: target_of(&ele),
        })
    }

    pub fn set_text(
        &mut self,
        sel: &Selector,
        text: &str,
        code: Option<&CodeRef>,
    ) -> Result<(), UiError> {
        self.ctx.charge()?;
        let (state, ele) = self.resolve(sel, code)?;
        self.log_action(&state, "set_text", sel, Some(text), code);
        self.device.dispatch(&InputEvent::SetText {
            target: target_of(&ele),
            text: text.to_string(),
        })
    }

    pub fn scroll(
        &mut self,
        sel: &Selector,
        direction: ScrollDirection,
        code: Option<&CodeRef>,
    ) -> Result<(), UiError> {
        self.ctx.charge()?;
        let (state, ele) = self.resolve(sel, code)?;
        self.log_action(&state, &format!("scroll {}", direction.as_str()), sel, None, code);
        self.device.dispatch(&InputEvent::Scroll {
            target: target_of(&ele),
            direction,
        })
    }

    /// Close the current window.
    pub fn back(&mut self, code: Option<&CodeRef>) -> Result<(), UiError> {
        self.ctx.charge()?;
        let state = self.observe()?;
        self.tracer.log(
            &TraceRecord::for_state(&state)
                .with_action("go back")
                .with_code(code),
        );
        self.device.dispatch(&InputEvent::back())
    }

    // ---- query APIs ----

    /// Visible text of the element.
    pub fn get_text(&mut self, sel: &Selector, code: Option<&CodeRef>) -> Result<String, UiError> {
        self.ctx.charge()?;
        let (state, ele) = self.resolve(sel, code)?;
        self.log_action(&state, "get_text", sel, None, code);
        Ok(state.rendering().tree.text_of(&ele))
    }

    /// Attribute map of the element (selected/checked/scrollable and the
    /// identity fields).
    pub fn get_attributes(
        &mut self,
        sel: &Selector,
        code: Option<&CodeRef>,
    ) -> Result<BTreeMap<String, serde_json::Value>, UiError> {
        self.ctx.charge()?;
        let (state, ele) = self.resolve(sel, code)?;
        self.log_action(&state, "get_attributes", sel, None, code);
        Ok(ele.attributes())
    }

    /// Whether the selector resolves in the current UI. No recovery.
    pub fn check_exists(&mut self, sel: &Selector, code: Option<&CodeRef>) -> Result<bool, UiError> {
        self.ctx.charge()?;
        let state = self.observe()?;
        self.log_action(&state, "check_ele_exist", sel, None, code);
        Ok(state.rendering().tree.find_expr(&sel.xpath)?.is_some())
    }

    /// Rendered pruned tree of the current UI.
    pub fn ui_tree(&mut self, code: Option<&CodeRef>) -> Result<String, UiError> {
        self.ctx.charge()?;
        let state = self.observe()?;
        self.tracer.log(
            &TraceRecord::for_state(&state)
                .with_action("get_ui_tree")
                .with_code(code),
        );
        Ok(state.rendering().tree.render())
    }

    // ---- derived-selector APIs ----

    /// `sel[index]`: i-th child of the resolved element group, as a new
    /// derived selector bound to the child's canonical XPath.
    pub fn index(
        &mut self,
        sel: &Selector,
        index: usize,
        code: Option<&CodeRef>,
    ) -> Result<Selector, UiError> {
        self.ctx.charge()?;
        let (state, group) = self.resolve(sel, code)?;
        self.log_action(&state, "index", sel, Some(&index.to_string()), code);
        let tree = &state.rendering().tree;
        match tree.child_by_index(group.id, index) {
            Some(child) => Ok(Selector::for_element(child)),
            None => Err(UiError::ElementNotFound {
                selector: format!("{}[{}]", sel, index),
                context: format!(
                    "index {} out of range, element has {} children{}",
                    index,
                    tree.children_of(group.id).len(),
                    at_line(code)
                ),
            }),
        }
    }

    /// Advance the selector's iteration over its children. `Ok(None)` means
    /// the iteration is exhausted (the cursor resets for the next pass).
    /// An unresolvable base group gets one dependency recovery before the
    /// iteration ends.
    pub fn next_item(
        &mut self,
        sel: &mut Selector,
        code: Option<&CodeRef>,
    ) -> Result<Option<Selector>, UiError> {
        self.ctx.charge()?;
        let resolved = match self.resolve(sel, code) {
            Ok(pair) => Some(pair),
            Err(UiError::ElementNotFound { .. }) => None,
            Err(e) => return Err(e),
        };
        let Some((state, group)) = resolved else {
            sel.reset_cursor();
            return Ok(None);
        };
        self.log_action(&state, "index", sel, Some(&sel.cursor().to_string()), code);

        let tree = &state.rendering().tree;
        let children = tree.children_of(group.id);
        if sel.cursor() < children.len() {
            let item = Selector::for_element(children[sel.cursor()]);
            sel.advance();
            Ok(Some(item))
        } else {
            sel.reset_cursor();
            Ok(None)
        }
    }

    /// Children of the resolved group whose descriptors satisfy the
    /// criterion, as derived selectors in document order.
    pub fn match_children(
        &mut self,
        sel: &Selector,
        criterion: &MatchCriterion,
        code: Option<&CodeRef>,
    ) -> Result<Vec<Selector>, UiError> {
        self.ctx.charge()?;
        let (state, group) = self.resolve(sel, code)?;
        self.log_action(&state, "match", sel, None, code);
        let tree = &state.rendering().tree;
        Ok(tree
            .children_of(group.id)
            .iter()
            .filter(|ele| criterion.matches(ele))
            .map(|ele| Selector::for_element(ele))
            .collect())
    }

    /// Number of children of the resolved group in the live tree.
    pub fn count(&mut self, sel: &Selector, code: Option<&CodeRef>) -> Result<usize, UiError> {
        self.ctx.charge()?;
        let (state, group) = self.resolve(sel, code)?;
        self.log_action(&state, "len", sel, None, code);
        Ok(state.rendering().tree.children_of(group.id).len())
    }

    // ---- resolution core ----

    /// Resolve against the live tree; on a miss for a named selector, replay
    /// its dependency chain once and retry. The returned attribute is a
    /// snapshot, never a live reference into a cached tree.
    fn resolve(
        &mut self,
        sel: &Selector,
        code: Option<&CodeRef>,
    ) -> Result<(Arc<DeviceState>, EleAttr), UiError> {
        let state = self.observe()?;
        if let Some(ele) = state.rendering().tree.find_expr(&sel.xpath)? {
            return Ok((Arc::clone(&state), ele.clone()));
        }

        // miss: one recovery attempt through the registered dependency chain
        if let Some(name) = &sel.name {
            if let Some(chain) = self.catalog.dependency(name).map(|c| c.to_vec()) {
                self.replay_chain(name, &chain, code)?;
                let state = self.observe()?;
                if let Some(ele) = state.rendering().tree.find_expr(&sel.xpath)? {
                    return Ok((Arc::clone(&state), ele.clone()));
                }
            }
        }

        Err(UiError::ElementNotFound {
            selector: sel.to_string(),
            context: format!("not present in the current UI{}", at_line(code)),
        })
    }

    /// Dispatch each prerequisite action of the chain, resolving every step
    /// in the then-current tree. A step whose element cannot be found aborts
    /// the replay; the caller's re-resolution then reports the miss.
    fn replay_chain(
        &mut self,
        name: &str,
        chain: &[DependencyStep],
        code: Option<&CodeRef>,
    ) -> Result<(), UiError> {
        for step in chain {
            let xpath = self.catalog.xpath(&step.name).map(str::to_string).ok_or_else(|| {
                UiError::ElementNotFound {
                    selector: step.name.clone(),
                    context: format!(
                        "dependency of '{}' is not in the catalog{}",
                        name,
                        at_line(code)
                    ),
                }
            })?;
            let state = self.observe()?;
            let ele = state
                .rendering()
                .tree
                .find_expr(&xpath)?
                .cloned()
                .ok_or_else(|| UiError::ElementNotFound {
                    selector: step.name.clone(),
                    context: format!(
                        "while replaying the dependency chain of '{}'{}",
                        name,
                        at_line(code)
                    ),
                })?;
            let event = step.action.to_event(target_of(&ele));
            self.tracer.log(
                &TraceRecord::for_state(&state)
                    .with_action(event.action_name())
                    .with_target(format!("${}", step.name))
                    .with_code(code),
            );
            self.device.dispatch(&event)?;
        }
        Ok(())
    }

    fn log_action(
        &self,
        state: &DeviceState,
        action: &str,
        sel: &Selector,
        input: Option<&str>,
        code: Option<&CodeRef>,
    ) {
        let mut record = TraceRecord::for_state(state)
            .with_action(action)
            .with_target(sel.to_string())
            .with_code(code);
        if let Some(input) = input {
            record = record.with_input(input);
        }
        self.tracer.log(&record);
    }
}

fn target_of(ele: &EleAttr) -> ViewTarget {
    ViewTarget {
        view_id: ele.id,
        bound_box: ele.bound_box.clone(),
        resource_id: if ele.resource_id.is_empty() {
            None
        } else {
            Some(ele.resource_id.clone())
        },
    }
}

fn at_line(code: Option<&CodeRef>) -> String {
    match code {
        Some(c) => format!(
            " (line {}: {})",
            c.original_lineno + 1,
            c.original_code.trim()
        ),
        None => String::new(),
    }
}
