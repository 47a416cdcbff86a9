//! Observable value cells.
//!
//! `Variable<T>` is a shared, single-threaded cell whose listeners run
//! synchronously, in registration order, when the value is written.
//! Listeners may write variables again; nesting is capped at
//! `MAX_NOTIFY_DEPTH` so a feedback cycle stops instead of overflowing the stack.
//!
//! `FieldVariable` layers a form field's declared kind on top of a text cell:
//! widgets write text, readers coerce it and may fail.

use crate::blueprint_core::registry::VariableKind;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

pub const MAX_NOTIFY_DEPTH: usize = 8;

pub type Listener<T> = Rc<dyn Fn(&T)>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// When a listener fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// Only when `set` stores a different value.
    Change,
    /// On every `set`, even if the value is unchanged.
    Write,
}

struct Entry<T> {
    id: Subscription,
    trigger: Trigger,
    listener: Listener<T>,
}

struct Inner<T> {
    value: RefCell<T>,
    listeners: RefCell<Vec<Entry<T>>>,
    next_id: Cell<u64>,
    depth: Cell<usize>,
}

/// Cloning a `Variable` clones the handle; both handles observe one value.
pub struct Variable<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Variable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Variable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("value", &*self.inner.value.borrow())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Variable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Variable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                depth: Cell::new(0),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    pub fn set(&self, value: T) {
        let changed = {
            let mut cur = self.inner.value.borrow_mut();
            let changed = *cur != value;
            *cur = value;
            changed
        };
        self.notify(changed);
    }

    pub fn on_change(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        self.subscribe(Trigger::Change, listener)
    }

    pub fn on_write(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        self.subscribe(Trigger::Write, listener)
    }

    pub fn subscribe(&self, trigger: Trigger, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = Subscription(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.listeners.borrow_mut().push(Entry {
            id,
            trigger,
            listener: Rc::new(listener),
        });
        id
    }

    pub fn unsubscribe(&self, id: Subscription) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|e| e.id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn is_subscribed(&self, id: Subscription) -> bool {
        self.inner.listeners.borrow().iter().any(|e| e.id == id)
    }

    fn notify(&self, changed: bool) {
        let depth = self.inner.depth.get();
        if depth >= MAX_NOTIFY_DEPTH {
            tracing::warn!(depth, "variable notification depth exceeded; listeners skipped");
            return;
        }
        // Snapshot so listeners can subscribe/unsubscribe/set while we iterate.
        let pending: Vec<(Subscription, Listener<T>)> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .filter(|e| changed || e.trigger == Trigger::Write)
            .map(|e| (e.id, Rc::clone(&e.listener)))
            .collect();
        if pending.is_empty() {
            return;
        }
        self.inner.depth.set(depth + 1);
        for (id, listener) in pending {
            if !self.is_subscribed(id) {
                continue;
            }
            let current = self.get();
            listener(&current);
        }
        self.inner.depth.set(depth);
    }
}

/// Typed value read out of a field variable.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Double(f64),
    Int(i64),
    Bool(bool),
}

impl FieldValue {
    pub fn zero(kind: VariableKind) -> Self {
        match kind {
            VariableKind::String => FieldValue::Text(String::new()),
            VariableKind::Double => FieldValue::Double(0.0),
            VariableKind::Int => FieldValue::Int(0),
            VariableKind::Bool => FieldValue::Bool(false),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Double(d) => format!("{d}"),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Bool(true) => "1".into(),
            FieldValue::Bool(false) => "0".into(),
        }
    }
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Integer text, falling back to a float truncated toward zero ("2.5" reads as 2).
fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(i) = raw.parse::<i64>() {
        return Some(i);
    }
    let d = raw.parse::<f64>().ok()?.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    (d.is_finite() && d >= i64::MIN as f64 && d < i64::MAX as f64).then_some(d as i64)
}

/// A field's observable text cell together with its declared kind.
#[derive(Clone, Debug)]
pub struct FieldVariable {
    kind: VariableKind,
    cell: Variable<String>,
}

impl FieldVariable {
    pub fn new(kind: VariableKind) -> Self {
        Self {
            kind,
            cell: Variable::new(FieldValue::zero(kind).to_text()),
        }
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    pub fn cell(&self) -> &Variable<String> {
        &self.cell
    }

    pub fn text(&self) -> String {
        self.cell.get()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.cell.set(text.into());
    }

    pub fn set(&self, value: FieldValue) {
        self.cell.set(value.to_text());
    }

    pub fn clear(&self) {
        self.set(FieldValue::zero(self.kind));
    }

    /// Coerce the current text to the declared kind.
    pub fn get(&self) -> Result<FieldValue, String> {
        let raw = self.cell.get();
        match self.kind {
            VariableKind::String => Ok(FieldValue::Text(raw)),
            VariableKind::Double => raw
                .trim()
                .parse::<f64>()
                .map(FieldValue::Double)
                .map_err(|_| format!("expected floating-point number but got \"{raw}\"")),
            VariableKind::Int => parse_int(&raw)
                .map(FieldValue::Int)
                .ok_or_else(|| format!("expected integer but got \"{raw}\"")),
            VariableKind::Bool => parse_bool(&raw)
                .map(FieldValue::Bool)
                .ok_or_else(|| format!("expected boolean value but got \"{raw}\"")),
        }
    }
}
