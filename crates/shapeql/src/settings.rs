//! Indentation settings.
//!
//! The indent unit is process-wide: [`set_indent`] changes it for every
//! compilation that starts afterwards. Already produced text is never touched.
//! A compilation snapshots the unit into its [`CompileOptions`] when the
//! options are created.

use std::sync::RwLock;

const DEFAULT_INDENT: &str = "  ";

static INDENT: RwLock<Option<String>> = RwLock::new(None);

/// Set the process-wide indent unit used by future compilations.
pub fn set_indent(unit: impl Into<String>) {
    let mut guard = INDENT.write().unwrap_or_else(|e| e.into_inner());
    *guard = Some(unit.into());
}

/// The current process-wide indent unit (two spaces unless changed).
pub fn indent() -> String {
    let guard = INDENT.read().unwrap_or_else(|e| e.into_inner());
    guard.clone().unwrap_or_else(|| DEFAULT_INDENT.to_string())
}

/// Options for a single compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Indent unit applied once per nesting level.
    pub indent: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { indent: indent() }
    }
}

impl CompileOptions {
    pub fn with_indent(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
        }
    }
}

/// Per-compile cache of indentation strings by level.
#[derive(Debug)]
pub(crate) struct Indent {
    unit: String,
    levels: Vec<String>,
}

impl Indent {
    pub(crate) fn new(unit: &str) -> Self {
        Self {
            unit: unit.to_string(),
            levels: vec![String::new()],
        }
    }

    pub(crate) fn at(&mut self, level: usize) -> &str {
        while self.levels.len() <= level {
            let next = self.unit.repeat(self.levels.len());
            self.levels.push(next);
        }
        &self.levels[level]
    }
}
