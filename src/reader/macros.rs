//! Reader macros: code that runs while reading a `#tag` form.
//!
//! Names are interned; a registry maps interned names to handlers.
//! There's one process-wide registry (the "current" reader macros) and each
//! reader owns its own copy, which it may extend.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use string_interner::{DefaultStringInterner, DefaultSymbol};

use super::{ReadResult, Reader};
use crate::data::Model;

/// A reader macro.
///
/// Called with the reader positioned just after the tag, and the tag itself
/// (including the `#`). `Ok(None)` means the macro produced no form.
pub type MacroHandler =
    Arc<dyn Fn(&mut Reader<'_>, &str) -> ReadResult<Option<Model>> + Send + Sync>;

/// Wrap a closure as a [`MacroHandler`].
pub fn reader_macro<F>(f: F) -> MacroHandler
where
    F: Fn(&mut Reader<'_>, &str) -> ReadResult<Option<Model>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A set of named reader macros.
#[derive(Clone, Default)]
pub struct ReaderMacros {
    names: DefaultStringInterner,
    handlers: HashMap<DefaultSymbol, MacroHandler>,
}

impl std::fmt::Debug for ReaderMacros {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl ReaderMacros {
    /// Register a handler for `#name`, replacing any previous one.
    pub fn register(&mut self, name: &str, handler: MacroHandler) {
        let symbol = self.names.get_or_intern(name);
        self.handlers.insert(symbol, handler);
    }

    /// Remove the handler for `#name`. Returns true if there was one.
    pub fn unregister(&mut self, name: &str) -> bool {
        match self.names.get(name) {
            Some(symbol) => self.handlers.remove(&symbol).is_some(),
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<MacroHandler> {
        let symbol = self.names.get(name)?;
        self.handlers.get(&symbol).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names
            .get(name)
            .is_some_and(|symbol| self.handlers.contains_key(&symbol))
    }

    /// Names with a registered handler.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.handlers
            .keys()
            .filter_map(|&symbol| self.names.resolve(symbol))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
        self.names = DefaultStringInterner::default();
    }
}

fn current() -> &'static RwLock<ReaderMacros> {
    static CURRENT: OnceLock<RwLock<ReaderMacros>> = OnceLock::new();
    CURRENT.get_or_init(Default::default)
}

/// Register a reader macro for every reader built with `use_current_readers`
/// from now on.
pub fn register_reader_macro(name: &str, handler: MacroHandler) {
    tracing::debug!(name, "registering reader macro");
    current()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(name, handler);
}

pub fn unregister_reader_macro(name: &str) -> bool {
    current()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .unregister(name)
}

/// A snapshot of the process-wide reader macros.
pub fn current_reader_macros() -> ReaderMacros {
    current()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
