// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key-to-navigation handler tables.

use alloc::borrow::Cow;
use alloc::string::String;

use hashbrown::HashMap;
use understory_focus::Navigation;

/// Arrow keys mapped to the four cardinal directions.
pub const ARROW_KEY_HANDLERS: &[(&str, Navigation)] = &[
    ("arrowleft", Navigation::LEFT),
    ("arrowright", Navigation::RIGHT),
    ("arrowup", Navigation::UP),
    ("arrowdown", Navigation::DOWN),
];

/// `W`/`A`/`S`/`D` mapped to the four cardinal directions.
pub const WASD_HANDLERS: &[(&str, Navigation)] = &[
    ("a", Navigation::LEFT),
    ("d", Navigation::RIGHT),
    ("w", Navigation::UP),
    ("s", Navigation::DOWN),
];

/// Lower-case a key identifier, borrowing when it already is.
pub fn normalize_key(key: &str) -> Cow<'_, str> {
    if key.chars().any(char::is_uppercase) {
        Cow::Owned(key.to_lowercase())
    } else {
        Cow::Borrowed(key)
    }
}

/// Mapping from lower-cased key tokens to navigation intents.
///
/// There is at most one entry per key; merging a table replaces the entries it names and
/// leaves the others alone.
///
/// ```
/// use understory_focus::Navigation;
/// use understory_keynav::{ARROW_KEY_HANDLERS, HandlerTable};
///
/// let mut table = HandlerTable::new();
/// table.merge(ARROW_KEY_HANDLERS);
/// table.merge(&[("ArrowLeft", Navigation::PREV)]);
///
/// assert_eq!(table.get("arrowleft"), Some(Navigation::PREV));
/// assert_eq!(table.get("ARROWRIGHT"), Some(Navigation::RIGHT));
/// assert_eq!(table.get("q"), None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct HandlerTable {
    handlers: HashMap<String, Navigation>,
}

impl HandlerTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `table` into this one; later entries win.
    pub fn merge(&mut self, table: &[(&str, Navigation)]) {
        for &(key, navigation) in table {
            self.insert(key, navigation);
        }
    }

    /// Set the handler for a single key, returning the one it replaces.
    pub fn insert(&mut self, key: &str, navigation: Navigation) -> Option<Navigation> {
        self.handlers.insert(normalize_key(key).into_owned(), navigation)
    }

    /// Remove the handler for `key`.
    pub fn remove(&mut self, key: &str) -> Option<Navigation> {
        self.handlers.remove(&*normalize_key(key))
    }

    /// Look up the handler for a key identifier (case-insensitive).
    pub fn get(&self, key: &str) -> Option<Navigation> {
        self.handlers.get(&*normalize_key(key)).copied()
    }

    /// Number of keys with a handler.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no key has a handler.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
