//! Identifier and string interning.
//!
//! Every identifier and string literal the compiler emits as an operand goes
//! through a [`NameTable`], so operands are small `Copy` handles and equal
//! strings always share one [`Name`].

use std::fmt;

use rustc_hash::FxHashMap;

/// An interned string: an index into the [`NameTable`] that produced it.
///
/// Names from different tables must not be mixed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(u32);

impl Name {
    /// The implicit receiver binding, `this`.
    pub const THIS: Name = Name(0);
    /// The `arguments` pseudo-array available inside every function.
    pub const ARGUMENTS: Name = Name(1);
    /// The empty string.
    pub const EMPTY: Name = Name(2);

    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

const WELL_KNOWN: [&str; 3] = ["this", "arguments", ""];

/// Append-only string interner.
///
/// A table is created once per engine and shared by every compilation, so
/// names stay comparable across units compiled by the same engine.
#[derive(Debug, Clone)]
pub struct NameTable {
    strings: Vec<Box<str>>,
    lookup: FxHashMap<Box<str>, Name>,
}

impl NameTable {
    /// Create a table that already holds the well-known names.
    pub fn new() -> Self {
        let mut table = Self {
            strings: Vec::with_capacity(64),
            lookup: FxHashMap::default(),
        };
        for text in WELL_KNOWN {
            table.intern(text);
        }
        table
    }

    /// Return the handle for `text`, adding it if this is its first use.
    pub fn intern(&mut self, text: &str) -> Name {
        if let Some(&name) = self.lookup.get(text) {
            return name;
        }
        let name = Name(self.strings.len() as u32);
        let boxed: Box<str> = text.into();
        self.strings.push(boxed.clone());
        self.lookup.insert(boxed, name);
        name
    }

    /// Look up an existing handle without interning.
    pub fn get(&self, text: &str) -> Option<Name> {
        self.lookup.get(text).copied()
    }

    /// The text behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if `name` was produced by a different table.
    pub fn resolve(&self, name: Name) -> &str {
        &self.strings[name.0 as usize]
    }

    /// The text behind a handle, or `None` if this table never issued it.
    pub fn try_resolve(&self, name: Name) -> Option<&str> {
        self.strings.get(name.0 as usize).map(|text| &**text)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}
