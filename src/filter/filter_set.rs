//! Object filters supplied by the user.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::sql::ident::{canonical_fqn, make_fqn};

/// Whether a filter selects or rejects the objects it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Include,
    Exclude,
}

/// Ordered, deduplicated list of fully-qualified object names.
///
/// Entries keep the spelling they were supplied with. Identity follows SQL
/// identifier folding: `public.Foo` and `public.foo` are the same entry,
/// `public."Foo"` is a different one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    kind: FilterKind,
    names: Vec<String>,
    keys: HashSet<String>,
}

impl FilterSet {
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            names: Vec::new(),
            keys: HashSet::new(),
        }
    }

    /// Build a filter from names, dropping later duplicates.
    pub fn from_names<I, S>(kind: FilterKind, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new(kind);
        for name in names {
            set.insert(name);
        }
        set
    }

    pub fn include<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_names(FilterKind::Include, names)
    }

    pub fn exclude<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_names(FilterKind::Exclude, names)
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Append `name` unless an equivalent entry exists. Returns whether it
    /// was appended.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.keys.insert(canonical_fqn(&name)) {
            self.names.push(name);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.keys.contains(&canonical_fqn(fqn))
    }

    /// Whether the object `schema.name` (true, unquoted identifiers) is listed.
    pub fn matches(&self, schema: &str, name: &str) -> bool {
        self.keys.contains(&make_fqn(schema, name))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<'a> IntoIterator for &'a FilterSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

/// Schema-level include/exclude lists. Schema names are compared verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl SchemaFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Whether objects in `schema` take part in the run.
    pub fn allows(&self, schema: &str) -> bool {
        if self.exclude.iter().any(|s| s == schema) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|s| s == schema)
    }
}

/// Complete relation selection: schema filter plus relation include and
/// exclude sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationFilter {
    pub schemas: SchemaFilter,
    pub include: FilterSet,
    pub exclude: FilterSet,
}

impl Default for RelationFilter {
    fn default() -> Self {
        Self {
            schemas: SchemaFilter::default(),
            include: FilterSet::new(FilterKind::Include),
            exclude: FilterSet::new(FilterKind::Exclude),
        }
    }
}

impl RelationFilter {
    /// Whether the relation `schema.name` is selected.
    pub fn selects(&self, schema: &str, name: &str) -> bool {
        if !self.schemas.allows(schema) || self.exclude.matches(schema, name) {
            return false;
        }
        self.include.is_empty() || self.include.matches(schema, name)
    }
}
