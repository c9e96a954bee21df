//! # Dump Options
//!
//! [`DumpOptions`] configures a serializer pass: which fields appear
//! (`include`, `exclude`, `exclude_unset`, `exclude_none`), which key each
//! field is emitted under (`by_alias`) and the output form (`mode`).
//!
//! Field selections name canonical field names and nest: excluding
//! `{address: {pin}}` drops only `address.pin`, while excluding
//! `{address}` drops the whole field.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Output form of a dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DumpMode {
    /// Ordered native record; datetimes stay timestamps.
    #[default]
    Native,
    /// JSON-compatible value; datetimes become ISO-8601 strings.
    Text,
    /// `Text` encoded as one JSON string.
    Json,
}

impl FromStr for DumpMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" => Ok(DumpMode::Native),
            "text" => Ok(DumpMode::Text),
            "json" => Ok(DumpMode::Json),
            other => Err(format!("unknown dump mode '{other}' (expected native, text or json)")),
        }
    }
}

impl fmt::Display for DumpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DumpMode::Native => "native",
            DumpMode::Text => "text",
            DumpMode::Json => "json",
        })
    }
}

/// What a selection says about one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubSelection<'a> {
    /// The field as a whole.
    Whole,
    /// Only part of a nested field.
    Partial(&'a FieldSelection),
}

/// A possibly nested set of canonical field names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSelection {
    entries: BTreeMap<String, Option<FieldSelection>>,
}

impl FieldSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select whole fields.
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .fold(Self::new(), |sel, name| sel.field(name))
    }

    /// Add a whole field. A whole field absorbs any nested selection.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.entries.insert(name.into(), None);
        self
    }

    /// Add a nested selection under `name`.
    pub fn nested(mut self, name: impl Into<String>, sub: FieldSelection) -> Self {
        let name = name.into();
        match self.entries.get_mut(&name) {
            Some(None) => {}
            Some(Some(existing)) => existing.merge(sub),
            None => {
                self.entries.insert(name, Some(sub));
            }
        }
        self
    }

    /// Build from dotted paths: `["name", "address.pin"]`.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths.into_iter().fold(Self::new(), |sel, path| {
            let segments: Vec<&str> = path
                .as_ref()
                .split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            sel.with_path(&segments)
        })
    }

    fn with_path(self, segments: &[&str]) -> Self {
        match segments {
            [] => self,
            [leaf] => self.field(*leaf),
            [head, rest @ ..] => self.nested(*head, FieldSelection::new().with_path(rest)),
        }
    }

    fn merge(&mut self, other: FieldSelection) {
        for (name, sub) in other.entries {
            let merged = match sub {
                None => std::mem::take(self).field(name),
                Some(sub) => std::mem::take(self).nested(name, sub),
            };
            *self = merged;
        }
    }

    /// What this selection says about `name`, if anything.
    pub fn get(&self, name: &str) -> Option<SubSelection<'_>> {
        self.entries.get(name).map(|sub| match sub {
            None => SubSelection::Whole,
            Some(sel) => SubSelection::Partial(sel),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serializer configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DumpOptions {
    /// Only these fields (and nested subsets) appear. Takes precedence
    /// over `exclude` at the same level.
    pub include: Option<FieldSelection>,
    /// These fields (or nested subsets) are omitted.
    pub exclude: Option<FieldSelection>,
    /// Omit fields filled from defaults, recursively.
    pub exclude_unset: bool,
    /// Omit fields whose value is null.
    pub exclude_none: bool,
    /// Emit fields under their alias when one is declared.
    pub by_alias: bool,
    /// Output form.
    pub mode: DumpMode,
    /// Indent JSON text in `Json` mode.
    pub pretty: bool,
}

impl DumpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, selection: FieldSelection) -> Self {
        self.include = Some(selection);
        self
    }

    pub fn exclude(mut self, selection: FieldSelection) -> Self {
        self.exclude = Some(selection);
        self
    }

    pub fn exclude_unset(mut self, yes: bool) -> Self {
        self.exclude_unset = yes;
        self
    }

    pub fn exclude_none(mut self, yes: bool) -> Self {
        self.exclude_none = yes;
        self
    }

    pub fn by_alias(mut self, yes: bool) -> Self {
        self.by_alias = yes;
        self
    }

    pub fn mode(mut self, mode: DumpMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }
}
