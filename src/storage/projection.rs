//! Read-time column selection.
//!
//! A projection is the `select` clause of a read: `*` or a column list,
//! optionally followed by embedded related rows such as `vendors(name)` or
//! `vendor:vendors(*)`. Writes never carry a projection; it only shapes what
//! comes back.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::{Record, StoreError, StoreResult};

lazy_static! {
    static ref COLUMN_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid column regex");
    static ref EMBED_RE: Regex = Regex::new(
        r"^(?:(?P<alias>[A-Za-z_][A-Za-z0-9_]*)\s*:\s*)?(?P<table>[A-Za-z_][A-Za-z0-9_]*)\s*\((?P<cols>[^()]*)\)$"
    )
    .expect("valid embed regex");
}

/// Which plain columns a read returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Columns {
    All,
    Only(Vec<String>),
}

impl Columns {
    pub fn includes(&self, column: &str) -> bool {
        match self {
            Columns::All => true,
            Columns::Only(names) => names.iter().any(|name| name == column),
        }
    }

    fn parse(items: &[&str], clause: &str) -> StoreResult<Self> {
        let mut names = Vec::new();
        for item in items {
            if *item == "*" {
                return Ok(Columns::All);
            }
            if !COLUMN_RE.is_match(item) {
                return Err(StoreError::InvalidProjection(format!(
                    "'{}' is not a column name in '{}'",
                    item, clause
                )));
            }
            names.push(item.to_string());
        }
        if names.is_empty() {
            return Ok(Columns::All);
        }
        Ok(Columns::Only(names))
    }
}

impl fmt::Display for Columns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Columns::All => write!(f, "*"),
            Columns::Only(names) => write!(f, "{}", names.join(",")),
        }
    }
}

/// A related row embedded under `alias`, fetched from `table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub alias: String,
    pub table: String,
    pub columns: Columns,
}

impl fmt::Display for Embed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alias == self.table {
            write!(f, "{}({})", self.table, self.columns)
        } else {
            write!(f, "{}:{}({})", self.alias, self.table, self.columns)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub columns: Columns,
    pub embeds: Vec<Embed>,
}

impl Projection {
    pub fn all() -> Self {
        Self {
            columns: Columns::All,
            embeds: Vec::new(),
        }
    }

    pub fn only<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: Columns::Only(columns.into_iter().map(Into::into).collect()),
            embeds: Vec::new(),
        }
    }

    pub fn parse(clause: &str) -> StoreResult<Self> {
        let items = split_top_level(clause)?;
        let mut plain = Vec::new();
        let mut embeds = Vec::new();

        for item in items {
            if let Some(caps) = EMBED_RE.captures(item) {
                let table = caps["table"].to_string();
                let alias = caps
                    .name("alias")
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| table.clone());
                let inner: Vec<&str> = caps["cols"]
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect();
                embeds.push(Embed {
                    alias,
                    table,
                    columns: Columns::parse(&inner, clause)?,
                });
            } else {
                plain.push(item);
            }
        }

        Ok(Self {
            columns: Columns::parse(&plain, clause)?,
            embeds,
        })
    }

    /// Copies the selected plain columns out of a stored row. Embeds are
    /// resolved by the store, which knows the relationships.
    pub fn select_columns(&self, row: &Record) -> Record {
        match &self.columns {
            Columns::All => row.clone(),
            Columns::Only(names) => {
                let mut out = row.clone();
                out.retain_columns(names);
                out
            }
        }
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::all()
    }
}

impl FromStr for Projection {
    type Err = StoreError;

    fn from_str(s: &str) -> StoreResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.columns)?;
        for embed in &self.embeds {
            write!(f, ",{}", embed)?;
        }
        Ok(())
    }
}

fn split_top_level(clause: &str) -> StoreResult<Vec<&str>> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (idx, ch) in clause.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    StoreError::InvalidProjection(format!("unbalanced ')' in '{}'", clause))
                })?;
            }
            ',' if depth == 0 => {
                items.push(clause[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(StoreError::InvalidProjection(format!(
            "unbalanced '(' in '{}'",
            clause
        )));
    }
    items.push(clause[start..].trim());

    Ok(items.into_iter().filter(|item| !item.is_empty()).collect())
}
