//! Field registry: where each searchable field lives in the database.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ConfigurationError;

/// How a field value is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// A column of the main table (or of `table` when given).
    Column,
    /// A column of a child table joined back through `fk`, matched with `EXISTS`.
    Related,
}

/// One storage location a search term is matched against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlTarget {
    pub kind: TargetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fk: Option<String>,
}

impl SqlTarget {
    pub fn column(column: &str) -> Self {
        Self {
            kind: TargetKind::Column,
            table: None,
            column: Some(column.to_string()),
            fk: None,
        }
    }

    pub fn related(table: &str, fk: &str, column: &str) -> Self {
        Self {
            kind: TargetKind::Related,
            table: Some(table.to_string()),
            column: Some(column.to_string()),
            fk: Some(fk.to_string()),
        }
    }

    /// Checks that the target carries what its kind needs and that every
    /// identifier is safe to splice into SQL text.
    pub fn validate(&self, field: &str) -> Result<(), ConfigurationError> {
        self.resolve(field).map(|_| ())
    }

    /// Validates the target and borrows its identifiers by kind.
    pub fn resolve(&self, field: &str) -> Result<ResolvedTarget<'_>, ConfigurationError> {
        let kind = self.kind;
        let resolved = match self.kind {
            TargetKind::Column => ResolvedTarget::Column {
                table: self.table.as_deref(),
                column: required_part(&self.column, "column", kind, field)?,
            },
            TargetKind::Related => ResolvedTarget::Related {
                table: required_part(&self.table, "table", kind, field)?,
                fk: required_part(&self.fk, "fk", kind, field)?,
                column: required_part(&self.column, "column", kind, field)?,
            },
        };

        for value in [&self.table, &self.column, &self.fk].into_iter().flatten() {
            if !is_sql_identifier(value) {
                return Err(ConfigurationError::for_field(
                    field,
                    format!("'{value}' is not a valid SQL identifier"),
                ));
            }
        }
        Ok(resolved)
    }
}

/// Identifiers of a validated [`SqlTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTarget<'t> {
    /// `table` is `None` when the column lives on the main table.
    Column { table: Option<&'t str>, column: &'t str },
    Related { table: &'t str, fk: &'t str, column: &'t str },
}

fn required_part<'t>(
    value: &'t Option<String>,
    name: &str,
    kind: TargetKind,
    field: &str,
) -> Result<&'t str, ConfigurationError> {
    match value.as_deref() {
        None | Some("") => Err(ConfigurationError::for_field(
            field,
            format!("{} target is missing '{name}'", kind_name(kind)),
        )),
        Some(v) => Ok(v),
    }
}

fn kind_name(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Column => "column",
        TargetKind::Related => "related",
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_sql_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Maps lowercase field aliases to storage targets. Unscoped terms and unknown
/// fields fall back to `default_targets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRegistry {
    /// Table the filter is applied to, e.g. `candidates`.
    pub main_table: String,
    /// Primary key of `main_table` that related tables point at.
    #[serde(default = "default_id_column")]
    pub id_column: String,
    pub default_targets: Vec<SqlTarget>,
    #[serde(default)]
    pub fields: HashMap<String, Vec<SqlTarget>>,
}

fn default_id_column() -> String {
    "id".to_string()
}

impl FieldRegistry {
    pub fn builder(main_table: &str, id_column: &str) -> FieldRegistryBuilder {
        FieldRegistryBuilder {
            registry: FieldRegistry {
                main_table: main_table.to_string(),
                id_column: id_column.to_string(),
                default_targets: Vec::new(),
                fields: HashMap::new(),
            },
        }
    }

    /// Targets for a field; `None` or an unknown alias yields the defaults.
    pub fn targets_for(&self, field: Option<&str>) -> &[SqlTarget] {
        field
            .and_then(|f| self.fields.get(&f.to_lowercase()))
            .map(Vec::as_slice)
            .unwrap_or(&self.default_targets)
    }

    pub fn is_registered(&self, field: &str) -> bool {
        self.fields.contains_key(&field.to_lowercase())
    }

    /// Checks `main_table` and `id_column`, the identifiers every compiled
    /// filter refers to.
    pub fn validate_main_table(&self) -> Result<(), ConfigurationError> {
        for (what, value) in [("main_table", &self.main_table), ("id_column", &self.id_column)] {
            if !is_sql_identifier(value) {
                return Err(ConfigurationError::new(format!(
                    "{what} '{value}' is not a valid SQL identifier"
                )));
            }
        }
        Ok(())
    }

    /// Validates the whole registry. Meant to run once at start-up; any error
    /// is a deployment defect.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.validate_main_table()?;

        if self.default_targets.is_empty() {
            return Err(ConfigurationError::new("default_targets must not be empty"));
        }
        for target in &self.default_targets {
            target.validate("<default>")?;
        }

        // sorted so the reported defect does not depend on hash order
        let mut aliases: Vec<&String> = self.fields.keys().collect();
        aliases.sort();
        for alias in aliases {
            if alias.is_empty() || *alias != alias.to_lowercase() {
                return Err(ConfigurationError::for_field(
                    alias.as_str(),
                    "field aliases must be non-empty and lowercase",
                ));
            }
            let targets = &self.fields[alias];
            if targets.is_empty() {
                return Err(ConfigurationError::for_field(
                    alias.as_str(),
                    "at least one target is required",
                ));
            }
            for target in targets {
                target.validate(alias)?;
            }
        }
        Ok(())
    }
}

pub struct FieldRegistryBuilder {
    registry: FieldRegistry,
}

impl FieldRegistryBuilder {
    pub fn default_target(mut self, target: SqlTarget) -> Self {
        self.registry.default_targets.push(target);
        self
    }

    pub fn field(mut self, alias: &str, targets: Vec<SqlTarget>) -> Self {
        self.registry.fields.insert(alias.to_lowercase(), targets);
        self
    }

    pub fn build(self) -> FieldRegistry {
        self.registry
    }
}
