//! SQL compiler that turns a query AST into a parameterized `WHERE` fragment.
//!
//! Leaves become `ILIKE` matches against the columns the field registry maps
//! them to. Targets living in a child table are reached with an `EXISTS`
//! subquery. Values never appear in the SQL text; each leaf target gets its
//! own `:pN` parameter.

use sea_query::{
    Alias, Asterisk, Expr, PostgresQueryBuilder, Query, QueryStatementWriter, Value, Values,
};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::ast::Node;
use crate::error::ConfigurationError;
use crate::registry::{FieldRegistry, ResolvedTarget, SqlTarget};

/// Result of SQL compilation: a boolean fragment plus its bind parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledFilter {
    pub sql: String,
    /// `p0, p1, …` in compile order.
    pub params: BTreeMap<String, String>,
}

impl CompiledFilter {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Parameter values in compile order (`p0` first).
    pub fn ordered_values(&self) -> Vec<&str> {
        (0..self.params.len())
            .filter_map(|i| self.param(&param_key(i)))
            .collect()
    }

    /// Rewrites `:pN` placeholders to `$N+1` for drivers with positional binding.
    pub fn to_positional(&self) -> (String, Values) {
        let mut sql = String::with_capacity(self.sql.len());
        let mut rest = self.sql.as_str();

        while let Some(at) = rest.find(":p") {
            sql.push_str(&rest[..at]);
            let digits = rest[at + 2..]
                .bytes()
                .take_while(u8::is_ascii_digit)
                .count();
            let number = rest[at + 2..at + 2 + digits].parse::<usize>().ok();
            match number {
                Some(index) => sql.push_str(&format!("${}", index + 1)),
                None => sql.push_str(&rest[at..at + 2]),
            }
            rest = &rest[at + 2 + digits..];
        }
        sql.push_str(rest);

        let values = self
            .ordered_values()
            .into_iter()
            .map(|v| Value::from(v.to_string()))
            .collect();
        (sql, Values(values))
    }

    /// Full `SELECT * FROM <main table> WHERE <filter>` text, for logs and tools.
    /// Parameters stay unbound.
    pub fn select_statement(&self, registry: &FieldRegistry) -> String {
        Query::select()
            .column(Asterisk)
            .from(Alias::new(registry.main_table.clone()))
            .and_where(Expr::cust(self.sql.clone()))
            .to_string(PostgresQueryBuilder)
    }
}

fn param_key(index: usize) -> String {
    format!("p{index}")
}

/// Converts a term or phrase into an `ILIKE` pattern.
///
/// `*` is the user-facing wildcard and becomes `%`. Without any wildcard the
/// value is matched anywhere in the column ("contains").
pub fn ilike_pattern(value: &str) -> String {
    if value.contains('*') {
        value.replace('*', "%")
    } else {
        format!("%{value}%")
    }
}

/// SQL Compiler that converts AST to a `WHERE` fragment
pub struct SqlCompiler<'r> {
    registry: &'r FieldRegistry,
}

impl<'r> SqlCompiler<'r> {
    pub fn new(registry: &'r FieldRegistry) -> Self {
        Self { registry }
    }

    /// Compiles `node`. Parameter numbering restarts at `p0` on every call.
    /// Every identifier spliced into the SQL text is checked first, so an
    /// unvalidated registry fails here instead of producing unsafe SQL.
    pub fn compile(&self, node: &Node) -> Result<CompiledFilter, ConfigurationError> {
        self.registry.validate_main_table()?;
        let mut values = Vec::new();
        let sql = self.compile_node(node, None, &mut values)?;
        let params = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (param_key(i), v))
            .collect();
        Ok(CompiledFilter { sql, params })
    }

    /// Compile a node under the currently active field, if any
    fn compile_node(
        &self,
        node: &Node,
        field: Option<&str>,
        values: &mut Vec<String>,
    ) -> Result<String, ConfigurationError> {
        match node {
            Node::Term { value } | Node::Phrase { value } => self.compile_leaf(value, field, values),
            // the innermost field wins for its own subtree
            Node::Field { name, value } => self.compile_node(value, Some(name.as_str()), values),
            Node::And { children } => self.compile_group(children, " AND ", "TRUE", field, values),
            Node::Or { children } => self.compile_group(children, " OR ", "FALSE", field, values),
            Node::Not { child } => {
                let inner = self.compile_node(child, field, values)?;
                Ok(format!("(NOT {inner})"))
            }
        }
    }

    fn compile_group(
        &self,
        children: &[Node],
        separator: &str,
        empty: &str,
        field: Option<&str>,
        values: &mut Vec<String>,
    ) -> Result<String, ConfigurationError> {
        if children.is_empty() {
            return Ok(empty.to_string());
        }
        let parts = children
            .iter()
            .map(|child| self.compile_node(child, field, values))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("({})", parts.join(separator)))
    }

    /// A leaf matches if any of the field's targets matches.
    fn compile_leaf(
        &self,
        value: &str,
        field: Option<&str>,
        values: &mut Vec<String>,
    ) -> Result<String, ConfigurationError> {
        let targets = self.registry.targets_for(field);
        if targets.is_empty() {
            return Err(ConfigurationError::for_field(
                field.unwrap_or(DEFAULT_FIELD),
                "no search targets configured",
            ));
        }

        let pattern = ilike_pattern(value);
        let mut parts = Vec::with_capacity(targets.len());
        for target in targets {
            let key = param_key(values.len());
            values.push(pattern.clone());
            parts.push(self.compile_target(target, &key, field)?);
        }

        if parts.len() == 1 {
            Ok(parts.remove(0))
        } else {
            Ok(format!("({})", parts.join(" OR ")))
        }
    }

    fn compile_target(
        &self,
        target: &SqlTarget,
        key: &str,
        field: Option<&str>,
    ) -> Result<String, ConfigurationError> {
        let field = field.unwrap_or(DEFAULT_FIELD);
        let main = self.registry.main_table.as_str();
        match target.resolve(field)? {
            ResolvedTarget::Column { table, column } => {
                let table = table.unwrap_or(main);
                Ok(format!("{table}.\"{column}\" ILIKE :{key}"))
            }
            ResolvedTarget::Related { table, fk, column } => {
                // one alias per parameter so repeated tables never collide
                let alias = format!("{table}_{key}");
                Ok(format!(
                    "EXISTS (SELECT 1 FROM {table} {alias} WHERE {alias}.\"{fk}\" = {main}.\"{id}\" AND {alias}.\"{column}\" ILIKE :{key})",
                    id = self.registry.id_column,
                ))
            }
        }
    }
}

const DEFAULT_FIELD: &str = "<default>";

/// Compiles `node` against `registry`.
pub fn compile_sql(node: &Node, registry: &FieldRegistry) -> Result<CompiledFilter, ConfigurationError> {
    SqlCompiler::new(registry).compile(node)
}
