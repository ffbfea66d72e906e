//! Entry point used by the search service.
//!
//! A [`SearchEngine`] owns a validated configuration and runs the whole
//! pipeline: limits, tokenizer, parser, then one of the two compilers. A
//! blank query is not an error; it simply imposes no filter.

use tracing::{debug, error, info};

use crate::ast::Node;
use crate::config::EngineConfig;
use crate::error::{ConfigurationError, QueryError};
use crate::lexer::tokenize;
use crate::parser::{parse_tokens, ParserOptions};
use crate::predicate::{Predicate, PredicateCompiler};
use crate::registry::FieldRegistry;
use crate::sql_compiler::{CompiledFilter, SqlCompiler};

#[derive(Debug, Clone)]
pub struct SearchEngine {
    config: EngineConfig,
}

impl SearchEngine {
    /// Validates the registry. A failure here is a deployment defect and
    /// should stop the service from starting.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigurationError> {
        if let Err(e) = config.registry.validate() {
            error!(error = %e, "rejecting search field registry");
            return Err(e);
        }
        info!(
            main_table = %config.registry.main_table,
            fields = config.registry.fields.len(),
            default_targets = config.registry.default_targets.len(),
            implicit_and = config.implicit_and,
            "search engine ready"
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.config.registry
    }

    fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            implicit_and: self.config.implicit_and,
            ..ParserOptions::default()
        }
    }

    /// Parses `text`; `Ok(None)` for a blank query.
    pub fn parse(&self, text: &str) -> Result<Option<Node>, QueryError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let result = self
            .config
            .limits
            .check(text)
            .map_err(QueryError::from)
            .and_then(|()| {
                let tokens = tokenize(text)?;
                Ok(parse_tokens(&tokens, self.parser_options())?)
            });

        match result {
            Ok(node) => {
                debug!(leaves = node.leaf_count(), depth = node.depth(), "parsed search query");
                Ok(Some(node))
            }
            Err(e) => {
                // user input, not a server fault
                debug!(error = %e, "rejected search query");
                Err(e)
            }
        }
    }

    /// Builds the SQL filter for `text`; `Ok(None)` means "no filter".
    pub fn build_where(&self, text: &str) -> Result<Option<CompiledFilter>, QueryError> {
        let Some(node) = self.parse(text)? else {
            return Ok(None);
        };
        let compiled = SqlCompiler::new(&self.config.registry).compile(&node)?;
        debug!(params = compiled.params.len(), "compiled search query to sql");
        Ok(Some(compiled))
    }

    /// Builds a predicate for `text` from `term_factory`; `Ok(None)` means
    /// "no filter", whether the query was blank or every leaf was dropped.
    pub fn build_predicate<P, F>(&self, text: &str, term_factory: F) -> Result<Option<P>, QueryError>
    where
        P: Predicate,
        F: FnMut(&str) -> Option<P>,
    {
        let Some(node) = self.parse(text)? else {
            return Ok(None);
        };
        let predicate = PredicateCompiler::compile(&node, term_factory);
        debug!(constrained = predicate.is_some(), "compiled search query to predicate");
        Ok(predicate)
    }
}
