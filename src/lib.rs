//! Boolean search queries for candidate search.
//!
//! A query such as `skill:python AND (city:paris OR city:lyon) -php` goes
//! through the [`lexer`], the [`parser`] and then one of two back-ends: the
//! [`sql_compiler`] renders a parameterized `WHERE` fragment from a
//! [`registry::FieldRegistry`], the [`predicate`] compiler folds the tree into
//! any type implementing [`predicate::Predicate`]. [`engine::SearchEngine`]
//! wires the stages together.

pub mod ast;
pub mod config;
pub mod engine;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod predicate;
pub mod registry;
pub mod sql_compiler;
pub mod token;

pub use ast::Node;
pub use config::{ConfigError, EngineConfig, QueryLimits};
pub use engine::SearchEngine;
pub use error::{ConfigurationError, LexError, LimitError, ParseError, QueryError};
pub use parser::{parse, ParserOptions};
pub use predicate::{Matcher, Predicate, PredicateCompiler};
pub use registry::{FieldRegistry, ResolvedTarget, SqlTarget, TargetKind};
pub use sql_compiler::{CompiledFilter, SqlCompiler};
