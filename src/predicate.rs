//! Compiles a query AST into a caller-defined predicate.
//!
//! The engine knows nothing about the predicate type beyond how to combine
//! two of them with AND/OR and how to negate one. Leaves are turned into
//! predicates by a callback; a leaf the callback cannot express is dropped.

use sea_query::SimpleExpr;
use std::fmt;

use crate::ast::Node;

/// A boolean matcher that can be composed with logical connectives.
pub trait Predicate: Sized {
    fn conjoin(self, other: Self) -> Self;
    fn disjoin(self, other: Self) -> Self;
    fn negate(self) -> Self;
}

/// Query builder expressions compose directly into a `WHERE` clause.
impl Predicate for SimpleExpr {
    fn conjoin(self, other: Self) -> Self {
        self.and(other)
    }

    fn disjoin(self, other: Self) -> Self {
        self.or(other)
    }

    fn negate(self) -> Self {
        self.not()
    }
}

/// An in-memory predicate over `T`.
pub struct Matcher<T: ?Sized> {
    test: Box<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T: ?Sized> Matcher<T> {
    pub fn new(test: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self {
            test: Box::new(test),
        }
    }

    pub fn matches(&self, item: &T) -> bool {
        (self.test)(item)
    }
}

impl<T: ?Sized> fmt::Debug for Matcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Matcher(..)")
    }
}

impl<T: ?Sized + 'static> Predicate for Matcher<T> {
    fn conjoin(self, other: Self) -> Self {
        Matcher::new(move |item: &T| self.matches(item) && other.matches(item))
    }

    fn disjoin(self, other: Self) -> Self {
        Matcher::new(move |item: &T| self.matches(item) || other.matches(item))
    }

    fn negate(self) -> Self {
        Matcher::new(move |item: &T| !self.matches(item))
    }
}

/// Folds an AST into a single predicate.
///
/// `None` is "no constraint": an `And`/`Or` whose children are all dropped is
/// dropped too, and so is the negation of a dropped child. A top-level `None`
/// means the query does not filter anything.
pub struct PredicateCompiler;

impl PredicateCompiler {
    /// Leaves are passed to `term_factory` as written. Field names are not
    /// forwarded; use [`PredicateCompiler::compile_scoped`] for that.
    pub fn compile<P, F>(node: &Node, mut term_factory: F) -> Option<P>
    where
        P: Predicate,
        F: FnMut(&str) -> Option<P>,
    {
        Self::compile_scoped(node, |_field, value| term_factory(value))
    }

    /// Like [`PredicateCompiler::compile`], but the factory also receives the
    /// innermost enclosing field name, if any.
    pub fn compile_scoped<P, F>(node: &Node, mut term_factory: F) -> Option<P>
    where
        P: Predicate,
        F: FnMut(Option<&str>, &str) -> Option<P>,
    {
        fold(node, None, &mut term_factory)
    }
}

fn fold<P, F>(node: &Node, field: Option<&str>, factory: &mut F) -> Option<P>
where
    P: Predicate,
    F: FnMut(Option<&str>, &str) -> Option<P>,
{
    match node {
        Node::Term { value } | Node::Phrase { value } => factory(field, value),
        Node::Field { name, value } => fold(value, Some(name.as_str()), factory),
        Node::Not { child } => fold(child, field, factory).map(Predicate::negate),
        Node::And { children } => children
            .iter()
            .filter_map(|child| fold(child, field, factory))
            .reduce(Predicate::conjoin),
        Node::Or { children } => children
            .iter()
            .filter_map(|child| fold(child, field, factory))
            .reduce(Predicate::disjoin),
    }
}
