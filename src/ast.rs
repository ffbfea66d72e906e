//! AST for boolean search queries.

use serde::Serialize;
use std::fmt;

/// A parsed query. Nodes are immutable once built; `And`/`Or` built through
/// [`Node::and`] / [`Node::or`] always hold at least two children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// A bare word or wildcard pattern, e.g. `python` or `pyth*`
    Term { value: String },
    /// Quoted text, e.g. `"machine learning"`
    Phrase { value: String },
    /// Scopes a subtree to a named field, e.g. `skill:(python OR go)`
    Field { name: String, value: Box<Node> },
    Not { child: Box<Node> },
    And { children: Vec<Node> },
    Or { children: Vec<Node> },
}

impl Node {
    pub fn term(value: impl Into<String>) -> Self {
        Node::Term { value: value.into() }
    }

    pub fn phrase(value: impl Into<String>) -> Self {
        Node::Phrase { value: value.into() }
    }

    /// Field names are matched case-insensitively, so they are stored lowercase.
    pub fn field(name: &str, value: Node) -> Self {
        Node::Field {
            name: name.to_lowercase(),
            value: Box::new(value),
        }
    }

    pub fn not(child: Node) -> Self {
        Node::Not {
            child: Box::new(child),
        }
    }

    /// Builds a conjunction; a single operand collapses to itself.
    pub fn and(mut children: Vec<Node>) -> Self {
        if children.len() == 1 {
            return children.remove(0);
        }
        Node::And { children }
    }

    /// Builds a disjunction; a single operand collapses to itself.
    pub fn or(mut children: Vec<Node>) -> Self {
        if children.len() == 1 {
            return children.remove(0);
        }
        Node::Or { children }
    }

    /// Raw value of a `Term` or `Phrase` leaf.
    pub fn leaf_value(&self) -> Option<&str> {
        match self {
            Node::Term { value } | Node::Phrase { value } => Some(value),
            _ => None,
        }
    }

    /// Number of `Term`/`Phrase` leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Term { .. } | Node::Phrase { .. } => 1,
            Node::Field { value, .. } => value.leaf_count(),
            Node::Not { child } => child.leaf_count(),
            Node::And { children } | Node::Or { children } => {
                children.iter().map(Node::leaf_count).sum()
            }
        }
    }

    /// Nesting depth of the tree; a single leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Node::Term { .. } | Node::Phrase { .. } => 1,
            Node::Field { value, .. } => 1 + value.depth(),
            Node::Not { child } => 1 + child.depth(),
            Node::And { children } | Node::Or { children } => {
                1 + children.iter().map(Node::depth).max().unwrap_or(0)
            }
        }
    }

    fn is_group(&self) -> bool {
        matches!(self, Node::And { .. } | Node::Or { .. })
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_group() {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }

    fn fmt_joined(f: &mut fmt::Formatter<'_>, children: &[Node], op: &str) -> fmt::Result {
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                write!(f, " {op} ")?;
            }
            child.fmt_operand(f)?;
        }
        Ok(())
    }
}

/// Renders the canonical query string. Every group is parenthesized, so the
/// output parses back to the same tree.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Term { value } => f.write_str(value),
            Node::Phrase { value } => write!(f, "\"{value}\""),
            Node::Field { name, value } => {
                if value.leaf_value().is_some() {
                    write!(f, "{name}:{value}")
                } else {
                    write!(f, "{name}:({value})")
                }
            }
            // `NOT -x` would re-lex as a double negation; `--x` keeps the
            // second `-` inside the term
            Node::Not { child } => match child.as_ref() {
                Node::Term { value } if value.starts_with('-') => write!(f, "-{value}"),
                _ => {
                    f.write_str("NOT ")?;
                    child.fmt_operand(f)
                }
            },
            Node::And { children } => Node::fmt_joined(f, children, "AND"),
            Node::Or { children } => Node::fmt_joined(f, children, "OR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_operand_collapses() {
        assert_eq!(Node::and(vec![Node::term("a")]), Node::term("a"));
        assert_eq!(Node::or(vec![Node::phrase("a b")]), Node::phrase("a b"));
    }

    #[test]
    fn test_groups_are_not_flattened() {
        let inner = Node::and(vec![Node::term("a"), Node::term("b")]);
        let outer = Node::and(vec![inner.clone(), Node::term("c")]);
        assert_eq!(
            outer,
            Node::And {
                children: vec![inner, Node::term("c")]
            }
        );
    }

    #[test]
    fn test_field_name_is_lowercased() {
        let node = Node::field("Skill", Node::term("Python"));
        assert_eq!(
            node,
            Node::Field {
                name: "skill".into(),
                value: Box::new(Node::term("Python"))
            }
        );
    }

    #[test]
    fn test_display() {
        let node = Node::or(vec![
            Node::term("python"),
            Node::and(vec![
                Node::field("skill", Node::phrase("machine learning")),
                Node::not(Node::term("php")),
            ]),
        ]);
        assert_eq!(
            node.to_string(),
            r#"python OR (skill:"machine learning" AND NOT php)"#
        );
    }

    #[test]
    fn test_display_parenthesizes_grouped_operands() {
        let node = Node::not(Node::or(vec![Node::term("a"), Node::term("b")]));
        assert_eq!(node.to_string(), "NOT (a OR b)");

        let node = Node::field("city", Node::or(vec![Node::term("paris"), Node::term("lyon")]));
        assert_eq!(node.to_string(), "city:(paris OR lyon)");
    }

    #[test]
    fn test_display_negated_dash_term() {
        let node = Node::not(Node::term("-python"));
        assert_eq!(node.to_string(), "--python");

        let node = Node::and(vec![Node::term("java"), Node::not(Node::term("-"))]);
        assert_eq!(node.to_string(), "java AND --");
    }

    #[test]
    fn test_leaf_count_and_depth() {
        let node = Node::and(vec![
            Node::term("a"),
            Node::not(Node::field("skill", Node::term("b"))),
        ]);
        assert_eq!(node.leaf_count(), 2);
        assert_eq!(node.depth(), 4);
        assert_eq!(Node::term("x").leaf_value(), Some("x"));
        assert_eq!(node.leaf_value(), None);
    }

    #[test]
    fn test_serialize_json() {
        let node = Node::field("skill", Node::term("rust"));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "field",
                "name": "skill",
                "value": { "type": "term", "value": "rust" }
            })
        );
    }
}
