//! The statement IR and its serializer.
//!
//! SQL is assembled as a tree of [`Node`] values (raw keywords, qualified
//! names, bind values, nested lists) and flattened by [`Node::serialize`]
//! into one [`Fragment`]: the final SQL text plus its ordered parameter list.
//! Placeholder markers (`?`) are positional; the execution layer renumbers
//! them into `$n` form (see [`crate::client`]).

use crate::dialect::Dialect;
use crate::param::{BatchGroup, BindValue, Param};
use tokio_postgres::types::ToSql;

/// Rendered SQL text plus its ordered bind parameters.
///
/// Invariant: `text` contains exactly as many `?` markers as `params` has
/// entries, in the order they will be bound.
#[derive(Clone, Debug, Default)]
pub struct Fragment {
    /// SQL text with positional `?` markers.
    pub text: String,
    /// Bind values in marker order.
    pub params: Vec<BindValue>,
    /// Original un-parenthesized form, present when this fragment was
    /// serialized from a parenthesized composite.
    unwrapped: Option<Box<Node>>,
}

impl Fragment {
    /// A fragment of raw text with no parameters.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
            unwrapped: None,
        }
    }

    /// Check whether both text and parameters are empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.params.is_empty()
    }

    /// Check whether any parameter is a batch group.
    pub fn has_batch(&self) -> bool {
        self.params.iter().any(BindValue::is_batch)
    }
}

/// Serializer input: everything a statement clause can be built from.
///
/// A closed union with an exhaustive match in [`Node::serialize`], so a new
/// kind of value cannot silently fall through the serializer.
#[derive(Clone, Debug)]
pub enum Node {
    /// Pre-rendered SQL; serialization is the identity on it.
    Fragment(Fragment),
    /// A batch-parameter group, kept whole as a single parameter.
    Batch(BatchGroup),
    /// An ordered sequence of nested values.
    List(Vec<Node>),
    /// An ordered sequence rendered inside parentheses.
    Group(Vec<Node>),
    /// A qualified identifier, quoted per the active dialect.
    Name(String),
    /// Raw SQL text emitted verbatim, no parameters.
    Raw(String),
    /// A single bind parameter.
    Value(Param),
    /// SQL NULL as a bind parameter (still occupies a placeholder).
    Null,
}

impl Node {
    /// A qualified-name node.
    pub fn name(name: impl Into<String>) -> Self {
        Node::Name(name.into())
    }

    /// A raw-text node.
    pub fn raw(text: impl Into<String>) -> Self {
        Node::Raw(text.into())
    }

    /// A bind-parameter node.
    pub fn value<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Node::Value(Param::new(value))
    }

    /// A sequence node.
    pub fn list(items: impl IntoIterator<Item = Node>) -> Self {
        Node::List(items.into_iter().collect())
    }

    /// A parenthesized sequence node.
    pub fn group(items: impl IntoIterator<Item = Node>) -> Self {
        Node::Group(items.into_iter().collect())
    }

    /// Interleave `sep` between `items`, as one list node.
    pub fn separated(items: impl IntoIterator<Item = Node>, sep: &str) -> Self {
        Node::List(Self::separated_items(items, sep))
    }

    /// Interleave `sep` between `items`, as a bare vector (useful for
    /// building parenthesized groups).
    pub fn separated_items(items: impl IntoIterator<Item = Node>, sep: &str) -> Vec<Node> {
        let mut out = Vec::new();
        for item in items {
            if !out.is_empty() {
                out.push(Node::raw(sep));
            }
            out.push(item);
        }
        out
    }

    /// Strip one level of parentheses, recovering the bare sequence.
    ///
    /// Parenthesized composites remember their un-wrapped form, so callers
    /// needing the bare list (e.g. comma-separated field sets) get the
    /// original back without re-deriving structure. Any other value is
    /// returned unchanged.
    pub fn remove_parenthesis(self) -> Node {
        match self {
            Node::Group(items) => Node::List(items),
            Node::Fragment(fragment) => match fragment.unwrapped {
                Some(original) => *original,
                None => Node::Fragment(fragment),
            },
            other => other,
        }
    }

    /// Flatten this tree into one [`Fragment`].
    ///
    /// Texts are joined with a single space except where adjacent tokens
    /// forbid one (after `(`, before `)` or `,`, or around empty text), and
    /// parameters are collected in left-to-right traversal order. Batch
    /// groups are surfaced as single parameters, never flattened.
    pub fn serialize(&self, dialect: &Dialect) -> Fragment {
        match self {
            Node::Fragment(fragment) => fragment.clone(),
            Node::Batch(group) => Fragment {
                text: "?".to_string(),
                params: vec![BindValue::Batch(group.clone())],
                unwrapped: None,
            },
            Node::List(items) => join_spaced(items, dialect),
            Node::Group(items) => {
                let inner = join_spaced(items, dialect);
                Fragment {
                    text: format!("({})", inner.text),
                    params: inner.params,
                    unwrapped: Some(Box::new(Node::List(items.clone()))),
                }
            }
            Node::Name(name) => dialect.qname(name),
            Node::Raw(text) => Fragment::raw(text.clone()),
            Node::Value(param) => Fragment {
                text: "?".to_string(),
                params: vec![BindValue::Value(param.clone())],
                unwrapped: None,
            },
            Node::Null => Fragment {
                text: "?".to_string(),
                params: vec![BindValue::Value(Param::null())],
                unwrapped: None,
            },
        }
    }
}

/// Whether a space belongs between accumulated text and the next token.
fn needs_space(acc: &str, next: &str) -> bool {
    if acc.is_empty() || next.is_empty() {
        return false;
    }
    if acc.ends_with('(') {
        return false;
    }
    !(next.starts_with(')') || next.starts_with(','))
}

fn join_spaced(items: &[Node], dialect: &Dialect) -> Fragment {
    let mut text = String::new();
    let mut params = Vec::new();
    for item in items {
        let part = item.serialize(dialect);
        if needs_space(&text, &part.text) {
            text.push(' ');
        }
        text.push_str(&part.text);
        params.extend(part.params);
    }
    Fragment {
        text,
        params,
        unwrapped: None,
    }
}
