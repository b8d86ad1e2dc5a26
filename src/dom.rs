//! Shared-identity JSON document model.
//!
//! An upstream bundler inlines external `$ref` targets by placing the *same*
//! parsed object at every use site, and the rewrite passes depend on seeing
//! that aliasing: identity tells a shared external root apart from a
//! structurally equal clone. `serde_json::Value` owns its subtrees and
//! cannot express it, so the normalizer works on [`Node`] — a JSON tree
//! whose objects and arrays are reference-counted handles.
//!
//! Cloning a `Node` clones the handle, not the tree; mutation through any
//! clone is visible at every site, and [`NodeId`] gives the registry and
//! resolver a hashable identity key. Ids are only meaningful while some
//! handle keeps the allocation alive, so every map that stores a `NodeId`
//! stores a `Node` handle next to it.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::NormalizeError;

/// Order-preserving map underlying object nodes.
pub type ObjectMap = IndexMap<String, Node>;

/// Shared handle to an object node.
pub type ObjectRef = Rc<RefCell<ObjectMap>>;

/// Shared handle to an array node.
pub type ArrayRef = Rc<RefCell<Vec<Node>>>;

/// A JSON value with shared, mutable objects and arrays.
#[derive(Clone)]
pub enum Node {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(ArrayRef),
    Object(ObjectRef),
}

/// Identity of a shared object or array allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl Node {
    /// A new, empty shared object.
    pub fn object() -> Node {
        Node::Object(Rc::new(RefCell::new(ObjectMap::new())))
    }

    /// A new shared object built from `(key, value)` entries.
    pub fn object_from<I>(entries: I) -> Node
    where
        I: IntoIterator<Item = (String, Node)>,
    {
        Node::Object(Rc::new(RefCell::new(entries.into_iter().collect())))
    }

    /// A new shared array built from elements.
    pub fn array_from<I>(elements: I) -> Node
    where
        I: IntoIterator<Item = Node>,
    {
        Node::Array(Rc::new(RefCell::new(elements.into_iter().collect())))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Node::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Node::Array(_))
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Node::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    /// Identity of this node's allocation. `None` for scalars, which have no
    /// shared allocation and therefore no identity.
    pub fn id(&self) -> Option<NodeId> {
        match self {
            Node::Object(map) => Some(NodeId(Rc::as_ptr(map) as usize)),
            Node::Array(arr) => Some(NodeId(Rc::as_ptr(arr) as usize)),
            _ => None,
        }
    }

    /// Whether two nodes are the same shared allocation.
    pub fn same_identity(&self, other: &Node) -> bool {
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Look up a key on an object node. Returns a handle, not a copy.
    pub fn get(&self, key: &str) -> Option<Node> {
        self.as_object()?.borrow().get(key).cloned()
    }

    /// Look up a key and return its string value, if it is a string.
    pub fn str_field(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    /// Build a `Node` tree from a `serde_json::Value`. The result has no
    /// shared subtrees; sharing appears when a bundler splices one loaded
    /// node into several sites.
    pub fn from_json(value: &Value) -> Node {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(*b),
            Value::Number(n) => Node::Number(n.clone()),
            Value::String(s) => Node::String(s.clone()),
            Value::Array(items) => Node::array_from(items.iter().map(Node::from_json)),
            Value::Object(map) => Node::object_from(
                map.iter().map(|(k, v)| (k.clone(), Node::from_json(v))),
            ),
        }
    }

    /// Convert back to a `serde_json::Value`. Shared subtrees are expanded
    /// at every site; cycles collapse to `null` at the back-edge.
    pub fn to_json(&self) -> Value {
        let mut on_stack = HashSet::new();
        self.to_json_guarded(&mut on_stack)
    }

    fn to_json_guarded(&self, on_stack: &mut HashSet<NodeId>) -> Value {
        match self {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(arr) => {
                let id = NodeId(Rc::as_ptr(arr) as usize);
                if !on_stack.insert(id) {
                    return Value::Null;
                }
                let items = arr
                    .borrow()
                    .iter()
                    .map(|item| item.to_json_guarded(on_stack))
                    .collect();
                on_stack.remove(&id);
                Value::Array(items)
            }
            Node::Object(map) => {
                let id = NodeId(Rc::as_ptr(map) as usize);
                if !on_stack.insert(id) {
                    return Value::Null;
                }
                let entries = map
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json_guarded(on_stack)))
                    .collect();
                on_stack.remove(&id);
                Value::Object(entries)
            }
        }
    }

    /// Parse a JSON document into a `Node` tree.
    pub fn from_json_str(input: &str) -> Result<Node, NormalizeError> {
        let value: Value = serde_json::from_str(input)?;
        Ok(Node::from_json(&value))
    }

    /// Parse a YAML document into a `Node` tree.
    pub fn from_yaml_str(input: &str) -> Result<Node, NormalizeError> {
        let value: Value = serde_yaml::from_str(input)?;
        Ok(Node::from_json(&value))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
