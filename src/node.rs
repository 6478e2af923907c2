use core::{
	any::{type_name, Any},
	fmt,
};
use std::rc::Rc;

/// Category of a renderable element.
///
/// Assigned and interpreted by the embedder (commonly an index into its table of
/// renderer implementations). This crate never inspects the value; it is carried
/// through flattening unchanged.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Tag(pub u32);

/// A renderable element: an opaque payload with identity attached.
///
/// The payload is whatever the embedder renders from. This crate only reads
/// and (during [`children::map`]) replaces `key`.
///
/// [`children::map`]: `crate::children::map`
#[derive(Clone)]
pub struct Element {
	/// Explicit identity within the element's parent collection, if the embedder
	/// assigned one. Escaped into the leaf's path key during flattening.
	pub key: Option<String>,
	/// Embedder-defined category. Passed through unchanged.
	pub tag: Tag,
	/// Embedder-defined content. Never inspected.
	pub payload: Rc<dyn Any>,
}

impl Element {
	#[must_use]
	pub fn new(tag: Tag, payload: impl 'static + Any) -> Self {
		Self {
			key: None,
			tag,
			payload: Rc::new(payload),
		}
	}

	/// Replaces this element's key.
	///
	/// Works both as a constructor step and as the re-keying primitive used when
	/// a mapped element is given its composed path key.
	#[must_use]
	pub fn with_key(mut self, key: impl Into<String>) -> Self {
		self.key = Some(key.into());
		self
	}
}

impl fmt::Debug for Element {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Element")
			.field("key", &self.key)
			.field("tag", &self.tag)
			.finish_non_exhaustive()
	}
}

impl PartialEq for Element {
	fn eq(&self, other: &Self) -> bool {
		self.key == other.key && self.tag == other.tag && Rc::ptr_eq(&self.payload, &other.payload)
	}
}

/// A pull-based child collection: enumerable, not indexable.
///
/// Implement this for lazily-produced sequences that should flatten like a
/// [`Node::List`] without being collected first. [`Node::lazy`] adapts a plain
/// iterator factory.
pub trait LazyNodes {
	/// A fresh pass over the collection's nodes.
	///
	/// Called once per traversal; child indexes are assigned by pull order.
	fn nodes(&self) -> Box<dyn Iterator<Item = Node> + '_>;

	/// Whether [`Self::nodes`] yields key-value entry pairs rather than plain
	/// nodes, as map-like collections do.
	///
	/// Such collections are still enumerated, but the first one encountered per
	/// process logs a warning: entry pairs rarely flatten the way their author
	/// expected.
	fn yields_entries(&self) -> bool {
		false
	}
}

/// One node of a child tree, as accepted by the [`children`](`crate::children`)
/// operations.
///
/// The set is deliberately loose: child trees are frequently assembled from
/// untyped sources (templates, scripting bindings, deserialized layouts), so
/// shape validation happens during traversal rather than at construction.
/// `Null`, `Text`, `Number`, `Element` and `Portal` are leaves; `List` and
/// `Lazy` are flattened recursively; `Record` and `Foreign` are never valid in
/// child position and fail traversal with [`TraverseError`].
///
/// `Node` is single-threaded by construction (payloads are [`Rc`]), so a tree
/// stays on the thread that builds it.
///
/// [`TraverseError`]: `crate::TraverseError`
#[derive(Clone)]
pub enum Node {
	/// Nothing to render. Still a countable leaf when nested, but a `Null`
	/// *root* is the empty input and is never traversed.
	Null,
	/// Booleans normalize to [`Node::Null`] during traversal, so conditional
	/// expressions like `and`-chains can be written without mapping their
	/// short-circuit value by hand.
	Bool(bool),
	Text(String),
	Number(f64),
	Element(Element),
	/// Content teleported to a host location chosen by the embedder. Portals
	/// traverse exactly like elements (the target lives in the opaque payload)
	/// but do not count as renderable elements for re-keying or
	/// [`children::only`](`crate::children::only`).
	Portal(Element),
	/// An ordered, indexable child sequence.
	List(Vec<Node>),
	/// A lazily-enumerable child collection. See [`LazyNodes`].
	Lazy(Rc<dyn LazyNodes>),
	/// A string-keyed record. Not renderable, since its child order would be
	/// arbitrary; traversal reports the field names as a structural error.
	Record(Vec<(String, Node)>),
	/// Any other host value, wrapped for diagnostics. Not renderable; traversal
	/// reports the captured type name as a structural error.
	Foreign {
		type_name: &'static str,
		value: Rc<dyn Any>,
	},
}

impl Node {
	/// Wraps an iterator factory as a [`Node::Lazy`] collection.
	#[must_use]
	pub fn lazy<F, I>(factory: F) -> Self
	where
		F: 'static + Fn() -> I,
		I: 'static + Iterator<Item = Node>,
	{
		struct FactoryNodes<F>(F);
		impl<F, I> LazyNodes for FactoryNodes<F>
		where
			F: Fn() -> I,
			I: 'static + Iterator<Item = Node>,
		{
			fn nodes(&self) -> Box<dyn Iterator<Item = Node> + '_> {
				Box::new((self.0)())
			}
		}

		Self::Lazy(Rc::new(FactoryNodes(factory)))
	}

	/// Wraps name-value pairs as a [`Node::Record`].
	#[must_use]
	pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Node)>) -> Self {
		Self::Record(
			fields
				.into_iter()
				.map(|(name, value)| (name.into(), value))
				.collect(),
		)
	}

	/// Wraps an arbitrary host value as a [`Node::Foreign`], capturing its type
	/// name for diagnostics.
	#[must_use]
	pub fn foreign<T: 'static + Any>(value: T) -> Self {
		Self::Foreign {
			type_name: type_name::<T>(),
			value: Rc::new(value),
		}
	}

	/// The node's explicit identity key, if it is an element or portal that
	/// carries one.
	#[must_use]
	pub fn key(&self) -> Option<&str> {
		match self {
			Self::Element(element) | Self::Portal(element) => element.key.as_deref(),
			_ => None,
		}
	}

	/// Whether `self` is a renderable element.
	///
	/// Only [`Node::Element`] qualifies; portals and primitives do not.
	#[must_use]
	pub fn is_element(&self) -> bool {
		matches!(self, Self::Element(_))
	}
}

impl Default for Node {
	fn default() -> Self {
		Self::Null
	}
}

impl From<Element> for Node {
	fn from(element: Element) -> Self {
		Self::Element(element)
	}
}

impl From<Vec<Node>> for Node {
	fn from(children: Vec<Node>) -> Self {
		Self::List(children)
	}
}

impl From<bool> for Node {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<f64> for Node {
	fn from(number: f64) -> Self {
		Self::Number(number)
	}
}

impl From<&str> for Node {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}

impl From<String> for Node {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl fmt::Debug for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => f.write_str("Null"),
			Self::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
			Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
			Self::Number(number) => f.debug_tuple("Number").field(number).finish(),
			Self::Element(element) => f.debug_tuple("Element").field(element).finish(),
			Self::Portal(element) => f.debug_tuple("Portal").field(element).finish(),
			Self::List(children) => f.debug_tuple("List").field(children).finish(),
			Self::Lazy(_) => f.write_str("Lazy(..)"),
			Self::Record(fields) => f.debug_tuple("Record").field(fields).finish(),
			Self::Foreign { type_name, .. } => f
				.debug_struct("Foreign")
				.field("type_name", type_name)
				.finish_non_exhaustive(),
		}
	}
}

impl PartialEq for Node {
	#[allow(clippy::float_cmp)] // `Number` compares exactly.
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Null, Self::Null) => true,
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Text(a), Self::Text(b)) => a == b,
			(Self::Number(a), Self::Number(b)) => a == b,
			(Self::Element(a), Self::Element(b)) | (Self::Portal(a), Self::Portal(b)) => a == b,
			(Self::List(a), Self::List(b)) => a == b,
			(Self::Lazy(a), Self::Lazy(b)) => Rc::ptr_eq(a, b),
			(Self::Record(a), Self::Record(b)) => a == b,
			(Self::Foreign { value: a, .. }, Self::Foreign { value: b, .. }) => Rc::ptr_eq(a, b),
			_ => false,
		}
	}
}
