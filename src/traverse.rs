use crate::{
	key::{child_key_into, SEPARATOR, SUBSEPARATOR},
	Node,
};
use core::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{instrument, level_filters::STATIC_MAX_LEVEL, warn, Level};

/// Structural failure while flattening a child tree.
///
/// Collections containing an invalid node fail as a whole; whatever the
/// operation visited before the invalid node is discarded by the caller.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum TraverseError {
	/// A string-keyed record was found in child position. Records have no
	/// defined child order, so they are rejected rather than enumerated; the
	/// field names are reported to make the offending value recognizable.
	#[error(
		"record with fields {{{}}} is not a valid child; render an ordered collection instead",
		fields.join(", ")
	)]
	RecordChild { fields: Vec<String> },

	/// A host value of a type this crate does not know how to flatten was found
	/// in child position.
	#[error("host value of type {type_name} is not a valid child")]
	ForeignChild { type_name: &'static str },

	/// [`children::only`](`crate::children::only`) was called on something other
	/// than a single renderable element.
	#[error("expected exactly one renderable element child")]
	NotExactlyOneElement,
}

/// Leaf visitor for [`traverse_children`]: receives the normalized leaf and its
/// composed key.
pub type Visit<'a> = dyn 'a + FnMut(&Node, &str) -> Result<(), TraverseError>;

static ENTRY_COLLECTION_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_entry_collection() {
	if STATIC_MAX_LEVEL >= Level::WARN && !ENTRY_COLLECTION_WARNED.swap(true, Ordering::Relaxed) {
		warn!(
			"Flattening an entry-yielding collection.\n\
			Its key-value pairs are enumerated as children, which is rarely intended; flatten the values instead."
		)
	}
}

/// Walks `root` depth-first, calling `visit` once per leaf with the leaf's
/// composed key, and returns the number of leaves visited.
///
/// A `Null` root is the empty input: nothing is visited and the count is 0.
/// Everywhere below the root, `Null` is an ordinary leaf and booleans are
/// visited as [`Node::Null`]. A lone leaf root is keyed like the sole entry of
/// a list, so wrapping it in one does not move it.
///
/// Keys are composed into a single buffer that lives for the whole pass;
/// `visit` gets a borrow of its current state.
#[instrument(skip(root, visit))]
pub fn traverse_children(root: &Node, visit: &mut Visit<'_>) -> Result<usize, TraverseError> {
	if let Node::Null = root {
		return Ok(0);
	}
	let mut name = String::new();
	traverse_impl(root, &mut name, visit)
}

fn traverse_impl(
	node: &Node,
	name: &mut String,
	visit: &mut Visit<'_>,
) -> Result<usize, TraverseError> {
	/// Extends `name` into this collection's child key prefix and returns the
	/// length to truncate back to between children.
	fn extend_prefix(name: &mut String) -> usize {
		name.push(if name.is_empty() {
			SEPARATOR
		} else {
			SUBSEPARATOR
		});
		name.len()
	}

	match node {
		Node::List(children) => {
			let prefix_len = extend_prefix(name);
			let mut visited = 0;
			for (index, child) in children.iter().enumerate() {
				name.truncate(prefix_len);
				child_key_into(child, index, name);
				visited += traverse_impl(child, name, visit)?;
			}
			Ok(visited)
		}
		Node::Lazy(collection) => {
			if collection.yields_entries() {
				warn_entry_collection();
			}
			let prefix_len = extend_prefix(name);
			let mut visited = 0;
			for (index, child) in collection.nodes().enumerate() {
				name.truncate(prefix_len);
				child_key_into(&child, index, name);
				visited += traverse_impl(&child, name, visit)?;
			}
			Ok(visited)
		}
		Node::Record(fields) => Err(TraverseError::RecordChild {
			fields: fields.iter().map(|(field, _)| field.clone()).collect(),
		}),
		Node::Foreign { type_name, .. } => Err(TraverseError::ForeignChild {
			type_name: *type_name,
		}),
		Node::Null
		| Node::Bool(_)
		| Node::Text(_)
		| Node::Number(_)
		| Node::Element(_)
		| Node::Portal(_) => {
			if name.is_empty() {
				// A lone leaf keys like the sole entry of a list.
				name.push(SEPARATOR);
				child_key_into(node, 0, name);
			}
			if let Node::Bool(_) = node {
				// Booleans render like nothing, so visitors see them as `Null`.
				let null = Node::Null;
				visit(&null, name)?
			} else {
				visit(node, name)?
			}
			Ok(1)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Element, Tag};

	fn leaf(text: &str) -> Node {
		Node::Text(text.to_owned())
	}

	fn visited(root: &Node) -> Result<(Vec<(Node, String)>, usize), TraverseError> {
		let mut log = Vec::new();
		let count = traverse_children(root, &mut |child, name| {
			log.push((child.clone(), name.to_owned()));
			Ok(())
		})?;
		Ok((log, count))
	}

	fn names(root: &Node) -> Vec<String> {
		let (log, count) = visited(root).unwrap();
		assert_eq!(count, log.len());
		log.into_iter().map(|(_, name)| name).collect()
	}

	#[test]
	fn null_root_is_empty_input() {
		let (log, count) = visited(&Node::Null).unwrap();
		assert_eq!(count, 0);
		assert!(log.is_empty());
	}

	#[test]
	fn lone_leaves_key_like_single_entries() {
		assert_eq!(names(&leaf("a")), [".0"]);
		assert_eq!(names(&Node::List(vec![leaf("a")])), [".0"]);
		assert_eq!(
			names(&Node::Element(Element::new(Tag(0), ()).with_key("k"))),
			[".$k"]
		);
	}

	#[test]
	fn nested_collections_compose_names() {
		let root = Node::List(vec![
			leaf("a"),
			Node::List(vec![leaf("b"), Node::List(vec![leaf("c")])]),
			leaf("d"),
		]);
		assert_eq!(names(&root), [".0", ".1:0", ".1:1:0", ".2"]);
	}

	#[test]
	fn explicit_keys_are_escaped_into_names() {
		let root = Node::List(vec![
			Node::Element(Element::new(Tag(0), ()).with_key("a:b=c")),
			Node::List(vec![Node::Element(Element::new(Tag(0), ()).with_key("x"))]),
		]);
		assert_eq!(names(&root), [".$a=2b=0c", ".1:$x"]);
	}

	#[test]
	fn booleans_are_visited_as_null() {
		let (log, count) = visited(&Node::List(vec![Node::Bool(true), leaf("a")])).unwrap();
		assert_eq!(count, 2);
		assert_eq!(log[0], (Node::Null, ".0".to_owned()));
		assert_eq!(log[1], (leaf("a"), ".1".to_owned()));
	}

	#[test]
	fn nested_nulls_are_visited() {
		let (log, count) = visited(&Node::List(vec![leaf("a"), Node::Null, leaf("b")])).unwrap();
		assert_eq!(count, 3);
		assert_eq!(log[1].0, Node::Null);
	}

	#[test]
	fn lazy_collections_flatten_like_lists() {
		let root = Node::List(vec![
			leaf("a"),
			Node::lazy(|| (0..2).map(|i| Node::Number(f64::from(i)))),
		]);
		assert_eq!(names(&root), [".0", ".1:0", ".1:1"]);
	}

	#[test]
	fn entry_collections_are_still_enumerated() {
		struct Entries;
		impl crate::LazyNodes for Entries {
			fn nodes(&self) -> Box<dyn Iterator<Item = Node> + '_> {
				Box::new(
					vec![
						Node::List(vec![leaf("k0"), leaf("v0")]),
						Node::List(vec![leaf("k1"), leaf("v1")]),
					]
					.into_iter(),
				)
			}
			fn yields_entries(&self) -> bool {
				true
			}
		}

		let root = Node::Lazy(std::rc::Rc::new(Entries));
		assert_eq!(names(&root), [".0:0", ".0:1", ".1:0", ".1:1"]);
		// Once more; the warning fires at most once per process.
		assert_eq!(names(&root).len(), 4);
	}

	#[test]
	fn records_fail_with_field_names() {
		let root = Node::List(vec![
			leaf("a"),
			Node::record(vec![("x", leaf("1")), ("y", leaf("2"))]),
		]);
		let error = visited(&root).unwrap_err();
		assert_eq!(
			error,
			TraverseError::RecordChild {
				fields: vec!["x".to_owned(), "y".to_owned()]
			}
		);
		assert!(error.to_string().contains("{x, y}"));
	}

	#[test]
	fn foreign_values_fail_with_type_name() {
		let error = visited(&Node::foreign(3_usize)).unwrap_err();
		assert_eq!(error, TraverseError::ForeignChild { type_name: "usize" });
		assert!(error.to_string().contains("usize"));
	}

	#[test]
	fn errors_interrupt_enumeration() {
		let mut seen = 0;
		let root = Node::List(vec![leaf("a"), Node::foreign(()), leaf("b")]);
		let result = traverse_children(&root, &mut |_, _| {
			seen += 1;
			Ok(())
		});
		assert!(result.is_err());
		assert_eq!(seen, 1);
	}
}
