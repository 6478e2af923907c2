//! Operations over a single `children` value: counting, visiting, mapping into
//! a flat stably-keyed list, and the single-element assertion.
//!
//! All of them accept the whole [`Node`] range and share one flattening pass
//! (see the crate README for the key language), so their notions of order,
//! index and count always agree.
//!
//! The pass recurses per nesting level, so stack depth is bounded only by the
//! input's nesting.

use crate::{
	key::escape_embedded_into,
	state::TraverseState,
	traverse::{traverse_children, TraverseError},
	Element, Node,
};
use tracing::instrument;

/// Counts the leaves of `children`.
///
/// Every visited leaf counts, `Null` and booleans included; only a `Null`
/// *root* counts as zero. The count always matches the number of visits
/// [`for_each`] makes and the indexes [`map`] hands its transform.
///
/// # Errors
///
/// Fails with [`TraverseError::RecordChild`] or [`TraverseError::ForeignChild`]
/// if the tree contains a node that cannot be rendered.
#[instrument(skip(children))]
pub fn count(children: &Node) -> Result<usize, TraverseError> {
	traverse_children(children, &mut |_, _| Ok(()))
}

/// Calls `visit` once per leaf of `children` in flattening order, with the
/// normalized leaf and its running index.
///
/// # Errors
///
/// As for [`count`]. Leaves visited before the invalid node stay visited.
#[instrument(skip(children, visit))]
pub fn for_each(
	children: &Node,
	mut visit: impl FnMut(&Node, usize),
) -> Result<(), TraverseError> {
	let mut state = TraverseState::acquire();
	let outcome = traverse_children(children, &mut |child, _| {
		visit(child, state.count);
		state.count += 1;
		Ok(())
	});
	state.release();
	outcome.map(|_| ())
}

/// Builds the flattened child list of `children`, passing each leaf through
/// `transform`.
///
/// A `Null` root is passed through as `Ok(None)`. `Null` transform results are
/// dropped (booleans are kept); a returned [`Node::List`] is flattened in place
/// under the originating child's key; every returned element is re-keyed with
/// its composed path key, so the output stays stably keyed no matter how
/// `transform` reshapes the tree. Other results are appended untouched.
///
/// # Errors
///
/// Fails like [`count`] if `children` or a returned list contains an
/// unrenderable node; the partial output is discarded.
#[instrument(skip(children, transform))]
pub fn map(
	children: &Node,
	mut transform: impl FnMut(&Node, usize) -> Node,
) -> Result<Option<Vec<Node>>, TraverseError> {
	if let Node::Null = children {
		return Ok(None);
	}
	let mut result = Vec::new();
	map_into(children, &mut result, None, &mut transform)?;
	Ok(Some(result))
}

/// The flattened child list of `children`, re-keyed exactly like an identity
/// [`map`]. The empty input becomes an empty list.
///
/// # Errors
///
/// As for [`map`].
#[instrument(skip(children))]
pub fn to_vec(children: &Node) -> Result<Vec<Node>, TraverseError> {
	Ok(map(children, |child, _| child.clone())?.unwrap_or_default())
}

/// Verifies that `children` is exactly one renderable element and returns it.
///
/// Nothing is flattened: a list containing one element is not an element, and
/// neither is a portal.
///
/// # Errors
///
/// [`TraverseError::NotExactlyOneElement`] otherwise.
#[instrument(skip(children))]
pub fn only(children: &Node) -> Result<&Element, TraverseError> {
	match children {
		Node::Element(element) => Ok(element),
		_ => Err(TraverseError::NotExactlyOneElement),
	}
}

fn map_into(
	children: &Node,
	result: &mut Vec<Node>,
	prefix: Option<&str>,
	transform: &mut dyn FnMut(&Node, usize) -> Node,
) -> Result<(), TraverseError> {
	let mut state = TraverseState::acquire();
	if let Some(prefix) = prefix {
		escape_embedded_into(prefix, &mut state.key_prefix);
		state.key_prefix.push('/');
	}
	let outcome = traverse_children(children, &mut |child, name| {
		map_single(child, name, result, &mut state, transform)
	});
	state.release();
	outcome.map(|_| ())
}

fn map_single(
	child: &Node,
	name: &str,
	result: &mut Vec<Node>,
	state: &mut TraverseState,
	transform: &mut dyn FnMut(&Node, usize) -> Node,
) -> Result<(), TraverseError> {
	let index = state.count;
	state.count += 1;
	match transform(child, index) {
		// The empty result; not represented in the output.
		Node::Null => Ok(()),
		// A returned list is flattened right here, under this child's key.
		mapped @ Node::List(_) => {
			map_into(&mapped, result, Some(name), &mut |node: &Node, _| {
				node.clone()
			})
		}
		Node::Element(element) => {
			let mut key = String::with_capacity(state.key_prefix.len() + name.len());
			key.push_str(&state.key_prefix);
			if let Some(mapped_key) = element.key.as_deref().filter(|mapped| !mapped.is_empty()) {
				// A differing explicit key stays visible in the composed path.
				if child.key() != Some(mapped_key) {
					escape_embedded_into(mapped_key, &mut key);
					key.push('/');
				}
			}
			key.push_str(name);
			result.push(Node::Element(element.with_key(key)));
			Ok(())
		}
		mapped => {
			result.push(mapped);
			Ok(())
		}
	}
}
