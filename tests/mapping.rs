use frond::{children, Element, Node, Tag};

#[test]
fn empty_input_passes_through() {
	assert_eq!(children::map(&Node::Null, |_, _| unreachable!()).unwrap(), None);
	assert_eq!(children::to_vec(&Node::Null).unwrap(), vec![]);
}

#[test]
fn null_results_vanish_but_boolean_results_stay() {
	let tree = Node::List(vec![element(0), element(1), element(2)]);
	let mapped = children::map(&tree, |_, index| match index {
		0 => Node::Null,
		1 => Node::Bool(false),
		_ => Node::from("kept"),
	})
	.unwrap()
	.unwrap();
	assert_eq!(mapped, vec![Node::Bool(false), Node::from("kept")]);
}

#[test]
fn lists_fan_out_in_place() {
	let tree = Node::List(vec![element(0), element(1)]);
	let doubled = children::map(&tree, |child, _| {
		Node::List(vec![child.clone(), child.clone()])
	})
	.unwrap()
	.unwrap();

	let tags = doubled
		.iter()
		.map(|node| match node {
			Node::Element(element) => element.tag,
			_ => unreachable!(),
		})
		.collect::<Vec<_>>();
	assert_eq!(tags, [Tag(0), Tag(0), Tag(1), Tag(1)]);

	let keys = doubled.iter().map(Node::key).collect::<Vec<_>>();
	assert_eq!(
		keys,
		[Some(".0/.0"), Some(".0/.1"), Some(".1/.0"), Some(".1/.1")]
	);
}

#[test]
fn fanned_out_lists_flatten_deeply() {
	let tree = Node::List(vec![element(0)]);
	let mapped = children::map(&tree, |_, _| {
		Node::List(vec![Node::from("note"), Node::List(vec![element(9)])])
	})
	.unwrap()
	.unwrap();
	assert_eq!(mapped.len(), 2);
	assert_eq!(mapped[0], Node::from("note"));
	assert_eq!(mapped[1].key(), Some(".0/.1:0"));
}

#[test]
fn matching_keys_are_not_repeated() {
	let keyed = Element::new(Tag(0), ()).with_key("same");
	let tree = Node::List(vec![Node::Element(keyed.clone())]);
	let mapped = children::map(&tree, move |_, _| Node::Element(keyed.clone()))
		.unwrap()
		.unwrap();
	assert_eq!(mapped[0].key(), Some(".$same"));
}

#[test]
fn changed_keys_compose_with_the_path() {
	let tree = Node::List(vec![element(0)]);
	let mapped = children::map(&tree, |_, _| {
		Node::Element(Element::new(Tag(1), ()).with_key("new/key"))
	})
	.unwrap()
	.unwrap();
	assert_eq!(mapped[0].key(), Some("new//key/.0"));
}

#[test]
fn visit_indexes_span_the_whole_pass() {
	let tree = Node::List(vec![
		element(0),
		Node::List(vec![Node::Null, element(1)]),
		Node::lazy(|| core::iter::once(Node::from("tail"))),
	]);
	let mut indexes = Vec::new();
	children::map(&tree, |_, index| {
		indexes.push(index);
		Node::Null
	})
	.unwrap();
	assert_eq!(indexes, [0, 1, 2, 3]);
}

#[test]
fn errors_surface_from_fanned_out_lists() {
	let tree = Node::List(vec![element(0)]);
	let result = children::map(&tree, |_, _| {
		Node::List(vec![Node::record(vec![("hidden", Node::from("value"))])])
	});
	assert!(result.is_err());
}

fn element(tag: u32) -> Node {
	Node::Element(Element::new(Tag(tag), ()))
}
