use crate::Node;

/// Prefixed to every top-level key contribution, and therefore to every
/// flattened key.
pub const SEPARATOR: char = '.';
/// Joins the key contributions of nested collection levels.
pub const SUBSEPARATOR: char = ':';
/// Marks an escaped explicit key, so index-derived and explicit contributions
/// can never collide.
const ESCAPE_LEAD: char = '$';

/// Appends the escaped form of an explicit key: [`ESCAPE_LEAD`], then the key
/// with every character that could be mistaken for key structure replaced.
pub fn escape_into(key: &str, out: &mut String) {
	out.push(ESCAPE_LEAD);
	for c in key.chars() {
		match c {
			// '=' introduces the replacement pairs themselves.
			'=' => out.push_str("=0"),
			SUBSEPARATOR => out.push_str("=2"),
			c => out.push(c),
		}
	}
}

/// Appends `key` with one extra `'/'` after each maximal run of slashes, so a
/// composed prefix ending in the `'/'` delimiter stays unambiguous.
pub fn escape_embedded_into(key: &str, out: &mut String) {
	let mut in_run = false;
	for c in key.chars() {
		if c == '/' {
			in_run = true;
		} else if in_run {
			out.push('/');
			in_run = false;
		}
		out.push(c);
	}
	if in_run {
		out.push('/');
	}
}

/// Appends the key contribution of `child` at `index` within its containing
/// collection: the escaped explicit key if the child carries one, the base-36
/// rendering of `index` otherwise.
pub fn child_key_into(child: &Node, index: usize, out: &mut String) {
	match child.key() {
		Some(key) => escape_into(key, out),
		None => push_base36(index, out),
	}
}

/// Appends `value` in lowercase base 36.
pub fn push_base36(value: usize, out: &mut String) {
	const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

	// A 64-bit value never needs more than 13 base-36 digits.
	let mut buffer = [0_u8; 13];
	let mut cursor = buffer.len();
	let mut rest = value;
	loop {
		cursor -= 1;
		buffer[cursor] = DIGITS[rest % 36];
		rest /= 36;
		if rest == 0 {
			break;
		}
	}
	for &digit in &buffer[cursor..] {
		out.push(char::from(digit));
	}
}
