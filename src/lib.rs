#![doc(html_root_url = "https://docs.rs/frond/0.0.1")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod children;

mod key;
mod node;
mod state;
mod traverse;

pub use node::{Element, LazyNodes, Node, Tag};
pub use traverse::TraverseError;
