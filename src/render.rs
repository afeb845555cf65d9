//! Graphviz and plain-text views of a [`RegexTree`] and a [`Dfa`].
//!
//! Only the public accessors of both types are used here.

use std::collections::BTreeSet;

use crate::dfa::Dfa;
use crate::regex_tree::Node;
use crate::regex_tree::NodeKind;
use crate::regex_tree::Position;
use crate::regex_tree::RegexTree;

/// Nodes are named `n0`, `n1`, ... in preorder.
pub fn tree_to_dot(tree: &RegexTree) -> String {
	let mut dot: String = String::from("digraph regex_tree {\nnode [shape=plaintext]\n");
	let mut next_id: usize = 0;
	write_tree_node(tree, tree.root(), &mut next_id, &mut dot);
	dot.push_str("}\n");
	dot
}

fn write_tree_node(tree: &RegexTree, node: &Node, next_id: &mut usize, dot: &mut String) -> usize {
	let id: usize = *next_id;
	*next_id += 1;

	dot.push_str(&format!(
		"\"n{id}\" [label = \"{}\"]\n",
		escape(&node_label(tree, node))
	));

	let children: Vec<&Node> = match node.kind() {
		NodeKind::Leaf(_) | NodeKind::End(_) => Vec::new(),
		NodeKind::Concat(left, right) | NodeKind::Union(left, right) => vec![&**left, &**right],
		NodeKind::Star(child) => vec![&**child],
	};
	for child in children {
		let child_id: usize = write_tree_node(tree, child, next_id, dot);
		dot.push_str(&format!("\"n{id}\" -> \"n{child_id}\"\n"));
	}

	id
}

pub fn dfa_to_dot(dfa: &Dfa) -> String {
	let mut dot: String = String::from("digraph dfa {\nrankdir=LR;\nempty [label = \"\" shape = plaintext];\n");

	dot.push_str("node [shape = doublecircle]");
	for state in dfa.accepting().iter() {
		dot.push_str(&format!(" s{state}"));
	}
	dot.push_str(";\n");

	dot.push_str(&format!(
		"node [shape = circle];\nempty -> s{} [label = \"start\"]\n",
		dfa.start()
	));
	for (from, symbol, to) in dfa.transitions() {
		dot.push_str(&format!(
			"s{from} -> s{to} [label = \"{}\"]\n",
			escape(&symbol.to_string())
		));
	}

	dot.push_str("}\n");
	dot
}

/// One line per leaf: its label, then the labels of its followpos (`#` for the end marker).
pub fn followpos_table(tree: &RegexTree) -> String {
	let mut table: String = String::new();
	for i in 0..tree.leaf_count() {
		let pos: Position = Position::new(i);
		let label: char = position_label(tree, pos);
		table.push_str(&format!("{label}: {}\n", position_labels(tree, tree.follow_pos(pos))));
	}
	table
}

/// `nullable`, `firstpos` and `lastpos` of every node, in preorder.
pub fn position_report(tree: &RegexTree) -> String {
	let mut report: String = String::new();
	let mut stack: Vec<&Node> = vec![tree.root()];
	while let Some(node) = stack.pop() {
		report.push_str(&format!(
			"{}: nullable {}, firstpos {{{}}}, lastpos {{{}}}\n",
			node_label(tree, node),
			node.nullable(),
			position_labels(tree, node.firstpos()),
			position_labels(tree, node.lastpos()),
		));
		match node.kind() {
			NodeKind::Leaf(_) | NodeKind::End(_) => (),
			NodeKind::Concat(left, right) | NodeKind::Union(left, right) => {
				stack.push(right);
				stack.push(left);
			},
			NodeKind::Star(child) => stack.push(child),
		}
	}
	report
}

/// The markdown fence the driver writes diagrams in.
pub fn markdown_dot(dot: &str) -> String {
	format!("``` dot\n{dot}```\n")
}

fn node_label(tree: &RegexTree, node: &Node) -> String {
	match node.kind() {
		NodeKind::Leaf(pos) | NodeKind::End(pos) => position_label(tree, *pos).to_string(),
		NodeKind::Concat(..) => "•".to_owned(),
		NodeKind::Union(..) => "|".to_owned(),
		NodeKind::Star(_) => "*".to_owned(),
	}
}

fn position_label(tree: &RegexTree, pos: Position) -> char {
	tree.label(pos).unwrap_or('#')
}

fn position_labels(tree: &RegexTree, positions: &BTreeSet<Position>) -> String {
	positions
		.iter()
		.map(|&pos| position_label(tree, pos).to_string())
		.collect::<Vec<_>>()
		.join(", ")
}

fn escape(label: &str) -> String {
	label.replace('\\', "\\\\").replace('"', "\\\"")
}
