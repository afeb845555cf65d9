use std::collections::BTreeSet;
use std::ops::Range;

use nom::IResult;
use nom::Parser;

use crate::options::DanglingStar;
use crate::options::TreeOptions;

/// Returned by reference for out-of-range followpos queries.
static NO_POSITIONS: BTreeSet<Position> = BTreeSet::new();

/// Index of a leaf in the order it was created during parsing.
/// One extra position, equal to the number of leaves, marks the end of the pattern.
#[derive(Debug, Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Position(usize);

/// Augmented syntax tree of a pattern, with `nullable`/`firstpos`/`lastpos` on every node
/// and `followpos` on every leaf.
#[derive(Debug, Clone)]
pub struct RegexTree {
	pattern: String,
	root: Node,
	/// Indexed by [`Position`]; the tree nodes only hold positions.
	leaves: Vec<Leaf>,
	alphabet: BTreeSet<char>,
}

#[derive(Debug, Clone)]
pub struct Node {
	kind: NodeKind,
	nullable: bool,
	firstpos: BTreeSet<Position>,
	lastpos: BTreeSet<Position>,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
	Leaf(Position),
	/// The `#` marker concatenated after the whole pattern.
	End(Position),
	Concat(Box<Node>, Box<Node>),
	Union(Box<Node>, Box<Node>),
	Star(Box<Node>),
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ParseError {
	#[error("unmatched '(' at offset {offset}")]
	UnmatchedOpen { offset: usize },
	#[error("unmatched ')' at offset {offset}")]
	UnmatchedClose { offset: usize },
	#[error("empty subexpression at offset {offset}")]
	EmptyExpression { offset: usize },
}

/// Everything the DFA construction needs from a syntax tree.
pub trait PositionQuery {
	/// Distinct leaf labels, in ascending order.
	fn alphabet(&self) -> &BTreeSet<char>;

	fn first_pos_root(&self) -> &BTreeSet<Position>;

	/// Empty for the end position and for positions past it.
	fn follow_pos(&self, pos: Position) -> &BTreeSet<Position>;

	/// False for the end position and for positions past it.
	fn char_at_pos(&self, ch: char, pos: Position) -> bool;

	fn end_pos(&self) -> Position;
}

#[derive(Debug, Clone)]
struct Leaf {
	label: char,
	followpos: BTreeSet<Position>,
}

struct TreeBuilder<'a> {
	pattern: &'a str,
	options: &'a TreeOptions,
	leaves: Vec<Leaf>,
}

impl Position {
	pub const fn new(idx: usize) -> Self {
		Self(idx)
	}

	pub const fn get(self) -> usize {
		self.0
	}
}

impl std::fmt::Display for Position {
	fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(fmt, "{}", self.0)
	}
}

impl RegexTree {
	pub fn new(pattern: &str) -> Result<Self, ParseError> {
		Self::with_options(pattern, &TreeOptions::default())
	}

	pub fn with_options(pattern: &str, options: &TreeOptions) -> Result<Self, ParseError> {
		check_parentheses(pattern)?;

		let mut builder: TreeBuilder<'_> = TreeBuilder {
			pattern,
			options,
			leaves: Vec::new(),
		};

		// The empty pattern only matches the empty string: the end marker alone.
		let root: Node = if pattern.is_empty() {
			Node::end(Position(0))
		} else {
			let body: Node = builder.build(0..pattern.len(), false)?;
			let end: Node = Node::end(Position(builder.leaves.len()));
			Node::concat(body, end)
		};

		let mut leaves: Vec<Leaf> = builder.leaves;
		calc_followpos(&root, &mut leaves);

		let mut alphabet: BTreeSet<char> = BTreeSet::new();
		collect_alphabet(&root, &leaves, &mut alphabet);

		debug!(
			"built tree for {pattern:?}: {} leaves, alphabet {alphabet:?}, firstpos(root) {:?}",
			leaves.len(),
			root.firstpos
		);

		Ok(Self {
			pattern: pattern.to_owned(),
			root,
			leaves,
			alphabet,
		})
	}

	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	pub fn root(&self) -> &Node {
		&self.root
	}

	pub fn alphabet(&self) -> &BTreeSet<char> {
		&self.alphabet
	}

	pub fn first_pos_root(&self) -> &BTreeSet<Position> {
		&self.root.firstpos
	}

	pub fn follow_pos(&self, pos: Position) -> &BTreeSet<Position> {
		self.leaves.get(pos.0).map_or(&NO_POSITIONS, |leaf| &leaf.followpos)
	}

	pub fn char_at_pos(&self, ch: char, pos: Position) -> bool {
		self.label(pos) == Some(ch)
	}

	pub fn label(&self, pos: Position) -> Option<char> {
		self.leaves.get(pos.0).map(|leaf| leaf.label)
	}

	/// Equal to the number of leaves.
	pub fn end_pos(&self) -> Position {
		Position(self.leaves.len())
	}

	pub fn leaf_count(&self) -> usize {
		self.leaves.len()
	}
}

impl PositionQuery for RegexTree {
	fn alphabet(&self) -> &BTreeSet<char> {
		RegexTree::alphabet(self)
	}

	fn first_pos_root(&self) -> &BTreeSet<Position> {
		RegexTree::first_pos_root(self)
	}

	fn follow_pos(&self, pos: Position) -> &BTreeSet<Position> {
		RegexTree::follow_pos(self, pos)
	}

	fn char_at_pos(&self, ch: char, pos: Position) -> bool {
		RegexTree::char_at_pos(self, ch, pos)
	}

	fn end_pos(&self) -> Position {
		RegexTree::end_pos(self)
	}
}

impl Node {
	fn leaf(position: Position) -> Self {
		Self {
			kind: NodeKind::Leaf(position),
			nullable: false,
			firstpos: BTreeSet::from([position]),
			lastpos: BTreeSet::from([position]),
		}
	}

	fn end(position: Position) -> Self {
		Self {
			kind: NodeKind::End(position),
			nullable: false,
			firstpos: BTreeSet::from([position]),
			lastpos: BTreeSet::from([position]),
		}
	}

	fn concat(left: Node, right: Node) -> Self {
		let mut firstpos: BTreeSet<Position> = left.firstpos.clone();
		if left.nullable {
			firstpos.extend(right.firstpos.iter().copied());
		}

		let mut lastpos: BTreeSet<Position> = right.lastpos.clone();
		if right.nullable {
			lastpos.extend(left.lastpos.iter().copied());
		}

		Self {
			nullable: left.nullable && right.nullable,
			firstpos,
			lastpos,
			kind: NodeKind::Concat(Box::new(left), Box::new(right)),
		}
	}

	fn union(left: Node, right: Node) -> Self {
		Self {
			nullable: left.nullable || right.nullable,
			firstpos: left.firstpos.union(&right.firstpos).copied().collect::<BTreeSet<_>>(),
			lastpos: left.lastpos.union(&right.lastpos).copied().collect::<BTreeSet<_>>(),
			kind: NodeKind::Union(Box::new(left), Box::new(right)),
		}
	}

	fn star(child: Node) -> Self {
		Self {
			nullable: true,
			firstpos: child.firstpos.clone(),
			lastpos: child.lastpos.clone(),
			kind: NodeKind::Star(Box::new(child)),
		}
	}

	fn maybe_star(self, star: bool) -> Self {
		if star { Self::star(self) } else { self }
	}

	pub fn kind(&self) -> &NodeKind {
		&self.kind
	}

	pub fn nullable(&self) -> bool {
		self.nullable
	}

	pub fn firstpos(&self) -> &BTreeSet<Position> {
		&self.firstpos
	}

	pub fn lastpos(&self) -> &BTreeSet<Position> {
		&self.lastpos
	}
}

/// Frees the tree with an explicit stack; the default drop glue recurses once per level.
impl Drop for Node {
	fn drop(&mut self) {
		let mut stack: Vec<Box<Node>> = Vec::new();
		self.take_children(&mut stack);
		while let Some(mut node) = stack.pop() {
			node.take_children(&mut stack);
		}
	}
}

impl Node {
	fn take_children(&mut self, stack: &mut Vec<Box<Node>>) {
		match std::mem::replace(&mut self.kind, NodeKind::End(Position(0))) {
			NodeKind::Leaf(_) | NodeKind::End(_) => (),
			NodeKind::Concat(left, right) | NodeKind::Union(left, right) => {
				stack.push(left);
				stack.push(right);
			},
			NodeKind::Star(child) => stack.push(child),
		}
	}
}

impl<'a> TreeBuilder<'a> {
	/// `range` is a byte range of the full pattern; `star` is set when the caller
	/// stripped a trailing `*` that applies to the last unit of `range`.
	///
	/// Recursion only goes one level per parenthesized group: alternatives and
	/// runs of concatenated units are collected in loops.
	fn build(&mut self, range: Range<usize>, star: bool) -> Result<Node, ParseError> {
		let pattern: &'a str = self.pattern;
		let regex: &'a str = &pattern[range.clone()];

		if regex.is_empty() {
			return Err(ParseError::EmptyExpression { offset: range.start });
		}

		if let Ok((_, label)) = parse_single_symbol(regex) {
			let leaf: Node = self.new_leaf(label);
			return Ok(self.dangling_star(leaf, star));
		}

		let splits: Vec<usize> = top_level_alternatives(regex);
		if splits.is_empty() {
			return self.build_sequence(range, star);
		}

		let mut alternatives: Vec<Node> = Vec::with_capacity(splits.len());
		let mut start: usize = range.start;
		for split in splits {
			alternatives.push(self.build(start..range.start + split, false)?);
			start = range.start + split + 1;
		}
		// Right-associative: `a|b|c` is `a|(b|c)`.
		let mut node: Node = self.build(start..range.end, false)?;
		for alternative in alternatives.into_iter().rev() {
			node = Node::union(alternative, node);
		}
		Ok(self.dangling_star(node, star))
	}

	/// `range` has no top-level `|`. Trailing units (a symbol or a parenthesized
	/// group, each with its own star) are peeled off from the right until one is
	/// left; the units are then built left to right, so leaves are still created
	/// in pattern order, and folded into a left-deep chain of concatenations.
	fn build_sequence(&mut self, range: Range<usize>, mut star: bool) -> Result<Node, ParseError> {
		let pattern: &'a str = self.pattern;
		let mut units: Vec<(Range<usize>, bool)> = Vec::new();
		let mut end: usize = range.end;

		let mut node: Node = loop {
			let regex: &'a str = &pattern[range.start..end];
			if let Ok((_, label)) = parse_single_symbol(regex) {
				let leaf: Node = self.new_leaf(label);
				break self.dangling_star(leaf, star);
			}

			let Some((last_idx, last)) = regex.char_indices().next_back() else {
				return Err(ParseError::EmptyExpression { offset: range.start });
			};
			let escaped: bool = is_escaped(regex, last_idx);

			match last {
				'*' if !escaped => {
					star = true;
					end = range.start + last_idx;
				},
				')' if !escaped => {
					let open: usize = matching_open(regex, last_idx).ok_or(ParseError::UnmatchedClose {
						offset: range.start + last_idx,
					})?;
					if open == 0 {
						let inner: Node = self.build(range.start + 1..end - 1, false)?;
						break inner.maybe_star(star);
					}
					units.push((range.start + open..end, star));
					star = false;
					end = range.start + open;
				},
				_ => {
					// An escaped unit is two characters; the backslash is a single byte.
					let unit_start: usize = if escaped { last_idx - 1 } else { last_idx };
					units.push((range.start + unit_start..end, star));
					star = false;
					end = range.start + unit_start;
				},
			}
		};

		for (unit, star) in units.into_iter().rev() {
			let unit: Node = self.build(unit, false)?;
			node = Node::concat(node, unit.maybe_star(star));
		}
		Ok(node)
	}

	fn new_leaf(&mut self, label: char) -> Node {
		let position: Position = Position(self.leaves.len());
		debug!("leaf {position} = {label:?}");
		self.leaves.push(Leaf {
			label,
			followpos: BTreeSet::new(),
		});
		Node::leaf(position)
	}

	fn dangling_star(&self, node: Node, star: bool) -> Node {
		match self.options.dangling_star {
			DanglingStar::Wrap => node.maybe_star(star),
			DanglingStar::Drop => {
				if star {
					debug!("dropping trailing star on {:?}", node.firstpos);
				}
				node
			},
		}
	}
}

/// Matches exactly one symbol: a plain character or a backslash followed by any character.
fn parse_single_symbol(input: &str) -> IResult<&str, char> {
	use nom::branch::alt;
	use nom::character::complete::anychar;
	use nom::character::complete::char;
	use nom::combinator::all_consuming;
	use nom::sequence::preceded;

	all_consuming(alt((preceded(char('\\'), anychar), anychar))).parse(input)
}

/// Byte offsets of every `|` outside parentheses.
fn top_level_alternatives(regex: &str) -> Vec<usize> {
	let mut splits: Vec<usize> = Vec::new();
	let mut depth: usize = 0;
	let mut chars = regex.char_indices();
	while let Some((i, ch)) = chars.next() {
		match ch {
			'\\' => {
				chars.next();
			},
			'(' => depth += 1,
			')' => depth = depth.saturating_sub(1),
			'|' if depth == 0 => splits.push(i),
			_ => (),
		}
	}
	splits
}

/// Byte offset of the `(` matching the `)` at `close`, or `None` if the scan
/// reaches the start of `regex` without closing.
fn matching_open(regex: &str, close: usize) -> Option<usize> {
	let mut depth: usize = 1;
	for (i, ch) in regex[..close].char_indices().rev() {
		if is_escaped(regex, i) {
			continue;
		}
		match ch {
			')' => depth += 1,
			'(' => {
				depth -= 1;
				if depth == 0 {
					return Some(i);
				}
			},
			_ => (),
		}
	}
	None
}

/// A character is escaped iff it is preceded by an odd run of backslashes.
fn is_escaped(regex: &str, idx: usize) -> bool {
	regex.as_bytes()[..idx].iter().rev().take_while(|&&b| b == b'\\').count() % 2 == 1
}

fn check_parentheses(pattern: &str) -> Result<(), ParseError> {
	let mut open: Vec<usize> = Vec::new();
	let mut chars = pattern.char_indices();
	while let Some((i, ch)) = chars.next() {
		match ch {
			'\\' => {
				chars.next();
			},
			'(' => open.push(i),
			')' => {
				if open.pop().is_none() {
					return Err(ParseError::UnmatchedClose { offset: i });
				}
			},
			_ => (),
		}
	}
	match open.pop() {
		Some(offset) => Err(ParseError::UnmatchedOpen { offset }),
		None => Ok(()),
	}
}

/// Needs the finished tree: a node's followpos contributions come from its
/// siblings' `firstpos`, which is not known while the node itself is being built.
fn calc_followpos(root: &Node, leaves: &mut [Leaf]) {
	let mut stack: Vec<&Node> = vec![root];
	while let Some(node) = stack.pop() {
		match &node.kind {
			NodeKind::Leaf(_) | NodeKind::End(_) => (),
			NodeKind::Union(left, right) => {
				stack.push(right);
				stack.push(left);
			},
			NodeKind::Concat(left, right) => {
				for pos in left.lastpos.iter() {
					if let Some(leaf) = leaves.get_mut(pos.0) {
						leaf.followpos.extend(right.firstpos.iter().copied());
					}
				}
				stack.push(right);
				stack.push(left);
			},
			NodeKind::Star(child) => {
				for pos in child.lastpos.iter() {
					if let Some(leaf) = leaves.get_mut(pos.0) {
						leaf.followpos.extend(child.firstpos.iter().copied());
					}
				}
				stack.push(child);
			},
		}
	}
}

fn collect_alphabet(root: &Node, leaves: &[Leaf], alphabet: &mut BTreeSet<char>) {
	let mut stack: Vec<&Node> = vec![root];
	while let Some(node) = stack.pop() {
		match &node.kind {
			NodeKind::Leaf(pos) => {
				alphabet.insert(leaves[pos.0].label);
			},
			NodeKind::End(_) => (),
			NodeKind::Concat(left, right) | NodeKind::Union(left, right) => {
				stack.push(right);
				stack.push(left);
			},
			NodeKind::Star(child) => stack.push(child),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn positions(indices: &[usize]) -> BTreeSet<Position> {
		indices.iter().map(|&i| Position(i)).collect::<BTreeSet<_>>()
	}

	fn visit<F>(node: &Node, f: &mut F)
	where
		F: FnMut(&Node),
	{
		f(node);
		match node.kind() {
			NodeKind::Leaf(_) | NodeKind::End(_) => (),
			NodeKind::Concat(left, right) | NodeKind::Union(left, right) => {
				visit(left, f);
				visit(right, f);
			},
			NodeKind::Star(child) => visit(child, f),
		}
	}

	#[test]
	fn single_symbol() {
		let tree: RegexTree = RegexTree::new("a").unwrap();

		let NodeKind::Concat(left, right) = tree.root().kind() else {
			panic!("root should be a concatenation, got {:?}", tree.root());
		};
		assert!(matches!(left.kind(), NodeKind::Leaf(Position(0))));
		assert!(matches!(right.kind(), NodeKind::End(Position(1))));

		assert_eq!(tree.leaf_count(), 1);
		assert_eq!(tree.end_pos(), Position(1));
		assert_eq!(tree.alphabet(), &BTreeSet::from(['a']));
		assert_eq!(tree.first_pos_root(), &positions(&[0]));
		assert_eq!(tree.follow_pos(Position(0)), &positions(&[1]));
		assert!(tree.char_at_pos('a', Position(0)));
		assert!(!tree.char_at_pos('b', Position(0)));
	}

	#[test]
	fn alternation_concatenation_star() {
		let tree: RegexTree = RegexTree::new("(a|b)cd*").unwrap();

		assert_eq!(tree.alphabet(), &BTreeSet::from(['a', 'b', 'c', 'd']));
		assert_eq!(tree.end_pos(), Position(4));
		for (i, ch) in "abcd".chars().enumerate() {
			assert_eq!(tree.label(Position(i)), Some(ch));
		}

		assert_eq!(tree.first_pos_root(), &positions(&[0, 1]));
		assert_eq!(tree.follow_pos(Position(0)), &positions(&[2]));
		assert_eq!(tree.follow_pos(Position(1)), &positions(&[2]));
		assert_eq!(tree.follow_pos(Position(2)), &positions(&[3, 4]));
		assert_eq!(tree.follow_pos(Position(3)), &positions(&[3, 4]));
		assert!(tree.follow_pos(Position(4)).is_empty());
		assert!(!tree.root().nullable());
	}

	#[test]
	fn leaves_hold_only_their_own_position() {
		let tree: RegexTree = RegexTree::new("x(ab|c*)*y").unwrap();
		let mut leaves: usize = 0;
		visit(tree.root(), &mut |node: &Node| {
			if let NodeKind::Leaf(pos) | NodeKind::End(pos) = node.kind() {
				leaves += 1;
				assert!(!node.nullable());
				assert_eq!(node.firstpos(), &BTreeSet::from([*pos]));
				assert_eq!(node.lastpos(), &BTreeSet::from([*pos]));
			}
		});
		assert_eq!(leaves, tree.leaf_count() + 1);
	}

	#[test]
	fn star_and_concat_laws() {
		let tree: RegexTree = RegexTree::new("ab(c|d)*e(fg)*").unwrap();
		visit(tree.root(), &mut |node: &Node| match node.kind() {
			NodeKind::Star(child) => {
				assert!(node.nullable());
				assert_eq!(node.firstpos(), child.firstpos());
				assert_eq!(node.lastpos(), child.lastpos());
			},
			NodeKind::Concat(left, right) => {
				assert_eq!(node.nullable(), left.nullable() && right.nullable());
				if !left.nullable() && !right.nullable() {
					assert_eq!(node.firstpos(), left.firstpos());
					assert_eq!(node.lastpos(), right.lastpos());
				}
			},
			NodeKind::Union(left, right) => {
				assert_eq!(node.nullable(), left.nullable() || right.nullable());
			},
			NodeKind::Leaf(_) | NodeKind::End(_) => (),
		});
	}

	#[test]
	fn followpos_pass_is_idempotent() {
		let tree: RegexTree = RegexTree::new("(a|b)*abb").unwrap();
		let mut leaves: Vec<Leaf> = tree.leaves.clone();
		calc_followpos(tree.root(), &mut leaves);
		for (before, after) in std::iter::zip(tree.leaves.iter(), leaves.iter()) {
			assert_eq!(before.followpos, after.followpos);
		}

		// Classic textbook example.
		assert_eq!(tree.follow_pos(Position(0)), &positions(&[0, 1, 2]));
		assert_eq!(tree.follow_pos(Position(1)), &positions(&[0, 1, 2]));
		assert_eq!(tree.follow_pos(Position(2)), &positions(&[3]));
		assert_eq!(tree.follow_pos(Position(3)), &positions(&[4]));
		assert_eq!(tree.follow_pos(Position(4)), &positions(&[5]));
	}

	#[test]
	fn out_of_range_queries() {
		let tree: RegexTree = RegexTree::new("ab").unwrap();
		assert!(tree.follow_pos(tree.end_pos()).is_empty());
		assert!(tree.follow_pos(Position(99)).is_empty());
		assert!(!tree.char_at_pos('a', Position(99)));
		assert_eq!(tree.label(Position(2)), None);
	}

	#[test]
	fn escapes() {
		{
			let tree: RegexTree = RegexTree::new(r"a\*").unwrap();
			assert_eq!(tree.alphabet(), &BTreeSet::from(['a', '*']));
			assert_eq!(tree.leaf_count(), 2);
			assert!(!tree.root().nullable());
		}
		{
			let tree: RegexTree = RegexTree::new(r"\(\)").unwrap();
			assert_eq!(tree.label(Position(0)), Some('('));
			assert_eq!(tree.label(Position(1)), Some(')'));
		}
		{
			let tree: RegexTree = RegexTree::new(r"a\|b").unwrap();
			assert_eq!(tree.alphabet(), &BTreeSet::from(['a', '|', 'b']));
			assert_eq!(tree.first_pos_root(), &positions(&[0]));
		}
		{
			let tree: RegexTree = RegexTree::new(r"\\*").unwrap();
			assert_eq!(tree.alphabet(), &BTreeSet::from(['\\']));
			assert!(tree.root().firstpos().contains(&tree.end_pos()));
		}
	}

	#[test]
	fn empty_pattern() {
		let tree: RegexTree = RegexTree::new("").unwrap();
		assert!(matches!(tree.root().kind(), NodeKind::End(Position(0))));
		assert_eq!(tree.end_pos(), Position(0));
		assert_eq!(tree.first_pos_root(), &positions(&[0]));
		assert!(tree.alphabet().is_empty());
	}

	#[test]
	fn unmatched_parentheses() {
		assert_eq!(
			RegexTree::new("(a").unwrap_err(),
			ParseError::UnmatchedOpen { offset: 0 }
		);
		assert_eq!(
			RegexTree::new("a)").unwrap_err(),
			ParseError::UnmatchedClose { offset: 1 }
		);
		assert_eq!(
			RegexTree::new("x((a)").unwrap_err(),
			ParseError::UnmatchedOpen { offset: 1 }
		);
		assert!(RegexTree::new(r"\(a").is_ok());
	}

	#[test]
	fn unmatched_close_in_backward_scan() {
		let options: TreeOptions = TreeOptions::default();
		let mut builder: TreeBuilder<'_> = TreeBuilder {
			pattern: "ab)",
			options: &options,
			leaves: Vec::new(),
		};
		assert_eq!(
			builder.build(0..3, false).unwrap_err(),
			ParseError::UnmatchedClose { offset: 2 }
		);
	}

	#[test]
	fn empty_subexpressions() {
		assert_eq!(
			RegexTree::new("a|").unwrap_err(),
			ParseError::EmptyExpression { offset: 2 }
		);
		assert_eq!(
			RegexTree::new("|b").unwrap_err(),
			ParseError::EmptyExpression { offset: 0 }
		);
		assert_eq!(
			RegexTree::new("a()").unwrap_err(),
			ParseError::EmptyExpression { offset: 2 }
		);
	}

	#[test]
	fn dangling_star_is_wrapped_by_default() {
		let tree: RegexTree = RegexTree::new("a*").unwrap();
		let NodeKind::Concat(body, end) = tree.root().kind() else {
			panic!("root should be a concatenation, got {:?}", tree.root());
		};
		assert!(matches!(body.kind(), NodeKind::Star(_)));
		assert!(body.nullable());
		assert!(!end.nullable());
		assert!(!tree.root().nullable());
		assert_eq!(tree.first_pos_root(), &positions(&[0, 1]));
		assert_eq!(tree.follow_pos(Position(0)), &positions(&[0, 1]));

		let tree: RegexTree = RegexTree::new("a|b*").unwrap();
		assert_eq!(tree.follow_pos(Position(1)), &positions(&[1, 2]));
	}

	#[test]
	fn dangling_star_can_be_dropped() {
		let options: TreeOptions = TreeOptions::new().with_dangling_star(DanglingStar::Drop);

		let tree: RegexTree = RegexTree::with_options("a*", &options).unwrap();
		let NodeKind::Concat(body, _) = tree.root().kind() else {
			panic!("root should be a concatenation, got {:?}", tree.root());
		};
		assert!(matches!(body.kind(), NodeKind::Leaf(Position(0))));
		assert!(!body.nullable());
		assert!(!tree.first_pos_root().contains(&tree.end_pos()));
		assert_eq!(tree.first_pos_root(), &positions(&[0]));
		assert_eq!(tree.follow_pos(Position(0)), &positions(&[1]));

		let tree: RegexTree = RegexTree::with_options("a|b*", &options).unwrap();
		assert_eq!(tree.follow_pos(Position(1)), &positions(&[2]));

		// A star after a symbol with a prefix, or after a group, is consumed either way.
		let tree: RegexTree = RegexTree::with_options("ab*", &options).unwrap();
		assert_eq!(tree.follow_pos(Position(1)), &positions(&[1, 2]));
		let tree: RegexTree = RegexTree::with_options("(ab)*", &options).unwrap();
		assert_eq!(tree.follow_pos(Position(1)), &positions(&[0, 2]));
	}

	#[test]
	fn long_patterns_do_not_recurse_per_unit() {
		let length: usize = 20_000;
		// Pinned to 2 MiB so the outcome doesn't depend on RUST_MIN_STACK.
		let handle: std::thread::JoinHandle<()> = std::thread::Builder::new()
			.stack_size(2 * 1024 * 1024)
			.spawn(move || {
				let tree: RegexTree = RegexTree::new(&"a".repeat(length)).unwrap();
				assert_eq!(tree.leaf_count(), length);
				assert_eq!(tree.follow_pos(Position(length - 1)), &positions(&[length]));
				assert_eq!(tree.first_pos_root(), &positions(&[0]));
				drop(tree);

				let tree: RegexTree = RegexTree::new(&"ab*".repeat(length / 2)).unwrap();
				assert_eq!(tree.leaf_count(), length);
				assert_eq!(tree.follow_pos(Position(1)), &positions(&[1, 2]));
				assert_eq!(tree.follow_pos(Position(length - 1)), &positions(&[length - 1, length]));

				let pattern: String = vec!["(ab)"; 2_000].join("|");
				let tree: RegexTree = RegexTree::new(&pattern).unwrap();
				assert_eq!(tree.leaf_count(), 4_000);
				assert_eq!(tree.first_pos_root().len(), 2_000);
				assert_eq!(tree.follow_pos(Position(3_999)), &positions(&[4_000]));
			})
			.unwrap();
		handle.join().unwrap();
	}

	#[test]
	fn alternatives_associate_to_the_right() {
		let tree: RegexTree = RegexTree::new("a|b|c").unwrap();
		let NodeKind::Concat(body, _) = tree.root().kind() else {
			panic!("root should be a concatenation, got {:?}", tree.root());
		};
		let NodeKind::Union(first, rest) = body.kind() else {
			panic!("body should be a union, got {body:?}");
		};
		assert!(matches!(first.kind(), NodeKind::Leaf(Position(0))));
		assert!(matches!(rest.kind(), NodeKind::Union(..)));
		assert_eq!(tree.first_pos_root(), &positions(&[0, 1, 2]));
	}
}
