/// What to do with a pending trailing `*` that reaches a parse path which
/// does not consume it: a lone symbol (`a*`, or the `b*` in `a|b*`), or a
/// top-level alternation split.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum DanglingStar {
	/// Wrap the node produced on that path in a `Star`.
	#[default]
	Wrap,
	/// Leave the node as is; the closure is silently lost.
	Drop,
}

#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
	pub dangling_star: DanglingStar,
}

impl TreeOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_dangling_star(mut self, dangling_star: DanglingStar) -> Self {
		self.dangling_star = dangling_star;
		self
	}
}
