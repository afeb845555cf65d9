use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use followpos::dfa::Dfa;
use followpos::options::DanglingStar;
use followpos::options::TreeOptions;
use followpos::regex_tree::RegexTree;
use followpos::render;

/// Build the followpos DFA of a regex and write Graphviz diagrams of the tree and the automaton.
#[derive(Debug, Parser)]
struct Args {
	/// Pattern using literals, `\x` escapes, concatenation, `|`, `()` and `*`.
	#[arg(default_value = "a")]
	regex: String,

	/// Directory receiving `tree.md` and `dfa.md`.
	#[arg(short, long, default_value = "./output")]
	output: PathBuf,

	/// Print the followpos table and per-node position sets, and enable debug logging.
	#[arg(short, long)]
	debug: bool,

	/// Ignore a trailing `*` that lands on a lone symbol instead of wrapping it.
	#[arg(long)]
	drop_dangling_star: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
	let args: Args = Args::parse();

	tracing_subscriber::fmt()
		.with_max_level(if args.debug {
			tracing::Level::DEBUG
		} else {
			tracing::Level::WARN
		})
		.with_file(true)
		.with_line_number(true)
		.init();
	followpos::debug::set_dumps(args.debug);

	let dangling_star: DanglingStar = if args.drop_dangling_star {
		DanglingStar::Drop
	} else {
		DanglingStar::Wrap
	};
	let options: TreeOptions = TreeOptions::new().with_dangling_star(dangling_star);

	let tree: RegexTree = RegexTree::with_options(&args.regex, &options)?;
	followpos::debug::dump("followpos", || render::followpos_table(&tree));
	followpos::debug::dump("positions", || render::position_report(&tree));

	let dfa: Dfa = Dfa::for_tree(&tree);

	std::fs::create_dir_all(&args.output)?;
	std::fs::write(
		args.output.join("tree.md"),
		render::markdown_dot(&render::tree_to_dot(&tree)),
	)?;
	std::fs::write(
		args.output.join("dfa.md"),
		render::markdown_dot(&render::dfa_to_dot(&dfa)),
	)?;

	println!(
		"{:?}: {} leaves, {} states, {} accepting; wrote {}",
		args.regex,
		tree.leaf_count(),
		dfa.state_count(),
		dfa.accepting().len(),
		args.output.display()
	);

	Ok(())
}
