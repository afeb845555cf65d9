//! Switch for the tables the driver prints with `--debug`: the followpos table
//! and the per-node `nullable`/`firstpos`/`lastpos` report.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

static DUMPS_ENABLED: AtomicBool = AtomicBool::new(false);

pub fn set_dumps(enabled: bool) {
	DUMPS_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn dumps_enabled() -> bool {
	DUMPS_ENABLED.load(Ordering::Relaxed)
}

/// Prints `render()` to stdout under a `title:` header. `render` is not called while dumps are off.
pub fn dump<F>(title: &str, render: F) -> bool
where
	F: FnOnce() -> String,
{
	if !dumps_enabled() {
		return false;
	}
	println!("{title}:\n{}", render());
	true
}
