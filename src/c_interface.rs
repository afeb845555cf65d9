use std::ffi::c_char;
use std::marker::PhantomData;
use std::str::Utf8Error;

use crate::dfa::Dfa;
use crate::dfa::StateId;
use crate::regex_tree::RegexTree;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CSlice<'lifetime, T> {
	pointer: *const T,
	length: usize,
	_lifetime: PhantomData<&'lifetime [T]>,
}

pub type CStringView<'lifetime> = CSlice<'lifetime, c_char>;

/// Returns null if `pattern` is not UTF-8 or fails to parse.
#[unsafe(no_mangle)]
unsafe extern "C" fn followpos_regex_tree_new(pattern: CStringView<'_>) -> Option<Box<RegexTree>> {
	let pattern: &str = pattern.as_utf8().ok()?;
	match RegexTree::new(pattern) {
		Ok(tree) => Some(Box::new(tree)),
		Err(err) => {
			debug!("rejected pattern {pattern:?}: {err}");
			None
		},
	}
}

#[unsafe(no_mangle)]
unsafe extern "C" fn followpos_regex_tree_delete(tree: Option<Box<RegexTree>>) {
	std::mem::drop(tree);
}

#[unsafe(no_mangle)]
unsafe extern "C" fn followpos_regex_tree_end_pos(tree: &RegexTree) -> usize {
	tree.end_pos().get()
}

#[unsafe(no_mangle)]
unsafe extern "C" fn followpos_dfa_new(tree: &RegexTree) -> Box<Dfa> {
	Box::new(Dfa::for_tree(tree))
}

#[unsafe(no_mangle)]
unsafe extern "C" fn followpos_dfa_delete(dfa: Box<Dfa>) {
	std::mem::drop(dfa);
}

#[unsafe(no_mangle)]
unsafe extern "C" fn followpos_dfa_start(dfa: &Dfa) -> usize {
	dfa.start().get()
}

#[unsafe(no_mangle)]
unsafe extern "C" fn followpos_dfa_state_count(dfa: &Dfa) -> usize {
	dfa.state_count()
}

/// False for states that don't exist.
#[unsafe(no_mangle)]
unsafe extern "C" fn followpos_dfa_is_accepting(dfa: &Dfa, state: usize) -> bool {
	dfa.state(state).is_some_and(|id| dfa.is_accepting(id))
}

/// Writes the successor of `state` on `symbol` (a Unicode scalar value) to `next`.
/// Returns false, leaving `next` untouched, if there is no such transition.
#[unsafe(no_mangle)]
unsafe extern "C" fn followpos_dfa_transition(dfa: &Dfa, state: usize, symbol: u32, next: &mut usize) -> bool {
	let Some(symbol): Option<char> = char::from_u32(symbol) else {
		return false;
	};
	let Some(state): Option<StateId> = dfa.state(state) else {
		return false;
	};
	match dfa.transition(state, symbol) {
		Some(destination) => {
			*next = destination.get();
			true
		},
		None => false,
	}
}

impl<'lifetime> CStringView<'lifetime> {
	pub fn from_utf8(utf8: &'lifetime str) -> Self {
		Self {
			pointer: utf8.as_bytes().as_ptr().cast::<c_char>(),
			length: utf8.len(),
			_lifetime: PhantomData,
		}
	}

	pub fn as_utf8(&self) -> Result<&'lifetime str, Utf8Error> {
		let bytes: &[u8] = unsafe { std::slice::from_raw_parts(self.pointer.cast::<u8>(), self.length) };
		str::from_utf8(bytes)
	}
}
