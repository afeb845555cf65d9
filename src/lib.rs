#[macro_use(debug)]
extern crate tracing;

pub mod debug;
pub mod dfa;
pub mod options;
pub mod regex_tree;
pub mod render;

pub mod c_interface;
#[cfg(feature = "python")]
pub mod python_interface;
