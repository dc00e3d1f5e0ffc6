pub mod cell;
pub mod error;
pub mod ffi;
pub mod lammpstrj;
pub mod molfile;
pub mod parser;
pub mod reader;
pub mod types;
pub mod xtc;
