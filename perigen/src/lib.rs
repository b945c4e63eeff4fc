//! Perigen: generates the peripheral chain of an FPGA build from a list of peripheral names.
//!
//! The generated netlist instantiates every peripheral on a daisy-chained bus, wires its pins to the
//! board's physical pins and adds the table telling the host which driver serves each slot.

// # Tries to deny all lints (`rustc -W help`).
#![deny(absolute_paths_not_starting_with_crate)]
#![deny(anonymous_parameters)]
#![deny(deprecated_in_future)]
#![deny(explicit_outlives_requirements)]
#![deny(keyword_idents)]
#![deny(macro_use_extern_crate)]
#![deny(missing_debug_implementations)]
#![deny(non_ascii_idents)]
#![deny(rust_2018_idioms)]
#![deny(trivial_numeric_casts)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(unused_extern_crates)]
#![deny(unused_import_braces)]
//
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::invalid_codeblock_attributes)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::bare_urls)]
//
#![allow(clippy::needless_lifetimes)]
#![allow(elided_lifetimes_in_paths)]

pub mod board;
pub mod chain;
pub mod package;
pub mod perilist;
pub mod registry;
pub mod utils;
pub mod vir;
pub mod virgen;

pub use board::{Board, BoardError, ChainSpec};
pub use chain::{Chain, ChainError, DriverTable, PinRange, Slot, DRIVER_TABLE_CAPACITY};
pub use package::{Package, PackageError, DEFAULT_INCLUDE_DIR};
pub use perilist::{PeriList, PeriListError, HEADER_LINES};
pub use registry::{PeripheralDescriptor, Registry, RegistryError};
