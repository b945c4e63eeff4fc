//! Package: one generator run over a peripheral list.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::board::{Board, BoardError};
use crate::chain::{Chain, ChainError};
use crate::perilist::{PeriList, PeriListError};
use crate::registry::Registry;

/// Directory the generated `include` lines point at.
pub const DEFAULT_INCLUDE_DIR: &str = "../../../peripherals";

#[allow(missing_docs)]
#[allow(variant_size_differences)]
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("file system error: {error}")]
    Fs { error: io::Error },

    #[error("{error}")]
    PeriList { error: PeriListError },

    #[error("{error}")]
    Chain { error: ChainError },

    #[error("{error}")]
    Board { error: BoardError },
}

impl From<ChainError> for PackageError {
    fn from(error: ChainError) -> Self { PackageError::Chain { error } }
}

impl From<PeriListError> for PackageError {
    fn from(error: PeriListError) -> Self { PackageError::PeriList { error } }
}

impl From<BoardError> for PackageError {
    fn from(error: BoardError) -> Self { PackageError::Board { error } }
}

/// Package.
#[derive(Debug)]
pub struct Package<'a> {
    chain: Chain<'a>,
}

impl<'a> Package<'a> {
    /// Allocates the chain for the given peripheral names.
    pub fn new<I, E>(registry: &'a Registry, board: &'a Board, names: I) -> Result<Self, PackageError>
    where
        I: IntoIterator<Item = Result<String, E>>,
        PackageError: From<E>,
    {
        let names = names.into_iter().map(|name| name.map_err(PackageError::from));
        Ok(Self { chain: Chain::allocate(registry, board, names)? })
    }

    /// Reads a peripheral list and allocates its chain.
    pub fn from_perilist<R: BufRead>(
        registry: &'a Registry, board: &'a Board, reader: R,
    ) -> Result<Self, PackageError> {
        Self::new(registry, board, PeriList::new(reader)?)
    }

    /// Returns the chain.
    pub fn chain(&self) -> &Chain<'a> { &self.chain }

    /// Returns the `include` line of every peripheral but the board IO, which the board build adds itself.
    pub fn gen_sources(&self, include_dir: &str) -> Vec<String> {
        self.chain
            .slots()
            .iter()
            .filter(|slot| !slot.is_board_io())
            .map(|slot| format!("`include \"{}/{}.v\"", include_dir, slot.descriptor.source_module))
            .collect()
    }

    /// Writes the `include` lines.
    pub fn write_sources<W: Write>(&self, mut out: W, include_dir: &str) -> Result<(), PackageError> {
        for line in self.gen_sources(include_dir) {
            writeln!(out, "{}", line).map_err(|error| PackageError::Fs { error })?;
        }
        out.flush().map_err(|error| PackageError::Fs { error })
    }
}
