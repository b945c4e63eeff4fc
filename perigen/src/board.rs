//! FPGA boards.

use thiserror::Error;

use crate::registry::PeripheralDescriptor;

/// Board bounds on the peripheral chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainSpec {
    /// Highest physical pin index (`PCPIN`) peripherals may use.
    pub max_physical_pin: usize,

    /// Number of peripherals the board is sized for.
    ///
    /// Exceeding it is reported but not enforced; the driver ID table capacity is the hard bound.
    pub max_slots: usize,
}

#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("unknown board: {0}")]
    UnknownBoard(String),
}

/// FPGA board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Board name.
    pub name: String,

    /// Board IO peripheral, always instantiated in slot 0.
    pub board_io: PeripheralDescriptor,

    /// Chain bounds.
    pub chain: ChainSpec,
}

/// `(board, board IO module, driver ID, max physical pin, max slots)`.
const BOARDS: &[(&str, &str, u16, usize, usize)] = &[
    ("basys3", "basys3", 47, 31, 8),
    ("stepxo2", "stpxo2", 46, 33, 9),
    ("axelxo2", "axo2", 43, 59, 16),
    ("baseboard4", "bb4io", 42, 31, 16),
];

impl Board {
    /// Creates a new board.
    pub fn new(name: &str, board_io: PeripheralDescriptor, chain: ChainSpec) -> Self {
        Self { name: name.to_string(), board_io, chain }
    }

    /// Returns the built-in board with the given name.
    pub fn builtin(name: &str) -> Result<Self, BoardError> {
        BOARDS
            .iter()
            .find(|(board, ..)| *board == name)
            .map(|&(board, module, driver_id, max_physical_pin, max_slots)| {
                Self::new(board, PeripheralDescriptor::new(module, driver_id, module, 0x0, 0), ChainSpec {
                    max_physical_pin,
                    max_slots,
                })
            })
            .ok_or_else(|| BoardError::UnknownBoard(name.to_string()))
    }

    /// Names of the built-in boards.
    pub fn builtin_names() -> impl Iterator<Item = &'static str> { BOARDS.iter().map(|(board, ..)| *board) }

    /// Names of the board IO peripherals of the built-in boards.
    pub fn builtin_io_names() -> impl Iterator<Item = &'static str> { BOARDS.iter().map(|(_, module, ..)| *module) }
}
