//! Peripheral chain.
//!
//! Peripherals (the FPGA calls them cores, the host daemon calls them slots) are numbered in list order.
//! Slot 0 is always the board IO peripheral. Every other slot takes the next `pin_count` physical pins.

use std::ops::Range;

use arrayvec::ArrayVec;
use static_assertions::const_assert_eq;
use thiserror::Error;

use crate::board::Board;
use crate::registry::{PeripheralDescriptor, Registry, RegistryError};
use crate::utils::clog2;

/// Number of rows in the driver ID table, shared with the host daemon.
pub const DRIVER_TABLE_CAPACITY: usize = 16;

/// Width of the slot index on the bus (`bi0addr[11:8]`).
pub const SLOT_INDEX_WIDTH: usize = 4;

const_assert_eq!(clog2(DRIVER_TABLE_CAPACITY), SLOT_INDEX_WIDTH);

#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("{error}")]
    Registry { error: RegistryError },

    #[error("peripheral list declares board IO {found}, but the board uses {expected}")]
    ForeignBoardIo { found: String, expected: String },

    #[error("too many peripherals, the driver ID table holds {capacity}")]
    Capacity { capacity: usize },
}

impl From<RegistryError> for ChainError {
    fn from(error: RegistryError) -> Self { ChainError::Registry { error } }
}

/// Physical pins of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinRange {
    /// First physical pin.
    pub start: usize,

    /// Number of pins.
    pub count: usize,
}

impl PinRange {
    /// Returns the physical pin indices.
    #[inline]
    pub fn pins(&self) -> Range<usize> { self.start..self.start + self.count }
}

/// Slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot<'a> {
    /// Bus address.
    pub index: usize,

    /// Peripheral descriptor.
    pub descriptor: &'a PeripheralDescriptor,

    /// Physical pins.
    pub pin_range: PinRange,

    /// Driver ID.
    pub driver_id: u16,
}

impl<'a> Slot<'a> {
    /// Returns `true` for the board IO slot.
    #[inline]
    pub fn is_board_io(&self) -> bool { self.index == 0 }

    /// Returns the instance name, which also prefixes the slot's bus signals.
    #[inline]
    pub fn inst_name(&self) -> String { format!("p{:02}", self.index) }
}

/// Driver ID of every slot, `0` for unused slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverTable([u16; DRIVER_TABLE_CAPACITY]);

impl DriverTable {
    /// Returns the driver ID of the given row.
    #[inline]
    pub fn get(&self, index: usize) -> Option<u16> { self.0.get(index).copied() }

    /// Returns all rows.
    #[inline]
    pub fn rows(&self) -> &[u16; DRIVER_TABLE_CAPACITY] { &self.0 }
}

/// Chain of slots.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    board: &'a Board,
    slots: ArrayVec<Slot<'a>, DRIVER_TABLE_CAPACITY>,
    next_pin: usize,
}

impl<'a> Chain<'a> {
    /// Creates a chain holding only the board IO slot.
    pub fn new(board: &'a Board) -> Self {
        let mut slots = ArrayVec::new();
        slots.push(Slot {
            index: 0,
            descriptor: &board.board_io,
            pin_range: PinRange { start: 0, count: 0 },
            driver_id: board.board_io.driver_id,
        });
        Self { board, slots, next_pin: 0 }
    }

    /// Resolves the names against the registry and appends their slots.
    ///
    /// A first name equal to the board IO peripheral is taken as the declaration of slot 0. A first name
    /// equal to the board IO peripheral of another built-in board is an error.
    pub fn allocate<I, E>(registry: &'a Registry, board: &'a Board, names: I) -> Result<Self, E>
    where
        I: IntoIterator<Item = Result<String, E>>,
        E: From<ChainError>,
    {
        let mut chain = Self::new(board);
        for (position, name) in names.into_iter().enumerate() {
            let name = name?;
            if position == 0 && name == board.board_io.name {
                log::debug!("{} declared as slot 0", name);
                continue;
            }
            if position == 0 && Board::builtin_io_names().any(|io| io == name) {
                return Err(ChainError::ForeignBoardIo { found: name, expected: board.board_io.name.clone() }.into());
            }
            if chain.is_full() {
                return Err(ChainError::Capacity { capacity: DRIVER_TABLE_CAPACITY }.into());
            }
            let _ = chain.push(registry.lookup(&name).map_err(ChainError::from)?)?;
        }

        if chain.len() > board.chain.max_slots {
            log::warn!(
                "{} peripherals exceed the {} supported by board {}",
                chain.len(),
                board.chain.max_slots,
                board.name
            );
        }
        if chain.pin_count() > board.chain.max_physical_pin + 1 {
            log::warn!(
                "{} pins requested but board {} stops at pin {}, higher pins are left unconnected",
                chain.pin_count(),
                board.name,
                board.chain.max_physical_pin
            );
        }
        log::info!("allocated {} slots using {} pins", chain.len(), chain.pin_count());

        Ok(chain)
    }

    /// Appends a slot for the given peripheral.
    pub fn push(&mut self, descriptor: &'a PeripheralDescriptor) -> Result<&Slot<'a>, ChainError> {
        let slot = Slot {
            index: self.slots.len(),
            descriptor,
            pin_range: PinRange { start: self.next_pin, count: descriptor.pin_count },
            driver_id: descriptor.driver_id,
        };
        self.slots.try_push(slot).map_err(|_| ChainError::Capacity { capacity: DRIVER_TABLE_CAPACITY })?;
        self.next_pin += descriptor.pin_count;

        let slot = &self.slots[self.slots.len() - 1];
        log::debug!(
            "slot {}: {} ({}) pins {:?}",
            slot.index,
            descriptor.name,
            descriptor.source_module,
            slot.pin_range.pins()
        );
        Ok(slot)
    }

    /// Returns `true` if no more slots fit in the driver ID table.
    #[inline]
    pub fn is_full(&self) -> bool { self.slots.is_full() }

    /// Returns the board.
    #[inline]
    pub fn board(&self) -> &'a Board { self.board }

    /// Returns the slots, in address order.
    #[inline]
    pub fn slots(&self) -> &[Slot<'a>] { &self.slots }

    /// Returns the number of slots, board IO included.
    #[inline]
    pub fn len(&self) -> usize { self.slots.len() }

    /// Always `false`: the board IO slot is always present.
    #[inline]
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    /// Returns the slot with the highest address.
    #[inline]
    pub fn last(&self) -> &Slot<'a> { &self.slots[self.slots.len() - 1] }

    /// Returns the number of physical pins requested by the peripherals.
    #[inline]
    pub fn pin_count(&self) -> usize { self.next_pin }

    /// Returns the driver ID table.
    pub fn driver_table(&self) -> DriverTable {
        let mut table = [0; DRIVER_TABLE_CAPACITY];
        for slot in &self.slots {
            table[slot.index] = slot.driver_id;
        }
        DriverTable(table)
    }
}
