//! Peripheral descriptor registry.
//!
//! The registry relates the name used in a peripheral list to the host driver ID, the Verilog block
//! implementing it and its pin usage. Several names may share one Verilog block: an alias reuses the
//! hardware and only changes how the host driver interprets it (`touch4` is four `count4` counters).

use linked_hash_map::LinkedHashMap;
use thiserror::Error;

use crate::utils::truncate_str;

/// Number of significant bytes in a peripheral name.
pub const MAX_NAME_LEN: usize = 19;

/// Peripheral descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeripheralDescriptor {
    /// Name as it appears in the peripheral list.
    pub name: String,

    /// Driver ID reported to the host for this slot.
    pub driver_id: u16,

    /// Verilog module implementing the peripheral.
    pub source_module: String,

    /// Pin directions, LSB is the lowest pin. A set bit is an output (or bidirectional) pin.
    pub pin_dir_mask: u32,

    /// Number of FPGA pins the peripheral uses.
    pub pin_count: usize,
}

impl PeripheralDescriptor {
    /// Creates a new descriptor.
    pub fn new(name: &str, driver_id: u16, source_module: &str, pin_dir_mask: u32, pin_count: usize) -> Self {
        Self {
            name: name.to_string(),
            driver_id,
            source_module: source_module.to_string(),
            pin_dir_mask,
            pin_count,
        }
    }

    /// Returns `true` if pin `pin` is driven by the peripheral.
    #[inline]
    pub fn is_output(&self, pin: usize) -> bool { pin < 32 && self.pin_dir_mask & (1 << pin) != 0 }

    /// Returns `true` if the descriptor reuses another peripheral's Verilog.
    #[inline]
    pub fn is_alias(&self) -> bool { self.name != self.source_module }
}

#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate peripheral: {0}")]
    DuplicatePeripheral(String),

    #[error("Unknown peripheral: {0}")]
    UnknownPeripheral(String),
}

/// Peripheral descriptor registry.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    descriptors: LinkedHashMap<String, PeripheralDescriptor>,
}

impl Registry {
    /// Builds a registry from the given descriptors, keeping their order.
    pub fn new<I>(descriptors: I) -> Result<Self, RegistryError>
    where I: IntoIterator<Item = PeripheralDescriptor> {
        let mut map = LinkedHashMap::new();
        for descriptor in descriptors {
            let key = truncate_str(&descriptor.name, MAX_NAME_LEN).to_string();
            if map.contains_key(&key) {
                return Err(RegistryError::DuplicatePeripheral(descriptor.name));
            }
            let _ = map.insert(key, descriptor);
        }
        Ok(Self { descriptors: map })
    }

    /// Returns the registry of all peripherals known to the generator.
    pub fn builtin() -> Self {
        let descriptors = PERIPHERALS.iter().map(|&(name, driver_id, source_module, pin_dir_mask, pin_count)| {
            PeripheralDescriptor::new(name, driver_id, source_module, pin_dir_mask, pin_count)
        });
        Self {
            descriptors: descriptors
                .map(|descriptor| (truncate_str(&descriptor.name, MAX_NAME_LEN).to_string(), descriptor))
                .collect(),
        }
    }

    /// Looks up a peripheral by name.
    ///
    /// Only the first [`MAX_NAME_LEN`] bytes of the name are significant.
    pub fn lookup(&self, name: &str) -> Result<&PeripheralDescriptor, RegistryError> {
        self.descriptors
            .get(truncate_str(name, MAX_NAME_LEN))
            .ok_or_else(|| RegistryError::UnknownPeripheral(name.to_string()))
    }

    /// Iterates descriptors in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &PeripheralDescriptor> { self.descriptors.values() }

    /// Returns the number of descriptors.
    pub fn len(&self) -> usize { self.descriptors.len() }

    /// Returns `true` if the registry is empty.
    pub fn is_empty(&self) -> bool { self.descriptors.is_empty() }
}

/// `(name, driver ID, Verilog module, pin directions, pin count)`.
///
/// The driver IDs must match the table in the host daemon.
const PERIPHERALS: &[(&str, u16, &str, u32, usize)] = &[
    ("null", 1, "null", 0x0, 0),
    ("serout8", 2, "serout", 0xff, 8),
    ("qtr8", 3, "qtr8", 0xff, 8),
    ("qtr4", 4, "qtr4", 0xf, 4),
    ("ws2812", 5, "ws2812", 0xf, 4),
    ("rcrx", 6, "rcrx", 0xe, 4),
    ("serout4", 7, "serout", 0xf, 4),
    ("dproten", 8, "dproten", 0x8, 4),
    ("servo4", 9, "servo4", 0xf, 4),
    ("stepu", 10, "stepu", 0xf, 4),
    ("stepb", 11, "stepb", 0xf, 4),
    ("pwmout4", 12, "pgen16", 0xf, 4),
    ("quad2", 13, "quad2", 0x0, 4),
    ("pwmin4", 14, "pwmin4", 0x0, 4),
    ("ping4", 15, "ping4", 0xf, 4),
    ("pgen16", 16, "pgen16", 0xf, 4),
    ("irio", 17, "irio", 0x7, 4),
    ("pulse2", 18, "pulse2", 0xf, 4),
    ("touch4", 19, "count4", 0xf, 4),
    ("dc2", 20, "dc2", 0xf, 4),
    ("count4", 21, "count4", 0x0, 4),
    ("gpio4", 22, "gpio4", 0xf, 4),
    ("in4", 23, "in4", 0x0, 4),
    ("out4", 24, "out4", 0xf, 4),
    ("out4l", 25, "out4l", 0xf, 4),
    ("dpespi", 26, "dpespi", 0x7, 4),
    ("dpei2c", 27, "dpei2c", 0x7, 4),
    ("dplcd6", 28, "dplcd6", 0xf, 4),
    ("dpin32", 29, "dpin32", 0x7, 4),
    ("dpio8", 30, "dpio8", 0x7, 4),
    ("aamp", 31, "out4", 0xf, 4),
    ("dpdac8", 32, "dpespi", 0x7, 4),
    ("dpqpot", 33, "dpespi", 0x7, 4),
    ("dprtc", 34, "dpespi", 0x7, 4),
    ("dpavr", 35, "dpespi", 0x7, 4),
    ("dpadc812", 36, "dpadc12", 0x7, 4),
    ("dpslide4", 37, "dpadc12", 0x7, 4),
    ("dptif", 38, "dptif", 0x7, 4),
    ("dpus8", 39, "dpus8", 0x7, 4),
    ("rfob", 40, "rfob", 0xc, 4),
    ("dpout32", 41, "dpout32", 0xf, 4),
    ("bb4io", 42, "bb4io", 0x0, 0),
    ("axo2", 43, "axo2", 0x0, 0),
    ("tang4k", 44, "tang4k", 0x0, 0),
    ("tonegen", 45, "tonegen", 0xf, 4),
    ("stpxo2", 46, "stpxo2", 0x0, 0),
    ("basys3", 47, "basys3", 0x0, 0),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog() {
        let registry = Registry::builtin();
        assert_eq!(registry.len(), 47);
        assert_eq!(registry.iter().next().map(|d| d.name.as_str()), Some("null"));

        let out4 = registry.lookup("out4").unwrap();
        assert_eq!((out4.driver_id, out4.pin_dir_mask, out4.pin_count), (24, 0xf, 4));
        let in4 = registry.lookup("in4").unwrap();
        assert_eq!((in4.driver_id, in4.pin_dir_mask, in4.pin_count), (23, 0x0, 4));
    }

    #[test]
    fn aliases_share_source_module() {
        let registry = Registry::builtin();
        let touch4 = registry.lookup("touch4").unwrap();
        let count4 = registry.lookup("count4").unwrap();
        assert_eq!(touch4.source_module, count4.source_module);
        assert_ne!(touch4.driver_id, count4.driver_id);
        assert!(touch4.is_alias());
        assert!(!count4.is_alias());
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        let registry = Registry::builtin();
        assert_eq!(registry.lookup("OUT4"), Err(RegistryError::UnknownPeripheral("OUT4".to_string())));
        assert_eq!(registry.lookup("out"), Err(RegistryError::UnknownPeripheral("out".to_string())));
        assert_eq!(registry.lookup("out4x"), Err(RegistryError::UnknownPeripheral("out4x".to_string())));
    }

    #[test]
    fn names_significant_up_to_max_len() {
        let long = "a".repeat(MAX_NAME_LEN);
        let registry = Registry::new([PeripheralDescriptor::new(&long, 7, "blk", 0x1, 4)]).unwrap();
        let longer = format!("{}tail", long);
        assert_eq!(registry.lookup(&longer).unwrap().driver_id, 7);
    }

    #[test]
    fn duplicate_names_rejected() {
        let rows = [
            PeripheralDescriptor::new("gpio4", 22, "gpio4", 0xf, 4),
            PeripheralDescriptor::new("gpio4", 99, "x", 0x0, 0),
        ];
        assert_eq!(Registry::new(rows).unwrap_err(), RegistryError::DuplicatePeripheral("gpio4".to_string()));
    }

    #[test]
    fn pin_directions() {
        let rcrx = Registry::builtin().lookup("rcrx").unwrap().clone();
        assert!(!rcrx.is_output(0));
        assert!(rcrx.is_output(1));
        assert!(rcrx.is_output(3));
        assert!(!rcrx.is_output(4));
        assert!(!rcrx.is_output(40));
    }
}
