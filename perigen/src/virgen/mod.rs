//! Generates Verilog code.

use std::io::Write;

use crate::board::ChainSpec;
use crate::chain::{Chain, DriverTable, Slot, DRIVER_TABLE_CAPACITY, SLOT_INDEX_WIDTH};
use crate::vir::*;
use crate::{Package, PackageError};

/// Width of the data lines chained between slots.
pub const DATA_WIDTH: usize = 8;

/// Width of a driver ID.
pub const DRIVER_ID_WIDTH: usize = 16;

/// Name of the generated driver ID table module.
pub const DRIVER_TABLE_MODULE: &str = "perilist";

impl<'a> Package<'a> {
    /// Generates the netlist: slot instantiations, bus interconnect and driver ID table.
    pub fn gen_vir(&self) -> Netlist { gen_netlist(self.chain()) }

    /// Writes the netlist.
    pub fn write_vir<W: Write>(&self, mut out: W) -> Result<(), PackageError> {
        write!(out, "{}", self.gen_vir()).map_err(|error| PackageError::Fs { error })?;
        out.flush().map_err(|error| PackageError::Fs { error })
    }
}

/// Generates the netlist of a chain.
pub fn gen_netlist(chain: &Chain<'_>) -> Netlist {
    let bounds = &chain.board().chain;
    let mut body = chain.slots().iter().map(|slot| gen_slot(slot, bounds)).collect::<Vec<_>>();
    body.append(&mut gen_interconnect(chain));

    Netlist { body, modules: vec![gen_driver_table(&chain.driver_table())] }
}

fn signal(slot: &Slot<'_>, suffix: &str) -> Expression { Expression::ident(format!("{}{}", slot.inst_name(), suffix)) }

/// Generates the wires, instantiation, pin wiring and address decode of a slot.
pub fn gen_slot(slot: &Slot<'_>, bounds: &ChainSpec) -> ModuleItem {
    let name = slot.inst_name();
    let mut decls = vec![
        Declaration::net(1, format!("{}STB_O", name)),
        Declaration::net(1, format!("{}STALL_O", name)),
        Declaration::net(1, format!("{}ACK_O", name)),
        Declaration::net(DATA_WIDTH, format!("{}DAT_I", name)),
        Declaration::net(DATA_WIDTH, format!("{}DAT_O", name)),
    ];

    let mut ports = vec![
        Expression::from("CLK_O"),
        Expression::from("WE_O"),
        Expression::from("TGA_O"),
        signal(slot, "STB_O"),
        Expression::from("ADR_O").part(7, 0),
        signal(slot, "STALL_O"),
        signal(slot, "ACK_O"),
        signal(slot, "DAT_I"),
        signal(slot, "DAT_O"),
        Expression::from("bc0clocks"),
    ];

    let mut conts = vec![];
    if slot.is_board_io() {
        // The board IO peripheral owns the board pins and every physical pin.
        ports.push(Expression::from("BRDIO"));
        ports.push(Expression::from("PCPIN"));
    } else {
        decls.push(Declaration::tri(slot.pin_range.count, format!("{}pins", name)));
        ports.push(signal(slot, "pins"));
        conts = gen_pin_wiring(slot, bounds);
    }
    conts.push(gen_address_decode(slot));

    let inst = ModuleInstantiation::new(slot.descriptor.source_module.clone(), name, ports);

    ModuleItem::Commented(format!("Slot: {}   {}", slot.index, slot.descriptor.source_module), vec![
        ModuleItem::Declarations(decls),
        ModuleItem::ModuleInstantiation(inst),
        ModuleItem::ContinuousAssigns(conts),
    ])
}

/// Connects the slot's pins to the physical pins, in the direction of each pin.
///
/// Pins past `max_physical_pin` are left unconnected.
pub fn gen_pin_wiring(slot: &Slot<'_>, bounds: &ChainSpec) -> Vec<ContinuousAssign> {
    let mut conts = vec![];
    for (pin, physical) in slot.pin_range.pins().enumerate() {
        if physical > bounds.max_physical_pin {
            log::trace!("{}: pin {} (PCPIN[{}]) is not on the board", slot.inst_name(), pin, physical);
            continue;
        }

        let local = signal(slot, "pins").index(pin);
        let physical = Expression::from("PCPIN").index(physical);
        conts.push(if slot.descriptor.is_output(pin) {
            ContinuousAssign::new(physical, local)
        } else {
            ContinuousAssign::new(local, physical)
        });
    }
    conts
}

/// Selects the slot when the high address bits equal its index.
pub fn gen_address_decode(slot: &Slot<'_>) -> ContinuousAssign {
    let addr = Expression::from("bi0addr").part(8 + SLOT_INDEX_WIDTH - 1, 8);
    ContinuousAssign::new(
        signal(slot, "STB_O"),
        Expression::conditional(
            Expression::binary(BinaryOp::Eq, addr, Expression::decimal(slot.index)),
            Expression::bin(1, 1),
            Expression::bin(1, 0),
        ),
    )
}

/// Generates the data chain and the composite stall and ack lines.
///
/// Read data enters at the last slot on `bi0datout`, passes down through every slot and leaves slot 0
/// on `bi0datin`.
pub fn gen_interconnect(chain: &Chain<'_>) -> Vec<ModuleItem> {
    let slots = chain.slots();

    let mut links = slots
        .windows(2)
        .map(|pair| ContinuousAssign::new(signal(&pair[0], "DAT_I"), signal(&pair[1], "DAT_O")))
        .collect::<Vec<_>>();
    links.push(ContinuousAssign::new(signal(chain.last(), "DAT_I"), "bi0datout".into()));

    let reduce = |suffix: &str| Expression::reduce(BinaryOp::Or, slots.iter().map(|slot| signal(slot, suffix)));

    vec![
        ModuleItem::ContinuousAssigns(vec![ContinuousAssign::new("bi0datin".into(), signal(&slots[0], "DAT_O"))]),
        ModuleItem::ContinuousAssigns(links),
        ModuleItem::ContinuousAssigns(vec![ContinuousAssign::new("STALL_I".into(), reduce("STALL_O"))]),
        ModuleItem::ContinuousAssigns(vec![ContinuousAssign::new("ACK_I".into(), reduce("ACK_O"))]),
    ]
}

/// Generates the module mapping a slot index to its driver ID.
pub fn gen_driver_table(table: &DriverTable) -> Module {
    let rows = table.rows();
    let default = Expression::hex(DRIVER_ID_WIDTH, usize::from(rows[DRIVER_TABLE_CAPACITY - 1]));
    let id = (0..DRIVER_TABLE_CAPACITY - 1).rev().fold(default, |else_expr, index| {
        Expression::conditional(
            Expression::binary(BinaryOp::Eq, "core".into(), Expression::hex(SLOT_INDEX_WIDTH, index)),
            Expression::hex(DRIVER_ID_WIDTH, usize::from(rows[index])),
            else_expr,
        )
    });

    Module {
        name: DRIVER_TABLE_MODULE.to_string(),
        port_decls: vec![
            PortDeclaration::input(SLOT_INDEX_WIDTH, "core"),
            PortDeclaration::output(DRIVER_ID_WIDTH, "id"),
        ],
        module_items: vec![ModuleItem::ContinuousAssigns(vec![ContinuousAssign::new("id".into(), id)])],
    }
}
