use crate::cartridge::Mirror;

use serde::{Deserialize, Serialize};

/// Interrupt line a device can assert towards the CPU.
///
/// Raised out of band: the device latches the line, the machine polls it
/// between bus accesses. Nothing calls back into the bus.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Interrupt {
    Nmi,
    Irq,
}

/// Register-mapped device on the CPU bus (PPU, APU).
///
/// Offsets are pre-mirrored by the bus before the call, e.g. always 0-7
/// for the PPU register file. Reads and writes are method calls because
/// they may change device state; a register is never a plain memory cell.
pub trait Device {
    fn read_register(&mut self, offset: u8) -> u8;

    /// read without side effects (debugger view)
    fn read_register_ro(&self, offset: u8) -> u8;

    fn write_register(&mut self, offset: u8, data: u8);

    /// advance the device one PPU clock
    fn clock(&mut self) {}

    /// nametable arrangement dictated by the inserted cartridge; ignored
    /// by devices without CIRAM
    fn set_mirroring(&mut self, _mirror: Mirror) {}

    /// take a pending interrupt, clearing the line
    fn poll_interrupt(&mut self) -> Option<Interrupt> {
        None
    }

    fn reset(&mut self);
}
