pub mod mapper000;
pub mod mapper001;
pub mod mapper002;
pub mod mapper003;

use crate::cartridge::Mirror;

use mapper000::Mapper000;
use mapper001::Mapper001;
use mapper002::Mapper002;
use mapper003::Mapper003;

use serde::{Deserialize, Serialize};

/// Outcome of a mapper address translation.
///
/// `MapAddr` maps the access into the cartridge's PRG/CHR storage at the
/// given offset; on the write path it also marks the location writable.
/// `DirectRead`/`DirectWrite` mean the mapper's own backing bytes served
/// the access. `None` declines it: for writes that is either a bank-select
/// command the mapper already absorbed, or plain ROM, and the bus discards
/// the store silently.
pub enum MapResult {
    None,
    MapAddr(usize),
    DirectRead(u8),
    DirectWrite,
}

/// Address translation contract a cartridge exposes to the bus.
///
/// Writes into cartridge space always reach `cpu_map_write` before any
/// writability decision, since the write itself may be the bank-select
/// command.
pub trait Mapper {
    fn cpu_map_read(&mut self, addr: u16) -> MapResult;

    /// side-effect-free read translation (debugger view)
    fn cpu_map_read_ro(&self, addr: u16) -> MapResult;

    fn cpu_map_write(&mut self, addr: u16, data: u8) -> MapResult;

    fn ppu_map_read(&mut self, addr: u16) -> MapResult;

    fn ppu_map_write(&mut self, addr: u16, data: u8) -> MapResult;

    /// nametable arrangement, `Mirror::Hardware` = fixed by solder pads
    fn mirror(&self) -> Mirror {
        Mirror::Hardware
    }

    fn reset(&mut self);
}

/// The mapper boards this core supports.
///
/// A closed set of tagged variants rather than a trait object: the set of
/// boards mapped into the address space is fixed by the hardware, and the
/// enum round-trips through the bincode save-state path.
#[derive(Deserialize, Serialize)]
pub enum BoardMapper {
    Nrom(Mapper000),
    Sxrom(Mapper001),
    Uxrom(Mapper002),
    Cnrom(Mapper003),
}

impl BoardMapper {
    fn inner(&self) -> &dyn Mapper {
        match self {
            BoardMapper::Nrom(m) => m,
            BoardMapper::Sxrom(m) => m,
            BoardMapper::Uxrom(m) => m,
            BoardMapper::Cnrom(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Mapper {
        match self {
            BoardMapper::Nrom(m) => m,
            BoardMapper::Sxrom(m) => m,
            BoardMapper::Uxrom(m) => m,
            BoardMapper::Cnrom(m) => m,
        }
    }
}

impl Mapper for BoardMapper {
    fn cpu_map_read(&mut self, addr: u16) -> MapResult {
        self.inner_mut().cpu_map_read(addr)
    }

    fn cpu_map_read_ro(&self, addr: u16) -> MapResult {
        self.inner().cpu_map_read_ro(addr)
    }

    fn cpu_map_write(&mut self, addr: u16, data: u8) -> MapResult {
        self.inner_mut().cpu_map_write(addr, data)
    }

    fn ppu_map_read(&mut self, addr: u16) -> MapResult {
        self.inner_mut().ppu_map_read(addr)
    }

    fn ppu_map_write(&mut self, addr: u16, data: u8) -> MapResult {
        self.inner_mut().ppu_map_write(addr, data)
    }

    fn mirror(&self) -> Mirror {
        self.inner().mirror()
    }

    fn reset(&mut self) {
        self.inner_mut().reset()
    }
}
