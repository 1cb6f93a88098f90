use super::{MapResult, Mapper};

use serde::{Deserialize, Serialize};

/// Mapper 000 (NROM): 16 or 32 kB of fixed PRG ROM, no bank switching.
#[derive(Deserialize, Serialize)]
pub struct Mapper000 {
    num_banks_prg: usize,
    num_banks_chr: usize,
}

impl Mapper000 {
    pub fn new(num_banks_prg: usize, num_banks_chr: usize) -> Mapper000 {
        Mapper000 {
            num_banks_prg,
            num_banks_chr,
        }
    }
}

impl Mapper for Mapper000 {
    fn cpu_map_read(&mut self, addr: u16) -> MapResult {
        self.cpu_map_read_ro(addr)
    }

    fn cpu_map_read_ro(&self, addr: u16) -> MapResult {
        match addr {
            0x8000..=0xffff => {
                // a single 16 kB bank appears twice in the window
                if self.num_banks_prg > 1 {
                    MapResult::MapAddr((addr & 0x7fff) as usize)
                } else {
                    MapResult::MapAddr((addr & 0x3fff) as usize)
                }
            }
            _ => MapResult::None,
        }
    }

    fn cpu_map_write(&mut self, _addr: u16, _data: u8) -> MapResult {
        // plain PRG ROM, no registers: writes are discarded
        MapResult::None
    }

    fn ppu_map_read(&mut self, addr: u16) -> MapResult {
        match addr {
            0x0000..=0x1fff => MapResult::MapAddr(addr as usize),
            _ => MapResult::None,
        }
    }

    fn ppu_map_write(&mut self, addr: u16, _data: u8) -> MapResult {
        if addr < 0x2000 && self.num_banks_chr == 0 {
            // CHR RAM board
            MapResult::MapAddr(addr as usize)
        } else {
            MapResult::None
        }
    }

    fn reset(&mut self) {}
}
