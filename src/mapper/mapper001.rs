use super::{MapResult, Mapper};

use crate::cartridge::Mirror;
use serde::{Deserialize, Serialize};

/// Mapper 001 (MMC1, SxROM boards): serially loaded bank registers.
///
/// Five writes into $8000-$ffff shift one data bit each; the fifth write
/// commits the 5-bit value to the register selected by the address. A
/// write with bit 7 set resets the serial load and locks PRG mode 3.
#[derive(Deserialize, Serialize)]
pub struct Mapper001 {
    num_banks_prg: usize,
    num_banks_chr: usize,

    mirror_mode: Mirror,
    control: u8,
    /// serial shift register, seeded with a marker bit that reaches bit 0
    /// when the register is full
    shift_reg: u8,
    prg_bank_lo: usize,
    prg_bank_hi: usize,
    prg_bank_32: usize,
    chr_bank_lo: usize,
    chr_bank_hi: usize,
    chr_bank_8: usize,
}

impl Mapper001 {
    pub fn new(num_banks_prg: usize, num_banks_chr: usize) -> Mapper001 {
        Mapper001 {
            num_banks_prg,
            num_banks_chr,

            mirror_mode: Mirror::Horizontal,
            control: 0x1c,
            shift_reg: 0x10,
            prg_bank_lo: 0,
            prg_bank_hi: num_banks_prg - 1,
            prg_bank_32: 0,
            chr_bank_lo: 0,
            chr_bank_hi: 0,
            chr_bank_8: 0,
        }
    }

    fn commit(&mut self, addr: u16) {
        match (addr >> 13) & 0x03 {
            0 => {
                self.control = self.shift_reg;
                self.mirror_mode = match self.control & 0x03 {
                    0 => Mirror::OneScreenLo,
                    1 => Mirror::OneScreenHi,
                    2 => Mirror::Vertical,
                    _ => Mirror::Horizontal,
                };
            }
            1 => {
                if self.num_banks_chr > 0 {
                    if self.control & 0x10 != 0 {
                        self.chr_bank_lo = self.shift_reg as usize % (self.num_banks_chr * 2);
                    } else {
                        self.chr_bank_8 = (self.shift_reg >> 1) as usize % self.num_banks_chr;
                    }
                }
            }
            2 => {
                // only meaningful in 4 kB CHR mode
                if self.num_banks_chr > 0 && self.control & 0x10 != 0 {
                    self.chr_bank_hi = self.shift_reg as usize % (self.num_banks_chr * 2);
                }
            }
            _ => match (self.control >> 2) & 0x03 {
                0 | 1 => {
                    let banks_32 = (self.num_banks_prg / 2).max(1);
                    self.prg_bank_32 = ((self.shift_reg & 0x0e) >> 1) as usize % banks_32;
                }
                2 => {
                    self.prg_bank_lo = 0;
                    self.prg_bank_hi = (self.shift_reg & 0x0f) as usize % self.num_banks_prg;
                }
                _ => {
                    self.prg_bank_lo = (self.shift_reg & 0x0f) as usize % self.num_banks_prg;
                    self.prg_bank_hi = self.num_banks_prg - 1;
                }
            },
        }
    }
}

impl Mapper for Mapper001 {
    fn cpu_map_read(&mut self, addr: u16) -> MapResult {
        self.cpu_map_read_ro(addr)
    }

    fn cpu_map_read_ro(&self, addr: u16) -> MapResult {
        match addr {
            0x8000..=0xbfff if self.control & 0x08 != 0 => {
                MapResult::MapAddr(self.prg_bank_lo * 0x4000 + (addr & 0x3fff) as usize)
            }
            0xc000..=0xffff if self.control & 0x08 != 0 => {
                MapResult::MapAddr(self.prg_bank_hi * 0x4000 + (addr & 0x3fff) as usize)
            }
            0x8000..=0xffff => {
                // a single-bank board in 32 kB mode mirrors its one bank
                let span = 0x8000usize.min(self.num_banks_prg * 0x4000);
                MapResult::MapAddr(self.prg_bank_32 * 0x8000 + (addr & 0x7fff) as usize % span)
            }
            _ => MapResult::None,
        }
    }

    fn cpu_map_write(&mut self, addr: u16, data: u8) -> MapResult {
        if let 0x8000..=0xffff = addr {
            if data & 0x80 != 0 {
                // reset serial loading, lock PRG mode 3
                self.shift_reg = 0x10;
                self.control |= 0x0c;
            } else if self.shift_reg & 0x01 != 0 {
                // fifth bit arriving: commit to the addressed register
                self.shift_reg >>= 1;
                self.shift_reg |= (data & 0x01) << 4;
                self.commit(addr);
                self.shift_reg = 0x10;
            } else {
                self.shift_reg >>= 1;
                self.shift_reg |= (data & 0x01) << 4;
            }
        }
        // serial load absorbed, nothing is stored
        MapResult::None
    }

    fn ppu_map_read(&mut self, addr: u16) -> MapResult {
        match addr {
            0x0000..=0x1fff => {
                if self.num_banks_chr == 0 {
                    // CHR RAM board
                    MapResult::MapAddr(addr as usize)
                } else if self.control & 0x10 != 0 {
                    // 4 kB mode
                    if addr < 0x1000 {
                        MapResult::MapAddr(self.chr_bank_lo * 0x1000 + addr as usize)
                    } else {
                        MapResult::MapAddr(self.chr_bank_hi * 0x1000 + (addr & 0x0fff) as usize)
                    }
                } else {
                    MapResult::MapAddr(self.chr_bank_8 * 0x2000 + addr as usize)
                }
            }
            _ => MapResult::None,
        }
    }

    fn ppu_map_write(&mut self, addr: u16, _data: u8) -> MapResult {
        if addr < 0x2000 && self.num_banks_chr == 0 {
            MapResult::MapAddr(addr as usize)
        } else {
            MapResult::None
        }
    }

    fn mirror(&self) -> Mirror {
        self.mirror_mode
    }

    fn reset(&mut self) {
        self.mirror_mode = Mirror::Horizontal;
        self.control = 0x1c;
        self.shift_reg = 0x10;
        self.prg_bank_lo = 0;
        self.prg_bank_hi = self.num_banks_prg - 1;
        self.prg_bank_32 = 0;
        self.chr_bank_lo = 0;
        self.chr_bank_hi = 0;
        self.chr_bank_8 = 0;
    }
}
