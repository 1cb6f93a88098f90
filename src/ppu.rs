use crate::cartridge::Mirror;
use crate::device::{Device, Interrupt};

use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

const DOTS_PER_SCANLINE: u16 = 341;
const SCANLINES_PER_FRAME: u16 = 262;
const SCANLINE_VBLANK_START: u16 = 241;
const SCANLINE_PRE_RENDER: u16 = 261;

/// Picture unit register file as seen from the CPU bus.
///
/// Only the bus-visible contract lives here: register side effects, OAM,
/// nametable/palette RAM, and the vblank/NMI timing skeleton. The
/// rendering pipeline is a separate component that fetches pattern data
/// through the cartridge on its own.
#[derive(Deserialize, Serialize)]
pub struct Ppu {
    ctrl: u8,
    mask: u8,
    status: u8,

    oam_addr: u8,
    #[serde(with = "BigArray")]
    oam: [u8; 256],

    /// shared $2005/$2006 write toggle
    addr_latch: bool,
    scroll_x: u8,
    scroll_y: u8,
    temp_addr: u16,
    vram_addr: u16,
    /// delayed read buffer for $2007
    data_buffer: u8,

    #[serde(with = "BigArray")]
    tbl_name: [u8; 2 * 1024],
    tbl_palette: [u8; 32],
    /// CIRAM arrangement, dictated by the inserted cartridge
    mirror: Mirror,

    nmi_pending: bool,
    dot: u16,
    scanline: u16,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Ppu {
        Ppu {
            ctrl: 0x00,
            mask: 0x00,
            status: 0x00,
            oam_addr: 0x00,
            oam: [0; 256],
            addr_latch: false,
            scroll_x: 0x00,
            scroll_y: 0x00,
            temp_addr: 0x0000,
            vram_addr: 0x0000,
            data_buffer: 0x00,
            tbl_name: [0; 2 * 1024],
            tbl_palette: [0; 32],
            mirror: Mirror::Horizontal,
            nmi_pending: false,
            dot: 0,
            scanline: 0,
        }
    }

    fn vram_increment(&self) -> u16 {
        if self.ctrl & 0x04 != 0 { 32 } else { 1 }
    }

    fn palette_index(addr: u16) -> usize {
        let mut idx = (addr & 0x1f) as usize;
        // $3f10/$3f14/$3f18/$3f1c mirror the backdrop entries
        if idx >= 0x10 && idx % 4 == 0 {
            idx -= 0x10;
        }
        idx
    }

    /// resolve a nametable address to its CIRAM cell per the arrangement
    fn nametable_index(&self, addr: u16) -> usize {
        let table = ((addr >> 10) & 0x03) as usize;
        let offset = (addr & 0x03ff) as usize;
        let table = match self.mirror {
            Mirror::Vertical => table & 0x01,
            Mirror::Horizontal => table >> 1,
            Mirror::OneScreenLo => 0,
            Mirror::OneScreenHi => 1,
            // solder pads are resolved by the cartridge before they
            // reach the bus
            Mirror::Hardware => table & 0x01,
        };
        table * 0x0400 + offset
    }

    fn vram_read(&self, addr: u16) -> u8 {
        match addr & 0x3fff {
            // pattern tables live on the cartridge; the render pipeline
            // fetches them through its own bus
            0x0000..=0x1fff => 0x00,
            addr @ 0x2000..=0x3eff => self.tbl_name[self.nametable_index(addr)],
            addr => self.tbl_palette[Self::palette_index(addr)],
        }
    }

    fn vram_write(&mut self, addr: u16, data: u8) {
        match addr & 0x3fff {
            0x0000..=0x1fff => {}
            addr @ 0x2000..=0x3eff => self.tbl_name[self.nametable_index(addr)] = data,
            addr => self.tbl_palette[Self::palette_index(addr)] = data,
        }
    }
}

impl Device for Ppu {
    fn read_register(&mut self, offset: u8) -> u8 {
        match offset {
            // PPUSTATUS: reading clears vblank and resets the write latch.
            // The value is built before the clear so the CPU observes the
            // state at the time of the read.
            0x02 => {
                let data = (self.status & 0xe0) | (self.data_buffer & 0x1f);
                self.status &= 0x7f;
                self.addr_latch = false;
                data
            }
            // OAMDATA: attribute bytes have unimplemented bits
            0x04 => {
                let data = self.oam[self.oam_addr as usize];
                if self.oam_addr & 0x03 == 2 {
                    data & 0xe3
                } else {
                    data
                }
            }
            // PPUDATA: reads are delayed by one access through the data
            // buffer, except palette entries which come back directly.
            // Even then the buffer reloads from the nametable byte
            // underneath the palette address.
            0x07 => {
                let addr = self.vram_addr & 0x3fff;
                let data = if addr >= 0x3f00 {
                    self.data_buffer = self.vram_read(addr & 0x2fff);
                    self.vram_read(addr)
                } else {
                    let stale = self.data_buffer;
                    self.data_buffer = self.vram_read(addr);
                    stale
                };
                self.vram_addr = self.vram_addr.wrapping_add(self.vram_increment());
                data
            }
            // write-only registers
            _ => 0xff,
        }
    }

    fn read_register_ro(&self, offset: u8) -> u8 {
        match offset {
            0x02 => self.status,
            0x04 => self.oam[self.oam_addr as usize],
            0x07 => self.data_buffer,
            _ => 0xff,
        }
    }

    fn write_register(&mut self, offset: u8, data: u8) {
        match offset {
            // PPUCTRL: enabling NMI while vblank is already set raises one
            // immediately
            0x00 => {
                let nmi_was_enabled = self.ctrl & 0x80 != 0;
                self.ctrl = data;
                if !nmi_was_enabled && self.ctrl & 0x80 != 0 && self.status & 0x80 != 0 {
                    self.nmi_pending = true;
                }
            }
            0x01 => {
                self.mask = data;
            }
            // PPUSTATUS is read-only
            0x02 => {}
            0x03 => {
                self.oam_addr = data;
            }
            0x04 => {
                self.oam[self.oam_addr as usize] = data;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            // PPUSCROLL: x then y, sharing the latch with $2006
            0x05 => {
                if !self.addr_latch {
                    self.scroll_x = data;
                } else {
                    self.scroll_y = data;
                }
                self.addr_latch = !self.addr_latch;
            }
            // PPUADDR: high byte first
            0x06 => {
                if !self.addr_latch {
                    self.temp_addr = (self.temp_addr & 0x00ff) | (((data & 0x3f) as u16) << 8);
                } else {
                    self.temp_addr = (self.temp_addr & 0xff00) | data as u16;
                    self.vram_addr = self.temp_addr;
                }
                self.addr_latch = !self.addr_latch;
            }
            0x07 => {
                self.vram_write(self.vram_addr, data);
                self.vram_addr = self.vram_addr.wrapping_add(self.vram_increment());
            }
            _ => unreachable!(),
        }
    }

    fn set_mirroring(&mut self, mirror: Mirror) {
        self.mirror = mirror;
    }

    fn clock(&mut self) {
        self.dot += 1;
        if self.dot >= DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline >= SCANLINES_PER_FRAME {
                self.scanline = 0;
            }
        }

        if self.dot == 1 {
            if self.scanline == SCANLINE_VBLANK_START {
                self.status |= 0x80;
                if self.ctrl & 0x80 != 0 {
                    self.nmi_pending = true;
                }
            } else if self.scanline == SCANLINE_PRE_RENDER {
                // clear vblank / sprite 0 / overflow
                self.status &= 0x1f;
            }
        }
    }

    fn poll_interrupt(&mut self) -> Option<Interrupt> {
        if self.nmi_pending {
            self.nmi_pending = false;
            Some(Interrupt::Nmi)
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.ctrl = 0x00;
        self.mask = 0x00;
        self.addr_latch = false;
        self.scroll_x = 0x00;
        self.scroll_y = 0x00;
        self.temp_addr = 0x0000;
        self.vram_addr = 0x0000;
        self.data_buffer = 0x00;
        self.nmi_pending = false;
        self.dot = 0;
        self.scanline = 0;
    }
}
