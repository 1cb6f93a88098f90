use crate::apu::Apu;
use crate::bus::CpuBus;
use crate::cartridge::Cartridge;
use crate::controller::{Controller, ControllerInput};
use crate::decode::{Region, decode, mirror};
use crate::device::{Device, Interrupt};
use crate::memory::MirroredRam;
use crate::ppu::Ppu;

use serde::{Deserialize, Serialize};

/// open-bus power-on value, before anything has driven the bus
const OPEN_BUS_INITIAL: u8 = 0xff;

#[derive(Deserialize, Serialize)]
/// representation of the NES machine around its CPU memory bus
pub struct System {
    bus: Bus<Ppu, Apu>,
}

#[derive(Deserialize, Serialize)]
/// all devices and stores on the CPU memory bus
///
/// Generic over the two register devices so tests and debug frontends can
/// substitute mock devices for the real ones.
pub struct Bus<P: Device, A: Device> {
    /// on-board RAM (2 kB, mirrored across the 8 kB window)
    ram: MirroredRam<0x0800>,
    /// cartridge expansion window ($4020-$5fff)
    expansion: MirroredRam<0x1fe0>,
    /// cartridge work/save RAM window ($6000-$7fff)
    save_ram: MirroredRam<0x2000>,
    /// picture unit register file
    ppu: P,
    /// audio unit register file
    apu: A,
    /// controller ports (on the CPU die, not behind the APU)
    controller: [Controller; 2],
    /// currently inserted cartridge, if any
    cart: Option<Cartridge>,
    /// last byte driven on the bus, returned for unmapped reads
    open_bus: u8,
}

impl<P: Device, A: Device> Bus<P, A> {
    pub fn new(ppu: P, apu: A, cart: Option<Cartridge>) -> Bus<P, A> {
        Bus {
            ram: MirroredRam::new(0x0800),
            expansion: MirroredRam::new(0),
            save_ram: MirroredRam::new(0),
            ppu,
            apu,
            controller: [Controller::new(), Controller::new()],
            cart,
            open_bus: OPEN_BUS_INITIAL,
        }
    }

    /// OAM DMA: copy page `page << 8` into PPU OAM through 256 OAMDATA
    /// register writes. The CPU cycle stall is the caller's concern.
    fn oam_dma(&mut self, page: u8) {
        for lo in 0..=0xff {
            let data = self.cpu_read(((page as u16) << 8) | lo);
            self.ppu.write_register(0x04, data);
        }
    }
}

impl<P: Device, A: Device> CpuBus for Bus<P, A> {
    fn cpu_write(&mut self, addr: u16, data: u8) {
        self.open_bus = data;

        let (region, offset) = decode(addr);
        match region {
            Region::SystemRam => {
                self.ram.write_at(offset, data);
            }
            Region::PpuRegisters => {
                self.ppu.write_register(mirror(region, offset) as u8, data);
            }
            Region::ApuIoRegisters => match offset {
                // OAM DMA trigger
                0x14 => {
                    self.oam_dma(data);
                }
                // controller strobe
                0x16 => {
                    self.controller[0].write(data);
                    self.controller[1].write(data);
                }
                _ => {
                    self.apu.write_register(offset as u8, data);
                }
            },
            Region::ExpansionRom => {
                self.expansion.write_at(offset, data);
            }
            Region::SaveRam => {
                self.save_ram.write_at(offset, data);
            }
            Region::CartridgeSpace => {
                // the mapper sees every write first: it may be a
                // bank-select command. Unhandled writes target ROM and
                // are dropped silently.
                if let Some(cart) = &mut self.cart {
                    cart.cpu_write(addr, data);
                    // MMC1-class boards switch the nametable arrangement
                    // through bank-select writes
                    self.ppu.set_mirroring(cart.mirror());
                }
            }
        }
    }

    fn cpu_read(&mut self, addr: u16) -> u8 {
        let (region, offset) = decode(addr);
        let data = match region {
            Region::SystemRam => self.ram.read_at(offset),
            Region::PpuRegisters => self.ppu.read_register(mirror(region, offset) as u8),
            Region::ApuIoRegisters => match offset {
                0x16 | 0x17 => self.controller[(offset & 0x01) as usize].read(),
                _ => self.apu.read_register(offset as u8),
            },
            Region::ExpansionRom => self.expansion.read_at(offset),
            Region::SaveRam => self.save_ram.read_at(offset),
            Region::CartridgeSpace => match &mut self.cart {
                Some(cart) => cart.cpu_read(addr).unwrap_or(self.open_bus),
                None => self.open_bus,
            },
        };
        self.open_bus = data;
        data
    }

    fn cpu_read_ro(&self, addr: u16) -> u8 {
        let (region, offset) = decode(addr);
        match region {
            Region::SystemRam => self.ram.read_at(offset),
            Region::PpuRegisters => self.ppu.read_register_ro(mirror(region, offset) as u8),
            Region::ApuIoRegisters => match offset {
                0x16 | 0x17 => self.controller[(offset & 0x01) as usize].read_ro(),
                _ => self.apu.read_register_ro(offset as u8),
            },
            Region::ExpansionRom => self.expansion.read_at(offset),
            Region::SaveRam => self.save_ram.read_at(offset),
            Region::CartridgeSpace => match &self.cart {
                Some(cart) => cart.cpu_read_ro(addr).unwrap_or(self.open_bus),
                None => self.open_bus,
            },
        }
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

impl System {
    /// create the machine with no cartridge inserted
    pub fn new() -> System {
        System {
            bus: Bus::new(Ppu::new(), Apu::new(), None),
        }
    }

    pub fn with_cartridge(cart: Cartridge) -> System {
        let mut ppu = Ppu::new();
        ppu.set_mirroring(cart.mirror());
        System {
            bus: Bus::new(ppu, Apu::new(), Some(cart)),
        }
    }

    pub fn read(&mut self, addr: u16) -> u8 {
        self.bus.cpu_read(addr)
    }

    /// read without register side effects (debugger view)
    pub fn read_ro(&self, addr: u16) -> u8 {
        self.bus.cpu_read_ro(addr)
    }

    pub fn write(&mut self, addr: u16, data: u8) {
        self.bus.cpu_write(addr, data);
    }

    /// advance the machine one PPU clock and report any interrupt the
    /// devices raised. NMI wins if both lines are pending.
    pub fn clock(&mut self) -> Option<Interrupt> {
        self.bus.ppu.clock();
        self.bus.apu.clock();

        if let Some(int) = self.bus.ppu.poll_interrupt() {
            return Some(int);
        }
        self.bus.apu.poll_interrupt()
    }

    /// install a cartridge, releasing any previous one
    pub fn insert_cartridge(&mut self, cart: Cartridge) {
        self.bus.ppu.set_mirroring(cart.mirror());
        self.bus.cart = Some(cart);
    }

    pub fn eject_cartridge(&mut self) -> Option<Cartridge> {
        self.bus.cart.take()
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.bus.cart.as_ref()
    }

    /// reset all components; RAM contents survive as on hardware
    pub fn reset(&mut self) {
        if let Some(cart) = &mut self.bus.cart {
            cart.reset();
        }
        self.bus.ppu.reset();
        self.bus.apu.reset();
        self.bus.open_bus = OPEN_BUS_INITIAL;
    }

    /// update controller ports with new input data
    pub fn controller_update(&mut self, input1: &[ControllerInput], input2: &[ControllerInput]) {
        self.bus.controller[0].update(input1);
        self.bus.controller[1].update(input2);
    }
}
