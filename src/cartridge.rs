use crate::mapper::{
    BoardMapper, MapResult, Mapper, mapper000::Mapper000, mapper001::Mapper001,
    mapper002::Mapper002, mapper003::Mapper003,
};
use std::fs::File;
use std::io;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::mem;

use serde::{Deserialize, Serialize};
use sha1_smol::Sha1;

#[derive(Deserialize, Serialize)]
pub struct Cartridge {
    /// fingerprint of the image payload, used to match save states
    pub sha1_digest: String,

    mem_prg: Vec<u8>,
    mem_chr: Vec<u8>,
    /// CHR side is RAM (board without CHR ROM)
    chr_ram: bool,

    hw_mirror: Mirror,
    mapper: BoardMapper,
}

/// Nametable arrangement as reported to the picture unit.
#[derive(Copy, Clone, Debug, Deserialize, Serialize)]
pub enum Mirror {
    /// fixed by the cartridge solder pads (iNES header bit)
    Hardware,
    Vertical,
    Horizontal,
    OneScreenLo,
    OneScreenHi,
}

struct CartridgeHeader {
    name: [u8; 4],
    prg_rom_chunks: u8,
    chr_rom_chunks: u8,
    mapper1: u8,
    mapper2: u8,
    _prg_ram_size: u8,
    _tv_system1: u8,
    _tv_system2: u8,
    _unused: [u8; 5],
}

impl CartridgeHeader {
    fn load(reader: &mut impl io::Read) -> Result<Self, io::Error> {
        let mut buf = [0; mem::size_of::<CartridgeHeader>()];
        reader.read_exact(&mut buf)?;

        let header = CartridgeHeader {
            name: [buf[0], buf[1], buf[2], buf[3]],
            prg_rom_chunks: buf[4],
            chr_rom_chunks: buf[5],
            mapper1: buf[6],
            mapper2: buf[7],
            _prg_ram_size: buf[8],
            _tv_system1: buf[9],
            _tv_system2: buf[10],
            _unused: [buf[11], buf[12], buf[13], buf[14], buf[15]],
        };

        if header.name != *b"NES\x1a" {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "not an iNES image",
            ));
        }

        Ok(header)
    }
}

impl Cartridge {
    pub fn new(filename: &str) -> Result<Cartridge, io::Error> {
        let f = File::open(filename)?;
        let reader = io::BufReader::new(f);

        Self::from_reader(reader)
    }

    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Cartridge, io::Error> {
        let header = CartridgeHeader::load(&mut reader)?;

        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        let sha1_digest = Sha1::from(&data).digest().to_string();

        let mut reader = Cursor::new(data);

        // trainer data, if present, is skipped
        if header.mapper1 & 0x04 != 0 {
            let _junk = reader.seek(SeekFrom::Current(512))?;
        }
        let mapper_id = ((header.mapper2 >> 4) << 4) | (header.mapper1 >> 4);
        let hw_mirror = if header.mapper1 & 0x01 != 0 {
            Mirror::Vertical
        } else {
            Mirror::Horizontal
        };

        let num_banks_prg = header.prg_rom_chunks as usize;
        let num_banks_chr = header.chr_rom_chunks as usize;

        if num_banks_prg == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "image without PRG ROM",
            ));
        }

        let mapper = match mapper_id {
            0 => BoardMapper::Nrom(Mapper000::new(num_banks_prg, num_banks_chr)),
            1 => BoardMapper::Sxrom(Mapper001::new(num_banks_prg, num_banks_chr)),
            2 => BoardMapper::Uxrom(Mapper002::new(num_banks_prg, num_banks_chr)),
            3 => {
                // CNROM has no CHR RAM option, the bank select needs ROM
                if num_banks_chr == 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "CNROM image without CHR ROM",
                    ));
                }
                BoardMapper::Cnrom(Mapper003::new(num_banks_prg, num_banks_chr))
            }
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unsupported mapper: {mapper_id:03}"),
                ));
            }
        };

        let mut mem_prg = vec![0; num_banks_prg * 0x4000];
        reader.read_exact(&mut mem_prg)?;

        // boards without CHR ROM carry 8 kB of CHR RAM instead
        let chr_ram = num_banks_chr == 0;
        let mem_chr = if chr_ram {
            vec![0; 0x2000]
        } else {
            let mut m = vec![0; num_banks_chr * 0x2000];
            reader.read_exact(&mut m)?;
            m
        };

        Ok(Cartridge {
            sha1_digest,
            mem_prg,
            mem_chr,
            chr_ram,
            hw_mirror,
            mapper,
        })
    }

    pub fn cpu_read(&mut self, addr: u16) -> Option<u8> {
        match self.mapper.cpu_map_read(addr) {
            MapResult::MapAddr(mapped_addr) => Some(self.mem_prg[mapped_addr]),
            MapResult::DirectRead(v) => Some(v),
            _ => None,
        }
    }

    pub fn cpu_read_ro(&self, addr: u16) -> Option<u8> {
        match self.mapper.cpu_map_read_ro(addr) {
            MapResult::MapAddr(mapped_addr) => Some(self.mem_prg[mapped_addr]),
            MapResult::DirectRead(v) => Some(v),
            _ => None,
        }
    }

    pub fn cpu_write(&mut self, addr: u16, data: u8) -> bool {
        match self.mapper.cpu_map_write(addr, data) {
            MapResult::MapAddr(mapped_addr) => {
                self.mem_prg[mapped_addr] = data;
                true
            }
            MapResult::DirectWrite => true,
            _ => false,
        }
    }

    pub fn ppu_read(&mut self, addr: u16) -> Option<u8> {
        match self.mapper.ppu_map_read(addr) {
            MapResult::MapAddr(mapped_addr) => Some(self.mem_chr[mapped_addr]),
            MapResult::DirectRead(v) => Some(v),
            _ => None,
        }
    }

    pub fn ppu_write(&mut self, addr: u16, data: u8) -> bool {
        match self.mapper.ppu_map_write(addr, data) {
            MapResult::MapAddr(mapped_addr) => {
                self.mem_chr[mapped_addr] = data;
                true
            }
            MapResult::DirectWrite => true,
            _ => false,
        }
    }

    pub fn mirror(&self) -> Mirror {
        let m = self.mapper.mirror();
        match m {
            Mirror::Hardware => self.hw_mirror,
            _ => m,
        }
    }

    pub fn reset(&mut self) {
        self.mapper.reset();
    }
}

/// build an in-memory iNES image with PRG banks filled by bank index
#[cfg(test)]
pub(crate) fn test_rom(mapper_id: u8, num_banks_prg: u8, num_banks_chr: u8) -> Cursor<Vec<u8>> {
    let mut image = vec![
        b'N',
        b'E',
        b'S',
        0x1a,
        num_banks_prg,
        num_banks_chr,
        (mapper_id & 0x0f) << 4,
        mapper_id & 0xf0,
    ];
    image.resize(16, 0x00);
    for bank in 0..num_banks_prg {
        image.extend(std::iter::repeat_n(bank, 0x4000));
    }
    for bank in 0..num_banks_chr {
        image.extend(std::iter::repeat_n(0xc0 | bank, 0x2000));
    }
    Cursor::new(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_magic() {
        let rom = Cursor::new(vec![0u8; 32]);
        assert!(Cartridge::from_reader(rom).is_err());
    }

    #[test]
    fn test_rejects_unsupported_mapper() {
        let rom = test_rom(7, 1, 1);
        assert!(Cartridge::from_reader(rom).is_err());
    }

    #[test]
    fn test_rejects_zero_prg_banks() {
        let rom = test_rom(0, 0, 1);
        assert!(Cartridge::from_reader(rom).is_err());
    }

    #[test]
    fn test_rejects_cnrom_without_chr_rom() {
        let rom = test_rom(3, 1, 0);
        assert!(Cartridge::from_reader(rom).is_err());
    }

    #[test]
    fn test_nrom_single_bank_mirrors_prg() {
        let mut cart = Cartridge::from_reader(test_rom(0, 1, 1)).unwrap();
        assert_eq!(cart.cpu_read(0x8000), Some(0));
        assert_eq!(cart.cpu_read(0xc000), Some(0));
        assert_eq!(cart.cpu_read(0x7fff), None);
    }

    #[test]
    fn test_nrom_rejects_prg_writes() {
        let mut cart = Cartridge::from_reader(test_rom(0, 1, 1)).unwrap();
        assert!(!cart.cpu_write(0x8000, 0x55));
        assert_eq!(cart.cpu_read(0x8000), Some(0));
    }

    #[test]
    fn test_uxrom_bank_select() {
        let mut cart = Cartridge::from_reader(test_rom(2, 4, 0)).unwrap();
        // last bank fixed at $c000
        assert_eq!(cart.cpu_read(0x8000), Some(0));
        assert_eq!(cart.cpu_read(0xc000), Some(3));

        // the write is the bank-select command, and is not stored
        assert!(!cart.cpu_write(0x8000, 0x02));
        assert_eq!(cart.cpu_read(0x8000), Some(2));
        assert_eq!(cart.cpu_read(0xc000), Some(3));
    }

    /// clock a 5-bit value into the MMC1 serial port, LSB first
    fn mmc1_serial_write(cart: &mut Cartridge, addr: u16, value: u8) {
        for i in 0..5 {
            cart.cpu_write(addr, (value >> i) & 0x01);
        }
    }

    #[test]
    fn test_mmc1_prg_bank_select() {
        let mut cart = Cartridge::from_reader(test_rom(1, 4, 1)).unwrap();
        // power-on PRG mode 3: switchable at $8000, last bank fixed
        assert_eq!(cart.cpu_read(0x8000), Some(0));
        assert_eq!(cart.cpu_read(0xc000), Some(3));

        mmc1_serial_write(&mut cart, 0xe000, 0x02);
        assert_eq!(cart.cpu_read(0x8000), Some(2));
        assert_eq!(cart.cpu_read(0xc000), Some(3));
    }

    #[test]
    fn test_mmc1_reset_bit_restarts_serial_load() {
        let mut cart = Cartridge::from_reader(test_rom(1, 4, 1)).unwrap();
        // two bits in, then a reset write: the following full sequence
        // must not be contaminated by them
        cart.cpu_write(0xe000, 0x01);
        cart.cpu_write(0xe000, 0x01);
        cart.cpu_write(0xe000, 0x80);
        mmc1_serial_write(&mut cart, 0xe000, 0x01);
        assert_eq!(cart.cpu_read(0x8000), Some(1));
    }

    #[test]
    fn test_mmc1_mirror_select() {
        let mut cart = Cartridge::from_reader(test_rom(1, 2, 1)).unwrap();
        assert!(matches!(cart.mirror(), Mirror::Horizontal));
        // control = 0b00010: vertical arrangement
        mmc1_serial_write(&mut cart, 0x8000, 0x02);
        assert!(matches!(cart.mirror(), Mirror::Vertical));
    }

    #[test]
    fn test_cnrom_chr_bank_select() {
        let mut cart = Cartridge::from_reader(test_rom(3, 1, 2)).unwrap();
        assert_eq!(cart.ppu_read(0x0000), Some(0xc0));
        cart.cpu_write(0x8000, 0x01);
        assert_eq!(cart.ppu_read(0x0000), Some(0xc1));

        cart.reset();
        assert_eq!(cart.ppu_read(0x0000), Some(0xc0));
    }

    #[test]
    fn test_chr_ram_fallback() {
        let mut cart = Cartridge::from_reader(test_rom(0, 1, 0)).unwrap();
        assert!(cart.ppu_write(0x0123, 0x99));
        assert_eq!(cart.ppu_read(0x0123), Some(0x99));
    }

    #[test]
    fn test_hw_mirror_from_header() {
        let mut rom = test_rom(0, 1, 1);
        rom.get_mut()[6] |= 0x01; // vertical
        let cart = Cartridge::from_reader(rom).unwrap();
        assert!(matches!(cart.mirror(), Mirror::Vertical));
    }
}
