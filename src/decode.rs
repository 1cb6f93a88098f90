//! CPU address decoding.
//!
//! Pure mapping from a 16-bit CPU address to the hardware region it lands
//! in, kept free of any device state so the mirroring arithmetic can be
//! tested on its own.

/// hardware region on the CPU memory bus
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Region {
    /// on-board RAM, 2 kB mirrored across 0x0000-0x1fff
    SystemRam,
    /// PPU register file, 8 bytes mirrored across 0x2000-0x3fff
    PpuRegisters,
    /// APU and IO registers, 0x4000-0x401f
    ApuIoRegisters,
    /// cartridge expansion window, 0x4020-0x5fff
    ExpansionRom,
    /// cartridge work/save RAM window, 0x6000-0x7fff
    SaveRam,
    /// PRG ROM window, 0x8000-0xffff, mapper controlled
    CartridgeSpace,
}

impl Region {
    /// first address of the region's window
    pub const fn base(self) -> u16 {
        match self {
            Region::SystemRam => 0x0000,
            Region::PpuRegisters => 0x2000,
            Region::ApuIoRegisters => 0x4000,
            Region::ExpansionRom => 0x4020,
            Region::SaveRam => 0x6000,
            Region::CartridgeSpace => 0x8000,
        }
    }

    /// window size in bytes
    pub const fn size(self) -> usize {
        match self {
            Region::SystemRam => 0x2000,
            Region::PpuRegisters => 0x2000,
            Region::ApuIoRegisters => 0x0020,
            Region::ExpansionRom => 0x1fe0,
            Region::SaveRam => 0x2000,
            Region::CartridgeSpace => 0x8000,
        }
    }

    /// mirror period of the window, 0 = no mirroring
    pub const fn mirror_period(self) -> u16 {
        match self {
            Region::SystemRam => 0x0800,
            Region::PpuRegisters => 0x0008,
            _ => 0,
        }
    }
}

/// Decode a CPU address into its region and the raw offset inside the
/// region window (not yet reduced by the mirror period).
///
/// Total over all of 0x0000-0xffff: every address resolves to exactly one
/// region, so the bus never has an "unknown address" case to handle.
pub fn decode(addr: u16) -> (Region, u16) {
    let region = match addr {
        0x0000..=0x1fff => Region::SystemRam,
        0x2000..=0x3fff => Region::PpuRegisters,
        0x4000..=0x401f => Region::ApuIoRegisters,
        0x4020..=0x5fff => Region::ExpansionRom,
        0x6000..=0x7fff => Region::SaveRam,
        0x8000..=0xffff => Region::CartridgeSpace,
    };
    (region, addr - region.base())
}

/// Reduce a window offset by the region's mirror period. Identity for
/// unmirrored regions.
pub fn mirror(region: Region, offset: u16) -> u16 {
    match region.mirror_period() {
        0 => offset,
        period => offset % period,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_REGIONS: [Region; 6] = [
        Region::SystemRam,
        Region::PpuRegisters,
        Region::ApuIoRegisters,
        Region::ExpansionRom,
        Region::SaveRam,
        Region::CartridgeSpace,
    ];

    #[test]
    fn test_windows_partition_address_space() {
        // regions must tile 0x0000-0xffff with no gaps and no overlaps
        let mut next = 0usize;
        for region in ALL_REGIONS {
            assert_eq!(region.base() as usize, next);
            next += region.size();
        }
        assert_eq!(next, 0x10000);
    }

    #[test]
    fn test_decode_is_consistent_with_windows() {
        for addr in 0..=0xffffu16 {
            let (region, offset) = decode(addr);
            assert_eq!(addr as usize, region.base() as usize + offset as usize);
            assert!((offset as usize) < region.size());
        }
    }

    #[test]
    fn test_mirror_period_divides_window() {
        for region in ALL_REGIONS {
            let period = region.mirror_period() as usize;
            if period != 0 {
                assert_eq!(region.size() % period, 0);
            }
        }
    }

    #[test]
    fn test_region_boundaries() {
        assert_eq!(decode(0x0000).0, Region::SystemRam);
        assert_eq!(decode(0x1fff).0, Region::SystemRam);
        assert_eq!(decode(0x2000).0, Region::PpuRegisters);
        assert_eq!(decode(0x3fff).0, Region::PpuRegisters);
        assert_eq!(decode(0x4000).0, Region::ApuIoRegisters);
        assert_eq!(decode(0x401f).0, Region::ApuIoRegisters);
        assert_eq!(decode(0x4020).0, Region::ExpansionRom);
        assert_eq!(decode(0x5fff).0, Region::ExpansionRom);
        assert_eq!(decode(0x6000).0, Region::SaveRam);
        assert_eq!(decode(0x7fff).0, Region::SaveRam);
        assert_eq!(decode(0x8000).0, Region::CartridgeSpace);
        assert_eq!(decode(0xffff).0, Region::CartridgeSpace);
    }

    #[test]
    fn test_ram_mirror_offsets() {
        for addr in 0x0000..=0x1fffu16 {
            let (region, offset) = decode(addr);
            assert_eq!(mirror(region, offset), addr % 0x0800);
        }
    }

    #[test]
    fn test_ppu_register_mirror_offsets() {
        for addr in 0x2000..=0x3fffu16 {
            let (region, offset) = decode(addr);
            assert_eq!(mirror(region, offset), (addr - 0x2000) % 8);
        }
    }
}
