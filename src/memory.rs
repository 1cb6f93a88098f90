use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

/// Fixed-size byte store that repeats across a larger address window.
///
/// `period` is the mirror period in bytes; 0 means the store covers its
/// window one-to-one. When mirroring applies the period equals the store
/// capacity, so the effective index is `offset % period`.
#[derive(Deserialize, Serialize)]
pub struct MirroredRam<const N: usize> {
    #[serde(with = "BigArray")]
    bytes: [u8; N],
    period: u16,
}

impl<const N: usize> MirroredRam<N> {
    pub fn new(period: u16) -> MirroredRam<N> {
        debug_assert!(period == 0 || period as usize == N);
        MirroredRam {
            bytes: [0; N],
            period,
        }
    }

    fn index(&self, offset: u16) -> usize {
        // out-of-window offsets are a caller bug; the decoder guarantees
        // they cannot occur
        let idx = match self.period {
            0 => offset as usize,
            period => (offset % period) as usize,
        };
        debug_assert!(idx < N);
        idx
    }

    pub fn read_at(&self, offset: u16) -> u8 {
        self.bytes[self.index(offset)]
    }

    pub fn write_at(&mut self, offset: u16, data: u8) {
        let idx = self.index(offset);
        self.bytes[idx] = data;
    }

    pub fn clear(&mut self) {
        self.bytes = [0; N];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirrored_indexing() {
        let mut ram: MirroredRam<0x0800> = MirroredRam::new(0x0800);
        ram.write_at(0x0000, 0x42);
        assert_eq!(ram.read_at(0x0000), 0x42);
        assert_eq!(ram.read_at(0x0800), 0x42);
        assert_eq!(ram.read_at(0x1800), 0x42);

        ram.write_at(0x1fff, 0x7e);
        assert_eq!(ram.read_at(0x07ff), 0x7e);
        assert_eq!(ram.read_at(0x0fff), 0x7e);
    }

    #[test]
    fn test_unmirrored_indexing() {
        let mut ram: MirroredRam<0x2000> = MirroredRam::new(0);
        ram.write_at(0x0000, 0x01);
        ram.write_at(0x1fff, 0x02);
        assert_eq!(ram.read_at(0x0000), 0x01);
        assert_eq!(ram.read_at(0x1fff), 0x02);
    }

    #[test]
    fn test_clear() {
        let mut ram: MirroredRam<0x0800> = MirroredRam::new(0x0800);
        ram.write_at(0x0123, 0xff);
        ram.clear();
        assert_eq!(ram.read_at(0x0123), 0x00);
    }
}
