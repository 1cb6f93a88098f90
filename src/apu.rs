use crate::device::{Device, Interrupt};

use serde::{Deserialize, Serialize};

/// Audio unit register file as seen from the CPU bus.
///
/// Sound synthesis lives in a separate component; this keeps the
/// bus-visible contract: write-only channel registers, the $4015
/// enable/status register, and the frame counter with its IRQ.
#[derive(Deserialize, Serialize)]
pub struct Apu {
    /// channel register latches $4000-$4013 (write-only on hardware)
    regs: [u8; 0x14],
    enable_pulse: [bool; 2],
    enable_triangle: bool,
    enable_noise: bool,
    enable_dmc: bool,
    frame_counter: FrameCounter,
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

impl Apu {
    pub fn new() -> Apu {
        Apu {
            regs: [0; 0x14],
            enable_pulse: [false; 2],
            enable_triangle: false,
            enable_noise: false,
            enable_dmc: false,
            frame_counter: FrameCounter::new(),
        }
    }
}

impl Device for Apu {
    fn read_register(&mut self, offset: u8) -> u8 {
        match offset {
            // $4015: channel status plus frame IRQ flag. Reading clears
            // the frame IRQ flag but not the channel state.
            0x15 => {
                let data = self.read_register_ro(offset);
                self.frame_counter.flag_irq = false;
                data
            }
            _ => 0x00,
        }
    }

    fn read_register_ro(&self, offset: u8) -> u8 {
        match offset {
            0x15 => {
                let mut status = 0;
                status |= self.enable_pulse[0] as u8;
                status |= (self.enable_pulse[1] as u8) << 1;
                status |= (self.enable_triangle as u8) << 2;
                status |= (self.enable_noise as u8) << 3;
                status |= (self.enable_dmc as u8) << 4;
                status |= (self.frame_counter.flag_irq as u8) << 6;
                status
            }
            _ => 0x00,
        }
    }

    fn write_register(&mut self, offset: u8, data: u8) {
        match offset {
            0x00..=0x13 => {
                self.regs[offset as usize] = data;
            }
            0x15 => {
                self.enable_pulse[0] = (data & 0x01) != 0;
                self.enable_pulse[1] = (data & 0x02) != 0;
                self.enable_triangle = (data & 0x04) != 0;
                self.enable_noise = (data & 0x08) != 0;
                self.enable_dmc = (data & 0x10) != 0;
            }
            0x17 => {
                self.frame_counter.mode = if (data & 0x80) != 0 {
                    FrameCounterMode::Step5
                } else {
                    FrameCounterMode::Step4
                };
                self.frame_counter.flag_irq_inhibit = (data & 0x40) != 0;
                if self.frame_counter.flag_irq_inhibit {
                    self.frame_counter.flag_irq = false;
                }
            }
            _ => {}
        }
    }

    fn clock(&mut self) {
        self.frame_counter.clock();
    }

    fn poll_interrupt(&mut self) -> Option<Interrupt> {
        if self.frame_counter.flag_irq {
            Some(Interrupt::Irq)
        } else {
            None
        }
    }

    fn reset(&mut self) {
        // $4015 is cleared on reset, the channel latches survive
        self.enable_pulse = [false; 2];
        self.enable_triangle = false;
        self.enable_noise = false;
        self.enable_dmc = false;
        self.frame_counter = FrameCounter::new();
    }
}

#[derive(Deserialize, PartialEq, Serialize)]
enum FrameCounterMode {
    Step4,
    Step5,
}

#[derive(Deserialize, Serialize)]
struct FrameCounter {
    flag_irq_inhibit: bool,
    flag_irq: bool,
    mode: FrameCounterMode,
    ppu_clock_counter: usize,
}

impl FrameCounter {
    fn new() -> FrameCounter {
        FrameCounter {
            flag_irq_inhibit: false,
            flag_irq: false,
            ppu_clock_counter: 0,
            mode: FrameCounterMode::Step4,
        }
    }

    fn clock(&mut self) {
        self.ppu_clock_counter += 1;

        let cycle_steps: [usize; 4] = match self.mode {
            FrameCounterMode::Step4 => [22371, 44739, 67113, 89484],
            FrameCounterMode::Step5 => [22371, 44739, 67113, 111843],
        };

        if !self.flag_irq_inhibit
            && self.mode == FrameCounterMode::Step4
            && (self.ppu_clock_counter == cycle_steps[3] - 3
                || self.ppu_clock_counter == cycle_steps[3]
                || self.ppu_clock_counter == cycle_steps[3] + 3)
        {
            self.flag_irq = true;
        }

        if self.ppu_clock_counter == cycle_steps[3] + 3 {
            self.ppu_clock_counter = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_flags_report_in_status() {
        let mut apu = Apu::new();
        apu.write_register(0x15, 0x05); // pulse 1 + triangle
        assert_eq!(apu.read_register(0x15) & 0x1f, 0x05);
        apu.write_register(0x15, 0x00);
        assert_eq!(apu.read_register(0x15) & 0x1f, 0x00);
    }

    #[test]
    fn test_status_read_clears_frame_irq() {
        let mut apu = Apu::new();
        // run a full 4-step sequence
        for _ in 0..89485 {
            apu.clock();
        }
        assert_eq!(apu.poll_interrupt(), Some(Interrupt::Irq));
        assert_eq!(apu.read_register(0x15) & 0x40, 0x40);
        // flag cleared by the read
        assert_eq!(apu.poll_interrupt(), None);
        assert_eq!(apu.read_register(0x15) & 0x40, 0x00);
    }

    #[test]
    fn test_irq_inhibit_suppresses_and_clears() {
        let mut apu = Apu::new();
        for _ in 0..89485 {
            apu.clock();
        }
        assert_eq!(apu.poll_interrupt(), Some(Interrupt::Irq));
        apu.write_register(0x17, 0x40);
        assert_eq!(apu.poll_interrupt(), None);
    }

    #[test]
    fn test_step5_mode_raises_no_irq() {
        let mut apu = Apu::new();
        apu.write_register(0x17, 0x80);
        for _ in 0..120000 {
            apu.clock();
        }
        assert_eq!(apu.poll_interrupt(), None);
    }

    #[test]
    fn test_channel_registers_are_write_only() {
        let mut apu = Apu::new();
        apu.write_register(0x00, 0xbf);
        assert_eq!(apu.read_register(0x00), 0x00);
        assert_eq!(apu.regs[0x00], 0xbf);
    }
}
