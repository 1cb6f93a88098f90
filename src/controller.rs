use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub enum ControllerInput {
    A,
    B,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
}

impl ControllerInput {
    fn mask(self) -> u8 {
        match self {
            ControllerInput::A => 0x80,
            ControllerInput::B => 0x40,
            ControllerInput::Select => 0x20,
            ControllerInput::Start => 0x10,
            ControllerInput::Up => 0x08,
            ControllerInput::Down => 0x04,
            ControllerInput::Left => 0x02,
            ControllerInput::Right => 0x01,
        }
    }
}

/// Standard controller port: a strobe-latched shift register.
///
/// While the strobe bit is high the shift register continuously reloads
/// from the live button state; once it drops, reads shift the snapshot
/// out serially, A button first.
#[derive(Deserialize, Serialize)]
pub struct Controller {
    /// live button state, updated by the frontend
    reg: u8,
    /// latched shift register
    state: u8,
    strobe: bool,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Controller {
        Controller {
            reg: 0x00,
            state: 0x00,
            strobe: false,
        }
    }

    pub fn update(&mut self, input: &[ControllerInput]) {
        let mut reg = 0x00;
        for i in input {
            reg |= i.mask();
        }
        self.reg = reg;
        if self.strobe {
            self.state = self.reg;
        }
    }

    pub fn write(&mut self, data: u8) {
        self.strobe = data & 0x01 != 0;
        if self.strobe {
            self.state = self.reg;
        }
    }

    pub fn read(&mut self) -> u8 {
        if self.strobe {
            // strobe held high: always report the A button
            return ((self.reg & 0x80) != 0) as u8;
        }
        let data = ((self.state & 0x80) != 0) as u8;
        self.state <<= 1;
        data
    }

    pub fn read_ro(&self) -> u8 {
        ((self.state & 0x80) != 0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strobe_latches_and_shifts() {
        let mut port = Controller::new();
        port.update(&[ControllerInput::A, ControllerInput::Start]);
        port.write(0x01);
        port.write(0x00);

        // serial order: A, B, Select, Start, Up, Down, Left, Right
        let bits: Vec<u8> = (0..8).map(|_| port.read()).collect();
        assert_eq!(bits, vec![1, 0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_strobe_high_repeats_a() {
        let mut port = Controller::new();
        port.update(&[ControllerInput::A]);
        port.write(0x01);
        assert_eq!(port.read(), 1);
        assert_eq!(port.read(), 1);
    }

    #[test]
    fn test_input_change_after_latch_is_invisible() {
        let mut port = Controller::new();
        port.update(&[ControllerInput::B]);
        port.write(0x01);
        port.write(0x00);
        port.update(&[]);
        assert_eq!(port.read(), 0); // A
        assert_eq!(port.read(), 1); // B, from the latched snapshot
    }

    #[test]
    fn test_read_ro_does_not_shift() {
        let mut port = Controller::new();
        port.update(&[ControllerInput::A]);
        port.write(0x01);
        port.write(0x00);
        assert_eq!(port.read_ro(), 1);
        assert_eq!(port.read_ro(), 1);
        assert_eq!(port.read(), 1);
    }
}
