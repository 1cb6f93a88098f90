pub mod apu;
pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod decode;
pub mod device;
pub mod mapper;
pub mod memory;
pub mod ppu;
pub mod save;
pub mod system;
