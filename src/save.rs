use crate::system::System;
use directories::BaseDirs;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

pub struct SaveState {
    pub save_file: String,
}

impl SaveState {
    pub fn new(rom_filename: &str) -> SaveState {
        // find & create save directory
        let base_dirs = BaseDirs::new().unwrap();
        let mut save_file_buf = PathBuf::new();
        save_file_buf.push(base_dirs.data_dir());
        save_file_buf.push("famibus");
        save_file_buf.push("saves");

        std::fs::create_dir_all(&save_file_buf).unwrap();

        // get save file name
        let rom_file_path = Path::new(rom_filename);
        let rom_file_stem = rom_file_path.file_stem().unwrap();
        save_file_buf.push(rom_file_stem);
        save_file_buf.set_extension("sav");

        SaveState {
            save_file: String::from(save_file_buf.to_str().unwrap()),
        }
    }

    pub fn load(&self) -> Option<System> {
        let save_file_path = Path::new(&self.save_file);
        if save_file_path.is_file() {
            let reader = BufReader::new(File::open(&self.save_file).unwrap());
            let mut decoder = ZlibDecoder::new(reader);
            bincode::deserialize_from(&mut decoder).ok()
        } else {
            None
        }
    }

    /// load only if the state was taken from the same ROM image
    pub fn load_for_rom(&self, sha1_digest: &str) -> Option<System> {
        let system = self.load()?;
        match system.cartridge() {
            Some(cart) if cart.sha1_digest == sha1_digest => Some(system),
            _ => None,
        }
    }

    pub fn save(&self, system: &System) -> bool {
        let save_file_path = Path::new(&self.save_file);
        let writer = BufWriter::new(File::create(save_file_path).unwrap());
        let mut encoder = ZlibEncoder::new(writer, Compression::best());
        bincode::serialize_into(&mut encoder, &system).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::{Cartridge, test_rom};

    fn temp_save(name: &str) -> SaveState {
        let mut path = std::env::temp_dir();
        path.push(name);
        SaveState {
            save_file: String::from(path.to_str().unwrap()),
        }
    }

    #[test]
    fn test_round_trip() {
        let cart = Cartridge::from_reader(test_rom(2, 4, 0)).unwrap();
        let mut system = System::with_cartridge(cart);
        system.write(0x0123, 0x42);
        system.write(0x8000, 0x02); // switch to bank 2

        let state = temp_save("famibus_round_trip.sav");
        assert!(state.save(&system));

        let mut restored = state.load().unwrap();
        assert_eq!(restored.read(0x0123), 0x42);
        assert_eq!(restored.read(0x8000), 2);

        std::fs::remove_file(&state.save_file).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let state = temp_save("famibus_no_such_state.sav");
        assert!(state.load().is_none());
    }

    #[test]
    fn test_signature_mismatch_is_rejected() {
        let cart = Cartridge::from_reader(test_rom(0, 1, 1)).unwrap();
        let digest = cart.sha1_digest.clone();
        let system = System::with_cartridge(cart);

        let state = temp_save("famibus_signature.sav");
        assert!(state.save(&system));

        assert!(state.load_for_rom(&digest).is_some());
        assert!(state.load_for_rom("0000000000").is_none());

        std::fs::remove_file(&state.save_file).unwrap();
    }
}
