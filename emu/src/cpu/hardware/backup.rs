//! Cartridge save/backup memory.
//!
//! Real Game Paks carry one of a handful of mutually-exclusive backup chips: battery-backed
//! SRAM, one of two Flash variants, or a serial EEPROM. [`Backup`] is a tagged union over the
//! four kinds rather than the always-128KB-Flash hardcoding this module used to carry; the
//! byte-addressable paths (SRAM/Flash) keep the Flash command FSM that already lived here,
//! and EEPROM gets its own bit-serial protocol since it's accessed completely differently
//! (one data bit per 16-bit bus write/read, driven by DMA3).
//!
//! `Kind` is picked once, at load time, by [`Kind::detect`] scanning the ROM for the
//! `EEPROM_V`/`SRAM_V`/`FLASH_V`/`FLASH512_V`/`FLASH1M_V` id strings games embed for exactly
//! this purpose -- this is backup-engine bring-up, not game-title/checksum header parsing.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;

/// Which backup chip, if any, a loaded cartridge carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kind {
    None,
    Sram,
    Flash64K,
    Flash128K,
    /// `address_bits` is 6 for the 512-byte variant, 14 for the 8KB variant.
    Eeprom { address_bits: u8 },
}

impl Kind {
    /// Scans `rom` for one of the standard backup-id strings and returns the matching kind.
    /// Games that use EEPROM additionally encode the capacity in their DMA transfer lengths
    /// rather than the id string, so EEPROM here defaults to the larger, 14-bit variant; the
    /// DMA controller narrows it down the first time it sees a short EEPROM transfer.
    #[must_use]
    pub fn detect(rom: &[u8]) -> Self {
        const IDS: &[(&[u8], Kind)] = &[
            (b"EEPROM_V", Kind::Eeprom { address_bits: 14 }),
            (b"FLASH1M_V", Kind::Flash128K),
            (b"FLASH512_V", Kind::Flash64K),
            (b"FLASH_V", Kind::Flash64K),
            (b"SRAM_V", Kind::Sram),
        ];

        for window_start in (0..rom.len()).step_by(4) {
            for (id, kind) in IDS {
                let end = window_start + id.len();
                if end <= rom.len() && &rom[window_start..end] == *id {
                    return *kind;
                }
            }
        }
        Kind::None
    }
}

/// Flash memory command state machine (SST/Sanyo-style, as used by `Flash64K`/`Flash128K`).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum FlashState {
    #[default]
    Ready,
    Command1,
    Command2,
    IdMode,
    EraseCommand,
    EraseCommand1,
    EraseCommand2,
    BankSelect,
    WriteCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum EepromMode {
    Idle,
    Address,
    WriteData,
    ReadDummy,
    ReadData,
}

#[derive(Debug, Serialize, Deserialize)]
struct EepromChip {
    address_bits: u8,
    mode: EepromMode,
    /// Bits of the 2-bit read/write request, MSB received first.
    request: u8,
    request_bits: u8,
    address: u16,
    address_bits_received: u8,
    is_read: bool,
    shift: u64,
    shift_bits: u8,
    data: Vec<u8>,
}

impl EepromChip {
    fn new(address_bits: u8) -> Self {
        Self {
            address_bits,
            mode: EepromMode::Idle,
            request: 0,
            request_bits: 0,
            address: 0,
            address_bits_received: 0,
            is_read: false,
            shift: 0,
            shift_bits: 0,
            // 8KB for the 14-bit variant, 512B for the 6-bit variant, 8 bytes per slot.
            data: vec![0xFF; if address_bits >= 14 { 0x2000 } else { 0x0200 }],
        }
    }

    fn slot(&self) -> usize {
        (self.address as usize) * 8
    }

    /// Consumes a single serial bit written over the DMA-driven EEPROM port.
    fn write_bit(&mut self, bit: u8) -> bool {
        let mut dirty = false;
        match self.mode {
            EepromMode::Idle => {
                self.request = (self.request << 1) | bit;
                self.request_bits += 1;
                if self.request_bits == 2 {
                    self.is_read = self.request == 0b11;
                    self.address = 0;
                    self.address_bits_received = 0;
                    self.mode = EepromMode::Address;
                }
            }
            EepromMode::Address => {
                self.address = (self.address << 1) | u16::from(bit);
                self.address_bits_received += 1;
                if self.address_bits_received == self.address_bits {
                    self.address &= (1u16 << self.address_bits) - 1;
                    if self.is_read {
                        self.mode = EepromMode::ReadDummy;
                    } else {
                        self.shift = 0;
                        self.shift_bits = 0;
                        self.mode = EepromMode::WriteData;
                    }
                }
            }
            EepromMode::WriteData => {
                self.shift = (self.shift << 1) | u64::from(bit);
                self.shift_bits += 1;
                if self.shift_bits == 64 {
                    let slot = self.slot();
                    for i in 0..8 {
                        self.data[slot + i] = (self.shift >> (56 - i * 8)) as u8;
                    }
                    dirty = true;
                    self.mode = EepromMode::Idle;
                    self.request = 0;
                    self.request_bits = 0;
                }
            }
            EepromMode::ReadDummy | EepromMode::ReadData => {
                // Stray writes while a read is in progress reset the chip, matching the
                // real part's behaviour of ignoring a write-phase it didn't ask for.
                self.mode = EepromMode::Idle;
                self.request = u16::from(bit) as u8;
                self.request_bits = 1;
            }
        }
        dirty
    }

    /// Produces the next serial bit for a read in progress. Outside of a read, the bus
    /// floats high, matching the idle level of the serial line.
    fn read_bit(&mut self) -> u8 {
        match self.mode {
            EepromMode::ReadDummy => {
                self.shift_bits += 1;
                if self.shift_bits >= 4 {
                    let slot = self.slot();
                    let mut value: u64 = 0;
                    for i in 0..8 {
                        value = (value << 8) | u64::from(self.data[slot + i]);
                    }
                    self.shift = value;
                    self.shift_bits = 0;
                    self.mode = EepromMode::ReadData;
                }
                0
            }
            EepromMode::ReadData => {
                let bit = ((self.shift >> (63 - self.shift_bits)) & 1) as u8;
                self.shift_bits += 1;
                if self.shift_bits == 64 {
                    self.mode = EepromMode::Idle;
                    self.request = 0;
                    self.request_bits = 0;
                }
                bit
            }
            _ => 1,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Backup {
    kind: Kind,
    data: Vec<u8>,
    flash_state: FlashState,
    flash_bank: u8,
    eeprom: Option<EepromChip>,
    dirty: bool,
}

impl Backup {
    #[must_use]
    pub fn new(kind: Kind) -> Self {
        let size = match kind {
            Kind::None => 0,
            Kind::Sram => 0x0000_8000,
            Kind::Flash64K => 0x0001_0000,
            Kind::Flash128K => 0x0002_0000,
            Kind::Eeprom { .. } => 0,
        };
        Self {
            kind,
            data: vec![0xFF; size],
            flash_state: FlashState::Ready,
            flash_bank: 0,
            eeprom: match kind {
                Kind::Eeprom { address_bits } => Some(EepromChip::new(address_bits)),
                _ => None,
            },
            dirty: false,
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Loads previously saved battery-backed contents (SRAM/Flash only).
    pub fn load_save_data(&mut self, bytes: &[u8]) {
        if matches!(self.kind, Kind::Eeprom { .. }) {
            if let Some(eeprom) = &mut self.eeprom {
                let len = eeprom.data.len().min(bytes.len());
                eeprom.data[..len].copy_from_slice(&bytes[..len]);
            }
        } else {
            let len = self.data.len().min(bytes.len());
            self.data[..len].copy_from_slice(&bytes[..len]);
        }
    }

    #[must_use]
    pub fn save_data(&self) -> &[u8] {
        match &self.eeprom {
            Some(chip) => &chip.data,
            None => &self.data,
        }
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Widens the detected EEPROM kind once the DMA controller observes how many halfwords
    /// a transfer actually moves: 9 halfwords addresses the 512-byte part, 17 the 8KB part.
    pub fn narrow_eeprom_width(&mut self, address_bits: u8) {
        if let Kind::Eeprom { address_bits: current } = self.kind {
            if current != address_bits {
                self.kind = Kind::Eeprom { address_bits };
                self.eeprom = Some(EepromChip::new(address_bits));
            }
        }
    }

    #[must_use]
    pub fn read_byte(&self, offset: usize) -> u8 {
        match self.kind {
            Kind::None => 0xFF,
            Kind::Sram => self.data.get(offset & 0x7FFF).copied().unwrap_or(0xFF),
            Kind::Flash64K | Kind::Flash128K => self.read_flash(offset),
            Kind::Eeprom { .. } => 1,
        }
    }

    pub fn write_byte(&mut self, offset: usize, value: u8) {
        match self.kind {
            Kind::None => {}
            Kind::Sram => {
                let idx = offset & 0x7FFF;
                if self.data[idx] != value {
                    self.data[idx] = value;
                    self.dirty = true;
                }
            }
            Kind::Flash64K | Kind::Flash128K => self.write_flash(offset, value),
            Kind::Eeprom { .. } => {}
        }
    }

    /// Consumes one serial bit written through the DMA3 EEPROM port.
    pub fn eeprom_write_bit(&mut self, bit: u8) {
        if let Some(chip) = &mut self.eeprom {
            if chip.write_bit(bit) {
                self.dirty = true;
            }
        }
    }

    /// Reads one serial bit back through the DMA3 EEPROM port.
    #[must_use]
    pub fn eeprom_read_bit(&mut self) -> u8 {
        self.eeprom.as_mut().map_or(1, EepromChip::read_bit)
    }

    fn read_flash(&self, offset: usize) -> u8 {
        if self.flash_state == FlashState::IdMode {
            return match offset & 0xFFFF {
                0x0000 => 0x62, // Sanyo
                0x0001 => 0x13, // 1Mbit (128KB) part
                _ => 0xFF,
            };
        }
        let real_offset = (self.flash_bank as usize * 0x1_0000) + (offset & 0xFFFF);
        self.data.get(real_offset).copied().unwrap_or(0xFF)
    }

    #[allow(clippy::too_many_lines)]
    fn write_flash(&mut self, offset: usize, value: u8) {
        let offset = offset & 0xFFFF;
        match self.flash_state {
            FlashState::Ready => {
                if offset == 0x5555 && value == 0xAA {
                    self.flash_state = FlashState::Command1;
                }
            }
            FlashState::Command1 => {
                self.flash_state = if offset == 0x2AAA && value == 0x55 {
                    FlashState::Command2
                } else {
                    FlashState::Ready
                };
            }
            FlashState::Command2 => {
                self.flash_state = if offset == 0x5555 {
                    match value {
                        0x90 => FlashState::IdMode,
                        0xF0 => FlashState::Ready,
                        0x80 => FlashState::EraseCommand,
                        0xA0 => FlashState::WriteCommand,
                        0xB0 if self.kind == Kind::Flash128K => FlashState::BankSelect,
                        _ => FlashState::Ready,
                    }
                } else {
                    FlashState::Ready
                };
            }
            FlashState::IdMode => {
                if value == 0xF0 {
                    self.flash_state = FlashState::Ready;
                } else if offset == 0x5555 && value == 0xAA {
                    self.flash_state = FlashState::Command1;
                }
            }
            FlashState::EraseCommand => {
                self.flash_state = if offset == 0x5555 && value == 0xAA {
                    FlashState::EraseCommand1
                } else {
                    FlashState::Ready
                };
            }
            FlashState::EraseCommand1 => {
                self.flash_state = if offset == 0x2AAA && value == 0x55 {
                    FlashState::EraseCommand2
                } else {
                    FlashState::Ready
                };
            }
            FlashState::EraseCommand2 => {
                if value == 0x10 && offset == 0x5555 {
                    self.data.fill(0xFF);
                    self.dirty = true;
                } else if value == 0x30 {
                    let sector_base = (self.flash_bank as usize * 0x1_0000) + (offset & 0xF000);
                    for byte in self
                        .data
                        .iter_mut()
                        .skip(sector_base)
                        .take(0x1000)
                    {
                        *byte = 0xFF;
                    }
                    self.dirty = true;
                }
                self.flash_state = FlashState::Ready;
            }
            FlashState::BankSelect => {
                if offset == 0x0000 {
                    self.flash_bank = value & 0x01;
                }
                self.flash_state = FlashState::Ready;
            }
            FlashState::WriteCommand => {
                let real_offset = (self.flash_bank as usize * 0x1_0000) + offset;
                if let Some(byte) = self.data.get_mut(real_offset) {
                    byte.set_byte(0, byte.get_byte(0) & value);
                    self.dirty = true;
                }
                self.flash_state = FlashState::Ready;
            }
        }
    }
}

impl Default for Backup {
    fn default() -> Self {
        Self::new(Kind::None)
    }
}
