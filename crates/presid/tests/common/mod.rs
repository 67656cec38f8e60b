//! Hand-assembled 6502 fixtures shared by the integration tests.

#![allow(dead_code)]

use presid::{AddressSpace, LoadedImage, parse_prg, parse_raw};
use presid_image::{
    SID_DATA_OFFSET, SID_INIT_ADDR, SID_LOAD_ADDR, SID_NAME, SID_PLAY_ADDR, SID_SONGS,
    SID_START_SONG, SID_VERSION,
};

pub const PLAYER_ADDR: u16 = 0xC000;
pub const DATA_ADDR: u16 = 0x1000;
pub const FLIPFLOP: u16 = 0x00F0;
pub const COUNTER: u16 = 0x00F4;

/// Frame-driven player: copies the first tune byte to `$0400`, bumps
/// `$0401`, increments the low byte of the frame counter and toggles the
/// flip-flop, forever.
pub const PLAYER_CODE: &[u8] = &[
    0xAD, 0x00, 0x10, // LDA $1000
    0x8D, 0x00, 0x04, // STA $0400
    0xEE, 0x01, 0x04, // INC $0401
    0xE6, 0xF4, //       INC $F4
    0xA5, 0xF0, //       LDA $F0
    0x49, 0x01, //       EOR #$01
    0x85, 0xF0, //       STA $F0
    0x4C, 0x00, 0xC0, // JMP $C000
];

/// Instructions executed per frame, including the closing `JMP`.
pub const PLAYER_STEPS_PER_FRAME: u64 = 8;

/// Player that never touches its flip-flop.
pub const STUCK_PLAYER_CODE: &[u8] = &[
    0xEE, 0x00, 0x04, // INC $0400
    0x4C, 0x00, 0xC0, // JMP $C000
];

pub fn prg(load_addr: u16, code: &[u8]) -> Vec<u8> {
    let mut file = load_addr.to_le_bytes().to_vec();
    file.extend_from_slice(code);
    file
}

pub fn player_image(code: &[u8]) -> LoadedImage {
    parse_prg(&prg(PLAYER_ADDR, code)).expect("player PRG parses")
}

/// Raw tune data with a two-byte junk prefix to skip.
pub fn tune_image() -> LoadedImage {
    parse_raw(&[0xFF, 0xFF, 0x05, 0x06, 0x07], DATA_ADDR, 2).expect("tune data fits")
}

pub const SID_INIT: u16 = 0x1000;
pub const SID_PLAY: u16 = 0x1004;

/// Init stores the subtune at `$1100`; play bumps `$1101` and sets the
/// SID volume register.
pub const SID_CODE: &[u8] = &[
    0x8D, 0x00, 0x11, // $1000 STA $1100
    0x60, //             $1003 RTS
    0xEE, 0x01, 0x11, // $1004 INC $1101
    0xA9, 0x0F, //       $1007 LDA #$0F
    0x8D, 0x18, 0xD4, // $1009 STA $D418
    0x60, //             $100C RTS
];

pub fn psid(code: &[u8], start_song: u16) -> Vec<u8> {
    let mut file = vec![0u8; 0x7C];
    file[0..4].copy_from_slice(b"PSID");
    let mut put = |offset: usize, value: u16| {
        file[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    };
    put(SID_VERSION, 2);
    put(SID_DATA_OFFSET, 0x7C);
    put(SID_LOAD_ADDR, SID_INIT);
    put(SID_INIT_ADDR, SID_INIT);
    put(SID_PLAY_ADDR, SID_PLAY);
    put(SID_SONGS, 4);
    put(SID_START_SONG, start_song);
    file[SID_NAME..SID_NAME + 9].copy_from_slice(b"Test Tune");
    file.extend_from_slice(code);
    file
}

/// Cells whose value differs between two address spaces.
pub fn differing(a: &AddressSpace, b: &AddressSpace) -> Vec<u16> {
    (0..=u16::MAX)
        .filter(|&addr| a.peek(addr) != b.peek(addr))
        .collect()
}
