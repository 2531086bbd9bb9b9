// SPDX-License-Identifier: MIT

//! Minimal legacy boot code, installed when the MBR has none.
//!
//! Relocates itself from 0x7C00 to 0x0600, looks for the active entry in the
//! partition table, loads that partition's first sector to 0x7C00 through
//! INT 13h extensions (LBA) and jumps to it with DS:SI pointing at the
//! entry. Errors are printed through INT 10h and the CPU is halted.

/// Fallback boot code blob, placed at offset 0 of sector 0.
pub const FALLBACK_BOOT_CODE: [u8; 200] = [
    // 0x00: cli; zero segments; stack below 0x7C00; copy 512 bytes to 0x0600
    0xFA, 0x31, 0xC0, 0x8E, 0xD0, 0xBC, 0x00, 0x7C, 0x8E, 0xD8, 0x8E, 0xC0, 0xFB, 0xBE, 0x00,
    0x7C, 0xBF, 0x00, 0x06, 0xB9, 0x00, 0x01, 0xFC, 0xF3, 0xA5,
    // jmp 0000:061E
    0xEA, 0x1E, 0x06, 0x00, 0x00,
    // 0x1E: si = partition table, cx = 4
    0xBE, 0xBE, 0x07, 0xB9, 0x04, 0x00,
    // 0x24: scan for boot flag 0x80, else "No active partition"
    0x80, 0x3C, 0x80, 0x74, 0x07, 0x83, 0xC6, 0x10, 0xE2, 0xF6, 0xEB, 0x36,
    // 0x30: copy start LBA into the DAP, INT 13h AH=42h, check 0xAA55, jump
    0x8B, 0x44, 0x08, 0xA3, 0x7D, 0x06, 0x8B, 0x44, 0x0A, 0xA3, 0x7F, 0x06, 0x56, 0xBE, 0x75,
    0x06, 0xB4, 0x42, 0xCD, 0x13, 0x5E, 0x72, 0x24, 0x81, 0x3E, 0xFE, 0x7D, 0x55, 0xAA, 0x75,
    0x21, 0xEA, 0x00, 0x7C, 0x00, 0x00,
    // 0x54: print zero-terminated string at si
    0xAC, 0x84, 0xC0, 0x74, 0x09, 0xB4, 0x0E, 0xBB, 0x07, 0x00, 0xCD, 0x10, 0xEB, 0xF2,
    // 0x62: halt forever
    0xFA, 0xF4, 0xEB, 0xFC,
    // 0x66, 0x6B, 0x70: error message stubs
    0xBE, 0x85, 0x06, 0xEB, 0xE9,
    0xBE, 0x9B, 0x06, 0xEB, 0xE4,
    0xBE, 0xAD, 0x06, 0xEB, 0xDF,
    // 0x75: disk address packet, 1 sector to 0000:7C00
    0x10, 0x00, 0x01, 0x00, 0x00, 0x7C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00,
    // 0x85: "No active partition\r\n"
    b'N', b'o', b' ', b'a', b'c', b't', b'i', b'v', b'e', b' ', b'p', b'a', b'r', b't', b'i',
    b't', b'i', b'o', b'n', b'\r', b'\n', 0x00,
    // 0x9B: "Disk read error\r\n"
    b'D', b'i', b's', b'k', b' ', b'r', b'e', b'a', b'd', b' ', b'e', b'r', b'r', b'o', b'r',
    b'\r', b'\n', 0x00,
    // 0xAD: "Missing operating system\r\n"
    b'M', b'i', b's', b's', b'i', b'n', b'g', b' ', b'o', b'p', b'e', b'r', b'a', b't', b'i',
    b'n', b'g', b' ', b's', b'y', b's', b't', b'e', b'm', b'\r', b'\n', 0x00,
];
