// SPDX-License-Identifier: MIT

use core::fmt;

use uuid::Uuid;

/// How a GPT partition type affects synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GptKind {
    /// Firmware / OS plumbing: mirrored if it has an MBR equivalent, but on
    /// its own never a reason to sync.
    System,
    /// Regular data partition with a well known MBR equivalent.
    Data,
    /// Microsoft Basic Data: the MBR type depends on the filesystem inside.
    BasicData,
    /// The disk must not be touched when one of these is present.
    Fatal,
}

impl GptKind {
    #[inline]
    pub fn is_data(self) -> bool {
        matches!(self, GptKind::Data | GptKind::BasicData)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GptTypeDescriptor {
    pub guid: [u8; 16],
    pub name: &'static str,
    pub kind: GptKind,
    /// Equivalent MBR type byte, 0 if none.
    pub mbr_type: u8,
}

impl fmt::Display for GptTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Stand-in for any GUID missing from `GPT_TYPES`.
pub static GPT_TYPE_UNKNOWN: GptTypeDescriptor = GptTypeDescriptor {
    guid: [0u8; 16],
    name: "Unknown",
    kind: GptKind::Fatal,
    mbr_type: 0,
};

define_gpt_types! {
    EFI_SYSTEM => "EFI System", System, 0xEF,
        [0x28, 0x73, 0x2A, 0xC1, 0x1F, 0xF8, 0xD2, 0x11, 0xBA, 0x4B, 0x00, 0xA0, 0xC9, 0x3E, 0xC9, 0x3B],
    MBR_SCHEME => "MBR partition scheme", Fatal, 0,
        [0x41, 0xEE, 0x4D, 0x02, 0xE7, 0x33, 0xD3, 0x11, 0x9D, 0x69, 0x00, 0x08, 0xC7, 0x81, 0xF3, 0x9F],
    MS_RESERVED => "Microsoft Reserved", System, 0,
        [0x16, 0xE3, 0xC9, 0xE3, 0x5C, 0x0B, 0xB8, 0x4D, 0x81, 0x7D, 0xF9, 0x2D, 0xF0, 0x02, 0x15, 0xAE],
    BASIC_DATA => "Basic Data", BasicData, 0,
        [0xA2, 0xA0, 0xD0, 0xEB, 0xE5, 0xB9, 0x33, 0x44, 0x87, 0xC0, 0x68, 0xB6, 0xB7, 0x26, 0x99, 0xC7],
    LDM_METADATA => "Microsoft LDM metadata", Fatal, 0,
        [0xAA, 0xC8, 0x08, 0x58, 0x8F, 0x7E, 0xE0, 0x42, 0x85, 0xD2, 0xE1, 0xE9, 0x04, 0x34, 0xCF, 0xB3],
    LDM_DATA => "Microsoft LDM data", Fatal, 0,
        [0xA0, 0x60, 0x9B, 0xAF, 0x31, 0x14, 0x62, 0x4F, 0xBC, 0x68, 0x33, 0x11, 0x71, 0x4A, 0x69, 0xAD],
    WINDOWS_RECOVERY => "Windows Recovery", System, 0,
        [0xA4, 0xBB, 0x94, 0xDE, 0xD1, 0x06, 0x40, 0x4D, 0xA1, 0x6A, 0xBF, 0xD5, 0x01, 0x79, 0xD6, 0xAC],
    HPUX_DATA => "HP-UX Data", Data, 0,
        [0x1E, 0x4C, 0x89, 0x75, 0xEB, 0x3A, 0xD3, 0x11, 0xB7, 0xC1, 0x7B, 0x03, 0xA0, 0x00, 0x00, 0x00],
    HPUX_SERVICE => "HP-UX Service", System, 0,
        [0x28, 0xE7, 0xA1, 0xE2, 0xE3, 0x32, 0xD6, 0x11, 0xA6, 0x82, 0x7B, 0x03, 0xA0, 0x00, 0x00, 0x00],
    BIOS_BOOT => "BIOS Boot", System, 0,
        [0x48, 0x61, 0x68, 0x21, 0x49, 0x64, 0x6F, 0x6E, 0x74, 0x4E, 0x65, 0x65, 0x64, 0x45, 0x46, 0x49],
    LINUX_RAID => "Linux RAID", Data, 0xFD,
        [0x0F, 0x88, 0x9D, 0xA1, 0xFC, 0x05, 0x3B, 0x4D, 0xA0, 0x06, 0x74, 0x3F, 0x0F, 0x84, 0x91, 0x1E],
    LINUX_SWAP => "Linux Swap", System, 0x82,
        [0x6D, 0xFD, 0x57, 0x06, 0xAB, 0xA4, 0xC4, 0x43, 0x84, 0xE5, 0x09, 0x33, 0xC8, 0x4B, 0x4F, 0x4F],
    LINUX_LVM => "Linux LVM", Data, 0x8E,
        [0x79, 0xD3, 0xD6, 0xE6, 0x07, 0xF5, 0xC2, 0x44, 0xA2, 0x3C, 0x23, 0x8F, 0x2A, 0x3D, 0xF9, 0x28],
    LINUX_RESERVED => "Linux Reserved", System, 0,
        [0x39, 0x33, 0xA6, 0x8D, 0x07, 0x00, 0xC0, 0x60, 0xC4, 0x36, 0x08, 0x3A, 0xC8, 0x23, 0x09, 0x09],
    LINUX_FS => "Linux Filesystem", Data, 0x83,
        [0xAF, 0x3D, 0xC6, 0x0F, 0x83, 0x84, 0x72, 0x47, 0x8E, 0x79, 0x3D, 0x69, 0xD8, 0x47, 0x7D, 0xE4],
    FREEBSD_DATA => "FreeBSD Data", Data, 0xA5,
        [0xB4, 0x7C, 0x6E, 0x51, 0xCF, 0x6E, 0xD6, 0x11, 0x8F, 0xF8, 0x00, 0x02, 0x2D, 0x09, 0x71, 0x2B],
    FREEBSD_BOOT => "FreeBSD Boot", System, 0,
        [0x9D, 0x6B, 0xBD, 0x83, 0x41, 0x7F, 0xDC, 0x11, 0xBE, 0x0B, 0x00, 0x15, 0x60, 0xB8, 0x4F, 0x0F],
    FREEBSD_SWAP => "FreeBSD Swap", System, 0,
        [0xB5, 0x7C, 0x6E, 0x51, 0xCF, 0x6E, 0xD6, 0x11, 0x8F, 0xF8, 0x00, 0x02, 0x2D, 0x09, 0x71, 0x2B],
    FREEBSD_UFS => "FreeBSD UFS", Data, 0xA5,
        [0xB6, 0x7C, 0x6E, 0x51, 0xCF, 0x6E, 0xD6, 0x11, 0x8F, 0xF8, 0x00, 0x02, 0x2D, 0x09, 0x71, 0x2B],
    FREEBSD_VINUM => "FreeBSD Vinum", Data, 0,
        [0xB8, 0x7C, 0x6E, 0x51, 0xCF, 0x6E, 0xD6, 0x11, 0x8F, 0xF8, 0x00, 0x02, 0x2D, 0x09, 0x71, 0x2B],
    FREEBSD_ZFS => "FreeBSD ZFS", Data, 0,
        [0xBA, 0x7C, 0x6E, 0x51, 0xCF, 0x6E, 0xD6, 0x11, 0x8F, 0xF8, 0x00, 0x02, 0x2D, 0x09, 0x71, 0x2B],
    APPLE_HFS => "Mac OS X HFS+", Data, 0xAF,
        [0x00, 0x53, 0x46, 0x48, 0x00, 0x00, 0xAA, 0x11, 0xAA, 0x11, 0x00, 0x30, 0x65, 0x43, 0xEC, 0xAC],
    APPLE_UFS => "Mac OS X UFS", Data, 0xA8,
        [0x00, 0x53, 0x46, 0x55, 0x00, 0x00, 0xAA, 0x11, 0xAA, 0x11, 0x00, 0x30, 0x65, 0x43, 0xEC, 0xAC],
    APPLE_BOOT => "Mac OS X Boot", Data, 0xAB,
        [0x74, 0x6F, 0x6F, 0x42, 0x00, 0x00, 0xAA, 0x11, 0xAA, 0x11, 0x00, 0x30, 0x65, 0x43, 0xEC, 0xAC],
    APPLE_RAID => "Mac OS X RAID", Data, 0,
        [0x44, 0x49, 0x41, 0x52, 0x00, 0x00, 0xAA, 0x11, 0xAA, 0x11, 0x00, 0x30, 0x65, 0x43, 0xEC, 0xAC],
    APPLE_LABEL => "Mac OS X Label", System, 0,
        [0x65, 0x62, 0x61, 0x4C, 0x00, 0x6C, 0xAA, 0x11, 0xAA, 0x11, 0x00, 0x30, 0x65, 0x43, 0xEC, 0xAC],
    APPLE_APFS => "Apple APFS", Data, 0,
        [0xEF, 0x57, 0x34, 0x7C, 0x00, 0x00, 0xAA, 0x11, 0xAA, 0x11, 0x00, 0x30, 0x65, 0x43, 0xEC, 0xAC],
}

define_mbr_types! {
    FAT12 => 0x01, "FAT12",
    FAT16_SMALL => 0x04, "FAT16 <32M",
    EXTENDED => 0x05, "Extended",
    FAT16 => 0x06, "FAT16",
    NTFS => 0x07, "NTFS/HPFS/exFAT",
    FAT32_CHS => 0x0B, "FAT32 (CHS)",
    FAT32_LBA => 0x0C, "FAT32 (LBA)",
    FAT16_LBA => 0x0E, "FAT16 (LBA)",
    EXTENDED_LBA => 0x0F, "Extended (LBA)",
    LINUX_SWAP => 0x82, "Linux swap",
    LINUX => 0x83, "Linux",
    LINUX_EXTENDED => 0x85, "Linux extended",
    LINUX_LVM => 0x8E, "Linux LVM",
    FREEBSD => 0xA5, "FreeBSD",
    OPENBSD => 0xA6, "OpenBSD",
    MACOS_UFS => 0xA8, "Mac OS X UFS",
    MACOS_BOOT => 0xAB, "Mac OS X Boot",
    HFS_PLUS => 0xAF, "HFS+",
    EFI_PROTECTIVE => 0xEE, "EFI Protective",
    EFI_SYSTEM => 0xEF, "EFI System",
    LINUX_RAID => 0xFD, "Linux RAID",
}

/// Resolves a type GUID, falling back to `GPT_TYPE_UNKNOWN`.
pub fn lookup_gpt_type(guid: &[u8; 16]) -> &'static GptTypeDescriptor {
    GPT_TYPES
        .iter()
        .find(|d| &d.guid == guid)
        .unwrap_or(&GPT_TYPE_UNKNOWN)
}

/// Extended partition chains are never followed.
#[inline]
pub fn is_extended_type(mbr_type: u8) -> bool {
    matches!(
        mbr_type,
        MBR_TYPE_EXTENDED | MBR_TYPE_EXTENDED_LBA | MBR_TYPE_LINUX_EXTENDED
    )
}

/// Canonical textual form of an on-disk (mixed-endian) GUID.
#[inline]
pub fn guid_to_uuid(guid: &[u8; 16]) -> Uuid {
    Uuid::from_bytes_le(*guid)
}
