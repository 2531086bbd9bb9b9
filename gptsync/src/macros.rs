// SPDX-License-Identifier: MIT

#[macro_export]
/// Defines the table of known GPT partition types.
///
/// This macro generates:
/// - A constant `[u8; 16]` for each partition type GUID (on-disk byte order).
/// - A `GPT_TYPES` slice of `GptTypeDescriptor`, in declaration order.
///
/// # Example
/// ```rust,ignore
/// define_gpt_types! {
///     EFI_SYSTEM => "EFI System", System, 0xEF,
///         [0x28, 0x73, 0x2A, 0xC1, 0x1F, 0xF8, 0xD2, 0x11, 0xBA, 0x4B, 0x00, 0xA0, 0xC9, 0x3E, 0xC9, 0x3B],
/// }
/// ```
///
/// # Parameters
/// - `$name`: Identifier for the partition type (used for the constant name).
/// - `$desc`: Human readable name.
/// - `$kind`: A `GptKind` variant.
/// - `$mbr`: Equivalent legacy MBR type byte, `0` if none.
/// - `$guid`: 16-byte array representing the partition type GUID.
///
/// # Note
/// This macro requires the `paste` crate for identifier concatenation.
macro_rules! define_gpt_types {
    (
        $(
            $name:ident => $desc:expr, $kind:ident, $mbr:expr, $guid:expr
        ),+ $(,)?
    ) => {
        paste::paste! {
            $(
                #[doc = $desc]
                pub const [<GPT_TYPE_ $name:upper>]: [u8; 16] = $guid;
            )+

            /// Every known GPT partition type.
            pub static GPT_TYPES: &[$crate::types::GptTypeDescriptor] = &[
                $(
                    $crate::types::GptTypeDescriptor {
                        guid: [<GPT_TYPE_ $name:upper>],
                        name: $desc,
                        kind: $crate::types::GptKind::$kind,
                        mbr_type: $mbr,
                    },
                )+
            ];
        }
    };
}

#[macro_export]
/// Defines the legacy MBR partition type bytes that have a name.
///
/// Generates a `pub const MBR_TYPE_<NAME>: u8` per entry and
/// `mbr_type_name(u8) -> &'static str`, which returns `"Unknown"` for
/// anything not listed.
macro_rules! define_mbr_types {
    (
        $(
            $name:ident => $value:expr, $desc:expr
        ),+ $(,)?
    ) => {
        paste::paste! {
            $(
                #[doc = $desc]
                pub const [<MBR_TYPE_ $name:upper>]: u8 = $value;
            )+

            /// Human readable name of a legacy MBR partition type.
            pub fn mbr_type_name(mbr_type: u8) -> &'static str {
                match mbr_type {
                    $([<MBR_TYPE_ $name:upper>] => $desc,)+
                    _ => "Unknown",
                }
            }
        }
    };
}
