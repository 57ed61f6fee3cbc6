// Copyright (c) 2019-present Dmitry Stepanov and Fyrox Engine contributors.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Lower-case Vulkan format names accepted by `#set vs_location`, `#set rt` and `#set ds`.

use ash::vk;

static FORMATS: &[(&str, vk::Format)] = &[
    ("r8_unorm", vk::Format::R8_UNORM),
    ("r8_snorm", vk::Format::R8_SNORM),
    ("r8_uint", vk::Format::R8_UINT),
    ("r8_sint", vk::Format::R8_SINT),
    ("r8_srgb", vk::Format::R8_SRGB),
    ("r8g8_unorm", vk::Format::R8G8_UNORM),
    ("r8g8_snorm", vk::Format::R8G8_SNORM),
    ("r8g8_uint", vk::Format::R8G8_UINT),
    ("r8g8_sint", vk::Format::R8G8_SINT),
    ("r8g8_srgb", vk::Format::R8G8_SRGB),
    ("r8g8b8a8_unorm", vk::Format::R8G8B8A8_UNORM),
    ("r8g8b8a8_snorm", vk::Format::R8G8B8A8_SNORM),
    ("r8g8b8a8_uint", vk::Format::R8G8B8A8_UINT),
    ("r8g8b8a8_sint", vk::Format::R8G8B8A8_SINT),
    ("r8g8b8a8_srgb", vk::Format::R8G8B8A8_SRGB),
    ("b8g8r8a8_unorm", vk::Format::B8G8R8A8_UNORM),
    ("b8g8r8a8_srgb", vk::Format::B8G8R8A8_SRGB),
    ("a2b10g10r10_unorm_pack32", vk::Format::A2B10G10R10_UNORM_PACK32),
    ("a2r10g10b10_unorm_pack32", vk::Format::A2R10G10B10_UNORM_PACK32),
    ("b10g11r11_ufloat_pack32", vk::Format::B10G11R11_UFLOAT_PACK32),
    ("r16_unorm", vk::Format::R16_UNORM),
    ("r16_uint", vk::Format::R16_UINT),
    ("r16_sint", vk::Format::R16_SINT),
    ("r16_sfloat", vk::Format::R16_SFLOAT),
    ("r16g16_unorm", vk::Format::R16G16_UNORM),
    ("r16g16_uint", vk::Format::R16G16_UINT),
    ("r16g16_sint", vk::Format::R16G16_SINT),
    ("r16g16_sfloat", vk::Format::R16G16_SFLOAT),
    ("r16g16b16a16_unorm", vk::Format::R16G16B16A16_UNORM),
    ("r16g16b16a16_uint", vk::Format::R16G16B16A16_UINT),
    ("r16g16b16a16_sint", vk::Format::R16G16B16A16_SINT),
    ("r16g16b16a16_sfloat", vk::Format::R16G16B16A16_SFLOAT),
    ("r32_uint", vk::Format::R32_UINT),
    ("r32_sint", vk::Format::R32_SINT),
    ("r32_sfloat", vk::Format::R32_SFLOAT),
    ("r32g32_uint", vk::Format::R32G32_UINT),
    ("r32g32_sint", vk::Format::R32G32_SINT),
    ("r32g32_sfloat", vk::Format::R32G32_SFLOAT),
    ("r32g32b32_uint", vk::Format::R32G32B32_UINT),
    ("r32g32b32_sint", vk::Format::R32G32B32_SINT),
    ("r32g32b32_sfloat", vk::Format::R32G32B32_SFLOAT),
    ("r32g32b32a32_uint", vk::Format::R32G32B32A32_UINT),
    ("r32g32b32a32_sint", vk::Format::R32G32B32A32_SINT),
    ("r32g32b32a32_sfloat", vk::Format::R32G32B32A32_SFLOAT),
    ("r64_sfloat", vk::Format::R64_SFLOAT),
    ("d16_unorm", vk::Format::D16_UNORM),
    ("x8_d24_unorm_pack32", vk::Format::X8_D24_UNORM_PACK32),
    ("d32_sfloat", vk::Format::D32_SFLOAT),
    ("s8_uint", vk::Format::S8_UINT),
    ("d16_unorm_s8_uint", vk::Format::D16_UNORM_S8_UINT),
    ("d24_unorm_s8_uint", vk::Format::D24_UNORM_S8_UINT),
    ("d32_sfloat_s8_uint", vk::Format::D32_SFLOAT_S8_UINT),
];

const DEPTH_ONLY: &[vk::Format] = &[
    vk::Format::D16_UNORM,
    vk::Format::X8_D24_UNORM_PACK32,
    vk::Format::D32_SFLOAT,
];

const DEPTH_STENCIL: &[vk::Format] = &[
    vk::Format::D16_UNORM_S8_UINT,
    vk::Format::D24_UNORM_S8_UINT,
    vk::Format::D32_SFLOAT_S8_UINT,
];

pub fn format_from_name(name: &str) -> Option<vk::Format> {
    FORMATS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, format)| *format)
}

/// Inverse of [`format_from_name`]. Returns `"undefined"` for formats outside of the table.
pub fn format_name(format: vk::Format) -> &'static str {
    FORMATS
        .iter()
        .find(|(_, f)| *f == format)
        .map(|(name, _)| *name)
        .unwrap_or("undefined")
}

/// All known format names separated by a comma, used in diagnostics.
pub fn format_names() -> String {
    FORMATS
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn is_depth_only(format: vk::Format) -> bool {
    DEPTH_ONLY.contains(&format)
}

pub fn is_depth_stencil(format: vk::Format) -> bool {
    DEPTH_STENCIL.contains(&format)
}

/// Names of the formats `#set ds` accepts.
pub fn depth_format_names() -> String {
    DEPTH_STENCIL
        .iter()
        .chain(DEPTH_ONLY)
        .map(|format| format_name(*format))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names_map_both_ways() {
        assert_eq!(
            format_from_name("r32g32b32_sfloat"),
            Some(vk::Format::R32G32B32_SFLOAT)
        );
        assert_eq!(format_from_name("R32G32B32_SFLOAT"), None);
        assert_eq!(format_name(vk::Format::B8G8R8A8_SRGB), "b8g8r8a8_srgb");
        assert_eq!(format_name(vk::Format::ASTC_4X4_SRGB_BLOCK), "undefined");
    }

    #[test]
    fn depth_formats_are_classified() {
        assert!(is_depth_only(vk::Format::D32_SFLOAT));
        assert!(!is_depth_stencil(vk::Format::D32_SFLOAT));
        assert!(is_depth_stencil(vk::Format::D24_UNORM_S8_UINT));
        assert!(!is_depth_only(vk::Format::R8G8B8A8_UNORM));
        assert_eq!(
            depth_format_names(),
            "d16_unorm_s8_uint, d24_unorm_s8_uint, d32_sfloat_s8_uint, d16_unorm, \
             x8_d24_unorm_pack32, d32_sfloat"
        );
    }
}
