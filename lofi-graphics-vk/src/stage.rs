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

//! Shader stages and the entry-point markers that identify them inside a source fragment.

use crate::directive::DirectiveKind;
use ash::vk;
use std::fmt::{Display, Formatter};

/// A kind of shader execution unit. Only [`ShaderStage::Vertex`] and [`ShaderStage::Fragment`]
/// are fully supported, the rest are recognized so they can be rejected with a precise error.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    TessControl,
    TessEvaluation,
    Geometry,
    Fragment,
    Compute,
    RayGeneration,
    Intersection,
    AnyHit,
    ClosestHit,
    Miss,
    Callable,
    Task,
    Mesh,
}

/// Entry-point markers in detection order. A marker that contains another marker as a substring
/// must come before it.
pub const ENTRY_MARKERS: &[(&str, ShaderStage)] = &[
    ("VSMain", ShaderStage::Vertex),
    ("PSMain", ShaderStage::Fragment),
    ("FSMain", ShaderStage::Fragment),
    ("TCSMain", ShaderStage::TessControl),
    ("RCSMain", ShaderStage::Callable),
    ("CSMain", ShaderStage::Compute),
    ("TESMain", ShaderStage::TessEvaluation),
    ("RGSMain", ShaderStage::RayGeneration),
    ("GSMain", ShaderStage::Geometry),
    ("RISMain", ShaderStage::Intersection),
    ("RAHSMain", ShaderStage::AnyHit),
    ("RCHSMain", ShaderStage::ClosestHit),
    ("RMSMain", ShaderStage::Miss),
    ("TSMain", ShaderStage::Task),
    ("MSMain", ShaderStage::Mesh),
];

const VERTEX_DIRECTIVES: &[DirectiveKind] = &[
    DirectiveKind::VsLocation,
    DirectiveKind::VsBinding,
    DirectiveKind::Topology,
    DirectiveKind::PolygonMode,
    DirectiveKind::CullMode,
    DirectiveKind::FrontFace,
    DirectiveKind::DepthWrite,
    DirectiveKind::DepthTest,
    DirectiveKind::DepthBias,
    DirectiveKind::DepthBoundsTest,
    DirectiveKind::LineWidth,
];

const FRAGMENT_DIRECTIVES: &[DirectiveKind] = &[
    DirectiveKind::Rt,
    DirectiveKind::Ds,
    DirectiveKind::ColorBlend,
    DirectiveKind::DepthWrite,
    DirectiveKind::DepthTest,
    DirectiveKind::DepthBias,
    DirectiveKind::DepthBoundsTest,
    DirectiveKind::LineWidth,
];

impl ShaderStage {
    /// Finds the stage of a source fragment by the first entry marker it contains.
    pub fn detect(source: &str) -> Option<(ShaderStage, &'static str)> {
        ENTRY_MARKERS
            .iter()
            .find(|(marker, _)| source.contains(marker))
            .map(|(marker, stage)| (*stage, *marker))
    }

    /// Directives that may appear in a source of this stage. `None` means the stage accepts no
    /// directives at all.
    pub fn allowed_directives(self) -> Option<&'static [DirectiveKind]> {
        match self {
            ShaderStage::Vertex => Some(VERTEX_DIRECTIVES),
            ShaderStage::Fragment => Some(FRAGMENT_DIRECTIVES),
            _ => None,
        }
    }

    /// Whether the stage can be reflected and put into a graphics pipeline.
    pub fn is_supported(self) -> bool {
        matches!(self, ShaderStage::Vertex | ShaderStage::Fragment)
    }

    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "Vertex_shader",
            ShaderStage::TessControl => "Tesscontrol_shader",
            ShaderStage::TessEvaluation => "Tessevaluation_shader",
            ShaderStage::Geometry => "Geometry_shader",
            ShaderStage::Fragment => "Fragment_shader",
            ShaderStage::Compute => "Compute_shader",
            ShaderStage::RayGeneration => "Raygen_shader",
            ShaderStage::Intersection => "Intersect_shader",
            ShaderStage::AnyHit => "Anyhit_shader",
            ShaderStage::ClosestHit => "Closesthit_shader",
            ShaderStage::Miss => "Miss_shader",
            ShaderStage::Callable => "Callable_shader",
            ShaderStage::Task => "Task_shader",
            ShaderStage::Mesh => "Mesh_shader",
        }
    }

    pub fn to_vk(self) -> vk::ShaderStageFlags {
        match self {
            ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
            ShaderStage::TessControl => vk::ShaderStageFlags::TESSELLATION_CONTROL,
            ShaderStage::TessEvaluation => vk::ShaderStageFlags::TESSELLATION_EVALUATION,
            ShaderStage::Geometry => vk::ShaderStageFlags::GEOMETRY,
            ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
            ShaderStage::Compute => vk::ShaderStageFlags::COMPUTE,
            ShaderStage::RayGeneration => vk::ShaderStageFlags::RAYGEN_KHR,
            ShaderStage::Intersection => vk::ShaderStageFlags::INTERSECTION_KHR,
            ShaderStage::AnyHit => vk::ShaderStageFlags::ANY_HIT_KHR,
            ShaderStage::ClosestHit => vk::ShaderStageFlags::CLOSEST_HIT_KHR,
            ShaderStage::Miss => vk::ShaderStageFlags::MISS_KHR,
            ShaderStage::Callable => vk::ShaderStageFlags::CALLABLE_KHR,
            ShaderStage::Task => vk::ShaderStageFlags::TASK_EXT,
            ShaderStage::Mesh => vk::ShaderStageFlags::MESH_EXT,
        }
    }
}

impl Display for ShaderStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod test {
    use super::{ShaderStage, ENTRY_MARKERS};
    use crate::directive::DirectiveKind;

    #[test]
    fn detects_stage_by_entry_marker() {
        assert_eq!(
            ShaderStage::detect("void VSMain() {}"),
            Some((ShaderStage::Vertex, "VSMain"))
        );
        assert_eq!(
            ShaderStage::detect("void PSMain() {}"),
            Some((ShaderStage::Fragment, "PSMain"))
        );
        assert_eq!(ShaderStage::detect("void main() {}"), None);
    }

    #[test]
    fn longer_markers_win_over_their_substrings() {
        assert_eq!(
            ShaderStage::detect("void TCSMain() {}").map(|(s, _)| s),
            Some(ShaderStage::TessControl)
        );
        assert_eq!(
            ShaderStage::detect("void RGSMain() {}").map(|(s, _)| s),
            Some(ShaderStage::RayGeneration)
        );
        assert_eq!(
            ShaderStage::detect("void RMSMain() {}").map(|(s, _)| s),
            Some(ShaderStage::Miss)
        );

        for (i, (marker, _)) in ENTRY_MARKERS.iter().enumerate() {
            for (later, _) in &ENTRY_MARKERS[i + 1..] {
                assert!(
                    !later.contains(marker),
                    "{later} contains {marker} but is checked after it"
                );
            }
        }
    }

    #[test]
    fn only_vertex_and_fragment_have_whitelists() {
        let vertex = ShaderStage::Vertex.allowed_directives().unwrap();
        assert!(vertex.contains(&DirectiveKind::VsLocation));
        assert!(!vertex.contains(&DirectiveKind::Rt));

        let fragment = ShaderStage::Fragment.allowed_directives().unwrap();
        assert!(fragment.contains(&DirectiveKind::ColorBlend));
        assert!(!fragment.contains(&DirectiveKind::Topology));

        assert!(ShaderStage::Compute.allowed_directives().is_none());
        assert!(!ShaderStage::Mesh.is_supported());
    }
}
