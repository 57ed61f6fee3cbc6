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

//! Fixed-function pipeline state assembled from `#set` directives.
//!
//! [`PipelineState`] owns every array it refers to. Native create-info structures are built on
//! demand and borrow from the state, so they can never outlive the data they point to.

use crate::format::format_name;
use ash::vk;
use std::fmt::{Display, Formatter};
use strum::VariantNames;
use strum_macros::{AsRefStr, EnumString, VariantNames};

/// Joins the keyword names of an enum for diagnostics.
pub fn keyword_list<T: VariantNames>() -> String {
    T::VARIANTS.join(", ")
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, AsRefStr, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum Topology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
    TriangleFan,
    LineListWithAdjacency,
    LineStripWithAdjacency,
    TriangleListWithAdjacency,
    TriangleStripWithAdjacency,
    PatchList,
}

impl From<Topology> for vk::PrimitiveTopology {
    fn from(topology: Topology) -> Self {
        match topology {
            Topology::PointList => vk::PrimitiveTopology::POINT_LIST,
            Topology::LineList => vk::PrimitiveTopology::LINE_LIST,
            Topology::LineStrip => vk::PrimitiveTopology::LINE_STRIP,
            Topology::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
            Topology::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
            Topology::TriangleFan => vk::PrimitiveTopology::TRIANGLE_FAN,
            Topology::LineListWithAdjacency => vk::PrimitiveTopology::LINE_LIST_WITH_ADJACENCY,
            Topology::LineStripWithAdjacency => vk::PrimitiveTopology::LINE_STRIP_WITH_ADJACENCY,
            Topology::TriangleListWithAdjacency => {
                vk::PrimitiveTopology::TRIANGLE_LIST_WITH_ADJACENCY
            }
            Topology::TriangleStripWithAdjacency => {
                vk::PrimitiveTopology::TRIANGLE_STRIP_WITH_ADJACENCY
            }
            Topology::PatchList => vk::PrimitiveTopology::PATCH_LIST,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, AsRefStr, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum PolygonMode {
    Fill,
    Line,
    Point,
}

impl From<PolygonMode> for vk::PolygonMode {
    fn from(mode: PolygonMode) -> Self {
        match mode {
            PolygonMode::Fill => vk::PolygonMode::FILL,
            PolygonMode::Line => vk::PolygonMode::LINE,
            PolygonMode::Point => vk::PolygonMode::POINT,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, AsRefStr, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum CullMode {
    Front,
    Back,
    None,
    FrontAndBack,
}

impl From<CullMode> for vk::CullModeFlags {
    fn from(mode: CullMode) -> Self {
        match mode {
            CullMode::Front => vk::CullModeFlags::FRONT,
            CullMode::Back => vk::CullModeFlags::BACK,
            CullMode::None => vk::CullModeFlags::NONE,
            CullMode::FrontAndBack => vk::CullModeFlags::FRONT_AND_BACK,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, AsRefStr, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum FrontFace {
    Clockwise,
    CounterClockwise,
}

impl From<FrontFace> for vk::FrontFace {
    fn from(face: FrontFace) -> Self {
        match face {
            FrontFace::Clockwise => vk::FrontFace::CLOCKWISE,
            FrontFace::CounterClockwise => vk::FrontFace::COUNTER_CLOCKWISE,
        }
    }
}

/// `true`/`false` keyword.
#[derive(Copy, Clone, Debug, PartialEq, Eq, AsRefStr, EnumString, VariantNames)]
pub enum Switch {
    #[strum(serialize = "true")]
    On,
    #[strum(serialize = "false")]
    Off,
}

impl From<Switch> for bool {
    fn from(switch: Switch) -> Self {
        switch == Switch::On
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, AsRefStr, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum DepthCompare {
    /// Same as [`DepthCompare::LessOrEqual`].
    Default,
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

impl From<DepthCompare> for vk::CompareOp {
    fn from(compare: DepthCompare) -> Self {
        match compare {
            DepthCompare::Default | DepthCompare::LessOrEqual => vk::CompareOp::LESS_OR_EQUAL,
            DepthCompare::Never => vk::CompareOp::NEVER,
            DepthCompare::Less => vk::CompareOp::LESS,
            DepthCompare::Equal => vk::CompareOp::EQUAL,
            DepthCompare::Greater => vk::CompareOp::GREATER,
            DepthCompare::NotEqual => vk::CompareOp::NOT_EQUAL,
            DepthCompare::GreaterOrEqual => vk::CompareOp::GREATER_OR_EQUAL,
            DepthCompare::Always => vk::CompareOp::ALWAYS,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, AsRefStr, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum InputRate {
    Vertex,
    Instance,
}

impl From<InputRate> for vk::VertexInputRate {
    fn from(rate: InputRate) -> Self {
        match rate {
            InputRate::Vertex => vk::VertexInputRate::VERTEX,
            InputRate::Instance => vk::VertexInputRate::INSTANCE,
        }
    }
}

/// Named color blend attachment configurations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, AsRefStr, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum BlendPreset {
    #[strum(serialize = "false")]
    Disabled,
    Add,
    Multiply,
    Sub,
    Alpha,
    Screen,
    Darken,
    Lighten,
    Difference,
    Exclusion,
}

impl BlendPreset {
    pub fn attachment(self) -> vk::PipelineColorBlendAttachmentState {
        use vk::BlendFactor as F;
        use vk::BlendOp as Op;

        let (enable, color, alpha) = match self {
            BlendPreset::Disabled => (false, (F::ONE, F::ZERO, Op::ADD), (F::ONE, F::ZERO, Op::ADD)),
            BlendPreset::Add => (
                true,
                (F::SRC_ALPHA, F::ONE, Op::ADD),
                (F::ONE, F::ZERO, Op::ADD),
            ),
            BlendPreset::Multiply => (
                true,
                (F::ONE, F::ONE, Op::MULTIPLY_EXT),
                (F::ONE, F::ONE, Op::MULTIPLY_EXT),
            ),
            BlendPreset::Sub => (
                true,
                (F::SRC_ALPHA, F::ONE, Op::SUBTRACT),
                (F::SRC_ALPHA, F::ONE, Op::SUBTRACT),
            ),
            BlendPreset::Alpha => (
                true,
                (F::SRC_ALPHA, F::ONE_MINUS_SRC_ALPHA, Op::ADD),
                (F::ONE, F::ZERO, Op::ADD),
            ),
            BlendPreset::Screen => (
                true,
                (F::ONE, F::ONE, Op::SCREEN_EXT),
                (F::ONE, F::ONE, Op::SCREEN_EXT),
            ),
            BlendPreset::Darken => (true, (F::ONE, F::ONE, Op::MIN), (F::ONE, F::ONE, Op::MIN)),
            BlendPreset::Lighten => (true, (F::ONE, F::ONE, Op::MAX), (F::ONE, F::ONE, Op::MAX)),
            BlendPreset::Difference => (
                true,
                (F::ONE, F::ONE, Op::DIFFERENCE_EXT),
                (F::ONE, F::ONE, Op::DIFFERENCE_EXT),
            ),
            BlendPreset::Exclusion => (
                true,
                (F::ONE, F::ONE, Op::EXCLUSION_EXT),
                (F::ONE, F::ONE, Op::EXCLUSION_EXT),
            ),
        };

        vk::PipelineColorBlendAttachmentState::default()
            .blend_enable(enable)
            .src_color_blend_factor(color.0)
            .dst_color_blend_factor(color.1)
            .color_blend_op(color.2)
            .src_alpha_blend_factor(alpha.0)
            .dst_alpha_blend_factor(alpha.1)
            .alpha_blend_op(alpha.2)
            .color_write_mask(vk::ColorComponentFlags::RGBA)
    }
}

/// Depth bias parameters, present only when `#set depth_bias` was used.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DepthBias {
    pub constant: f32,
    pub clamp: f32,
    pub slope: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DepthBounds {
    pub min: f32,
    pub max: f32,
}

/// Everything about a graphics pipeline that is not shader code.
#[derive(Clone, Debug)]
pub struct PipelineState {
    pub topology: vk::PrimitiveTopology,
    pub polygon_mode: vk::PolygonMode,
    pub cull_mode: vk::CullModeFlags,
    pub front_face: vk::FrontFace,
    pub line_width: f32,
    pub depth_bias: Option<DepthBias>,
    pub depth_test: bool,
    pub depth_compare: vk::CompareOp,
    pub depth_write: bool,
    pub depth_bounds: Option<DepthBounds>,
    pub vertex_attributes: Vec<vk::VertexInputAttributeDescription>,
    pub vertex_bindings: Vec<vk::VertexInputBindingDescription>,
    pub blend_attachments: Vec<vk::PipelineColorBlendAttachmentState>,
    pub color_formats: Vec<vk::Format>,
    pub depth_format: vk::Format,
    pub stencil_format: vk::Format,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            topology: vk::PrimitiveTopology::TRIANGLE_LIST,
            polygon_mode: vk::PolygonMode::FILL,
            cull_mode: vk::CullModeFlags::BACK,
            front_face: vk::FrontFace::CLOCKWISE,
            line_width: 1.0,
            depth_bias: None,
            depth_test: false,
            depth_compare: vk::CompareOp::LESS,
            depth_write: false,
            depth_bounds: None,
            vertex_attributes: Vec::new(),
            vertex_bindings: Vec::new(),
            blend_attachments: Vec::new(),
            color_formats: Vec::new(),
            depth_format: vk::Format::UNDEFINED,
            stencil_format: vk::Format::UNDEFINED,
        }
    }
}

impl PipelineState {
    pub fn input_assembly_state(&self) -> vk::PipelineInputAssemblyStateCreateInfo<'static> {
        vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(self.topology)
            .primitive_restart_enable(false)
    }

    pub fn rasterization_state(&self) -> vk::PipelineRasterizationStateCreateInfo<'static> {
        let bias = self.depth_bias.unwrap_or(DepthBias {
            constant: 0.0,
            clamp: 0.0,
            slope: 0.0,
        });

        vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(self.polygon_mode)
            .cull_mode(self.cull_mode)
            .front_face(self.front_face)
            .depth_bias_enable(self.depth_bias.is_some())
            .depth_bias_constant_factor(bias.constant)
            .depth_bias_clamp(bias.clamp)
            .depth_bias_slope_factor(bias.slope)
            .line_width(self.line_width)
    }

    pub fn vertex_input_state(&self) -> vk::PipelineVertexInputStateCreateInfo<'_> {
        vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&self.vertex_bindings)
            .vertex_attribute_descriptions(&self.vertex_attributes)
    }

    pub fn depth_stencil_state(&self) -> vk::PipelineDepthStencilStateCreateInfo<'static> {
        let bounds = self.depth_bounds.unwrap_or(DepthBounds { min: 0.0, max: 1.0 });

        vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(self.depth_test)
            .depth_write_enable(self.depth_write)
            .depth_compare_op(self.depth_compare)
            .depth_bounds_test_enable(self.depth_bounds.is_some())
            .stencil_test_enable(false)
            .min_depth_bounds(bounds.min)
            .max_depth_bounds(bounds.max)
    }

    pub fn color_blend_state(&self) -> vk::PipelineColorBlendStateCreateInfo<'_> {
        vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .logic_op(vk::LogicOp::COPY)
            .attachments(&self.blend_attachments)
            .blend_constants([0.0; 4])
    }

    /// Dynamic rendering description of the attachments, chained into the pipeline create info.
    pub fn rendering_info(&self) -> vk::PipelineRenderingCreateInfo<'_> {
        vk::PipelineRenderingCreateInfo::default()
            .view_mask(0)
            .color_attachment_formats(&self.color_formats)
            .depth_attachment_format(self.depth_format)
            .stencil_attachment_format(self.stencil_format)
    }
}

impl Display for PipelineState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "topology: {:?}", self.topology)?;
        writeln!(
            f,
            "rasterization: {:?}, cull {:?}, {:?}, line width {}",
            self.polygon_mode, self.cull_mode, self.front_face, self.line_width
        )?;
        match self.depth_bias {
            Some(bias) => writeln!(
                f,
                "depth bias: constant {}, clamp {}, slope {}",
                bias.constant, bias.clamp, bias.slope
            )?,
            None => writeln!(f, "depth bias: off")?,
        }
        if self.depth_test {
            writeln!(f, "depth test: {:?}", self.depth_compare)?;
        } else {
            writeln!(f, "depth test: off")?;
        }
        writeln!(f, "depth write: {}", self.depth_write)?;
        if let Some(bounds) = self.depth_bounds {
            writeln!(f, "depth bounds: [{}, {}]", bounds.min, bounds.max)?;
        }
        for binding in &self.vertex_bindings {
            writeln!(
                f,
                "vertex binding {}: stride {}, {:?}",
                binding.binding, binding.stride, binding.input_rate
            )?;
        }
        for attribute in &self.vertex_attributes {
            writeln!(
                f,
                "vertex attribute {}: binding {}, {} at {}",
                attribute.location,
                attribute.binding,
                format_name(attribute.format),
                attribute.offset
            )?;
        }
        for (i, attachment) in self.blend_attachments.iter().enumerate() {
            writeln!(
                f,
                "color blend {i}: enabled {}, color {:?}, alpha {:?}",
                attachment.blend_enable != vk::FALSE,
                attachment.color_blend_op,
                attachment.alpha_blend_op
            )?;
        }
        let targets = self
            .color_formats
            .iter()
            .map(|format| format_name(*format))
            .collect::<Vec<_>>();
        writeln!(f, "render targets: [{}]", targets.join(", "))?;
        write!(
            f,
            "depth: {}, stencil: {}",
            format_name(self.depth_format),
            format_name(self.stencil_format)
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_profile() {
        let state = PipelineState::default();
        let raster = state.rasterization_state();
        assert_eq!(raster.polygon_mode, vk::PolygonMode::FILL);
        assert_eq!(raster.cull_mode, vk::CullModeFlags::BACK);
        assert_eq!(raster.front_face, vk::FrontFace::CLOCKWISE);
        assert_eq!(raster.line_width, 1.0);
        assert_eq!(raster.depth_bias_enable, vk::FALSE);

        let depth = state.depth_stencil_state();
        assert_eq!(depth.depth_test_enable, vk::FALSE);
        assert_eq!(depth.depth_compare_op, vk::CompareOp::LESS);
        assert_eq!(depth.min_depth_bounds, 0.0);
        assert_eq!(depth.max_depth_bounds, 1.0);

        let rendering = state.rendering_info();
        assert_eq!(rendering.color_attachment_count, 0);
        assert_eq!(rendering.depth_attachment_format, vk::Format::UNDEFINED);
        assert_eq!(
            state.input_assembly_state().topology,
            vk::PrimitiveTopology::TRIANGLE_LIST
        );
    }

    #[test]
    fn create_infos_point_at_owned_arrays() {
        let mut state = PipelineState::default();
        state.blend_attachments.push(BlendPreset::Alpha.attachment());
        state.blend_attachments.push(BlendPreset::Disabled.attachment());
        state.color_formats.push(vk::Format::R8G8B8A8_UNORM);

        let blend = state.color_blend_state();
        assert_eq!(blend.attachment_count, 2);
        assert_eq!(blend.p_attachments, state.blend_attachments.as_ptr());

        let rendering = state.rendering_info();
        assert_eq!(rendering.color_attachment_count, 1);
        assert_eq!(
            rendering.p_color_attachment_formats,
            state.color_formats.as_ptr()
        );
    }

    #[test]
    fn keywords_parse_from_lower_case_names() {
        assert_eq!("triangle_fan".parse(), Ok(Topology::TriangleFan));
        assert_eq!("front_and_back".parse(), Ok(CullMode::FrontAndBack));
        assert_eq!("false".parse(), Ok(BlendPreset::Disabled));
        assert_eq!("true".parse(), Ok(Switch::On));
        assert_eq!(
            vk::CompareOp::from("default".parse::<DepthCompare>().unwrap()),
            vk::CompareOp::LESS_OR_EQUAL
        );
        assert_eq!(keyword_list::<InputRate>(), "vertex, instance");
    }

    #[test]
    fn blend_palette() {
        use vk::BlendFactor as F;
        use vk::BlendOp as Op;

        let palette = [
            ("false", false, (F::ONE, F::ZERO, Op::ADD), (F::ONE, F::ZERO, Op::ADD)),
            ("add", true, (F::SRC_ALPHA, F::ONE, Op::ADD), (F::ONE, F::ZERO, Op::ADD)),
            (
                "multiply",
                true,
                (F::ONE, F::ONE, Op::MULTIPLY_EXT),
                (F::ONE, F::ONE, Op::MULTIPLY_EXT),
            ),
            (
                "sub",
                true,
                (F::SRC_ALPHA, F::ONE, Op::SUBTRACT),
                (F::SRC_ALPHA, F::ONE, Op::SUBTRACT),
            ),
            (
                "alpha",
                true,
                (F::SRC_ALPHA, F::ONE_MINUS_SRC_ALPHA, Op::ADD),
                (F::ONE, F::ZERO, Op::ADD),
            ),
            (
                "screen",
                true,
                (F::ONE, F::ONE, Op::SCREEN_EXT),
                (F::ONE, F::ONE, Op::SCREEN_EXT),
            ),
            ("darken", true, (F::ONE, F::ONE, Op::MIN), (F::ONE, F::ONE, Op::MIN)),
            ("lighten", true, (F::ONE, F::ONE, Op::MAX), (F::ONE, F::ONE, Op::MAX)),
            (
                "difference",
                true,
                (F::ONE, F::ONE, Op::DIFFERENCE_EXT),
                (F::ONE, F::ONE, Op::DIFFERENCE_EXT),
            ),
            (
                "exclusion",
                true,
                (F::ONE, F::ONE, Op::EXCLUSION_EXT),
                (F::ONE, F::ONE, Op::EXCLUSION_EXT),
            ),
        ];
        assert_eq!(palette.len(), BlendPreset::VARIANTS.len());

        for (name, enable, color, alpha) in palette {
            let attachment = name.parse::<BlendPreset>().unwrap().attachment();
            assert_eq!(attachment.blend_enable, vk::Bool32::from(enable), "{name}");
            assert_eq!(
                (
                    attachment.src_color_blend_factor,
                    attachment.dst_color_blend_factor,
                    attachment.color_blend_op
                ),
                color,
                "{name}"
            );
            assert_eq!(
                (
                    attachment.src_alpha_blend_factor,
                    attachment.dst_alpha_blend_factor,
                    attachment.alpha_blend_op
                ),
                alpha,
                "{name}"
            );
            assert_eq!(attachment.color_write_mask, vk::ColorComponentFlags::RGBA);
        }
    }
}
