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

//! Applies parsed `#set` directives to a [`PipelineState`].

use crate::{
    directive::{DirectiveKind, SetterDirective},
    error::PipelineError,
    format::{
        depth_format_names, format_from_name, format_names, is_depth_only, is_depth_stencil,
    },
    stage::ShaderStage,
    state::{
        keyword_list, BlendPreset, CullMode, DepthBias, DepthBounds, DepthCompare, FrontFace,
        InputRate, PipelineState, PolygonMode, Switch, Topology,
    },
};
use ash::vk;
use std::str::FromStr;
use strum::VariantNames;

struct Arguments<'a> {
    directive: &'a SetterDirective,
}

impl<'a> Arguments<'a> {
    fn expect_count(&self, expected: usize, format: &'static str) -> Result<(), PipelineError> {
        let actual = self.directive.values.len();
        if actual == expected {
            Ok(())
        } else {
            Err(PipelineError::ArgumentCount {
                line: self.directive.line,
                key: self.directive.key.clone(),
                expected,
                actual,
                format,
            })
        }
    }

    fn value(&self, index: usize) -> &'a str {
        &self.directive.values[index]
    }

    fn invalid_value(&self, index: usize, valid: String) -> PipelineError {
        PipelineError::ArgumentValue {
            line: self.directive.line,
            key: self.directive.key.clone(),
            position: index + 1,
            value: self.value(index).to_owned(),
            valid,
        }
    }

    fn number<T: FromStr>(&self, index: usize, expected: &'static str) -> Result<T, PipelineError> {
        self.value(index)
            .parse()
            .map_err(|_| PipelineError::ArgumentType {
                line: self.directive.line,
                key: self.directive.key.clone(),
                position: index + 1,
                expected,
                value: self.value(index).to_owned(),
            })
    }

    fn integer(&self, index: usize) -> Result<u32, PipelineError> {
        self.number(index, "integer")
    }

    fn float(&self, index: usize) -> Result<f32, PipelineError> {
        self.number(index, "float")
    }

    fn keyword<T: FromStr + VariantNames>(&self, index: usize) -> Result<T, PipelineError> {
        self.value(index)
            .parse()
            .map_err(|_| self.invalid_value(index, keyword_list::<T>()))
    }

    /// Single keyword directive.
    fn only_keyword<T: FromStr + VariantNames>(
        &self,
        format: &'static str,
    ) -> Result<T, PipelineError> {
        self.expect_count(1, format)?;
        self.keyword(0)
    }

    fn format(&self, index: usize) -> Result<vk::Format, PipelineError> {
        format_from_name(self.value(index))
            .ok_or_else(|| self.invalid_value(index, format_names()))
    }
}

/// Validates the directive against the stage whitelist and its argument grammar, then writes the
/// result into `state`. On error `state` is left untouched.
pub fn analyze(
    directive: &SetterDirective,
    stage: ShaderStage,
    state: &mut PipelineState,
) -> Result<(), PipelineError> {
    let allowed = stage
        .allowed_directives()
        .ok_or(PipelineError::UnsupportedStage { stage })?;

    let kind = directive
        .kind
        .filter(|kind| allowed.contains(kind))
        .ok_or_else(|| PipelineError::UnknownKey {
            line: directive.line,
            key: directive.key.clone(),
            stage,
        })?;

    let args = Arguments { directive };

    match kind {
        DirectiveKind::Topology => {
            state.topology = args.only_keyword::<Topology>("topology")?.into();
        }
        DirectiveKind::PolygonMode => {
            state.polygon_mode = args.only_keyword::<PolygonMode>("polygon_mode")?.into();
        }
        DirectiveKind::CullMode => {
            state.cull_mode = args.only_keyword::<CullMode>("cull_mode")?.into();
        }
        DirectiveKind::FrontFace => {
            state.front_face = args.only_keyword::<FrontFace>("front_face")?.into();
        }
        DirectiveKind::DepthWrite => {
            state.depth_write = args.only_keyword::<Switch>("enable")?.into();
        }
        DirectiveKind::DepthTest => {
            state.depth_compare = args.only_keyword::<DepthCompare>("compare_op")?.into();
            state.depth_test = true;
        }
        DirectiveKind::DepthBias => {
            args.expect_count(
                3,
                "depth_bias_constant_factor, depth_bias_clamp, depth_bias_slope_factor",
            )?;
            state.depth_bias = Some(DepthBias {
                constant: args.float(0)?,
                clamp: args.float(1)?,
                slope: args.float(2)?,
            });
        }
        DirectiveKind::DepthBoundsTest => {
            args.expect_count(2, "min_depth, max_depth")?;
            state.depth_bounds = Some(DepthBounds {
                min: args.float(0)?,
                max: args.float(1)?,
            });
        }
        DirectiveKind::LineWidth => {
            args.expect_count(1, "line_width")?;
            state.line_width = args.float(0)?;
        }
        DirectiveKind::VsLocation => {
            args.expect_count(4, "binding, location, format, offset")?;
            let binding = args.integer(0)?;
            let location = args.integer(1)?;
            let format = args.format(2)?;
            let offset = args.integer(3)?;
            state.vertex_attributes.push(
                vk::VertexInputAttributeDescription::default()
                    .binding(binding)
                    .location(location)
                    .format(format)
                    .offset(offset),
            );
        }
        DirectiveKind::VsBinding => {
            args.expect_count(3, "binding, stride, input_rate")?;
            let binding = args.integer(0)?;
            let stride = args.integer(1)?;
            let rate = args.keyword::<InputRate>(2)?;
            state.vertex_bindings.push(
                vk::VertexInputBindingDescription::default()
                    .binding(binding)
                    .stride(stride)
                    .input_rate(rate.into()),
            );
        }
        DirectiveKind::ColorBlend => {
            let preset = args.only_keyword::<BlendPreset>("blend_preset")?;
            state.blend_attachments.push(preset.attachment());
        }
        DirectiveKind::Rt => {
            let formats = (0..directive.values.len())
                .map(|i| args.format(i))
                .collect::<Result<Vec<_>, _>>()?;
            state.color_formats.extend(formats);
        }
        DirectiveKind::Ds => {
            args.expect_count(1, "depth_stencil_format")?;
            let format = format_from_name(args.value(0))
                .filter(|format| is_depth_only(*format) || is_depth_stencil(*format))
                .ok_or_else(|| args.invalid_value(0, depth_format_names()))?;
            state.depth_format = format;
            state.stencil_format = if is_depth_stencil(format) {
                format
            } else {
                vk::Format::UNDEFINED
            };
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::analyze;
    use crate::{
        directive::parse_directive_line,
        error::PipelineError,
        stage::ShaderStage,
        state::{CullMode, DepthCompare, FrontFace, PipelineState, PolygonMode, Topology},
    };
    use ash::vk;
    use strum::VariantNames;

    fn apply(stage: ShaderStage, lines: &[&str]) -> Result<PipelineState, PipelineError> {
        let mut state = PipelineState::default();
        for (i, line) in lines.iter().enumerate() {
            let directive = parse_directive_line(line, i + 1)?;
            analyze(&directive, stage, &mut state)?;
        }
        Ok(state)
    }

    fn vertex(line: &str) -> PipelineState {
        apply(ShaderStage::Vertex, &[line]).unwrap()
    }

    fn fragment(line: &str) -> PipelineState {
        apply(ShaderStage::Fragment, &[line]).unwrap()
    }

    #[test]
    fn topology_table() {
        use vk::PrimitiveTopology as T;
        let table = [
            ("point_list", T::POINT_LIST),
            ("line_list", T::LINE_LIST),
            ("line_strip", T::LINE_STRIP),
            ("triangle_list", T::TRIANGLE_LIST),
            ("triangle_strip", T::TRIANGLE_STRIP),
            ("triangle_fan", T::TRIANGLE_FAN),
            ("line_list_with_adjacency", T::LINE_LIST_WITH_ADJACENCY),
            ("line_strip_with_adjacency", T::LINE_STRIP_WITH_ADJACENCY),
            ("triangle_list_with_adjacency", T::TRIANGLE_LIST_WITH_ADJACENCY),
            ("triangle_strip_with_adjacency", T::TRIANGLE_STRIP_WITH_ADJACENCY),
            ("patch_list", T::PATCH_LIST),
        ];
        assert_eq!(table.len(), Topology::VARIANTS.len());
        for (name, expected) in table {
            let state = vertex(&format!("#set topology = {name}"));
            assert_eq!(state.topology, expected, "{name}");
        }
    }

    #[test]
    fn rasterizer_keyword_tables() {
        let polygon_modes = [
            ("fill", vk::PolygonMode::FILL),
            ("line", vk::PolygonMode::LINE),
            ("point", vk::PolygonMode::POINT),
        ];
        assert_eq!(polygon_modes.len(), PolygonMode::VARIANTS.len());
        for (name, expected) in polygon_modes {
            let state = vertex(&format!("#set polygon_mode = {name}"));
            assert_eq!(state.polygon_mode, expected, "{name}");
        }

        let cull_modes = [
            ("front", vk::CullModeFlags::FRONT),
            ("back", vk::CullModeFlags::BACK),
            ("none", vk::CullModeFlags::NONE),
            ("front_and_back", vk::CullModeFlags::FRONT_AND_BACK),
        ];
        assert_eq!(cull_modes.len(), CullMode::VARIANTS.len());
        for (name, expected) in cull_modes {
            let state = vertex(&format!("#set cull_mode = {name}"));
            assert_eq!(state.cull_mode, expected, "{name}");
        }

        let front_faces = [
            ("clockwise", vk::FrontFace::CLOCKWISE),
            ("counter_clockwise", vk::FrontFace::COUNTER_CLOCKWISE),
        ];
        assert_eq!(front_faces.len(), FrontFace::VARIANTS.len());
        for (name, expected) in front_faces {
            let state = vertex(&format!("#set front_face = {name}"));
            assert_eq!(state.front_face, expected, "{name}");
        }
    }

    #[test]
    fn depth_keyword_tables() {
        use vk::CompareOp as C;
        let compares = [
            ("default", C::LESS_OR_EQUAL),
            ("never", C::NEVER),
            ("less", C::LESS),
            ("equal", C::EQUAL),
            ("less_or_equal", C::LESS_OR_EQUAL),
            ("greater", C::GREATER),
            ("not_equal", C::NOT_EQUAL),
            ("greater_or_equal", C::GREATER_OR_EQUAL),
            ("always", C::ALWAYS),
        ];
        assert_eq!(compares.len(), DepthCompare::VARIANTS.len());
        for (name, expected) in compares {
            for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
                let line = format!("#set depth_test = {name}");
                let state = apply(stage, &[line.as_str()]).unwrap();
                assert!(state.depth_test, "{name}");
                assert_eq!(state.depth_compare, expected, "{name}");
            }
        }

        assert!(fragment("#set depth_write = true").depth_write);
        assert!(!fragment("#set depth_write = false").depth_write);
        assert!(vertex("#set depth_write = true").depth_write);
    }

    #[test]
    fn numeric_directives_set_state() {
        let state = vertex("#set depth_bias = 1.5 0.0 2");
        let bias = state.depth_bias.unwrap();
        assert_eq!((bias.constant, bias.clamp, bias.slope), (1.5, 0.0, 2.0));
        assert_eq!(state.rasterization_state().depth_bias_enable, vk::TRUE);

        let bounds = fragment("#set depth_bounds_test = 0.25 0.75")
            .depth_bounds
            .unwrap();
        assert_eq!((bounds.min, bounds.max), (0.25, 0.75));

        assert_eq!(fragment("#set line_width = 3").line_width, 3.0);
    }

    #[test]
    fn vertex_input_is_appended_in_order() {
        let state = apply(
            ShaderStage::Vertex,
            &[
                "#set vs_binding = 0 20 vertex",
                "#set vs_binding = 1 64 instance",
                "#set vs_location = 0 0 r32g32_sfloat 0",
                "#set vs_location = 0 1 r32g32b32_sfloat 8",
            ],
        )
        .unwrap();

        assert_eq!(state.vertex_bindings.len(), 2);
        assert_eq!(state.vertex_bindings[1].stride, 64);
        assert_eq!(
            state.vertex_bindings[1].input_rate,
            vk::VertexInputRate::INSTANCE
        );

        let attribute = state.vertex_attributes[1];
        assert_eq!(attribute.binding, 0);
        assert_eq!(attribute.location, 1);
        assert_eq!(attribute.format, vk::Format::R32G32B32_SFLOAT);
        assert_eq!(attribute.offset, 8);
    }

    #[test]
    fn three_additive_blends_give_three_attachments() {
        let state = apply(
            ShaderStage::Fragment,
            &[
                "#set color_blend = add",
                "#set color_blend = add",
                "#set color_blend = add",
            ],
        )
        .unwrap();

        assert_eq!(state.blend_attachments.len(), 3);
        for attachment in &state.blend_attachments {
            assert_eq!(attachment.blend_enable, vk::TRUE);
            assert_eq!(attachment.src_color_blend_factor, vk::BlendFactor::SRC_ALPHA);
            assert_eq!(attachment.dst_color_blend_factor, vk::BlendFactor::ONE);
            assert_eq!(attachment.color_blend_op, vk::BlendOp::ADD);
        }
    }

    #[test]
    fn render_targets_and_depth_formats() {
        let state = apply(
            ShaderStage::Fragment,
            &[
                "#set rt = r8g8b8a8_unorm r16g16b16a16_sfloat",
                "#set rt = b8g8r8a8_srgb",
                "#set ds = d24_unorm_s8_uint",
            ],
        )
        .unwrap();
        assert_eq!(
            state.color_formats,
            [
                vk::Format::R8G8B8A8_UNORM,
                vk::Format::R16G16B16A16_SFLOAT,
                vk::Format::B8G8R8A8_SRGB
            ]
        );
        assert_eq!(state.depth_format, vk::Format::D24_UNORM_S8_UINT);
        assert_eq!(state.stencil_format, vk::Format::D24_UNORM_S8_UINT);

        let state = fragment("#set ds = d32_sfloat");
        assert_eq!(state.depth_format, vk::Format::D32_SFLOAT);
        assert_eq!(state.stencil_format, vk::Format::UNDEFINED);
    }

    #[test]
    fn stage_whitelist_is_enforced() {
        let err = apply(ShaderStage::Fragment, &["#set topology = point_list"]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnknownKey { ref key, stage: ShaderStage::Fragment, .. } if key == "topology"
        ));

        let err = apply(ShaderStage::Vertex, &["#set rt = r8_unorm"]).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownKey { .. }));

        let err = apply(ShaderStage::Vertex, &["#set wireframe = true"]).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownKey { .. }));

        let err = apply(ShaderStage::Compute, &["#set topology = point_list"]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnsupportedStage {
                stage: ShaderStage::Compute
            }
        ));
    }

    #[test]
    fn invalid_input_rate_lists_valid_values() {
        let err = apply(ShaderStage::Vertex, &["#set vs_binding = 0 16 diagonal"]).unwrap_err();
        match err {
            PipelineError::ArgumentValue {
                position,
                value,
                valid,
                ..
            } => {
                assert_eq!(position, 3);
                assert_eq!(value, "diagonal");
                assert_eq!(valid, "vertex, instance");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn argument_errors() {
        let err = apply(ShaderStage::Vertex, &["#set vs_location = 0 0 r32_sfloat"]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ArgumentCount {
                expected: 4,
                actual: 3,
                ..
            }
        ));

        let err = apply(ShaderStage::Vertex, &["#set vs_location = 0 x r32_sfloat 0"]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ArgumentType {
                position: 2,
                expected: "integer",
                ..
            }
        ));

        let err = apply(ShaderStage::Vertex, &["#set vs_location = 0 0 rgb 0"]).unwrap_err();
        assert!(matches!(err, PipelineError::ArgumentValue { position: 3, .. }));

        let err = apply(ShaderStage::Fragment, &["#set line_width = thick"]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ArgumentType {
                expected: "float",
                ..
            }
        ));

        let err = apply(ShaderStage::Fragment, &["#set ds = r8g8b8a8_unorm"]).unwrap_err();
        match err {
            PipelineError::ArgumentValue { valid, .. } => assert!(valid.contains("d32_sfloat")),
            other => panic!("unexpected error {other:?}"),
        }

        let err = apply(ShaderStage::Vertex, &["#set cull_mode = front back"]).unwrap_err();
        assert!(matches!(err, PipelineError::ArgumentCount { .. }));
    }

    #[test]
    fn failed_directive_leaves_state_untouched() {
        let mut state = PipelineState::default();
        let directive = parse_directive_line("#set depth_bias = 1.0 oops 2.0", 1).unwrap();
        assert!(analyze(&directive, ShaderStage::Vertex, &mut state).is_err());
        assert!(state.depth_bias.is_none());
    }
}
