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

//! Kernel is a ready to bind graphics pipeline built from a compiled [`Program`], together with
//! the push constant buffer that is uploaded with it.

use crate::{
    device::RenderDevice,
    error::{PipelineError, PreconditionFailure},
    program::Program,
    reflection::{PushConstantLayout, PushConstantVariable},
    stage::ShaderStage,
};
use ash::vk;
use lofi_core::info;
use std::{ffi::CStr, sync::Arc};

const ENTRY_POINT: &CStr = c"main";

pub struct Kernel {
    name: String,
    device: Arc<dyn RenderDevice>,
    layout: vk::PipelineLayout,
    pipeline: vk::Pipeline,
    push_constants: PushConstantLayout,
    buffer: Vec<u8>,
}

impl Kernel {
    /// Builds the pipeline layout and the pipeline. The program must be compiled and have both a
    /// vertex and a fragment stage.
    pub fn new(
        descriptor_set_layout: vk::DescriptorSetLayout,
        program: &Program,
    ) -> Result<Self, PipelineError> {
        if !program.is_compiled() {
            return Err(PreconditionFailure::NotCompiled.into());
        }
        let vertex = program
            .stage(ShaderStage::Vertex)
            .ok_or(PreconditionFailure::MissingVertexStage)?;
        let fragment = program
            .stage(ShaderStage::Fragment)
            .ok_or(PreconditionFailure::MissingFragmentStage)?;

        let device = program.device().clone();
        let state = program.state();
        let push_constants = program.push_constants().clone();

        let set_layouts = [descriptor_set_layout];
        let ranges = [vk::PushConstantRange::default()
            .stage_flags(vk::ShaderStageFlags::ALL)
            .offset(0)
            .size(push_constants.size)];
        let mut layout_info = vk::PipelineLayoutCreateInfo::default().set_layouts(&set_layouts);
        if !push_constants.is_empty() {
            layout_info = layout_info.push_constant_ranges(&ranges);
        }

        let layout = device
            .create_pipeline_layout(&layout_info)
            .map_err(PipelineError::LayoutCreation)?;

        let stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vertex.module)
                .name(ENTRY_POINT),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(fragment.module)
                .name(ENTRY_POINT),
        ];

        let vertex_input = state.vertex_input_state();
        let input_assembly = state.input_assembly_state();
        let viewport = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);
        let rasterization = state.rasterization_state();
        let multisample = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);
        let depth_stencil = state.depth_stencil_state();
        let color_blend = state.color_blend_state();
        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);
        let mut rendering = state.rendering_info();

        let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport)
            .rasterization_state(&rasterization)
            .multisample_state(&multisample)
            .depth_stencil_state(&depth_stencil)
            .color_blend_state(&color_blend)
            .dynamic_state(&dynamic)
            .layout(layout)
            .push_next(&mut rendering);

        let pipeline = match device.create_graphics_pipeline(&pipeline_info) {
            Ok(pipeline) => pipeline,
            Err(result) => {
                device.destroy_pipeline_layout(layout);
                return Err(PipelineError::PipelineCreation(result));
            }
        };

        info!(
            "Kernel for program {} created, push constants: {} bytes.",
            program.name(),
            push_constants.size
        );

        Ok(Self {
            name: program.name().to_owned(),
            device,
            layout,
            pipeline,
            buffer: vec![0; push_constants.size as usize],
            push_constants,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pipeline(&self) -> vk::Pipeline {
        self.pipeline
    }

    pub fn layout(&self) -> vk::PipelineLayout {
        self.layout
    }

    pub fn variable_info(&self, name: &str) -> Option<PushConstantVariable> {
        self.push_constants.variables.get(name).copied()
    }

    /// Writes `bytes` into the push constant member `name`. At most the member size is copied.
    /// Returns `false` and leaves the buffer untouched if there is no such member.
    pub fn set_variable(&mut self, name: &str, bytes: &[u8]) -> bool {
        let Some(variable) = self.variable_info(name) else {
            return false;
        };

        let offset = variable.offset as usize;
        let count = bytes.len().min(variable.size as usize);
        self.buffer[offset..offset + count].copy_from_slice(&bytes[..count]);
        true
    }

    /// Records the upload of the whole push constant buffer.
    pub fn push_constants(&self, command_buffer: vk::CommandBuffer) {
        if self.buffer.is_empty() {
            return;
        }
        self.device.cmd_push_constants(
            command_buffer,
            self.layout,
            vk::ShaderStageFlags::ALL,
            0,
            &self.buffer,
        );
    }

    pub fn push_constant_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

impl Drop for Kernel {
    fn drop(&mut self) {
        self.device.destroy_pipeline(self.pipeline);
        self.device.destroy_pipeline_layout(self.layout);
    }
}
