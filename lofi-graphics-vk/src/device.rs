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

//! The narrow slice of a Vulkan device the pipeline builder needs.

use ash::vk;

/// Native object creation and destruction used by programs and kernels. Implemented for an ash
/// [`ash::Device`] by [`AshRenderDevice`].
pub trait RenderDevice {
    fn create_shader_module(&self, code: &[u32]) -> Result<vk::ShaderModule, vk::Result>;

    fn destroy_shader_module(&self, module: vk::ShaderModule);

    fn create_pipeline_layout(
        &self,
        create_info: &vk::PipelineLayoutCreateInfo<'_>,
    ) -> Result<vk::PipelineLayout, vk::Result>;

    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout);

    fn create_graphics_pipeline(
        &self,
        create_info: &vk::GraphicsPipelineCreateInfo<'_>,
    ) -> Result<vk::Pipeline, vk::Result>;

    fn destroy_pipeline(&self, pipeline: vk::Pipeline);

    /// Records a push constant update. Must be called while `command_buffer` is recording.
    fn cmd_push_constants(
        &self,
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        offset: u32,
        bytes: &[u8],
    );
}

/// Vulkan logical device wrapper.
pub struct AshRenderDevice {
    pub device: ash::Device,
}

impl AshRenderDevice {
    pub fn new(device: ash::Device) -> Self {
        Self { device }
    }
}

impl RenderDevice for AshRenderDevice {
    fn create_shader_module(&self, code: &[u32]) -> Result<vk::ShaderModule, vk::Result> {
        let create_info = vk::ShaderModuleCreateInfo::default().code(code);
        unsafe { self.device.create_shader_module(&create_info, None) }
    }

    fn destroy_shader_module(&self, module: vk::ShaderModule) {
        unsafe { self.device.destroy_shader_module(module, None) }
    }

    fn create_pipeline_layout(
        &self,
        create_info: &vk::PipelineLayoutCreateInfo<'_>,
    ) -> Result<vk::PipelineLayout, vk::Result> {
        unsafe { self.device.create_pipeline_layout(create_info, None) }
    }

    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        unsafe { self.device.destroy_pipeline_layout(layout, None) }
    }

    fn create_graphics_pipeline(
        &self,
        create_info: &vk::GraphicsPipelineCreateInfo<'_>,
    ) -> Result<vk::Pipeline, vk::Result> {
        let result = unsafe {
            self.device.create_graphics_pipelines(
                vk::PipelineCache::null(),
                std::slice::from_ref(create_info),
                None,
            )
        };

        match result {
            Ok(pipelines) => pipelines
                .into_iter()
                .next()
                .ok_or(vk::Result::ERROR_UNKNOWN),
            Err((pipelines, error)) => {
                for pipeline in pipelines {
                    if pipeline != vk::Pipeline::null() {
                        self.destroy_pipeline(pipeline);
                    }
                }
                Err(error)
            }
        }
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        unsafe { self.device.destroy_pipeline(pipeline, None) }
    }

    fn cmd_push_constants(
        &self,
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        offset: u32,
        bytes: &[u8],
    ) {
        unsafe {
            self.device
                .cmd_push_constants(command_buffer, layout, stages, offset, bytes)
        }
    }
}
