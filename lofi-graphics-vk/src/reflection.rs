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

//! SPIR-V reflection: stage interface diagnostics, push constant layout and fragment output
//! validation.

use crate::{error::PipelineError, stage::ShaderStage, state::PipelineState};
use fxhash::FxHashMap;
use lofi_core::info;
use spirv_reflect::{
    types::{ReflectBlockVariable, ReflectDecorationFlags, ReflectDescriptorType},
    ShaderModule,
};

/// Location of a named member inside the push constant block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PushConstantVariable {
    pub offset: u32,
    pub size: u32,
}

/// Name to range map of the push constant block members.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PushConstantLayout {
    pub variables: FxHashMap<String, PushConstantVariable>,
    /// Offset plus size of the last declared member, zero if there is no block.
    pub size: u32,
}

impl PushConstantLayout {
    /// Builds the layout from members in declaration order.
    pub fn from_members<'a, I>(members: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, u32, u32)>,
    {
        let mut layout = Self::default();
        for (name, offset, size) in members {
            layout
                .variables
                .insert(name.to_owned(), PushConstantVariable { offset, size });
            layout.size = offset + size;
        }
        layout
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Members ordered by offset.
    pub fn sorted(&self) -> Vec<(&str, PushConstantVariable)> {
        let mut members = self
            .variables
            .iter()
            .map(|(name, variable)| (name.as_str(), *variable))
            .collect::<Vec<_>>();
        members.sort_by_key(|(_, variable)| variable.offset);
        members
    }
}

fn reflection_error(stage: ShaderStage) -> impl Fn(&'static str) -> PipelineError {
    move |message| PipelineError::Reflection {
        stage,
        message: message.to_owned(),
    }
}

fn log_block(stage: ShaderStage, owner: &str, block: &ReflectBlockVariable) {
    for member in &block.members {
        info!(
            "[{stage}] {owner}.{}: offset {}, size {}",
            member.name,
            member.offset,
            member.size
        );
    }
}

/// Logs the stage interface. Descriptor bindings are reported but never validated.
fn log_interface(stage: ShaderStage, module: &ShaderModule) -> Result<(), PipelineError> {
    let error = reflection_error(stage);

    for input in module.enumerate_input_variables(None).map_err(&error)? {
        info!("[{stage}] input {}: location {}", input.name, input.location);
    }

    for output in module.enumerate_output_variables(None).map_err(&error)? {
        info!("[{stage}] output {}: location {}", output.name, output.location);
    }

    for binding in module.enumerate_descriptor_bindings(None).map_err(&error)? {
        match binding.descriptor_type {
            ReflectDescriptorType::StorageBuffer => {
                info!(
                    "[{stage}] storage buffer {}: set {}, binding {}",
                    binding.name,
                    binding.set,
                    binding.binding
                );
                log_block(stage, &binding.name, &binding.block);
            }
            ReflectDescriptorType::CombinedImageSampler | ReflectDescriptorType::SampledImage => {
                info!(
                    "[{stage}] sampled image {}: set {}, binding {}",
                    binding.name,
                    binding.set,
                    binding.binding
                );
            }
            _ => (),
        }
    }

    Ok(())
}

fn reflect_vertex(module: &ShaderModule) -> Result<PushConstantLayout, PipelineError> {
    let stage = ShaderStage::Vertex;
    let blocks = module
        .enumerate_push_constant_blocks(None)
        .map_err(reflection_error(stage))?;

    let Some(block) = blocks.first() else {
        return Ok(PushConstantLayout::default());
    };

    log_block(stage, &block.name, block);

    Ok(PushConstantLayout::from_members(
        block
            .members
            .iter()
            .map(|member| (member.name.as_str(), member.offset, member.size)),
    ))
}

/// Compares the number of shader outputs with the attachments declared by directives.
pub fn check_fragment_outputs(outputs: usize, state: &PipelineState) -> Result<(), PipelineError> {
    let checks = [
        ("color_blend", state.blend_attachments.len()),
        ("rt", state.color_formats.len()),
    ];
    for (directive, declared) in checks {
        if declared != outputs {
            return Err(PipelineError::ResourceMismatch {
                directive,
                declared,
                outputs,
            });
        }
    }
    Ok(())
}

fn reflect_fragment(module: &ShaderModule, state: &PipelineState) -> Result<(), PipelineError> {
    let outputs = module
        .enumerate_output_variables(None)
        .map_err(reflection_error(ShaderStage::Fragment))?
        .iter()
        .filter(|output| !output.decoration_flags.contains(ReflectDecorationFlags::BUILT_IN))
        .count();

    check_fragment_outputs(outputs, state)
}

/// Reflects a compiled stage. The push constant layout is taken from the vertex stage only.
pub fn reflect(
    stage: ShaderStage,
    module: &ShaderModule,
    state: &PipelineState,
    push_constants: &mut PushConstantLayout,
) -> Result<(), PipelineError> {
    if !stage.is_supported() {
        return Err(PipelineError::UnsupportedStage { stage });
    }

    log_interface(stage, module)?;

    match stage {
        ShaderStage::Vertex => *push_constants = reflect_vertex(module)?,
        ShaderStage::Fragment => reflect_fragment(module, state)?,
        _ => return Err(PipelineError::UnsupportedStage { stage }),
    }

    Ok(())
}
