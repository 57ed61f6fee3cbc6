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

//! A program is the compiled form of a set of annotated stage sources: SPIR-V and shader module
//! per stage, the pipeline state built from the directives, and the push constant layout.

use crate::{
    analyzer::analyze,
    compiler::ShaderCompiler,
    device::RenderDevice,
    directive::parse_source,
    error::PipelineError,
    reflection::{reflect, PushConstantLayout},
    stage::ShaderStage,
    state::PipelineState,
};
use ash::vk;
use std::{collections::BTreeMap, sync::Arc};

/// Everything a program is made of, before any native object is created.
#[derive(Clone, Debug, Default)]
pub struct ProgramArtifacts {
    pub stages: BTreeMap<ShaderStage, Vec<u32>>,
    pub state: PipelineState,
    pub push_constants: PushConstantLayout,
}

/// Runs detection, directive parsing, analysis, compilation and reflection over every source.
/// No native objects are created, so this is usable without a device. Each stage may appear
/// only once.
pub fn compile_stages(
    compiler: &mut ShaderCompiler,
    name: &str,
    sources: &[&str],
) -> Result<ProgramArtifacts, PipelineError> {
    let mut artifacts = ProgramArtifacts::default();

    for source in sources {
        let (stage, marker) =
            ShaderStage::detect(source).ok_or_else(|| PipelineError::StageDetection {
                program: name.to_owned(),
            })?;
        if artifacts.stages.contains_key(&stage) {
            return Err(PipelineError::DuplicateStage {
                program: name.to_owned(),
                stage,
            });
        }

        let parsed = parse_source(source, marker)?;
        for directive in &parsed.directives {
            analyze(directive, stage, &mut artifacts.state)?;
        }

        let compiled = compiler.compile(stage, name, &parsed.code)?;
        reflect(
            stage,
            &compiled.module,
            &artifacts.state,
            &mut artifacts.push_constants,
        )?;

        artifacts.stages.insert(stage, compiled.spirv);
    }

    Ok(artifacts)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProgramStatus {
    Uninitialized,
    Compiling,
    Compiled,
    Failed,
}

pub struct ProgramStage {
    pub spirv: Vec<u32>,
    pub module: vk::ShaderModule,
}

pub struct Program {
    name: String,
    device: Arc<dyn RenderDevice>,
    stages: BTreeMap<ShaderStage, ProgramStage>,
    state: PipelineState,
    push_constants: PushConstantLayout,
    status: ProgramStatus,
}

impl Program {
    pub fn new(device: Arc<dyn RenderDevice>) -> Self {
        Self {
            name: String::new(),
            device,
            stages: Default::default(),
            state: Default::default(),
            push_constants: Default::default(),
            status: ProgramStatus::Uninitialized,
        }
    }

    fn reset(&mut self) {
        for (_, stage) in std::mem::take(&mut self.stages) {
            self.device.destroy_shader_module(stage.module);
        }
        self.state = PipelineState::default();
        self.push_constants = PushConstantLayout::default();
    }

    /// Rebuilds the program from scratch. On failure the program holds no stages and is not
    /// compiled; the previous contents are lost either way.
    pub fn compile_from_source_code(
        &mut self,
        compiler: &mut ShaderCompiler,
        name: &str,
        sources: &[&str],
    ) -> Result<(), PipelineError> {
        self.reset();
        self.name = name.to_owned();
        self.status = ProgramStatus::Compiling;

        match self.build(compiler, sources) {
            Ok(()) => {
                self.status = ProgramStatus::Compiled;
                Ok(())
            }
            Err(err) => {
                self.reset();
                self.status = ProgramStatus::Failed;
                Err(err)
            }
        }
    }

    fn build(
        &mut self,
        compiler: &mut ShaderCompiler,
        sources: &[&str],
    ) -> Result<(), PipelineError> {
        let artifacts = compile_stages(compiler, &self.name, sources)?;

        for (stage, spirv) in artifacts.stages {
            let module = self
                .device
                .create_shader_module(&spirv)
                .map_err(|result| PipelineError::ModuleCreation { stage, result })?;
            self.stages.insert(stage, ProgramStage { spirv, module });
        }

        self.state = artifacts.state;
        self.push_constants = artifacts.push_constants;

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> ProgramStatus {
        self.status
    }

    pub fn is_compiled(&self) -> bool {
        self.status == ProgramStatus::Compiled
    }

    pub fn stage(&self, stage: ShaderStage) -> Option<&ProgramStage> {
        self.stages.get(&stage)
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn push_constants(&self) -> &PushConstantLayout {
        &self.push_constants
    }

    pub fn device(&self) -> &Arc<dyn RenderDevice> {
        &self.device
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        self.reset();
    }
}
