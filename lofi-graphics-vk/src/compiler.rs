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

//! GLSL to SPIR-V compilation through shaderc.
//!
//! Every stage goes through three steps that fail independently: preprocessing, compiling into
//! SPIR-V (glslang parses and links in one call) and validation, where the module is loaded for
//! reflection and its entry point is checked.
//! The profile is fixed to a Vulkan 1.3 client with SPIR-V 1.6 output and automatic binding and
//! location assignment.

use crate::{
    directive::ENTRY_SYMBOL,
    error::{CompileStep, PipelineError},
    settings::CompilerSettings,
    stage::ShaderStage,
};
use lofi_core::{info, parking_lot::Mutex, warn};

/// Number of live [`ShaderCompiler`] guards in the process.
static COMPILER_USERS: Mutex<usize> = Mutex::new(0);

/// Compilation is serialized process-wide.
static COMPILE_LOCK: Mutex<()> = Mutex::new(());

impl From<ShaderStage> for shaderc::ShaderKind {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => shaderc::ShaderKind::Vertex,
            ShaderStage::TessControl => shaderc::ShaderKind::TessControl,
            ShaderStage::TessEvaluation => shaderc::ShaderKind::TessEvaluation,
            ShaderStage::Geometry => shaderc::ShaderKind::Geometry,
            ShaderStage::Fragment => shaderc::ShaderKind::Fragment,
            ShaderStage::Compute => shaderc::ShaderKind::Compute,
            ShaderStage::RayGeneration => shaderc::ShaderKind::RayGeneration,
            ShaderStage::Intersection => shaderc::ShaderKind::Intersection,
            ShaderStage::AnyHit => shaderc::ShaderKind::AnyHit,
            ShaderStage::ClosestHit => shaderc::ShaderKind::ClosestHit,
            ShaderStage::Miss => shaderc::ShaderKind::Miss,
            ShaderStage::Callable => shaderc::ShaderKind::Callable,
            ShaderStage::Task => shaderc::ShaderKind::Task,
            ShaderStage::Mesh => shaderc::ShaderKind::Mesh,
        }
    }
}

fn upstream_message(error: shaderc::Error) -> String {
    match error {
        shaderc::Error::CompilationError(_, message) => message,
        other => other.to_string(),
    }
}

/// SPIR-V of one stage together with its reflection data.
pub struct CompiledStage {
    pub spirv: Vec<u32>,
    pub module: spirv_reflect::ShaderModule,
}

/// Shader compiler using shaderc.
///
/// Every instance owns its own `shaderc::Compiler`. The process-wide user count only tracks how
/// many guards are alive and logs the first acquire and the last release; it does not set up or
/// tear down any shared toolchain state.
pub struct ShaderCompiler {
    compiler: shaderc::Compiler,
    settings: CompilerSettings,
}

impl ShaderCompiler {
    /// Creates a compiler and registers one more user.
    pub fn new(settings: CompilerSettings) -> Result<Self, PipelineError> {
        let compiler = shaderc::Compiler::new().ok_or(PipelineError::CompilerUnavailable)?;

        let mut users = COMPILER_USERS.lock();
        if *users == 0 {
            info!("Shader compiler initialized.");
        }
        *users += 1;

        Ok(Self { compiler, settings })
    }

    /// Number of live compiler guards.
    pub fn users() -> usize {
        *COMPILER_USERS.lock()
    }

    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    fn options(&self) -> Result<shaderc::CompileOptions<'static>, PipelineError> {
        let mut options =
            shaderc::CompileOptions::new().ok_or(PipelineError::CompilerUnavailable)?;
        options.set_target_env(
            shaderc::TargetEnv::Vulkan,
            shaderc::EnvVersion::Vulkan1_3 as u32,
        );
        options.set_target_spirv(shaderc::SpirvVersion::V1_6);
        options.set_source_language(shaderc::SourceLanguage::GLSL);
        options.set_auto_bind_uniforms(true);
        options.set_auto_map_locations(true);
        options.set_optimization_level(self.settings.optimization.into());
        if self.settings.generate_debug_info {
            options.set_generate_debug_info();
        }
        Ok(options)
    }

    /// Adds a `#version` line to sources that lack one. Line numbers in diagnostics still refer
    /// to the original source.
    fn with_version(&self, source: &str) -> String {
        if source.contains("#version") {
            source.to_owned()
        } else {
            format!(
                "#version {}\n#line 1\n{}",
                self.settings.default_glsl_version, source
            )
        }
    }

    /// Compiles a cleaned stage source. The entry point must already be named
    /// [`ENTRY_SYMBOL`].
    pub fn compile(
        &mut self,
        stage: ShaderStage,
        name: &str,
        source: &str,
    ) -> Result<CompiledStage, PipelineError> {
        let _lock = COMPILE_LOCK.lock();

        let options = self.options()?;
        let source = self.with_version(source);
        let fail = |step, message| PipelineError::Compiler {
            stage,
            step,
            message,
        };

        let preprocessed = self
            .compiler
            .preprocess(&source, name, ENTRY_SYMBOL, Some(&options))
            .map_err(|e| fail(CompileStep::Preprocess, upstream_message(e)))?;

        let artifact = self
            .compiler
            .compile_into_spirv(
                &preprocessed.as_text(),
                stage.into(),
                name,
                ENTRY_SYMBOL,
                Some(&options),
            )
            .map_err(|e| fail(CompileStep::Parse, upstream_message(e)))?;

        if artifact.get_num_warnings() > 0 {
            warn!(
                "{} of {} compiled with warnings: {}",
                stage,
                name,
                artifact.get_warning_messages()
            );
        }

        let spirv = artifact.as_binary().to_vec();

        let module = spirv_reflect::ShaderModule::load_u32_data(&spirv)
            .map_err(|e| fail(CompileStep::Validate, e.to_owned()))?;
        let entry = module.get_entry_point_name();
        if entry != ENTRY_SYMBOL {
            return Err(fail(
                CompileStep::Validate,
                format!("entry point \"{ENTRY_SYMBOL}\" is missing, found \"{entry}\""),
            ));
        }

        Ok(CompiledStage { spirv, module })
    }
}

impl Drop for ShaderCompiler {
    fn drop(&mut self) {
        let mut users = COMPILER_USERS.lock();
        *users = users.saturating_sub(1);
        if *users == 0 {
            info!("Shader compiler released.");
        }
    }
}

#[cfg(test)]
mod test {
    use super::ShaderCompiler;
    use crate::{
        error::{CompileStep, PipelineError},
        settings::CompilerSettings,
        stage::ShaderStage,
    };

    #[test]
    fn compiles_vertex_stage() {
        let mut compiler = ShaderCompiler::new(CompilerSettings::default()).unwrap();
        let stage = compiler
            .compile(
                ShaderStage::Vertex,
                "quad",
                "layout(location = 0) in vec2 pos;\nvoid main() { gl_Position = vec4(pos, 0.0, 1.0); }\n",
            )
            .unwrap();
        assert_eq!(stage.spirv[0], 0x0723_0203);
        assert_eq!(stage.module.get_entry_point_name(), "main");
    }

    #[test]
    fn guard_counts_users() {
        let first = ShaderCompiler::new(CompilerSettings::default()).unwrap();
        let second = ShaderCompiler::new(CompilerSettings::default()).unwrap();
        assert!(ShaderCompiler::users() >= 2);
        drop(first);
        assert!(ShaderCompiler::users() >= 1);
        drop(second);
    }

    #[test]
    fn syntax_error_is_reported_as_parse_step() {
        let mut compiler = ShaderCompiler::new(CompilerSettings::default()).unwrap();
        let err = compiler
            .compile(
                ShaderStage::Fragment,
                "broken",
                "#version 460\nvoid main() { this is not glsl }\n",
            )
            .err()
            .unwrap();
        match err {
            PipelineError::Compiler {
                stage,
                step,
                message,
            } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert_eq!(step, CompileStep::Parse);
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_entry_point_is_a_parse_step_failure() {
        let mut compiler = ShaderCompiler::new(CompilerSettings::default()).unwrap();
        let err = compiler
            .compile(ShaderStage::Vertex, "headless", "#version 460\nvoid helper() {}\n")
            .err()
            .unwrap();
        assert!(matches!(
            err,
            PipelineError::Compiler {
                step: CompileStep::Parse,
                ..
            }
        ));
        assert_eq!(CompileStep::Validate.to_string(), "validate");
    }

    #[test]
    fn unterminated_macro_fails_in_preprocessor() {
        let mut compiler = ShaderCompiler::new(CompilerSettings::default()).unwrap();
        let err = compiler
            .compile(
                ShaderStage::Vertex,
                "broken",
                "#version 460\n#if 1\nvoid main() {}\n",
            )
            .err()
            .unwrap();
        assert!(matches!(
            err,
            PipelineError::Compiler {
                step: CompileStep::Preprocess,
                ..
            }
        ));
    }
}
