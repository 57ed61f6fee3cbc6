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

//! Contains all possible errors that may occur during pipeline construction.

use crate::stage::ShaderStage;
use ash::vk;
use std::fmt::{Display, Formatter};

/// One of the three steps of turning a stage source into SPIR-V.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompileStep {
    Preprocess,
    /// Parsing and linking by glslang. Link errors such as a missing entry point are reported
    /// here because shaderc links as part of the SPIR-V compilation.
    Parse,
    /// Loading the produced SPIR-V for reflection and checking its entry point.
    Validate,
}

impl Display for CompileStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CompileStep::Preprocess => "preprocess",
            CompileStep::Parse => "parse",
            CompileStep::Validate => "validate",
        })
    }
}

/// Reason why a kernel could not be created from a program.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionFailure {
    #[error("program handle is invalid")]
    InvalidHandle,
    #[error("program does not exist")]
    MissingProgram,
    #[error("program is not compiled")]
    NotCompiled,
    #[error("program has no vertex stage")]
    MissingVertexStage,
    #[error("program has no fragment stage")]
    MissingFragmentStage,
}

/// Set of possible pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Malformed `#set` line.
    #[error("line {line}: {message}")]
    DirectiveSyntax { line: usize, message: String },
    /// Directives or reflection are not available for the stage.
    #[error("{stage} is not supported")]
    UnsupportedStage { stage: ShaderStage },
    /// The key is not known or is not allowed in the stage.
    #[error("line {line}: key \"{key}\" is not supported in {stage}")]
    UnknownKey {
        line: usize,
        key: String,
        stage: ShaderStage,
    },
    /// Wrong number of values after `=`.
    #[error(
        "line {line}: \"{key}\" expects {expected} argument(s) but got {actual}, format: {format}"
    )]
    ArgumentCount {
        line: usize,
        key: String,
        expected: usize,
        actual: usize,
        /// Human readable argument list of the key.
        format: &'static str,
    },
    /// A value could not be converted to a number.
    #[error(
        "line {line}: argument {position} of \"{key}\" must be {expected}, got \"{value}\""
    )]
    ArgumentType {
        line: usize,
        key: String,
        /// 1-based argument position.
        position: usize,
        expected: &'static str,
        value: String,
    },
    /// A value is not in the closed keyword set of the argument.
    #[error(
        "line {line}: argument {position} of \"{key}\" is \"{value}\", valid values are: {valid}"
    )]
    ArgumentValue {
        line: usize,
        key: String,
        position: usize,
        value: String,
        valid: String,
    },
    /// Shader interface does not agree with the directives.
    #[error(
        "shader has {outputs} output(s) but {declared} {directive} attachment(s) are declared, \
         please add or remove #set {directive}"
    )]
    ResourceMismatch {
        directive: &'static str,
        declared: usize,
        outputs: usize,
    },
    /// None of the known entry markers is present in a source.
    #[error("unable to detect the stage of a source of program \"{program}\"")]
    StageDetection { program: String },
    /// Two sources of one program have the same stage.
    #[error("program \"{program}\" has more than one {stage} source")]
    DuplicateStage { program: String, stage: ShaderStage },
    #[error("shader compiler is unavailable")]
    CompilerUnavailable,
    /// The shader compiler rejected the source. The message is the compiler output as is.
    #[error("{stage} {step} failed: {message}")]
    Compiler {
        stage: ShaderStage,
        step: CompileStep,
        message: String,
    },
    /// SPIR-V could not be reflected.
    #[error("{stage} reflection failed: {message}")]
    Reflection { stage: ShaderStage, message: String },
    #[error("unable to create shader module for {stage}: {result}")]
    ModuleCreation {
        stage: ShaderStage,
        result: vk::Result,
    },
    #[error("unable to create pipeline layout: {0}")]
    LayoutCreation(vk::Result),
    #[error("unable to create graphics pipeline: {0}")]
    PipelineCreation(vk::Result),
    #[error("unable to create kernel: {0}")]
    Precondition(PreconditionFailure),
}

impl From<PreconditionFailure> for PipelineError {
    fn from(failure: PreconditionFailure) -> Self {
        Self::Precondition(failure)
    }
}

impl PipelineError {
    /// Errors caused by the native API rather than by the shader sources.
    pub fn is_native(&self) -> bool {
        matches!(
            self,
            PipelineError::ModuleCreation { .. }
                | PipelineError::LayoutCreation(_)
                | PipelineError::PipelineCreation(_)
        )
    }
}
