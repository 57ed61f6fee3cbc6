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

//! Entry point of the crate: owns the device, the shader compiler and every program and kernel,
//! addressed by generation-checked handles.

use crate::{
    compiler::ShaderCompiler,
    device::RenderDevice,
    error::{PipelineError, PreconditionFailure},
    kernel::Kernel,
    program::Program,
    settings::PipelineSettings,
};
use ash::vk;
use lofi_core::{
    err, info,
    pool::{Handle, Pool},
    warn,
};
use std::sync::Arc;

fn log_failure(what: &str, error: &PipelineError) {
    if error.is_native() {
        err!("{what} failed: {error}");
    } else {
        warn!("{what} failed: {error}");
    }
}

fn check_handle(handle: Handle<Program>) -> Result<(), PipelineError> {
    if handle.is_none() {
        Err(PreconditionFailure::InvalidHandle.into())
    } else {
        Ok(())
    }
}

pub struct GraphicsContext {
    // Kernels go first so they are dropped before the programs they were built from.
    kernels: Pool<Kernel>,
    programs: Pool<Program>,
    compiler: ShaderCompiler,
    device: Arc<dyn RenderDevice>,
    descriptor_set_layout: vk::DescriptorSetLayout,
    settings: PipelineSettings,
}

impl GraphicsContext {
    /// `descriptor_set_layout` is the one global layout every kernel is built against.
    pub fn new(
        device: Arc<dyn RenderDevice>,
        descriptor_set_layout: vk::DescriptorSetLayout,
        settings: PipelineSettings,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            kernels: Pool::new(),
            programs: Pool::new(),
            compiler: ShaderCompiler::new(settings.compiler.clone())?,
            device,
            descriptor_set_layout,
            settings,
        })
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Creates an empty, uncompiled program.
    pub fn create_program(&mut self) -> Handle<Program> {
        self.programs.spawn(Program::new(self.device.clone()))
    }

    /// Compiles every source into the program. Each source must contain exactly one stage,
    /// identified by its entry marker (`VSMain`, `PSMain`, ...).
    pub fn compile_program(
        &mut self,
        handle: Handle<Program>,
        name: &str,
        sources: &[&str],
    ) -> Result<(), PipelineError> {
        let result = check_handle(handle).and_then(|()| {
            self.programs
                .try_borrow_mut(handle)
                .ok_or(PipelineError::Precondition(PreconditionFailure::MissingProgram))?
                .compile_from_source_code(&mut self.compiler, name, sources)
        });

        match result {
            Ok(()) => {
                info!("Program {name} compiled.");
                Ok(())
            }
            Err(err) => {
                log_failure(&format!("Compilation of program {name}"), &err);
                Err(err)
            }
        }
    }

    pub fn program(&self, handle: Handle<Program>) -> Option<&Program> {
        self.programs.try_borrow(handle)
    }

    /// Frees the program and its shader modules. Kernels built from it stay valid.
    pub fn destroy_program(&mut self, handle: Handle<Program>) -> bool {
        self.programs.try_free(handle).is_some()
    }

    pub fn create_kernel(
        &mut self,
        program: Handle<Program>,
    ) -> Result<Handle<Kernel>, PipelineError> {
        let result = check_handle(program).and_then(|()| {
            let program = self
                .programs
                .try_borrow(program)
                .ok_or(PipelineError::Precondition(PreconditionFailure::MissingProgram))?;
            Kernel::new(self.descriptor_set_layout, program)
        });

        match result {
            Ok(kernel) => Ok(self.kernels.spawn(kernel)),
            Err(err) => {
                log_failure(&format!("Kernel creation for program {program}"), &err);
                Err(err)
            }
        }
    }

    pub fn kernel(&self, handle: Handle<Kernel>) -> Option<&Kernel> {
        self.kernels.try_borrow(handle)
    }

    pub fn kernel_mut(&mut self, handle: Handle<Kernel>) -> Option<&mut Kernel> {
        self.kernels.try_borrow_mut(handle)
    }

    pub fn destroy_kernel(&mut self, handle: Handle<Kernel>) -> bool {
        self.kernels.try_free(handle).is_some()
    }
}

#[cfg(test)]
mod test {
    use super::GraphicsContext;
    use crate::{
        device::recording::RecordingDevice,
        error::{PipelineError, PreconditionFailure},
        program::test::{FRAGMENT, VERTEX},
        settings::PipelineSettings,
    };
    use ash::vk::{self, Handle as _};
    use lofi_core::{
        log::{Log, MessageKind},
        pool::Handle,
    };
    use std::sync::{mpsc::channel, Arc};

    fn context(device: &Arc<RecordingDevice>) -> GraphicsContext {
        GraphicsContext::new(
            device.clone(),
            vk::DescriptorSetLayout::from_raw(7),
            PipelineSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn program_to_kernel() {
        let device = Arc::new(RecordingDevice::default());
        let mut context = context(&device);

        let program = context.create_program();
        assert!(!context.program(program).unwrap().is_compiled());
        context
            .compile_program(program, "sprite", &[VERTEX, FRAGMENT])
            .unwrap();

        let kernel = context.create_kernel(program).unwrap();
        assert!(context
            .kernel_mut(kernel)
            .unwrap()
            .set_variable("scale", &1.0f32.to_ne_bytes()));
        assert_eq!(context.kernel(kernel).unwrap().name(), "sprite");

        // The kernel does not depend on the program once built.
        assert!(context.destroy_program(program));
        assert!(context.kernel(kernel).is_some());
        assert!(context.destroy_kernel(kernel));
        assert!(!context.destroy_kernel(kernel));
        assert_eq!(device.live_objects(), 0);
    }

    #[test]
    fn handles_are_checked() {
        let device = Arc::new(RecordingDevice::default());
        let mut context = context(&device);

        let err = context.create_kernel(Handle::NONE).err().unwrap();
        assert!(matches!(
            err,
            PipelineError::Precondition(PreconditionFailure::InvalidHandle)
        ));

        let program = context.create_program();
        context.destroy_program(program);
        let err = context.create_kernel(program).err().unwrap();
        assert!(matches!(
            err,
            PipelineError::Precondition(PreconditionFailure::MissingProgram)
        ));

        let err = context
            .compile_program(program, "stale", &[VERTEX])
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Precondition(PreconditionFailure::MissingProgram)
        ));
        assert!(device.layout_calls.lock().is_empty());
    }

    #[test]
    fn compile_failures_are_logged_as_warnings() {
        let (sender, receiver) = channel();
        Log::add_listener(sender);

        let device = Arc::new(RecordingDevice::default());
        let mut context = context(&device);
        let program = context.create_program();
        let broken = VERTEX.replace("#set topology = triangle_list", "#set topology =");
        assert!(context
            .compile_program(program, "warned_program", &[broken.as_str()])
            .is_err());

        let message = receiver
            .try_iter()
            .find(|message| message.content.contains("warned_program"))
            .unwrap();
        assert_eq!(message.kind, MessageKind::Warning);
        assert!(message.content.contains("line 2"));
    }

    #[test]
    fn native_failures_are_logged_as_errors() {
        let (sender, receiver) = channel();
        Log::add_listener(sender);

        let device = Arc::new(RecordingDevice::default());
        let mut context = context(&device);
        let program = context.create_program();
        context
            .compile_program(program, "rejected_pipeline", &[VERTEX, FRAGMENT])
            .unwrap();

        *device.fail_pipeline.lock() = Some(vk::Result::ERROR_OUT_OF_HOST_MEMORY);
        assert!(context.create_kernel(program).is_err());

        let message = receiver
            .try_iter()
            .find(|message| message.content.contains("unable to create graphics pipeline"))
            .unwrap();
        assert_eq!(message.kind, MessageKind::Error);
    }
}
