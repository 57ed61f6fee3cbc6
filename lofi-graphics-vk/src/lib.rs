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

//! Vulkan graphics pipeline builder.
//!
//! Stage sources are plain GLSL with an entry function named after its stage (`VSMain`,
//! `PSMain`, ...) and fixed-function state declared inline:
//!
//! ```text
//! #set topology = triangle_list
//! #set vs_binding = 0 20 vertex
//! #set vs_location = 0 0 r32g32_sfloat 0
//! ```
//!
//! [`context::GraphicsContext`] compiles such sources into [`program::Program`]s and builds
//! [`kernel::Kernel`]s (pipeline layout, pipeline and push constant buffer) from them.

pub mod analyzer;
pub mod compiler;
pub mod context;
pub mod device;
pub mod directive;
pub mod error;
pub mod format;
pub mod kernel;
pub mod program;
pub mod reflection;
pub mod settings;
pub mod stage;
pub mod state;

pub use ash::vk;
pub use lofi_core as core;
