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

//! Pipeline builder settings, stored in RON.

use lofi_core::log::{Log, MessageKind};
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::{fs::File, path::Path, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("unable to serialize settings: {0}")]
    Serialize(#[from] ron::Error),
}

/// Mirrors `shaderc::OptimizationLevel`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationLevel {
    #[default]
    Zero,
    Size,
    Performance,
}

impl From<OptimizationLevel> for shaderc::OptimizationLevel {
    fn from(level: OptimizationLevel) -> Self {
        match level {
            OptimizationLevel::Zero => shaderc::OptimizationLevel::Zero,
            OptimizationLevel::Size => shaderc::OptimizationLevel::Size,
            OptimizationLevel::Performance => shaderc::OptimizationLevel::Performance,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// `#version` inserted into sources that do not declare one.
    pub default_glsl_version: u32,
    pub optimization: OptimizationLevel,
    pub generate_debug_info: bool,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            default_glsl_version: 460,
            optimization: OptimizationLevel::Zero,
            generate_debug_info: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub verbosity: MessageKind,
    pub file: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub compiler: CompilerSettings,
    pub log: LogSettings,
}

impl PipelineSettings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let file = File::open(path)?;
        Ok(ron::de::from_reader(file)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let file = File::create(path)?;
        ron::ser::to_writer_pretty(file, self, PrettyConfig::default())?;
        Ok(())
    }

    pub fn from_ron(source: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(source)?)
    }

    /// Pushes the log section into the global [`Log`].
    pub fn apply_log_settings(&self) -> Result<(), SettingsError> {
        Log::set_verbosity(self.log.verbosity);
        if let Some(path) = self.log.file.as_ref() {
            Log::set_file(Some(File::create(path)?));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{OptimizationLevel, PipelineSettings};
    use lofi_core::log::MessageKind;

    #[test]
    fn missing_sections_take_defaults() {
        let settings =
            PipelineSettings::from_ron("(compiler: (optimization: Performance))").unwrap();
        assert_eq!(settings.compiler.optimization, OptimizationLevel::Performance);
        assert_eq!(settings.compiler.default_glsl_version, 460);
        assert_eq!(settings.log.verbosity, MessageKind::Information);
        assert!(settings.log.file.is_none());
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join("lofi_settings_test.ron");
        let mut settings = PipelineSettings::default();
        settings.compiler.generate_debug_info = true;
        settings.log.verbosity = MessageKind::Warning;
        settings.save(&path).unwrap();

        let loaded = PipelineSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(PipelineSettings::from_ron("(compiler: 5)").is_err());
    }
}
