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

//! Offline checker: parses, compiles and reflects stage sources without a GPU and prints the
//! resulting pipeline state and push constant layout.

use clap::Parser;
use lofi::{
    core::log::{Log, MessageKind},
    graphics::{compiler::ShaderCompiler, program::compile_stages, settings::PipelineSettings},
};
use std::{path::PathBuf, process::ExitCode};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Stage sources of one program, each with its own entry marker (`VSMain`, `PSMain`, ...).
    #[clap(required = true)]
    files: Vec<PathBuf>,

    /// Program name used in diagnostics. Defaults to the stem of the first file.
    #[clap(short, long)]
    name: Option<String>,

    /// Settings file in RON format.
    #[clap(short, long)]
    settings: Option<PathBuf>,

    /// Print reflection details as well.
    #[clap(short, long, default_value = "false")]
    verbose: bool,
}

fn run(args: Args) -> Result<(), String> {
    let settings = match args.settings.as_ref() {
        Some(path) => PipelineSettings::load(path)
            .map_err(|e| format!("unable to load {}: {e}", path.display()))?,
        None => PipelineSettings::default(),
    };
    settings.apply_log_settings().map_err(|e| e.to_string())?;
    if !args.verbose {
        Log::set_verbosity(MessageKind::Warning.max(settings.log.verbosity));
    }

    let sources = args
        .files
        .iter()
        .map(|path| {
            std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let sources = sources.iter().map(String::as_str).collect::<Vec<_>>();

    let name = args.name.unwrap_or_else(|| {
        args.files[0]
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let mut compiler = ShaderCompiler::new(settings.compiler).map_err(|e| e.to_string())?;
    let artifacts = compile_stages(&mut compiler, &name, &sources).map_err(|e| e.to_string())?;

    println!("program: {name}");
    for (stage, spirv) in &artifacts.stages {
        println!("{stage}: {} words", spirv.len());
    }
    println!("{}", artifacts.state);
    println!("push constants: {} bytes", artifacts.push_constants.size);
    for (member, variable) in artifacts.push_constants.sorted() {
        println!(
            "  {member}: offset {}, size {}",
            variable.offset, variable.size
        );
    }

    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
