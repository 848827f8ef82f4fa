// Build script to compile GLSL shaders to SPIR-V
//
// Every shaders/*.vert and shaders/*.frag is compiled next to its source
// (shader.vert -> shader.vert.spv). A missing glslc or a failed compile is
// reported as a cargo warning; the backend bootstrap never needs shaders.

use std::path::{Path, PathBuf};
use std::process::Command;

const SHADER_DIR: &str = "shaders";

fn main() {
    println!("cargo:rerun-if-changed={}", SHADER_DIR);

    let entries = match std::fs::read_dir(SHADER_DIR) {
        Ok(entries) => entries,
        Err(e) => {
            println!("cargo:warning=No {} directory ({}), skipping shader compilation", SHADER_DIR, e);
            return;
        }
    };

    let mut sources: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_shader_source(path))
        .collect();
    sources.sort();

    for source in sources {
        println!("cargo:rerun-if-changed={}", source.display());
        compile_shader(&source);
    }
}

fn is_shader_source(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("vert") | Some("frag")
    )
}

fn compile_shader(input: &Path) {
    let mut output = input.as_os_str().to_owned();
    output.push(".spv");
    let output = PathBuf::from(output);

    // glslc ships with the Vulkan SDK
    let result = Command::new("glslc").arg(input).arg("-o").arg(&output).status();

    match result {
        Ok(status) if status.success() => {}
        Ok(status) => {
            println!(
                "cargo:warning=Failed to compile {}: exit code {:?}",
                input.display(),
                status.code()
            );
        }
        Err(e) => {
            println!("cargo:warning=glslc not found ({}), {} not compiled", e, input.display());
            println!(
                "cargo:warning=Install the Vulkan SDK or run: glslc {} -o {}",
                input.display(),
                output.display()
            );
        }
    }
}
