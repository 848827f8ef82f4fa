// Shader module loading
//
// Vulkan uses SPIR-V bytecode for shaders. This module loads compiled
// shaders from disk and wraps the resulting modules. Pipeline state is
// built elsewhere.

use ash::vk;
use std::io::Cursor;
use std::path::Path;

use super::error::{BootstrapError, BootstrapResult};

/// Decode SPIR-V bytes into words (checks magic number and alignment)
pub fn decode_spirv(bytes: &[u8]) -> std::io::Result<Vec<u32>> {
    ash::util::read_spv(&mut Cursor::new(bytes))
}

/// Read and decode a SPIR-V file; errors name the file
pub fn read_spirv_file(path: &Path) -> BootstrapResult<Vec<u32>> {
    let spirv_error = |source| BootstrapError::Spirv {
        path: path.display().to_string(),
        source,
    };

    let bytes = std::fs::read(path).map_err(spirv_error)?;
    decode_spirv(&bytes).map_err(spirv_error)
}

/// Shader module destroyed on drop
pub struct ShaderModule {
    pub module: vk::ShaderModule,
    device: ash::Device,
}

impl ShaderModule {
    pub fn from_file(device: &ash::Device, path: impl AsRef<Path>) -> BootstrapResult<Self> {
        let path = path.as_ref();
        let code = read_spirv_file(path)?;
        let module = Self::from_words(device, &code)?;

        log::info!("Loaded shader module {:?} ({} words)", path, code.len());
        Ok(module)
    }

    pub fn from_words(device: &ash::Device, code: &[u32]) -> BootstrapResult<Self> {
        let create_info = vk::ShaderModuleCreateInfo::builder().code(code);

        let module = unsafe { device.create_shader_module(&create_info, None) }
            .map_err(BootstrapError::creation("shader module"))?;

        Ok(Self {
            module,
            device: device.clone(),
        })
    }
}

impl Drop for ShaderModule {
    fn drop(&mut self) {
        unsafe { self.device.destroy_shader_module(self.module, None) };
    }
}

/// Vertex + fragment pair used by the (not yet built) graphics pipeline
pub struct ShaderPair {
    pub vertex: ShaderModule,
    pub fragment: ShaderModule,
}

impl ShaderPair {
    pub fn load(
        device: &ash::Device,
        vertex: impl AsRef<Path>,
        fragment: impl AsRef<Path>,
    ) -> BootstrapResult<Self> {
        Ok(Self {
            vertex: ShaderModule::from_file(device, vertex)?,
            fragment: ShaderModule::from_file(device, fragment)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPIRV_MAGIC: u32 = 0x0723_0203;

    #[test]
    fn decodes_little_endian_words() {
        let mut bytes = SPIRV_MAGIC.to_le_bytes().to_vec();
        bytes.extend_from_slice(&0x0001_0000u32.to_le_bytes());

        let words = decode_spirv(&bytes).unwrap();
        assert_eq!(words, vec![SPIRV_MAGIC, 0x0001_0000]);
    }

    #[test]
    fn rejects_truncated_input() {
        let bytes = [0x03, 0x02, 0x23, 0x07, 0x00];
        assert!(decode_spirv(&bytes).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.vert.spv");

        let err = read_spirv_file(&path).unwrap_err();
        assert!(matches!(err, BootstrapError::Spirv { .. }));
        assert!(err.to_string().contains("missing.vert.spv"));
    }

    #[test]
    fn misaligned_file_is_rejected_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.frag.spv");
        std::fs::write(&path, [0x03, 0x02, 0x23]).unwrap();

        let err = read_spirv_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.frag.spv"));
    }

    #[test]
    fn reads_spirv_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shader.frag.spv");
        std::fs::write(&path, SPIRV_MAGIC.to_le_bytes()).unwrap();

        assert_eq!(read_spirv_file(&path).unwrap(), vec![SPIRV_MAGIC]);
    }
}
