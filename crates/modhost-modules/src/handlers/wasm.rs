//! WebAssembly modules, recognised by their magic number.

use modhost_fs::io::read_prefix;
use modhost_resolver::ResolvedArtifact;

use crate::error::Result;
use crate::handler::ModuleHandler;
use crate::runtime::{InstallRequest, ModuleHandle, ModuleKind, ModuleRuntime, Properties};

const WASM_MAGIC: &[u8; 4] = b"\0asm";

#[derive(Debug, Clone, Default)]
pub struct WasmHandler;

impl WasmHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleHandler for WasmHandler {
    fn name(&self) -> &str {
        "wasm"
    }

    fn can_handle(&self, artifact: &ResolvedArtifact) -> bool {
        read_prefix(&artifact.path, WASM_MAGIC.len())
            .map(|head| head == WASM_MAGIC)
            .unwrap_or(false)
    }

    fn install(
        &self,
        runtime: &dyn ModuleRuntime,
        artifact: &ResolvedArtifact,
        properties: &Properties,
    ) -> Result<ModuleHandle> {
        let handle = runtime.install(InstallRequest {
            locator: artifact.locator.clone(),
            path: artifact.path.clone(),
            kind: ModuleKind::Wasm,
            properties: properties.clone(),
        })?;
        Ok(handle)
    }
}
