//! Output side of code generation.

use crate::imports::AccountImports;
use crate::resolver::ResolvedAccount;
use indexmap::IndexMap;
use movecodec_core::{CodegenError, InternalMoveStruct};
use serde::Serialize;
use std::path::PathBuf;

/// Receives resolved output units in registration order.
pub trait CodegenSink {
    fn emit(
        &mut self,
        unit: &ResolvedAccount,
        imports: &AccountImports,
        events: &IndexMap<String, InternalMoveStruct>,
    ) -> Result<(), CodegenError>;

    /// Called once after the last unit.
    fn finish(&mut self) -> Result<(), CodegenError> {
        Ok(())
    }
}

/// Records emitted unit names.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub units: Vec<String>,
    pub finished: bool,
}

impl CodegenSink for MemorySink {
    fn emit(
        &mut self,
        unit: &ResolvedAccount,
        _imports: &AccountImports,
        _events: &IndexMap<String, InternalMoveStruct>,
    ) -> Result<(), CodegenError> {
        self.units.push(unit.file_name.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), CodegenError> {
        self.finished = true;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ModuleSummary<'a> {
    name: &'a str,
    structs: Vec<&'a str>,
    functions: Vec<&'a str>,
    enums: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct UnitManifest<'a> {
    account: &'a str,
    fetched: bool,
    modules: Vec<ModuleSummary<'a>>,
    imports: &'a IndexMap<String, indexmap::IndexSet<String>>,
    events: Vec<&'a String>,
}

/// Writes one `<file_name>.json` manifest per unit plus an `index.json`
/// listing them, the inputs a binding generator consumes.
#[derive(Debug)]
pub struct ManifestSink {
    out_dir: PathBuf,
    written: Vec<String>,
}

impl ManifestSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[String] {
        &self.written
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<(), CodegenError> {
        let body = serde_json::to_string_pretty(value).map_err(|e| CodegenError::Sink {
            module: file.to_string(),
            reason: e.to_string(),
        })?;
        std::fs::write(self.out_dir.join(file), body)?;
        Ok(())
    }
}

impl CodegenSink for ManifestSink {
    fn emit(
        &mut self,
        unit: &ResolvedAccount,
        imports: &AccountImports,
        events: &IndexMap<String, InternalMoveStruct>,
    ) -> Result<(), CodegenError> {
        std::fs::create_dir_all(&self.out_dir)?;
        let manifest = UnitManifest {
            account: &unit.account,
            fetched: unit.fetched,
            modules: unit
                .modules
                .iter()
                .map(|m| ModuleSummary {
                    name: &m.name,
                    structs: m.structs.iter().map(|s| s.name.as_str()).collect(),
                    functions: m.functions.iter().map(|f| f.name.as_str()).collect(),
                    enums: m.enums.iter().map(|e| e.name.as_str()).collect(),
                })
                .collect(),
            imports: &imports.imports,
            events: events.keys().collect(),
        };
        let file = format!("{}.json", unit.file_name);
        self.write_json(&file, &manifest)?;
        self.written.push(file);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), CodegenError> {
        std::fs::create_dir_all(&self.out_dir)?;
        self.write_json("index.json", &self.written)
    }
}
