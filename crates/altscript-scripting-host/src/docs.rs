use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::engine::{NativeFn, Registrar};
use crate::error::EngineError;

const PADDING: &str = "    ";

/// Collects every declaration exposed to scripts and renders them as an
/// interface listing
#[derive(Debug, Clone, Default)]
pub struct DocsGenerator {
    module: String,
    declarations: Vec<String>,
    funcdefs: Vec<String>,
    event_declarations: Vec<String>,
}

impl DocsGenerator {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..Default::default()
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn push_declaration(&mut self, decl: impl Into<String>) {
        self.declarations.push(decl.into());
    }

    pub fn push_funcdef(&mut self, decl: impl Into<String>) {
        self.funcdefs.push(format!("funcdef {}", decl.into()));
    }

    pub fn push_event_declaration(&mut self, decl: impl Into<String>) {
        self.event_declarations.push(decl.into());
    }

    pub fn declarations(&self) -> &[String] {
        &self.declarations
    }

    pub fn funcdefs(&self) -> &[String] {
        &self.funcdefs
    }

    pub fn event_declarations(&self) -> &[String] {
        &self.event_declarations
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "// Generated on {}\n\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("namespace {}\n{{\n", self.module));

        let sections = [
            ("Funcdefs", &self.funcdefs),
            ("Functions", &self.declarations),
            ("Events", &self.event_declarations),
        ];
        let mut first = true;
        for (title, entries) in sections {
            if entries.is_empty() {
                continue;
            }
            if !first {
                out.push('\n');
            }
            first = false;

            out.push_str(&format!("{PADDING}// ********** {title} **********\n"));
            for entry in entries {
                out.push_str(&format!("{PADDING}{entry};\n"));
            }
        }

        out.push_str("}\n");
        out
    }

    /// Write `<module>Docs.as` into `dir`
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}Docs.as", self.module));
        fs::write(&path, self.render())?;
        info!(target: "scripting", "Wrote script docs to {}", path.display());
        Ok(path)
    }
}

/// Registrar that only records declarations, for emitting docs without an
/// interpreter
#[derive(Debug, Default)]
pub struct DeclarationRecorder {
    pub funcdefs: Vec<String>,
    pub functions: Vec<String>,
}

impl Registrar for DeclarationRecorder {
    fn register_funcdef(&mut self, decl: &str) -> Result<(), EngineError> {
        self.funcdefs.push(decl.to_string());
        Ok(())
    }

    fn register_global_function(
        &mut self,
        decl: &str,
        _native: NativeFn,
    ) -> Result<(), EngineError> {
        self.functions.push(decl.to_string());
        Ok(())
    }
}

/// Run every host binding against a recorder and collect the resulting docs
pub fn generate_docs(module: &str) -> Result<DocsGenerator, EngineError> {
    let mut recorder = DeclarationRecorder::default();
    let mut docs = DocsGenerator::new(module);
    crate::host_imports::add_host_imports(&mut recorder, &mut docs)?;
    crate::registry::registry().expose_all(&mut recorder, &mut docs)?;
    Ok(docs)
}
