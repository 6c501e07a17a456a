//! `fields.js` compiler
//!
//! A module's `fields.js` exports a function returning (possibly a promise
//! of) an array of field definitions. It is evaluated with `node` and the
//! flattened result is written as `fields.json` into a fresh scratch
//! directory, which goes away with the returned artifact.
//!
//! The exported function receives the user's `--options`: `undefined` when
//! none were given, a string for one, an array of strings for several.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::domain::ports::{AssetCompiler, CompiledArtifact};
use crate::error::CompileError;

const SOURCE_NAME: &str = "fields.js";
const ARTIFACT_NAME: &str = "fields.json";

const BOOTSTRAP: &str = r#"
const fs = require('fs');
const [file, out, options] = process.argv.slice(1);
const args = options === undefined ? undefined : JSON.parse(options);
Promise.resolve(require(file)(args))
  .then((fields) => {
    if (!Array.isArray(fields)) {
      throw new SyntaxError(`${file} does not return an array.`);
    }
    const json = fields
      .flat(Infinity)
      .map((f) => (f && typeof f.toJSON === 'function' ? f.toJSON() : f));
    fs.writeFileSync(out, JSON.stringify(json));
  })
  .catch((err) => {
    console.error(err && err.stack ? err.stack : String(err));
    process.exit(1);
  });
"#;

/// Whether `path` is a `fields.js` that gets compiled: at the root of the
/// tree, or anywhere inside a `*.module` folder.
pub fn is_processable_fields_js(root: &Path, path: &Path) -> bool {
    if !path.file_name().is_some_and(|name| name == SOURCE_NAME) {
        return false;
    }
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };
    if relative == Path::new(SOURCE_NAME) {
        return true;
    }
    relative
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .any(|c| c.as_os_str().to_string_lossy().ends_with(".module"))
}

/// JSON for the options argument, or `None` to leave it undefined
fn options_json(options: &[String]) -> Option<String> {
    match options {
        [] => None,
        [one] => Some(serde_json::Value::from(one.as_str()).to_string()),
        many => Some(serde_json::Value::from(many.to_vec()).to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct FieldsJsCompiler {
    root: PathBuf,
    node: PathBuf,
    options: Vec<String>,
}

impl FieldsJsCompiler {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            node: PathBuf::from("node"),
            options: Vec::new(),
        }
    }

    /// Values handed to every `fields.js` as its options argument
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    /// Use a specific `node` executable
    pub fn with_node(mut self, node: impl Into<PathBuf>) -> Self {
        self.node = node.into();
        self
    }
}

impl AssetCompiler for FieldsJsCompiler {
    fn is_compilable(&self, path: &Path) -> bool {
        is_processable_fields_js(&self.root, path)
    }

    fn artifact_name(&self, _path: &Path) -> String {
        ARTIFACT_NAME.to_string()
    }

    fn compile(&self, path: &Path) -> Result<CompiledArtifact, CompileError> {
        let scratch = tempfile::Builder::new()
            .prefix("cmsync-fields-")
            .tempdir()?;
        let out = scratch.path().join(ARTIFACT_NAME);

        tracing::info!(
            "Converting {} to {}",
            path.display(),
            path.with_file_name(ARTIFACT_NAME).display()
        );

        // Relative file access inside fields.js resolves against its folder.
        let mut command = Command::new(&self.node);
        command.arg("-e").arg(BOOTSTRAP).arg(path).arg(&out);
        if let Some(json) = options_json(&self.options) {
            command.arg(json);
        }
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|source| CompileError::Spawn {
            file: path.to_path_buf(),
            source,
        })?;
        if !output.status.success() {
            return Err(CompileError::Failed {
                file: path.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if !out.is_file() {
            return Err(CompileError::MissingArtifact {
                file: path.to_path_buf(),
            });
        }

        Ok(CompiledArtifact::in_scratch(out, scratch))
    }
}
