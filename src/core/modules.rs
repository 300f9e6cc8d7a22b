//! Module index.
//!
//! Every file reachable from the entry file through relative `require(...)` or
//! `import` specifiers is loaded and parsed up front, before anything is resolved.
//! Value resolution then looks modules up in the index instead of touching the
//! filesystem mid-evaluation, which also makes cycles and repeated references cheap
//! to handle.
//!
//! A file that fails to load does not fail indexing: the failure is recorded against
//! the `(importer, specifier)` pair and only becomes fatal if resolution actually
//! needs that module's value.

use std::collections::{HashMap, VecDeque};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::comments::reattach_program;
use crate::core::diagnostics::Diagnostics;
use crate::core::parsers::parse_source;
use crate::core::syntax::Program;
use crate::error::{DocgenError, Result};

/// Index of a module inside [`ModuleIndex`]. The entry module is always `0`.
pub type ModuleId = usize;

pub const ENTRY: ModuleId = 0;

/// Extensions tried, in order, when a specifier does not name an existing file.
const EXTENSIONS: &[&str] = &[".js", ".cjs", ".mjs", ".ts", ".json"];

/// Directory index files tried when a specifier names a directory.
const INDEX_FILES: &[&str] = &["index.js", "index.ts", "index.json"];

#[derive(Debug)]
pub enum ModuleSource {
    Script(Program),
    Json(serde_json::Value),
}

#[derive(Debug)]
pub struct SourceModule {
    /// Path as given (the entry file) or as resolved (dependencies).
    pub path: PathBuf,
    pub source: ModuleSource,
}

impl SourceModule {
    pub fn program(&self) -> Option<&Program> {
        match &self.source {
            ModuleSource::Script(program) => Some(program),
            ModuleSource::Json(_) => None,
        }
    }

    /// Directory relative specifiers are resolved against.
    fn base_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// What a `(importer, specifier)` pair points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    Loaded(ModuleId),
    /// The file is missing or failed to parse.
    Failed(String),
}

#[derive(Debug)]
pub struct ModuleIndex {
    modules: Vec<SourceModule>,
    links: HashMap<(ModuleId, String), Link>,
}

/// Whether a specifier refers to a file rather than a package.
pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/')
}

/// Resolve a relative specifier the way Node does for CommonJS.
fn resolve_path(base_dir: &Path, specifier: &str) -> Option<PathBuf> {
    let target = base_dir.join(specifier);
    let with_extensions = EXTENSIONS.iter().map(|ext| {
        let mut path = OsString::from(target.as_os_str());
        path.push(ext);
        PathBuf::from(path)
    });
    let index_files = INDEX_FILES.iter().map(|index| target.join(index));

    std::iter::once(target.clone())
        .chain(with_extensions)
        .chain(index_files)
        .find(|candidate| candidate.is_file())
}

fn load_module(path: &Path) -> std::result::Result<(ModuleSource, Vec<String>), String> {
    let code = fs::read_to_string(path).map_err(|e| e.to_string())?;
    if path.extension().is_some_and(|ext| ext == "json") {
        let value = serde_json::from_str(&code).map_err(|e| format!("invalid JSON: {}", e))?;
        return Ok((ModuleSource::Json(value), Vec::new()));
    }
    let parsed = parse_source(code, &path.to_string_lossy()).map_err(|e| e.to_string())?;
    let mut program = parsed.program;
    reattach_program(&mut program);
    Ok((ModuleSource::Script(program), parsed.requires))
}

impl ModuleIndex {
    /// Index the entry file at `path` and everything it references.
    pub fn load(path: &Path, diagnostics: &Diagnostics) -> Result<Self> {
        let code = fs::read_to_string(path).map_err(|source| DocgenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(code, path, diagnostics)
    }

    /// Index entry source text. `path` names the file for diagnostics and is the
    /// base for relative specifiers (`-` means the current directory).
    pub fn from_source(code: String, path: &Path, diagnostics: &Diagnostics) -> Result<Self> {
        let parsed = parse_source(code, &path.to_string_lossy())?;
        let mut program = parsed.program;
        reattach_program(&mut program);

        let mut index = Self {
            modules: vec![SourceModule {
                path: path.to_path_buf(),
                source: ModuleSource::Script(program),
            }],
            links: HashMap::new(),
        };
        let mut by_path: HashMap<PathBuf, ModuleId> = HashMap::new();
        if let Ok(canonical) = fs::canonicalize(path) {
            by_path.insert(canonical, ENTRY);
        }
        let mut queue = VecDeque::from([(ENTRY, parsed.requires)]);

        while let Some((importer, specifiers)) = queue.pop_front() {
            let base_dir = index.modules[importer].base_dir();
            for specifier in specifiers {
                if !is_relative(&specifier) {
                    continue;
                }
                let link = match resolve_path(&base_dir, &specifier) {
                    None => Link::Failed("file not found".to_string()),
                    Some(found) => {
                        let key = fs::canonicalize(&found).unwrap_or_else(|_| found.clone());
                        match by_path.get(&key) {
                            Some(&id) => Link::Loaded(id),
                            None => match load_module(&found) {
                                Ok((source, requires)) => {
                                    let id = index.modules.len();
                                    diagnostics.info(format!("indexed module {}", found.display()));
                                    index.modules.push(SourceModule {
                                        path: found,
                                        source,
                                    });
                                    by_path.insert(key, id);
                                    queue.push_back((id, requires));
                                    Link::Loaded(id)
                                }
                                Err(reason) => Link::Failed(reason),
                            },
                        }
                    }
                };
                index.links.insert((importer, specifier), link);
            }
        }

        Ok(index)
    }

    pub fn module(&self, id: ModuleId) -> &SourceModule {
        &self.modules[id]
    }

    pub fn entry(&self) -> &SourceModule {
        &self.modules[ENTRY]
    }

    pub(crate) fn len(&self) -> usize {
        self.modules.len()
    }

    /// Target of a specifier used in `importer`. `None` for package specifiers,
    /// which are never indexed.
    pub fn link(&self, importer: ModuleId, specifier: &str) -> Option<&Link> {
        self.links.get(&(importer, specifier.to_string()))
    }
}
