//! Repo-local architectural lint for the travel client's module boundaries.
//!
//! The client is split into `domain` (the API facade, session manager and
//! ports), `inbound` (the `trip` command line) and `outbound` (the reqwest
//! transport and the token store). This crate parses those modules with
//! `syn` and:
//!
//! - forbids `domain` code from depending on adapter modules (`inbound`,
//!   `outbound`) or on HTTP, filesystem, CLI and configuration crates
//! - forbids `inbound` code from importing `outbound` modules or the HTTP
//!   and filesystem crates directly
//! - forbids `outbound` adapters from importing `inbound` modules or `clap`
//!
//! Run it with `cargo run -p architecture-lint`.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use syn::visit::Visit;

/// Library name of the linted crate, as used in absolute paths.
const CRATE_NAME: &str = "travel_client";

/// A single boundary violation discovered by the linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `client/src`.
    pub file: PathBuf,
    /// Human-readable description of the violated rule.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

/// Failure modes returned by the architecture lint.
#[derive(Debug)]
pub enum ArchitectureLintError {
    /// Filesystem traversal or reading failed.
    Io(io::Error),
    /// Rust source parsing failed, or the file sits outside every layer.
    Parse { file: PathBuf, message: String },
    /// One or more boundary violations were found.
    Violations(Vec<Violation>),
}

impl fmt::Display for ArchitectureLintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "could not read client sources: {err}"),
            Self::Parse { file, message } => {
                write!(f, "could not lint {}: {message}", file.display())
            }
            Self::Violations(violations) => {
                writeln!(f, "{} layer boundary violation(s):", violations.len())?;
                violations
                    .iter()
                    .try_for_each(|violation| writeln!(f, "  {violation}"))
            }
        }
    }
}

impl std::error::Error for ArchitectureLintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ArchitectureLintError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Lint the client crate sources on disk.
///
/// `client_dir` must be the `client/` directory at the repository root.
pub fn lint_client_sources(client_dir: &Path) -> Result<(), ArchitectureLintError> {
    let src_dir = client_dir.join("src");
    let sources = collect_lint_sources(&src_dir)?;
    lint_sources(&sources)
}

/// Lint the provided Rust sources. Intended for unit and behaviour tests.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();

    for source in sources {
        let layer = Layer::of(&source.file).ok_or_else(|| ArchitectureLintError::Parse {
            file: source.file.clone(),
            message: "file is not under domain/, inbound/ or outbound/".to_owned(),
        })?;
        let parsed =
            syn::parse_file(&source.contents).map_err(|err| ArchitectureLintError::Parse {
                file: source.file.clone(),
                message: err.to_string(),
            })?;
        violations.extend(check_file(&source.file, layer, &parsed));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `client/src`.
    pub file: PathBuf,
    pub contents: String,
}

/// Top-level module a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Domain,
    Inbound,
    Outbound,
}

/// What one layer may not reach.
struct LayerRules {
    modules: &'static [&'static str],
    crates: &'static [&'static str],
}

const DOMAIN_RULES: LayerRules = LayerRules {
    modules: &["inbound", "outbound"],
    crates: &[
        "cap_std",
        "clap",
        "ortho_config",
        "reqwest",
        "tracing_subscriber",
    ],
};

const INBOUND_RULES: LayerRules = LayerRules {
    modules: &["outbound"],
    crates: &["cap_std", "reqwest"],
};

const OUTBOUND_RULES: LayerRules = LayerRules {
    modules: &["inbound"],
    crates: &["clap"],
};

const LAYER_DIRS: [&str; 3] = ["domain", "inbound", "outbound"];

impl Layer {
    fn of(relative_path: &Path) -> Option<Self> {
        let first = relative_path.components().next()?.as_os_str().to_str()?;
        match first {
            "domain" => Some(Self::Domain),
            "inbound" => Some(Self::Inbound),
            "outbound" => Some(Self::Outbound),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    const fn rules(self) -> &'static LayerRules {
        match self {
            Self::Domain => &DOMAIN_RULES,
            Self::Inbound => &INBOUND_RULES,
            Self::Outbound => &OUTBOUND_RULES,
        }
    }
}

fn check_file(file: &Path, layer: Layer, parsed: &syn::File) -> Vec<Violation> {
    let rules = layer.rules();
    let mut collector = PathCollector::default();
    collector.visit_file(parsed);

    let mut messages = BTreeSet::new();
    for segments in &collector.paths {
        match classify(segments) {
            Some(Target::Module(root)) if rules.modules.contains(&root) => {
                messages.insert(format!(
                    "{} module must not depend on crate::{root}",
                    layer.name()
                ));
            }
            Some(Target::Crate(root)) if rules.crates.contains(&root) => {
                messages.insert(format!(
                    "{} module must not depend on external crate `{root}`",
                    layer.name()
                ));
            }
            _ => {}
        }
    }

    messages
        .into_iter()
        .map(|message| Violation {
            file: file.to_path_buf(),
            message,
        })
        .collect()
}

/// What the first meaningful segment of a path refers to.
#[derive(Debug, PartialEq, Eq)]
enum Target<'a> {
    /// A top-level module of the linted crate.
    Module(&'a str),
    /// Some other crate.
    Crate(&'a str),
}

fn is_relative(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super")
}

fn classify(segments: &[String]) -> Option<Target<'_>> {
    let first = segments.first()?.as_str();
    if LAYER_DIRS.contains(&first) {
        return Some(Target::Module(first));
    }
    if first == CRATE_NAME {
        return segments.get(1).map(|next| Target::Module(next.as_str()));
    }
    if is_relative(first) {
        return segments
            .iter()
            .map(String::as_str)
            .find(|segment| !is_relative(segment))
            .map(Target::Module);
    }
    Some(Target::Crate(first))
}

#[derive(Default)]
struct PathCollector {
    paths: BTreeSet<Vec<String>>,
}

impl PathCollector {
    fn record_use_tree(&mut self, tree: &syn::UseTree, mut prefix: Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.record_use_tree(&path.tree, prefix);
            }
            syn::UseTree::Name(name) => {
                prefix.push(name.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Rename(rename) => {
                prefix.push(rename.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Glob(_) => {
                prefix.push("*".to_owned());
                self.paths.insert(prefix);
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.record_use_tree(item, prefix.clone());
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for PathCollector {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        let segments: Vec<String> = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        if !segments.is_empty() {
            self.paths.insert(segments);
        }
        syn::visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.record_use_tree(&node.tree, Vec::new());
    }

    fn visit_item_extern_crate(&mut self, node: &'ast syn::ItemExternCrate) {
        self.paths.insert(vec![node.ident.to_string()]);
    }
}

fn collect_lint_sources(src_dir: &Path) -> Result<Vec<LintSource>, ArchitectureLintError> {
    let mut pending: Vec<PathBuf> = LAYER_DIRS
        .iter()
        .map(|layer| src_dir.join(layer))
        .filter(|dir| dir.is_dir())
        .collect();
    let mut sources = Vec::new();

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                sources.push(read_source(src_dir, &path)?);
            }
        }
    }

    sources.sort_by(|left, right| left.file.cmp(&right.file));
    Ok(sources)
}

fn read_source(src_dir: &Path, path: &Path) -> Result<LintSource, ArchitectureLintError> {
    let file = path
        .strip_prefix(src_dir)
        .map_err(|err| ArchitectureLintError::Parse {
            file: path.to_path_buf(),
            message: err.to_string(),
        })?
        .to_path_buf();
    Ok(LintSource {
        file,
        contents: fs::read_to_string(path)?,
    })
}

#[cfg(test)]
mod tests;
