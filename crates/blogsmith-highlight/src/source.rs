//! Where grammar definitions come from
//!
//! A [`GrammarSource`] maps canonical language names to asynchronous
//! loaders. Languages without a loader are reported as `None` so callers
//! can fall back to plain text instead of treating them as errors.

use std::path::{Path, PathBuf};

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};
use syntect::parsing::SyntaxDefinition;

use crate::error::HighlightError;

/// A grammar ready to hand to the engine
#[derive(Debug, Clone)]
pub enum GrammarSpec {
    /// A syntax bundled with the engine, found by file extension
    Bundled { extension: String },
    /// A parsed `.sublime-syntax` definition
    Definition(Box<SyntaxDefinition>),
}

impl GrammarSpec {
    pub fn bundled(extension: &str) -> Self {
        GrammarSpec::Bundled {
            extension: extension.to_string(),
        }
    }

    /// Parse `.sublime-syntax` YAML; errors name `language`
    pub fn from_sublime_syntax(language: &str, text: &str) -> Result<Self, HighlightError> {
        SyntaxDefinition::load_from_str(text, true, Some(language))
            .map(|definition| GrammarSpec::Definition(Box::new(definition)))
            .map_err(|e| HighlightError::grammar(language, e))
    }
}

/// Pending grammar definition
pub type GrammarFetch = LocalBoxFuture<'static, Result<GrammarSpec, HighlightError>>;

pub trait GrammarSource {
    /// Canonical names this source can load
    fn languages(&self) -> Vec<String>;

    /// Start fetching the grammar for a canonical name, `None` when there is
    /// no loader for it
    fn fetch(&self, canonical: &str) -> Option<GrammarFetch>;
}

/// Languages with a builtin grammar
pub const BUILTIN_LANGUAGES: [&str; 25] = [
    "bash",
    "c",
    "cpp",
    "csharp",
    "css",
    "dockerfile",
    "go",
    "html",
    "java",
    "javascript",
    "json",
    "jsx",
    "kotlin",
    "markdown",
    "php",
    "python",
    "ruby",
    "rust",
    "shell",
    "sql",
    "swift",
    "tsx",
    "typescript",
    "xml",
    "yaml",
];

/// Bundled syntax extension, or the embedded definition for languages
/// syntect does not ship
fn builtin(canonical: &str) -> Option<Result<GrammarSpec, HighlightError>> {
    let definition = match canonical {
        "dockerfile" => include_str!("../syntaxes/dockerfile.sublime-syntax"),
        "kotlin" => include_str!("../syntaxes/kotlin.sublime-syntax"),
        "swift" => include_str!("../syntaxes/swift.sublime-syntax"),
        "typescript" | "tsx" => include_str!("../syntaxes/typescript.sublime-syntax"),
        _ => {
            let extension = match canonical {
                "bash" | "shell" => "sh",
                "c" => "c",
                "cpp" => "cpp",
                "csharp" => "cs",
                "css" => "css",
                "go" => "go",
                "html" => "html",
                "java" => "java",
                "javascript" | "jsx" => "js",
                "json" => "json",
                "markdown" => "md",
                "php" => "php",
                "python" => "py",
                "ruby" => "rb",
                "rust" => "rs",
                "sql" => "sql",
                "xml" => "xml",
                "yaml" => "yaml",
                _ => return None,
            };
            return Some(Ok(GrammarSpec::bundled(extension)));
        }
    };
    Some(GrammarSpec::from_sublime_syntax(canonical, definition))
}

/// Grammars shipped with the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinGrammars;

impl GrammarSource for BuiltinGrammars {
    fn languages(&self) -> Vec<String> {
        BUILTIN_LANGUAGES.iter().map(|s| s.to_string()).collect()
    }

    fn fetch(&self, canonical: &str) -> Option<GrammarFetch> {
        let spec = builtin(canonical)?;
        Some(future::ready(spec).boxed_local())
    }
}

/// Grammar files in a directory, falling back to the builtins
///
/// `<dir>/<name>.sublime-syntax` overrides the builtin grammar of the same
/// name and adds new languages.
#[derive(Debug, Clone)]
pub struct DirectoryGrammars {
    dir: PathBuf,
}

impl DirectoryGrammars {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, canonical: &str) -> PathBuf {
        self.dir.join(format!("{canonical}.sublime-syntax"))
    }

    fn local_languages(&self) -> Vec<String> {
        let pattern = self.dir.join("*.sublime-syntax");
        let Some(pattern) = pattern.to_str() else {
            log::warn!("Grammar directory {} is not valid UTF-8", self.dir.display());
            return Vec::new();
        };
        match glob::glob(pattern) {
            Ok(paths) => paths
                .filter_map(Result::ok)
                .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
                .collect(),
            Err(e) => {
                log::warn!("Invalid grammar directory pattern {pattern}: {e}");
                Vec::new()
            }
        }
    }
}

impl GrammarSource for DirectoryGrammars {
    fn languages(&self) -> Vec<String> {
        let mut languages = BuiltinGrammars.languages();
        languages.extend(self.local_languages());
        languages.sort();
        languages.dedup();
        languages
    }

    fn fetch(&self, canonical: &str) -> Option<GrammarFetch> {
        // Names are used as file stems
        if canonical.is_empty() || canonical.contains(['/', '\\', '.']) {
            return BuiltinGrammars.fetch(canonical);
        }
        let path = self.path_for(canonical);
        if !path.is_file() {
            return BuiltinGrammars.fetch(canonical);
        }

        let name = canonical.to_string();
        Some(
            async move {
                let text = std::fs::read_to_string(&path)
                    .map_err(|e| HighlightError::fetch(&name, format!("{}: {e}", path.display())))?;
                GrammarSpec::from_sublime_syntax(&name, &text)
            }
            .boxed_local(),
        )
    }
}
