//! Library pattern registry.
//!
//! Each supported source language carries a table of trackable AI provider
//! SDKs. A library is described by:
//! - an import pattern, tested against the whole file as a cheap pre-filter
//! - an optional client initialization pattern whose first capture group is
//!   the local variable bound to the client
//! - specific call patterns containing a `{var}` placeholder for that name
//!
//! Specs are plain serde data so configuration files can add libraries.
//! [`Registry`] holds the compiled, immutable form shared by the scanner.

mod javascript;
mod python;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::AuditError;

/// Placeholder substituted with the bound client variable name.
pub const VAR_PLACEHOLDER: &str = "{var}";

/// Name of the capture group wrapping the substituted variable.
pub const CLIENT_GROUP: &str = "client";

/// Sample binding used to validate templates at load time.
const SAMPLE_BINDING: &str = "client";

lazy_static::lazy_static! {
    static ref BUILTIN: Registry =
        Registry::new(builtin_languages()).expect("builtin library patterns compile");
}

/// One concrete API operation of a library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificPattern {
    /// Regex template; `{var}` is replaced with the bound variable name.
    pub pattern: String,
    /// Human-readable usage kind, e.g. "OpenAI: Completion Create".
    pub label: String,
}

impl SpecificPattern {
    pub fn new(pattern: &str, label: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            label: label.to_string(),
        }
    }

    /// Substitute the bound variable name into the template.
    ///
    /// A bound name is escaped and wrapped in the `client` group so callers
    /// can tell whether the qualifier took part in an occurrence. An empty
    /// name leaves the surrounding optional group empty, which keeps the
    /// pattern valid but unqualified.
    pub fn instantiate(&self, var_name: &str) -> String {
        let replacement = if var_name.is_empty() {
            String::new()
        } else {
            format!("(?P<{}>{})", CLIENT_GROUP, regex::escape(var_name))
        };
        self.pattern.replace(VAR_PLACEHOLDER, &replacement)
    }
}

/// A trackable library for one source language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySpec {
    pub name: String,
    pub import_pattern: String,
    #[serde(default)]
    pub init_pattern: Option<String>,
    #[serde(default)]
    pub specific: Vec<SpecificPattern>,
}

impl LibrarySpec {
    /// Compile the import and init patterns and validate every template.
    pub fn compile(&self) -> Result<CompiledLibrary, AuditError> {
        let import = self.regex(&self.import_pattern)?;

        let init = match &self.init_pattern {
            Some(p) => {
                let re = self.regex(p)?;
                if re.captures_len() < 2 {
                    return Err(AuditError::InvalidLibrary {
                        library: self.name.clone(),
                        reason: format!("init pattern {:?} has no capture group", p),
                    });
                }
                Some(re)
            }
            None => None,
        };

        for specific in &self.specific {
            self.regex(&specific.instantiate(""))?;
            self.regex(&specific.instantiate(SAMPLE_BINDING))?;
        }

        Ok(CompiledLibrary {
            name: self.name.clone(),
            import,
            init,
            specific: self.specific.clone(),
        })
    }

    fn regex(&self, pattern: &str) -> Result<Regex, AuditError> {
        Regex::new(pattern).map_err(|source| AuditError::Pattern {
            library: self.name.clone(),
            pattern: pattern.to_string(),
            source,
        })
    }
}

/// File extensions and the libraries tracked for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub name: String,
    /// Extensions without the leading dot (e.g. "py").
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Scan order follows declaration order.
    #[serde(default)]
    pub libraries: Vec<LibrarySpec>,
}

/// Compiled form of a [`LibrarySpec`].
#[derive(Debug, Clone)]
pub struct CompiledLibrary {
    pub name: String,
    pub import: Regex,
    pub init: Option<Regex>,
    pub specific: Vec<SpecificPattern>,
}

impl CompiledLibrary {
    /// Whether the file text imports this library.
    pub fn is_imported(&self, content: &str) -> bool {
        self.import.is_match(content)
    }

    /// Name bound by the first init pattern occurrence, or "" if none.
    pub fn bound_client<'c>(&self, content: &'c str) -> &'c str {
        self.init
            .as_ref()
            .and_then(|re| re.captures(content))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .unwrap_or("")
    }
}

/// Compiled form of a [`LanguageConfig`].
#[derive(Debug, Clone)]
pub struct CompiledLanguage {
    pub name: String,
    pub extensions: Vec<String>,
    pub libraries: Vec<CompiledLibrary>,
}

impl CompiledLanguage {
    pub fn handles_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e == ext)
    }

    pub fn library_names(&self) -> impl Iterator<Item = &str> {
        self.libraries.iter().map(|l| l.name.as_str())
    }
}

/// Immutable set of compiled language configurations.
#[derive(Debug, Clone)]
pub struct Registry {
    languages: Vec<CompiledLanguage>,
}

impl Registry {
    pub fn new(configs: Vec<LanguageConfig>) -> Result<Self, AuditError> {
        let languages = configs
            .into_iter()
            .map(|cfg| {
                let libraries = cfg
                    .libraries
                    .iter()
                    .map(LibrarySpec::compile)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CompiledLanguage {
                    name: cfg.name,
                    extensions: cfg.extensions.iter().map(|e| normalize_extension(e)).collect(),
                    libraries,
                })
            })
            .collect::<Result<Vec<_>, AuditError>>()?;

        Ok(Self { languages })
    }

    /// The builtin Python and JavaScript tables.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    /// Builtin tables merged with additional configuration.
    pub fn with_extensions(extra: &[LanguageConfig]) -> Result<Self, AuditError> {
        Self::new(merge_languages(builtin_languages(), extra))
    }

    pub fn languages(&self) -> &[CompiledLanguage] {
        &self.languages
    }

    /// Language configuration for a file, chosen by extension.
    ///
    /// The first language claiming the extension wins.
    pub fn language_for_path(&self, path: &Path) -> Option<&CompiledLanguage> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        self.languages.iter().find(|l| l.handles_extension(ext))
    }

    /// Every extension any language handles.
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self
            .languages
            .iter()
            .flat_map(|l| l.extensions.iter().map(String::as_str))
            .collect();
        exts.sort_unstable();
        exts.dedup();
        exts
    }
}

/// Uncompiled builtin language tables.
pub fn builtin_languages() -> Vec<LanguageConfig> {
    vec![python::language(), javascript::language()]
}

/// Merge extra language configs into a base set.
///
/// A language with a known name gains its extra extensions; a library with a
/// known name replaces the existing spec in place, other libraries are
/// appended. Unknown languages are appended as-is.
pub fn merge_languages(mut base: Vec<LanguageConfig>, extra: &[LanguageConfig]) -> Vec<LanguageConfig> {
    for lang in extra {
        match base.iter_mut().find(|b| b.name == lang.name) {
            Some(existing) => {
                for ext in &lang.extensions {
                    let ext = normalize_extension(ext);
                    if !existing.extensions.iter().any(|e| *e == ext) {
                        existing.extensions.push(ext);
                    }
                }
                for lib in &lang.libraries {
                    match existing.libraries.iter_mut().find(|l| l.name == lib.name) {
                        Some(slot) => *slot = lib.clone(),
                        None => existing.libraries.push(lib.clone()),
                    }
                }
            }
            None => base.push(lang.clone()),
        }
    }
    base
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_language_for_path() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.language_for_path(Path::new("src/app.py")).map(|l| l.name.as_str()),
            Some("python")
        );
        assert_eq!(
            registry.language_for_path(Path::new("web/index.tsx")).map(|l| l.name.as_str()),
            Some("javascript")
        );
        assert!(registry.language_for_path(Path::new("main.go")).is_none());
        assert!(registry.language_for_path(Path::new("Makefile")).is_none());
        assert_eq!(registry.extensions(), vec!["js", "jsx", "py", "ts", "tsx"]);
    }

    #[test]
    fn test_builtin_library_order() {
        let registry = Registry::builtin();
        let python = &registry.languages()[0];
        let names: Vec<_> = python.library_names().collect();
        assert_eq!(names, vec!["OpenAI", "Anthropic", "Mistral"]);
    }

    #[test]
    fn test_instantiate_bound_and_unbound() {
        let p = SpecificPattern::new(r"({var}\.)?chat\.completions\.create\(", "x");
        assert_eq!(p.instantiate(""), r"(\.)?chat\.completions\.create\(");
        assert_eq!(
            p.instantiate("client"),
            r"((?P<client>client)\.)?chat\.completions\.create\("
        );

        let unbound = Regex::new(&p.instantiate("")).unwrap();
        assert!(unbound.is_match("chat.completions.create("));
    }

    #[test]
    fn test_bound_client() {
        let lib = python::language().libraries[0].compile().unwrap();
        assert_eq!(lib.bound_client("import openai\nllm = OpenAI()\n"), "llm");
        assert_eq!(lib.bound_client("import openai\n"), "");
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let spec = LibrarySpec {
            name: "Broken".to_string(),
            import_pattern: "import (broken".to_string(),
            init_pattern: None,
            specific: vec![],
        };
        assert!(matches!(spec.compile(), Err(AuditError::Pattern { .. })));

        let spec = LibrarySpec {
            name: "NoGroup".to_string(),
            import_pattern: "import nogroup".to_string(),
            init_pattern: Some(r"\w+\s*=\s*Client\(".to_string()),
            specific: vec![],
        };
        assert!(matches!(spec.compile(), Err(AuditError::InvalidLibrary { .. })));
    }

    #[test]
    fn test_merge_languages() {
        let extra = vec![
            LanguageConfig {
                name: "python".to_string(),
                extensions: vec![".pyi".to_string()],
                libraries: vec![LibrarySpec {
                    name: "Cohere".to_string(),
                    import_pattern: r"import\s+cohere".to_string(),
                    init_pattern: Some(r"(\w+)\s*=\s*cohere\.Client\(".to_string()),
                    specific: vec![SpecificPattern::new(r"({var}\.)?chat\(", "Cohere: Chat")],
                }],
            },
            LanguageConfig {
                name: "go".to_string(),
                extensions: vec!["go".to_string()],
                libraries: vec![],
            },
        ];

        let merged = merge_languages(builtin_languages(), &extra);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].extensions, vec!["py", "pyi"]);
        assert_eq!(merged[0].libraries.len(), 4);
        assert_eq!(merged[0].libraries[3].name, "Cohere");

        let registry = Registry::new(merged).unwrap();
        assert!(registry.language_for_path(Path::new("stubs.pyi")).is_some());
        assert!(registry.language_for_path(Path::new("main.go")).is_some());
    }
}
