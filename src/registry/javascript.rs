//! JavaScript and TypeScript SDK patterns.

use super::{LanguageConfig, LibrarySpec, SpecificPattern};

pub fn language() -> LanguageConfig {
    LanguageConfig {
        name: "javascript".to_string(),
        extensions: ["js", "jsx", "ts", "tsx"]
            .iter()
            .map(|e| e.to_string())
            .collect(),
        libraries: vec![openai(), anthropic(), mistral()],
    }
}

fn openai() -> LibrarySpec {
    LibrarySpec {
        name: "OpenAI".to_string(),
        import_pattern: r#"import\s+OpenAI\s+from\s+['"]openai['"]|const\s+OpenAI\s+=\s+require\(['"]openai['"]\);?"#
            .to_string(),
        init_pattern: Some(r"(?:const|let|var)\s+(\w+)\s*=\s*new\s+OpenAI\(".to_string()),
        specific: vec![
            SpecificPattern::new(
                r"({var}\.)?chat\.completions\.create\(",
                "OpenAI: Completion Create",
            ),
            SpecificPattern::new(r"({var}\.)?embeddings\.create\(", "OpenAI: Embedding Create"),
        ],
    }
}

fn anthropic() -> LibrarySpec {
    LibrarySpec {
        name: "Anthropic".to_string(),
        import_pattern: r#"import\s+Anthropic\s+from\s+['"]@anthropic-ai/sdk['"]|const\s+Anthropic\s+=\s+require\(['"]@anthropic-ai/sdk['"]\);?"#
            .to_string(),
        init_pattern: Some(r"(?:const|let|var)\s+(\w+)\s*=\s*new\s+Anthropic\(".to_string()),
        specific: vec![
            SpecificPattern::new(r"({var}\.)?messages\.create\(", "Anthropic: Message Create"),
            SpecificPattern::new(r"({var}\.)?messages\.stream\(", "Anthropic: Message Stream"),
            SpecificPattern::new(
                r"({var}\.)?completions\.create\(",
                "Anthropic: Completions Create",
            ),
        ],
    }
}

fn mistral() -> LibrarySpec {
    LibrarySpec {
        name: "Mistral".to_string(),
        import_pattern: r#"import\s+MistralClient\s+from\s+['"]@mistralai/mistralai['"]|const\s+MistralClient\s+=\s+require\(['"]@mistralai/mistralai['"]\);?"#
            .to_string(),
        init_pattern: Some(r"(?:const|let|var)\s+(\w+)\s*=\s*new\s+MistralClient\(".to_string()),
        specific: vec![
            SpecificPattern::new(r"({var}\.)?chat\(", "Mistral: Chat"),
            SpecificPattern::new(r"({var}\.)?chat_stream\(", "Mistral: Chat Stream"),
            SpecificPattern::new(r"({var}\.)?embeddings\(", "Mistral: Embeddings Create"),
        ],
    }
}
