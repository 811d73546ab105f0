//! Python SDK patterns.

use super::{LanguageConfig, LibrarySpec, SpecificPattern};

pub fn language() -> LanguageConfig {
    LanguageConfig {
        name: "python".to_string(),
        extensions: vec!["py".to_string()],
        libraries: vec![openai(), anthropic(), mistral()],
    }
}

fn openai() -> LibrarySpec {
    LibrarySpec {
        name: "OpenAI".to_string(),
        import_pattern: r"import\s+openai|from\s+openai\s+import\s+\S+".to_string(),
        init_pattern: Some(r"(\w+)\s*=\s*(?:openai\.)?(?:Async)?OpenAI\(".to_string()),
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
        import_pattern: r"import\s+anthropic|from\s+anthropic\s+import\s+\S+".to_string(),
        init_pattern: Some(r"(\w+)\s*=\s*(?:anthropic\.)?(?:Async)?Anthropic\(".to_string()),
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
        import_pattern: r"import\s+mistralai|from\s+mistralai(\.\S+)?\s+import\s+\S+".to_string(),
        init_pattern: Some(r"(\w+)\s*=\s*(?:MistralClient|Mistral)\(".to_string()),
        specific: vec![
            SpecificPattern::new(r"({var}\.)?chat\(", "Mistral: Chat"),
            SpecificPattern::new(r"({var}\.)?chat_stream\(", "Mistral: Chat Stream"),
            SpecificPattern::new(r"({var}\.)?embeddings\(", "Mistral: Embeddings Create"),
        ],
    }
}
