//! Record file type detection

#[derive(Debug, Clone, PartialEq)]
pub enum FileType {
    Json,
    JsonLines,
    Toml,
    Unknown,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "json" => FileType::Json,
            "jsonl" | "ndjson" => FileType::JsonLines,
            "toml" => FileType::Toml,
            _ => FileType::Unknown,
        }
    }
}
