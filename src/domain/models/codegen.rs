use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Generated source files keyed by sanitized relative path.
pub type GeneratedFiles = BTreeMap<String, String>;

/// Technology stacks code can be generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechStack {
    PythonFastapi,
    JavaSpring,
    NodeExpress,
    React,
}

impl TechStack {
    pub const ALL: [Self; 4] = [
        Self::PythonFastapi,
        Self::JavaSpring,
        Self::NodeExpress,
        Self::React,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::PythonFastapi => "python_fastapi",
            Self::JavaSpring => "java_spring",
            Self::NodeExpress => "node_express",
            Self::React => "react",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PythonFastapi => "Python + FastAPI",
            Self::JavaSpring => "Java + Spring Boot",
            Self::NodeExpress => "Node.js + Express",
            Self::React => "React Frontend",
        }
    }

    /// Phrase inserted into the code generation prompt.
    pub fn prompt_phrase(self) -> &'static str {
        match self {
            Self::PythonFastapi => "Python using FastAPI framework",
            Self::JavaSpring => "Java using Spring Boot",
            Self::NodeExpress => "Node.js using Express",
            Self::React => "React with functional components",
        }
    }
}

impl fmt::Display for TechStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TechStack {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|stack| stack.key() == wanted)
            .ok_or_else(|| s.to_string())
    }
}

/// Turn a model-supplied file path into a safe relative path.
///
/// Returns `None` for absolute paths, drive-letter paths, empty paths and
/// any path with a `..` segment.
pub fn sanitize_relative_path(raw: &str) -> Option<String> {
    let unified = raw.trim().replace('\\', "/");
    if unified.is_empty() || unified.starts_with('/') {
        return None;
    }

    let bytes = unified.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return None;
    }

    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_parsing() {
        assert_eq!("python_fastapi".parse::<TechStack>(), Ok(TechStack::PythonFastapi));
        assert_eq!(" React ".parse::<TechStack>(), Ok(TechStack::React));
        assert_eq!("cobol".parse::<TechStack>(), Err("cobol".to_string()));
    }

    #[test]
    fn test_sanitize_accepts_relative_paths() {
        assert_eq!(sanitize_relative_path("app/main.py").as_deref(), Some("app/main.py"));
        assert_eq!(sanitize_relative_path("./src//lib.rs").as_deref(), Some("src/lib.rs"));
        assert_eq!(sanitize_relative_path("src\\App.jsx").as_deref(), Some("src/App.jsx"));
    }

    #[test]
    fn test_sanitize_rejects_escapes() {
        assert_eq!(sanitize_relative_path("/etc/passwd"), None);
        assert_eq!(sanitize_relative_path("../secrets.env"), None);
        assert_eq!(sanitize_relative_path("app/../../x.py"), None);
        assert_eq!(sanitize_relative_path("C:\\Windows\\x.dll"), None);
        assert_eq!(sanitize_relative_path("  "), None);
        assert_eq!(sanitize_relative_path("./"), None);
    }
}
