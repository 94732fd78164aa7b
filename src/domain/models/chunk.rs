use serde::{Deserialize, Serialize};

use super::text::sha1_hex;

/// Number of hex characters of the content digest kept in a chunk id.
const CHUNK_ID_HEX_LEN: usize = 10;

/// A stably-identified unit of requirements text.
///
/// The id is derived from the text alone, so chunking the same document
/// twice yields identical ids regardless of where a chunk sits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub text: String,
}

impl Chunk {
    /// Build a chunk from its text, computing the content-addressed id.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            chunk_id: chunk_id_for(&text),
            text,
        }
    }

    /// Short digest of the text used to key per-chunk generation caches.
    pub fn text_hash(&self) -> String {
        sha1_hex(&self.text)[..12].to_string()
    }

    /// Number of lines held by this chunk.
    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

/// `C-` followed by the first ten hex characters of the SHA-1 of `text`.
pub fn chunk_id_for(text: &str) -> String {
    format!("C-{}", &sha1_hex(text)[..CHUNK_ID_HEX_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id_is_content_addressed() {
        let a = Chunk::from_text("Users can sign up");
        let b = Chunk::from_text("Users can sign up");
        let c = Chunk::from_text("Users can sign in");

        assert_eq!(a.chunk_id, b.chunk_id);
        assert_ne!(a.chunk_id, c.chunk_id);
        assert!(a.chunk_id.starts_with("C-"));
        assert_eq!(a.chunk_id.len(), 12);
    }

    #[test]
    fn test_chunk_id_known_digest() {
        // sha1("abc") = a9993e3647...
        assert_eq!(chunk_id_for("abc"), "C-a9993e3647");
    }

    #[test]
    fn test_text_hash_length() {
        let chunk = Chunk::from_text("Billing:\nInvoices are emailed monthly");
        assert_eq!(chunk.text_hash().len(), 12);
        assert_eq!(chunk.line_count(), 2);
    }
}
