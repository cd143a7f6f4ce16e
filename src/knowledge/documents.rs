//! Source document loading and chunking.

use std::path::{Path, PathBuf};

use comrak::nodes::NodeValue;
use comrak::{parse_document, Arena, Options};

use super::source::Document;

/// File extensions picked up from the knowledge directory, in load order.
const EXTENSIONS: [&str; 2] = ["md", "txt"];

/// Separators tried in order when a piece is larger than a chunk.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Load every `.md` then every `.txt` file under `dir`, recursively.
///
/// Files are sorted by path within each extension. A missing directory or an
/// unreadable file is logged and skipped.
pub async fn load_documents(dir: &Path) -> Vec<Document> {
    if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
        tracing::warn!(path = %dir.display(), "Knowledge base directory not found");
        return Vec::new();
    }

    let files = match collect_files(dir).await {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "Failed to scan knowledge directory");
            return Vec::new();
        }
    };

    let mut documents = Vec::new();
    for ext in EXTENSIONS {
        for path in files
            .iter()
            .filter(|p| p.extension().is_some_and(|e| e == ext))
        {
            match tokio::fs::read_to_string(path).await {
                Ok(content) => documents.push(Document::new(path.display().to_string(), content)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Could not load document");
                }
            }
        }
    }

    tracing::debug!(count = documents.len(), "Loaded knowledge documents");
    documents
}

async fn collect_files(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Split markdown into heading-led sections, preserving the raw text.
///
/// Text before the first heading forms its own section.
#[must_use]
pub fn markdown_sections(content: &str) -> Vec<String> {
    let arena = Arena::new();
    let root = parse_document(&arena, content, &Options::default());

    let heading_lines: Vec<usize> = root
        .children()
        .filter_map(|node| {
            let data = node.data.borrow();
            matches!(data.value, NodeValue::Heading(_)).then_some(data.sourcepos.start.line)
        })
        .collect();

    let lines: Vec<&str> = content.lines().collect();
    let mut boundaries = vec![0];
    boundaries.extend(
        heading_lines
            .into_iter()
            .map(|line| line.saturating_sub(1))
            .filter(|&idx| idx > 0 && idx < lines.len()),
    );
    boundaries.push(lines.len());
    boundaries.dedup();

    boundaries
        .windows(2)
        .map(|w| lines[w[0]..w[1]].join("\n").trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Character-budgeted splitter that prefers paragraph, then line, then word
/// boundaries, carrying up to `chunk_overlap` characters into the next chunk.
#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// `chunk_overlap` is clamped below `chunk_size`.
    #[must_use]
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    /// Split one text into chunks.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &SEPARATORS)
    }

    /// Split documents into chunk documents, sectioning markdown first.
    #[must_use]
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        documents
            .iter()
            .flat_map(|doc| {
                let sections = if doc.source.ends_with(".md") {
                    markdown_sections(&doc.content)
                } else {
                    vec![doc.content.clone()]
                };
                sections
                    .into_iter()
                    .flat_map(|section| self.split(&section))
                    .map(|chunk| Document::new(doc.source.clone(), chunk))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }

        let Some((sep, rest)) = separators.split_first() else {
            return self.hard_split(text);
        };
        if !text.contains(sep) {
            return self.split_with(text, rest);
        }

        let mut pieces = Vec::new();
        for part in text.split(sep).map(str::trim).filter(|p| !p.is_empty()) {
            if char_len(part) > self.chunk_size {
                pieces.extend(self.split_with(part, rest));
            } else {
                pieces.push(part.to_string());
            }
        }
        self.merge(&pieces, sep)
    }

    fn merge(&self, pieces: &[String], sep: &str) -> Vec<String> {
        let sep_len = char_len(sep);
        let joined_len = |window: &[&str]| -> usize {
            window.iter().map(|p| char_len(p)).sum::<usize>()
                + sep_len * window.len().saturating_sub(1)
        };

        let mut chunks = Vec::new();
        let mut window: Vec<&str> = Vec::new();

        for piece in pieces {
            let piece_len = char_len(piece);
            if !window.is_empty() && joined_len(&window) + sep_len + piece_len > self.chunk_size {
                chunks.push(window.join(sep));
                while !window.is_empty()
                    && (joined_len(&window) > self.chunk_overlap
                        || joined_len(&window) + sep_len + piece_len > self.chunk_size)
                {
                    window.remove(0);
                }
            }
            window.push(piece);
        }
        if !window.is_empty() {
            chunks.push(window.join(sep));
        }
        chunks
    }

    fn hard_split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
        chunks
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(1500, 300)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_single_chunk() {
        let splitter = TextSplitter::new(100, 10);
        assert_eq!(splitter.split("  hello world  "), vec!["hello world"]);
        assert!(splitter.split("   ").is_empty());
    }

    #[test]
    fn test_paragraphs_respect_chunk_size() {
        let splitter = TextSplitter::new(30, 0);
        let text = "First paragraph here.\n\nSecond paragraph here.\n\nThird one.";
        let chunks = splitter.split(text);
        assert_eq!(
            chunks,
            vec!["First paragraph here.", "Second paragraph here.", "Third one."]
        );
        assert!(chunks.iter().all(|c| c.chars().count() <= 30));
    }

    #[test]
    fn test_overlap_carries_trailing_pieces() {
        let splitter = TextSplitter::new(11, 5);
        let chunks = splitter.split("aaa bbb ccc ddd");
        assert_eq!(chunks, vec!["aaa bbb ccc", "ccc ddd"]);
    }

    #[test]
    fn test_hard_split_without_separators() {
        let splitter = TextSplitter::new(4, 1);
        assert_eq!(splitter.split("abcdefghij"), vec!["abcd", "defg", "ghij"]);
    }

    #[test]
    fn test_overlap_clamped_below_size() {
        let splitter = TextSplitter::new(3, 10);
        let chunks = splitter.split("abcdefg");
        assert!(chunks.iter().all(|c| c.chars().count() <= 3));
        assert_eq!(chunks.first().map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_multibyte_text_does_not_panic() {
        let splitter = TextSplitter::new(5, 2);
        let chunks = splitter.split("ééééééééééé");
        assert!(chunks.iter().all(|c| c.chars().count() <= 5));
    }

    #[test]
    fn test_markdown_sections() {
        let md = "Intro line\n\n# Incentives\n\nPeople respond to rewards.\n\n## Metrics\n\nWhat gets measured.";
        let sections = markdown_sections(md);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0], "Intro line");
        assert!(sections[1].starts_with("# Incentives"));
        assert!(sections[1].contains("rewards"));
        assert!(sections[2].starts_with("## Metrics"));
    }

    #[test]
    fn test_split_documents_sections_markdown_only() {
        let splitter = TextSplitter::new(1000, 0);
        let docs = vec![
            Document::new("notes.md", "# A\n\nalpha\n\n# B\n\nbeta"),
            Document::new("notes.txt", "# A\n\nalpha\n\n# B\n\nbeta"),
        ];
        let chunks = splitter.split_documents(&docs);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].source, "notes.md");
        assert_eq!(chunks[2].source, "notes.txt");
    }

    #[tokio::test]
    async fn test_load_documents_md_before_txt() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        tokio::fs::create_dir_all(&nested).await.unwrap();
        tokio::fs::write(dir.path().join("a.txt"), "plain").await.unwrap();
        tokio::fs::write(nested.join("b.md"), "# Heading").await.unwrap();
        tokio::fs::write(dir.path().join("ignored.pdf"), "x").await.unwrap();

        let docs = load_documents(dir.path()).await;
        assert_eq!(docs.len(), 2);
        assert!(docs[0].source.ends_with("b.md"));
        assert!(docs[1].source.ends_with("a.txt"));
    }

    #[tokio::test]
    async fn test_load_documents_missing_dir() {
        let docs = load_documents(Path::new("/nonexistent/knowledge_dir_xyz")).await;
        assert!(docs.is_empty());
    }
}
