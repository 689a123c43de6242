//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`StructuredChunker`] splits by pages and headings, then paragraphs, falling
//!   back to sentences and finally fixed word groups for oversized units
//! - [`FixedSizeChunker`] slides a fixed character window with configurable overlap
//!
//! All sizes are measured in characters (Unicode scalar values), never bytes.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::validate_chunking;
use crate::error::Result;

/// Structured chunks whose trimmed length is below this are dropped as noise.
pub const DEFAULT_MIN_CHUNK_CHARS: usize = 50;

const PARAGRAPH_SEPARATOR: &str = "\n\n";
const SENTENCE_SEPARATOR: &str = " ";

static PAGE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*--- PAGE \d+ ---\s*$")
        .expect("unreachable error: invalid page marker pattern")
});
static HEADING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Z ]{10,}$").expect("unreachable error: invalid heading pattern")
});
static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\s*\n").expect("unreachable error: invalid paragraph pattern")
});
static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[.!?]+\s+").expect("unreachable error: invalid sentence pattern")
});

/// A strategy for splitting document text into an ordered sequence of chunks.
///
/// Returns an empty `Vec` for empty text. Chunk order follows document order.
pub trait Chunker: Send + Sync {
    /// Split `text` into chunks.
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Split `text` with a [`StructuredChunker`].
///
/// # Errors
///
/// Returns [`RagError::ConfigError`](crate::RagError::ConfigError) if
/// `chunk_size` is zero or `overlap >= chunk_size`.
pub fn chunk(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    Ok(StructuredChunker::new(chunk_size, overlap)?.chunk(text))
}

/// Split `text` with a [`FixedSizeChunker`].
///
/// # Errors
///
/// Returns [`RagError::ConfigError`](crate::RagError::ConfigError) if
/// `chunk_size` is zero or `overlap >= chunk_size`.
pub fn chunk_fixed(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    Ok(FixedSizeChunker::new(chunk_size, overlap)?.chunk(text))
}

/// Splits text into contiguous fixed-size windows by character count.
///
/// Each window starts `chunk_size - chunk_overlap` characters after the
/// previous one, so consecutive chunks share exactly `chunk_overlap`
/// characters. Iteration stops once a window reaches the end of the text;
/// dropping the first `chunk_overlap` characters of every chunk after the
/// first and concatenating reproduces the input.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::{Chunker, FixedSizeChunker};
///
/// let chunker = FixedSizeChunker::new(1000, 100)?;
/// let chunks = chunker.chunk(&text);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_chunking(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap })
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char boundary, including the end of the text.
        let bounds: Vec<usize> =
            text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let char_count = bounds.len() - 1;
        let step = self.chunk_size - self.chunk_overlap;

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(char_count);
            chunks.push(text[bounds[start]..bounds[end]].to_string());
            if end == char_count {
                break;
            }
            start += step;
        }

        chunks
    }
}

/// Splits text along document structure: pages, paragraphs, sentences, words.
///
/// 1. The text is cut into sections at page-break marker lines
///    (`--- PAGE n ---`, removed from the output) and before heading lines
///    (all-uppercase lines of at least 11 characters following a blank line).
/// 2. Sections are cut into blank-line-delimited paragraphs.
/// 3. Paragraphs are accumulated greedily into a buffer of at most
///    `chunk_size` characters. When the next paragraph does not fit, the
///    buffer is emitted and the next buffer is seeded with its last
///    `chunk_overlap` characters. The buffer is emitted at the end of every
///    section, so no chunk spans a page or heading boundary.
/// 4. A paragraph longer than `chunk_size` on its own is re-split into
///    sentences with the same rule; a sentence longer than `chunk_size` is
///    force-split into groups of `chunk_size / 10` words with no overlap.
///    Forced groups are the only chunks that may exceed `chunk_size`.
/// 5. Chunks whose trimmed length is below `min_chunk_chars` are discarded.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::{Chunker, StructuredChunker};
///
/// let chunker = StructuredChunker::new(1200, 200)?;
/// let chunks = chunker.chunk(&pdf_text);
/// ```
#[derive(Debug, Clone)]
pub struct StructuredChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    min_chunk_chars: usize,
}

impl StructuredChunker {
    /// Create a new `StructuredChunker` with the default minimum chunk length.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_chunking(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap, min_chunk_chars: DEFAULT_MIN_CHUNK_CHARS })
    }

    /// Override the minimum trimmed length of an emitted chunk.
    pub fn with_min_chunk_chars(mut self, min_chunk_chars: usize) -> Self {
        self.min_chunk_chars = min_chunk_chars;
        self
    }

    fn words_per_group(&self) -> usize {
        (self.chunk_size / 10).max(1)
    }

    /// Sentence-level fallback for a paragraph that exceeds `chunk_size` alone.
    fn split_long_paragraph(&self, paragraph: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut buffer = Buffer::new(self.chunk_size, self.chunk_overlap, SENTENCE_SEPARATOR);

        for sentence in split_sentences(paragraph) {
            if !buffer.push(sentence, &mut chunks) {
                chunks.extend(
                    sentence
                        .split_whitespace()
                        .collect::<Vec<_>>()
                        .chunks(self.words_per_group())
                        .map(|words| words.join(" ")),
                );
            }
        }

        buffer.finish(&mut chunks);
        chunks
    }
}

impl Chunker for StructuredChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut buffer = Buffer::new(self.chunk_size, self.chunk_overlap, PARAGRAPH_SEPARATOR);

        for section in split_sections(text) {
            for paragraph in PARAGRAPH_BREAK.split(&section) {
                let paragraph = paragraph.trim();
                if paragraph.is_empty() {
                    continue;
                }
                if !buffer.push(paragraph, &mut chunks) {
                    chunks.extend(self.split_long_paragraph(paragraph));
                }
            }
            // No chunk spans a page or heading boundary.
            buffer.finish(&mut chunks);
        }

        chunks.retain(|chunk| char_len(chunk.trim()) >= self.min_chunk_chars);
        chunks
    }
}

/// Greedy accumulator shared by the paragraph and sentence levels.
struct Buffer {
    chunk_size: usize,
    overlap: usize,
    separator: &'static str,
    text: String,
    len: usize,
}

impl Buffer {
    fn new(chunk_size: usize, overlap: usize, separator: &'static str) -> Self {
        Self { chunk_size, overlap, separator, text: String::new(), len: 0 }
    }

    /// Append `unit`, emitting completed chunks into `out`.
    ///
    /// Returns `false` only when the buffer is empty and `unit` alone is longer
    /// than `chunk_size`; the caller must split it further.
    fn push(&mut self, unit: &str, out: &mut Vec<String>) -> bool {
        let unit_len = char_len(unit);
        let separator_len = char_len(self.separator);

        if self.text.is_empty() {
            if unit_len > self.chunk_size {
                return false;
            }
            self.text.push_str(unit);
            self.len = unit_len;
            return true;
        }

        if self.len + separator_len + unit_len <= self.chunk_size {
            self.append(unit, unit_len);
            return true;
        }

        let emitted = std::mem::take(&mut self.text);
        let seed = tail_chars(&emitted, self.overlap);
        let seed_len = char_len(seed);
        let seeded = seed_len > 0 && seed_len + separator_len + unit_len <= self.chunk_size;
        if seeded {
            self.text.push_str(seed);
            self.len = seed_len;
        } else {
            self.len = 0;
        }
        out.push(emitted.trim().to_string());

        if seeded {
            self.append(unit, unit_len);
            true
        } else {
            self.push(unit, out)
        }
    }

    fn append(&mut self, unit: &str, unit_len: usize) {
        self.text.push_str(self.separator);
        self.text.push_str(unit);
        self.len += char_len(self.separator) + unit_len;
    }

    fn finish(&mut self, out: &mut Vec<String>) {
        let text = std::mem::take(&mut self.text);
        self.len = 0;
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            out.push(trimmed.to_string());
        }
    }
}

/// Cut text into sections at page markers and before heading lines.
fn split_sections(text: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut lines: Vec<&str> = Vec::new();
    let mut previous_blank = true;

    for line in text.lines() {
        if PAGE_MARKER.is_match(line) {
            flush_section(&mut sections, &mut lines);
            previous_blank = true;
            continue;
        }
        if previous_blank && HEADING_LINE.is_match(line.trim()) {
            flush_section(&mut sections, &mut lines);
        }
        previous_blank = line.trim().is_empty();
        lines.push(line);
    }

    flush_section(&mut sections, &mut lines);
    sections
}

fn flush_section(sections: &mut Vec<String>, lines: &mut Vec<&str>) {
    if lines.iter().any(|line| !line.trim().is_empty()) {
        sections.push(lines.join("\n"));
    }
    lines.clear();
}

/// Split a paragraph into sentences, keeping each terminator with its sentence.
fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_END.find_iter(paragraph) {
        let sentence = paragraph[start..boundary.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = boundary.end();
    }

    let rest = paragraph[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }

    sentences
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The last `n` characters of `text`, or all of it if shorter.
fn tail_chars(text: &str, n: usize) -> &str {
    let len = char_len(text);
    if len <= n {
        return text;
    }
    text.char_indices().nth(len - n).map_or("", |(i, _)| &text[i..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(word: &str, words: usize) -> String {
        let mut s = vec![word; words].join(" ");
        s.push('.');
        s
    }

    #[test]
    fn tail_chars_counts_characters() {
        assert_eq!(tail_chars("héllo", 3), "llo");
        assert_eq!(tail_chars("日本語テキスト", 2), "スト");
        assert_eq!(tail_chars("ab", 5), "ab");
        assert_eq!(tail_chars("abc", 0), "");
    }

    #[test]
    fn sentences_keep_terminators() {
        let sentences = split_sentences("First one. Second one!  Third? tail");
        assert_eq!(sentences, vec!["First one.", "Second one!", "Third?", "tail"]);
    }

    #[test]
    fn page_markers_are_removed_and_split_sections() {
        let text = "page one text\n\n--- PAGE 2 ---\n\npage two text";
        let sections = split_sections(text);
        assert_eq!(sections.len(), 2);
        assert!(sections.iter().all(|s| !s.contains("PAGE")));
    }

    #[test]
    fn heading_after_blank_line_starts_a_section() {
        let text = "intro paragraph\n\nTERMS AND CONDITIONS\nbody of the terms";
        let sections = split_sections(text);
        assert_eq!(sections.len(), 2);
        assert!(sections[1].starts_with("TERMS AND CONDITIONS"));
    }

    #[test]
    fn heading_starts_a_new_chunk() {
        let intro = sentence("intro", 12);
        let body = sentence("clause", 12);
        let chunker = StructuredChunker::new(1000, 100).unwrap();
        let chunks = chunker.chunk(&format!("{intro}\n\nTERMS AND CONDITIONS\n{body}"));
        assert_eq!(chunks, vec![intro, format!("TERMS AND CONDITIONS\n{body}")]);
    }

    #[test]
    fn short_uppercase_line_is_not_a_heading() {
        let sections = split_sections("intro\n\nNOTE\nmore text");
        assert_eq!(sections.len(), 1);
    }

    #[test]
    fn small_paragraphs_merge_into_one_chunk() {
        let a = sentence("alpha", 12);
        let b = sentence("beta", 12);
        let chunker = StructuredChunker::new(500, 50).unwrap();
        let chunks = chunker.chunk(&format!("{a}\n\n{b}"));
        assert_eq!(chunks, vec![format!("{a}\n\n{b}")]);
    }

    #[test]
    fn overflowing_paragraph_starts_new_chunk_with_overlap() {
        let a = sentence("alpha", 20);
        let b = sentence("gamma", 20);
        let chunker = StructuredChunker::new(160, 30).unwrap();
        let chunks = chunker.chunk(&format!("{a}\n\n{b}"));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], a);
        let seed = tail_chars(&a, 30);
        assert!(chunks[1].starts_with(seed.trim_start()));
        assert!(chunks[1].ends_with(&b));
    }

    #[test]
    fn seed_is_dropped_when_it_would_overflow() {
        let a = sentence("alpha", 20);
        let b = sentence("gamma", 23);
        let chunker = StructuredChunker::new(140, 40).unwrap();
        let chunks = chunker.chunk(&format!("{a}\n\n{b}"));
        assert_eq!(chunks, vec![a, b]);
    }

    #[test]
    fn long_paragraph_falls_back_to_sentences() {
        let paragraph =
            (0..10).map(|i| format!("Sentence number {i} talks about topic {i}.")).collect::<Vec<_>>();
        let text = paragraph.join(" ");
        let chunker = StructuredChunker::new(120, 20).unwrap();
        let chunks = chunker.chunk(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 120, "oversized chunk: {chunk:?}");
        }
        assert!(chunks[0].starts_with("Sentence number 0"));
        assert!(chunks.last().unwrap().ends_with("topic 9."));
    }

    #[test]
    fn oversized_sentence_is_split_into_word_groups() {
        let text = vec!["abcdefghi"; 300].join(" ");
        let chunker = StructuredChunker::new(100, 10).unwrap();
        let chunks = chunker.chunk(&text);
        // chunk_size / 10 = 10 words per group
        assert_eq!(chunks.len(), 30);
        assert!(chunks.iter().all(|c| c.split_whitespace().count() == 10));
    }

    #[test]
    fn tiny_chunks_are_filtered() {
        let chunker = StructuredChunker::new(1000, 100).unwrap();
        assert!(chunker.chunk("--- PAGE 2 ---\n\nshort").is_empty());
        assert!(chunker.chunk("   \n\n  ").is_empty());
    }

    #[test]
    fn min_chunk_chars_is_configurable() {
        let chunker = StructuredChunker::new(1000, 100).unwrap().with_min_chunk_chars(1);
        assert_eq!(chunker.chunk("short"), vec!["short".to_string()]);
    }

    #[test]
    fn fixed_windows_stop_at_end_of_text() {
        let chunks = chunk_fixed("abcdefghij", 4, 1).unwrap();
        assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
    }

    #[test]
    fn fixed_windows_handle_multibyte_text() {
        let chunks = chunk_fixed("αβγδεζηθ", 3, 1).unwrap();
        assert_eq!(chunks, vec!["αβγ", "γδε", "εζη", "ηθ"]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk("", 100, 10).unwrap().is_empty());
        assert!(chunk_fixed("", 100, 10).unwrap().is_empty());
    }
}
