//! Overlapping text chunking with page provenance

use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};
use crate::types::{Chunk, PageRecord};

/// Splits page text into bounded, overlapping chunks.
///
/// Sizes and overlap are measured in characters (Unicode scalar values),
/// the same unit the split works in. Split points prefer paragraph breaks,
/// then sentence breaks, then word breaks, then a raw cut, falling through
/// to the coarser granularity only when the finer one has no usable
/// boundary inside the window. Each chunk after the first starts `overlap`
/// characters before the end of the previous chunk's span, so the trailing
/// `overlap` characters of a chunk always equal the leading characters of
/// the next one.
pub struct ChunkSplitter {
    max_chunk_size: usize,
    overlap: usize,
}

impl ChunkSplitter {
    /// Create a splitter; `overlap` must be smaller than `max_chunk_size`
    pub fn new(max_chunk_size: usize, overlap: usize) -> Result<Self> {
        if max_chunk_size == 0 {
            return Err(Error::InvalidConfiguration(
                "max_chunk_size must be positive".to_string(),
            ));
        }
        if overlap >= max_chunk_size {
            return Err(Error::InvalidConfiguration(format!(
                "overlap ({}) must be smaller than max_chunk_size ({})",
                overlap, max_chunk_size
            )));
        }
        Ok(Self {
            max_chunk_size,
            overlap,
        })
    }

    /// Split pages into chunks. `chunk_index` increases monotonically
    /// across the whole document, and each chunk is attributed to the page
    /// contributing the majority of its text (earlier page on ties).
    pub fn split(&self, pages: &[PageRecord]) -> Vec<Chunk> {
        // Concatenate page text in page order, remembering where each page
        // starts so chunks can be attributed afterwards.
        let mut text = String::new();
        let mut page_spans: Vec<(usize, usize, u32)> = Vec::new();
        let mut offset = 0usize;
        for page in pages {
            let len = page.text.chars().count();
            if len == 0 {
                continue;
            }
            page_spans.push((offset, offset + len, page.page_index));
            text.push_str(&page.text);
            offset += len;
        }
        if text.is_empty() {
            return Vec::new();
        }
        let source_filename = pages
            .first()
            .map(|p| p.source_filename.clone())
            .unwrap_or_default();

        let char_to_byte = char_boundaries(&text);
        let spans = self.split_spans(&text, &char_to_byte);

        spans
            .iter()
            .enumerate()
            .map(|(i, &(start, end))| Chunk {
                text: text[char_to_byte[start]..char_to_byte[end]].to_string(),
                chunk_index: i as u32,
                source_filename: source_filename.clone(),
                page_index: majority_page(&page_spans, start, end),
            })
            .collect()
    }

    /// Compute chunk spans over the concatenated text, in character units
    fn split_spans(&self, text: &str, char_to_byte: &[usize]) -> Vec<(usize, usize)> {
        let total = char_to_byte.len() - 1;
        let paragraphs = paragraph_boundaries(text, char_to_byte);
        let sentences = sentence_boundaries(text, char_to_byte);
        let words = word_boundaries(text, char_to_byte);

        let mut spans = Vec::new();
        let mut start = 0usize;
        loop {
            if total - start <= self.max_chunk_size {
                spans.push((start, total));
                break;
            }
            let window_end = start + self.max_chunk_size;
            // A usable boundary must sit past start + overlap: anything at
            // or before it would put the next start at or before this one.
            let floor = start + self.overlap;
            let end = pick_boundary(&paragraphs, floor, window_end)
                .or_else(|| pick_boundary(&sentences, floor, window_end))
                .or_else(|| pick_boundary(&words, floor, window_end))
                .unwrap_or(window_end);
            spans.push((start, end));
            start = end - self.overlap;
        }
        spans
    }
}

/// Byte offset of every character boundary, plus the final length
fn char_boundaries(text: &str) -> Vec<usize> {
    let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    offsets.push(text.len());
    offsets
}

/// Convert a byte offset (always a char boundary here) to a char offset
fn byte_to_char(char_to_byte: &[usize], byte: usize) -> usize {
    char_to_byte.binary_search(&byte).unwrap_or_else(|i| i)
}

/// Char offsets immediately after each paragraph break
fn paragraph_boundaries(text: &str, char_to_byte: &[usize]) -> Vec<usize> {
    text.match_indices("\n\n")
        .map(|(i, sep)| byte_to_char(char_to_byte, i + sep.len()))
        .collect()
}

/// Char offsets of each sentence start except the first
fn sentence_boundaries(text: &str, char_to_byte: &[usize]) -> Vec<usize> {
    text.split_sentence_bound_indices()
        .map(|(i, _)| byte_to_char(char_to_byte, i))
        .filter(|&i| i > 0)
        .collect()
}

/// Char offsets of each word-bound segment start except the first
fn word_boundaries(text: &str, char_to_byte: &[usize]) -> Vec<usize> {
    text.split_word_bound_indices()
        .map(|(i, _)| byte_to_char(char_to_byte, i))
        .filter(|&i| i > 0)
        .collect()
}

/// Latest boundary `b` with `floor < b <= ceil`, if any
fn pick_boundary(boundaries: &[usize], floor: usize, ceil: usize) -> Option<usize> {
    let upto = boundaries.partition_point(|&b| b <= ceil);
    if upto == 0 {
        return None;
    }
    let b = boundaries[upto - 1];
    (b > floor).then_some(b)
}

/// Page contributing the most characters to the span (earlier page wins ties)
fn majority_page(page_spans: &[(usize, usize, u32)], start: usize, end: usize) -> u32 {
    let mut best_page = 0u32;
    let mut best_cover = 0usize;
    for &(page_start, page_end, page_index) in page_spans {
        let cover = page_end.min(end).saturating_sub(page_start.max(start));
        if cover > best_cover {
            best_cover = cover;
            best_page = page_index;
        }
    }
    best_page
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text: &str, page_index: u32) -> PageRecord {
        PageRecord {
            text: text.to_string(),
            page_index,
            source_filename: "doc.pdf".to_string(),
        }
    }

    fn char_len(s: &str) -> usize {
        s.chars().count()
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        assert!(matches!(
            ChunkSplitter::new(100, 100),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            ChunkSplitter::new(0, 0),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(ChunkSplitter::new(100, 99).is_ok());
    }

    #[test]
    fn empty_pages_produce_zero_chunks() {
        let splitter = ChunkSplitter::new(1000, 200).unwrap();
        assert!(splitter.split(&[]).is_empty());
        assert!(splitter.split(&[page("", 0), page("", 1)]).is_empty());
    }

    #[test]
    fn short_document_is_a_single_chunk() {
        let splitter = ChunkSplitter::new(1000, 200).unwrap();
        let chunks = splitter.split(&[page("just a few words", 0)]);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "just a few words");
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].page_index, 0);
    }

    #[test]
    fn three_pages_2500_chars_make_three_overlapping_chunks() {
        // 500 repetitions of "word " spread over three pages: 2500 chars.
        let p0 = "word ".repeat(167);
        let p1 = "word ".repeat(167);
        let p2 = "word ".repeat(166);
        let pages = [page(&p0, 0), page(&p1, 1), page(&p2, 2)];

        let splitter = ChunkSplitter::new(1000, 200).unwrap();
        let chunks = splitter.split(&pages);

        assert_eq!(chunks.len(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert!(char_len(&chunk.text) <= 1000);
            assert_eq!(chunk.chunk_index, i as u32);
        }

        // Chunk 2 starts 200 characters before the end of chunk 1's span.
        let tail: String = chunks[0]
            .text
            .chars()
            .skip(char_len(&chunks[0].text) - 200)
            .collect();
        let head: String = chunks[1].text.chars().take(200).collect();
        assert_eq!(tail, head);

        // Majority-page attribution follows the span.
        assert_eq!(chunks[0].page_index, 0);
        assert_eq!(chunks[1].page_index, 1);
        assert_eq!(chunks[2].page_index, 2);
    }

    #[test]
    fn every_consecutive_pair_overlaps_exactly() {
        let text = "lorem ipsum dolor sit amet ".repeat(60);
        let splitter = ChunkSplitter::new(300, 50).unwrap();
        let chunks = splitter.split(&[page(&text, 0)]);
        assert!(chunks.len() > 2);

        for pair in chunks.windows(2) {
            let tail: String = pair[0]
                .text
                .chars()
                .skip(char_len(&pair[0].text) - 50)
                .collect();
            let head: String = pair[1].text.chars().take(50).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn overlap_only_grows_total_characters() {
        let text = "alpha beta gamma delta epsilon ".repeat(40);
        let splitter = ChunkSplitter::new(200, 60).unwrap();
        let chunks = splitter.split(&[page(&text, 0)]);

        let total: usize = chunks.iter().map(|c| char_len(&c.text)).sum();
        assert!(total >= char_len(&text));
    }

    #[test]
    fn splitting_is_deterministic() {
        let text = "the quick brown fox jumps over the lazy dog. ".repeat(30);
        let pages = [page(&text, 0)];
        let splitter = ChunkSplitter::new(250, 40).unwrap();
        assert_eq!(splitter.split(&pages), splitter.split(&pages));
    }

    #[test]
    fn paragraph_breaks_are_preferred() {
        let text = format!("{}\n\n{}", "a".repeat(30), "b".repeat(100));
        let splitter = ChunkSplitter::new(50, 5).unwrap();
        let chunks = splitter.split(&[page(&text, 0)]);

        // First chunk ends right after the paragraph break rather than at
        // the raw 50-character cut.
        assert!(chunks[0].text.ends_with("\n\n"));
        assert_eq!(char_len(&chunks[0].text), 32);
    }

    #[test]
    fn sentence_breaks_beat_word_breaks() {
        let text = "First sentence here. Second sentence follows it and keeps going for a while now.";
        let splitter = ChunkSplitter::new(40, 5).unwrap();
        let chunks = splitter.split(&[page(text, 0)]);

        assert_eq!(chunks[0].text, "First sentence here. ");
    }

    #[test]
    fn unbroken_text_falls_back_to_raw_cuts() {
        let text = "x".repeat(500);
        let splitter = ChunkSplitter::new(100, 20).unwrap();
        let chunks = splitter.split(&[page(&text, 0)]);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_len(&chunk.text) <= 100);
        }
        let total: usize = chunks.iter().map(|c| char_len(&c.text)).sum();
        assert!(total >= 500);
    }

    #[test]
    fn multibyte_text_splits_on_character_boundaries() {
        let text = "héllo wörld ünïcode ".repeat(30);
        let splitter = ChunkSplitter::new(100, 20).unwrap();
        let chunks = splitter.split(&[page(&text, 0)]);

        for chunk in &chunks {
            assert!(char_len(&chunk.text) <= 100);
        }
        for pair in chunks.windows(2) {
            let tail: String = pair[0]
                .text
                .chars()
                .skip(char_len(&pair[0].text) - 20)
                .collect();
            let head: String = pair[1].text.chars().take(20).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn chunk_index_is_monotone_across_pages() {
        let p0 = "first page text. ".repeat(20);
        let p1 = "second page text. ".repeat(20);
        let splitter = ChunkSplitter::new(120, 30).unwrap();
        let chunks = splitter.split(&[page(&p0, 0), page(&p1, 1)]);

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i as u32);
        }
    }

    #[test]
    fn empty_page_between_content_pages_is_skipped() {
        let p0 = "start. ".repeat(10);
        let p2 = "finish. ".repeat(10);
        let splitter = ChunkSplitter::new(1000, 100).unwrap();
        let chunks = splitter.split(&[page(&p0, 0), page("", 1), page(&p2, 2)]);

        assert_eq!(chunks.len(), 1);
        // The single chunk is mostly page-2 text by one character; ties and
        // majorities resolve to a real contributing page, never page 1.
        assert_ne!(chunks[0].page_index, 1);
    }
}
