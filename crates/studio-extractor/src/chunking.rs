//! Sentence-aware text chunking with exact character offsets

/// A slice of the source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Chunk text, an exact slice of the source
    pub text: String,

    /// Character position of the chunk's first character in the source
    pub char_offset: usize,
}

impl TextChunk {
    /// Number of characters in the chunk
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Splits documents into chunks of at most `max_chars` characters
pub struct TextChunker {
    max_chars: usize,
}

impl TextChunker {
    /// Create a new text chunker; `0` disables chunking
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Chunk the given text.
    ///
    /// Sentences are packed greedily; a sentence longer than the limit is
    /// split at the last whitespace that fits, or cut hard when there is none.
    /// Concatenating the chunk texts always reproduces the input.
    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        let chars: Vec<char> = text.chars().collect();
        if self.max_chars == 0 || chars.len() <= self.max_chars {
            return vec![TextChunk {
                text: text.to_string(),
                char_offset: 0,
            }];
        }

        let mut ranges: Vec<(usize, usize)> = Vec::new();
        let mut current: Option<(usize, usize)> = None;

        for (start, end) in sentence_spans(&chars) {
            if end - start > self.max_chars {
                if let Some(range) = current.take() {
                    ranges.push(range);
                }
                ranges.extend(self.split_long(&chars, start, end));
                continue;
            }

            current = match current {
                Some((cs, _)) if end - cs > self.max_chars => {
                    ranges.push((cs, start));
                    Some((start, end))
                }
                Some((cs, _)) => Some((cs, end)),
                None => Some((start, end)),
            };
        }

        if let Some(range) = current {
            ranges.push(range);
        }

        ranges
            .into_iter()
            .map(|(start, end)| TextChunk {
                text: chars[start..end].iter().collect(),
                char_offset: start,
            })
            .collect()
    }

    /// Split one oversized sentence into pieces that fit
    fn split_long(&self, chars: &[char], start: usize, end: usize) -> Vec<(usize, usize)> {
        let mut pieces = Vec::new();
        let mut pos = start;

        while end - pos > self.max_chars {
            let limit = pos + self.max_chars;
            let cut = (pos + 1..=limit)
                .rev()
                .find(|&i| chars[i - 1].is_whitespace())
                .unwrap_or(limit);
            pieces.push((pos, cut));
            pos = cut;
        }

        if pos < end {
            pieces.push((pos, end));
        }
        pieces
    }
}

/// Sentence ranges covering the whole input, trailing whitespace included.
///
/// A sentence ends after a newline, or after `.`, `!` or `?` followed by
/// whitespace or the end of the text.
fn sentence_spans(chars: &[char]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next_is_space = chars.get(i + 1).map_or(true, |n| n.is_whitespace());
        if c == '\n' || (matches!(c, '.' | '!' | '?') && next_is_space) {
            let mut end = i + 1;
            while end < chars.len() && chars[end].is_whitespace() {
                end += 1;
            }
            spans.push((start, end));
            start = end;
            i = end;
        } else {
            i += 1;
        }
    }

    if start < chars.len() {
        spans.push((start, chars.len()));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn joined(chunks: &[TextChunk]) -> String {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_no_chunking_when_disabled() {
        let text = "One. Two. Three.";
        let chunks = TextChunker::new(0).chunk(text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        assert_eq!(chunks[0].char_offset, 0);
    }

    #[test]
    fn test_small_text_single_chunk() {
        let chunks = TextChunker::new(100).chunk("Short text.");
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_packs_sentences() {
        let text = "Alpha one. Beta two. Gamma three. Delta four.";
        let chunks = TextChunker::new(22).chunk(text);

        assert_eq!(chunks[0].text, "Alpha one. Beta two. ");
        assert_eq!(joined(&chunks), text);
        assert!(chunks.iter().all(|c| c.char_len() <= 22));
    }

    #[test]
    fn test_offsets_index_source() {
        let text = "Patient denies chest pain. BP 142/88. Started lisinopril 10mg daily.";
        let chars: Vec<char> = text.chars().collect();
        for chunk in TextChunker::new(30).chunk(text) {
            let slice: String = chars[chunk.char_offset..chunk.char_offset + chunk.char_len()]
                .iter()
                .collect();
            assert_eq!(slice, chunk.text);
        }
    }

    #[test]
    fn test_long_sentence_splits_on_whitespace() {
        let text = "word ".repeat(20);
        let chunks = TextChunker::new(12).chunk(&text);

        assert_eq!(joined(&chunks), text);
        assert!(chunks.iter().all(|c| c.char_len() <= 12));
        assert!(chunks.iter().all(|c| c.text.ends_with(' ')));
    }

    #[test]
    fn test_hard_cut_without_whitespace() {
        let text = "x".repeat(25);
        let chunks = TextChunker::new(10).chunk(&text);
        let lens: Vec<usize> = chunks.iter().map(|c| c.char_len()).collect();
        assert_eq!(lens, vec![10, 10, 5]);
    }

    #[test]
    fn test_decimal_point_is_not_a_boundary() {
        let spans = sentence_spans(&"Dose 2.5 mg. Next".chars().collect::<Vec<_>>());
        assert_eq!(spans, vec![(0, 13), (13, 17)]);
    }

    #[test]
    fn test_multibyte_offsets_are_chars() {
        let text = "Café é ouvert. Très bien. Au revoir.";
        let chunks = TextChunker::new(16).chunk(text);
        assert_eq!(joined(&chunks), text);
        assert_eq!(chunks[1].char_offset, chunks[0].char_len());
    }

    proptest! {
        #[test]
        fn prop_chunks_reassemble(text in "[a-zé .!?\n]{0,300}", max in 1usize..60) {
            let chunks = TextChunker::new(max).chunk(&text);
            prop_assert_eq!(joined(&chunks), text.clone());

            let mut expected_offset = 0;
            for chunk in &chunks {
                prop_assert_eq!(chunk.char_offset, expected_offset);
                expected_offset += chunk.char_len();
                if text.chars().count() > max {
                    prop_assert!(chunk.char_len() <= max);
                }
            }
        }
    }
}
