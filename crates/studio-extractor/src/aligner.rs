//! Grounding extracted text to character offsets

use studio_domain::{AlignmentStatus, CharInterval};

/// Locates extraction texts within one chunk.
///
/// Matches are searched from a cursor that advances past each hit, so
/// repeated mentions bind to successive occurrences. When nothing is found
/// after the cursor the search restarts from the beginning of the chunk.
pub struct Aligner {
    chars: Vec<char>,
    folded: Vec<char>,
    cursor: usize,
}

impl Aligner {
    /// Create an aligner over `source`
    pub fn new(source: &str) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let folded = chars.iter().map(|&c| fold(c)).collect();
        Self {
            chars,
            folded,
            cursor: 0,
        }
    }

    /// Find `text`, exact match first and case-insensitive second.
    ///
    /// Returns `None` when the text does not occur at all.
    pub fn align(&mut self, text: &str) -> Option<(CharInterval, AlignmentStatus)> {
        let needle: Vec<char> = text.trim().chars().collect();
        if needle.is_empty() {
            return None;
        }

        if let Some(start) = self.search(&self.chars, &needle) {
            return Some(self.hit(start, needle.len(), AlignmentStatus::MatchExact));
        }

        let folded_needle: Vec<char> = needle.iter().map(|&c| fold(c)).collect();
        if let Some(start) = self.search(&self.folded, &folded_needle) {
            return Some(self.hit(start, needle.len(), AlignmentStatus::MatchLesser));
        }

        None
    }

    fn hit(&mut self, start: usize, len: usize, status: AlignmentStatus) -> (CharInterval, AlignmentStatus) {
        self.cursor = start + len;
        (CharInterval::new(start, start + len), status)
    }

    fn search(&self, haystack: &[char], needle: &[char]) -> Option<usize> {
        find_from(haystack, needle, self.cursor).or_else(|| find_from(haystack, needle, 0))
    }
}

fn find_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.len() > haystack.len() || from > haystack.len() - needle.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}

/// Single-character lowercase, keeping positions one-to-one
fn fold(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn slice(source: &str, interval: CharInterval) -> String {
        source
            .chars()
            .skip(interval.start_pos)
            .take(interval.len())
            .collect()
    }

    #[test]
    fn test_exact_match() {
        let source = "Patient was given 250 mg IV Cefazolin TID.";
        let mut aligner = Aligner::new(source);

        let (interval, status) = aligner.align("Cefazolin").unwrap();
        assert_eq!(status, AlignmentStatus::MatchExact);
        assert_eq!(slice(source, interval), "Cefazolin");
    }

    #[test]
    fn test_case_insensitive_match() {
        let source = "ROMEO enters.";
        let mut aligner = Aligner::new(source);

        let (interval, status) = aligner.align("Romeo").unwrap();
        assert_eq!(status, AlignmentStatus::MatchLesser);
        assert_eq!(interval, CharInterval::new(0, 5));
    }

    #[test]
    fn test_not_found() {
        let mut aligner = Aligner::new("Nothing relevant here.");
        assert!(aligner.align("metformin").is_none());
        assert!(aligner.align("   ").is_none());
    }

    #[test]
    fn test_repeated_mentions_advance() {
        let source = "rash, then rash again";
        let mut aligner = Aligner::new(source);

        let (first, _) = aligner.align("rash").unwrap();
        let (second, _) = aligner.align("rash").unwrap();
        assert_eq!(first.start_pos, 0);
        assert_eq!(second.start_pos, 11);

        // wraps around once past the last occurrence
        let (third, _) = aligner.align("rash").unwrap();
        assert_eq!(third.start_pos, 0);
    }

    #[test]
    fn test_out_of_order_falls_back_to_start() {
        let source = "aspirin and ibuprofen";
        let mut aligner = Aligner::new(source);

        aligner.align("ibuprofen").unwrap();
        let (interval, _) = aligner.align("aspirin").unwrap();
        assert_eq!(interval.start_pos, 0);
    }

    #[test]
    fn test_offsets_count_chars_not_bytes() {
        let source = "Débridement of wound";
        let mut aligner = Aligner::new(source);
        let (interval, _) = aligner.align("wound").unwrap();
        assert_eq!(interval, CharInterval::new(15, 20));
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        let mut aligner = Aligner::new("BP 142/88");
        let (interval, status) = aligner.align(" 142/88 ").unwrap();
        assert_eq!(interval, CharInterval::new(3, 9));
        assert_eq!(status, AlignmentStatus::MatchExact);
    }

    proptest! {
        #[test]
        fn prop_grounded_offsets_index_source(
            source in "[a-zA-Z ]{1,80}",
            start in 0usize..80,
            len in 1usize..10,
        ) {
            let chars: Vec<char> = source.chars().collect();
            let start = start.min(chars.len() - 1);
            let end = (start + len).min(chars.len());
            let needle: String = chars[start..end].iter().collect();
            prop_assume!(!needle.trim().is_empty());

            let mut aligner = Aligner::new(&source);
            let (interval, status) = aligner.align(&needle).unwrap();
            prop_assert_eq!(status, AlignmentStatus::MatchExact);
            prop_assert_eq!(slice(&source, interval), needle.trim().to_string());
        }
    }
}
