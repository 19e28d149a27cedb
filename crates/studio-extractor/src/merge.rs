//! Combining the results of several extraction passes

use studio_domain::Extraction;

/// Merge per-pass extractions into one ordered list.
///
/// The first pass is kept whole. A later grounded extraction is added when
/// its interval overlaps nothing already kept; a later ungrounded one is
/// added when no kept extraction has the same class and text. The result is
/// ordered by start offset with ungrounded extractions last, and numbered
/// from 1.
pub fn merge_passes(passes: Vec<Vec<Extraction>>) -> Vec<Extraction> {
    let mut passes = passes.into_iter();
    let mut kept: Vec<Extraction> = passes.next().unwrap_or_default();

    for pass in passes {
        for candidate in pass {
            let accept = match candidate.char_interval {
                Some(interval) => !kept
                    .iter()
                    .filter_map(|e| e.char_interval)
                    .any(|other| other.overlaps(&interval)),
                None => !kept.iter().any(|e| {
                    e.extraction_class == candidate.extraction_class
                        && e.extraction_text == candidate.extraction_text
                }),
            };
            if accept {
                kept.push(candidate);
            }
        }
    }

    // stable: equal keys keep pass order
    kept.sort_by_key(|e| match e.char_interval {
        Some(interval) => (0, interval.start_pos, interval.end_pos),
        None => (1, 0, 0),
    });

    for (index, extraction) in kept.iter_mut().enumerate() {
        extraction.extraction_index = Some(index + 1);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_domain::{AlignmentStatus, CharInterval};

    fn at(class: &str, text: &str, start: usize, end: usize) -> Extraction {
        Extraction::new(class, text).grounded(CharInterval::new(start, end), AlignmentStatus::MatchExact)
    }

    #[test]
    fn test_single_pass_is_sorted_and_indexed() {
        let merged = merge_passes(vec![vec![
            at("issue", "crashes", 20, 27),
            Extraction::new("feature", "dark mode"),
            at("feature", "battery", 0, 7),
        ]]);

        let texts: Vec<&str> = merged.iter().map(|e| e.extraction_text.as_str()).collect();
        assert_eq!(texts, vec!["battery", "crashes", "dark mode"]);
        let indexes: Vec<usize> = merged.iter().filter_map(|e| e.extraction_index).collect();
        assert_eq!(indexes, vec![1, 2, 3]);
    }

    #[test]
    fn test_later_pass_fills_gaps_only() {
        let merged = merge_passes(vec![
            vec![at("medication", "Lisinopril", 0, 10)],
            vec![
                at("medication", "Lisinopril 10mg", 0, 15),
                at("diagnosis", "hypertension", 30, 42),
            ],
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].extraction_text, "Lisinopril");
        assert_eq!(merged[1].extraction_text, "hypertension");
    }

    #[test]
    fn test_later_passes_see_each_others_additions() {
        let merged = merge_passes(vec![
            vec![],
            vec![at("party", "ACME", 0, 4)],
            vec![at("party", "ACME Corp", 0, 9)],
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].extraction_text, "ACME");
    }

    #[test]
    fn test_ungrounded_deduplicated_by_class_and_text() {
        let merged = merge_passes(vec![
            vec![Extraction::new("entity", "Marie Curie")],
            vec![
                Extraction::new("entity", "Marie Curie"),
                Extraction::new("relationship", "Marie Curie"),
            ],
        ]);
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|e| !e.is_grounded()));
    }

    #[test]
    fn test_no_overlaps_introduced_by_later_passes() {
        let merged = merge_passes(vec![
            vec![at("a", "x", 5, 10)],
            vec![at("a", "y", 8, 12), at("a", "z", 10, 14), at("a", "w", 0, 5)],
        ]);
        let intervals: Vec<CharInterval> = merged.iter().filter_map(|e| e.char_interval).collect();
        assert_eq!(
            intervals,
            vec![CharInterval::new(0, 5), CharInterval::new(5, 10), CharInterval::new(10, 14)]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_passes(vec![]).is_empty());
    }
}
