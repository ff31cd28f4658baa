//! Greedy caption grouping and its gate.

use reel_models::{Caption, CaptionStyle, WordTimestamp};

use crate::gate::GateReport;

/// Maximum words shown together.
pub const MAX_CAPTION_WORDS: usize = 3;

/// A group is closed once it stretches past this.
pub const SOFT_CAPTION_MS: u64 = 800;

/// No group may ever stretch past this.
pub const HARD_CAPTION_MS: u64 = 900;

/// Tolerance allowed past the audio end for the final caption.
pub const CAPTION_TAIL_MS: u64 = 100;

/// Group a scene's word timeline into captions.
///
/// Greedy left-to-right: a word joins the open group unless the group
/// is full or taking it would stretch past [`HARD_CAPTION_MS`]; after
/// joining, a group past [`SOFT_CAPTION_MS`] closes. Emphasis indices
/// are re-based to positions within the group.
pub fn group_captions(words: &[WordTimestamp]) -> Vec<Caption> {
    let mut captions = Vec::new();
    let mut group: Vec<&WordTimestamp> = Vec::new();

    let flush = |group: &mut Vec<&WordTimestamp>, captions: &mut Vec<Caption>| {
        if group.is_empty() {
            return;
        }
        let text = group
            .iter()
            .map(|w| w.word.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let emphasis_indices = group
            .iter()
            .enumerate()
            .filter(|(_, w)| w.emphasis)
            .map(|(i, _)| i)
            .collect();
        captions.push(Caption {
            text,
            start_ms: group[0].start_ms,
            end_ms: group.last().unwrap().end_ms,
            emphasis_indices,
            style: CaptionStyle::default(),
        });
        group.clear();
    };

    for word in words {
        if let Some(first) = group.first() {
            let stretched = word.end_ms.saturating_sub(first.start_ms);
            if group.len() == MAX_CAPTION_WORDS || stretched > HARD_CAPTION_MS {
                flush(&mut group, &mut captions);
            }
        }
        group.push(word);

        let span = group
            .last()
            .unwrap()
            .end_ms
            .saturating_sub(group[0].start_ms);
        if span > SOFT_CAPTION_MS {
            flush(&mut group, &mut captions);
        }
    }
    flush(&mut group, &mut captions);

    captions
}

/// Caption gate: word cap, duration cap, no overlap, tail bound.
pub fn validate_captions(captions: &[Caption], audio_duration_ms: u64) -> GateReport {
    let mut report = GateReport::new();

    for (index, caption) in captions.iter().enumerate() {
        let words = caption.word_count();
        if words == 0 || words > MAX_CAPTION_WORDS {
            report.push(format!(
                "Caption {index} has {words} words, expected 1-{MAX_CAPTION_WORDS}"
            ));
        }
        if caption.duration_ms() > HARD_CAPTION_MS {
            report.push(format!(
                "Caption {index} runs {}ms, max is {HARD_CAPTION_MS}ms",
                caption.duration_ms()
            ));
        }
    }

    for (index, pair) in captions.windows(2).enumerate() {
        if pair[1].start_ms < pair[0].end_ms {
            report.push(format!(
                "Captions {index} and {} overlap at {}ms",
                index + 1,
                pair[1].start_ms
            ));
        }
    }

    if let Some(last) = captions.last() {
        if last.end_ms > audio_duration_ms + CAPTION_TAIL_MS {
            report.push(format!(
                "Last caption ends at {}ms, past the audio end ({}ms)",
                last.end_ms, audio_duration_ms
            ));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start: u64, end: u64, emphasis: bool) -> WordTimestamp {
        WordTimestamp::new(text, start, end, emphasis)
    }

    #[test]
    fn test_basic_grouping() {
        let words = vec![
            word("a", 0, 300, false),
            word("b", 300, 600, false),
            word("c", 600, 900, false),
            word("d", 900, 1200, false),
        ];
        let captions = group_captions(&words);
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].text, "a b c");
        assert_eq!(captions[0].start_ms, 0);
        assert_eq!(captions[0].end_ms, 900);
        assert_eq!(captions[1].text, "d");
        assert_eq!(captions[1].start_ms, 900);
        assert_eq!(captions[1].end_ms, 1200);
    }

    #[test]
    fn test_word_cap() {
        // Fast hook words never hit the duration limits before the word cap
        let words: Vec<_> = (0..7)
            .map(|i| word(&format!("w{i}"), i * 240, (i + 1) * 240, false))
            .collect();
        let captions = group_captions(&words);
        assert_eq!(captions[0].word_count(), 3);
        assert_eq!(captions[1].word_count(), 3);
        assert_eq!(captions[2].word_count(), 1);
    }

    #[test]
    fn test_hard_cap_prevents_long_group() {
        // Two slow words fit; a third would stretch past 900ms and
        // starts a new group instead.
        let words = vec![
            word("one", 0, 360, false),
            word("two", 360, 720, false),
            word("three", 720, 1134, true),
        ];
        let captions = group_captions(&words);
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].text, "one two");
        assert_eq!(captions[1].text, "three");
    }

    #[test]
    fn test_emphasis_indices_rebased() {
        let words = vec![
            word("the", 0, 300, false),
            word("secret", 300, 645, true),
            word("is", 645, 945, false),
        ];
        let captions = group_captions(&words);
        assert_eq!(captions[0].text, "the secret");
        assert_eq!(captions[0].emphasis_indices, vec![1]);
    }

    #[test]
    fn test_gate_accepts_grouped_output() {
        let words: Vec<_> = (0..24)
            .map(|i| word(&format!("w{i}"), i * 300, (i + 1) * 300, i % 5 == 0))
            .collect();
        let captions = group_captions(&words);
        let report = validate_captions(&captions, 24 * 300);
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn test_gate_rejects_overlap() {
        let captions = vec![
            Caption {
                text: "a".into(),
                start_ms: 0,
                end_ms: 500,
                emphasis_indices: vec![],
                style: CaptionStyle::default(),
            },
            Caption {
                text: "b".into(),
                start_ms: 400,
                end_ms: 800,
                emphasis_indices: vec![],
                style: CaptionStyle::default(),
            },
        ];
        let report = validate_captions(&captions, 800);
        assert!(report.errors.iter().any(|e| e.contains("overlap")));
    }

    #[test]
    fn test_gate_rejects_late_tail() {
        let captions = vec![Caption {
            text: "late".into(),
            start_ms: 0,
            end_ms: 1000,
            emphasis_indices: vec![],
            style: CaptionStyle::default(),
        }];
        let report = validate_captions(&captions, 800);
        assert!(report.errors.iter().any(|e| e.contains("past the audio end")));
    }

    #[test]
    fn test_grouping_is_deterministic() {
        let words = vec![
            word("a", 0, 276, true),
            word("b", 276, 516, false),
            word("c", 516, 756, false),
            word("d", 756, 1032, true),
        ];
        assert_eq!(group_captions(&words), group_captions(&words));
    }
}
