//! Resolution of overlapping dialogue intervals into a flat cue sequence.
//!
//! ASS events may overlap freely; SRT and WebVTT players expect one cue at a
//! time. Intervals are swept in start order with a single accumulator. Two
//! overlapping intervals are split into up to three pieces: the head of the
//! earlier one, the shared middle showing both texts, and a tail that
//! becomes the new accumulator so later overlaps chain onto it.

use crate::model::{Cue, DialogueInterval};

#[derive(Debug)]
struct Sweep {
    min_duration_ms: u64,
    cues: Vec<Cue>,
}

impl Sweep {
    /// Emits `[start, end)` with the text and styling of `source`, unless it
    /// is too short to show.
    fn emit(&mut self, source: &DialogueInterval, span: Span, text: String) {
        let duration = span.end_ms.saturating_sub(span.start_ms);
        if duration <= self.min_duration_ms {
            tracing::debug!(
                start_ms = span.start_ms,
                end_ms = span.end_ms,
                "dropping cue shorter than minimum duration"
            );
            return;
        }

        let index = u32::try_from(self.cues.len() + 1).unwrap_or(u32::MAX);
        self.cues.push(Cue {
            index,
            start_ms: span.start_ms,
            end_ms: span.end_ms,
            start: span.start_str,
            end: span.end_str,
            text,
            voice: Some(source.style_name.clone()).filter(|v| !v.is_empty()),
            inline_style: Some(source.inline_style_css.clone()).filter(|s| !s.is_empty()),
        });
    }

    fn flush(&mut self, acc: &DialogueInterval) {
        self.emit(acc, Span::whole(acc), acc.text.clone());
    }
}

#[derive(Debug, Clone)]
struct Span {
    start_ms: u64,
    end_ms: u64,
    start_str: String,
    end_str: String,
}

impl Span {
    fn whole(iv: &DialogueInterval) -> Self {
        Self {
            start_ms: iv.start_ms,
            end_ms: iv.end_ms,
            start_str: iv.start_str.clone(),
            end_str: iv.end_str.clone(),
        }
    }

    /// From the start (or end) of `from` to the start (or end) of `to`.
    fn between(
        from: &DialogueInterval,
        from_end: bool,
        to: &DialogueInterval,
        to_end: bool,
    ) -> Self {
        let (start_ms, start_str) = if from_end {
            (from.end_ms, from.end_str.clone())
        } else {
            (from.start_ms, from.start_str.clone())
        };
        let (end_ms, end_str) = if to_end {
            (to.end_ms, to.end_str.clone())
        } else {
            (to.start_ms, to.start_str.clone())
        };
        Self {
            start_ms,
            end_ms,
            start_str,
            end_str,
        }
    }
}

/// Splits the overlap of `acc` and `next` and returns the remaining tail.
fn split_overlap(
    sweep: &mut Sweep,
    acc: &DialogueInterval,
    next: &DialogueInterval,
) -> DialogueInterval {
    // `next` can start before `acc` when `acc` is itself a tail.
    let next_starts_later = next.start_ms >= acc.start_ms;
    if !next_starts_later && next.end_ms <= acc.start_ms {
        tracing::debug!(
            start_ms = next.start_ms,
            end_ms = next.end_ms,
            "interval lies inside already emitted cues"
        );
        return acc.clone();
    }
    let next_ends_first = next.end_ms < acc.end_ms;

    if next_starts_later {
        sweep.emit(acc, Span::between(acc, false, next, false), acc.text.clone());
    }

    let shared = Span::between(
        if next_starts_later { next } else { acc },
        false,
        if next_ends_first { next } else { acc },
        true,
    );
    sweep.emit(acc, shared, format!("{}\r\n{}", acc.text, next.text));

    let (first_end, tail_owner) = if next_ends_first { (next, acc) } else { (acc, next) };
    DialogueInterval {
        start_ms: first_end.end_ms,
        start_str: first_end.end_str.clone(),
        ..tail_owner.clone()
    }
}

/// Reconciles `intervals` into ordered, non-overlapping cues with 1-based
/// indices. Cues lasting `min_duration_ms` or less are dropped.
pub fn reconcile(mut intervals: Vec<DialogueInterval>, min_duration_ms: u64) -> Vec<Cue> {
    // Stable: equal starts keep file order.
    intervals.sort_by_key(|iv| iv.start_ms);

    let mut sweep = Sweep {
        min_duration_ms,
        cues: Vec::with_capacity(intervals.len()),
    };

    let mut rest = intervals.into_iter();
    let Some(first) = rest.next() else {
        return sweep.cues;
    };

    let last = rest.fold(first, |acc, next| {
        if acc.end_ms >= next.start_ms {
            if acc.text == next.text {
                let widened = if next.end_ms > acc.end_ms {
                    DialogueInterval {
                        end_ms: next.end_ms,
                        end_str: next.end_str,
                        ..acc
                    }
                } else {
                    acc
                };
                return widened;
            }
            if acc.end_ms > next.start_ms {
                return split_overlap(&mut sweep, &acc, &next);
            }
        }
        sweep.flush(&acc);
        next
    });
    sweep.flush(&last);

    sweep.cues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::time::format_srt_timestamp;

    fn iv(start_ms: u64, end_ms: u64, text: &str) -> DialogueInterval {
        DialogueInterval {
            start_ms,
            end_ms,
            start_str: format_srt_timestamp(start_ms),
            end_str: format_srt_timestamp(end_ms),
            text: text.to_string(),
            style_name: "Default".to_string(),
            inline_style_css: String::new(),
        }
    }

    fn spans(cues: &[Cue]) -> Vec<(u64, u64, &str)> {
        cues.iter()
            .map(|c| (c.start_ms, c.end_ms, c.text.as_str()))
            .collect()
    }

    fn assert_invariants(cues: &[Cue], min: u64) {
        for (i, c) in cues.iter().enumerate() {
            assert_eq!(c.index as usize, i + 1);
            assert!(c.duration_ms() > min, "cue {} too short", c.index);
        }
        for pair in cues.windows(2) {
            assert!(pair[0].end_ms <= pair[1].start_ms, "{pair:?} overlap");
        }
    }

    #[test]
    fn partial_overlap_splits_in_three() {
        let cues = reconcile(vec![iv(1000, 3000, "A"), iv(2000, 4000, "B")], 300);
        assert_eq!(
            spans(&cues),
            vec![(1000, 2000, "A"), (2000, 3000, "A\r\nB"), (3000, 4000, "B")]
        );
        assert_eq!(cues[1].start, "00:00:02,000");
        assert_eq!(cues[1].end, "00:00:03,000");
        assert_invariants(&cues, 300);
    }

    #[test]
    fn identical_text_merges_into_union() {
        let cues = reconcile(vec![iv(1000, 3000, "Same"), iv(2000, 5000, "Same")], 300);
        assert_eq!(spans(&cues), vec![(1000, 5000, "Same")]);
        assert_eq!(cues[0].end, "00:00:05,000");
    }

    #[test]
    fn merge_never_shrinks() {
        let cues = reconcile(vec![iv(1000, 5000, "Same"), iv(2000, 3000, "Same")], 300);
        assert_eq!(spans(&cues), vec![(1000, 5000, "Same")]);
    }

    #[test]
    fn touching_intervals_stay_separate() {
        let cues = reconcile(vec![iv(1000, 2000, "A"), iv(2000, 3000, "B")], 300);
        assert_eq!(spans(&cues), vec![(1000, 2000, "A"), (2000, 3000, "B")]);
    }

    #[test]
    fn sorts_by_start_and_renumbers() {
        let cues = reconcile(
            vec![iv(5000, 6000, "C"), iv(1000, 2000, "A"), iv(3000, 4000, "B")],
            300,
        );
        assert_eq!(
            spans(&cues),
            vec![(1000, 2000, "A"), (3000, 4000, "B"), (5000, 6000, "C")]
        );
        assert_invariants(&cues, 300);
    }

    #[test]
    fn short_pieces_are_dropped() {
        let cues = reconcile(vec![iv(1000, 3000, "A"), iv(1200, 4000, "B")], 300);
        assert_eq!(spans(&cues), vec![(1200, 3000, "A\r\nB"), (3000, 4000, "B")]);
        assert_eq!(cues[0].index, 1);

        let cues = reconcile(vec![iv(0, 300, "flash"), iv(1000, 1301, "ok")], 300);
        assert_eq!(spans(&cues), vec![(1000, 1301, "ok")]);
    }

    #[test]
    fn contained_interval_returns_to_outer_text() {
        let cues = reconcile(vec![iv(0, 10_000, "Outer"), iv(2000, 4000, "Inner")], 300);
        assert_eq!(
            spans(&cues),
            vec![
                (0, 2000, "Outer"),
                (2000, 4000, "Outer\r\nInner"),
                (4000, 10_000, "Outer")
            ]
        );
        assert_invariants(&cues, 300);
    }

    #[test]
    fn chained_overlaps_roll_forward() {
        let cues = reconcile(
            vec![iv(0, 2000, "A"), iv(1000, 3000, "B"), iv(2500, 4000, "C")],
            300,
        );
        assert_eq!(
            spans(&cues),
            vec![
                (0, 1000, "A"),
                (1000, 2000, "A\r\nB"),
                (2000, 2500, "B"),
                (2500, 3000, "B\r\nC"),
                (3000, 4000, "C")
            ]
        );
        assert_invariants(&cues, 300);
    }

    #[test]
    fn three_way_overlap_never_overlaps_output() {
        let cues = reconcile(
            vec![iv(0, 10_000, "A"), iv(2000, 8000, "B"), iv(4000, 9000, "C")],
            300,
        );
        assert_invariants(&cues, 300);
        assert_eq!(cues.last().map(|c| c.end_ms), Some(10_000));
    }

    #[test]
    fn interval_shadowed_by_earlier_split_is_absorbed() {
        let cues = reconcile(
            vec![iv(0, 10_000, "A"), iv(1000, 9000, "B"), iv(2000, 3000, "C")],
            300,
        );
        assert_invariants(&cues, 300);
        assert_eq!(
            spans(&cues),
            vec![
                (0, 1000, "A"),
                (1000, 9000, "A\r\nB"),
                (9000, 10_000, "A")
            ]
        );
    }

    #[test]
    fn interval_reaching_into_tail_splits_from_tail_start() {
        let cues = reconcile(
            vec![iv(0, 10_000, "A"), iv(1000, 5000, "B"), iv(2000, 7000, "C")],
            300,
        );
        assert_invariants(&cues, 300);
        assert_eq!(
            spans(&cues),
            vec![
                (0, 1000, "A"),
                (1000, 5000, "A\r\nB"),
                (5000, 7000, "A\r\nC"),
                (7000, 10_000, "A")
            ]
        );
    }

    #[test]
    fn inverted_interval_is_dropped() {
        let cues = reconcile(vec![iv(5000, 1000, "backwards")], 300);
        assert!(cues.is_empty());
    }

    #[test]
    fn empty_input() {
        assert!(reconcile(Vec::new(), 300).is_empty());
    }

    #[test]
    fn split_cues_keep_voice_and_style() {
        let mut a = iv(0, 2000, "A");
        a.style_name = "Alice".to_string();
        a.inline_style_css = "color: #FF0000;\r\n".to_string();
        let mut b = iv(1000, 3000, "B");
        b.style_name = "Bob".to_string();

        let cues = reconcile(vec![a, b], 300);
        assert_eq!(cues[0].voice.as_deref(), Some("Alice"));
        assert_eq!(cues[1].voice.as_deref(), Some("Alice"));
        assert_eq!(cues[1].inline_style.as_deref(), Some("color: #FF0000;\r\n"));
        assert_eq!(cues[2].voice.as_deref(), Some("Bob"));
        assert_eq!(cues[2].inline_style, None);
    }
}
