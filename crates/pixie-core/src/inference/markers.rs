//! Filtering of engine-internal control tokens.
//!
//! Every fragment passes through [`filter_control_markers`] before it is
//! surfaced. Chat-template markers (`<end_of_turn>`, `<|eot_id|>`, ...) never
//! occur in prose and are matched anywhere in a fragment. The bare tokenizer
//! sentinels (`<s>`, `</s>`, `<eos>`, `<bos>`) look like ordinary markup, so
//! they only count when a fragment starts with them.

use futures::{StreamExt, stream};

use super::backend::FragmentStream;

/// Markers that end the model's turn. Nothing after them is surfaced.
pub const END_OF_TURN_MARKERS: &[&str] = &[
    "<end_of_turn>",
    "<eos>",
    "</s>",
    "<|eot_id|>",
    "<|end_of_text|>",
    "<|im_end|>",
    "<|endoftext|>",
];

/// Every marker removed from generated text.
pub const CONTROL_MARKERS: &[&str] = &[
    "<end_of_turn>",
    "<eos>",
    "</s>",
    "<|eot_id|>",
    "<|end_of_text|>",
    "<|im_end|>",
    "<|endoftext|>",
    "<start_of_turn>",
    "<bos>",
    "<s>",
    "<|begin_of_text|>",
    "<|start_header_id|>",
    "<|end_header_id|>",
    "<|im_start|>",
];

/// Sentinels that are only recognised at the start of a fragment.
const BARE_SENTINELS: &[&str] = &["<s>", "</s>", "<eos>", "<bos>"];

fn is_template_marker(marker: &str) -> bool {
    !BARE_SENTINELS.contains(&marker)
}

/// Result of scanning one fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerScan {
    /// Fragment text with markers removed (text after an end marker is dropped)
    pub text: String,
    /// Whether an end-of-turn marker was found
    pub end_of_turn: bool,
}

/// Removes control markers from a single fragment.
pub fn strip_control_markers(fragment: &str) -> MarkerScan {
    let mut rest = fragment;
    loop {
        let lead = rest.trim_start();
        match BARE_SENTINELS.iter().find(|s| lead.starts_with(**s)) {
            Some(sentinel) if END_OF_TURN_MARKERS.contains(sentinel) => {
                return MarkerScan {
                    text: String::new(),
                    end_of_turn: true,
                };
            }
            Some(sentinel) => rest = &lead[sentinel.len()..],
            None => break,
        }
    }

    let end = END_OF_TURN_MARKERS
        .iter()
        .filter(|marker| is_template_marker(marker))
        .filter_map(|marker| rest.find(marker))
        .min();

    let visible = match end {
        Some(index) => &rest[..index],
        None => rest,
    };

    let mut text = visible.to_string();
    for marker in CONTROL_MARKERS.iter().filter(|m| is_template_marker(m)) {
        if text.contains(marker) {
            text = text.replace(marker, "");
        }
    }

    MarkerScan {
        text,
        end_of_turn: end.is_some(),
    }
}

/// True when `text` could still grow into a marker with the next fragment.
fn is_partial_marker(text: &str) -> bool {
    let lead = text.trim_start();
    !lead.is_empty()
        && CONTROL_MARKERS
            .iter()
            .any(|marker| marker.len() > lead.len() && marker.starts_with(lead))
}

struct FilterState {
    raw: FragmentStream,
    /// Fragments held back because they may be the first half of a marker
    carry: String,
    finished: bool,
}

/// Wraps a raw fragment stream so that control markers never surface.
///
/// Fragments consisting only of markers are dropped, including markers split
/// across fragments. An end-of-turn marker terminates the stream after the
/// text preceding it. Errors pass through unchanged.
pub fn filter_control_markers(raw: FragmentStream) -> FragmentStream {
    let state = FilterState {
        raw,
        carry: String::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }
        loop {
            match state.raw.next().await {
                Some(Ok(fragment)) => {
                    let joined = if state.carry.is_empty() {
                        fragment
                    } else {
                        std::mem::take(&mut state.carry) + &fragment
                    };
                    if is_partial_marker(&joined) {
                        state.carry = joined;
                        continue;
                    }

                    let scan = strip_control_markers(&joined);
                    state.finished = scan.end_of_turn;
                    if scan.text.is_empty() && !joined.is_empty() {
                        if state.finished {
                            return None;
                        }
                        continue;
                    }
                    return Some((Ok(scan.text), state));
                }
                Some(Err(err)) => return Some((Err(err), state)),
                None => {
                    state.finished = true;
                    if state.carry.is_empty() {
                        return None;
                    }
                    // Never became a marker; surface it as text.
                    let text = std::mem::take(&mut state.carry);
                    return Some((Ok(text), state));
                }
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PixieError;

    fn raw(fragments: &[&str]) -> FragmentStream {
        let items: Vec<crate::error::Result<String>> =
            fragments.iter().map(|f| Ok(f.to_string())).collect();
        stream::iter(items).boxed()
    }

    async fn collect_ok(stream: FragmentStream) -> Vec<String> {
        stream
            .map(|item| item.expect("fragment"))
            .collect::<Vec<_>>()
            .await
    }

    #[test]
    fn test_strip_plain_fragment_untouched() {
        let scan = strip_control_markers("Hello");
        assert_eq!(scan.text, "Hello");
        assert!(!scan.end_of_turn);
    }

    #[test]
    fn test_strip_drops_text_after_end_marker() {
        let scan = strip_control_markers("four.<end_of_turn>\n<start_of_turn>user");
        assert_eq!(scan.text, "four.");
        assert!(scan.end_of_turn);
    }

    #[test]
    fn test_strip_removes_non_terminal_markers() {
        let scan = strip_control_markers("<bos>Hi");
        assert_eq!(scan.text, "Hi");
        assert!(!scan.end_of_turn);
    }

    #[test]
    fn test_strip_leaves_markup_inside_text() {
        let scan = strip_control_markers("Use <s>old</s> new");
        assert_eq!(scan.text, "Use <s>old</s> new");
        assert!(!scan.end_of_turn);
    }

    #[test]
    fn test_strip_leading_sentinel_ends_turn() {
        assert!(strip_control_markers("</s>").end_of_turn);
        assert!(strip_control_markers(" <eos>").end_of_turn);
    }

    #[test]
    fn test_partial_marker_detection() {
        assert!(is_partial_marker("<end_of"));
        assert!(is_partial_marker("<"));
        assert!(!is_partial_marker("<end_of_turn>"));
        assert!(!is_partial_marker("< b"));
        assert!(!is_partial_marker(""));
    }

    #[tokio::test]
    async fn test_filter_stops_at_end_of_turn() {
        let filtered = filter_control_markers(raw(&["2", " + 2 = 4", "<end_of_turn>", "junk"]));
        assert_eq!(collect_ok(filtered).await, vec!["2", " + 2 = 4"]);
    }

    #[tokio::test]
    async fn test_filter_keeps_whitespace_fragments() {
        let filtered = filter_control_markers(raw(&["a", " ", "\n", "b", "<eos>"]));
        assert_eq!(collect_ok(filtered).await, vec!["a", " ", "\n", "b"]);
    }

    #[tokio::test]
    async fn test_filter_passes_markup_content_through() {
        let filtered = filter_control_markers(raw(&[
            "Use <s>old</s> new",
            " text",
            "<end_of",
            "_turn>",
            "ignored",
        ]));
        assert_eq!(collect_ok(filtered).await, vec!["Use <s>old</s> new", " text"]);
    }

    #[tokio::test]
    async fn test_filter_releases_held_text_that_is_not_a_marker() {
        let filtered = filter_control_markers(raw(&["a", " <", " b", "<"]));
        let fragments = collect_ok(filtered).await;
        assert_eq!(fragments, vec!["a", " < b", "<"]);
        assert_eq!(fragments.concat(), "a < b<");
    }

    #[tokio::test]
    async fn test_filter_passes_errors_through() {
        let items: Vec<crate::error::Result<String>> = vec![
            Ok("partial".to_string()),
            Err(PixieError::generation("connection reset")),
        ];
        let mut filtered = filter_control_markers(stream::iter(items).boxed());

        assert_eq!(filtered.next().await.unwrap().unwrap(), "partial");
        assert!(filtered.next().await.unwrap().is_err());
        assert!(filtered.next().await.is_none());
    }
}
