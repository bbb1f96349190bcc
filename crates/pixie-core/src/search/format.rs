use super::model::SearchHit;

/// Renders hits as numbered blocks, preserving their order.
///
/// Returns `None` for an empty slice so that "nothing found" never reaches
/// the prompt as text.
pub fn format_for_context(results: &[SearchHit]) -> Option<String> {
    if results.is_empty() {
        return None;
    }

    let blocks: Vec<String> = results
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "[{}] Title: {}\n    Snippet: {}\n    URL: {}",
                i + 1,
                hit.title,
                hit.snippet,
                hit.url
            )
        })
        .collect();

    Some(blocks.join("\n\n"))
}
