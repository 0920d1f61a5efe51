//! Per-character entity coverage

use crate::{ElinkError, Result, Span, SpanMap};

/// Coverage value for characters outside every mention
pub const NO_MENTION: usize = 0;

/// Build the coverage array for a text of `text_len` characters.
///
/// Each span in `spans` writes its id from `span_ids` over `[begin, end)`;
/// later spans overwrite earlier ones. Spans without an id are skipped.
pub fn compute_coverage<I>(text_len: usize, spans: I, span_ids: &SpanMap<usize>) -> Result<Vec<usize>>
where
    I: IntoIterator<Item = Span>,
{
    let mut coverage = vec![NO_MENTION; text_len];
    for span in spans {
        check_bounds(span, text_len)?;
        let Some(&id) = span_ids.get(&span) else {
            continue;
        };
        if span.begin < span.end {
            coverage[span.begin..span.end].fill(id);
        }
    }
    Ok(coverage)
}

/// Fail if `span` reaches past the end of the text
pub fn check_bounds(span: Span, text_len: usize) -> Result<()> {
    if span.begin > text_len || span.end > text_len {
        return Err(ElinkError::SpanOutOfRange { span, text_len });
    }
    Ok(())
}
