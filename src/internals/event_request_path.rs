use ::anyhow::Context;
use ::anyhow::Result;

use crate::EXECUTE_EVENT_QUERY_PARAM;

/// Builds the path an event request is sent to,
/// with the event id added as a query parameter.
pub(crate) fn build_event_request_path(page_url: &str, event_id: &str) -> Result<String> {
    let query = ::serde_urlencoded::to_string(&[(EXECUTE_EVENT_QUERY_PARAM, event_id)])
        .with_context(|| format!("Failed to encode event id '{event_id}' as a query parameter"))?;

    let separator = if page_url.contains('?') { '&' } else { '?' };

    Ok(format!("{page_url}{separator}{query}"))
}
