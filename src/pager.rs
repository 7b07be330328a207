//! Exhaustive walk over a paged collection.
//!
//! The first page decides whether the collection exists at all, so its
//! failure fails the walk. A later page failing only truncates the result:
//! everything fetched so far is returned together with one error.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{QueryError, QueryErrorKind};
use crate::transport::{Request, Transport};

/// Items gathered from a paged collection.
#[derive(Debug, Clone, Default)]
pub struct Paged {
    /// Items in server order, pages concatenated in fetch order.
    pub items: Vec<Value>,
    /// Set when a continuation page failed and `items` is incomplete.
    pub truncated: Option<QueryError>,
}

/// Fetch `request` and every page reachable through its `next` links.
///
/// `context` names the collection in any error produced.
///
/// # Errors
///
/// Fails only if the first page cannot be fetched, answers with a
/// non-success status, or is not a JSON array.
pub async fn fetch_all(
    transport: &dyn Transport,
    request: Request,
    context: &str,
) -> Result<Paged, QueryError> {
    let first = transport
        .get(&request)
        .await
        .map_err(|kind| kind.context(context))?;
    let mut items = first
        .json::<Vec<Value>>()
        .map_err(|kind| kind.context(context))?;
    let mut next = first.next;
    let mut visited = HashSet::new();
    let mut page = 1u32;

    while let Some(url) = next.take() {
        if !visited.insert(url.clone()) {
            warn!(context, %url, "next link points to a page already fetched");
            break;
        }
        page += 1;
        let result = match transport.get(&Request::Next(url)).await {
            Ok(response) => response
                .json::<Vec<Value>>()
                .map(|page_items| (page_items, response.next)),
            Err(kind) => Err(kind),
        };

        match result {
            Ok((page_items, following)) => {
                debug!(context, page, count = page_items.len(), "page fetched");
                items.extend(page_items);
                next = following;
            }
            Err(cause) => {
                let err = QueryErrorKind::PartialPage {
                    page,
                    cause: Box::new(cause),
                }
                .context(context);
                warn!(error = %err, kept = items.len(), "pagination stopped early");
                return Ok(Paged {
                    items,
                    truncated: Some(err),
                });
            }
        }
    }

    debug!(context, pages = page, count = items.len(), "collection complete");
    Ok(Paged {
        items,
        truncated: None,
    })
}
