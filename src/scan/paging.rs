use std::future::Future;
use tracing::debug;

use super::context::ScanContext;
use crate::collectors::{CollectorResult, Page, PageRequest};

/// Follows list cursors until the last page, concatenating items in order.
///
/// Cancellation is checked before every page and each page is bounded by the
/// context deadline. An empty cursor ends the listing like a missing one.
pub async fn collect_pages<T, F, Fut>(ctx: &ScanContext, page_size: i32, mut fetch: F) -> CollectorResult<Vec<T>>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = CollectorResult<Page<T>>>,
{
    let mut items = Vec::new();
    let mut next_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        ctx.ensure_active()?;

        let page = ctx
            .call(fetch(PageRequest {
                next_token: next_token.take(),
                max_results: page_size,
            }))
            .await?;
        pages += 1;
        items.extend(page.items);

        match page.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => break,
        }
    }

    debug!("Collected {} item(s) over {} page(s)", items.len(), pages);
    Ok(items)
}
