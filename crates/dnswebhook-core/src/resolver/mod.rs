//! Paginated reads from the remote API
//!
//! - [`ZoneResolver`]: all (optionally filtered) active zones of the project
//! - [`RecordSetResolver`]: record sets of one zone, and the zone/record-set
//!   pair targeted by an update or delete
//!
//! Both walk the listing with a fixed page size, starting at page 1 and
//! continuing while the page number does not exceed the reported total. A
//! failed page discards everything fetched so far.

pub mod record_sets;
pub mod zones;

pub use record_sets::RecordSetResolver;
pub use zones::ZoneResolver;

use crate::error::Result;
use std::future::Future;

/// Fetch every page, concatenating items in page order.
///
/// `fetch` receives the 1-based page number and returns that page's items
/// together with the server-reported total page count.
pub(crate) async fn fetch_all_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, u32)>>,
{
    let mut result = Vec::new();
    let mut page = 1;

    loop {
        let (items, total_pages) = fetch(page).await?;
        result.extend(items);

        page += 1;
        if page > total_pages {
            break;
        }
    }

    Ok(result)
}
