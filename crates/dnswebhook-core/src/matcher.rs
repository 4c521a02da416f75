//! Zone and record-set selection
//!
//! Pure functions used by the workers to locate the target of a change.

use crate::model::{RecordSet, Zone};

/// Find the zone owning `name`.
///
/// A zone qualifies when its (non-empty) DNS name is contained in `name`; the
/// longest qualifying zone wins, and among equally long candidates the first
/// one in input order is kept. `foo.bar.com.` beats `bar.com.` for
/// `www.foo.bar.com.`.
pub fn find_best_matching_zone<'a>(name: &str, zones: &'a [Zone]) -> Option<&'a Zone> {
    let mut best: Option<&Zone> = None;
    let mut best_len = 0;

    for zone in zones {
        let len = zone.dns_name.len();
        if len > best_len && name.contains(zone.dns_name.as_str()) {
            best_len = len;
            best = Some(zone);
        }
    }

    best
}

/// Find the record set with exactly this name and type
pub fn find_rrset<'a>(
    name: &str,
    record_type: &str,
    record_sets: &'a [RecordSet],
) -> Option<&'a RecordSet> {
    record_sets.iter().find(|rr| rr.is(name, record_type))
}
