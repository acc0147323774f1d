/*!
 * Sorting and grouping of filtered claims
 *
 * Records are keyed by account code and stably sorted in descending key
 * order. Each group is then folded left to right: every column keeps the
 * first present value it meets, except CPT codes which are space-joined.
 * Which row "wins" a column is therefore fully determined by the sort.
 */

use std::collections::btree_map::{BTreeMap, Entry};

use tracing::{debug, warn};

use crate::data_types::{AccountKey, AggregatedClaim, ClaimRecord, Column};

/// A record paired with its grouping key
pub type KeyedRecord = (AccountKey, ClaimRecord);

/// Attach grouping keys and sort descending by account code
///
/// Returns the sorted records and how many were dropped for having no
/// account code.
pub fn sort_by_account(records: Vec<ClaimRecord>) -> (Vec<KeyedRecord>, usize) {
    let numeric = records
        .iter()
        .filter_map(ClaimRecord::account_code)
        .all(|code| AccountKey::numeric(code).is_some());

    let total = records.len();
    let mut keyed: Vec<KeyedRecord> = records
        .into_iter()
        .filter_map(|record| {
            let key = record.account_code().map(|code| {
                if numeric {
                    AccountKey::numeric(code).unwrap_or_else(|| AccountKey::text(code))
                } else {
                    AccountKey::text(code)
                }
            })?;
            Some((key, record))
        })
        .collect();

    let missing = total - keyed.len();
    if missing > 0 {
        warn!(missing, "Dropping records without an account code");
    }

    // stable: rows sharing a key keep their input order
    keyed.sort_by(|a, b| b.0.cmp(&a.0));

    (keyed, missing)
}

/// Fold sorted records into one claim per account code
///
/// Output is in ascending account order.
pub fn aggregate(sorted: Vec<KeyedRecord>) -> Vec<AggregatedClaim> {
    let mut groups: BTreeMap<AccountKey, AggregatedClaim> = BTreeMap::new();

    for (key, record) in sorted {
        match groups.entry(key) {
            Entry::Vacant(slot) => {
                let key = slot.key().clone();
                slot.insert(AggregatedClaim::from_first(key, record));
            }
            Entry::Occupied(mut slot) => fold_into(slot.get_mut(), record),
        }
    }

    debug!(groups = groups.len(), "Aggregated claims by account code");
    groups.into_values().collect()
}

fn fold_into(claim: &mut AggregatedClaim, mut record: ClaimRecord) {
    claim.source_rows += 1;

    for column in Column::ALL {
        let incoming = record.take(column);
        let slot = claim.slot_mut(column);

        if column == Column::CptCodes {
            *slot = match (slot.take(), incoming) {
                (Some(existing), Some(more)) => Some(format!("{} {}", existing, more)),
                (existing, more) => existing.or(more),
            };
        } else if slot.is_none() {
            *slot = incoming;
        }
    }
}
