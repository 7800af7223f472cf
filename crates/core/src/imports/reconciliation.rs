//! Decides how freshly computed holdings land on stored ones.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::brokers::Broker;
use crate::holdings::{AggregatedHolding, Holding, HoldingKey, ImportStamp, NewHolding};

/// Writes needed to make stored holdings reflect one import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationPlan {
    /// Stored rows matched on ticker and direction, already carrying the new
    /// figures and provenance.
    pub updates: Vec<Holding>,
    pub inserts: Vec<NewHolding>,
    /// Ids of rows from the importing source that the import supersedes.
    pub removals: Vec<String>,
}

impl ReconciliationPlan {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.inserts.is_empty() && self.removals.is_empty()
    }
}

/// Rows written by a plan that was applied as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedPlan {
    pub removed: usize,
    pub updated: Vec<Holding>,
    pub inserted: Vec<Holding>,
}

/// Partitions `fresh` into updates and inserts against the user's `existing`
/// holdings and lists stale rows of the importing source for removal.
///
/// A key held by several stored rows resolves to the one already tagged with
/// the importing source, then to the first in `existing` order. Manual imports
/// never remove anything.
pub fn reconcile(
    fresh: &[AggregatedHolding],
    existing: &[Holding],
    broker: Broker,
    stamp: &ImportStamp,
) -> ReconciliationPlan {
    let source = broker.as_str();

    let mut by_key: HashMap<HoldingKey, &Holding> = HashMap::new();
    for holding in existing {
        by_key
            .entry(holding.key())
            .and_modify(|current| {
                if current.broker_source != source && holding.broker_source == source {
                    *current = holding;
                }
            })
            .or_insert(holding);
    }

    let mut plan = ReconciliationPlan::default();
    let mut matched: HashSet<&str> = HashSet::new();

    for holding in fresh {
        match by_key.get(&holding.key()) {
            Some(stored) => {
                matched.insert(stored.id.as_str());
                let mut updated = (*stored).clone();
                updated.apply_import(holding, stamp);
                plan.updates.push(updated);
            }
            None => plan.inserts.push(NewHolding::from_aggregated(holding, stamp)),
        }
    }

    if !broker.is_manual() {
        plan.removals = existing
            .iter()
            .filter(|h| h.broker_source == source && !matched.contains(h.id.as_str()))
            .map(|h| h.id.clone())
            .collect();
    }

    plan
}
