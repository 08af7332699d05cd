//! Which sync steps to run, and in what order.

use crate::error::{Error, Result};
use crate::store::CardStore;
use crate::sync;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// The steps of a one-way sync from a source store to a destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPlan {
    /// Drop every source id and renumber from scratch. The destination
    /// must not hold any ided cards.
    pub ignore_existing_ids: bool,
    /// Copy ided source cards the destination lacks.
    pub copy_unmatched: bool,
    /// Delete destination cards the source no longer has.
    pub delete_extra: bool,
    /// Overwrite destination cards from the source.
    pub update: bool,
    /// Id the source's new cards and add them to the destination.
    pub add_new: bool,
}

/// What a sync run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub copied: usize,
    pub deleted: usize,
    pub updated: usize,
    pub added: usize,
}

impl SyncPlan {
    /// Delete, update and add: the usual flashcard-to-wiki sync.
    pub fn full() -> Self {
        Self {
            delete_extra: true,
            update: true,
            add_new: true,
            ..Self::default()
        }
    }

    pub fn run<S, D>(&self, source: &mut S, destination: &mut D) -> Result<SyncReport>
    where
        S: CardStore + ?Sized,
        D: CardStore + ?Sized,
    {
        let mut report = SyncReport::default();

        if self.ignore_existing_ids {
            let held = destination.count_of_ids();
            if held != 0 {
                return Err(Error::DestinationHasIds(held));
            }
            warn!("ignoring (overwriting) source card ids");
            source.zap_ids();
        }
        if self.copy_unmatched {
            report.copied = sync::copy_unmatched_ided_cards(&*source, destination)?;
        }
        if self.delete_extra {
            report.deleted = sync::delete_extra_cards(&*source, destination);
        }

        if self.update || self.add_new {
            let source_next = source.next_id()?;
            let destination_next = destination.next_id()?;
            if source_next != destination_next {
                return Err(Error::NextIdMismatch {
                    source_next,
                    destination_next,
                });
            }
        }
        if self.update {
            report.updated = sync::update(&*source, destination)?;
        }
        if self.add_new {
            report.added = sync::mark_and_add_new_cards(source, destination)?.len();
        }

        info!(
            copied = report.copied,
            deleted = report.deleted,
            updated = report.updated,
            added = report.added,
            "sync finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delimited::DelimitedDeck;
    use crate::markup::WikiDocument;
    use crate::types::Card;
    use pretty_assertions::assert_eq;

    #[test]
    fn full_sync_into_empty_wiki_copies_everything() {
        let mut deck = DelimitedDeck::default();
        deck.add_card(Card::simple("front 1:back 1", None)).unwrap();
        deck.add_card(Card::simple("front 2:back 2", None)).unwrap();
        let mut wiki = WikiDocument::default();

        let report = SyncPlan::full().run(&mut deck, &mut wiki).unwrap();
        assert_eq!(report.added, 2);
        assert_eq!(deck.cards(), wiki.cards());
    }

    #[test]
    fn next_id_mismatch_stops_before_update() {
        let mut deck = DelimitedDeck::default();
        deck.add_card(Card::simple("changed", Some(1))).unwrap();
        deck.add_card(Card::simple("b", Some(2))).unwrap();
        let mut wiki = WikiDocument::default();
        wiki.add_card(Card::simple("original", Some(1))).unwrap();

        let plan = SyncPlan {
            update: true,
            ..SyncPlan::default()
        };
        let err = plan.run(&mut deck, &mut wiki).unwrap_err();
        assert!(matches!(
            err,
            Error::NextIdMismatch {
                source_next: 3,
                destination_next: 2
            }
        ));
        assert_eq!(wiki.get_card(1).unwrap().field("Text 1"), Some("original"));
    }

    #[test]
    fn ignore_ids_requires_destination_without_ids() {
        let mut deck = DelimitedDeck::default();
        deck.add_card(Card::simple("a", Some(10))).unwrap();
        let mut wiki = WikiDocument::default();
        wiki.add_card(Card::simple("a", Some(10))).unwrap();

        let plan = SyncPlan {
            ignore_existing_ids: true,
            add_new: true,
            ..SyncPlan::default()
        };
        assert!(matches!(
            plan.run(&mut deck, &mut wiki),
            Err(Error::DestinationHasIds(1))
        ));
        assert_eq!(deck.ids(), vec![Some(10)]);
    }

    #[test]
    fn ignore_ids_renumbers_source() {
        let mut deck = DelimitedDeck::default();
        deck.add_card(Card::simple("a", Some(10))).unwrap();
        let mut wiki = WikiDocument::default();

        let plan = SyncPlan {
            ignore_existing_ids: true,
            add_new: true,
            ..SyncPlan::default()
        };
        let report = plan.run(&mut deck, &mut wiki).unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(deck.ids(), vec![Some(crate::types::MIN_ID)]);
        assert_eq!(wiki.ids(), deck.ids());
    }

    #[test]
    fn empty_plan_changes_nothing() {
        let mut deck = DelimitedDeck::default();
        deck.add_card(Card::simple("a", None)).unwrap();
        let mut wiki = WikiDocument::default();
        let report = SyncPlan::default().run(&mut deck, &mut wiki).unwrap();
        assert_eq!(report, SyncReport::default());
        assert!(wiki.cards().is_empty());
        assert_eq!(deck.ids(), vec![None]);
    }
}
