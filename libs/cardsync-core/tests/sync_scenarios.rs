//! End-to-end syncs between a loaded export and a loaded wiki page.

mod common;

use cardsync_core::sync::{
    copy_unmatched_ided_cards, delete_extra_cards, mark_and_add_new_cards, update,
};
use cardsync_core::{Card, CardStore, Error, SyncPlan, SyncReport, MIN_ID};
use pretty_assertions::assert_eq;

use common::fixtures::{self, DECK, EMPTY_DECK, EMPTY_WIKI, WIKI};
use common::{load_deck, load_wiki, present_ids};

/// Field data with empty fields dropped, as the wiki renders it.
fn visible(card: &Card) -> Vec<(String, String)> {
    card.iter_fields()
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Test a canonical export is written back byte for byte.
#[test]
fn test_deck_round_trips_exactly() {
    let deck = load_deck(DECK);
    assert_eq!(deck.encode().unwrap(), DECK);
    assert_eq!(load_deck(EMPTY_DECK).encode().unwrap(), EMPTY_DECK);
}

/// Test an untouched wiki page is written back byte for byte.
#[test]
fn test_wiki_round_trips_exactly() {
    let wiki = load_wiki(WIKI);
    assert_eq!(wiki.encode(), WIKI);
    assert_eq!(load_wiki(&wiki.encode()).cards(), wiki.cards());
}

/// Test the full sync from an export into its wiki page.
#[test]
fn test_full_sync_deck_to_wiki() {
    let mut deck = load_deck(DECK);
    let mut wiki = load_wiki(WIKI);

    let report = SyncPlan::full().run(&mut deck, &mut wiki).unwrap();
    assert_eq!(
        report,
        SyncReport {
            copied: 0,
            deleted: 1,
            updated: 3,
            added: 1,
        }
    );

    assert_eq!(deck.ids(), vec![Some(1), Some(2), Some(3), Some(4)]);
    assert_eq!(wiki.ids(), deck.ids());
    assert_eq!(wiki.cards(), deck.cards());

    let expected_deck = DECK.replace(
        "capital of Japan\tTokyo\t\r\n",
        "capital of Japan\tTokyo\t4 : DO NOT MODIFY THIS LINE\r\n",
    );
    assert_eq!(deck.encode().unwrap(), expected_deck);

    let page = wiki.encode();
    assert!(page.starts_with("<!DOCTYPE html>\n<html>\n<head><title>Capitals</title></head>"));
    assert!(page.contains("<p>Cards below are kept in step with the app.</p>"));
    assert!(!page.contains("Atlantis"));
    assert!(page.contains(
        "<card id=\"2\">\n\
         <field><name>Text 1</name> : <value>capital of Peru</value></field>\n\
         <field><name>Text 2</name> : <value>Lima<br>(on the coast)</value></field>\n\
         <field><name>Notes</name> : <value>seen twice</value></field>\n\
         </card>"
    ));
    assert!(page.ends_with(
        "<new-cards-here>\n\
         <card id=\"4\">\n\
         <field><name>Text 1</name> : <value>capital of Japan</value></field>\n\
         <field><name>Text 2</name> : <value>Tokyo</value></field>\n\
         </card>\n\
         </new-cards-here>\n</body>\n</html>\n"
    ));
}

/// Test the page written by a sync reads back to the same cards.
#[test]
fn test_synced_wiki_reloads() {
    let mut deck = load_deck(DECK);
    let mut wiki = load_wiki(WIKI);
    SyncPlan::full().run(&mut deck, &mut wiki).unwrap();

    let reloaded = load_wiki(&wiki.encode());
    assert_eq!(reloaded.ids(), deck.ids());
    let expected: Vec<_> = deck.cards().iter().map(visible).collect();
    let actual: Vec<_> = reloaded.cards().iter().map(visible).collect();
    assert_eq!(actual, expected);
}

/// Test a second full sync finds nothing new to do.
#[test]
fn test_full_sync_settles() {
    let mut deck = load_deck(DECK);
    let mut wiki = load_wiki(WIKI);
    SyncPlan::full().run(&mut deck, &mut wiki).unwrap();
    let page = wiki.encode();

    let mut deck = load_deck(&deck.encode().unwrap());
    let mut wiki = load_wiki(&page);
    let report = SyncPlan::full().run(&mut deck, &mut wiki).unwrap();
    assert_eq!(report.deleted, 0);
    assert_eq!(report.added, 0);
    assert_eq!(wiki.encode(), page);
}

/// Test mismatched next ids abort before anything is updated.
#[test]
fn test_next_id_mismatch_aborts() {
    let mut deck = load_deck(DECK);
    let mut wiki = load_wiki(WIKI);
    wiki.delete_cards(&[3]);

    let err = SyncPlan::full().run(&mut deck, &mut wiki).unwrap_err();
    assert!(matches!(
        err,
        Error::NextIdMismatch {
            source_next: 4,
            destination_next: 3
        }
    ));
    assert_eq!(wiki.get_card(2).unwrap().field("Text 2"), Some("Lima"));
    assert_eq!(deck.ids().last(), Some(&None));
}

/// Test copying unmatched ided cards recovers a dropped card.
#[test]
fn test_copy_unmatched_recovers_card() {
    let deck = load_deck(DECK);
    let mut wiki = load_wiki(WIKI);
    wiki.delete_cards(&[3]);

    assert_eq!(copy_unmatched_ided_cards(&deck, &mut wiki).unwrap(), 1);
    assert_eq!(present_ids(&wiki), vec![1, 2, 7, 3]);
    assert_eq!(wiki.get_card(3), deck.get_card(3));
    assert!(wiki.contains(7));
}

/// Test ignoring ids renumbers an export into an empty page.
#[test]
fn test_ignore_ids_into_empty_wiki() {
    let mut deck = load_deck(DECK);
    let mut wiki = load_wiki(EMPTY_WIKI);
    let plan = SyncPlan {
        ignore_existing_ids: true,
        add_new: true,
        ..SyncPlan::default()
    };

    let report = plan.run(&mut deck, &mut wiki).unwrap();
    assert_eq!(report.added, 4);
    let expected: Vec<_> = (0..4).map(|i| Some(MIN_ID + i)).collect();
    assert_eq!(deck.ids(), expected);
    assert_eq!(wiki.cards(), deck.cards());
}

/// Test ignoring ids is refused when the page already has ided cards.
#[test]
fn test_ignore_ids_refused_for_populated_wiki() {
    let mut deck = load_deck(DECK);
    let mut wiki = load_wiki(WIKI);
    let plan = SyncPlan {
        ignore_existing_ids: true,
        add_new: true,
        ..SyncPlan::default()
    };
    assert!(matches!(
        plan.run(&mut deck, &mut wiki),
        Err(Error::DestinationHasIds(4))
    ));
    assert_eq!(deck.encode().unwrap(), DECK);
}

/// Test a new card written on the wiki flows into the export.
#[test]
fn test_wiki_to_deck_adds_new_card() {
    let page = "<html><body>\n\
        <card id=\"1\"><field><name>Text 1</name> : <value>a</value></field></card>\n\
        <card><field><name>Text 1</name> : <value>capital of Kenya</value></field>\n\
        <field><name>Text 2</name> : <value>Nairobi</value></field></card>\n\
        <new-cards-here></new-cards-here>\n</body></html>\n";
    let mut wiki = load_wiki(page);
    let mut deck = load_deck("Text 1\tText 2\tNotes\r\na\t\t1 : DO NOT MODIFY THIS LINE\r\n");

    let ids = mark_and_add_new_cards(&mut wiki, &mut deck).unwrap();
    assert_eq!(ids, vec![2]);
    assert!(wiki.encode().contains("<card id=\"2\"><field>"));
    assert_eq!(
        deck.encode().unwrap(),
        "Text 1\tText 2\tNotes\r\n\
         a\t\t1 : DO NOT MODIFY THIS LINE\r\n\
         capital of Kenya\tNairobi\t2 : DO NOT MODIFY THIS LINE\r\n"
    );
}

/// Test the four operations on their own, matching the usual order.
#[test]
fn test_operations_compose_by_hand() {
    let mut deck = load_deck(DECK);
    let mut wiki = load_wiki(WIKI);

    assert_eq!(delete_extra_cards(&deck, &mut wiki), 1);
    assert_eq!(deck.next_id().unwrap(), wiki.next_id().unwrap());
    assert_eq!(update(&deck, &mut wiki).unwrap(), 3);
    assert_eq!(mark_and_add_new_cards(&mut deck, &mut wiki).unwrap(), vec![4]);
    assert_eq!(wiki.cards(), deck.cards());
}

/// Test a page with two markers is rejected on load.
#[test]
fn test_two_markers_rejected() {
    let page = "<html><body><new-cards-here></new-cards-here>\
                <new-cards-here></new-cards-here></body></html>";
    let err = cardsync_core::WikiDocument::parse(page, &Default::default()).unwrap_err();
    assert!(matches!(err, Error::MarkerCount { found: 2, .. }));
}

/// Test a large batch of new cards gets consecutive ids.
#[test]
fn test_many_new_cards() {
    let mut deck = load_deck(&fixtures::deck_of_new_cards(50));
    let mut wiki = load_wiki(EMPTY_WIKI);
    let ids = mark_and_add_new_cards(&mut deck, &mut wiki).unwrap();
    assert_eq!(ids.len(), 50);
    assert!(ids.windows(2).all(|w| w[1] == w[0] + 1));
    assert_eq!(present_ids(&wiki), ids);
}
