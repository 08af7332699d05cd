//! Sample files in both store formats.

/// An export with two header lines, three ided cards and one new card.
///
/// Written the way the deck encoder writes, so it round-trips exactly.
pub const DECK: &str = "*\tCard Layout: Text 1, Text 2\r\n\
    *\tCard Count: 4\r\n\
    Text 1\tText 2\tNotes\r\n\
    capital of France\tParis\t1 : DO NOT MODIFY THIS LINE\r\n\
    capital of Peru\t\"Lima\r\n(on the coast)\"\t\"2 : DO NOT MODIFY THIS LINE\r\nseen twice\"\r\n\
    capital of Chile\tSantiago\t3 : DO NOT MODIFY THIS LINE\r\n\
    capital of Japan\tTokyo\t\r\n";

/// A wiki page holding the ided cards of [`DECK`], one of them out of
/// date, plus one the deck no longer has.
pub const WIKI: &str = "<!DOCTYPE html>\n<html>\n<head><title>Capitals</title></head>\n<body>\n\
    <h1>Capitals</h1>\n\
    <p>Cards below are kept in step with the app.</p>\n\
    <card id=\"1\">\n\
    <field><name>Text 1</name> : <value>capital of France</value></field>\n\
    <field><name>Text 2</name> : <value>Paris</value></field>\n\
    </card>\n\
    <card id=\"2\">\n\
    <field><name>Text 1</name> : <value>capital of Peru</value></field>\n\
    <field><name>Text 2</name> : <value>Lima</value></field>\n\
    </card>\n\
    <card id=\"3\">\n\
    <field><name>Text 1</name> : <value>capital of Chile</value></field>\n\
    <field><name>Text 2</name> : <value>Santiago</value></field>\n\
    </card>\n\
    <card id=\"7\">\n\
    <field><name>Text 1</name> : <value>capital of Atlantis</value></field>\n\
    </card>\n\
    <new-cards-here>\n</new-cards-here>\n\
    </body>\n</html>\n";

/// A wiki page with no cards and a marker.
pub const EMPTY_WIKI: &str = "<html><body>\n\
    <new-cards-here></new-cards-here>\n\
    </body></html>\n";

/// A deck with only a field name line.
pub const EMPTY_DECK: &str = "Text 1\tText 2\tNotes\r\n";

/// Build an export body with `count` new cards.
pub fn deck_of_new_cards(count: usize) -> String {
    let mut out = String::from("Text 1\tText 2\tNotes\r\n");
    let records: Vec<String> = (0..count)
        .map(|i| format!("question {}\tanswer {}\t", i + 1, i + 1))
        .collect();
    out.push_str(&records.join("\r\n"));
    out
}
