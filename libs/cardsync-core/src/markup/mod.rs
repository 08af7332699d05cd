//! Cards embedded in an HTML wiki page.
//!
//! # Format
//! ```html
//! <card id="7">
//! <field><name>Text 1</name> : <value>front</value></field>
//! <field><name>Text 2</name> : <value>two<br>lines</value></field>
//! </card>
//! <new-cards-here></new-cards-here>
//! ```
//!
//! Everything outside card elements is left exactly as written. New
//! cards go at the end of the single marker element. Inside a value,
//! `<br>` is a line break and source line breaks are read as HTML reads
//! them, so hand-indented values decode to their visible text.

mod dom;

use crate::config::MarkupSettings;
use crate::error::{Error, Result};
use crate::store::{CardStore, IdAllocator};
use crate::types::{Card, CardId};
use dom::{Attr, Document, Element, NodeId, NodeKind};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{Read, Write};
use tracing::debug;

const EMPTY_PAGE: &str = "<!DOCTYPE html>\n<html>\n<head></head>\n<body>\n\
    <new-cards-here>\n</new-cards-here>\n</body>\n</html>\n";

/// A wiki page and the cards in it.
#[derive(Debug, Clone)]
pub struct WikiDocument {
    dom: Document,
    /// Decoded card for each attached card element.
    cards: HashMap<NodeId, Card>,
    settings: MarkupSettings,
}

impl Default for WikiDocument {
    fn default() -> Self {
        Self::new(&MarkupSettings::default())
    }
}

impl WikiDocument {
    /// A minimal page holding only the new-cards marker.
    pub fn new(settings: &MarkupSettings) -> Self {
        let mut settings = settings.clone();
        let page = EMPTY_PAGE.replace("new-cards-here", &settings.marker_tag);
        settings.card_tag.make_ascii_lowercase();
        settings.marker_tag.make_ascii_lowercase();
        Self {
            dom: Document::parse(&page),
            cards: HashMap::new(),
            settings,
        }
    }

    pub fn load_from<R: Read>(mut reader: R, settings: &MarkupSettings) -> Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::parse(&content, settings)
    }

    pub fn parse(content: &str, settings: &MarkupSettings) -> Result<Self> {
        let mut settings = settings.clone();
        settings.card_tag.make_ascii_lowercase();
        settings.marker_tag.make_ascii_lowercase();
        let mut doc = Self {
            dom: Document::parse(content),
            cards: HashMap::new(),
            settings,
        };

        let markers = doc.markers();
        if markers.len() > 1 {
            return Err(Error::MarkerCount {
                tag: doc.settings.marker_tag.clone(),
                found: markers.len(),
            });
        }

        let mut seen = HashSet::new();
        for node in doc.dom.find_outermost(doc.dom.root(), &doc.settings.card_tag) {
            let card = doc.decode_card(node)?;
            if let Some(id) = card.id() {
                if !seen.insert(id) {
                    return Err(Error::DuplicateStoredId(id));
                }
            }
            doc.cards.insert(node, card);
        }
        debug!(cards = doc.cards.len(), "loaded wiki document");
        Ok(doc)
    }

    pub fn encode(&self) -> String {
        self.dom.serialize()
    }

    pub fn save_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(self.encode().as_bytes())?;
        writer.flush()?;
        debug!(cards = self.cards.len(), "saved wiki document");
        Ok(())
    }

    fn markers(&self) -> Vec<NodeId> {
        self.dom
            .find_outermost(self.dom.root(), &self.settings.marker_tag)
    }

    /// Card elements in document order.
    fn card_nodes(&self) -> Vec<NodeId> {
        self.dom
            .find_outermost(self.dom.root(), &self.settings.card_tag)
            .into_iter()
            .filter(|node| self.cards.contains_key(node))
            .collect()
    }

    fn node_for(&self, id: CardId) -> Option<NodeId> {
        self.card_nodes()
            .into_iter()
            .find(|node| self.cards.get(node).and_then(Card::id) == Some(id))
    }

    fn decode_card(&self, node: NodeId) -> Result<Card> {
        let id = match self.dom.element(node).and_then(|el| el.attr("id")).map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<CardId>()
                    .map_err(|_| Error::InvalidId(raw.to_string()))?,
            ),
        };

        let mut fields = BTreeMap::new();
        for field in self.dom.find_outermost(node, "field") {
            let name = self
                .dom
                .find_first(field, "name")
                .ok_or(Error::MissingFieldPart("name"))?;
            let value = self
                .dom
                .find_first(field, "value")
                .ok_or(Error::MissingFieldPart("value"))?;
            fields.insert(
                self.dom.text_content(name).trim().to_string(),
                self.dom.text_content(value),
            );
        }
        Ok(Card::new(fields, id))
    }

    /// Replace the children of a card element with the card's fields.
    fn render_fields(&mut self, node: NodeId, card: &Card) {
        self.dom.clear_children(node);
        for name in self.settings.emitted_fields().map(str::to_string).collect::<Vec<_>>() {
            let Some(content) = card.field(&name) else {
                continue;
            };
            if content.trim().is_empty() {
                continue;
            }
            self.dom.append_new(node, NodeKind::Text("\n".to_string()));
            let field = self.append_element(node, "field");
            let name_el = self.append_element(field, "name");
            self.dom
                .append_new(name_el, NodeKind::Text(dom::escape_text(&name).into_owned()));
            self.dom.append_new(field, NodeKind::Text(" : ".to_string()));
            let value_el = self.append_element(field, "value");
            for (i, line) in content.split('\n').enumerate() {
                if i > 0 {
                    self.append_element(value_el, "br");
                }
                if !line.is_empty() {
                    self.dom
                        .append_new(value_el, NodeKind::Text(dom::escape_text(line).into_owned()));
                }
            }
        }
        self.dom.append_new(node, NodeKind::Text("\n".to_string()));

        for (name, _) in card.iter_fields() {
            if !self.settings.emitted_fields().any(|n| n == name) {
                debug!(field = name, "field not rendered to wiki");
            }
        }
    }

    fn append_element(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.dom
            .append_new(parent, NodeKind::Element(Element::new(name, Vec::new())))
    }

    fn set_card_id(&mut self, node: NodeId, id: Option<CardId>) {
        if let Some(el) = self.dom.element_mut(node) {
            el.set_attr("id", id.map(|id| id.to_string()));
        }
        if let Some(card) = self.cards.get_mut(&node) {
            *card = card.with_id(id);
        }
    }
}

impl CardStore for WikiDocument {
    fn ids(&self) -> Vec<Option<CardId>> {
        self.card_nodes()
            .iter()
            .map(|node| self.cards.get(node).and_then(Card::id))
            .collect()
    }

    fn get_card(&self, id: CardId) -> Option<Card> {
        self.node_for(id).and_then(|node| self.cards.get(&node).cloned())
    }

    fn cards(&self) -> Vec<Card> {
        self.card_nodes()
            .iter()
            .filter_map(|node| self.cards.get(node).cloned())
            .collect()
    }

    fn add_card(&mut self, card: Card) -> Result<()> {
        if let Some(id) = card.id() {
            if self.contains(id) {
                return Err(Error::DuplicateId(id));
            }
        }
        let markers = self.markers();
        let &[marker] = markers.as_slice() else {
            return Err(Error::MarkerCount {
                tag: self.settings.marker_tag.clone(),
                found: markers.len(),
            });
        };

        let attrs = card
            .id()
            .map(|id| Attr {
                name: "id".to_string(),
                value: Some(id.to_string()),
            })
            .into_iter()
            .collect();
        let element = Element::new(&self.settings.card_tag, attrs);
        let node = self.dom.append_new(marker, NodeKind::Element(element));
        self.render_fields(node, &card);
        self.dom.append_new(marker, NodeKind::Text("\n".to_string()));
        self.cards.insert(node, card);
        Ok(())
    }

    fn update_card(&mut self, card: Card) -> Result<()> {
        let id = card.id().ok_or(Error::MissingId)?;
        let node = self.node_for(id).ok_or(Error::CardNotFound(id))?;
        if self.cards.get(&node) == Some(&card) {
            return Ok(());
        }
        self.render_fields(node, &card);
        self.cards.insert(node, card);
        Ok(())
    }

    fn delete_cards(&mut self, ids: &[CardId]) -> usize {
        let doomed: HashSet<CardId> = ids.iter().copied().collect();
        let mut deleted = 0;
        for node in self.card_nodes() {
            let hit = self
                .cards
                .get(&node)
                .and_then(Card::id)
                .is_some_and(|id| doomed.contains(&id));
            if hit {
                self.dom.detach(node);
                self.cards.remove(&node);
                deleted += 1;
            }
        }
        deleted
    }

    fn mark_blank_ids(&mut self) -> Result<Vec<CardId>> {
        let blanks: Vec<NodeId> = self
            .card_nodes()
            .into_iter()
            .filter(|node| self.cards.get(node).is_some_and(|c| c.id().is_none()))
            .collect();
        let new_ids = IdAllocator::after(self.ids()).allocate_many(blanks.len())?;
        for (node, id) in blanks.into_iter().zip(&new_ids) {
            self.set_card_id(node, Some(*id));
        }
        Ok(new_ids)
    }

    fn zap_ids(&mut self) {
        for node in self.card_nodes() {
            let has_id = self.cards.get(&node).is_some_and(|c| c.id().is_some());
            let has_attr = self.dom.element(node).is_some_and(|el| el.attr("id").is_some());
            if has_id || has_attr {
                self.set_card_id(node, None);
            }
        }
    }
}
