//! A lenient HTML tree that reproduces its source.
//!
//! Nodes live in one arena owned by the [`Document`] and refer to each
//! other by [`NodeId`]. Every parsed node keeps its source text, so
//! untouched parts of a document serialize byte for byte. Elements whose
//! attributes change, and elements built in code, are written out from
//! their parts instead.

use std::borrow::Cow;

/// Index of a node in its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Attr {
    pub name: String,
    /// Entity-decoded value; `None` for a bare attribute.
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Element {
    /// Lowercased tag name.
    pub name: String,
    pub attrs: Vec<Attr>,
    /// Source text of the start tag, dropped once the attributes change.
    open_tag: Option<String>,
    /// End tag to write. `None` for void elements and for elements whose
    /// end tag was implied in the source.
    close_tag: Option<String>,
    self_closing: bool,
}

impl Element {
    /// A new element that writes out as `<name ...>...</name>`.
    pub fn new(name: &str, attrs: Vec<Attr>) -> Self {
        let close_tag = (!is_void(name)).then(|| format!("</{name}>"));
        Self {
            name: name.to_string(),
            attrs,
            open_tag: None,
            close_tag,
            self_closing: false,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .and_then(|a| a.value.as_deref())
    }

    pub fn set_attr(&mut self, name: &str, value: Option<String>) {
        match value {
            Some(value) => match self.attrs.iter_mut().find(|a| a.name.eq_ignore_ascii_case(name)) {
                Some(attr) => attr.value = Some(value),
                None => self.attrs.push(Attr {
                    name: name.to_string(),
                    value: Some(value),
                }),
            },
            None => self.attrs.retain(|a| !a.name.eq_ignore_ascii_case(name)),
        }
        self.open_tag = None;
    }

    /// Turn `<name/>` into `<name></name>` so it can hold children.
    fn open_up(&mut self) {
        if self.self_closing && !is_void(&self.name) {
            self.self_closing = false;
            self.open_tag = None;
            self.close_tag = Some(format!("</{}>", self.name));
        }
    }

    fn write_open_tag(&self, out: &mut String) {
        if let Some(raw) = &self.open_tag {
            out.push_str(raw);
            return;
        }
        out.push('<');
        out.push_str(&self.name);
        for attr in &self.attrs {
            out.push(' ');
            out.push_str(&attr.name);
            if let Some(value) = &attr.value {
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
        }
        if self.self_closing {
            out.push_str(" /");
        }
        out.push('>');
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeKind {
    Root,
    /// Text as written in the source, entities still encoded.
    Text(String),
    /// Comments, doctypes, stray end tags and raw-text element bodies.
    Raw(String),
    Element(Element),
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Document {
    nodes: Vec<Node>,
}

const ROOT: NodeId = NodeId(0);

impl Document {
    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn is_element(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|el| el.name == name)
    }

    /// Create a detached node.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        if let Some(el) = self.element_mut(parent) {
            el.open_up();
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn append_new(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let child = self.create(kind);
        self.append(parent, child);
        child
    }

    /// Unlink a node from its parent. The node stays in the arena.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    /// Elements named `name` under `from`, in document order, without
    /// looking inside a match.
    pub fn find_outermost(&self, from: NodeId, name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(from).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.is_element(id, name) {
                found.push(id);
            } else {
                stack.extend(self.children(id).iter().rev());
            }
        }
        found
    }

    /// First element named `name` under `from`, in document order.
    pub fn find_first(&self, from: NodeId, name: &str) -> Option<NodeId> {
        self.find_outermost(from, name).into_iter().next()
    }

    /// Decoded text under `id`, with each `<br>` read as a line break.
    ///
    /// Line breaks in the source are layout, not content: a whitespace
    /// run holding one reads as a single space, or as nothing next to a
    /// `<br>` or the edge of the element.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut pieces = Vec::new();
        self.collect_text(id, &mut pieces);

        let mut out = String::new();
        for (i, piece) in pieces.iter().enumerate() {
            match piece {
                Piece::Break => out.push('\n'),
                Piece::Text(raw) => {
                    let after_break = i == 0 || matches!(pieces[i - 1], Piece::Break);
                    let before_break = pieces.get(i + 1).map_or(true, |p| matches!(p, Piece::Break));
                    let folded = fold_source_breaks(raw, after_break, before_break);
                    out.push_str(&decode_entities(&folded));
                }
            }
        }
        out
    }

    fn collect_text<'a>(&'a self, id: NodeId, out: &mut Vec<Piece<'a>>) {
        for &child in self.children(id) {
            match self.kind(child) {
                NodeKind::Text(raw) => out.push(Piece::Text(raw)),
                NodeKind::Element(el) if el.name == "br" => out.push(Piece::Break),
                NodeKind::Element(_) => self.collect_text(child, out),
                NodeKind::Raw(_) | NodeKind::Root => {}
            }
        }
    }

    pub fn serialize(&self) -> String {
        let mut out = String::new();
        self.write_node(ROOT, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Root => self.write_children(id, out),
            NodeKind::Text(raw) | NodeKind::Raw(raw) => out.push_str(raw),
            NodeKind::Element(el) => {
                el.write_open_tag(out);
                self.write_children(id, out);
                if let Some(close) = &el.close_tag {
                    out.push_str(close);
                }
            }
        }
    }

    fn write_children(&self, id: NodeId, out: &mut String) {
        for &child in self.children(id) {
            self.write_node(child, out);
        }
    }

    /// Parse any HTML. Never fails: anything that does not look like a
    /// tag is kept as text.
    pub fn parse(src: &str) -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        };
        let mut stack = vec![ROOT];
        let bytes = src.as_bytes();
        let mut text_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] != b'<' {
                i += 1;
                continue;
            }
            let Some((token, end)) = lex_tag(src, i) else {
                i += 1;
                continue;
            };
            let parent = *stack.last().unwrap_or(&ROOT);
            if text_start < i {
                doc.append_new(parent, NodeKind::Text(src[text_start..i].to_string()));
            }
            i = end;

            match token {
                Token::Raw(raw) => {
                    doc.append_new(parent, NodeKind::Raw(raw.to_string()));
                }
                Token::Open(mut el) => {
                    let name = el.name.clone();
                    if el.self_closing || is_void(&name) {
                        el.close_tag = None;
                        doc.append_new(parent, NodeKind::Element(el));
                    } else if is_raw_text(&name) {
                        let (body_end, close_end) = find_raw_text_end(src, i, &name);
                        el.close_tag = Some(src[body_end..close_end].to_string());
                        let node = doc.append_new(parent, NodeKind::Element(el));
                        if i < body_end {
                            doc.append_new(node, NodeKind::Raw(src[i..body_end].to_string()));
                        }
                        i = close_end;
                    } else {
                        el.close_tag = None;
                        let node = doc.append_new(parent, NodeKind::Element(el));
                        stack.push(node);
                    }
                }
                Token::Close { name, raw } => {
                    let open = stack
                        .iter()
                        .rposition(|&id| id != ROOT && doc.is_element(id, &name));
                    match open {
                        Some(pos) => {
                            let node = stack[pos];
                            if let Some(el) = doc.element_mut(node) {
                                el.close_tag = Some(raw.to_string());
                            }
                            stack.truncate(pos);
                        }
                        None => {
                            doc.append_new(parent, NodeKind::Raw(raw.to_string()));
                        }
                    }
                }
            }
            text_start = i;
        }

        if text_start < bytes.len() {
            let parent = *stack.last().unwrap_or(&ROOT);
            doc.append_new(parent, NodeKind::Text(src[text_start..].to_string()));
        }
        doc
    }
}

enum Piece<'a> {
    Text(&'a str),
    Break,
}

/// Collapse whitespace runs that contain a raw newline. A run at the
/// start (after a break) or end (before a break) is dropped.
fn fold_source_breaks(raw: &str, after_break: bool, before_break: bool) -> Cow<'_, str> {
    if !raw.contains('\n') {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find(|c: char| c.is_ascii_whitespace()) {
        let len = rest[start..]
            .find(|c: char| !c.is_ascii_whitespace())
            .unwrap_or(rest.len() - start);
        let run = &rest[start..start + len];
        out.push_str(&rest[..start]);
        if run.contains('\n') {
            let at_start = out.is_empty() && after_break;
            let at_end = start + len == rest.len() && before_break;
            if !at_start && !at_end {
                out.push(' ');
            }
        } else {
            out.push_str(run);
        }
        rest = &rest[start + len..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

enum Token<'a> {
    Raw(&'a str),
    Open(Element),
    Close { name: String, raw: &'a str },
}

/// Lex the markup starting at the `<` at `start`. Returns the token and
/// the offset just past it, or `None` if this `<` starts no tag.
fn lex_tag(src: &str, start: usize) -> Option<(Token<'_>, usize)> {
    let rest = &src[start..];
    let bytes = rest.as_bytes();

    if rest.starts_with("<!--") {
        let end = rest[4..].find("-->").map_or(rest.len(), |p| p + 4 + 3);
        return Some((Token::Raw(&rest[..end]), start + end));
    }
    if rest.starts_with("<!") || rest.starts_with("<?") {
        let end = rest.find('>').map_or(rest.len(), |p| p + 1);
        return Some((Token::Raw(&rest[..end]), start + end));
    }
    if rest.starts_with("</") {
        if !bytes.get(2).is_some_and(u8::is_ascii_alphabetic) {
            return None;
        }
        let name_end = 2 + tag_name_len(&bytes[2..]);
        let end = rest.find('>')? + 1;
        let name = rest[2..name_end].to_ascii_lowercase();
        return Some((Token::Close { name, raw: &rest[..end] }, start + end));
    }
    if !bytes.get(1).is_some_and(u8::is_ascii_alphabetic) {
        return None;
    }

    let name_end = 1 + tag_name_len(&bytes[1..]);
    let name = rest[1..name_end].to_ascii_lowercase();
    let mut attrs = Vec::new();
    let mut self_closing = false;
    let mut pos = name_end;

    loop {
        while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
            pos += 1;
        }
        match bytes.get(pos)? {
            b'>' => {
                pos += 1;
                break;
            }
            b'/' if bytes.get(pos + 1) == Some(&b'>') => {
                self_closing = true;
                pos += 2;
                break;
            }
            b'/' => {
                pos += 1;
                continue;
            }
            _ => {}
        }

        let attr_start = pos;
        while bytes
            .get(pos)
            .is_some_and(|b| !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/'))
        {
            pos += 1;
        }
        if pos == attr_start {
            // A lone '=' or similar junk.
            pos += 1;
            continue;
        }
        let attr_name = rest[attr_start..pos].to_ascii_lowercase();

        let mut after = pos;
        while bytes.get(after).is_some_and(u8::is_ascii_whitespace) {
            after += 1;
        }
        let value = if bytes.get(after) == Some(&b'=') {
            pos = after + 1;
            while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
                pos += 1;
            }
            let quote = *bytes.get(pos)?;
            if quote == b'"' || quote == b'\'' {
                let close = rest[pos + 1..].find(quote as char)? + pos + 1;
                let value = decode_entities(&rest[pos + 1..close]).into_owned();
                pos = close + 1;
                Some(value)
            } else {
                let value_start = pos;
                while bytes
                    .get(pos)
                    .is_some_and(|b| !b.is_ascii_whitespace() && *b != b'>')
                {
                    pos += 1;
                }
                Some(decode_entities(&rest[value_start..pos]).into_owned())
            }
        } else {
            None
        };
        attrs.push(Attr {
            name: attr_name,
            value,
        });
    }

    let element = Element {
        name,
        attrs,
        open_tag: Some(rest[..pos].to_string()),
        close_tag: None,
        self_closing,
    };
    Some((Token::Open(element), start + pos))
}

fn tag_name_len(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.'))
        .count()
}

/// Find the end tag of a raw-text element whose body starts at `from`.
/// Returns where the body ends and where the end tag ends.
fn find_raw_text_end(src: &str, from: usize, name: &str) -> (usize, usize) {
    let lowered = src[from..].to_ascii_lowercase();
    let needle = format!("</{name}");
    match lowered.find(&needle) {
        Some(p) => {
            let body_end = from + p;
            let close_end = src[body_end..].find('>').map_or(src.len(), |q| body_end + q + 1);
            (body_end, close_end)
        }
        None => (src.len(), src.len()),
    }
}

fn is_void(name: &str) -> bool {
    matches!(
        name,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "param" | "source" | "track" | "wbr"
    )
}

fn is_raw_text(name: &str) -> bool {
    matches!(name, "script" | "style" | "textarea" | "title")
}

/// Escape text content.
pub(crate) fn escape_text(s: &str) -> Cow<'_, str> {
    if !s.contains(&['&', '<', '>'][..]) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;"))
}

fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(&['&', '"'][..]) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.replace('&', "&amp;").replace('"', "&quot;"))
}

/// Decode named and numeric character references. Unknown references
/// are left alone.
pub(crate) fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let name = &rest[1..semi];
            decode_reference(name).map(|ch| (ch, semi + 1))
        });
        match decoded {
            Some((ch, len)) => {
                out.push(ch);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}
