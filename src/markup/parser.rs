//! Wikitext parser
//!
//! Builds a small document tree out of raw wikitext. Only the constructs the
//! extraction pass cares about become nodes: text, sections, article links, the
//! link kinds that are skipped (images, categories, other namespaces), tables and
//! raw tags. Templates, comments and emphasis markers are dropped while parsing.
//!
//! Parsing is total: malformed markup degrades to literal text.

/// Namespace prefixes (lower case) that make a `[[...]]` link a namespace link
const NAMESPACES: &[&str] = &[
    "wikipedia", "wp", "project", "help", "template", "portal", "special", "talk", "user",
    "user talk", "draft", "module", "mediawiki", "media", "file talk", "category talk",
    "template talk", "wikipedia talk", "portal talk", "help talk", "draft talk", "module talk",
    "wikt", "wiktionary", "commons", "wikisource", "wikiquote", "wikibooks", "wikinews",
    "wikivoyage", "wikiversity", "wikidata", "meta", "species", "mw", "d", "s", "q", "b", "n",
    "v", "w", "simple",
];

/// Tags whose markers are dropped but whose content is kept as text
const TRANSPARENT_TAGS: &[&str] = &[
    "b", "i", "u", "s", "em", "strong", "span", "small", "big", "sub", "sup", "font", "center",
    "div", "p", "abbr", "cite", "code", "tt", "blockquote", "poem", "q", "del", "ins", "mark",
];

/// A parsed wikitext document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub children: Vec<Node>,
}

/// A node of the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Section(Section),
    ArticleLink(ArticleLink),
    ImageLink(String),
    CategoryLink(String),
    NamespaceLink(String),
    Table(String),
    Tag(Tag),
}

/// A heading and everything up to the next heading of the same or higher rank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub level: usize,
    pub heading: String,
    pub children: Vec<Node>,
}

/// `[[target]]` or `[[target|label]]`; `children` holds the parsed label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLink {
    pub target: String,
    pub children: Vec<Node>,
}

/// An XML-like extension or HTML tag with its raw body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub body: String,
}

/// Parses raw wikitext into a [`Document`]
pub fn parse(raw: &str) -> Document {
    let mut builder = SectionBuilder::default();
    for item in Scanner::new(raw, true).items() {
        match item {
            Item::Heading { level, text } => builder.open(level, text),
            Item::Node(node) => builder.push(node),
        }
    }
    Document {
        children: builder.finish(),
    }
}

/// Parses inline wikitext (no headings or tables), as found in link labels
pub fn parse_inline(raw: &str) -> Vec<Node> {
    Scanner::new(raw, false)
        .items()
        .into_iter()
        .filter_map(|item| match item {
            Item::Node(node) => Some(node),
            Item::Heading { .. } => None,
        })
        .collect()
}

/// Concatenated text of `nodes`, descending into link labels
///
/// A link without a label contributes its target.
pub fn plain_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::ArticleLink(link) if link.children.is_empty() => out.push_str(&link.target),
            Node::ArticleLink(link) => out.push_str(&plain_text(&link.children)),
            _ => {}
        }
    }
    out
}

enum Item {
    Heading { level: usize, text: String },
    Node(Node),
}

/// What a markup construct at the cursor turned into
enum Markup {
    /// Consumed and dropped
    Skip,
    /// Consumed, contributes literal text
    Text(String),
    Node(Node),
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    block: bool,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str, block: bool) -> Self {
        Self { src, pos: 0, block }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.src.as_bytes()[self.pos - 1] == b'\n'
    }

    fn items(mut self) -> Vec<Item> {
        let mut items = Vec::new();
        let mut text = String::new();

        while self.pos < self.src.len() {
            let rest = self.rest();

            if self.block && self.at_line_start() {
                if let Some((level, heading, len)) = heading_at(rest) {
                    flush_text(&mut text, &mut items);
                    items.push(Item::Heading {
                        level,
                        text: plain_text(&parse_inline(heading)),
                    });
                    self.pos += len;
                    continue;
                }
                if let Some(len) = table_at(rest) {
                    flush_text(&mut text, &mut items);
                    items.push(Item::Node(Node::Table(rest[..len].to_string())));
                    self.pos += len;
                    continue;
                }
            }

            if let Some((markup, len)) = markup_at(rest) {
                match markup {
                    Markup::Skip => {}
                    Markup::Text(literal) => text.push_str(&literal),
                    Markup::Node(node) => {
                        flush_text(&mut text, &mut items);
                        items.push(Item::Node(node));
                    }
                }
                self.pos += len;
                continue;
            }

            match rest.chars().next() {
                Some(ch) => {
                    text.push(ch);
                    self.pos += ch.len_utf8();
                }
                None => break,
            }
        }

        flush_text(&mut text, &mut items);
        items
    }
}

fn flush_text(text: &mut String, items: &mut Vec<Item>) {
    if !text.is_empty() {
        items.push(Item::Node(Node::Text(std::mem::take(text))));
    }
}

/// Nests sections by heading level as items arrive
#[derive(Default)]
struct SectionBuilder {
    root: Vec<Node>,
    open: Vec<Section>,
}

impl SectionBuilder {
    fn push(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(section) => section.children.push(node),
            None => self.root.push(node),
        }
    }

    fn open(&mut self, level: usize, heading: String) {
        while self.open.last().is_some_and(|s| s.level >= level) {
            self.close_innermost();
        }
        self.open.push(Section {
            level,
            heading,
            children: Vec::new(),
        });
    }

    fn close_innermost(&mut self) {
        if let Some(section) = self.open.pop() {
            self.push(Node::Section(section));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.open.is_empty() {
            self.close_innermost();
        }
        self.root
    }
}

/// `== Heading ==` at the start of `rest`: (level, inner text, line length)
fn heading_at(rest: &str) -> Option<(usize, &str, usize)> {
    let line_len = rest.find('\n').unwrap_or(rest.len());
    let line = rest[..line_len].trim_end();
    if !line.starts_with('=') {
        return None;
    }

    let leading = line.bytes().take_while(|b| *b == b'=').count();
    let trailing = line.bytes().rev().take_while(|b| *b == b'=').count();
    let level = leading.min(trailing).min(6);
    if level == 0 || line.len() <= 2 * level {
        return None;
    }

    let inner = line[level..line.len() - level].trim();
    Some((level, inner, line_len))
}

/// `{| ... |}` starting on this line: length including the closing marker
fn table_at(rest: &str) -> Option<usize> {
    let indent = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    if !rest[indent..].starts_with("{|") {
        return None;
    }
    Some(balanced_len(rest, indent, "{|", "|}").unwrap_or(rest.len()))
}

/// Length of `rest` up to and including the `close` that balances the `open` at `start`
fn balanced_len(rest: &str, start: usize, open: &str, close: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut depth = 0usize;
    let mut i = start;
    while i < bytes.len() {
        if bytes[i..].starts_with(open.as_bytes()) {
            depth += 1;
            i += open.len();
        } else if bytes[i..].starts_with(close.as_bytes()) {
            depth -= 1;
            i += close.len();
            if depth == 0 {
                return Some(i);
            }
        } else {
            i += 1;
        }
    }
    None
}

fn markup_at(rest: &str) -> Option<(Markup, usize)> {
    if rest.starts_with("<!--") {
        let len = rest.find("-->").map(|i| i + 3).unwrap_or(rest.len());
        return Some((Markup::Skip, len));
    }
    if rest.starts_with("[[") {
        return link_at(rest);
    }
    if rest.starts_with("{{") {
        return balanced_len(rest, 0, "{{", "}}").map(|len| (Markup::Skip, len));
    }
    if rest.starts_with('[') {
        return external_link_at(rest);
    }
    if rest.starts_with('<') {
        return tag_at(rest);
    }
    if rest.starts_with("''") {
        let len = rest.bytes().take_while(|b| *b == b'\'').count();
        return Some((Markup::Skip, len));
    }
    None
}

fn link_at(rest: &str) -> Option<(Markup, usize)> {
    let end = balanced_len(rest, 0, "[[", "]]")?;
    let inner = &rest[2..end - 2];
    if inner.contains('\n') && !inner.contains('|') {
        return None;
    }

    let (raw_target, label) = match inner.split_once('|') {
        Some((target, label)) => (target, Some(label)),
        None => (inner, None),
    };
    let target = raw_target.trim();
    if target.is_empty() {
        return None;
    }

    let explicit_colon = target.starts_with(':');
    let target = target.trim_start_matches(':').trim();
    let title = target.replace('_', " ");

    if let Some((prefix, _)) = target.split_once(':') {
        let namespace = prefix.trim().replace('_', " ").to_lowercase();
        let node = match namespace.as_str() {
            "file" | "image" if !explicit_colon => Some(Node::ImageLink(target.to_string())),
            "category" if !explicit_colon => Some(Node::CategoryLink(target.to_string())),
            "file" | "image" | "category" => Some(Node::NamespaceLink(target.to_string())),
            ns if NAMESPACES.contains(&ns) || is_language_prefix(prefix.trim()) => {
                Some(Node::NamespaceLink(target.to_string()))
            }
            _ => None,
        };
        if let Some(node) = node {
            return Some((Markup::Node(node), end));
        }
    }

    let trail_len: usize = rest[end..]
        .chars()
        .take_while(|c| c.is_alphabetic())
        .map(char::len_utf8)
        .sum();
    let trail = &rest[end..end + trail_len];

    let mut children = match label {
        Some(label) => parse_inline(label),
        None if !trail.is_empty() => vec![Node::Text(title.clone())],
        None => Vec::new(),
    };
    if !trail.is_empty() {
        children.push(Node::Text(trail.to_string()));
    }

    let link = ArticleLink {
        target: title,
        children,
    };
    Some((Markup::Node(Node::ArticleLink(link)), end + trail_len))
}

/// Interlanguage prefixes such as `fr`, `de`, `zh-yue`
fn is_language_prefix(prefix: &str) -> bool {
    let well_formed = prefix
        .split('-')
        .all(|part| (2..=8).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_lowercase()));
    well_formed && (prefix.len() <= 3 || prefix.contains('-'))
}

/// `[http://example.com label]`: only the label survives as text
fn external_link_at(rest: &str) -> Option<(Markup, usize)> {
    let inner_start = 1;
    let url_part = &rest[inner_start..];
    let is_url = ["http://", "https://", "//", "ftp://", "mailto:"]
        .iter()
        .any(|scheme| url_part.starts_with(scheme));
    if !is_url {
        return None;
    }

    let close = rest.find(']')?;
    if rest[..close].contains('\n') {
        return None;
    }
    let inner = &rest[inner_start..close];
    let label = inner
        .split_once(' ')
        .map(|(_, label)| plain_text(&parse_inline(label.trim())))
        .unwrap_or_default();
    Some((Markup::Text(label), close + 1))
}

fn tag_at(rest: &str) -> Option<(Markup, usize)> {
    let after = &rest[1..];
    let closing = after.starts_with('/');
    let name_start = if closing { 1 } else { 0 };
    let name: String = after[name_start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    // `<y2+z>` is text, not a tag named "y2"
    let after_name = &after[name_start + name.len()..];
    if !after_name.starts_with(|c: char| c.is_whitespace() || c == '/' || c == '>') {
        return None;
    }
    let name = name.to_ascii_lowercase();

    let line_end = rest.find('\n').unwrap_or(rest.len());
    let gt = rest[..line_end].find('>')?;
    let open_len = gt + 1;

    if closing || TRANSPARENT_TAGS.contains(&name.as_str()) {
        return Some((Markup::Skip, open_len));
    }
    if name == "br" {
        return Some((Markup::Text("\n".to_string()), open_len));
    }

    if rest[..gt].ends_with('/') {
        let tag = Tag {
            name,
            body: String::new(),
        };
        return Some((Markup::Node(Node::Tag(tag)), open_len));
    }

    let (body, len) = match find_closing_tag(&rest[open_len..], &name) {
        Some(offset) => {
            let body_end = open_len + offset;
            let end = rest[body_end..]
                .find('>')
                .map(|i| body_end + i + 1)
                .unwrap_or(rest.len());
            (rest[open_len..body_end].to_string(), end)
        }
        None => (String::new(), open_len),
    };

    Some((Markup::Node(Node::Tag(Tag { name, body })), len))
}

/// Offset of the first `</name` in `haystack`, ignoring ASCII case
fn find_closing_tag(haystack: &str, name: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(i) = haystack[from..].find("</") {
        let at = from + i;
        let candidate = &haystack.as_bytes()[at + 2..];
        if candidate.len() >= name.len()
            && candidate[..name.len()].eq_ignore_ascii_case(name.as_bytes())
        {
            return Some(at);
        }
        from = at + 2;
    }
    None
}
