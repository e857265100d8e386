//! XML response normalization
//!
//! Responses are parsed into a generic [`XmlElement`] tree and then
//! normalized into a [`Document`]:
//!
//! - the root tag becomes the single top-level key;
//! - an element's own attributes sit under `attribs`;
//! - a child tag that occurs once is nested as an [`Element`];
//! - a child tag that repeats collapses into the list of the members'
//!   attribute maps. Nested children of repeated elements are dropped.
//!
//! Text content is ignored; the API carries everything in attributes.

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Error, Result};

/// Attribute name to value
pub type Attributes = BTreeMap<String, String>;

/// Key under which an element's own attributes are exposed
pub const ATTRIBS: &str = "attribs";

/// Generic parsed XML element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| Error::Parse(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Parse(e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }
}

/// True when the body starts with an XML declaration
pub fn looks_like_xml(body: &str) -> bool {
    body.strip_prefix("<?xml")
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_whitespace)
}

/// Parse an XML document into its root element
pub fn parse_document(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::Parse(format!("at byte {}: {e}", reader.error_position())))?;

        match event {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(Error::Parse("content after the root element".into()));
                }
                stack.push(XmlElement::from_start(&start)?);
            }
            Event::Empty(start) => {
                if root.is_some() {
                    return Err(Error::Parse("content after the root element".into()));
                }
                let element = XmlElement::from_start(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::Parse("unexpected closing tag".into()))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::Parse(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| Error::Parse("document has no root element".into()))
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

/// A normalized element: its attributes plus its children keyed by tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub attribs: Attributes,
    pub children: BTreeMap<String, Child>,
}

/// Normalized child value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    /// The tag occurred once under its parent
    Single(Element),
    /// The tag repeated; only the members' attributes survive
    Repeated(Vec<Attributes>),
}

impl Element {
    /// Attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attribs.get(name).map(String::as_str)
    }

    /// Child value by tag
    pub fn child(&self, name: &str) -> Option<&Child> {
        self.children.get(name)
    }

    /// Attribute maps of every `name` child, whether it occurred once or repeated
    pub fn entries(&self, name: &str) -> Vec<&Attributes> {
        match self.children.get(name) {
            Some(Child::Single(element)) => vec![&element.attribs],
            Some(Child::Repeated(list)) => list.iter().collect(),
            None => Vec::new(),
        }
    }
}

/// A normalized response document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: String,
    element: Element,
}

impl Document {
    /// Tag name of the root element
    pub fn root(&self) -> &str {
        &self.root
    }

    /// The normalized root element
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// The root element if its tag is `name`
    pub fn get(&self, name: &str) -> Option<&Element> {
        (self.root == name).then_some(&self.element)
    }
}

/// Normalize a parsed tree
pub fn normalize(root: &XmlElement) -> Document {
    Document {
        root: root.name.clone(),
        element: normalize_element(root),
    }
}

/// Parse and normalize in one step
pub fn normalize_str(xml: &str) -> Result<Document> {
    parse_document(xml).map(|root| normalize(&root))
}

fn normalize_element(element: &XmlElement) -> Element {
    let mut groups: BTreeMap<&str, Vec<&XmlElement>> = BTreeMap::new();
    for child in &element.children {
        groups.entry(child.name.as_str()).or_default().push(child);
    }

    let children = groups
        .into_iter()
        .map(|(name, members)| {
            let value = match members.as_slice() {
                [single] => Child::Single(normalize_element(single)),
                many => Child::Repeated(many.iter().map(|m| attributes(m)).collect()),
            };
            (name.to_string(), value)
        })
        .collect();

    Element {
        attribs: attributes(element),
        children,
    }
}

fn attributes(element: &XmlElement) -> Attributes {
    element.attributes.iter().cloned().collect()
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let with_attribs = !self.attribs.is_empty();
        let mut map = serializer.serialize_map(Some(self.children.len() + usize::from(with_attribs)))?;
        if with_attribs {
            map.serialize_entry(ATTRIBS, &self.attribs)?;
        }
        for (name, child) in &self.children {
            map.serialize_entry(name, child)?;
        }
        map.end()
    }
}

impl Serialize for Child {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Child::Single(element) => element.serialize(serializer),
            Child::Repeated(list) => list.serialize(serializer),
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.root, &self.element)?;
        map.end()
    }
}
