use roxmltree::{Document, Node, NodeType};
use xp_core::{ConvertError, SourceLocation, SourceSpan};

#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub root: XmlElementNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElementNode),
    Text(XmlTextNode),
    Comment(XmlCommentNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlAttribute {
    pub name: String,
    pub namespace: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlNamespaceDecl {
    pub prefix: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElementNode {
    pub name: String,
    pub namespace: Option<String>,
    /// Document order is preserved; tag attribute maps depend on it.
    pub attributes: Vec<XmlAttribute>,
    pub namespaces: Vec<XmlNamespaceDecl>,
    pub children: Vec<XmlNode>,
    pub location: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlTextNode {
    pub value: String,
    pub location: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlCommentNode {
    pub value: String,
    pub location: SourceSpan,
}

impl XmlElementNode {
    /// Looks up a non-namespaced attribute by exact local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.namespace.is_none() && attribute.name == name)
            .map(|attribute| attribute.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn element_children(&self) -> impl Iterator<Item = &XmlElementNode> {
        self.children.iter().filter_map(|entry| match entry {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn has_element_children(&self) -> bool {
        self.element_children().next().is_some()
    }

    /// Concatenated text of every descendant text node, comments excluded.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &XmlElementNode, out: &mut String) {
    for child in &node.children {
        match child {
            XmlNode::Text(text) => out.push_str(&text.value),
            XmlNode::Element(element) => collect_text(element, out),
            XmlNode::Comment(_) => {}
        }
    }
}

pub fn parse_xml_document(source: &str) -> Result<XmlDocument, ConvertError> {
    let document = Document::parse(source)
        .map_err(|error| ConvertError::new("XML_PARSE_ERROR", error.to_string()))?;

    let Some(root) = document.root().children().find(|node| node.is_element()) else {
        return Err(ConvertError::new(
            "XML_PARSE_ERROR",
            "XML document must contain a root element.",
        ));
    };

    Ok(XmlDocument {
        root: parse_element(&document, root),
    })
}

fn parse_element(document: &Document<'_>, node: Node<'_, '_>) -> XmlElementNode {
    let attributes = node
        .attributes()
        .map(|attribute| XmlAttribute {
            name: attribute.name().to_string(),
            namespace: attribute.namespace().map(str::to_string),
            value: attribute.value().to_string(),
        })
        .collect();

    let namespaces = node
        .namespaces()
        .map(|namespace| XmlNamespaceDecl {
            prefix: namespace.name().map(str::to_string),
            uri: namespace.uri().to_string(),
        })
        .collect();

    let mut children = Vec::new();
    for child in node.children() {
        match child.node_type() {
            NodeType::Element => children.push(XmlNode::Element(parse_element(document, child))),
            NodeType::Text => {
                let value = child.text().unwrap_or_default().to_string();
                if value.is_empty() {
                    continue;
                }
                children.push(XmlNode::Text(XmlTextNode {
                    value,
                    location: node_span(document, child.range().start, child.range().end),
                }));
            }
            NodeType::Comment => children.push(XmlNode::Comment(XmlCommentNode {
                value: child.text().unwrap_or_default().to_string(),
                location: node_span(document, child.range().start, child.range().end),
            })),
            _ => {}
        }
    }

    XmlElementNode {
        name: node.tag_name().name().to_string(),
        namespace: node.tag_name().namespace().map(str::to_string),
        attributes,
        namespaces,
        children,
        location: node_span(document, node.range().start, node.range().end),
    }
}

fn node_span(document: &Document<'_>, start: usize, end: usize) -> SourceSpan {
    let start_pos = document.text_pos_at(start);
    let end_pos = document.text_pos_at(end);
    SourceSpan {
        start: SourceLocation {
            line: start_pos.row as usize,
            column: start_pos.col as usize,
        },
        end: SourceLocation {
            line: end_pos.row as usize,
            column: end_pos.col as usize,
        },
    }
}
