//! XML document adapter
//!
//! Thin wrapper around [`xot`] exposing the handful of operations the
//! manifest reader and the fragment filter need: look up child elements by
//! local name, read an element's text, remove an element, serialize back.
//!
//! `xot` keeps sibling order, whitespace text nodes and namespace
//! declarations, so a document that is parsed and serialized without edits
//! keeps its layout. The XML declaration is not part of the `xot` tree; it is
//! captured from the source text and written back in front of the output.

use xot::{Node, Xot};

use crate::error::{Error, Result};

/// A parsed XML document.
pub struct XmlDocument {
    xot: Xot,
    root: Node,
    declaration: Option<String>,
    trailing_newline: bool,
}

impl std::fmt::Debug for XmlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlDocument")
            .field("declaration", &self.declaration)
            .finish_non_exhaustive()
    }
}

impl XmlDocument {
    /// Parse a document from text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut xot = Xot::new();
        let root = xot.parse(text).map_err(|e| Error::Xml {
            message: e.to_string(),
        })?;

        let trimmed = text.trim_start();
        let declaration = if trimmed.starts_with("<?xml") {
            trimmed
                .find("?>")
                .map(|end| trimmed[..end + 2].to_string())
        } else {
            None
        };

        Ok(Self {
            xot,
            root,
            declaration,
            trailing_newline: text.ends_with('\n'),
        })
    }

    /// The document (root) element.
    pub fn root_element(&self) -> Result<Node> {
        self.xot
            .document_element(self.root)
            .map_err(|e| Error::Xml {
                message: e.to_string(),
            })
    }

    /// Local name of an element node, `None` for non-element nodes.
    pub fn local_name(&self, node: Node) -> Option<&str> {
        self.xot
            .element(node)
            .map(|element| self.xot.local_name_str(element.name()))
    }

    /// Child elements of `node` whose local name is `name`, in document order.
    pub fn child_elements(&self, node: Node, name: &str) -> Vec<Node> {
        self.xot
            .children(node)
            .filter(|child| self.local_name(*child) == Some(name))
            .collect()
    }

    /// Concatenated, trimmed text of an element's direct text children.
    pub fn text(&self, node: Node) -> String {
        self.xot
            .children(node)
            .filter_map(|child| self.xot.text_str(child))
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Text of the first child element named `name`.
    pub fn child_text(&self, node: Node, name: &str) -> Option<String> {
        self.child_elements(node, name)
            .first()
            .map(|child| self.text(*child))
    }

    /// Texts of every child element named `name`.
    pub fn child_texts(&self, node: Node, name: &str) -> Vec<String> {
        self.child_elements(node, name)
            .into_iter()
            .map(|child| self.text(child))
            .collect()
    }

    /// Remove the given child elements of `parent`.
    ///
    /// The whitespace-only text node in front of each removed element goes
    /// with it so that pruned documents keep their indentation.
    pub fn remove_children(&mut self, parent: Node, doomed: &[Node]) -> Result<()> {
        if doomed.is_empty() {
            return Ok(());
        }
        let siblings: Vec<Node> = self.xot.children(parent).collect();
        let mut to_remove = Vec::with_capacity(doomed.len() * 2);
        for (idx, sibling) in siblings.iter().enumerate() {
            if !doomed.contains(sibling) {
                continue;
            }
            if idx > 0 {
                let previous = siblings[idx - 1];
                let is_blank = self
                    .xot
                    .text_str(previous)
                    .is_some_and(|text| text.trim().is_empty());
                if is_blank && !to_remove.contains(&previous) {
                    to_remove.push(previous);
                }
            }
            to_remove.push(*sibling);
        }
        for node in to_remove {
            self.xot.remove(node).map_err(|e| Error::Xml {
                message: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Serialize the document, restoring the XML declaration and the final
    /// newline of the source text.
    pub fn to_xml_string(&self) -> Result<String> {
        let body = self.xot.to_string(self.root).map_err(|e| Error::Xml {
            message: e.to_string(),
        })?;
        let mut out = String::with_capacity(body.len() + 64);
        if let Some(declaration) = &self.declaration {
            if !body.trim_start().starts_with("<?xml") {
                out.push_str(declaration);
                out.push('\n');
            }
        }
        out.push_str(&escape_quotes_in_text(&body));
        if self.trailing_newline && !out.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }
}

/// Write `"` and `'` in character data as entities, the way Metadata API
/// files spell them. Markup, comments, CDATA sections and processing
/// instructions are copied unchanged.
fn escape_quotes_in_text(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len() + xml.len() / 16);
    let mut rest = xml;
    while let Some(start) = rest.find(|c: char| matches!(c, '<' | '"' | '\'')) {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        if rest.starts_with('"') {
            out.push_str("&quot;");
            rest = &rest[1..];
            continue;
        }
        if rest.starts_with('\'') {
            out.push_str("&apos;");
            rest = &rest[1..];
            continue;
        }
        let end = if rest.starts_with("<!--") {
            rest.find("-->").map(|i| i + 3)
        } else if rest.starts_with("<![CDATA[") {
            rest.find("]]>").map(|i| i + 3)
        } else if rest.starts_with("<?") {
            rest.find("?>").map(|i| i + 2)
        } else {
            markup_end(rest)
        };
        let end = end.unwrap_or(rest.len());
        out.push_str(&rest[..end]);
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

/// Length of the tag at the start of `tag`, honouring quoted attribute values.
fn markup_end(tag: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in tag.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            (None, '>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomLabels xmlns="http://soap.sforce.com/2006/04/metadata">
    <labels>
        <fullName>Greeting</fullName>
        <value>Hello</value>
    </labels>
    <labels>
        <fullName>Farewell</fullName>
        <value>Bye</value>
    </labels>
</CustomLabels>
"#;

    #[test]
    fn test_parse_root_and_children() {
        let doc = XmlDocument::parse(LABELS).unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(doc.local_name(root), Some("CustomLabels"));
        let labels = doc.child_elements(root, "labels");
        assert_eq!(labels.len(), 2);
        assert_eq!(doc.child_text(labels[0], "fullName").as_deref(), Some("Greeting"));
        assert_eq!(doc.child_text(labels[1], "value").as_deref(), Some("Bye"));
        assert_eq!(doc.child_text(labels[1], "missing"), None);
    }

    #[test]
    fn test_roundtrip_keeps_declaration_and_namespace() {
        let doc = XmlDocument::parse(LABELS).unwrap();
        let out = doc.to_xml_string().unwrap();
        assert!(out.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(out.contains(r#"xmlns="http://soap.sforce.com/2006/04/metadata""#));
        assert!(out.ends_with('\n'));
        assert!(out.contains("<fullName>Greeting</fullName>"));
    }

    #[test]
    fn test_remove_children_drops_fragment_and_indentation() {
        let mut doc = XmlDocument::parse(LABELS).unwrap();
        let root = doc.root_element().unwrap();
        let labels = doc.child_elements(root, "labels");
        doc.remove_children(root, &labels[..1]).unwrap();

        let out = doc.to_xml_string().unwrap();
        assert!(!out.contains("Greeting"));
        assert!(out.contains("Farewell"));
        assert!(!out.contains("\n\n"));
    }

    #[test]
    fn test_quotes_in_text_are_written_as_entities() {
        let source = r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomObject xmlns="http://soap.sforce.com/2006/04/metadata">
    <fields>
        <fullName>Score__c</fullName>
        <formula>IF(A &gt; 1, &quot;x&quot;, &apos;y&apos;)</formula>
    </fields>
</CustomObject>
"#;
        let doc = XmlDocument::parse(source).unwrap();
        assert_eq!(doc.to_xml_string().unwrap(), source);
    }

    #[test]
    fn test_escape_quotes_leaves_markup_alone() {
        let xml = r#"<a b="it's"><!-- "c" --><![CDATA['d']]>"e" 'f'</a>"#;
        assert_eq!(
            escape_quotes_in_text(xml),
            r#"<a b="it's"><!-- "c" --><![CDATA['d']]>&quot;e&quot; &apos;f&apos;</a>"#
        );
    }

    #[test]
    fn test_parse_error() {
        let result = XmlDocument::parse("<Package><types></Package>");
        assert!(matches!(result, Err(Error::Xml { .. })));
    }
}
