use xp_core::ConvertError;
use xp_parser::XmlElementNode;

pub(crate) fn required_attr<'a>(
    node: &'a XmlElementNode,
    name: &str,
) -> Result<&'a str, ConvertError> {
    node.attr(name).ok_or_else(|| {
        ConvertError::with_span(
            "XML_MISSING_ATTR",
            format!("Missing required attribute \"{}\" on <{}>.", name, node.name),
            node.location.clone(),
        )
    })
}

pub(crate) fn required_non_empty_attr<'a>(
    node: &'a XmlElementNode,
    name: &str,
) -> Result<&'a str, ConvertError> {
    let raw = required_attr(node, name)?;
    if raw.trim().is_empty() {
        return Err(ConvertError::with_span(
            "XML_EMPTY_ATTR",
            format!("Attribute \"{}\" on <{}> cannot be empty.", name, node.name),
            node.location.clone(),
        ));
    }
    Ok(raw)
}

/// Attribute value, treating an empty string like a missing attribute.
pub(crate) fn non_empty_attr<'a>(node: &'a XmlElementNode, name: &str) -> Option<&'a str> {
    node.attr(name).filter(|value| !value.is_empty())
}

/// `key`, falling back to `name`; fatal when both are absent.
pub(crate) fn key_or_name<'a>(node: &'a XmlElementNode) -> Result<&'a str, ConvertError> {
    node.attr("key").or_else(|| node.attr("name")).ok_or_else(|| {
        ConvertError::with_span(
            "XML_MISSING_ATTR",
            format!(
                "Missing required attribute \"key\" or \"name\" on <{}>.",
                node.name
            ),
            node.location.clone(),
        )
    })
}

/// `Some(true)` for `true`/`1`, `Some(false)` for `false`/`0`, otherwise `None`.
pub(crate) fn bool_flag(node: &XmlElementNode, name: &str) -> Option<bool> {
    match node.attr(name)? {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

pub(crate) fn int_attr(node: &XmlElementNode, name: &str) -> Result<Option<i64>, ConvertError> {
    let Some(raw) = node.attr(name) else {
        return Ok(None);
    };
    raw.trim().parse::<i64>().map(Some).map_err(|_| {
        ConvertError::with_span(
            "XML_ATTR_INT_INVALID",
            format!(
                "Attribute \"{}\" on <{}> must be an integer, got \"{}\".",
                name, node.name, raw
            ),
            node.location.clone(),
        )
    })
}

/// Text content, trimmed when the element carries `trim="true"`.
pub(crate) fn node_text(node: &XmlElementNode) -> String {
    let text = node.text_content();
    match bool_flag(node, "trim") {
        Some(true) => text.trim().to_string(),
        _ => text,
    }
}

/// Text of an element that must not contain nested elements.
pub(crate) fn scalar_text(node: &XmlElementNode) -> Result<String, ConvertError> {
    if let Some(child) = node.element_children().next() {
        return Err(unsupported_child(node, child));
    }
    Ok(node_text(node))
}

pub(crate) fn unsupported_child(parent: &XmlElementNode, child: &XmlElementNode) -> ConvertError {
    ConvertError::with_span(
        "ELEMENT_UNSUPPORTED",
        format!(
            "Element <{}> is not supported inside <{}>.",
            child.name, parent.name
        ),
        child.location.clone(),
    )
}

/// Attaches the element's location to errors raised without one.
pub(crate) fn locate(error: ConvertError, node: &XmlElementNode) -> ConvertError {
    if error.span.is_some() {
        return error;
    }
    ConvertError {
        span: Some(node.location.clone()),
        ..error
    }
}

#[cfg(test)]
mod xml_utils_tests {
    use super::*;
    use xp_parser::parse_xml_document;

    fn element(source: &str) -> XmlElementNode {
        parse_xml_document(source).expect("xml should parse").root
    }

    #[test]
    fn bool_flag_accepts_only_four_spellings() {
        let node = element(r#"<service a="true" b="1" c="false" d="0" e="yes" f=""/>"#);
        assert_eq!(bool_flag(&node, "a"), Some(true));
        assert_eq!(bool_flag(&node, "b"), Some(true));
        assert_eq!(bool_flag(&node, "c"), Some(false));
        assert_eq!(bool_flag(&node, "d"), Some(false));
        assert_eq!(bool_flag(&node, "e"), None);
        assert_eq!(bool_flag(&node, "f"), None);
        assert_eq!(bool_flag(&node, "missing"), None);
    }

    #[test]
    fn required_attrs_report_missing_and_empty() {
        let node = element(r#"<service id=""/>"#);
        assert_eq!(required_attr(&node, "id").expect("present"), "");
        let empty = required_non_empty_attr(&node, "id").expect_err("empty should fail");
        assert_eq!(empty.code, "XML_EMPTY_ATTR");
        let missing = required_attr(&node, "class").expect_err("missing should fail");
        assert_eq!(missing.code, "XML_MISSING_ATTR");
        assert!(missing.span.is_some());
    }

    #[test]
    fn key_or_name_prefers_key() {
        assert_eq!(
            key_or_name(&element(r#"<bind key="$a" name="b"/>"#)).expect("key"),
            "$a"
        );
        assert_eq!(key_or_name(&element(r#"<bind name="b"/>"#)).expect("name"), "b");
        assert!(key_or_name(&element("<bind/>")).is_err());
    }

    #[test]
    fn int_attr_rejects_non_integers() {
        let node = element(r#"<service priority="5" bad="x"/>"#);
        assert_eq!(int_attr(&node, "priority").expect("int"), Some(5));
        assert_eq!(int_attr(&node, "missing").expect("absent"), None);
        assert_eq!(
            int_attr(&node, "bad").expect_err("invalid").code,
            "XML_ATTR_INT_INVALID"
        );
    }

    #[test]
    fn node_text_honours_trim_flag() {
        assert_eq!(node_text(&element("<argument> a </argument>")), " a ");
        assert_eq!(
            node_text(&element(r#"<argument trim="true"> a </argument>"#)),
            "a"
        );
        assert!(scalar_text(&element("<argument><x/></argument>")).is_err());
    }
}
