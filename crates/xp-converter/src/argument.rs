use xp_core::ConvertError;
use xp_parser::XmlElementNode;

use crate::emitter::TranslateContext;
use crate::service::translate_inline_service;
use crate::value::{format_binary, format_constant, format_typed_value};
use crate::xml_utils::{
    bool_flag, locate, node_text, non_empty_attr, required_non_empty_attr, scalar_text,
    unsupported_child,
};

pub(crate) type ItemFormatter =
    fn(&mut TranslateContext<'_>, &XmlElementNode) -> Result<String, ConvertError>;

/// Renders an `<argument>`-shaped element (argument, property, bind, tag
/// attribute, collection item) as a PHP expression.
pub(crate) fn format_argument(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    ctx.nested(node, |ctx| format_argument_value(ctx, node))
}

fn format_argument_value(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    if let Some(service) = node.element_children().find(|child| child.name == "service") {
        return translate_inline_service(ctx, service);
    }

    let declared = non_empty_attr(node, "type");
    match declared {
        None if !node.has_element_children() => Ok(ctx.scalar(&node_text(node))),
        None | Some("collection") => format_collection(ctx, node, format_argument),
        Some("service") => format_service_reference(ctx, node, "service"),
        Some("service_closure") => format_service_reference(ctx, node, "service_closure"),
        Some("expression") => Ok(format!("expr({})", ctx.string(&scalar_text(node)?))),
        Some("string") | Some("constant") | Some("binary") => {
            let raw = scalar_text(node)?;
            format_typed_value(&raw, declared, &ctx.options().known_classes)
                .map_err(|error| locate(error, node))
        }
        Some("tagged") | Some("tagged_iterator") => format_tagged(ctx, node, "tagged_iterator"),
        Some("tagged_locator") => format_tagged(ctx, node, "tagged_locator"),
        Some("service_locator") => {
            let list = format_argument_list(ctx, node, &node.name, false)?;
            Ok(format!("service_locator({})", list.as_deref().unwrap_or("[]")))
        }
        Some("iterator") => {
            let list = format_argument_list(ctx, node, &node.name, false)?;
            Ok(format!("iterator({})", list.as_deref().unwrap_or("[]")))
        }
        Some("abstract") => Ok(format!("abstract_arg({})", ctx.string(&scalar_text(node)?))),
        Some("closure") => {
            if node.has_attr("id") {
                return Ok(format!(
                    "closure({})",
                    format_service_reference(ctx, node, "service")?
                ));
            }
            let list = format_argument_list(ctx, node, &node.name, false)?;
            Ok(format!("closure({})", list.as_deref().unwrap_or("[]")))
        }
        Some(other) => Err(ConvertError::with_span(
            "ARGUMENT_TYPE_UNSUPPORTED",
            format!(
                "Argument type \"{}\" on <{}> is not supported.",
                other, node.name
            ),
            node.location.clone(),
        )),
    }
}

/// One-line `[key => value, value]` array built from same-named children.
pub(crate) fn format_collection(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
    format_item: ItemFormatter,
) -> Result<String, ConvertError> {
    let mut entries = Vec::new();
    for item in node.element_children() {
        if item.name != node.name {
            return Err(ConvertError::with_span(
                "COLLECTION_CHILD_INVALID",
                format!(
                    "Collection <{}> may only contain <{}> elements, found <{}>.",
                    node.name, node.name, item.name
                ),
                item.location.clone(),
            ));
        }

        let value = format_item(ctx, item)?;
        match item.attr("key").or_else(|| item.attr("name")) {
            Some(key) => entries.push(format!("{} => {}", format_key(ctx, item, key)?, value)),
            None => entries.push(value),
        }
    }
    Ok(format!("[{}]", entries.join(", ")))
}

fn format_key(
    ctx: &TranslateContext<'_>,
    item: &XmlElementNode,
    key: &str,
) -> Result<String, ConvertError> {
    match item.attr("key-type") {
        None => Ok(ctx.string(key)),
        Some("constant") => format_constant(key).map_err(|error| locate(error, item)),
        Some("binary") => format_binary(key).map_err(|error| locate(error, item)),
        Some(other) => Err(ConvertError::with_span(
            "KEY_TYPE_UNSUPPORTED",
            format!("Key type \"{}\" on <{}> is not supported.", other, item.name),
            item.location.clone(),
        )),
    }
}

/// `service('id')` plus the invalid-reference modifier.
pub(crate) fn format_service_reference(
    ctx: &TranslateContext<'_>,
    node: &XmlElementNode,
    function: &str,
) -> Result<String, ConvertError> {
    let id = required_non_empty_attr(node, "id")?;
    let modifier = match node.attr("on-invalid") {
        None | Some("exception") => "",
        Some("ignore") => "->ignoreOnInvalid()",
        Some("null") => "->nullOnInvalid()",
        Some("ignore_uninitialized") => "->ignoreOnUninitialized()",
        Some(other) => {
            return Err(ConvertError::with_span(
                "ON_INVALID_UNSUPPORTED",
                format!(
                    "Invalid reference behavior \"{}\" on <{}> is not supported.",
                    other, node.name
                ),
                node.location.clone(),
            ))
        }
    };
    Ok(format!("{}({}){}", function, ctx.string(id), modifier))
}

fn format_tagged(
    ctx: &TranslateContext<'_>,
    node: &XmlElementNode,
    function: &str,
) -> Result<String, ConvertError> {
    let tag = required_non_empty_attr(node, "tag")?;
    let mut out = format!("{}({}", function, ctx.string(tag));

    for (attribute, parameter) in [
        ("index-by", "indexAttribute"),
        ("default-index-method", "defaultIndexMethod"),
        ("default-priority-method", "defaultPriorityMethod"),
    ] {
        if let Some(value) = node.attr(attribute) {
            out.push_str(&format!(", {}: {}", parameter, ctx.string(value)));
        }
    }

    let mut excludes = Vec::new();
    if let Some(exclude) = node.attr("exclude") {
        excludes.push(ctx.string(exclude));
    }
    for child in node.element_children() {
        if child.name != "exclude" {
            return Err(unsupported_child(node, child));
        }
        excludes.push(ctx.string(&child.text_content()));
    }
    match excludes.len() {
        0 => {}
        1 => out.push_str(&format!(", exclude: {}", excludes[0])),
        _ => out.push_str(&format!(", exclude: [{}]", excludes.join(", "))),
    }

    if bool_flag(node, "exclude-self") == Some(false) {
        out.push_str(", excludeSelf: false");
    }
    out.push(')');
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ArgumentKey {
    Named(String),
    Index(String),
    Positional,
}

impl ArgumentKey {
    fn of(node: &XmlElementNode) -> Self {
        if let Some(key) = node.attr("key").or_else(|| node.attr("name")) {
            return Self::Named(key.to_string());
        }
        match node.attr("index") {
            Some(index) => Self::Index(index.to_string()),
            None => Self::Positional,
        }
    }

    fn matches_position(&self, position: usize, child_definition: bool) -> bool {
        match self {
            Self::Named(key) => *key == position.to_string(),
            Self::Index(index) => !child_definition && *index == position.to_string(),
            Self::Positional => true,
        }
    }
}

/// Renders the `child_name` children of `parent` as a PHP array, or `None`
/// when there are none. Purely positional lists drop their keys; any other
/// list is keyed on every entry.
pub(crate) fn format_argument_list(
    ctx: &mut TranslateContext<'_>,
    parent: &XmlElementNode,
    child_name: &str,
    child_definition: bool,
) -> Result<Option<String>, ConvertError> {
    let items = parent
        .element_children()
        .filter(|child| child.name == child_name)
        .map(|child| (child, ArgumentKey::of(child)))
        .collect::<Vec<_>>();
    if items.is_empty() {
        return Ok(None);
    }

    let positional = items
        .iter()
        .enumerate()
        .all(|(position, (_, key))| key.matches_position(position, child_definition));

    if positional && items.len() == 1 {
        return Ok(Some(format!("[{}]", format_argument(ctx, items[0].0)?)));
    }

    let mut out = String::from("[");
    ctx.indented(|ctx| {
        for (position, (item, key)) in items.iter().enumerate() {
            let value = format_argument(ctx, item)?;
            out.push_str(&ctx.nl());
            if !positional {
                out.push_str(&render_argument_key(ctx, item, key, position, child_definition)?);
                out.push_str(" => ");
            }
            out.push_str(&value);
            out.push(',');
        }
        Ok(())
    })?;
    out.push_str(&ctx.nl());
    out.push(']');
    Ok(Some(out))
}

fn render_argument_key(
    ctx: &TranslateContext<'_>,
    item: &XmlElementNode,
    key: &ArgumentKey,
    position: usize,
    child_definition: bool,
) -> Result<String, ConvertError> {
    match key {
        ArgumentKey::Named(name) => Ok(ctx.string(name)),
        ArgumentKey::Positional => Ok(position.to_string()),
        ArgumentKey::Index(index) => {
            let Ok(number) = index.trim().parse::<u64>() else {
                return Err(ConvertError::with_span(
                    "XML_ATTR_INT_INVALID",
                    format!(
                        "Attribute \"index\" on <{}> must be a non-negative integer, got \"{}\".",
                        item.name, index
                    ),
                    item.location.clone(),
                ));
            };
            if child_definition {
                Ok(ctx.string(&format!("index_{}", number)))
            } else {
                Ok(number.to_string())
            }
        }
    }
}
