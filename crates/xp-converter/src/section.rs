use xp_core::ConvertError;
use xp_parser::{XmlElementNode, XmlNode};

use crate::argument::format_collection;
use crate::driver::translate_nodes;
use crate::emitter::TranslateContext;
use crate::service::{
    translate_defaults, translate_instanceof, translate_prototype, translate_service,
    translate_stack,
};
use crate::value::format_typed_value;
use crate::xml_utils::{
    locate, non_empty_attr, required_attr, required_non_empty_attr, scalar_text,
    unsupported_child,
};

/// `<imports>`: one `$container->import(...)` per `<import>`.
pub(crate) fn translate_imports(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    let mut out = String::new();
    for import in node.element_children() {
        if import.name != "import" {
            return Err(unsupported_child(node, import));
        }
        let resource = required_attr(import, "resource")?;
        out.push_str(&ctx.nl());
        out.push_str("$container->import(");
        out.push_str(&ctx.string(&xml_to_php_suffix(resource)));

        let declared = import.attr("type");
        let ignore_errors = import.attr("ignore-errors");
        if declared.is_some() || ignore_errors.is_some() {
            out.push_str(", ");
            match declared {
                Some(declared) => out.push_str(&ctx.string(&declared.replace("xml", "php"))),
                None => out.push_str("null"),
            }
        }
        if let Some(ignore_errors) = ignore_errors {
            out.push_str(match ignore_errors {
                "not_found" => ", 'not_found'",
                "true" | "1" => ", true",
                _ => ", false",
            });
        }
        out.push_str(");");
    }
    out.push('\n');
    Ok(out)
}

fn xml_to_php_suffix(resource: &str) -> String {
    match resource.strip_suffix(".xml") {
        Some(stem) => format!("{}.php", stem),
        None => resource.to_string(),
    }
}

/// `<parameters>`: `$parameters->set(...)` per parameter, with untyped
/// parameters that contain parameters flattened into dotted keys.
pub(crate) fn translate_parameters(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    let mut out = String::new();
    if let Some(key) = non_empty_attr(node, "key") {
        out.push_str(&format!("{}$parameters->set({}, []);", ctx.nl(), ctx.string(key)));
    }
    for parameter in node.element_children() {
        if parameter.name != "parameter" {
            return Err(unsupported_child(node, parameter));
        }
        out.push_str(&translate_parameter(ctx, parameter, None)?);
    }
    Ok(out)
}

fn translate_parameter(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
    group: Option<&str>,
) -> Result<String, ConvertError> {
    let Some(key) = node.attr("key").or_else(|| node.attr("id")) else {
        return Err(ConvertError::with_span(
            "XML_MISSING_ATTR",
            "Missing required attribute \"key\" or \"id\" on <parameter>.",
            node.location.clone(),
        ));
    };
    let path = match group {
        Some(group) => format!("{}.{}", group, key),
        None => key.to_string(),
    };

    let declared = non_empty_attr(node, "type");
    let is_group =
        declared.is_none() && node.element_children().any(|child| child.name == "parameter");
    if !is_group {
        let value = format_parameter_value(ctx, node)?;
        return Ok(format!(
            "{}$parameters->set({}, {});",
            ctx.nl(),
            ctx.string(&path),
            value
        ));
    }

    let mut out = String::new();
    if group.is_none() {
        out.push_str(&format!("{}$parameters->set({}, []);", ctx.nl(), ctx.string(&path)));
    }
    for nested in node.element_children() {
        if nested.name != "parameter" {
            return Err(unsupported_child(node, nested));
        }
        out.push_str(&translate_parameter(ctx, nested, Some(&path))?);
    }
    Ok(out)
}

/// Parameter values: collections recurse, every other declared type goes
/// through the typed value rules.
fn format_parameter_value(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    ctx.nested(node, |ctx| {
        let declared = non_empty_attr(node, "type");
        if declared == Some("collection") {
            return format_collection(ctx, node, format_parameter_value);
        }
        let raw = scalar_text(node)?;
        format_typed_value(&raw, declared, &ctx.options().known_classes)
            .map_err(|error| locate(error, node))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServicesEntry {
    Defaults,
    Service,
    Prototype,
    Instanceof,
    Stack,
}

impl ServicesEntry {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "defaults" => Some(Self::Defaults),
            "service" => Some(Self::Service),
            "prototype" => Some(Self::Prototype),
            "instanceof" => Some(Self::Instanceof),
            "stack" => Some(Self::Stack),
            _ => None,
        }
    }
}

/// `<services>`: each definition is separated from the previous one by a
/// blank line. Comments inside the section are not carried over.
pub(crate) fn translate_services(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    let mut out = String::new();
    for child in &node.children {
        let XmlNode::Element(child) = child else {
            continue;
        };
        let Some(entry) = ServicesEntry::from_name(&child.name) else {
            return Err(unsupported_child(node, child));
        };
        out.push('\n');
        out.push_str(&match entry {
            ServicesEntry::Defaults => translate_defaults(ctx, child)?,
            ServicesEntry::Service => translate_service(ctx, child)?,
            ServicesEntry::Prototype => translate_prototype(ctx, child)?,
            ServicesEntry::Instanceof => translate_instanceof(ctx, child)?,
            ServicesEntry::Stack => translate_stack(ctx, child)?,
        });
    }
    Ok(out)
}

/// `<when env="...">`: the nested configuration guarded by an environment check.
pub(crate) fn translate_when(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    let env = required_non_empty_attr(node, "env")?;
    let mut out = String::from("\n");
    out.push_str(&ctx.comment(&format!("Configuration for environment: {}", env)));
    out.push_str(&ctx.nl());
    out.push_str(&format!("if ($container->env() === {}) {{", ctx.string(env)));
    out.push_str(&ctx.indented(|ctx| translate_nodes(ctx, node))?);
    out.push_str(&ctx.nl());
    out.push('}');
    Ok(out)
}
