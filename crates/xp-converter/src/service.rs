use xp_core::ConvertError;
use xp_parser::XmlElementNode;

use crate::argument::format_service_reference;
use crate::construct::{
    args_call, callable_call, constructor_call, decorate_call, deprecate_call, file_call,
    keyed_value_call, lazy_call, method_call, parent_call, tag_call, CallableKind, ABSTRACT,
    AUTOCONFIGURE, AUTOWIRE, PUBLIC, SHARED, SYNTHETIC,
};
use crate::emitter::TranslateContext;
use crate::xml_utils::{bool_flag, non_empty_attr, required_non_empty_attr, unsupported_child};

/// Which configurator a definition-like element is rendered onto; decides the
/// attributes read and the child elements accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConstructKind {
    Defaults,
    Service,
    Inline,
    Prototype,
    Instanceof,
}

impl ConstructKind {
    fn accepts_child(self, name: &str) -> bool {
        match self {
            Self::Service => matches!(
                name,
                "file"
                    | "factory"
                    | "from-callable"
                    | "configurator"
                    | "call"
                    | "tag"
                    | "resource-tag"
                    | "property"
                    | "bind"
                    | "deprecated"
            ),
            Self::Inline => matches!(
                name,
                "file"
                    | "factory"
                    | "from-callable"
                    | "configurator"
                    | "call"
                    | "tag"
                    | "resource-tag"
                    | "property"
                    | "bind"
            ),
            Self::Prototype => matches!(
                name,
                "factory"
                    | "configurator"
                    | "call"
                    | "tag"
                    | "resource-tag"
                    | "property"
                    | "bind"
                    | "deprecated"
            ),
            Self::Instanceof => {
                matches!(name, "configurator" | "call" | "tag" | "property" | "bind")
            }
            Self::Defaults => matches!(name, "tag" | "resource-tag" | "bind"),
        }
    }

    /// Children consumed by attribute-level rendering rather than the child walk.
    fn skips_child(self, name: &str) -> bool {
        match self {
            Self::Service | Self::Inline => name == "argument",
            Self::Prototype => name == "argument" || name == "exclude",
            Self::Instanceof | Self::Defaults => false,
        }
    }
}

/// Attribute calls in fixed order, then child calls in document order.
fn configuration(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
    kind: ConstructKind,
) -> Result<String, ConvertError> {
    let child_definition = node.has_attr("parent");
    let mut out = String::new();
    match kind {
        ConstructKind::Service => {
            for call in [SHARED, PUBLIC, SYNTHETIC, ABSTRACT] {
                out.push_str(&call.render(ctx, node));
            }
            out.push_str(&lazy_call(ctx, node));
            out.push_str(&parent_call(ctx, node));
            out.push_str(&decorate_call(ctx, node)?);
            out.push_str(&AUTOWIRE.render(ctx, node));
            out.push_str(&AUTOCONFIGURE.render(ctx, node));
            out.push_str(&constructor_call(ctx, node));
            out.push_str(&args_call(ctx, node, child_definition)?);
        }
        ConstructKind::Inline => {
            out.push_str(&lazy_call(ctx, node));
            out.push_str(&AUTOWIRE.render(ctx, node));
            out.push_str(&AUTOCONFIGURE.render(ctx, node));
            out.push_str(&constructor_call(ctx, node));
            out.push_str(&args_call(ctx, node, false)?);
        }
        ConstructKind::Prototype => {
            out.push_str(&parent_call(ctx, node));
            for call in [SHARED, PUBLIC, ABSTRACT, AUTOWIRE, AUTOCONFIGURE] {
                out.push_str(&call.render(ctx, node));
            }
            out.push_str(&lazy_call(ctx, node));
            out.push_str(&constructor_call(ctx, node));
            out.push_str(&args_call(ctx, node, child_definition)?);
        }
        ConstructKind::Instanceof => {
            for call in [SHARED, PUBLIC, AUTOWIRE, AUTOCONFIGURE] {
                out.push_str(&call.render(ctx, node));
            }
        }
        ConstructKind::Defaults => {
            for call in [PUBLIC, AUTOWIRE, AUTOCONFIGURE] {
                out.push_str(&call.render(ctx, node));
            }
        }
    }

    for child in node.element_children() {
        let name = child.name.as_str();
        if kind.skips_child(name) {
            continue;
        }
        if !kind.accepts_child(name) {
            return Err(unsupported_child(node, child));
        }
        let call = match name {
            "file" => file_call(ctx, child)?,
            "factory" => callable_call(ctx, child, CallableKind::Factory)?,
            "from-callable" => callable_call(ctx, child, CallableKind::FromCallable)?,
            "configurator" => callable_call(ctx, child, CallableKind::Configurator)?,
            "call" => method_call(ctx, child)?,
            "tag" => tag_call(ctx, child, false)?,
            "resource-tag" => tag_call(ctx, child, true)?,
            "property" => keyed_value_call(ctx, child, "property")?,
            "bind" => keyed_value_call(ctx, child, "bind")?,
            "deprecated" => deprecate_call(ctx, child)?,
            _ => return Err(unsupported_child(node, child)),
        };
        out.push_str(&call);
    }
    Ok(out)
}

/// `<service>` under `<services>`: a definition, or an alias when `alias` is set.
pub(crate) fn translate_service(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    let id = required_non_empty_attr(node, "id")?;
    if let Some(target) = node.attr("alias") {
        return translate_alias(ctx, node, id, target);
    }

    let mut out = format!("{}$services->set({}", ctx.nl(), ctx.string(id));
    if let Some(class) = non_empty_attr(node, "class") {
        out.push_str(", ");
        out.push_str(&ctx.string(class));
    }
    out.push(')');
    out.push_str(&ctx.indented(|ctx| configuration(ctx, node, ConstructKind::Service))?);
    out.push(';');
    Ok(out)
}

fn translate_alias(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
    id: &str,
    target: &str,
) -> Result<String, ConvertError> {
    let mut out = format!(
        "{}$services->alias({}, {})",
        ctx.nl(),
        ctx.string(id),
        ctx.string(target)
    );
    out.push_str(&ctx.indented(|ctx| {
        let mut calls = PUBLIC.render(ctx, node);
        for child in node.element_children() {
            if child.name != "deprecated" {
                return Err(unsupported_child(node, child));
            }
            calls.push_str(&deprecate_call(ctx, child)?);
        }
        Ok(calls)
    })?);
    out.push(';');
    Ok(out)
}

pub(crate) fn translate_defaults(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    let mut out = format!("{}$services->defaults()", ctx.nl());
    out.push_str(&ctx.indented(|ctx| configuration(ctx, node, ConstructKind::Defaults))?);
    out.push(';');
    Ok(out)
}

/// `<prototype>`: resource discovery with optional exclusion globs.
pub(crate) fn translate_prototype(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    let namespace = required_non_empty_attr(node, "namespace")?;
    let resource = required_non_empty_attr(node, "resource")?;
    let mut out = format!(
        "{}$services->load({}, {})",
        ctx.nl(),
        ctx.string(namespace),
        ctx.string(resource)
    );

    let mut excludes = Vec::new();
    if let Some(exclude) = node.attr("exclude") {
        excludes.push(exclude.to_string());
    }
    excludes.extend(
        node.element_children()
            .filter(|child| child.name == "exclude")
            .map(|child| child.text_content()),
    );

    out.push_str(&ctx.indented(|ctx| {
        let mut calls = String::new();
        if !excludes.is_empty() {
            calls.push_str(&ctx.nl());
            calls.push_str("->exclude([");
            ctx.indented(|ctx| {
                for exclude in &excludes {
                    calls.push_str(&ctx.nl());
                    calls.push_str(&ctx.string(exclude));
                    calls.push(',');
                }
                Ok(())
            })?;
            calls.push_str(&ctx.nl());
            calls.push_str("])");
        }
        calls.push_str(&configuration(ctx, node, ConstructKind::Prototype)?);
        Ok(calls)
    })?);
    out.push(';');
    Ok(out)
}

pub(crate) fn translate_instanceof(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    let id = required_non_empty_attr(node, "id")?;
    let mut out = format!("{}$services->instanceof({})", ctx.nl(), ctx.string(id));
    out.push_str(&ctx.indented(|ctx| configuration(ctx, node, ConstructKind::Instanceof))?);
    out.push(';');
    Ok(out)
}

/// `<stack>`: an ordered list of decorating services.
pub(crate) fn translate_stack(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    let id = required_non_empty_attr(node, "id")?;
    let mut out = format!("{}$services->stack({}, [", ctx.nl(), ctx.string(id));

    let mut deprecations = Vec::new();
    let mut entries = String::new();
    ctx.indented(|ctx| {
        for child in node.element_children() {
            match child.name.as_str() {
                "service" => {
                    let entry = if child.has_attr("id") {
                        format_service_reference(ctx, child, "service")?
                    } else {
                        translate_inline_service(ctx, child)?
                    };
                    entries.push_str(&ctx.nl());
                    entries.push_str(&entry);
                    entries.push(',');
                }
                "deprecated" => deprecations.push(child),
                _ => return Err(unsupported_child(node, child)),
            }
        }
        Ok(())
    })?;

    if !entries.is_empty() {
        out.push_str(&entries);
        out.push_str(&ctx.nl());
    }
    out.push_str("])");

    out.push_str(&ctx.indented(|ctx| {
        let mut calls = PUBLIC.render(ctx, node);
        for deprecated in &deprecations {
            calls.push_str(&deprecate_call(ctx, deprecated)?);
        }
        Ok(calls)
    })?);
    out.push(';');
    Ok(out)
}

/// Anonymous `inline_service('Class')` expression with its own chained
/// configuration one level deeper than the current line.
pub(crate) fn translate_inline_service(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    let Some(class) = non_empty_attr(node, "class") else {
        return Err(ConvertError::with_span(
            "INLINE_SERVICE_CLASS_MISSING",
            "Inline <service> definitions require a non-empty \"class\" attribute.",
            node.location.clone(),
        ));
    };

    ensure_inline_flags(node)?;

    let mut out = format!("inline_service({})", ctx.string(class));
    out.push_str(&ctx.indented(|ctx| configuration(ctx, node, ConstructKind::Inline))?);
    Ok(out)
}

/// `inline_service()` has no share, public or synthetic calls. Values that
/// match an inline definition's defaults (shared, private, not synthetic) are
/// accepted; any other value would be lost.
fn ensure_inline_flags(node: &XmlElementNode) -> Result<(), ConvertError> {
    for (attribute, fixed) in [("shared", true), ("public", false), ("synthetic", false)] {
        match bool_flag(node, attribute) {
            Some(value) if value != fixed => {
                return Err(ConvertError::with_span(
                    "ELEMENT_UNSUPPORTED",
                    format!(
                        "Attribute {}=\"{}\" cannot be expressed on an inline <{}> definition.",
                        attribute,
                        node.attr(attribute).unwrap_or_default(),
                        node.name
                    ),
                    node.location.clone(),
                ))
            }
            _ => {}
        }
    }
    Ok(())
}
