use xp_core::ConvertError;
use xp_parser::XmlElementNode;

use crate::argument::{format_argument, format_argument_list, format_service_reference};
use crate::emitter::TranslateContext;
use crate::service::translate_inline_service;
use crate::xml_utils::{
    bool_flag, int_attr, key_or_name, non_empty_attr, required_attr, required_non_empty_attr,
    unsupported_child,
};

/// A boolean attribute that maps onto an enable/disable configurator call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BooleanCall {
    pub(crate) attribute: &'static str,
    pub(crate) enable: &'static str,
    pub(crate) disable: &'static str,
}

pub(crate) const SHARED: BooleanCall = BooleanCall {
    attribute: "shared",
    enable: "->share()",
    disable: "->share(false)",
};
pub(crate) const PUBLIC: BooleanCall = BooleanCall {
    attribute: "public",
    enable: "->public()",
    disable: "->private()",
};
pub(crate) const SYNTHETIC: BooleanCall = BooleanCall {
    attribute: "synthetic",
    enable: "->synthetic()",
    disable: "->synthetic(false)",
};
pub(crate) const ABSTRACT: BooleanCall = BooleanCall {
    attribute: "abstract",
    enable: "->abstract()",
    disable: "->abstract(false)",
};
pub(crate) const AUTOWIRE: BooleanCall = BooleanCall {
    attribute: "autowire",
    enable: "->autowire()",
    disable: "->autowire(false)",
};
pub(crate) const AUTOCONFIGURE: BooleanCall = BooleanCall {
    attribute: "autoconfigure",
    enable: "->autoconfigure()",
    disable: "->autoconfigure(false)",
};

impl BooleanCall {
    /// The call on a fresh line, or nothing for absent and unrecognised values.
    pub(crate) fn render(&self, ctx: &TranslateContext<'_>, node: &XmlElementNode) -> String {
        match bool_flag(node, self.attribute) {
            Some(true) => format!("{}{}", ctx.nl(), self.enable),
            Some(false) => format!("{}{}", ctx.nl(), self.disable),
            None => String::new(),
        }
    }
}

pub(crate) fn lazy_call(ctx: &TranslateContext<'_>, node: &XmlElementNode) -> String {
    match node.attr("lazy") {
        None | Some("") => String::new(),
        Some("true") | Some("1") => format!("{}->lazy()", ctx.nl()),
        Some("false") | Some("0") => format!("{}->lazy(false)", ctx.nl()),
        Some(hint) => format!("{}->lazy({})", ctx.nl(), ctx.string(hint)),
    }
}

pub(crate) fn parent_call(ctx: &TranslateContext<'_>, node: &XmlElementNode) -> String {
    match node.attr("parent") {
        Some(parent) => format!("{}->parent({})", ctx.nl(), ctx.string(parent)),
        None => String::new(),
    }
}

pub(crate) fn constructor_call(ctx: &TranslateContext<'_>, node: &XmlElementNode) -> String {
    match node.attr("constructor") {
        Some(constructor) => format!("{}->constructor({})", ctx.nl(), ctx.string(constructor)),
        None => String::new(),
    }
}

pub(crate) fn args_call(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
    child_definition: bool,
) -> Result<String, ConvertError> {
    let nl = ctx.nl();
    Ok(format_argument_list(ctx, node, "argument", child_definition)?
        .map(|list| format!("{}->args({})", nl, list))
        .unwrap_or_default())
}

const CONTAINER_INTERFACE: &str = "\\Symfony\\Component\\DependencyInjection\\ContainerInterface";

/// `->decorate('id'[, inner[, priority[, behavior]]])`, trailing defaults omitted.
pub(crate) fn decorate_call(
    ctx: &TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    let Some(decorated) = node.attr("decorates") else {
        return Ok(String::new());
    };

    let inner = non_empty_attr(node, "decoration-inner-name");
    let priority = int_attr(node, "decoration-priority")?.unwrap_or(0);
    let behavior = match node.attr("decoration-on-invalid") {
        None => None,
        Some("ignore") | Some("1") => Some("IGNORE_ON_INVALID_REFERENCE"),
        Some("null") | Some("2") => Some("NULL_ON_INVALID_REFERENCE"),
        Some("ignore_uninitialized") | Some("3") => Some("IGNORE_ON_UNINITIALIZED_REFERENCE"),
        Some("exception") | Some("4") => Some("EXCEPTION_ON_INVALID_REFERENCE"),
        Some(other) => {
            return Err(ConvertError::with_span(
                "ON_INVALID_UNSUPPORTED",
                format!(
                    "Decoration invalid-reference behavior \"{}\" on <{}> is not supported.",
                    other, node.name
                ),
                node.location.clone(),
            ))
        }
    };

    let mut arguments = vec![ctx.string(decorated)];
    if inner.is_some() || priority != 0 || behavior.is_some() {
        arguments.push(inner.map(|name| ctx.string(name)).unwrap_or_else(|| "null".to_string()));
    }
    if priority != 0 || behavior.is_some() {
        arguments.push(priority.to_string());
    }
    if let Some(behavior) = behavior {
        arguments.push(format!("{}::{}", CONTAINER_INTERFACE, behavior));
    }
    Ok(format!("{}->decorate({})", ctx.nl(), arguments.join(", ")))
}

/// `factory`, `from-callable` and `configurator` children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallableKind {
    Factory,
    FromCallable,
    Configurator,
}

impl CallableKind {
    fn method(self) -> &'static str {
        match self {
            Self::Factory => "factory",
            Self::FromCallable => "fromCallable",
            Self::Configurator => "configurator",
        }
    }
}

/// Resolves the callable forms in priority order; only a factory without any
/// usable form is an error.
pub(crate) fn callable_call(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
    kind: CallableKind,
) -> Result<String, ConvertError> {
    for child in node.element_children() {
        if child.name != "service" {
            return Err(unsupported_child(node, child));
        }
    }

    let method = node.attr("method");
    let callable = if let (Some(class), Some(method)) = (node.attr("class"), method) {
        format!("[{}, {}]", ctx.string(class), ctx.string(method))
    } else if let (Some(service), Some(method)) = (node.attr("service"), method) {
        format!("[service({}), {}]", ctx.string(service), ctx.string(method))
    } else if let Some(method) = method {
        let target = match node.element_children().next() {
            Some(service) if service.has_attr("id") => {
                format_service_reference(ctx, service, "service")?
            }
            Some(service) => translate_inline_service(ctx, service)?,
            None => "null".to_string(),
        };
        format!("[{}, {}]", target, ctx.string(method))
    } else if let Some(function) = node.attr("function") {
        ctx.string(function)
    } else if let Some(expression) = node.attr("expression") {
        format!("expr({})", ctx.string(expression))
    } else if kind == CallableKind::Factory {
        return Err(ConvertError::with_span(
            "FACTORY_INVALID",
            "<factory> needs a function, a method with a class or service, or an expression.",
            node.location.clone(),
        ));
    } else {
        return Ok(String::new());
    };

    Ok(format!("{}->{}({})", ctx.nl(), kind.method(), callable))
}

pub(crate) fn method_call(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    let method = required_non_empty_attr(node, "method")?;
    for child in node.element_children() {
        if child.name != "argument" {
            return Err(unsupported_child(node, child));
        }
    }

    let nl = ctx.nl();
    let mut out = format!("{}->call({}", nl, ctx.string(method));
    if let Some(list) = format_argument_list(ctx, node, "argument", false)? {
        out.push_str(", ");
        out.push_str(&list);
    }
    if bool_flag(node, "returns-clone") == Some(true) {
        out.push_str(", returnsClone: true");
    }
    out.push(')');
    Ok(out)
}

/// `->tag('name', [...])` or `->resourceTag(...)`.
pub(crate) fn tag_call(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
    resource: bool,
) -> Result<String, ConvertError> {
    let text = node.text_content();
    let name_from_attribute = node.has_element_children() || text.is_empty();
    let name = if name_from_attribute {
        node.attr("name").unwrap_or_default().to_string()
    } else {
        text
    };
    if name.is_empty() {
        return Err(ConvertError::with_span(
            "TAG_NAME_EMPTY",
            format!("The tag name for <{}> must be a non-empty string.", node.name),
            node.location.clone(),
        ));
    }

    let mut attributes: Vec<(String, String)> = Vec::new();
    for attribute in node.attributes.iter().filter(|entry| entry.namespace.is_none()) {
        if name_from_attribute && attribute.name == "name" {
            continue;
        }
        upsert(&mut attributes, &attribute.name, ctx.scalar(&attribute.value));
    }
    for child in node.element_children() {
        if child.name != "attribute" {
            return Err(unsupported_child(node, child));
        }
        let key = required_attr(child, "name")?;
        let value = format_argument(ctx, child)?;
        upsert(&mut attributes, key, value);
    }

    let keys = attributes.iter().map(|(key, _)| key.clone()).collect::<Vec<_>>();
    let entries = attributes
        .iter()
        .map(|(key, value)| format!("{} => {}", ctx.string(&normalize_tag_key(key, &keys)), value))
        .collect::<Vec<_>>();

    let method = if resource { "resourceTag" } else { "tag" };
    let nl = ctx.nl();
    if entries.is_empty() {
        return Ok(format!("{}->{}({})", nl, method, ctx.string(&name)));
    }
    Ok(format!(
        "{}->{}({}, [{}])",
        nl,
        method,
        ctx.string(&name),
        entries.join(", ")
    ))
}

fn upsert(attributes: &mut Vec<(String, String)>, key: &str, value: String) {
    match attributes.iter_mut().find(|(existing, _)| existing == key) {
        Some(entry) => entry.1 = value,
        None => attributes.push((key.to_string(), value)),
    }
}

/// Dashed keys become underscored unless an underscored twin already exists.
fn normalize_tag_key(key: &str, keys: &[String]) -> String {
    if !key.contains('-') || key.contains('_') {
        return key.to_string();
    }
    let underscored = key.replace('-', "_");
    if keys.iter().any(|existing| *existing == underscored) {
        return key.to_string();
    }
    underscored
}

/// `<property>` and `<bind>` share one shape.
pub(crate) fn keyed_value_call(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
    method: &str,
) -> Result<String, ConvertError> {
    let key = key_or_name(node)?;
    let nl = ctx.nl();
    let value = format_argument(ctx, node)?;
    Ok(format!("{}->{}({}, {})", nl, method, ctx.string(key), value))
}

pub(crate) fn deprecate_call(
    ctx: &TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    let package = required_attr(node, "package")?;
    let version = required_attr(node, "version")?;
    if let Some(child) = node.element_children().next() {
        return Err(unsupported_child(node, child));
    }
    Ok(format!(
        "{}->deprecate({}, {}, {})",
        ctx.nl(),
        ctx.string(package),
        ctx.string(version),
        ctx.string(node.text_content().trim())
    ))
}

pub(crate) fn file_call(
    ctx: &TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    if let Some(child) = node.element_children().next() {
        return Err(unsupported_child(node, child));
    }
    Ok(format!(
        "{}->file({})",
        ctx.nl(),
        ctx.string(node.text_content().trim())
    ))
}

#[cfg(test)]
mod construct_tests {
    use super::*;
    use crate::options::TranslateOptions;
    use xp_parser::parse_xml_document;

    fn element(source: &str) -> XmlElementNode {
        parse_xml_document(source).expect("xml should parse").root
    }

    fn with_ctx<T>(body: impl FnOnce(&mut TranslateContext<'_>) -> T) -> T {
        let options = TranslateOptions::default();
        let mut ctx = TranslateContext::new(&options);
        body(&mut ctx)
    }

    #[test]
    fn boolean_calls_map_both_directions() {
        with_ctx(|ctx| {
            assert_eq!(PUBLIC.render(ctx, &element(r#"<service public="1"/>"#)), "\n->public()");
            assert_eq!(PUBLIC.render(ctx, &element(r#"<service public="0"/>"#)), "\n->private()");
            assert_eq!(SHARED.render(ctx, &element(r#"<service shared="false"/>"#)), "\n->share(false)");
            assert_eq!(AUTOWIRE.render(ctx, &element(r#"<service autowire="yes"/>"#)), "");
            assert_eq!(ABSTRACT.render(ctx, &element("<service/>")), "");
        });
    }

    #[test]
    fn every_boolean_call_handles_all_spellings() {
        let calls = [
            (SHARED, "->share()", "->share(false)"),
            (PUBLIC, "->public()", "->private()"),
            (SYNTHETIC, "->synthetic()", "->synthetic(false)"),
            (ABSTRACT, "->abstract()", "->abstract(false)"),
            (AUTOWIRE, "->autowire()", "->autowire(false)"),
            (AUTOCONFIGURE, "->autoconfigure()", "->autoconfigure(false)"),
        ];
        with_ctx(|ctx| {
            for (call, enable, disable) in calls {
                for (value, expected) in [
                    ("true", format!("\n{}", enable)),
                    ("1", format!("\n{}", enable)),
                    ("false", format!("\n{}", disable)),
                    ("0", format!("\n{}", disable)),
                    ("yes", String::new()),
                ] {
                    let node = element(&format!(r#"<service {}="{}"/>"#, call.attribute, value));
                    assert_eq!(
                        call.render(ctx, &node),
                        expected,
                        "{}=\"{}\"",
                        call.attribute,
                        value
                    );
                }
                assert_eq!(call.render(ctx, &element("<service/>")), "");
            }
        });
    }

    #[test]
    fn lazy_accepts_interface_hint() {
        with_ctx(|ctx| {
            assert_eq!(lazy_call(ctx, &element(r#"<service lazy="true"/>"#)), "\n->lazy()");
            assert_eq!(lazy_call(ctx, &element(r#"<service lazy="0"/>"#)), "\n->lazy(false)");
            assert_eq!(
                lazy_call(ctx, &element(r#"<service lazy="App\LoggerInterface"/>"#)),
                "\n->lazy('App\\LoggerInterface')"
            );
        });
    }

    #[test]
    fn decorate_omits_trailing_defaults() {
        with_ctx(|ctx| {
            assert_eq!(
                decorate_call(ctx, &element(r#"<service decorates="mailer"/>"#)).expect("ok"),
                "\n->decorate('mailer')"
            );
            assert_eq!(
                decorate_call(
                    ctx,
                    &element(r#"<service decorates="mailer" decoration-priority="0"/>"#)
                )
                .expect("ok"),
                "\n->decorate('mailer')"
            );
            assert_eq!(
                decorate_call(
                    ctx,
                    &element(r#"<service decorates="mailer" decoration-priority="5"/>"#)
                )
                .expect("ok"),
                "\n->decorate('mailer', null, 5)"
            );
            assert_eq!(
                decorate_call(
                    ctx,
                    &element(r#"<service decorates="mailer" decoration-on-invalid="ignore"/>"#)
                )
                .expect("ok"),
                "\n->decorate('mailer', null, 0, \\Symfony\\Component\\DependencyInjection\\ContainerInterface::IGNORE_ON_INVALID_REFERENCE)"
            );
            assert_eq!(
                decorate_call(
                    ctx,
                    &element(r#"<service decorates="m" decoration-inner-name="m.inner"/>"#)
                )
                .expect("ok"),
                "\n->decorate('m', 'm.inner')"
            );
            assert_eq!(
                decorate_call(
                    ctx,
                    &element(
                        r#"<service decorates="m" decoration-inner-name="" decoration-priority="5"/>"#
                    )
                )
                .expect("ok"),
                "\n->decorate('m', null, 5)"
            );
            assert_eq!(
                decorate_call(
                    ctx,
                    &element(r#"<service decorates="m" decoration-priority="high"/>"#)
                )
                .expect_err("non-integer priority")
                .code,
                "XML_ATTR_INT_INVALID"
            );
        });
    }

    #[test]
    fn callable_forms_in_priority_order() {
        with_ctx(|ctx| {
            assert_eq!(
                callable_call(
                    ctx,
                    &element(r#"<factory class="App\Factory" method="create"/>"#),
                    CallableKind::Factory
                )
                .expect("ok"),
                "\n->factory(['App\\Factory', 'create'])"
            );
            assert_eq!(
                callable_call(
                    ctx,
                    &element(r#"<factory service="factory" method="make"/>"#),
                    CallableKind::Factory
                )
                .expect("ok"),
                "\n->factory([service('factory'), 'make'])"
            );
            assert_eq!(
                callable_call(
                    ctx,
                    &element(r#"<configurator function="configure_it"/>"#),
                    CallableKind::Configurator
                )
                .expect("ok"),
                "\n->configurator('configure_it')"
            );
            assert_eq!(
                callable_call(
                    ctx,
                    &element(r#"<factory method="create"><service id="builder"/></factory>"#),
                    CallableKind::Factory
                )
                .expect("ok"),
                "\n->factory([service('builder'), 'create'])"
            );
            assert_eq!(
                callable_call(ctx, &element("<factory/>"), CallableKind::Factory)
                    .expect_err("no form")
                    .code,
                "FACTORY_INVALID"
            );
            assert_eq!(
                callable_call(ctx, &element("<configurator/>"), CallableKind::Configurator)
                    .expect("optional"),
                ""
            );
        });
    }

    #[test]
    fn method_call_with_arguments_and_clone_flag() {
        with_ctx(|ctx| {
            assert_eq!(
                method_call(
                    ctx,
                    &element(r#"<call method="setLogger"><argument type="service" id="logger"/></call>"#)
                )
                .expect("ok"),
                "\n->call('setLogger', [service('logger')])"
            );
            assert_eq!(
                method_call(ctx, &element(r#"<call method="withX" returns-clone="true"/>"#))
                    .expect("ok"),
                "\n->call('withX', returnsClone: true)"
            );
        });
    }

    #[test]
    fn tag_attributes_keep_order_and_normalize_dashes() {
        with_ctx(|ctx| {
            assert_eq!(
                tag_call(
                    ctx,
                    &element(r#"<tag name="kernel.event_listener" event="kernel.request" priority="10" method-name="on"/>"#),
                    false
                )
                .expect("ok"),
                "\n->tag('kernel.event_listener', ['event' => 'kernel.request', 'priority' => 10, 'method_name' => 'on'])"
            );
            assert_eq!(
                tag_call(ctx, &element(r#"<tag a-b="1" a_b="2">app.tag</tag>"#), false).expect("ok"),
                "\n->tag('app.tag', ['a-b' => 1, 'a_b' => 2])"
            );
            assert_eq!(
                tag_call(ctx, &element(r#"<resource-tag name="app.resource"/>"#), true).expect("ok"),
                "\n->resourceTag('app.resource')"
            );
        });
    }

    #[test]
    fn tag_nested_attributes_override_in_place() {
        with_ctx(|ctx| {
            assert_eq!(
                tag_call(
                    ctx,
                    &element(r#"<tag name="t" a="1" b="2"><attribute name="a">x</attribute><attribute name="c"><attribute name="d">true</attribute></attribute></tag>"#),
                    false
                )
                .expect("ok"),
                "\n->tag('t', ['a' => 'x', 'b' => 2, 'c' => ['d' => true]])"
            );
        });
    }

    #[test]
    fn tag_name_must_not_be_empty() {
        with_ctx(|ctx| {
            let error = tag_call(ctx, &element(r#"<tag name=""/>"#), false).expect_err("empty");
            assert_eq!(error.code, "TAG_NAME_EMPTY");
            let error = tag_call(ctx, &element("<tag/>"), false).expect_err("missing");
            assert_eq!(error.code, "TAG_NAME_EMPTY");
        });
    }

    #[test]
    fn property_bind_and_deprecate() {
        with_ctx(|ctx| {
            assert_eq!(
                keyed_value_call(ctx, &element(r#"<bind key="$debug">%kernel.debug%</bind>"#), "bind")
                    .expect("ok"),
                "\n->bind('$debug', '%kernel.debug%')"
            );
            assert_eq!(
                keyed_value_call(ctx, &element(r#"<property name="logger" type="service" id="logger"/>"#), "property")
                    .expect("ok"),
                "\n->property('logger', service('logger'))"
            );
            assert_eq!(
                deprecate_call(
                    ctx,
                    &element(r#"<deprecated package="acme/pkg" version="1.2"> The "%service_id%" is deprecated. </deprecated>"#)
                )
                .expect("ok"),
                "\n->deprecate('acme/pkg', '1.2', 'The \"%service_id%\" is deprecated.')"
            );
            assert_eq!(
                deprecate_call(ctx, &element(r#"<deprecated version="1.2">x</deprecated>"#))
                    .expect_err("package missing")
                    .code,
                "XML_MISSING_ATTR"
            );
        });
    }
}
