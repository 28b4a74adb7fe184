use tracing::{debug, trace};
use xp_core::ConvertError;
use xp_parser::{XmlDocument, XmlElementNode, XmlNode};

use crate::emitter::TranslateContext;
use crate::options::TranslateOptions;
use crate::section::{translate_imports, translate_parameters, translate_services, translate_when};

pub const SERVICES_NAMESPACE: &str = "http://symfony.com/schema/dic/services";

const SCRIPT_PROLOGUE: &str = "<?php\n\nnamespace Symfony\\Component\\DependencyInjection\\Loader\\Configurator;\n\nreturn static function (ContainerConfigurator $container) {";
const SCRIPT_EPILOGUE: &str = "\n};\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TopLevel {
    Imports,
    Parameters,
    Services,
    When,
}

impl TopLevel {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "imports" => Some(Self::Imports),
            "parameters" => Some(Self::Parameters),
            "services" => Some(Self::Services),
            "when" => Some(Self::When),
            _ => None,
        }
    }
}

/// Renders a parsed services document as a complete configurator script.
pub fn translate(
    document: &XmlDocument,
    options: &TranslateOptions,
) -> Result<String, ConvertError> {
    validate_root(&document.root)?;
    ensure_schema_elements(&document.root)?;
    debug!(
        known_classes = options.known_classes.len(),
        max_nesting = options.max_nesting,
        "translating services document"
    );

    let mut ctx = TranslateContext::new(options);
    let mut out = String::from(SCRIPT_PROLOGUE);
    out.push_str(&ctx.indented(|ctx| {
        let mut body = format!(
            "{nl}$services = $container->services();{nl}$parameters = $container->parameters();",
            nl = ctx.nl()
        );
        body.push_str(&translate_nodes(ctx, &document.root)?);
        Ok(body)
    })?);
    out.push_str(SCRIPT_EPILOGUE);
    Ok(out)
}

/// Top-level children of `<container>` or `<when>`, comments included.
pub(crate) fn translate_nodes(
    ctx: &mut TranslateContext<'_>,
    node: &XmlElementNode,
) -> Result<String, ConvertError> {
    let mut out = String::new();
    for child in &node.children {
        match child {
            XmlNode::Comment(comment) => out.push_str(&ctx.comment(&comment.value)),
            XmlNode::Text(_) => {}
            XmlNode::Element(element) => {
                let Some(section) = TopLevel::from_name(&element.name) else {
                    return Err(ConvertError::with_span(
                        "ELEMENT_UNSUPPORTED",
                        format!(
                            "Element <{}> is not supported inside <{}>.",
                            element.name, node.name
                        ),
                        element.location.clone(),
                    ));
                };
                trace!(section = %element.name, line = element.location.start.line, "section");
                out.push_str(&match section {
                    TopLevel::Imports => translate_imports(ctx, element)?,
                    TopLevel::Parameters => translate_parameters(ctx, element)?,
                    TopLevel::Services => translate_services(ctx, element)?,
                    TopLevel::When => translate_when(ctx, element)?,
                });
            }
        }
    }
    Ok(out)
}

/// Every element under the root, at any depth, must come from the services
/// schema. Checked up front so no section treats a foreign element with a
/// familiar local name as its own.
fn ensure_schema_elements(root: &XmlElementNode) -> Result<(), ConvertError> {
    let mut pending = root.element_children().collect::<Vec<_>>();
    pending.reverse();
    while let Some(node) = pending.pop() {
        ensure_services_namespace(node)?;
        let children = node.element_children().collect::<Vec<_>>();
        pending.extend(children.into_iter().rev());
    }
    Ok(())
}

/// Elements from other namespaces belong to container extensions.
fn ensure_services_namespace(node: &XmlElementNode) -> Result<(), ConvertError> {
    match node.namespace.as_deref() {
        None => Ok(()),
        Some(namespace) if namespace == SERVICES_NAMESPACE => Ok(()),
        Some(namespace) => Err(ConvertError::with_span(
            "EXTENSION_UNSUPPORTED",
            format!(
                "Element <{}> from namespace \"{}\" belongs to a container extension and cannot be translated.",
                node.name, namespace
            ),
            node.location.clone(),
        )),
    }
}

fn validate_root(root: &XmlElementNode) -> Result<(), ConvertError> {
    if root.name != "container" {
        return Err(ConvertError::with_span(
            "XML_ROOT_INVALID",
            format!("Root element must be <container>, found <{}>.", root.name),
            root.location.clone(),
        ));
    }

    let declared = root.namespace.as_deref() == Some(SERVICES_NAMESPACE)
        || root
            .namespaces
            .iter()
            .any(|declaration| declaration.uri == SERVICES_NAMESPACE)
        || root.attributes.iter().any(|attribute| {
            attribute.name == "schemaLocation" && attribute.value.contains(SERVICES_NAMESPACE)
        });
    if !declared {
        return Err(ConvertError::with_span(
            "NAMESPACE_INVALID",
            format!(
                "<container> must declare the \"{}\" namespace.",
                SERVICES_NAMESPACE
            ),
            root.location.clone(),
        ));
    }
    Ok(())
}
