//! Renders a [`CompanionDocument`] as C#.

use super::descriptor::{ACTION_KEY, AREA_KEY, HANDLER_KEY};
use super::names::{global_name, string_literal, verbatim_identifier};
use super::synthesizer::{
    ActionSurface, Completion, CompanionDocument, DescriptorType, HandlerSurface, LinkTree,
};
use crate::analysis::{Parameter, ParameterModifier};
use crate::errors::Result;
use std::fmt::Display;
use std::io::Write;

const INDENT: &str = "    ";
const DEFAULT_BINDER: &str = "ActionRouteBinder.Bind";
const LIST: &str = "global::System.Collections.Generic.List";
const PAIR: &str = "global::System.Collections.Generic.KeyValuePair<string, object>";
const DICTIONARY: &str = "global::System.Collections.Generic.Dictionary<string, object>";
const DESCRIPTOR_LOCAL: &str = "__descriptor";
const GENERATED_CODE: &str = "global::System.CodeDom.Compiler.GeneratedCode";
const NON_USER_CODE: &str = "global::System.Diagnostics.DebuggerNonUserCode";

/// Render the whole companion document.
pub fn render(doc: &CompanionDocument) -> Result<String> {
    let mut buffer = Vec::new();
    CSharpWriter::new(&mut buffer).write_document(doc)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub struct CSharpWriter<W: Write> {
    writer: W,
    depth: usize,
}

impl<W: Write> CSharpWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, depth: 0 }
    }

    fn line(&mut self, text: impl Display) -> std::io::Result<()> {
        let text = text.to_string();
        if text.is_empty() {
            writeln!(self.writer)
        } else {
            writeln!(self.writer, "{}{}", INDENT.repeat(self.depth), text)
        }
    }

    fn blank(&mut self) -> std::io::Result<()> {
        writeln!(self.writer)
    }

    fn open(&mut self, header: impl Display) -> std::io::Result<()> {
        self.line(header)?;
        self.line("{")?;
        self.depth += 1;
        Ok(())
    }

    fn close(&mut self) -> std::io::Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.line("}")
    }

    pub fn write_document(&mut self, doc: &CompanionDocument) -> std::io::Result<()> {
        self.write_header(&doc.usings)?;

        let mut start = 0;
        while start < doc.handlers.len() {
            let namespace = &doc.handlers[start].namespace;
            let end = doc.handlers[start..]
                .iter()
                .position(|h| h.namespace != *namespace)
                .map_or(doc.handlers.len(), |offset| start + offset);

            self.blank()?;
            self.in_namespace(namespace, |w| {
                for (i, handler) in doc.handlers[start..end].iter().enumerate() {
                    if i > 0 {
                        w.blank()?;
                    }
                    w.write_handler(handler, doc)?;
                }
                Ok(())
            })?;
            start = end;
        }

        self.blank()?;
        self.in_namespace(&doc.namespace, |w| {
            w.write_registry(doc)?;
            w.blank()?;
            w.write_descriptor(&doc.descriptor)?;
            if doc.descriptor.binding_helper == DEFAULT_BINDER {
                w.blank()?;
                w.write_default_binder(&doc.descriptor)?;
            }
            if let Some(links) = &doc.links {
                w.blank()?;
                w.write_links(links)?;
            }
            Ok(())
        })?;
        self.writer.flush()
    }

    fn in_namespace(
        &mut self,
        namespace: &str,
        body: impl FnOnce(&mut Self) -> std::io::Result<()>,
    ) -> std::io::Result<()> {
        if namespace.is_empty() {
            return body(self);
        }
        self.open(format_args!("namespace {}", namespace))?;
        body(self)?;
        self.close()
    }

    fn write_header(&mut self, usings: &[String]) -> std::io::Result<()> {
        let header = [
            "// <auto-generated>",
            "//     This code was generated by actionmap.",
            "//     Changes to this file will be lost when it is regenerated.",
            "// </auto-generated>",
            "#nullable disable",
            "#pragma warning disable 1591",
        ];
        header.iter().try_for_each(|line| self.line(line))?;

        if !usings.is_empty() {
            self.blank()?;
            usings
                .iter()
                .try_for_each(|using| self.line(format_args!("using {};", using)))?;
        }
        Ok(())
    }

    /// Tool attributes on a generated member.
    fn write_generated_attributes(&mut self) -> std::io::Result<()> {
        self.line(format_args!(
            "[{}({}, {}), {}]",
            GENERATED_CODE,
            string_literal(env!("CARGO_PKG_NAME")),
            string_literal(env!("CARGO_PKG_VERSION")),
            NON_USER_CODE
        ))
    }

    fn write_handler(
        &mut self,
        handler: &HandlerSurface,
        doc: &CompanionDocument,
    ) -> std::io::Result<()> {
        let interface = qualified(&handler.namespace, &handler.interface_name);

        self.open(format_args!(
            "partial class {} : {}",
            handler.class_name, interface
        ))?;
        let members = &handler.members;
        self.line(format_args!(
            "public const string {} = {};",
            members.area,
            string_literal(&handler.area)
        ))?;
        self.line(format_args!(
            "public const string {} = {};",
            members.name,
            string_literal(&handler.route_name)
        ))?;

        self.blank()?;
        self.write_constants(&members.action_names, &handler.action_names)?;
        if !handler.view_names.is_empty() {
            self.blank()?;
            self.write_constants(&members.view_names, &handler.view_names)?;
        }

        for action in &handler.actions {
            self.blank()?;
            self.write_bridge(action, &interface)?;
        }
        self.close()?;

        self.blank()?;
        self.open(format_args!("public interface {}", handler.interface_name))?;
        for (i, action) in handler.actions.iter().enumerate() {
            if i > 0 {
                self.blank()?;
            }
            self.line(format_args!(
                "{} {}({});",
                action.return_type,
                action.name,
                declare_parameters(&action.parameters, true)
            ))?;
        }
        self.close()?;

        self.blank()?;
        self.write_generated_attributes()?;
        self.open(format_args!(
            "public class {} : {}",
            handler.descriptor_class, interface
        ))?;
        for (i, action) in handler.actions.iter().enumerate() {
            if i > 0 {
                self.blank()?;
            }
            self.write_descriptor_method(action, handler, doc)?;
        }
        self.close()
    }

    fn write_constants(
        &mut self,
        class: &str,
        constants: &[(String, String)],
    ) -> std::io::Result<()> {
        self.open(format_args!("public static class {}", class))?;
        for (ident, value) in constants {
            self.line(format_args!(
                "public const string {} = {};",
                ident,
                string_literal(value)
            ))?;
        }
        self.close()
    }

    /// Explicit implementation forwarding to the live action.
    fn write_bridge(&mut self, action: &ActionSurface, interface: &str) -> std::io::Result<()> {
        let declaration = format!(
            "{} {}.{}({})",
            action.return_type,
            interface,
            action.name,
            declare_parameters(&action.parameters, false)
        );
        let call = format!("{}({})", action.name, call_arguments(&action.parameters));
        self.write_generated_attributes()?;
        if action.is_async() {
            self.line(format_args!("async {} => await {};", declaration, call))
        } else {
            self.line(format_args!("{} => {};", declaration, call))
        }
    }

    fn write_descriptor_method(
        &mut self,
        action: &ActionSurface,
        handler: &HandlerSurface,
        doc: &CompanionDocument,
    ) -> std::io::Result<()> {
        let modifiers = if action.completion == Completion::Async {
            "public virtual async"
        } else {
            "public virtual"
        };
        self.write_generated_attributes()?;
        self.open(format_args!(
            "{} {} {}({})",
            modifiers,
            action.return_type,
            action.name,
            declare_parameters(&action.parameters, true)
        ))?;

        let descriptor = qualified(&doc.namespace, &doc.descriptor.name);
        let class = &handler.qualified_class;
        let members = &handler.members;
        self.line(format_args!(
            "var {} = new {}({}.{}, {}.{}, {}.{}.{});",
            DESCRIPTOR_LOCAL,
            descriptor,
            class,
            members.area,
            class,
            members.name,
            class,
            members.action_names,
            action.name
        ))?;
        for key in &action.template.parameters {
            self.line(format_args!(
                "{}({}, {}, {});",
                doc.descriptor.binding_helper,
                DESCRIPTOR_LOCAL,
                string_literal(key),
                verbatim_identifier(key)
            ))?;
        }
        for parameter in action
            .parameters
            .iter()
            .filter(|p| p.modifier == Some(ParameterModifier::Out))
        {
            self.line(format_args!("{} = default;", parameter.name))?;
        }

        match action.completion {
            Completion::Direct | Completion::Async => {
                self.line(format_args!("return {};", DESCRIPTOR_LOCAL))?
            }
            Completion::Task => self.line(format_args!(
                "return global::System.Threading.Tasks.Task.FromResult<{}>({});",
                action.capability, DESCRIPTOR_LOCAL
            ))?,
            Completion::ValueTask => self.line(format_args!(
                "return new global::System.Threading.Tasks.ValueTask<{}>({});",
                action.capability, DESCRIPTOR_LOCAL
            ))?,
        }
        self.close()
    }

    fn write_registry(&mut self, doc: &CompanionDocument) -> std::io::Result<()> {
        self.open(format_args!("public partial class {}", doc.registry.container))?;
        for entry in doc.registry.entries() {
            self.line(format_args!(
                "public {} {} {{ get; }} = new {}();",
                entry.interface, entry.key, entry.descriptor_class
            ))?;
        }
        self.close()
    }

    fn write_descriptor(&mut self, descriptor: &DescriptorType) -> std::io::Result<()> {
        let list = format!("{}<{}>", LIST, PAIR);
        if descriptor.bases.is_empty() {
            self.open(format_args!("public partial class {}", descriptor.name))?;
        } else {
            self.open(format_args!(
                "public partial class {} : {}",
                descriptor.name,
                descriptor.bases.join(", ")
            ))?;
        }

        self.open(format_args!(
            "public {}(string area, string handlerName, string actionName)",
            descriptor.name
        ))?;
        self.line("Area = area;")?;
        self.line("HandlerName = handlerName;")?;
        self.line("ActionName = actionName;")?;
        self.close()?;

        self.blank()?;
        self.line("public string Area { get; }")?;
        self.line("public string HandlerName { get; }")?;
        self.line("public string ActionName { get; }")?;
        self.line("public string Protocol { get; set; }")?;
        self.line(format_args!(
            "public {} Parameters {{ get; }} = new {}();",
            list, list
        ))?;

        self.blank()?;
        self.open(format_args!("public {} ToRouteValues()", DICTIONARY))?;
        self.line(format_args!("var values = new {}();", DICTIONARY))?;
        self.open("if (!string.IsNullOrEmpty(Area))")?;
        self.line(format_args!("values[{}] = Area;", string_literal(AREA_KEY)))?;
        self.close()?;
        self.line(format_args!(
            "values[{}] = HandlerName;",
            string_literal(HANDLER_KEY)
        ))?;
        self.line(format_args!(
            "values[{}] = ActionName;",
            string_literal(ACTION_KEY)
        ))?;
        self.open("foreach (var parameter in Parameters)")?;
        self.line("values[parameter.Key] = parameter.Value;")?;
        self.close()?;
        self.line("return values;")?;
        self.close()?;

        for stub in &descriptor.stubs {
            self.blank()?;
            for line in stub.lines() {
                self.line(line.trim_end())?;
            }
        }
        self.close()
    }

    fn write_default_binder(&mut self, descriptor: &DescriptorType) -> std::io::Result<()> {
        let class = DEFAULT_BINDER.split('.').next().unwrap_or(DEFAULT_BINDER);
        self.open(format_args!("public static partial class {}", class))?;
        self.open(format_args!(
            "public static void Bind({} descriptor, string name, object value)",
            descriptor.name
        ))?;
        self.line(format_args!(
            "descriptor.Parameters.Add(new {}(name, value));",
            PAIR
        ))?;
        self.close()?;
        self.close()
    }

    fn write_links(&mut self, tree: &LinkTree) -> std::io::Result<()> {
        self.open(format_args!("public static partial class {}", tree.name))?;
        for (ident, url) in &tree.files {
            self.line(format_args!(
                "public const string {} = {};",
                ident,
                string_literal(url)
            ))?;
        }
        for (i, child) in tree.children.iter().enumerate() {
            if i > 0 || !tree.files.is_empty() {
                self.blank()?;
            }
            self.write_links(child)?;
        }
        self.close()
    }
}

fn qualified(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        global_name(name)
    } else {
        global_name(&format!("{}.{}", namespace, name))
    }
}

fn declare_parameters(parameters: &[Parameter], with_defaults: bool) -> String {
    parameters
        .iter()
        .map(|p| {
            let mut out = String::new();
            if let Some(modifier) = p.modifier {
                out.push_str(modifier.as_str());
                out.push(' ');
            }
            out.push_str(&p.qualified_type);
            out.push(' ');
            out.push_str(&p.name);
            if let (true, Some(default)) = (with_defaults, &p.default_value) {
                out.push_str(" = ");
                out.push_str(default);
            }
            out
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn call_arguments(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|p| match p.modifier.and_then(|m| m.call_site()) {
            Some(keyword) => format!("{} {}", keyword, p.name),
            None => p.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(
        name: &str,
        ty: &str,
        modifier: Option<ParameterModifier>,
        default: Option<&str>,
    ) -> Parameter {
        Parameter {
            name: name.into(),
            type_text: ty.into(),
            qualified_type: ty.into(),
            modifier,
            default_value: default.map(str::to_string),
        }
    }

    #[test]
    fn test_parameter_lists() {
        let params = vec![
            param("id", "int", None, None),
            param("page", "int", None, Some("1")),
            param("found", "bool", Some(ParameterModifier::Out), None),
            param("ids", "int[]", Some(ParameterModifier::Params), None),
        ];
        assert_eq!(
            declare_parameters(&params, true),
            "int id, int page = 1, out bool found, params int[] ids"
        );
        assert_eq!(
            declare_parameters(&params, false),
            "int id, int page, out bool found, params int[] ids"
        );
        assert_eq!(call_arguments(&params), "id, page, out found, ids");
    }

    #[test]
    fn test_writer_indents_blocks() {
        let mut buffer = Vec::new();
        {
            let mut writer = CSharpWriter::new(&mut buffer);
            writer.open("namespace A").unwrap();
            writer.open("class B").unwrap();
            writer.line("int c;").unwrap();
            writer.close().unwrap();
            writer.close().unwrap();
        }
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "namespace A\n{\n    class B\n    {\n        int c;\n    }\n}\n"
        );
    }

    #[test]
    fn test_links_without_files_open_on_a_member() {
        let tree = LinkTree {
            name: "Links".into(),
            children: vec![LinkTree {
                name: "css".into(),
                segment: "css".into(),
                files: vec![("site_css".into(), "~/css/site.css".into())],
                children: vec![],
            }],
            ..Default::default()
        };
        let mut buffer = Vec::new();
        CSharpWriter::new(&mut buffer).write_links(&tree).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(!text.contains("\n\n"), "blank line in\n{}", text);
        assert!(text.starts_with("public static partial class Links\n{\n    public static partial class css\n"));
    }

    #[test]
    fn test_global_namespace_not_wrapped() {
        assert_eq!(qualified("", "IHomeActions"), "global::IHomeActions");
        assert_eq!(qualified("Shop", "IHomeActions"), "global::Shop.IHomeActions");
    }
}
