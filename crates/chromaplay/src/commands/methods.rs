//! `methods list` / `methods show`: offline registry browsing.

use std::fmt::Write as _;

use tabled::Tabled;

use chromaplay_core::{ApiMethod, ApiParameter, CoreError, registry};

use crate::cli::{GlobalOpts, MethodsArgs, MethodsCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct MethodRow {
    #[tabled(rename = "ID")]
    id: &'static str,
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Collection")]
    collection: &'static str,
    #[tabled(rename = "Description")]
    description: &'static str,
}

impl From<&&ApiMethod> for MethodRow {
    fn from(m: &&ApiMethod) -> Self {
        Self {
            id: m.id.as_str(),
            category: m.category.title(),
            collection: if m.requires_collection { "required" } else { "" },
            description: m.description,
        }
    }
}

#[derive(Tabled)]
struct ParamRow {
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Required")]
    required: &'static str,
    #[tabled(rename = "Description")]
    description: &'static str,
}

impl From<&ApiParameter> for ParamRow {
    fn from(p: &ApiParameter) -> Self {
        Self {
            name: p.name,
            kind: p.param_type.to_string(),
            required: if p.required { "yes" } else { "no" },
            description: p.description,
        }
    }
}

pub fn handle(args: &MethodsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        MethodsCommand::List { category } => {
            let methods: Vec<&ApiMethod> = match category {
                Some(c) => registry::by_category(c),
                None => registry::all().iter().collect(),
            };
            let out = output::render_list(global.format(), &methods, |m| MethodRow::from(m), |m| {
                m.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
        MethodsCommand::Show { ref id } => {
            let method =
                registry::by_id(id).ok_or_else(|| CoreError::UnknownMethod(id.clone()))?;
            let out = output::render_single(global.format(), method, detail, |m| m.example_json());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

fn detail(m: &ApiMethod) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", m.name);
    let _ = writeln!(out, "{}", m.description);
    let _ = writeln!(out);
    let _ = writeln!(out, "Category:   {}", m.category.title());
    let _ = writeln!(
        out,
        "Collection: {}",
        if m.requires_collection {
            "required (select one with --collection)"
        } else {
            "not required"
        }
    );

    if !m.parameters.is_empty() {
        let rows: Vec<ParamRow> = m.parameters.iter().map(ParamRow::from).collect();
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}",
            tabled::Table::new(rows).with(tabled::settings::Style::rounded())
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Example:");
    let _ = write!(out, "{}", m.example_json());
    out
}

#[cfg(test)]
mod tests {
    use chromaplay_core::MethodId;

    use super::*;

    #[test]
    fn detail_lists_parameters_and_example() {
        let text = detail(registry::get(MethodId::Query));
        assert!(text.starts_with("query\n"));
        assert!(text.contains("queryTexts"));
        assert!(text.contains("Example:"));
        assert!(text.contains("required (select one with --collection)"));
    }

    #[test]
    fn rows_mark_scoped_methods() {
        let count = registry::get(MethodId::Count);
        assert_eq!(MethodRow::from(&count).collection, "required");
        let version = registry::get(MethodId::Version);
        assert_eq!(MethodRow::from(&version).collection, "");
    }
}
