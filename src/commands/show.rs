//! Implementation of the `prompty show` command.
//!
//! Displays the resolved metadata, model binding and content of a definition.

use crate::cli::ShowArgs;
use prompty::definition::PropertySettings;
use prompty::{Content, Prompty, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Execute the `prompty show` command.
pub fn cmd_show(args: ShowArgs) -> Result<()> {
    let prompty = prompty::load(&args.file, &args.connection)?;

    if args.json {
        println!("{:#}", prompty.to_safe_value());
        return Ok(());
    }

    let title = if prompty.name.is_empty() {
        prompty.file.display().to_string()
    } else {
        prompty.name.clone()
    };

    println!("================================================================================");
    println!("{}", title);
    println!("================================================================================");
    println!();

    if !prompty.description.is_empty() {
        println!("Description: {}", prompty.description);
    }
    if !prompty.version.is_empty() {
        println!("Version:     {}", prompty.version);
    }
    print_set("Authors:", &prompty.authors);
    print_set("Tags:", &prompty.tags);
    if let Some(base) = &prompty.base {
        println!("Base:        {}", base);
    }
    println!("File:        {}", prompty.file.display());

    print_model(&prompty);

    println!();
    println!("Template:");
    println!("  Format:    {}", prompty.template.format);
    println!("  Parser:    {}", prompty.template.parser);

    print_properties("Inputs:", &prompty.inputs);
    print_properties("Outputs:", &prompty.outputs);

    if !prompty.tools.is_empty() {
        println!();
        println!("Tools:");
        for tool in &prompty.tools {
            println!("  {} ({})", tool.name, tool.kind);
        }
    }

    println!();
    println!("--------------------------------------------------------------------------------");
    match &prompty.content {
        Content::Text(text) => println!("{}", text.trim_end()),
        other => println!("{:#}", other.to_value()),
    }

    Ok(())
}

fn print_set(label: &str, items: &BTreeSet<String>) {
    if !items.is_empty() {
        let items: Vec<&str> = items.iter().map(String::as_str).collect();
        println!("{:<12} {}", label, items.join(", "));
    }
}

fn print_model(prompty: &Prompty) {
    let model = &prompty.model;
    println!();
    println!("Model:");
    if !model.api.is_empty() {
        println!("  Api:       {}", model.api);
    }
    for (label, settings) in [
        ("Configuration", &model.configuration),
        ("Parameters", &model.parameters),
        ("Response", &model.response),
    ] {
        if settings.is_empty() {
            continue;
        }
        println!("  {}:", label);
        for (key, value) in settings {
            println!("    {}: {}", key, value);
        }
    }
}

fn print_properties(label: &str, properties: &BTreeMap<String, PropertySettings>) {
    if properties.is_empty() {
        return;
    }

    println!();
    println!("{}", label);
    for (name, property) in properties {
        let kind = property.kind.map_or("any", |kind| kind.as_str());
        let mut line = format!("  {} ({})", name, kind);
        if let Some(default) = &property.default {
            line.push_str(&format!(" default={}", default));
        }
        if let Some(sample) = &property.sample {
            line.push_str(&format!(" sample={}", sample));
        }
        println!("{}", line);
        if !property.description.is_empty() {
            println!("      {}", property.description);
        }
    }
}
