//! Command-line interface for fhir-childmatch

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use std::sync::Arc;

#[cfg(feature = "cli")]
use childmatch::loaders::Loader;
#[cfg(feature = "cli")]
use childmatch::{
    harvest, match_children, DefinitionCursor, Document, ElementDefinitionNavigator, ElementNode,
    Error, InstanceRef, MatchReport, Result, StructureDefinition,
};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "childmatch")]
#[command(author, version, about = "Match FHIR instance children to profile declarations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the distinct children declared below a definition element
    Harvest {
        /// Path to the StructureDefinition (JSON)
        #[arg(value_name = "DEFINITION")]
        definition: PathBuf,

        /// Element path to harvest (defaults to the root)
        #[arg(short, long)]
        path: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Match the children of an instance against a definition element
    Match {
        /// Path to the StructureDefinition (JSON)
        #[arg(value_name = "DEFINITION")]
        definition: PathBuf,

        /// Path to the instance (FHIR XML, or the element-tree JSON form)
        #[arg(value_name = "INSTANCE")]
        instance: PathBuf,

        /// Element path to match the instance root against (defaults to the root)
        #[arg(short, long)]
        path: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,

        /// Descend into matched children that have inline definitions
        #[arg(short, long)]
        recursive: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Harvest {
            definition,
            path,
            json,
        } => cmd_harvest(definition, path, json).map(|_| true),
        Commands::Match {
            definition,
            instance,
            path,
            json,
            recursive,
        } => cmd_match(definition, instance, path, json, recursive),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "cli")]
fn open_definition(path: &Path, element: Option<&str>) -> Result<ElementDefinitionNavigator> {
    let definition = Arc::new(StructureDefinition::from_file(path)?);
    let mut nav = ElementDefinitionNavigator::new(definition);
    if let Some(element) = element {
        if !nav.move_to_path(element) {
            return Err(Error::Definition(format!(
                "element '{}' not found in '{}'",
                element,
                path.display()
            )));
        }
    }
    Ok(nav)
}

#[cfg(feature = "cli")]
fn open_instance(path: &Path) -> Result<ElementNode> {
    let document = if path.extension().is_some_and(|ext| ext == "json") {
        Document::from_json(&Loader::new().load(path)?)?
    } else {
        Document::from_file(path)?
    };
    document
        .root
        .ok_or_else(|| Error::Xml(format!("'{}' has no root element", path.display())))
}

#[cfg(feature = "cli")]
fn cmd_harvest(definition: PathBuf, path: Option<String>, json: bool) -> Result<()> {
    let mut nav = open_definition(&definition, path.as_deref())?;
    let declared = harvest(&mut nav)?;

    if json {
        let entries: Vec<serde_json::Value> = declared
            .iter()
            .map(|d| {
                serde_json::json!({
                    "slot": d.slot(),
                    "name": d.path_name(),
                    "path": d.cursor().path(),
                    "valueConstraint": d.is_value_constraint(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("{}", nav.path());
        for d in &declared {
            let marker = if d.is_value_constraint() { " (value)" } else { "" };
            println!("  [{}] {}{}", d.slot(), d.path_name(), marker);
        }
    }

    Ok(())
}

/// Returns whether every instance child was matched
#[cfg(feature = "cli")]
fn cmd_match(
    definition: PathBuf,
    instance: PathBuf,
    path: Option<String>,
    json: bool,
    recursive: bool,
) -> Result<bool> {
    let mut nav = open_definition(&definition, path.as_deref())?;
    let root = open_instance(&instance)?;

    let mut reports = Vec::new();
    let label = nav.path().to_string();
    collect_reports(&mut nav, &root, label, recursive, &mut reports)?;

    if json {
        if recursive {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        } else {
            println!("{}", reports[0].to_json_pretty()?);
        }
    } else {
        for report in &reports {
            print!("{}", report);
        }
    }

    Ok(reports.iter().all(|r| r.unmatched.is_empty()))
}

#[cfg(feature = "cli")]
fn collect_reports(
    nav: &mut ElementDefinitionNavigator,
    node: &ElementNode,
    label: String,
    recursive: bool,
    reports: &mut Vec<MatchReport>,
) -> Result<()> {
    let result = match_children(nav, node)?;
    reports.push(MatchReport::from_result(&result).with_path(label.clone()));

    if !recursive {
        return Ok(());
    }

    for m in &result.matches {
        let mut child_nav = m.declared.cursor().shallow_copy();
        if !child_nav.has_children() {
            continue;
        }
        for instance in &m.instances {
            if let InstanceRef::Child(child) = instance {
                let child_label = format!("{}.{}[{}]", label, child.node.name, child.position);
                collect_reports(&mut child_nav, child.node, child_label, true, reports)?;
            }
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI support not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
