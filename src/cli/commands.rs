use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ExportFormat};
use crate::cli::error::CliResult;
use crate::cli::output;
use crate::config::Settings;
use crate::display::TreeNodeConvert;
use crate::errors::HierarchyError;
use crate::export;
use crate::sheet::Sheet;
use crate::xlsx::load_xlsx;
use crate::{build_formula_tree, build_position_tree, flatten_tree, formula, HierarchyArena};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;

    match &cli.command {
        Some(Commands::Build {
            source,
            output,
            start_column,
            amount_column,
            descriptions,
        }) => _build(
            &settings,
            source,
            output.as_deref(),
            *start_column,
            *amount_column,
            *descriptions,
        ),
        Some(Commands::Formula {
            source,
            output,
            column,
        }) => _formula(&settings, source, output.as_deref(), column.as_deref()),
        Some(Commands::Flatten {
            tree,
            output,
            format,
            max_levels,
            delimiter,
        }) => _flatten(
            &settings,
            tree,
            output.as_deref(),
            *format,
            *max_levels,
            delimiter.clone(),
        ),
        Some(Commands::Tree { tree }) => _tree(tree),
        Some(Commands::Stats { tree }) => _stats(tree),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

fn load_sheet(source: &Path) -> CliResult<Sheet> {
    let is_xlsx = source
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false);
    let sheet = if is_xlsx {
        load_xlsx(source)?
    } else {
        Sheet::load_csv(source)?
    };
    Ok(sheet)
}

#[instrument(skip(settings))]
fn _build(
    settings: &Settings,
    source: &Path,
    output: Option<&Path>,
    start_column: Option<usize>,
    amount_column: Option<usize>,
    descriptions: bool,
) -> CliResult<()> {
    let mut settings = settings.clone();
    if let Some(start) = start_column {
        settings.start_column = start;
    }
    if let Some(amount) = amount_column {
        settings.amount_column = amount;
    }
    debug!("source: {:?}, settings: {:?}", source, settings);

    let is_csv = source
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(true);
    if descriptions && is_csv {
        output::warning("csv input carries no styles, description detection will not trigger");
    }

    let sheet = load_sheet(source)?;
    let tree = build_position_tree(&sheet, &settings, descriptions);
    emit_tree(&tree, output)
}

#[instrument(skip(settings))]
fn _formula(
    settings: &Settings,
    source: &Path,
    output: Option<&Path>,
    column: Option<&str>,
) -> CliResult<()> {
    let mut settings = settings.clone();
    if let Some(column) = column {
        // The figure column and the formula column are the same physical
        // column; keep the index in sync with the letter.
        settings.formula_column = column.to_string();
        settings.amount_column = formula::column_index(column)?;
    }
    debug!("source: {:?}, settings: {:?}", source, settings);

    let sheet = load_sheet(source)?;
    let tree = build_formula_tree(&sheet, &settings)?;
    emit_tree(&tree, output)
}

fn emit_tree(tree: &HierarchyArena, output: Option<&Path>) -> CliResult<()> {
    let stats = tree.stats();
    match output {
        Some(path) => {
            export::write_tree_json(path, tree)?;
            output::success(&format!(
                "wrote {} nodes ({} roots, {} leaves) to {}",
                stats.total_nodes,
                tree.roots().len(),
                stats.leaf_nodes,
                path.display()
            ));
        }
        None => {
            let body = serde_json::to_string_pretty(&export::tree_to_docs(tree))
                .map_err(HierarchyError::from)?;
            output::info(&body);
        }
    }
    Ok(())
}

#[instrument(skip(settings))]
fn _flatten(
    settings: &Settings,
    tree_path: &Path,
    output: Option<&Path>,
    format: ExportFormat,
    max_levels: Option<usize>,
    delimiter: Option<String>,
) -> CliResult<()> {
    let mut settings = settings.clone();
    if let Some(levels) = max_levels {
        settings.max_levels = levels;
    }
    if let Some(delimiter) = delimiter {
        settings.delimiter = delimiter;
    }

    let tree = export::read_tree_json(tree_path)?;
    let records = flatten_tree(&tree, &settings);

    match (output, format) {
        (Some(path), ExportFormat::Csv) => {
            export::write_leaf_csv(path, &records)?;
            output::success(&format!("wrote {} leaf records to {}", records.len(), path.display()));
        }
        (Some(path), ExportFormat::Json) => {
            export::write_leaf_json(path, &records)?;
            output::success(&format!("wrote {} leaf records to {}", records.len(), path.display()));
        }
        (None, ExportFormat::Csv) => {
            let body = export::leaf_records_to_csv(&records)?;
            output::info(&String::from_utf8_lossy(&body));
        }
        (None, ExportFormat::Json) => {
            let body = serde_json::to_string_pretty(&export::leaf_records_to_json(&records))
                .map_err(HierarchyError::from)?;
            output::info(&body);
        }
    }
    Ok(())
}

#[instrument]
fn _tree(tree_path: &Path) -> CliResult<()> {
    let tree = export::read_tree_json(tree_path)?;
    for rendered in tree.to_tree_strings() {
        output::info(&rendered);
    }
    Ok(())
}

#[instrument]
fn _stats(tree_path: &Path) -> CliResult<()> {
    let tree = export::read_tree_json(tree_path)?;
    let stats = tree.stats();

    output::header(&format!("{}", tree_path.display()));
    output::detail(&format!("total nodes:         {}", stats.total_nodes));
    output::detail(&format!("roots:               {}", tree.roots().len()));
    output::detail(&format!("nodes with children: {}", stats.nodes_with_children));
    output::detail(&format!("nodes with amounts:  {}", stats.nodes_with_amount));
    output::detail(&format!("leaf nodes:          {}", stats.leaf_nodes));
    output::detail(&format!("leaf amount total:   {:.2}", stats.leaf_amount_total));
    output::detail(&format!("max depth:           {}", stats.max_depth));
    Ok(())
}
