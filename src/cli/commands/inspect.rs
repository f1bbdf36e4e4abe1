//! The `inspect` command
//!
//! Prints the block layout, units, fixed column and settings of a Keithley
//! spreadsheet export, or the dataset listing of a bundle.

use super::shared::{format_shape, setup_logging};
use crate::cli::args::InspectArgs;
use crate::container::bundle;
use crate::models::SettingValue;
use crate::reshape::reshape;
use crate::spreadsheet::{Workbook, sanitize_attribute_name, unit_for_column};

use anyhow::Context;
use colored::*;
use std::path::Path;

const WORKBOOK_EXTENSIONS: &[&str] = &["xls", "xlsx", "xlsm", "xlsb", "ods"];

pub async fn run_inspect(args: InspectArgs) -> anyhow::Result<()> {
    setup_logging(args.get_log_level(), false);

    let is_workbook = args
        .file
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.contains(&ext.as_str()));

    if is_workbook {
        inspect_workbook(&args.file)
    } else {
        inspect_bundle(&args.file)
    }
}

fn inspect_workbook(path: &Path) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut workbook = Workbook::from_bytes(path.display().to_string(), bytes)?;

    println!("{}", path.display().to_string().bright_green().bold());
    println!(
        "  {} {}",
        "Worksheets:".bright_cyan(),
        workbook.sheet_names().join(", ")
    );

    match workbook.data_table()? {
        None => println!("  {}", "No data rows".bright_yellow()),
        Some(table) => {
            let reshaped = reshape(&table)?;
            let layout = &reshaped.layout;
            println!(
                "  {} {} samples x {} blocks",
                "Layout:".bright_cyan(),
                layout.samples_per_column.to_string().bright_white().bold(),
                layout.number_of_blocks.to_string().bright_white().bold()
            );
            for name in &layout.base_names {
                let unit = unit_for_column(name).unwrap_or("?");
                println!("    {} [{}]", name, unit);
            }
            match &reshaped.fixed {
                Some(fixed) => println!(
                    "  {} {} from {} to {} (step {})",
                    "Fixed column:".bright_cyan(),
                    fixed.name.bright_white().bold(),
                    fixed.min,
                    fixed.max,
                    fixed.delta
                ),
                None => println!("  {} none", "Fixed column:".bright_cyan()),
            }
        }
    }

    let settings = workbook.settings()?;
    println!("  {} {}", "Settings:".bright_cyan(), settings.len());
    for (name, value) in settings.iter() {
        match value {
            SettingValue::Text(text) => println!(
                "    {} = {} {}",
                name,
                text,
                format!("-> {}", sanitize_attribute_name(name)).dimmed()
            ),
            SettingValue::Number(number) => println!("    {} = {}", name, number),
            SettingValue::List(cells) => println!(
                "    {} = [{}]",
                name,
                cells
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    Ok(())
}

fn inspect_bundle(path: &Path) -> anyhow::Result<()> {
    let container = bundle::open(path)
        .with_context(|| format!("Failed to open bundle {}", path.display()))?;

    println!("{}", path.display().to_string().bright_green().bold());
    println!(
        "  {} {}",
        "Datasets:".bright_cyan(),
        container.len().to_string().bright_white().bold()
    );

    for dataset in container.datasets() {
        println!(
            "  {} {}",
            dataset.name.bright_white().bold(),
            format_shape(dataset.data.shape())
        );
        let fields = dataset
            .data
            .fields()
            .iter()
            .map(|field| format!("{}: {}", field.name, field.data.field_type()))
            .collect::<Vec<_>>()
            .join(", ");
        println!("    {} {}", "fields".dimmed(), fields);
        for (key, value) in dataset.attributes.iter() {
            println!("    {} = {}", key, value);
        }
    }

    Ok(())
}
