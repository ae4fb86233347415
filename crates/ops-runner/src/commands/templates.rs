use crate::settings;
use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table};
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let settings = settings::load(config_path)?;
    let catalog = &settings.catalog;

    let keys = catalog
        .keys()
        .with_context(|| format!("Failed to list templates in {}", catalog.root().display()))?;

    if keys.is_empty() {
        println!("No templates in {}", catalog.root().display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["TEMPLATE", "INJECTION POINTS", "TASKS"]);

    for key in &keys {
        let points = catalog
            .descriptor(key)
            .points
            .iter()
            .map(|point| format!("{} ({})", point.name, point.shape))
            .collect::<Vec<_>>()
            .join("\n");

        let tasks = settings
            .tasks
            .iter()
            .filter(|(_, task)| &task.template == key)
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>();

        let tasks_cell = if tasks.is_empty() {
            Cell::new("-").fg(Color::DarkGrey)
        } else {
            Cell::new(tasks.join("\n"))
        };

        table.add_row(vec![Cell::new(key), Cell::new(points), tasks_cell]);
    }

    println!("{}", table);
    Ok(())
}
