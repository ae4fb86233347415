use crate::settings;
use anyhow::Result;
use comfy_table::Table;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let settings = settings::load(config_path)?;

    let mut table = Table::new();
    table.set_header(vec!["TASK", "TEMPLATE", "INJECTION", "SHAPE"]);

    for (name, task) in &settings.tasks {
        let shape = settings
            .catalog
            .descriptor(&task.template)
            .point(&task.injection)
            .map(|point| point.shape.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            name.as_str(),
            task.template.as_str(),
            task.injection.as_str(),
            shape.as_str(),
        ]);
    }

    println!("{}", table);
    Ok(())
}
