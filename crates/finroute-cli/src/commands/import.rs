//! Import command

use crate::app::{ImportArgs, OutputFormat};
use crate::output::format_import;
use anyhow::Result;
use finroute_core::{Collection, Config, Database};

pub async fn run(args: ImportArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let db = Database::open(&config.database_path)?;
    db.initialize()?;

    let counts = match args.collection {
        Some(name) => {
            let collection: Collection = name.parse()?;
            let count = db.import_csv(collection, collection.source_path(&config.datasets))?;
            vec![(collection, count)]
        }
        None => db.import_all(&config.datasets)?,
    };

    print!("{}", format_import(&counts, format));
    Ok(())
}
