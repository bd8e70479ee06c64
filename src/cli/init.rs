use std::path::PathBuf;

use colored::Colorize;

use crate::db::{get_connection, DB_FILE};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

const SUBDIRS: &[&str] = &["exports", "backups", "receipts"];

pub fn run(data_dir: Option<String>, name: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(name) = name {
        settings.user_name = name.trim().to_string();
    }

    let data_path = PathBuf::from(&settings.data_dir);
    for sub in SUBDIRS {
        std::fs::create_dir_all(data_path.join(sub))?;
    }
    let db_path = data_path.join(DB_FILE);
    let existed = db_path.exists();
    get_connection(&db_path)?;
    save_settings(&settings)?;

    if existed {
        println!("Using existing database at {}", db_path.display());
    } else {
        println!("{} {}", "Created".green().bold(), db_path.display());
    }
    println!("Data directory: {}", data_path.display());
    Ok(())
}
