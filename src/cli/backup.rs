use std::path::{Path, PathBuf};

use rusqlite::backup::Backup;

use crate::db::{get_connection, DB_FILE};
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::{get_data_dir, shellexpand_path};

/// Copy the live database to `dest` using SQLite's online backup API.
pub fn backup_to(db_path: &Path, dest: &Path) -> Result<u64> {
    let conn = get_connection(db_path)?;
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut dest_conn = rusqlite::Connection::open(dest)?;
    let backup = Backup::new(&conn, &mut dest_conn)?;
    backup.run_to_completion(100, std::time::Duration::from_millis(10), None)?;
    drop(backup);
    Ok(std::fs::metadata(dest)?.len())
}

pub fn run(output: Option<String>) -> Result<()> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join(DB_FILE);

    let dest_path = match output {
        Some(p) => PathBuf::from(shellexpand_path(&p)),
        None => {
            let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
            data_dir.join("backups").join(format!("penny-{stamp}.db"))
        }
    };

    let size = backup_to(&db_path, &dest_path)?;
    println!("Backup saved to {}", dest_path.display());
    println!("Size: {}", format_bytes(size));
    Ok(())
}
