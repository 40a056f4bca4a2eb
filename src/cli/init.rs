use crate::db::{get_connection, init_db, set_metadata};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path, Settings};

pub fn run(data_dir: Option<String>, company: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    let defaults = Settings::default();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    } else if std::env::var_os("OPSDESK_DATA_DIR").is_none()
        && settings.data_dir == defaults.data_dir
    {
        // First run — prompt for data dir
        let default = &settings.data_dir;
        println!("Data directory [{}]: ", default);
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok();
        let chosen = input.trim();
        if !chosen.is_empty() {
            settings.data_dir = shellexpand_path(chosen);
        }
    }

    save_settings(&settings)?;

    let resolved = crate::settings::get_data_dir();
    std::fs::create_dir_all(&resolved)?;
    std::fs::create_dir_all(resolved.join("imports"))?;
    std::fs::create_dir_all(resolved.join("backups"))?;

    let conn = get_connection(&resolved.join("opsdesk.db"))?;
    init_db(&conn)?;

    if let Some(company) = company {
        set_metadata(&conn, "company_name", &company)?;
    }

    println!("Initialized opsdesk at {}", resolved.display());
    Ok(())
}
