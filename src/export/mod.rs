mod backup;
mod csv_export;

pub(crate) use backup::{
    default_backup_name, parse_backup, read_backup, render_backup, restore, write_backup, Backup,
};
pub(crate) use csv_export::{default_csv_name, export_month, write_rows};
