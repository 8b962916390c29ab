use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};

/// One sheet: name, then rows with the header first.
pub type SheetRows<'a> = (&'a str, &'a [&'a [&'a str]]);

/// Write an .xlsx workbook into `dir`. Cells that parse as integers are written
/// as numbers, empty cells are left blank, everything else is a string.
pub fn write_workbook(dir: &Path, file_name: &str, sheets: &[SheetRows]) -> PathBuf {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                if value.is_empty() {
                    continue;
                }
                match value.parse::<i64>() {
                    Ok(n) => worksheet.write_number(r, c, n as f64).unwrap(),
                    Err(_) => worksheet.write_string(r, c, *value).unwrap(),
                };
            }
        }
    }
    let path = dir.join(file_name);
    workbook.save(&path).unwrap();
    path
}
