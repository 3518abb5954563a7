use crate::models::{RankingSnapshot, COLUMN_LABELS, DATE_COLUMN_LABEL};
use rust_xlsxwriter::{Color, Format, Workbook, XlsxError};

const SHEET_NAME: &str = "Рейтинг ПМИ";

/// Column widths in header order: номер, согласие, приоритет, баллы,
/// статус, дата обновления.
const COLUMN_WIDTHS: [f64; 6] = [10.0, 12.0, 12.0, 10.0, 20.0, 25.0];

/// Light-gray fill behind the header row.
const HEADER_FILL: Color = Color::RGB(0xD9D9D9);

/// Build the export workbook in memory and return its serialized bytes.
///
/// The snapshot's publication date is repeated as the last cell of every
/// data row. An empty snapshot still produces a valid header-only document.
pub fn build_workbook(snapshot: &RankingSnapshot) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let header_format = Format::new().set_bold().set_background_color(HEADER_FILL);
    for (col, label) in COLUMN_LABELS
        .iter()
        .chain(std::iter::once(&DATE_COLUMN_LABEL))
        .enumerate()
    {
        worksheet.write_string_with_format(0, col as u16, *label, &header_format)?;
    }

    for (index, fields) in snapshot.rows.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, value) in fields.iter().enumerate() {
            worksheet.write_string(row, col as u16, value.as_str())?;
        }
        worksheet.write_string(row, COLUMN_LABELS.len() as u16, snapshot.date.as_str())?;
    }

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    workbook.save_to_buffer()
}
