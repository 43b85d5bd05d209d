//! Balance sheet workbook: liabilities in columns 0-2, assets in columns
//! 4-6, merged title and section headers, one row per liability/asset pair
//! and a totals row under each side.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

use super::error::ReportError;
use crate::{balance::GlBalanceRow, gl};

#[derive(Debug, Clone)]
pub struct BalanceSheetLine {
    pub gl_num: String,
    pub gl_name: String,
    pub closing_bal: Decimal,
}

/// Splits balance-sheet rows into the two sides. Liability side is every
/// `1…` code (interest-expenditure leaves included), asset side every `2…`
/// code (interest-income leaves included); both sides sort by GL code.
pub(super) fn split_sides(
    rows: Vec<(GlBalanceRow, String)>,
) -> (Vec<BalanceSheetLine>, Vec<BalanceSheetLine>) {
    let mut liabilities = Vec::new();
    let mut assets = Vec::new();
    for (row, gl_name) in rows {
        let line = BalanceSheetLine {
            gl_num: row.gl_num,
            gl_name,
            closing_bal: row.closing_bal,
        };
        if gl::is_liability(&line.gl_num) {
            liabilities.push(line);
        } else if gl::is_asset(&line.gl_num) {
            assets.push(line);
        }
    }
    liabilities.sort_by(|a, b| a.gl_num.cmp(&b.gl_num));
    assets.sort_by(|a, b| a.gl_num.cmp(&b.gl_num));
    (liabilities, assets)
}

pub(super) fn write_xlsx(
    path: &Path,
    report_date: &str,
    liabilities: &[BalanceSheetLine],
    assets: &[BalanceSheetLine],
) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    let title_format = Format::new().set_bold();
    let section_format = Format::new().set_bold();
    let header_format = Format::new().set_bold();
    let number_format = Format::new().set_num_format("#,##0.00");
    let total_format = Format::new().set_bold().set_num_format("#,##0.00");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Balance Sheet")?;

    worksheet.merge_range(
        0,
        0,
        0,
        6,
        &format!("BALANCE SHEET - {report_date}"),
        &title_format,
    )?;
    worksheet.merge_range(1, 0, 1, 2, "LIABILITIES", &section_format)?;
    worksheet.merge_range(1, 4, 1, 6, "ASSETS", &section_format)?;

    for offset in [0u16, 4u16] {
        worksheet.write_string_with_format(2, offset, "GL_Code", &header_format)?;
        worksheet.write_string_with_format(2, offset + 1, "GL_Name", &header_format)?;
        worksheet.write_string_with_format(2, offset + 2, "Closing_Bal", &header_format)?;
    }

    let mut total_liabilities = Decimal::ZERO;
    let mut total_assets = Decimal::ZERO;
    let pair_count = liabilities.len().max(assets.len());
    for index in 0..pair_count {
        let row = 3 + index as u32;
        if let Some(line) = liabilities.get(index) {
            worksheet.write_string(row, 0, line.gl_num.as_str())?;
            worksheet.write_string(row, 1, line.gl_name.as_str())?;
            worksheet.write_number_with_format(
                row,
                2,
                line.closing_bal.to_f64().unwrap_or(0.0),
                &number_format,
            )?;
            total_liabilities += line.closing_bal;
        }
        if let Some(line) = assets.get(index) {
            worksheet.write_string(row, 4, line.gl_num.as_str())?;
            worksheet.write_string(row, 5, line.gl_name.as_str())?;
            worksheet.write_number_with_format(
                row,
                6,
                line.closing_bal.to_f64().unwrap_or(0.0),
                &number_format,
            )?;
            total_assets += line.closing_bal;
        }
    }

    let totals_row = 3 + pair_count as u32;
    worksheet.write_string_with_format(totals_row, 0, "TOTAL LIABILITIES", &total_format)?;
    worksheet.write_number_with_format(
        totals_row,
        2,
        total_liabilities.to_f64().unwrap_or(0.0),
        &total_format,
    )?;
    worksheet.write_string_with_format(totals_row, 4, "TOTAL ASSETS", &total_format)?;
    worksheet.write_number_with_format(
        totals_row,
        6,
        total_assets.to_f64().unwrap_or(0.0),
        &total_format,
    )?;

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(gl_num: &str, closing: &str) -> (GlBalanceRow, String) {
        (
            GlBalanceRow {
                gl_num: gl_num.to_string(),
                tran_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                opening_bal: Decimal::ZERO,
                dr_summation: Decimal::ZERO,
                cr_summation: Decimal::ZERO,
                closing_bal: closing.parse().unwrap(),
                current_balance: closing.parse().unwrap(),
                last_updated: None,
            },
            format!("GL {gl_num}"),
        )
    }

    #[test]
    fn interest_leaves_stay_on_their_prefix_side() {
        let (liabilities, assets) = split_sides(vec![
            row("210101000", "700.00"),
            row("110101000", "500.00"),
            row("140101000", "20.00"),
            row("240102001", "35.00"),
        ]);
        let liability_gls: Vec<_> = liabilities.iter().map(|l| l.gl_num.as_str()).collect();
        let asset_gls: Vec<_> = assets.iter().map(|a| a.gl_num.as_str()).collect();
        assert_eq!(liability_gls, vec!["110101000", "140101000"]);
        assert_eq!(asset_gls, vec!["210101000", "240102001"]);
    }
}
