//! Trial balance: one CSV line per active GL, ascending by code, closed by
//! a TOTAL row whose DR and CR summations must agree.

use rust_decimal::Decimal;
use std::io::Write;

use super::error::ReportError;
use crate::balance::GlBalanceRow;

#[derive(Debug, Clone)]
pub struct TrialBalanceLine {
    pub gl_num: String,
    pub gl_name: String,
    pub opening_bal: Decimal,
    pub dr_summation: Decimal,
    pub cr_summation: Decimal,
    pub closing_bal: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct TrialBalanceTotals {
    pub opening_bal: Decimal,
    pub dr_summation: Decimal,
    pub cr_summation: Decimal,
    pub closing_bal: Decimal,
}

pub(super) fn build_lines(
    mut rows: Vec<(GlBalanceRow, String)>,
) -> (Vec<TrialBalanceLine>, TrialBalanceTotals) {
    rows.sort_by(|a, b| a.0.gl_num.cmp(&b.0.gl_num));
    let mut totals = TrialBalanceTotals::default();
    let lines = rows
        .into_iter()
        .map(|(row, gl_name)| {
            totals.opening_bal += row.opening_bal;
            totals.dr_summation += row.dr_summation;
            totals.cr_summation += row.cr_summation;
            totals.closing_bal += row.closing_bal;
            TrialBalanceLine {
                gl_num: row.gl_num,
                gl_name,
                opening_bal: row.opening_bal,
                dr_summation: row.dr_summation,
                cr_summation: row.cr_summation,
                closing_bal: row.closing_bal,
            }
        })
        .collect();
    (lines, totals)
}

pub(super) fn write_csv<W: Write>(
    writer: W,
    lines: &[TrialBalanceLine],
    totals: &TrialBalanceTotals,
) -> Result<(), ReportError> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer.write_record([
        "GL_Code",
        "GL_Name",
        "Opening_Bal",
        "DR_Summation",
        "CR_Summation",
        "Closing_Bal",
    ])?;
    for line in lines {
        csv_writer.write_record([
            line.gl_num.clone(),
            line.gl_name.clone(),
            line.opening_bal.to_string(),
            line.dr_summation.to_string(),
            line.cr_summation.to_string(),
            line.closing_bal.to_string(),
        ])?;
    }
    csv_writer.write_record([
        "TOTAL".to_string(),
        String::new(),
        totals.opening_bal.to_string(),
        totals.dr_summation.to_string(),
        totals.cr_summation.to_string(),
        totals.closing_bal.to_string(),
    ])?;
    csv_writer.flush().map_err(ReportError::Io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(gl_num: &str, dr: &str, cr: &str) -> (GlBalanceRow, String) {
        let dr: Decimal = dr.parse().unwrap();
        let cr: Decimal = cr.parse().unwrap();
        (
            GlBalanceRow {
                gl_num: gl_num.to_string(),
                tran_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                opening_bal: Decimal::ZERO,
                dr_summation: dr,
                cr_summation: cr,
                closing_bal: cr - dr,
                current_balance: cr - dr,
                last_updated: None,
            },
            format!("GL {gl_num}"),
        )
    }

    #[test]
    fn lines_are_sorted_and_totalled() {
        let (lines, totals) = build_lines(vec![
            row("210101000", "1000.00", "0.00"),
            row("110101000", "0.00", "1000.00"),
        ]);
        assert_eq!(lines[0].gl_num, "110101000");
        assert_eq!(lines[1].gl_num, "210101000");
        assert_eq!(totals.dr_summation, totals.cr_summation);
    }

    #[test]
    fn csv_ends_with_total_row() {
        let (lines, totals) = build_lines(vec![row("110101000", "0.00", "250.00")]);
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &lines, &totals).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut rows = text.lines();
        assert_eq!(
            rows.next().unwrap(),
            "GL_Code,GL_Name,Opening_Bal,DR_Summation,CR_Summation,Closing_Bal"
        );
        assert!(text.lines().last().unwrap().starts_with("TOTAL,"));
    }
}
