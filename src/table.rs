use std::fs;
use std::path::Path;

use super::error::Result;
use super::analysis::{Augmented,rolling_mean};
use super::series::OptSeries;


fn fraction(val: f64) -> String {
    format!("{:.6}", val)
}

fn metric(val: Option<f64>) -> String {
    val.map_or(String::new(), |v| format!("{:.4}", v))
}


// Full augmented table for one region, one row per date.
pub fn write_table(table_path: &Path, region: &str, data: &[Augmented]) -> Result<()> {

    let table_path = table_path.join(region);
    fs::create_dir_all(&table_path)?;

    let mut out = csv::Writer::from_path(table_path.join("data.csv"))?;
    out.write_record(&["Date", "New Cases", "Total Cases", "Active Cases",
		       "Total Recovered", "Total Deaths",
		       "New Vaccinated", "Total Vaccinated",
		       "S", "I", "R", "R(t)",
		       "Immunity (Lower Bound)", "Immunity (Upper Bound)"])?;

    for row in data {
	out.write_record(&[
	    row.record.date.format("%Y-%m-%d").to_string(),
	    row.record.new_cases.to_string(),
	    row.record.total_cases.to_string(),
	    row.record.active_cases.to_string(),
	    row.record.total_recovered.to_string(),
	    row.record.total_deaths.to_string(),
	    row.record.new_vaccinated.to_string(),
	    row.record.total_vaccinated.to_string(),
	    fraction(row.fractions.s),
	    fraction(row.fractions.i),
	    fraction(row.fractions.r),
	    metric(row.rt),
	    fraction(row.immunity_lower),
	    fraction(row.immunity_upper),
	])?;
    }

    out.flush()?;
    Ok(())

}


// Presentation-time smoothing: trailing calendar-window means of R(t) and the
// noisy daily columns, written next to the raw table.
pub fn write_smoothed(table_path: &Path, region: &str, smoothing: usize, data: &[Augmented]) -> Result<()> {

    let table_path = table_path.join(region);
    fs::create_dir_all(&table_path)?;

    let rt = rolling_mean(&data.iter().map(
	|row| (row.record.date, row.rt)).collect::<OptSeries>(), smoothing as u32);
    let new_cases = rolling_mean(&data.iter().map(
	|row| (row.record.date, Some(row.record.new_cases as f64))).collect::<OptSeries>(), smoothing as u32);
    let active_cases = rolling_mean(&data.iter().map(
	|row| (row.record.date, Some(row.record.active_cases as f64))).collect::<OptSeries>(), smoothing as u32);

    let mut out = csv::Writer::from_path(table_path.join(format!("data-{}days.csv", smoothing)))?;
    out.write_record(&["Date", "R(t)", "New Cases", "Active Cases"])?;

    for ((rt,new_cases),active_cases) in rt.iter().zip(&new_cases).zip(&active_cases) {
	out.write_record(&[
	    rt.0.format("%Y-%m-%d").to_string(),
	    metric(rt.1),
	    metric(new_cases.1),
	    metric(active_cases.1),
	])?;
    }

    out.flush()?;
    Ok(())

}
