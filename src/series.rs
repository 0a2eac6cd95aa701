use std::collections::BTreeMap;

use chrono::naive::NaiveDate;
use serde::{Serialize,Deserialize};

use super::error::{Result,Error};


pub type OptSeries = Vec<(NaiveDate,Option<f64>)>;


#[derive(Serialize,Deserialize,Clone,Debug,PartialEq)]
pub struct CaseCounts {
    pub date: NaiveDate,
    pub new_cases: u64,
    pub total_cases: u64,
    pub active_cases: u64,
    pub total_recovered: u64,
    pub total_deaths: u64,
}

#[derive(Serialize,Deserialize,Clone,Debug,PartialEq)]
pub struct VaccineCounts {
    pub date: NaiveDate,
    pub new_vaccinated: u64,
    pub total_vaccinated: u64,
}

// One merged row per (region, date). Counts are non-negative from here on.
#[derive(Serialize,Deserialize,Clone,Debug,PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub new_cases: u64,
    pub total_cases: u64,
    pub active_cases: u64,
    pub total_recovered: u64,
    pub total_deaths: u64,
    pub new_vaccinated: u64,
    pub total_vaccinated: u64,
}


pub fn parse_date(val: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(val, "%Y-%m-%d")
	.or_else(|_| NaiveDate::parse_from_str(val, "%d-%m-%Y"))
	.map_err(Error::from)
}

// Nulls and negative corrections in the raw feeds count as zero.
pub fn clamp_count(val: Option<f64>) -> u64 {
    val.filter(|v| *v > 0.0).map_or(0, |v| v as u64)
}


// Left join on the case dates: a date absent from the vaccination table
// contributes zero vaccinations, never an error.
pub fn merge(cases: &[CaseCounts], vaccinations: &[VaccineCounts]) -> Vec<Record> {

    let by_date : BTreeMap<NaiveDate,&VaccineCounts> =
	vaccinations.iter().map(|v| (v.date, v)).collect();

    let mut records : Vec<Record> = cases.iter().map(|c| {
	let vaccinated = by_date.get(&c.date);
	Record {
	    date: c.date,
	    new_cases: c.new_cases,
	    total_cases: c.total_cases,
	    active_cases: c.active_cases,
	    total_recovered: c.total_recovered,
	    total_deaths: c.total_deaths,
	    new_vaccinated: vaccinated.map_or(0, |v| v.new_vaccinated),
	    total_vaccinated: vaccinated.map_or(0, |v| v.total_vaccinated),
	}
    }).collect();

    records.sort_by_key(|r| r.date);
    records

}


fn is_monotonic(records: &[Record]) -> bool {
    records.windows(2).all(|w| w[0].total_vaccinated <= w[1].total_vaccinated)
}

// One repair pass: zero everything before the epoch, discard every value whose
// day-over-day difference is not a strict increase, then fill the holes forward
// from the last retained value (zero before the first one).
fn repair_pass(records: &mut Vec<Record>, epoch: NaiveDate) {

    for r in records.iter_mut() {
	if r.date < epoch {
	    r.total_vaccinated = 0;
	}
    }

    let vals : Vec<u64> = records.iter().map(|r| r.total_vaccinated).collect();
    let mut filled = 0;

    for (i,r) in records.iter_mut().enumerate() {
	if i == 0 || vals[i] > vals[i-1] {
	    filled = vals[i];
	}
	r.total_vaccinated = filled;
    }

}

// Repairs the cumulative vaccination column until it is non-decreasing.
// Each pass removes at least one inversion, so a series of n records that is
// still decreasing after n passes is malformed and rejected.
pub fn make_vaccinated_monotonic(mut records: Vec<Record>, epoch: NaiveDate) -> Result<Vec<Record>> {

    let passes = records.len().max(1);

    for _ in 0..passes {
	if is_monotonic(&records) {
	    return Ok(records);
	}
	repair_pass(&mut records, epoch);
    }

    match is_monotonic(&records) {
	true => Ok(records),
	false => Err(Error::NonMonotonic(passes)),
    }

}


#[cfg(test)]
mod tests {

    use super::*;

    fn date(val: &str) -> NaiveDate {
	parse_date(val).unwrap()
    }

    fn vaccine_records(start: &str, totals: &[u64]) -> Vec<Record> {
	let mut day = date(start);
	totals.iter().map(|total| {
	    let record = Record {
		date: day,
		new_cases: 0, total_cases: 0, active_cases: 0,
		total_recovered: 0, total_deaths: 0,
		new_vaccinated: 0, total_vaccinated: *total,
	    };
	    day = day.succ();
	    record
	}).collect()
    }

    fn totals(records: &[Record]) -> Vec<u64> {
	records.iter().map(|r| r.total_vaccinated).collect()
    }

    #[test]
    fn parse_date_formats() {
	assert_eq!(parse_date("2021-02-03").unwrap(), NaiveDate::from_ymd(2021, 2, 3));
	assert_eq!(parse_date("03-02-2021").unwrap(), NaiveDate::from_ymd(2021, 2, 3));
	assert!(parse_date("whenever").is_err());
    }

    #[test]
    fn clamp_count_defaults() {
	assert_eq!(clamp_count(None), 0);
	assert_eq!(clamp_count(Some(-17.0)), 0);
	assert_eq!(clamp_count(Some(42.0)), 42);
	assert_eq!(clamp_count(Some(41.9)), 41);
    }

    #[test]
    fn merge_joins_on_date() {
	let cases = vec![
	    CaseCounts { date: date("2021-02-01"), new_cases: 5, total_cases: 100,
			 active_cases: 20, total_recovered: 70, total_deaths: 10 },
	    CaseCounts { date: date("2021-02-02"), new_cases: 3, total_cases: 103,
			 active_cases: 19, total_recovered: 74, total_deaths: 10 },
	];
	let vaccinations = vec![
	    VaccineCounts { date: date("2021-02-02"), new_vaccinated: 50, total_vaccinated: 250 },
	];
	let records = merge(&cases, &vaccinations);
	assert_eq!(records.len(), 2);
	assert_eq!(records[0].total_vaccinated, 0);
	assert_eq!(records[0].new_vaccinated, 0);
	assert_eq!(records[1].total_vaccinated, 250);
	assert_eq!(records[1].new_vaccinated, 50);
	assert_eq!(records[1].total_cases, 103);
    }

    #[test]
    fn merge_ignores_vaccination_only_dates() {
	let cases = vec![
	    CaseCounts { date: date("2021-02-01"), new_cases: 0, total_cases: 1,
			 active_cases: 1, total_recovered: 0, total_deaths: 0 },
	];
	let vaccinations = vec![
	    VaccineCounts { date: date("2021-01-15"), new_vaccinated: 9, total_vaccinated: 9 },
	    VaccineCounts { date: date("2021-02-01"), new_vaccinated: 1, total_vaccinated: 10 },
	];
	let records = merge(&cases, &vaccinations);
	assert_eq!(records.len(), 1);
	assert_eq!(records[0].total_vaccinated, 10);
    }

    #[test]
    fn repair_discards_decrease_and_fills_forward() {
	let records = vaccine_records("2021-02-01", &[0, 0, 100, 90, 150]);
	let epoch = date("2021-01-05");
	let cleaned = make_vaccinated_monotonic(records, epoch).unwrap();
	assert_eq!(totals(&cleaned), vec![0, 0, 100, 100, 150]);
    }

    #[test]
    fn repair_is_idempotent() {
	let records = vaccine_records("2021-02-01", &[0, 10, 5, 20, 15, 30]);
	let epoch = date("2021-01-05");
	let once = make_vaccinated_monotonic(records, epoch).unwrap();
	let twice = make_vaccinated_monotonic(once.clone(), epoch).unwrap();
	assert_eq!(once, twice);
	assert!(totals(&once).windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn repair_needs_multiple_passes() {
	// The second retained value (30) is below the forward-filled 100, an
	// inversion that only shows up after the first fill.
	let records = vaccine_records("2021-02-01", &[0, 100, 20, 30]);
	let epoch = date("2021-01-05");
	let cleaned = make_vaccinated_monotonic(records, epoch).unwrap();
	assert_eq!(totals(&cleaned), vec![0, 100, 100, 100]);
    }

    #[test]
    fn repair_zeroes_before_epoch() {
	let records = vaccine_records("2021-01-03", &[7, 3, 10, 20]);
	let epoch = date("2021-01-05");
	let cleaned = make_vaccinated_monotonic(records, epoch).unwrap();
	assert_eq!(totals(&cleaned), vec![0, 0, 10, 20]);
    }

    #[test]
    fn monotonic_input_untouched() {
	// A series that is already non-decreasing is returned as-is, even when
	// it starts before the epoch.
	let records = vaccine_records("2021-01-01", &[2, 2, 5, 9]);
	let epoch = date("2021-01-05");
	let cleaned = make_vaccinated_monotonic(records.clone(), epoch).unwrap();
	assert_eq!(cleaned, records);
    }

    #[test]
    fn trivial_series_pass_through() {
	let epoch = date("2021-01-05");
	assert_eq!(make_vaccinated_monotonic(vec![], epoch).unwrap(), vec![]);
	let single = vaccine_records("2021-02-01", &[5]);
	assert_eq!(totals(&make_vaccinated_monotonic(single, epoch).unwrap()), vec![5]);
	let zeroes = vaccine_records("2021-02-01", &[0, 0, 0]);
	assert_eq!(totals(&make_vaccinated_monotonic(zeroes, epoch).unwrap()), vec![0, 0, 0]);
    }

}
