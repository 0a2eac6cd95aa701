use std::{fs,io};
use std::fs::File;
use std::path::Path;
use std::collections::HashMap;

use chrono::naive::NaiveDate;
use serde::Deserialize;

use super::config;
use super::error::{Result,Error};
use super::series::{VaccineCounts,parse_date,clamp_count};


#[derive(Deserialize,Debug)]
struct Response {
    avaccine: Vec<Row>,
}

// Vaccination history row from api.opencovid.ca. Provinces arrive as
// abbreviations and counts can be missing or negative corrections.
#[derive(Deserialize,Debug)]
struct Row {
    date_vaccine_administered: String,
    province: String,
    #[serde(default)]
    avaccine: Option<f64>,
    #[serde(default)]
    cumulative_avaccine: Option<f64>,
}


pub fn vaccinations(cache_path: &Path, as_of: NaiveDate) -> Result<HashMap<String,Vec<VaccineCounts>>> {

    let cache_path = cache_path.join("opencovid");
    let cache_file = cache_path.join(format!("avaccine_{}.json", as_of.format("%Y%m%d")));

    if cache_file.exists() {
	let contents = serde_json::from_reader(io::BufReader::new(File::open(&cache_file)?));
	if let Ok(cached) = contents {
	    return Ok(cached);
	}
    }

    let data = download_vaccinations(as_of)?;
    fs::create_dir_all(&cache_path)?;
    serde_json::to_writer(io::BufWriter::new(File::create(cache_file)?), &data)?;
    Ok(data)

}


fn download_vaccinations(as_of: NaiveDate) -> Result<HashMap<String,Vec<VaccineCounts>>> {

    println!("Downloading opencovid vaccination timeseries...");
    let res = reqwest::blocking::get("https://api.opencovid.ca/timeseries?stat=avaccine&loc=prov")?;

    if res.status().as_u16() != 200 {
	return Err(Error::HttpError(res.status()));
    }

    parse_vaccinations(res.json()?, as_of)

}


fn parse_vaccinations(body: Response, as_of: NaiveDate) -> Result<HashMap<String,Vec<VaccineCounts>>> {

    let mut data : HashMap<String,Vec<VaccineCounts>> = HashMap::new();

    for row in body.avaccine {
	let date = parse_date(&row.date_vaccine_administered)?;
	if date > as_of {
	    continue;
	}
	let province = config::province_name(&row.province)
	    .map(str::to_string).unwrap_or(row.province);
	data.entry(province).or_insert_with(Vec::new).push(VaccineCounts {
	    date,
	    new_vaccinated: clamp_count(row.avaccine),
	    total_vaccinated: clamp_count(row.cumulative_avaccine),
	});
    }

    for series in data.values_mut() {
	series.sort_by_key(|v| v.date);
    }

    Ok(data)

}


#[cfg(test)]
mod tests {

    use super::*;

    fn row(date: &str, province: &str, new: f64, total: f64) -> Row {
	Row {
	    date_vaccine_administered: date.to_string(),
	    province: province.to_string(),
	    avaccine: Some(new),
	    cumulative_avaccine: Some(total),
	}
    }

    #[test]
    fn provinces_are_normalized_and_sorted() {
	let body = Response { avaccine: vec![
	    row("2021-01-20", "SK", 300.0, 800.0),
	    row("19-01-2021", "SK", 500.0, 500.0),
	    row("2021-01-19", "Narnia", 1.0, 1.0),
	] };
	let as_of = NaiveDate::from_ymd(2021, 2, 1);
	let data = parse_vaccinations(body, as_of).unwrap();
	let series = &data["Saskatchewan"];
	assert_eq!(series.len(), 2);
	assert_eq!(series[0].date, NaiveDate::from_ymd(2021, 1, 19));
	assert_eq!(series[0].total_vaccinated, 500);
	assert_eq!(series[1].total_vaccinated, 800);
	assert!(data.contains_key("Narnia"));
    }

    #[test]
    fn negative_corrections_become_zero() {
	let body = Response { avaccine: vec![
	    row("2021-01-19", "YT", -250.0, -100.0),
	] };
	let as_of = NaiveDate::from_ymd(2021, 2, 1);
	let data = parse_vaccinations(body, as_of).unwrap();
	assert_eq!(data["Yukon"][0].new_vaccinated, 0);
	assert_eq!(data["Yukon"][0].total_vaccinated, 0);
    }

    #[test]
    fn future_rows_are_dropped() {
	let body = Response { avaccine: vec![
	    row("2021-01-19", "NS", 10.0, 10.0),
	    row("2021-03-19", "NS", 10.0, 20.0),
	] };
	let as_of = NaiveDate::from_ymd(2021, 2, 1);
	let data = parse_vaccinations(body, as_of).unwrap();
	assert_eq!(data["Nova Scotia"].len(), 1);
    }

}
