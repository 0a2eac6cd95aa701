use std::{fs,io};
use std::fs::File;
use std::path::Path;
use std::collections::HashMap;

use chrono::naive::NaiveDate;
use serde::Deserialize;

use super::error::{Result,Error};
use super::series::{CaseCounts,parse_date,clamp_count};


// Raw row of the health-infobase Canada download. Numeric columns may be
// empty or fractional in the published file.
#[derive(Deserialize,Debug)]
struct Row {
    prname: String,
    date: String,
    #[serde(default)]
    numtoday: Option<f64>,
    #[serde(default)]
    numtotal: Option<f64>,
    #[serde(default)]
    numactive: Option<f64>,
    #[serde(default)]
    numrecover: Option<f64>,
    #[serde(default)]
    numdeaths: Option<f64>,
}


pub fn cases(cache_path: &Path, as_of: NaiveDate) -> Result<HashMap<String,Vec<CaseCounts>>> {

    let cache_path = cache_path.join("infobase");
    let cache_file = cache_path.join(format!("cases_{}.json", as_of.format("%Y%m%d")));

    if cache_file.exists() {
	let contents = serde_json::from_reader(io::BufReader::new(File::open(&cache_file)?));
	if let Ok(cached) = contents {
	    return Ok(cached);
	}
    }

    let data = download_cases(as_of)?;
    fs::create_dir_all(&cache_path)?;
    serde_json::to_writer(io::BufWriter::new(File::create(cache_file)?), &data)?;
    Ok(data)

}


fn download_cases(as_of: NaiveDate) -> Result<HashMap<String,Vec<CaseCounts>>> {

    println!("Downloading covid19-download.csv...");
    let res = reqwest::blocking::get("https://health-infobase.canada.ca\
				      /src/data/covidLive/covid19-download.csv")?;

    if res.status().as_u16() != 200 {
	return Err(Error::HttpError(res.status()));
    }

    parse_cases(res.text()?.as_bytes(), as_of)

}


fn parse_cases<R: io::Read>(reader: R, as_of: NaiveDate) -> Result<HashMap<String,Vec<CaseCounts>>> {

    let mut data : HashMap<String,Vec<CaseCounts>> = HashMap::new();

    for row in csv::Reader::from_reader(reader).into_deserialize() {
	let row : Row = row?;
	let date = parse_date(&row.date)?;
	if date > as_of {
	    continue;
	}
	data.entry(row.prname).or_insert_with(Vec::new).push(CaseCounts {
	    date,
	    new_cases: clamp_count(row.numtoday),
	    total_cases: clamp_count(row.numtotal),
	    active_cases: clamp_count(row.numactive),
	    total_recovered: clamp_count(row.numrecover),
	    total_deaths: clamp_count(row.numdeaths),
	});
    }

    for series in data.values_mut() {
	series.sort_by_key(|c| c.date);
    }

    Ok(data)

}
