mod error;
mod config;
mod series;
mod analysis;
mod infobase;
mod opencovid;
mod table;
mod graph;

use std::collections::HashMap;
use std::path::{PathBuf,Path};

use chrono::Local;

use config::Province;
use series::{CaseCounts,VaccineCounts};
use error::{Result,Error};


fn main() -> Result<()> {

    let cache_path = PathBuf::from("cache");
    let table_path = PathBuf::from("tables");
    let graph_path = PathBuf::from("graphs");
    let smoothings = vec![7,14];
    let as_of = Local::today().naive_local();

    let cases = infobase::cases(&cache_path, as_of)?;
    let vaccinations = opencovid::vaccinations(&cache_path, as_of)?;

    for province in config::provinces() {
	if let Err(err) = province_report(&table_path, &graph_path, &smoothings,
					  province, &cases, &vaccinations) {
	    eprintln!("Error: {}: {}", province.name, err);
	}
    }

    Ok(())

}


// Merge, clean and augment one province's series, then write its tables and
// graphs. Failures stay local to the province.
fn province_report(table_path: &Path, graph_path: &Path, smoothings: &Vec<usize>,
		   province: &Province,
		   cases: &HashMap<String,Vec<CaseCounts>>,
		   vaccinations: &HashMap<String,Vec<VaccineCounts>>) -> Result<()> {

    let cases = cases.get(province.name)
	.ok_or(Error::MissingRegion(province.name))?;

    // A province absent from the vaccination feed merges as all zeroes.
    let empty = vec![];
    let vaccinations = vaccinations.get(province.name).unwrap_or(&empty);

    let records = series::merge(cases, vaccinations);
    let records = series::make_vaccinated_monotonic(records, config::vaccination_epoch())?;
    let data = analysis::augment(records, province.population, config::ASCERTAINMENT_BIAS)?;

    if data.is_empty() {
	return Err(Error::MissingData);
    }

    table::write_table(table_path, province.name, &data)?;
    graph::immunity_graph(graph_path, province.name, &data)?;

    for smoothing in smoothings {
	table::write_smoothed(table_path, province.name, *smoothing, &data)?;
	graph::rt_graph(graph_path, province.name, *smoothing,
			config::interventions(province.abbr), &data)?;
    }

    Ok(())

}
