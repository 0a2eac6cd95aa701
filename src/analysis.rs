use chrono::Duration;

use super::error::{Result,Error};
use super::series::{Record,OptSeries};


// Susceptible / infected / removed population fractions for one date.
// Reporting noise can push these slightly outside [0,1]; they are not clipped.
#[derive(Clone,Copy,Debug,PartialEq)]
pub struct Fractions {
    pub s: f64,
    pub i: f64,
    pub r: f64,
}

#[derive(Clone,Debug)]
pub struct Augmented {
    pub record: Record,
    pub fractions: Fractions,
    pub rt: Option<f64>,
    pub immunity_lower: f64,
    pub immunity_upper: f64,
}


pub fn compartments(records: &[Record], population: u64) -> Result<Vec<Fractions>> {

    if population == 0 {
	return Err(Error::InvalidPopulation(population));
    }

    let pop = population as f64;

    Ok(records.iter().map(|r| Fractions {
	s: (pop - r.total_cases as f64) / pop,
	i: r.active_cases as f64 / pop,
	r: (r.total_recovered + r.total_deaths) as f64 / pop,
    }).collect())

}


// Centered finite-difference inversion of the discrete SIR dynamics:
// with ratio = ΔI/ΔS over the two surrounding days, eliminating the recovery
// rate between dI/dt and dS/dt gives R(t) = 1 / (S · (ratio + 1)).
//
// None at both series boundaries and wherever ΔS = 0 (no change in
// susceptibles over the span, so the ratio is undefined). The raw estimate is
// clipped to [0, 10]; anything outside is reporting noise or a near-zero
// denominator.
pub fn reproduction(fractions: &[Fractions]) -> Vec<Option<f64>> {

    (0..fractions.len()).map(|t| {

	if t == 0 || t + 1 == fractions.len() {
	    return None;
	}

	let di = fractions[t+1].i - fractions[t-1].i;
	let ds = fractions[t+1].s - fractions[t-1].s;

	if ds == 0.0 {
	    return None;
	}

	let raw = 1.0 / (fractions[t].s * (di / ds + 1.0));
	Some(raw.max(0.0).min(10.0))

    }).collect()

}


// Lower bound counts every reported case once; the upper bound multiplies
// cases by an ascertainment-bias factor before adding vaccinations.
pub fn immunity(records: &[Record], population: u64, multiplier: f64) -> Result<Vec<(f64,f64)>> {

    if population == 0 {
	return Err(Error::InvalidPopulation(population));
    }

    let pop = population as f64;

    Ok(records.iter().map(|r| {
	let cases = r.total_cases as f64;
	let vaccinated = r.total_vaccinated as f64;
	((cases + vaccinated) / pop,
	 (multiplier * cases + vaccinated) / pop)
    }).collect())

}


// Trailing rolling mean over a calendar window of the given length in days,
// ending at each date inclusive. Gaps in the series shrink the sample, not the
// window; partial windows at the start still produce a value. Undefined inputs
// are skipped; a window with no defined value yields None.
pub fn rolling_mean(series: &OptSeries, days: u32) -> OptSeries {

    series.iter().enumerate().map(|(i,(date,_))| {

	let start = *date - Duration::days(days.max(1) as i64 - 1);
	let mut sum = 0.0;
	let mut n = 0;

	for (day,val) in series[..=i].iter().rev() {
	    if *day < start {
		break;
	    }
	    if let Some(val) = val {
		sum += val;
		n += 1;
	    }
	}

	(*date, match n {
	    0 => None,
	    n => Some(sum / n as f64),
	})

    }).collect()

}


// The full per-region pipeline after cleaning: compartment fractions, the
// R(t) estimate and the immunity bounds, zipped back onto the input rows.
pub fn augment(records: Vec<Record>, population: u64, multiplier: f64) -> Result<Vec<Augmented>> {

    let fractions = compartments(&records, population)?;
    let rt = reproduction(&fractions);
    let bounds = immunity(&records, population, multiplier)?;

    Ok(records.into_iter().zip(fractions).zip(rt).zip(bounds).map(
	|(((record,fractions),rt),(immunity_lower,immunity_upper))| Augmented {
	    record, fractions, rt, immunity_lower, immunity_upper
	}
    ).collect())

}
