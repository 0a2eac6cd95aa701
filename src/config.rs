use chrono::naive::NaiveDate;
use lazy_static::lazy_static;


// Reported cases are assumed to undercount true infections by this factor.
pub const ASCERTAINMENT_BIAS: f64 = 5.0;

// No Canadian vaccination series can be non-zero before this date.
pub fn vaccination_epoch() -> NaiveDate {
    NaiveDate::from_ymd(2021, 1, 5)
}


pub struct Province {
    pub name: &'static str,
    pub abbr: &'static str,
    pub population: u64,
}

static PROVINCES: &[Province] = &[
    Province { name: "Newfoundland and Labrador", abbr: "NL", population: 520998 },
    Province { name: "Prince Edward Island", abbr: "PE", population: 159713 },
    Province { name: "Nova Scotia", abbr: "NS", population: 979115 },
    Province { name: "New Brunswick", abbr: "NB", population: 781315 },
    Province { name: "Quebec", abbr: "QC", population: 8575779 },
    Province { name: "Ontario", abbr: "ON", population: 14733119 },
    Province { name: "Manitoba", abbr: "MB", population: 1379584 },
    Province { name: "Saskatchewan", abbr: "SK", population: 1177884 },
    Province { name: "Alberta", abbr: "AB", population: 4428112 },
    Province { name: "British Columbia", abbr: "BC", population: 5145851 },
    Province { name: "Yukon", abbr: "YT", population: 42176 },
    Province { name: "Northwest Territories", abbr: "NWT", population: 45074 },
    Province { name: "Nunavut", abbr: "NU", population: 39285 },
];

pub fn provinces() -> &'static [Province] {
    PROVINCES
}

pub fn province_name(abbr: &str) -> Option<&'static str> {
    PROVINCES.iter().find(|p| p.abbr == abbr).map(|p| p.name)
}


#[derive(Clone,Copy,Debug,PartialEq)]
pub enum InterventionKind {
    Tighten,
    Ease,
    Event,
    Notice,
}

impl InterventionKind {

    pub fn color(&self) -> &'static str {
	match self {
	    Self::Tighten => "firebrick",
	    Self::Ease => "seagreen",
	    Self::Event => "steelblue",
	    Self::Notice => "gray",
	}
    }

}

#[derive(Clone,Debug)]
pub struct Intervention {
    pub date: NaiveDate,
    pub label: &'static str,
    pub kind: InterventionKind,
}

fn intervention(date: (i32,u32,u32), label: &'static str, kind: InterventionKind) -> Intervention {
    Intervention { date: NaiveDate::from_ymd(date.0, date.1, date.2), label, kind }
}

lazy_static! {

    static ref INTERVENTIONS: Vec<(&'static str, Vec<Intervention>)> = {
	use InterventionKind::*;
	vec![
	    ("SK", vec![
		intervention((2020,3,13), "First restrictions, gathering size > 250", Tighten),
		intervention((2020,3,18), "State of emergency", Tighten),
		intervention((2020,3,26), "Gatherings limited to 10", Tighten),
		intervention((2020,5,4), "Medical clinics and campsites reopen", Ease),
		intervention((2020,5,19), "Personal care reopens", Ease),
		intervention((2020,6,8), "Gathering size increase, beaches, playgrounds, fitness, child care open", Ease),
		intervention((2020,6,22), "Outdoor rec, gatherings up to 30, outdoor sports allowed", Ease),
		intervention((2020,7,6), "Bars, restaurants, casinos, bingo, indoor rec open", Ease),
		intervention((2020,9,2), "School starts", Event),
		intervention((2020,10,12), "Thanksgiving", Event),
		intervention((2020,11,3), "Local mask policy (Regina, Prince Albert, Saskatoon)", Notice),
		intervention((2020,11,19), "Province-wide mask policy", Tighten),
		intervention((2020,11,27), "Indoor gathering capacity restrictions, group and team sports cancelled", Tighten),
		intervention((2020,12,14), "Social gathering restrictions, capacity restrictions for retailers", Tighten),
	    ]),
	]
    };

}

pub fn interventions(abbr: &str) -> &'static [Intervention] {
    INTERVENTIONS.iter().find(|(key,_)| *key == abbr)
	.map_or(&[], |(_,list)| list.as_slice())
}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn province_name_normalization() {
	assert_eq!(province_name("BC"), Some("British Columbia"));
	assert_eq!(province_name("SK"), Some("Saskatchewan"));
	assert_eq!(province_name("Narnia"), None);
    }

    #[test]
    fn populations_positive() {
	assert!(provinces().iter().all(|p| p.population > 0));
    }

    #[test]
    fn interventions_sorted_by_date() {
	let list = interventions("SK");
	assert!(!list.is_empty());
	assert!(list.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn interventions_default_empty() {
	assert!(interventions("NU").is_empty());
    }

}
