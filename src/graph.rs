use std::{io,fs};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde_json::{Value,json};

use super::error::Result;
use super::config::Intervention;
use super::analysis::{Augmented,rolling_mean};
use super::series::OptSeries;


// R(t) against daily new cases on independent y scales, with curated
// intervention dates as labelled vertical rules and a dashed R = 1 reference.
pub fn rt_graph(graph_path: &Path, region: &str, smoothing: usize,
		interventions: &[Intervention], data: &[Augmented]) -> Result<()> {

    let rt = rolling_mean(&data.iter().map(
	|row| (row.record.date, row.rt)).collect::<OptSeries>(), smoothing as u32);
    let new_cases = rolling_mean(&data.iter().map(
	|row| (row.record.date, Some(row.record.new_cases as f64))).collect::<OptSeries>(), smoothing as u32);

    let title = format!("Effective reproduction number ({}, {}-day average)",
			region, smoothing);

    render(&graph_path.join(region), &format!("rt-{}days.html", smoothing), &title, &json!({
	"$schema": "https://vega.github.io/schema/vega-lite/v4.json",
	"height": "container",
	"width": "container",
	"title": title,
	"resolve": { "scale": { "y": "independent" } },
	"layer": [
	    {
		"data": { "values": series_values(&rt) },
		"mark": { "type": "line", "color": "red" },
		"encoding": {
		    "x": date_encoding(),
		    "y": {
			"field": "Value",
			"type": "quantitative",
			"scale": { "domainMin": 0 },
			"axis": { "title": format!("R(t) ({}-day average)", smoothing),
				  "titleColor": "red" }
		    }
		}
	    },
	    {
		"data": { "values": series_values(&new_cases) },
		"mark": { "type": "line", "color": "blue" },
		"encoding": {
		    "x": date_encoding(),
		    "y": {
			"field": "Value",
			"type": "quantitative",
			"scale": { "domainMin": 0 },
			"axis": { "title": format!("Daily new cases ({}-day average)", smoothing),
				  "titleColor": "blue" }
		    }
		}
	    },
	    {
		"data": { "values": interventions.iter().map(|i| json!({
		    "Date": format!("{}", i.date.format("%Y-%m-%d")),
		    "Measure": i.label,
		    "Color": i.kind.color()
		})).collect::<Vec<_>>() },
		"mark": { "type": "rule", "opacity": 0.6 },
		"encoding": {
		    "x": date_encoding(),
		    "color": { "field": "Color", "type": "nominal", "scale": null, "legend": null },
		    "tooltip": [
			{ "field": "Date", "type": "temporal" },
			{ "field": "Measure", "type": "nominal" }
		    ]
		}
	    },
	    {
		"data": { "values": [ { "Value": 1.0 } ] },
		"mark": { "type": "rule", "color": "red", "strokeDash": [4, 4] },
		"encoding": {
		    "y": { "field": "Value", "type": "quantitative", "axis": null }
		}
	    }
	]
    }))

}


pub fn immunity_graph(graph_path: &Path, region: &str, data: &[Augmented]) -> Result<()> {

    let title = format!("Estimated immunity ({})", region);

    let values : Vec<Value> = data.iter().flat_map(|row| vec![
	json!({
	    "Date": format!("{}", row.record.date.format("%Y-%m-%d")),
	    "Confidence": "Lower Bound",
	    "Immunity": row.immunity_lower * 100.0
	}),
	json!({
	    "Date": format!("{}", row.record.date.format("%Y-%m-%d")),
	    "Confidence": "Upper Bound",
	    "Immunity": row.immunity_upper * 100.0
	})
    ]).collect();

    render(&graph_path.join(region), "immunity.html", &title, &json!({
	"$schema": "https://vega.github.io/schema/vega-lite/v4.json",
	"height": "container",
	"width": "container",
	"title": title,
	"data": { "values": values },
	"mark": "line",
	"encoding": {
	    "x": date_encoding(),
	    "y": {
		"field": "Immunity",
		"type": "quantitative",
		"axis": { "title": "Immunity percentage", "format": ".1f" }
	    },
	    "color": { "field": "Confidence", "type": "nominal" }
	}
    }))

}


fn series_values(series: &OptSeries) -> Vec<Value> {
    series.iter().filter_map(
	|(date,val)| val.map(|val| json!({
	    "Date": format!("{}", date.format("%Y-%m-%d")),
	    "Value": val
	}))
    ).collect()
}

fn date_encoding() -> Value {
    json!({
	"field": "Date",
	"timeUnit": "utcyearmonthdate",
	"title": "Date",
	"type": "temporal"
    })
}


fn render(graph_path: &Path, path: &str, title: &str, spec: &Value) -> Result<()> {

    fs::create_dir_all(graph_path)?;
    let mut out = io::BufWriter::new(File::create(graph_path.join(path))?);

    write!(out, "<!DOCTYPE html><html><head>")?;
    write!(out, "<meta charset=\"UTF-8\">")?;
    write!(out, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">")?;
    write!(out, "<title>{}</title>", title)?;
    write!(out, "<script src=\"https://cdn.jsdelivr.net/npm/vega@5\"></script>")?;
    write!(out, "<script src=\"https://cdn.jsdelivr.net/npm/vega-lite@4\"></script>")?;
    write!(out, "<script src=\"https://cdn.jsdelivr.net/npm/vega-embed\"></script>")?;
    write!(out, "</head>")?;
    write!(out, "<body>")?;
    write!(out, "<div id=\"vis\" style=\"overflow: hidden; position: absolute;top: 0; left: 0; right: 0; bottom: 0;\"></div>")?;
    write!(out, "<script type=\"text/javascript\">")?;
    write!(out, "var spec = ")?;

    serde_json::to_writer_pretty(out.by_ref(), spec)?;

    write!(out, ";vegaEmbed('#vis', spec,{{}}).then(function(result) {{")?;
    write!(out, "}}).catch(console.error);")?;
    write!(out, "</script>")?;
    write!(out, "</body></html>")?;

    Ok(())

}
