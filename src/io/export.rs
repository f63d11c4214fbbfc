//! CSV and JSON export for run results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::engine::RunReport;
use crate::sim::types::NodeResult;

/// Column header of the node table.
const HEADER: &str = "id,generation_kwh,demand_kwh,self_consumption_kwh,ev_demand_kwh,\
                       battery_capacity_kwh,\
                       soc_start_kwh,soc_end_kwh,net_kwh,surplus_kwh,deficit_kwh,\
                       received_kwh,given_kwh,residual_surplus_kwh,residual_deficit_kwh";

/// Errors raised while writing export files.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Exports the node table to a CSV file at the given path.
///
/// Writes a header row followed by one row per node in run order.
/// Produces identical bytes for identical inputs.
///
/// # Errors
///
/// Returns an `ExportError` if file creation or writing fails.
pub fn export_csv(results: &[NodeResult], path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_csv(results, io::BufWriter::new(file))
}

/// Writes the node table as CSV to any writer.
///
/// # Errors
///
/// Returns an `ExportError` if writing fails.
pub fn write_csv(results: &[NodeResult], writer: impl Write) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in results {
        wtr.write_record(&[
            r.id.clone(),
            format!("{:.4}", r.generation),
            format!("{:.4}", r.demand),
            format!("{:.4}", r.self_consumption),
            format!("{:.4}", r.ev_demand),
            format!("{:.4}", r.battery_capacity),
            format!("{:.4}", r.battery_soc_start),
            format!("{:.4}", r.battery_soc_end),
            format!("{:.4}", r.net_energy),
            format!("{:.4}", r.surplus),
            format!("{:.4}", r.deficit),
            format!("{:.4}", r.received),
            format!("{:.4}", r.given),
            format!("{:.4}", r.residual_surplus),
            format!("{:.4}", r.residual_deficit),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the full run report (nodes, transfers, summary) as pretty JSON.
///
/// # Errors
///
/// Returns an `ExportError` if file creation or serialization fails.
pub fn export_json(report: &RunReport, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_json(report, io::BufWriter::new(file))
}

/// Writes the run report as pretty JSON to any writer.
///
/// # Errors
///
/// Returns an `ExportError` if serialization or writing fails.
pub fn write_json(report: &RunReport, mut writer: impl Write) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::BatterySpec;
    use crate::devices::ev_charger::HOURS_PER_DAY;
    use crate::sim::engine::Engine;
    use crate::sim::types::{DemandSplit, Node};

    fn make_report() -> RunReport {
        let battery = BatterySpec::new(5.0, 1.0, 1.0, 1.0, 1.0).with_stored_kwh(0.0);
        Engine::new(vec![
            Node::new("sunny", 10.0, 2.0, battery.clone()),
            Node::new("busy", 1.0, 6.0, battery.clone()),
            Node::new("idle", 3.0, 3.0, battery),
        ])
        .run()
        .unwrap()
    }

    #[test]
    fn header_matches_schema() {
        let report = make_report();
        let mut buf = Vec::new();
        write_csv(&report.nodes, &mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let first_line = output.lines().next().unwrap_or("");
        assert_eq!(
            first_line,
            "id,generation_kwh,demand_kwh,self_consumption_kwh,ev_demand_kwh,\
             battery_capacity_kwh,\
             soc_start_kwh,soc_end_kwh,net_kwh,surplus_kwh,deficit_kwh,\
             received_kwh,given_kwh,residual_surplus_kwh,residual_deficit_kwh"
        );
    }

    #[test]
    fn one_row_per_node_in_order() {
        let report = make_report();
        let mut buf = Vec::new();
        write_csv(&report.nodes, &mut buf).unwrap();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        assert_eq!(rdr.headers().map(csv::StringRecord::len).ok(), Some(15));

        let ids: Vec<String> = rdr
            .records()
            .map(|rec| rec.unwrap()[0].to_string())
            .collect();
        assert_eq!(ids, ["sunny", "busy", "idle"]);
    }

    #[test]
    fn numeric_columns_parse() {
        let report = make_report();
        let mut buf = Vec::new();
        write_csv(&report.nodes, &mut buf).unwrap();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        for record in rdr.records() {
            let rec = record.unwrap();
            for i in 1..15 {
                assert!(rec[i].parse::<f64>().is_ok(), "column {i} should parse as f64");
            }
        }
    }

    #[test]
    fn demand_split_columns() {
        let split = DemandSplit {
            self_consumption_kwh: 1.5,
            ev_kwh: 4.5,
            ev_hourly_kwh: [0.0; HOURS_PER_DAY],
        };
        let report = Engine::new(vec![
            Node::new("ev", 1.0, 6.0, BatterySpec::default()).with_demand_split(split),
        ])
        .run()
        .unwrap();
        let mut buf = Vec::new();
        write_csv(&report.nodes, &mut buf).unwrap();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(&headers[3], "self_consumption_kwh");
        assert_eq!(&headers[4], "ev_demand_kwh");
        let rec = rdr.records().next().unwrap().unwrap();
        assert_eq!(&rec[3], "1.5000");
        assert_eq!(&rec[4], "4.5000");
    }

    #[test]
    fn deterministic_output() {
        let report = make_report();
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_csv(&report.nodes, &mut buf1).unwrap();
        write_csv(&report.nodes, &mut buf2).unwrap();
        assert_eq!(buf1, buf2);
    }

    #[test]
    fn json_contains_all_sections() {
        let report = make_report();
        let mut buf = Vec::new();
        write_json(&report, &mut buf).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["nodes"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["transfers"][0]["from"], "sunny");
        assert_eq!(json["summary"]["node_count"], 3);
        assert!(json["summary"].get("total_ev_demand_kwh").is_some());
        assert!(json["nodes"][0].get("ev_demand").is_some());
    }
}
