use energy_client::domain::GenerationRecord;

use crate::error::EnergyError;

pub const CSV_HEADER: [&str; 4] = ["Period", "State", "Fuel Type", "Generation (MWh)"];
pub const CSV_FILENAME: &str = "report.csv";

/// Render records as a CSV report, one line per record after the header.
///
/// Fields are quoted by the `csv` writer whenever they contain a delimiter,
/// quote or line break. Missing generation renders as an empty field.
pub fn records_to_csv(records: &[GenerationRecord]) -> Result<String, EnergyError> {
    let mut wtr = csv::Writer::from_writer(Vec::with_capacity(64 * (records.len() + 1)));

    wtr.write_record(CSV_HEADER)
        .map_err(|e| EnergyError::Export(format!("failed to write CSV header: {e}")))?;

    for r in records {
        let generation = r.generation_mwh.map(|v| v.to_string()).unwrap_or_default();
        wtr.write_record([
            r.period.as_str(),
            r.region_code.as_str(),
            r.fuel_type.as_str(),
            generation.as_str(),
        ])
        .map_err(|e| EnergyError::Export(format!("failed to write CSV record: {e}")))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| EnergyError::Export(format!("failed to flush CSV: {e}")))?;

    String::from_utf8(bytes).map_err(|e| EnergyError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(region: &str, period: &str, fuel: &str, mwh: Option<f64>) -> GenerationRecord {
        GenerationRecord {
            region_code: region.to_string(),
            period: period.to_string(),
            sector: "All Sectors".to_string(),
            fuel_type: fuel.to_string(),
            generation_mwh: mwh,
        }
    }

    #[test]
    fn header_only_for_empty_store() {
        assert_eq!(records_to_csv(&[]).unwrap(), "Period,State,Fuel Type,Generation (MWh)\n");
    }

    #[test]
    fn one_line_per_record_in_order() {
        let csv = records_to_csv(&[
            record("CA", "2024-03", "SUN", Some(3120.5)),
            record("TX", "2024-02", "WND", Some(98000.0)),
            record("TX", "2024-01", "WND", None),
        ])
        .unwrap();

        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines,
            [
                "Period,State,Fuel Type,Generation (MWh)",
                "2024-03,CA,SUN,3120.5",
                "2024-02,TX,WND,98000",
                "2024-01,TX,WND,",
            ]
        );
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let csv = records_to_csv(&[record("CA", "2024-03", "SUN, utility", Some(1.0))]).unwrap();

        assert!(csv.ends_with("2024-03,CA,\"SUN, utility\",1\n"));

        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        let row = rdr.records().next().unwrap().unwrap();
        assert_eq!(&row[2], "SUN, utility");
    }
}
