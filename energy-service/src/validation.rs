use crate::error::EnergyError;

pub const MAX_REGION_LEN: usize = 32;

/// Normalise and check a region code taken from a query string.
///
/// Rules:
/// - surrounding whitespace is ignored;
/// - must be non-empty and at most `MAX_REGION_LEN` characters;
/// - only ASCII alphanumerics, `-` and `_` are allowed.
///
/// The result is upper-cased so `ca` and `CA` share one cache entry.
pub fn validate_region(raw: &str) -> Result<String, EnergyError> {
    check_region(raw.trim()).inspect_err(|_| {
        metrics::counter!("validation_region_rejected_total").increment(1);
    })
}

/// Validate a batch of region codes, reporting every bad one at once.
pub fn validate_regions<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>, EnergyError> {
    let mut regions = Vec::with_capacity(raw.len());
    let mut invalid = Vec::new();

    for r in raw {
        match validate_region(r.as_ref()) {
            Ok(region) => regions.push(region),
            Err(e) => invalid.push(format!("{:?}: {e}", r.as_ref())),
        }
    }

    if !invalid.is_empty() {
        return Err(EnergyError::Validation(invalid.join("; ")));
    }
    Ok(regions)
}

fn check_region(code: &str) -> Result<String, EnergyError> {
    if code.is_empty() {
        return Err(EnergyError::Validation("region code must not be empty".to_string()));
    }

    if code.len() > MAX_REGION_LEN {
        return Err(EnergyError::Validation(format!(
            "region code longer than {MAX_REGION_LEN} characters"
        )));
    }

    if let Some(bad) = code
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(EnergyError::Validation(format!(
            "region code contains invalid character {bad:?}"
        )));
    }

    Ok(code.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_aggregate_code() {
        assert_eq!(validate_region("US-TOTAL").unwrap(), "US-TOTAL");
    }

    #[test]
    fn normalises_case_and_whitespace() {
        assert_eq!(validate_region("  ca ").unwrap(), "CA");
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(validate_region("   "), Err(EnergyError::Validation(_))));
    }

    #[test]
    fn rejects_sql_like_input() {
        assert!(matches!(
            validate_region("CA'; DROP TABLE energy_data"),
            Err(EnergyError::Validation(_))
        ));
    }

    #[test]
    fn every_rejection_is_counted() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            assert!(validate_region("").is_err());
            assert!(validate_region(&"X".repeat(MAX_REGION_LEN + 1)).is_err());
            assert!(validate_region("C'A").is_err());
            assert!(validate_region("CA").is_ok());
        });

        assert!(handle.render().contains("validation_region_rejected_total 3"));
    }

    #[test]
    fn batch_reports_all_bad_codes() {
        let err = validate_regions(&["ca", "T X", "US-TOTAL", ""]).unwrap_err();

        let msg = match err {
            EnergyError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        };
        assert!(msg.contains("\"T X\""));
        assert!(msg.contains("\"\""));
        assert!(!msg.contains("US-TOTAL"));
    }

    #[test]
    fn batch_normalises_good_codes() {
        assert_eq!(validate_regions(&["ca", " tx "]).unwrap(), ["CA", "TX"]);
    }

    #[test]
    fn rejects_overlong_code() {
        let code = "X".repeat(MAX_REGION_LEN + 1);
        assert!(matches!(validate_region(&code), Err(EnergyError::Validation(_))));
    }
}
