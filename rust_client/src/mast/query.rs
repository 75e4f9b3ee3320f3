//! Filtered queries over JWST FITS header keyword values.

use chrono::DateTime;
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::mast::client::{MastClient, MastField};
use crate::time::mjd::mjd_from_str;

/// JWST keyword collections queryable through the filtered services.
/// Closed enumeration; each collection has its own service access point
/// and instrument-configuration columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JwstCollection {
    Fgs,
    GuideStar,
    Miri,
    Nircam,
    Niriss,
    Nirspec,
}

impl JwstCollection {
    pub fn as_str(&self) -> &'static str {
        match self {
            JwstCollection::Fgs => "Fgs",
            JwstCollection::GuideStar => "GuideStar",
            JwstCollection::Miri => "Miri",
            JwstCollection::Nircam => "Nircam",
            JwstCollection::Niriss => "Niriss",
            JwstCollection::Nirspec => "Nirspec",
        }
    }

    /// Service access point for this collection.
    pub fn service(&self) -> String {
        format!("Mast.Jwst.Filtered.{}", self.as_str())
    }

    fn instrument_columns(&self) -> &'static str {
        match self {
            JwstCollection::Fgs => "lamp",
            JwstCollection::GuideStar => "gdstarid, gs_order",
            JwstCollection::Miri => "filter, coronmsk, lamp",
            JwstCollection::Nircam => "module, channel, pupil, filter, coronmsk",
            JwstCollection::Niriss => "pupil, filter, lamp",
            JwstCollection::Nirspec => "filter, grating, msastate, lamp",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum QueryFilter {
    Values { param: String, values: Vec<String> },
    MinMax { param: String, min: f64, max: f64 },
}

impl QueryFilter {
    fn to_json(&self) -> Value {
        match self {
            QueryFilter::Values { param, values } => json!({
                "paramName": param,
                "values": values,
            }),
            QueryFilter::MinMax { param, min, max } => json!({
                "paramName": param,
                "values": [{"min": min, "max": max}],
            }),
        }
    }
}

/// MAST API query based on JWST FITS header keyword values.
///
/// # Examples
///
/// ```
/// use jwst_rust::mast::query::{JwstCollection, JwstFilteredQuery};
///
/// let mut query = JwstFilteredQuery::new(JwstCollection::Nirspec);
/// query.filter_by_values("readpatt", "NRSRAPID, NRSIRS2RAPID");
/// query.filter_by_minmax("nints", 2.0, 99.0);
/// query.filter_by_timerange("date_beg", "2022-04-02 05:00:00", "59671.8").unwrap();
/// query.append_output_columns("pi_name");
/// ```
#[derive(Debug, Clone)]
pub struct JwstFilteredQuery {
    collection: JwstCollection,
    columns: Vec<String>,
    all_columns: bool,
    filters: Vec<QueryFilter>,
}

impl JwstFilteredQuery {
    /// Create a query with the collection's default output columns and no
    /// filters.
    pub fn new(collection: JwstCollection) -> Self {
        let mut query = Self {
            collection,
            columns: Vec::new(),
            all_columns: false,
            filters: Vec::new(),
        };
        query.set_output_columns_to_default();
        query
    }

    pub fn collection(&self) -> JwstCollection {
        self.collection
    }

    /// Require a keyword value to be in an enumerated list. Input is a
    /// comma-separated string; whitespace around commas is ignored.
    pub fn filter_by_values(&mut self, keyword: &str, values: &str) {
        let values = values
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        self.filters.push(QueryFilter::Values {
            param: keyword.to_string(),
            values,
        });
    }

    /// Require a keyword value to be in the specified range.
    pub fn filter_by_minmax(&mut self, keyword: &str, min: f64, max: f64) {
        self.filters.push(QueryFilter::MinMax {
            param: keyword.to_string(),
            min,
            max,
        });
    }

    /// Require a time keyword to be in the specified range.
    ///
    /// The filter is applied to the `_mjd` variant of the keyword because
    /// queries fail for non-MJD time keywords. Bounds may be JD, MJD, or
    /// ISO 8601 strings; see [`mjd_from_str`].
    pub fn filter_by_timerange(&mut self, keyword: &str, min: &str, max: &str) -> Result<()> {
        let param = if keyword.to_lowercase().ends_with("_mjd") {
            keyword.to_string()
        } else {
            format!("{keyword}_mjd")
        };
        let min = mjd_from_str(min)?.value();
        let max = mjd_from_str(max)?.value();
        self.filters.push(QueryFilter::MinMax { param, min, max });
        Ok(())
    }

    /// Replace the output column list.
    pub fn set_output_columns(&mut self, column_names: &str) {
        self.columns.clear();
        self.all_columns = false;
        self.append_output_columns(column_names);
    }

    /// Reset the output columns to the per-collection defaults.
    pub fn set_output_columns_to_default(&mut self) {
        self.columns.clear();
        self.all_columns = false;
        self.append_output_columns("date_beg, obs_id, category, targname");
        if self.collection != JwstCollection::GuideStar {
            self.append_output_columns("template, expripar, numdthpt");
        }
        self.append_output_columns("apername");
        self.append_output_columns(self.collection.instrument_columns());
        self.append_output_columns("exp_type, detector, subarray");
        self.append_output_columns("readpatt, nints, ngroups, duration");
        self.append_output_columns("productLevel, filename");
    }

    /// Request all columns (`*`).
    pub fn set_output_columns_to_all(&mut self) {
        self.columns.clear();
        self.all_columns = true;
    }

    /// Append comma-separated column names, skipping duplicates.
    pub fn append_output_columns(&mut self, column_names: &str) {
        for name in column_names.split(',') {
            let stripped = name.trim();
            if !stripped.is_empty() && !self.columns.iter().any(|c| c == stripped) {
                self.columns.push(stripped.to_string());
            }
        }
    }

    /// Remove comma-separated column names from the current list.
    pub fn remove_output_columns(&mut self, column_names: &str) {
        for name in column_names.split(',') {
            let stripped = name.trim();
            self.columns.retain(|c| c != stripped);
        }
    }

    pub fn output_columns(&self) -> &[String] {
        &self.columns
    }

    /// Parameter object sent to the service.
    pub fn params(&self) -> Result<Value> {
        if self.filters.is_empty() {
            return Err(Error::Query(
                "add search filter(s) before executing query".to_string(),
            ));
        }
        if !self.all_columns && self.columns.is_empty() {
            return Err(Error::Query(
                "specify output columns before executing query".to_string(),
            ));
        }
        let columns = if self.all_columns {
            "*".to_string()
        } else {
            self.columns.join(",")
        };
        let filters: Vec<Value> = self.filters.iter().map(QueryFilter::to_json).collect();
        Ok(json!({
            "columns": columns,
            "filters": filters,
        }))
    }

    /// Execute the query. `/Date(ms)/` values in the result are converted
    /// to ISO 8601.
    pub fn execute(&self, client: &MastClient) -> Result<QueryResult> {
        let params = self.params()?;
        let response = client.service_request(&self.collection.service(), &params)?;
        let mut result = QueryResult {
            rows: response.data,
            fields: response.fields,
        };
        result.convert_dates();
        Ok(result)
    }
}

/// Rows and column descriptors returned by a filtered query.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub rows: Vec<Map<String, Value>>,
    pub fields: Vec<MastField>,
}

impl QueryResult {
    /// Convert values containing `/Date(ms)/` tokens to ISO 8601 strings.
    pub fn convert_dates(&mut self) {
        for row in &mut self.rows {
            for value in row.values_mut() {
                if let Value::String(text) = value {
                    if let Some(iso) = mast_date_to_iso(text) {
                        *value = Value::String(iso);
                    }
                }
            }
        }
    }

    /// Dataset names for the result: filenames with their trailing
    /// product suffix removed, unique and sorted.
    pub fn dataset_names(&self) -> Vec<String> {
        let mut roots: Vec<String> = self
            .rows
            .iter()
            .filter_map(|row| row.get("filename").and_then(Value::as_str))
            .filter_map(|name| name.rsplit_once('_').map(|(root, _)| root.to_string()))
            .collect();
        roots.sort();
        roots.dedup();
        roots
    }
}

/// Parse a MAST `/Date(<13-digit ms>)/` token into an ISO 8601 string
/// with millisecond precision.
fn mast_date_to_iso(text: &str) -> Option<String> {
    if text.len() != 21 || !text.starts_with("/Date(") || !text.ends_with(")/") {
        return None;
    }
    let digits = &text[6..19];
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let millis: i64 = digits.parse().ok()?;
    let dt = DateTime::from_timestamp_millis(millis)?;
    Some(dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_columns_include_shared_and_instrument_fields() {
        let query = JwstFilteredQuery::new(JwstCollection::Nirspec);
        let columns = query.output_columns();
        assert!(columns.iter().any(|c| c == "date_beg"));
        assert!(columns.iter().any(|c| c == "grating"));
        assert!(columns.iter().any(|c| c == "template"));
        assert!(columns.iter().any(|c| c == "filename"));
    }

    #[test]
    fn guidestar_defaults_skip_template_columns() {
        let query = JwstFilteredQuery::new(JwstCollection::GuideStar);
        let columns = query.output_columns();
        assert!(columns.iter().any(|c| c == "gdstarid"));
        assert!(!columns.iter().any(|c| c == "template"));
    }

    #[test]
    fn append_deduplicates_and_trims() {
        let mut query = JwstFilteredQuery::new(JwstCollection::Miri);
        let before = query.output_columns().len();
        query.append_output_columns(" filter , pi_name ");
        let columns = query.output_columns();
        assert_eq!(columns.len(), before + 1);
        assert!(columns.iter().any(|c| c == "pi_name"));
    }

    #[test]
    fn remove_drops_named_columns() {
        let mut query = JwstFilteredQuery::new(JwstCollection::Miri);
        query.remove_output_columns("filename, lamp");
        let columns = query.output_columns();
        assert!(!columns.iter().any(|c| c == "filename"));
        assert!(!columns.iter().any(|c| c == "lamp"));
    }

    #[test]
    fn params_require_filters_and_columns() {
        let query = JwstFilteredQuery::new(JwstCollection::Fgs);
        assert!(matches!(query.params(), Err(Error::Query(_))));

        let mut query = JwstFilteredQuery::new(JwstCollection::Fgs);
        query.filter_by_values("detector", "GUIDER1");
        assert!(query.params().is_ok());
    }

    #[test]
    fn params_shape_matches_the_service_protocol() {
        let mut query = JwstFilteredQuery::new(JwstCollection::Nirspec);
        query.filter_by_values("detector", "NRS1, NRS2");
        query.filter_by_minmax("nints", 2.0, 99.0);
        let params = query.params().unwrap();

        let filters = params["filters"].as_array().unwrap();
        assert_eq!(filters[0]["paramName"], "detector");
        assert_eq!(filters[0]["values"], json!(["NRS1", "NRS2"]));
        assert_eq!(filters[1]["values"], json!([{"min": 2.0, "max": 99.0}]));
        assert!(params["columns"].as_str().unwrap().contains("date_beg"));
    }

    #[test]
    fn timerange_filter_targets_the_mjd_keyword() {
        let mut query = JwstFilteredQuery::new(JwstCollection::Nirspec);
        query
            .filter_by_timerange("date_beg", "2022-04-02T11:00:00", "59671.8")
            .unwrap();
        let params = query.params().unwrap();
        let filter = &params["filters"].as_array().unwrap()[0];
        assert_eq!(filter["paramName"], "date_beg_mjd");
        let bounds = &filter["values"].as_array().unwrap()[0];
        assert!((bounds["min"].as_f64().unwrap() - 59671.458333).abs() < 1e-5);
        assert_eq!(bounds["max"].as_f64().unwrap(), 59671.8);

        // Keywords already in MJD form are used as-is.
        let mut query = JwstFilteredQuery::new(JwstCollection::Nirspec);
        query.filter_by_timerange("date_beg_mjd", "59671.5", "59672.0").unwrap();
        let params = query.params().unwrap();
        assert_eq!(params["filters"][0]["paramName"], "date_beg_mjd");
    }

    #[test]
    fn mast_date_tokens_become_iso_strings() {
        assert_eq!(
            mast_date_to_iso("/Date(1649031957000)/").as_deref(),
            Some("2022-04-04T00:25:57.000")
        );
        assert_eq!(mast_date_to_iso("/Date(abc)/"), None);
        assert_eq!(mast_date_to_iso("2022-04-04"), None);
    }

    #[test]
    fn dataset_names_are_unique_sorted_roots() {
        let rows: Vec<Map<String, Value>> = [
            "jw01118005001_04101_00001-seg001_nrs1_uncal.fits",
            "jw01118005001_04101_00001-seg001_nrs1_rate.fits",
            "jw01118005001_04101_00001-seg001_nrs2_uncal.fits",
        ]
        .iter()
        .map(|name| {
            let mut row = Map::new();
            row.insert("filename".to_string(), Value::String(name.to_string()));
            row
        })
        .collect();

        let result = QueryResult { rows, fields: Vec::new() };
        assert_eq!(
            result.dataset_names(),
            vec![
                "jw01118005001_04101_00001-seg001_nrs1".to_string(),
                "jw01118005001_04101_00001-seg001_nrs2".to_string(),
            ]
        );
    }
}
