//! CAOM product listings for one or more product group IDs.

use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::mast::client::MastClient;

const PRODUCTS_SERVICE: &str = "Mast.Caom.Products";

/// List of CAOM products for one or more CAOM observation IDs.
#[derive(Debug, Clone)]
pub struct CaomProductList {
    obsid: String,
    pub products: Vec<Map<String, Value>>,
}

impl CaomProductList {
    /// Fetch the product list for obsids given as a comma-separated
    /// string of integers.
    pub fn fetch(client: &MastClient, caom_obsid: &str) -> Result<Self> {
        let obsid = parse_caom_obsid(caom_obsid)?;
        Self::fetch_parsed(client, obsid)
    }

    /// Fetch the product list for a slice of numeric obsids.
    pub fn fetch_ids(client: &MastClient, caom_obsid: &[i64]) -> Result<Self> {
        if caom_obsid.is_empty() {
            return Err(Error::Query(
                "CAOM obsid must evaluate to one or more integers".to_string(),
            ));
        }
        let obsid = caom_obsid
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self::fetch_parsed(client, obsid)
    }

    fn fetch_parsed(client: &MastClient, obsid: String) -> Result<Self> {
        let response = client.service_request(PRODUCTS_SERVICE, &json!({ "obsid": obsid }))?;
        Ok(Self {
            obsid,
            products: response.data,
        })
    }

    /// CAOM obsid list as a comma-separated string.
    pub fn obsid(&self) -> &str {
        &self.obsid
    }
}

/// Normalize an obsid specification: every comma-separated element must
/// parse as an integer.
fn parse_caom_obsid(caom_obsid: &str) -> Result<String> {
    let ids = caom_obsid
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .map_err(|_| Error::Query(
                    "CAOM obsid must evaluate to one or more integers".to_string(),
                ))
        })
        .collect::<Result<Vec<i64>>>()?;
    Ok(ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(","))
}
