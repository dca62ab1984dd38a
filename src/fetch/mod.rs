//! Fetches the calendar table from the source page.

pub mod html;

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::table::{ColumnMap, RawTable, Table};

/// Produces the current table for a cycle.
pub trait TableFetcher {
    fn name(&self) -> &'static str;

    /// The first table carrying every mapped column, reduced to those six.
    fn fetch_table(&self, columns: &ColumnMap) -> Result<Table>;
}

pub struct HttpTableSource {
    client: Client,
    url: String,
}

impl HttpTableSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let url = config.require_url()?.to_string();
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(HttpTableSource { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn get(&self) -> Result<String> {
        let response = self.client.get(&self.url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }
        Ok(response.text()?)
    }
}

impl TableFetcher for HttpTableSource {
    fn name(&self) -> &'static str {
        "http"
    }

    fn fetch_table(&self, columns: &ColumnMap) -> Result<Table> {
        let document = self.get()?;
        let tables = html::parse_tables(&document);
        debug!(url = %self.url, tables = tables.len(), "parsed html page");

        let table = select_table(&tables, columns).ok_or_else(|| Error::NoMatchingTable {
            url: self.url.clone(),
        })?;
        info!(url = %self.url, rows = table.len(), "table found in html page");
        Ok(table)
    }
}

/// First table whose headers are a superset of the mapped columns.
pub fn select_table(tables: &[RawTable], columns: &ColumnMap) -> Option<Table> {
    tables
        .iter()
        .find_map(|raw| Table::from_raw(raw, columns).ok())
}
