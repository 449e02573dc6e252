//! Handler modules for the connector's MCP tools
//!
//! - `capture`: screenshot capture through the extension and connection status
//! - `elements`: the selected-element list

pub mod capture;
pub mod elements;
