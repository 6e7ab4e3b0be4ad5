pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::Cli;

pub use crate::adapters::http::ReqwestTransport;
pub use crate::config::{ClientConfig, MappingConfig};
pub use crate::core::client::{build_auth_header, PinnedForm, ResourceClient};
pub use crate::core::mapper::{
    map_records, parse_payload, process, serialize, ErrorPolicy, ProcessReport, RecordMapper,
};
pub use crate::domain::model::{FieldMapping, MappedValue, Record, TargetSpec, TransformKind, TransformedRecord};
pub use crate::utils::error::{EtlError, Result};
