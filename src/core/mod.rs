pub mod client;
pub mod mapper;
pub mod transform;

pub use crate::domain::model::{
    FieldMapping, MappedValue, Record, TargetSpec, TransformKind, TransformedRecord,
};
pub use crate::domain::ports::Transport;
pub use crate::utils::error::Result;
