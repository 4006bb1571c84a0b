//! Collaborator-facing data model and file loaders

mod data;
mod loader;

pub use data::{
    AprSample, BatchInput, BondEvent, BondEventKind, DistributionFlow, FlowDirection,
    OperatorInput,
};
pub use loader::{load_apr_history, load_operator_inputs, LoadError};
