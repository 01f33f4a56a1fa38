//! Session management for the interactive metadata workflow.
//!
//! A session holds one uploaded dataset together with the analyses and
//! confirmations made on it. [`MetadataWorkflow`] exposes the operations a
//! request-handling layer (CLI, web or desktop) calls, one per user action.
//!
//! # Example
//!
//! ```rust,ignore
//! use dataset_metadata::config::AppConfig;
//! use dataset_metadata::dataset::Dataset;
//! use dataset_metadata::session::MetadataWorkflow;
//!
//! let workflow = MetadataWorkflow::from_config(&AppConfig::default())?;
//! let id = workflow.create_session(Dataset::from_csv("customers.csv")?, "", "");
//! workflow.set_dataset_info(&id, "Customers", "Active customer accounts")?;
//!
//! let analysis = workflow.analyze_column(&id, "plan")?;
//! workflow.confirm_column(&id, "plan", Some(analysis.suggested_type), Some(&analysis.description))?;
//!
//! let metadata = workflow.metadata(&id)?;
//! ```

mod store;
mod workflow;

pub use store::{InMemorySessionStore, Session, SessionStore};
pub use workflow::MetadataWorkflow;
