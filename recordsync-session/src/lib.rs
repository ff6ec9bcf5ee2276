//! The editable-record controller.
//!
//! An [`EditSession`] drives one section of a page through
//! `Viewing → Editing → Submitting → Viewing`:
//!
//! 1. `start_editing` opens the draft held by the session's [`FieldBinder`]
//! 2. field writes go to the draft only
//! 3. `submit` validates the draft; nothing is sent unless it passes
//! 4. the validated payload goes to the section's mutation procedure
//! 5. the server's record is patched into the shared
//!    [`CacheStore`](recordsync_cache::CacheStore) under the section's
//!    sub-key, and becomes the new persisted value
//!
//! A failed submission always returns to `Editing` with the draft intact.
//!
//! # Example
//!
//! ```
//! use recordsync_cache::CacheStore;
//! use recordsync_model::{FieldRule, RecordSchema};
//! use recordsync_rpc::{mock::MockProcedureClient, Procedure};
//! use recordsync_session::{Page, SessionState};
//! use recordsync_types::{QueryKey, SubKey};
//! use std::sync::Arc;
//!
//! let page = Page::builder(
//!     QueryKey::parse("section.getSection").unwrap(),
//!     Procedure::parse("section.getSection").unwrap(),
//!     Arc::new(MockProcedureClient::new()),
//!     CacheStore::new(),
//! )
//! .section(
//!     SubKey::parse("termsAndConditions").unwrap(),
//!     Procedure::parse("section.termsConditions").unwrap(),
//!     RecordSchema::new(
//!         "termsConditions",
//!         vec![FieldRule::text("title"), FieldRule::rich_text("description")],
//!     ),
//! )
//! .build();
//!
//! let terms = page.section(&SubKey::parse("termsAndConditions").unwrap()).unwrap();
//! assert_eq!(terms.state(), SessionState::Viewing);
//! ```

mod binder;
mod config;
mod error;
mod page;
mod session;
mod state;

pub use binder::{FieldBinder, FileUpload, WidgetValue};
pub use config::SessionConfig;
pub use error::{SessionError, SessionResult, SubmitError};
pub use page::{Page, PageBuilder};
pub use session::{EditSession, SectionSpec};
pub use state::SessionState;
