// client/mod.rs - Data layer and presentation helpers for the CLI
//
// api      HTTP wrapper with a cached record list
// form     registration/edit form validated with the shared rules
// table    dashboard filters, sorting, rendering and statistics
// export   CSV rendering
// session  stored admin token and the dashboard gate

pub mod api;
pub mod export;
pub mod form;
pub mod session;
pub mod table;

pub use api::{ApiClient, ClientError};
pub use export::{default_filename, format_date, to_csv, ExportError};
pub use form::{FormInput, FormMode, StudentForm, Submission};
pub use session::{require_session, SessionError, StoredSession};
pub use table::{render_table, sort_students, SortKey, SortOrder, Stats, StudentFilter};
