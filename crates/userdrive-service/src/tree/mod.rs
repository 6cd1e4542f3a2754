//! Operations on a user's file tree.

pub mod breadcrumb;
pub mod download;
pub mod entry;
pub mod naming;
pub mod service;
pub mod upload;

pub use breadcrumb::breadcrumbs;
pub use download::{DownloadService, PublicFile};
pub use service::{Listing, Moved, Renamed, TreeService};
pub use upload::{PendingUpload, StoredUpload, UploadService};
