//! Remote mirroring of the build output tree.
//!
//! - **transport**: minimal capability trait over the transfer protocol
//!   (create directory, store file, close) plus the FTP implementation
//! - **upload**: recursive directory-mirroring engine and dry-run planner
//!
//! The upload is additive: files are stored and directories created, but
//! nothing is ever deleted on the remote side. A partially failed deploy
//! leaves whatever was already transferred in place.
//!
//! # Example
//!
//! ```rust,ignore
//! use pagelift::deploy::{FtpTransport, Uploader};
//!
//! let transport = FtpTransport::connect(&config.credentials)?;
//! let mut uploader = Uploader::new(transport);
//! let report = uploader.mirror_tree(&build_dir, "www")?;
//! uploader.close()?;
//! println!("uploaded {} files", report.files_uploaded);
//! ```

pub mod transport;
pub mod upload;

pub use transport::{FtpTransport, TransferError, Transport};
pub use upload::{UploadReport, Uploader, plan_tree};
