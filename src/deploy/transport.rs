//! Transfer-protocol capability trait and the FTP implementation.
//!
//! The upload engine only needs three remote operations, so they live
//! behind [`Transport`] and the engine is tested against an in-memory fake
//! instead of a live server.

use std::io::Read;

use suppaftp::types::FileType;
use suppaftp::{FtpStream, Mode};
use thiserror::Error;

use crate::config::Credentials;

/// Errors from the transfer layer.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("FTP connection to {host} failed: {message}")]
    Connect { host: String, message: String },

    #[error("FTP login failed for {user}: {message}")]
    Login { user: String, message: String },

    #[error("failed to create remote directory {path}: {message}")]
    CreateDir { path: String, message: String },

    #[error("failed to store {path}: {message}")]
    Store { path: String, message: String },

    #[error("failed to read local tree: {0}")]
    LocalRead(#[from] std::io::Error),

    #[error("failed to close FTP session: {0}")]
    Close(String),
}

/// Remote operations the upload engine needs.
pub trait Transport {
    /// Create a single remote directory.
    fn mkdir(&mut self, path: &str) -> Result<(), TransferError>;

    /// Store a file's bytes at a remote path, returning the byte count.
    fn store(&mut self, path: &str, data: &mut dyn Read) -> Result<u64, TransferError>;

    /// End the session.
    fn close(&mut self) -> Result<(), TransferError>;
}

/// Plaintext FTP session in passive mode with binary transfers.
pub struct FtpTransport {
    stream: FtpStream,
}

impl FtpTransport {
    /// Connect and log in. Port 21 is assumed unless the host carries one.
    pub fn connect(credentials: &Credentials) -> Result<Self, TransferError> {
        let addr = if credentials.host.contains(':') {
            credentials.host.clone()
        } else {
            format!("{}:21", credentials.host)
        };

        let mut stream = FtpStream::connect(&addr).map_err(|e| TransferError::Connect {
            host: credentials.host.clone(),
            message: e.to_string(),
        })?;

        stream
            .login(&credentials.user, &credentials.password)
            .map_err(|e| TransferError::Login {
                user: credentials.user.clone(),
                message: e.to_string(),
            })?;

        stream.set_mode(Mode::Passive);
        stream
            .transfer_type(FileType::Binary)
            .map_err(|e| TransferError::Connect {
                host: credentials.host.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!(host = %credentials.host, user = %credentials.user, "FTP session opened");
        Ok(Self { stream })
    }
}

impl Transport for FtpTransport {
    fn mkdir(&mut self, path: &str) -> Result<(), TransferError> {
        self.stream
            .mkdir(path)
            .map_err(|e| TransferError::CreateDir {
                path: path.to_string(),
                message: e.to_string(),
            })
    }

    fn store(&mut self, path: &str, mut data: &mut dyn Read) -> Result<u64, TransferError> {
        self.stream
            .put_file(path, &mut data)
            .map_err(|e| TransferError::Store {
                path: path.to_string(),
                message: e.to_string(),
            })
    }

    fn close(&mut self) -> Result<(), TransferError> {
        self.stream
            .quit()
            .map_err(|e| TransferError::Close(e.to_string()))
    }
}
