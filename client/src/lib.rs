pub mod admin;
pub mod api;
pub mod archive;
pub mod countdown;
pub mod error;
pub mod session;
pub mod submit;

pub use api::{ApiClient, FileFetcher};
pub use error::{ApiError, ApiErrorResponse, ClientError};
pub use session::{AuthToken, Session, TokenStore};
