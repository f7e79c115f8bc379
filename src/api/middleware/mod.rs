pub mod logging;

pub use logging::{request_logger, RequestId, REQUEST_ID_HEADER};
