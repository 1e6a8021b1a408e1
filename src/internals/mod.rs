mod event_request_path;
pub use self::event_request_path::*;

mod pipe;
pub use self::pipe::*;
