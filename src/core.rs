pub mod battery;
pub mod error;
pub mod request;
pub mod transition;
pub mod warning;
