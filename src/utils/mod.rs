pub mod crypto;
pub mod logging;
pub mod markup;
pub mod responses;
