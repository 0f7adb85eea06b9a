pub mod account;
pub mod certificate;
pub mod report;
pub mod upload;
