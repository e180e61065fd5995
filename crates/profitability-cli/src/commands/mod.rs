pub mod allocate;
pub mod options;
pub mod report;
