pub mod board;
pub mod report;
pub mod session;
pub mod submission;
pub mod tally;
