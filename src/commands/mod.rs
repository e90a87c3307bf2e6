pub mod db;
pub mod fixtures;
pub mod gateway;
pub mod onboarding;
pub mod reports;
pub mod settings;
pub mod submission;
