pub mod analyze;
pub mod export;
pub mod fetch;
pub mod publish;
pub mod run;
pub mod status;
