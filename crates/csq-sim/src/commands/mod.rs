pub mod export;
pub mod gaussian;
pub mod run;
