pub mod evolve;
pub mod fluct;
pub mod run;
pub mod version;
