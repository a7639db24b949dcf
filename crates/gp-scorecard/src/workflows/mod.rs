pub mod bonus;
pub mod intake;
pub mod reports;
pub mod roster;
