pub mod columns;
pub mod dates;
pub mod duration;
pub mod fees;
pub mod links;
pub mod royalty;
pub mod rows;
pub mod text;
