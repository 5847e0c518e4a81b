pub mod countdown;
pub mod filters;
pub mod naming;
pub mod paths;
pub mod selection;
pub mod submission;
pub mod table;
