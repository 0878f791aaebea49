pub mod explore;
pub mod handlers;
pub mod icons;
pub mod search;
