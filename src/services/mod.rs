pub mod providers;
pub mod watchlist;
