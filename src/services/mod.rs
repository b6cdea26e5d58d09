pub mod engagement;
pub mod recommendation;
pub mod rewards;
