pub mod market;
pub mod news;

pub use market::{Candle, PricePoint};
pub use news::NewsArticle;
