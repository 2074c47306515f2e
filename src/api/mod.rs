pub mod coingecko;
pub mod news;

pub use coingecko::CoinGeckoClient;
pub use news::NewsClient;
