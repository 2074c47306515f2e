/// The fixed set of coins the bot answers for. Lookup is a gate in front of
/// every upstream call; nothing is fetched for an unknown name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinEntry {
    pub display_name: &'static str,
    /// CoinGecko coin id.
    pub api_id: &'static str,
}

pub const SUPPORTED_COINS: &[CoinEntry] = &[
    CoinEntry { display_name: "Bitcoin", api_id: "bitcoin" },
    CoinEntry { display_name: "Ethereum", api_id: "ethereum" },
    CoinEntry { display_name: "Solana", api_id: "solana" },
];

/// Case-insensitive exact match against the display names.
pub fn resolve(name: &str) -> Option<&'static CoinEntry> {
    SUPPORTED_COINS
        .iter()
        .find(|coin| coin.display_name.eq_ignore_ascii_case(name.trim()))
}
