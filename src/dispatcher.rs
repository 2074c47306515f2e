use crate::api::{CoinGeckoClient, NewsClient};
use crate::chart;
use crate::coins::{self, CoinEntry, SUPPORTED_COINS};
use crate::models::NewsArticle;
use log::error;

const UNKNOWN_COIN: &str =
    "❌ Unbekannte Kryptowährung. Bitte nutze Bitcoin, Ethereum oder Solana.";
const PRICE_FAILED: &str =
    "Fehler: Konnte die Preisdaten nicht abrufen. Versuche es später erneut.";
const NEWS_FAILED: &str =
    "Fehler: Konnte die Nachrichten nicht abrufen. Überprüfe deinen API-Key oder versuche es später.";
const CHART_DATA_UNAVAILABLE: &str =
    "Fehler: Konnte keine historischen Daten für den Chart abrufen.";
const CHART_RENDER_FAILED: &str = "Fehler: Der Chart konnte nicht erstellt werden.";
const UNEXPECTED_FAILURE: &str =
    "Ein unerwarteter Fehler ist aufgetreten. Bitte versuche es später erneut.";

/// What a handled `chart` command sends back after the acknowledgement.
#[derive(Debug)]
pub enum ChartReply {
    Text(String),
    Photo { png: Vec<u8>, caption: String },
}

/// Maps validated commands onto the data clients and the renderer and turns
/// every outcome, including failures, into a fixed user-visible reply. Holds
/// no per-command state; one instance serves all chats.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    market: CoinGeckoClient,
    news: NewsClient,
}

impl Dispatcher {
    pub fn new(market: CoinGeckoClient, news: NewsClient) -> Self {
        Self { market, news }
    }

    pub fn welcome_text(&self, user_name: &str) -> String {
        let coin_list = SUPPORTED_COINS
            .iter()
            .map(|c| c.display_name)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Hallo {}! Ich bin dein Krypto-Informations-Bot.\n\n\
             Du kannst die folgenden Befehle verwenden:\n\
             ➡️ /price [coin] - Aktueller Preis (z.B. /price bitcoin)\n\
             ➡️ /news [coin] - Neueste Nachrichten (z.B. /news solana)\n\
             ➡️ /chart [coin] - Technischer Chart (z.B. /chart ethereum)\n\n\
             Unterstützte Coins: {}",
            user_name, coin_list
        )
    }

    /// Argument gate shared by all parameterized commands: missing-argument
    /// check first, then the registry lookup. Runs before any network call;
    /// the `Err` carries the complete corrective reply.
    pub fn validate_coin(&self, arg: &str, usage_example: &str) -> Result<&'static CoinEntry, String> {
        let arg = arg.trim();
        if arg.is_empty() {
            return Err(format!(
                "⚠️ Bitte gib eine Kryptowährung an. Beispiel: {}",
                usage_example
            ));
        }
        coins::resolve(arg).ok_or_else(|| UNKNOWN_COIN.to_string())
    }

    pub async fn price_reply(&self, arg: &str) -> String {
        let coin = match self.validate_coin(arg, "/price bitcoin") {
            Ok(coin) => coin,
            Err(reply) => return reply,
        };
        match self.market.get_simple_price(coin.api_id).await {
            Ok(point) => format!("{}: {} €", coin.display_name, point.price_eur),
            Err(e) => {
                error!("price lookup for {} failed: {}", coin.api_id, e);
                PRICE_FAILED.to_string()
            }
        }
    }

    pub async fn news_reply(&self, arg: &str) -> String {
        let coin = match self.validate_coin(arg, "/news ethereum") {
            Ok(coin) => coin,
            Err(reply) => return reply,
        };
        match self.news.get_recent_news(coin.api_id).await {
            Ok(articles) if articles.is_empty() => format!(
                "Keine aktuellen Nachrichten für {} gefunden.",
                coin.display_name
            ),
            Ok(articles) => format_news(coin, &articles),
            Err(e) => {
                error!("news lookup for {} failed: {}", coin.api_id, e);
                NEWS_FAILED.to_string()
            }
        }
    }

    /// Fixed acknowledgement sent between validation and the OHLC fetch.
    pub fn chart_ack(&self, coin: &CoinEntry) -> String {
        format!(
            "⏳ Erstelle Chart für {}, bitte einen Moment Geduld...",
            coin.display_name
        )
    }

    pub async fn chart_reply(&self, coin: &CoinEntry) -> ChartReply {
        let candles = match self.market.get_ohlc(coin.api_id, chart::LOOKBACK_DAYS).await {
            Ok(candles) => candles,
            Err(e) => {
                error!("OHLC fetch for {} failed: {}", coin.api_id, e);
                return ChartReply::Text(CHART_DATA_UNAVAILABLE.to_string());
            }
        };
        if candles.is_empty() {
            return ChartReply::Text(CHART_DATA_UNAVAILABLE.to_string());
        }

        let title = format!("Kurschart für {}", coin.display_name);
        match chart::render(&candles, &title) {
            Ok(Some(png)) => ChartReply::Photo {
                png,
                caption: format!(
                    "Technischer Chart für {} ({} Tage)",
                    coin.display_name,
                    chart::LOOKBACK_DAYS
                ),
            },
            Ok(None) => ChartReply::Text(CHART_RENDER_FAILED.to_string()),
            Err(e) => {
                error!("chart rendering for {} failed: {}", coin.api_id, e);
                ChartReply::Text(UNEXPECTED_FAILURE.to_string())
            }
        }
    }
}

fn format_news(coin: &CoinEntry, articles: &[NewsArticle]) -> String {
    let mut message = format!("📰 Neueste Nachrichten für {}:\n\n", coin.display_name);
    for article in articles {
        message.push_str(&format!("▪️ [{}]({})\n", article.title, article.url));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher(market_url: String, news_url: String) -> Dispatcher {
        Dispatcher::new(
            CoinGeckoClient::with_base_url(market_url),
            NewsClient::with_base_url(news_url, "test-key".to_string()),
        )
    }

    fn stub_dispatcher(server: &mockito::Server) -> Dispatcher {
        dispatcher(server.url(), server.url())
    }

    #[tokio::test]
    async fn unknown_coin_replies_without_any_upstream_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let dispatcher = stub_dispatcher(&server);

        assert_eq!(dispatcher.price_reply("dogecoin").await, UNKNOWN_COIN);
        assert_eq!(dispatcher.news_reply("DOGE").await, UNKNOWN_COIN);
        assert_eq!(
            dispatcher.validate_coin("ripple", "/chart bitcoin").unwrap_err(),
            UNKNOWN_COIN
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_argument_replies_with_the_usage_hint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let dispatcher = stub_dispatcher(&server);

        assert_eq!(
            dispatcher.price_reply("").await,
            "⚠️ Bitte gib eine Kryptowährung an. Beispiel: /price bitcoin"
        );
        assert_eq!(
            dispatcher.news_reply("   ").await,
            "⚠️ Bitte gib eine Kryptowährung an. Beispiel: /news ethereum"
        );
        assert_eq!(
            dispatcher.validate_coin("", "/chart bitcoin").unwrap_err(),
            "⚠️ Bitte gib eine Kryptowährung an. Beispiel: /chart bitcoin"
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn price_reply_names_the_coin_and_the_quote() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/simple/price")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"bitcoin":{"eur":61234.5}}"#)
            .create_async()
            .await;
        let dispatcher = stub_dispatcher(&server);

        let reply = dispatcher.price_reply("bitcoin").await;
        assert!(reply.contains("Bitcoin"));
        assert!(reply.contains("61234.5"));
    }

    #[tokio::test]
    async fn repeated_price_replies_are_identical() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/simple/price")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"bitcoin":{"eur":61234.5}}"#)
            .expect(2)
            .create_async()
            .await;
        let dispatcher = stub_dispatcher(&server);

        let first = dispatcher.price_reply("bitcoin").await;
        let second = dispatcher.price_reply("bitcoin").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn price_upstream_failure_becomes_the_retry_reply() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/simple/price")
            .match_query(mockito::Matcher::Any)
            .with_status(502)
            .create_async()
            .await;
        let dispatcher = stub_dispatcher(&server);

        assert_eq!(dispatcher.price_reply("ethereum").await, PRICE_FAILED);
    }

    #[tokio::test]
    async fn zero_articles_yield_the_no_news_reply() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/everything")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status":"ok","totalResults":0,"articles":[]}"#)
            .create_async()
            .await;
        let dispatcher = stub_dispatcher(&server);

        assert_eq!(
            dispatcher.news_reply("solana").await,
            "Keine aktuellen Nachrichten für Solana gefunden."
        );
    }

    #[tokio::test]
    async fn news_reply_lists_articles_in_upstream_order() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/everything")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"status":"ok","totalResults":2,"articles":[
                    {"title":"Erster Artikel","url":"https://example.com/1"},
                    {"title":"Zweiter Artikel","url":"https://example.com/2"}]}"#,
            )
            .create_async()
            .await;
        let dispatcher = stub_dispatcher(&server);

        let reply = dispatcher.news_reply("ethereum").await;
        assert_eq!(reply.matches("▪️").count(), 2);
        let first = reply.find("[Erster Artikel](https://example.com/1)").unwrap();
        let second = reply.find("[Zweiter Artikel](https://example.com/2)").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn empty_ohlc_series_skips_the_renderer() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/coins/bitcoin/ohlc")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let dispatcher = stub_dispatcher(&server);
        let coin = crate::coins::resolve("bitcoin").unwrap();

        match dispatcher.chart_reply(coin).await {
            ChartReply::Text(text) => assert_eq!(text, CHART_DATA_UNAVAILABLE),
            ChartReply::Photo { .. } => panic!("no chart expected for an empty series"),
        }
    }

    #[tokio::test]
    async fn ohlc_failure_yields_the_data_unavailable_reply() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/coins/solana/ohlc")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;
        let dispatcher = stub_dispatcher(&server);
        let coin = crate::coins::resolve("solana").unwrap();

        match dispatcher.chart_reply(coin).await {
            ChartReply::Text(text) => assert_eq!(text, CHART_DATA_UNAVAILABLE),
            ChartReply::Photo { .. } => panic!("no chart expected after an upstream failure"),
        }
    }

    #[test]
    fn welcome_text_lists_commands_and_coins() {
        let dispatcher = dispatcher("http://unused".into(), "http://unused".into());
        let text = dispatcher.welcome_text("Alex");
        assert!(text.contains("Hallo Alex"));
        for command in ["/price", "/news", "/chart"] {
            assert!(text.contains(command));
        }
        assert!(text.contains("Bitcoin, Ethereum, Solana"));
    }

    #[test]
    fn chart_ack_names_the_coin() {
        let dispatcher = dispatcher("http://unused".into(), "http://unused".into());
        let coin = crate::coins::resolve("ethereum").unwrap();
        assert!(dispatcher.chart_ack(coin).contains("Ethereum"));
    }
}
