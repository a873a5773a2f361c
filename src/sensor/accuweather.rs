//! Remote weather-feed sensor: fetches the Accuweather RSS feed and extracts
//! the current temperature from the weather headline.

use crate::error::ReadError;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex_lite::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Fixed feed endpoint; `metric=0` requests degrees Fahrenheit.
pub const FEED_URL: &str = "http://rss.accuweather.com/rss/liveweather_rss.asp";

/// Bound on the blocking fetch so an unreachable feed cannot hang a read.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches the raw RSS document for a location code.
pub trait WeatherFetch {
    fn fetch(&self, loc_code: &str) -> Result<String, ReadError>;
}

/// Real HTTP implementation of [`WeatherFetch`].
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, ReadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| ReadError::RemoteFetch(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl WeatherFetch for HttpFetcher {
    fn fetch(&self, loc_code: &str) -> Result<String, ReadError> {
        let response = self
            .client
            .get(FEED_URL)
            .query(&[("metric", "0"), ("locCode", loc_code)])
            .send()
            .map_err(|e| ReadError::RemoteFetch(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ReadError::RemoteFetch(format!(
                "feed returned status {}",
                response.status()
            )));
        }

        response
            .text()
            .map_err(|e| ReadError::RemoteFetch(format!("failed to read response body: {}", e)))
    }
}

/// Fetch the feed and extract the current temperature in degrees Fahrenheit.
pub fn read_temperature(fetch: &dyn WeatherFetch, loc_code: &str) -> Result<f64, ReadError> {
    let body = fetch.fetch(loc_code)?;
    let headline = headline_text(&body)?;
    first_number(&headline)
}

/// Extract the text of the `channel/item/title` element, the feed's
/// "Currently: ..." weather headline.
fn headline_text(xml: &str) -> Result<String, ReadError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                path.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Text(t)) => {
                if path_is_headline(&path) {
                    let text = t
                        .unescape()
                        .map_err(|e| ReadError::RemoteFetch(format!("malformed XML: {}", e)))?;
                    return Ok(text.into_owned());
                }
            }
            // RSS feeds commonly wrap the headline in a CDATA section.
            Ok(Event::CData(t)) => {
                if path_is_headline(&path) {
                    return Ok(String::from_utf8_lossy(&t.into_inner()).into_owned());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ReadError::RemoteFetch(format!("malformed XML: {}", e))),
        }
    }

    Err(ReadError::RemoteFetch(
        "feed missing channel/item/title element".to_string(),
    ))
}

/// True when the current element path ends in channel/item/title.
fn path_is_headline(path: &[String]) -> bool {
    path.len() >= 3 && path[path.len() - 3..] == ["channel", "item", "title"]
}

/// First integer token in the headline, as a temperature value.
fn first_number(text: &str) -> Result<f64, ReadError> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let re = NUMBER.get_or_init(|| Regex::new(r"\d+").unwrap());

    let token = re.find(text).ok_or_else(|| {
        ReadError::RemoteFetch(format!("no numeric token in headline '{}'", text))
    })?;
    token
        .as_str()
        .parse::<f64>()
        .map_err(|e| ReadError::RemoteFetch(format!("bad numeric token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0">
  <channel>
    <title>Local Weather</title>
    <item>
      <title>Currently: Partly Cloudy: 72F</title>
      <link>http://www.accuweather.com</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn headline_extracts_item_title() {
        let headline = headline_text(FEED).unwrap();
        assert_eq!(headline, "Currently: Partly Cloudy: 72F");
    }

    #[test]
    fn headline_extracts_cdata_wrapped_title() {
        let feed = r#"<rss><channel><item>
            <title><![CDATA[Currently: Sunny: 72F]]></title>
        </item></channel></rss>"#;
        assert_eq!(headline_text(feed).unwrap(), "Currently: Sunny: 72F");
    }

    #[test]
    fn headline_skips_channel_title() {
        // The channel-level <title> must not be mistaken for the headline.
        assert!(!headline_text(FEED).unwrap().contains("Local Weather"));
    }

    #[test]
    fn first_number_takes_leading_integer_token() {
        assert_eq!(first_number("Currently: Sunny: 72F").unwrap(), 72.0);
        assert_eq!(first_number("Currently: Cold: -5F").unwrap(), 5.0);
    }

    #[test]
    fn missing_headline_is_a_fetch_error() {
        let err = headline_text("<rss><channel></channel></rss>").unwrap_err();
        assert!(matches!(err, ReadError::RemoteFetch(_)));
    }

    #[test]
    fn truncated_xml_is_a_fetch_error() {
        let err = headline_text("<rss><channel><item>").unwrap_err();
        assert!(matches!(err, ReadError::RemoteFetch(_)));
    }
}
