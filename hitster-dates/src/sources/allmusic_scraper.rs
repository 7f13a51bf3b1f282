//! AllMusic song scraper
//!
//! AllMusic has no public API. The song search page lists matching songs;
//! each song page carries the original release year in a data attribute.
//! Parsing is done synchronously on owned strings so that no HTML tree is
//! held across an await point.

use super::{check_status, rate_limiter, SourceError, YearSource};
use crate::types::{SearchKey, Source, SourceMetadata, YearCandidate};
use async_trait::async_trait;
use futures::future::join_all;
use governor::DefaultDirectRateLimiter;
use reqwest::{header, Client, Url};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

const ALLMUSIC_URL: &str = "https://www.allmusic.com";

const RATE_LIMIT_PER_SECOND: u32 = 5;

/// Song pages fetched per search
const MAX_LINKS: usize = 3;

const RESULT_LINK: &str = "#resultsContainer .song .title a";
const SONG_TITLE: &str = "#songHeadline h1";
const SONG_ARTIST: &str = "#songHeadline h2";
const RELEASE_YEAR: &str = ".releaseYearStatic";
const APPEARS_ON_IMAGE: &str = "#appearsOn img";

/// AllMusic search + song page scraper
pub struct AllMusicScraper {
    http_client: Client,
    base_url: String,
    user_agent: String,
    rate_limiter: DefaultDirectRateLimiter,
}

impl AllMusicScraper {
    pub fn new(http_client: Client, user_agent: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: ALLMUSIC_URL.to_string(),
            user_agent: user_agent.into(),
            rate_limiter: rate_limiter(RATE_LIMIT_PER_SECOND),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `<base>/search/songs/<title artist>` with the query as one path segment
    pub fn search_url(&self, key: &SearchKey) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SourceError::Parse(format!("bad base url {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::Parse(format!("base url {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(["search", "songs", key.query_string().as_str()]);
        Ok(url)
    }

    async fn get_html(&self, url: &str) -> Result<String, SourceError> {
        self.rate_limiter.until_ready().await;
        let response = self
            .http_client
            .get(url)
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await?;
        Ok(check_status(response).await?.text().await?)
    }

    async fn fetch_song(&self, link: String) -> Option<YearCandidate> {
        match self.get_html(&link).await {
            Ok(html) => parse_song_page(&html, &link),
            Err(e) => {
                debug!(uri = %link, error = %e, "Song page fetch failed");
                None
            }
        }
    }
}

fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|e| SourceError::Parse(format!("invalid selector {}: {:?}", css, e)))
}

fn first_match<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css).ok()?;
    document.select(&sel).next()
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Absolute links of the first song results on a search page
pub fn parse_search_links(html: &str, base_url: &str) -> Result<Vec<String>, SourceError> {
    let document = Html::parse_document(html);
    let link = selector(RESULT_LINK)?;
    let base = Url::parse(base_url).ok();

    Ok(document
        .select(&link)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| match &base {
            Some(base) => base.join(href).ok().map(String::from),
            None => Some(href.to_string()),
        })
        .take(MAX_LINKS)
        .collect())
}

/// Scrape one song page; incomplete pages yield `None`
pub fn parse_song_page(html: &str, uri: &str) -> Option<YearCandidate> {
    let document = Html::parse_document(html);
    let first = |css: &str| first_match(&document, css);

    let title = first(SONG_TITLE).map(text_of).filter(|t| !t.is_empty())?;
    let artist = first(SONG_ARTIST).map(text_of).filter(|a| !a.is_empty())?;
    let year: i32 = first(RELEASE_YEAR)?
        .value()
        .attr("data-releaseyear")?
        .trim()
        .parse()
        .ok()
        .filter(|&y| y > 0)?;

    let appears_on = first(APPEARS_ON_IMAGE);
    let release = appears_on
        .and_then(|img| img.value().attr("alt"))
        .map(str::to_string);
    let cover = appears_on
        .and_then(|img| img.value().attr("data-src"))
        .map(str::to_string);

    Some(YearCandidate::new(
        year,
        SourceMetadata {
            title,
            artist: Some(artist),
            release,
            cover,
            id: None,
            uri: Some(uri.to_string()),
        },
    ))
}

#[async_trait]
impl YearSource for AllMusicScraper {
    fn source(&self) -> Source {
        Source::AllMusic
    }

    async fn fetch(&self, key: &SearchKey) -> Result<Vec<YearCandidate>, SourceError> {
        let url = self.search_url(key)?;
        debug!(url = %url, "Searching AllMusic songs");

        let html = self.get_html(url.as_str()).await?;
        let links = parse_search_links(&html, &self.base_url)?;

        let mut songs: Vec<YearCandidate> = join_all(links.into_iter().map(|link| self.fetch_song(link)))
            .await
            .into_iter()
            .flatten()
            .collect();
        songs.sort_by_key(|s| s.year);
        Ok(songs)
    }
}
