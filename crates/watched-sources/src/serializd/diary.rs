use std::sync::LazyLock;
use regex::Regex;
use serde_json::{json, Value};

static EPISODE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href="(/show/[^"]*?season/(\d+)[^"]*?episode/(\d+)[^"]*)""#).expect("valid episode link pattern")
});

static TITLE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r#"(?i)"showName":"([^"]+)""#).expect("valid showName pattern"),
        Regex::new(r#"(?i)title="([^"]+)""#).expect("valid title pattern"),
        Regex::new(r#"(?i)aria-label="([^"]+)""#).expect("valid aria-label pattern"),
    ]
});

/// Characters searched on each side of the episode link for a show title
const TITLE_WINDOW: usize = 600;

const UNTITLED: &str = "Latest episode";

/// Most recent diary entry found in a server-rendered diary page
#[derive(Debug, Clone, PartialEq)]
pub struct LatestEpisode {
    pub show_title: String,
    pub season: Option<u32>,
    pub episode: String,
    pub url: String,
}

impl LatestEpisode {
    /// Raw record in the same shape the probe endpoints return
    pub fn to_record(&self) -> Value {
        let mut record = json!({
            "title": self.show_title,
            "episode": self.episode,
            "url": self.url,
        });
        if let Some(season) = self.season {
            record["season"] = json!(season);
        }
        record
    }
}

pub fn diary_url(site_url: &str, username: &str) -> String {
    format!(
        "{}/user/{}/diary",
        site_url.trim_end_matches('/'),
        urlencoding::encode(username)
    )
}

/// Find the first episode link in a diary page.
///
/// Returns `None` when the page only renders client-side.
pub fn parse_latest_episode(html: &str, site_url: &str) -> Option<LatestEpisode> {
    let captures = EPISODE_LINK.captures(html)?;
    let link = captures.get(0)?;
    let path = captures.get(1)?.as_str();
    let season = captures.get(2).and_then(|m| m.as_str().parse().ok());
    let episode = captures.get(3)?.as_str().to_string();

    let start = floor_boundary(html, link.start().saturating_sub(TITLE_WINDOW));
    let end = floor_boundary(html, (link.start() + TITLE_WINDOW).min(html.len()));
    let context = &html[start..end];

    let show_title = TITLE_PATTERNS
        .iter()
        .find_map(|re| re.captures(context).and_then(|c| c.get(1)))
        .map(|m| m.as_str().trim())
        .filter(|t| !t.is_empty())
        .unwrap_or(UNTITLED)
        .to_string();

    Some(LatestEpisode {
        show_title,
        season,
        episode,
        url: format!("{}{}", site_url.trim_end_matches('/'), path),
    })
}

fn floor_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
