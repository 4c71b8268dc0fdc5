use async_trait::async_trait;
use crag_core::CragError;
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::Document;

/// User agent sent when the environment does not provide one.
pub const DEFAULT_USER_AGENT: &str = "RAG-Demo-App/1.0";

/// Loads documents from some source.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self) -> Result<Vec<Document>, CragError>;
}

/// Fetches web pages and turns each into one plain-text document with a
/// `source` metadata entry.
pub struct WebLoader {
    urls: Vec<String>,
    user_agent: String,
    client: reqwest::Client,
}

impl WebLoader {
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            urls,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    async fn fetch(&self, url: &str) -> Result<Document, CragError> {
        tracing::info!(%url, "loading page");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| CragError::Loader(format!("GET {url} failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CragError::Loader(format!("GET {url}: HTTP {}", status.as_u16())));
        }
        let html = response
            .text()
            .await
            .map_err(|e| CragError::Loader(format!("reading {url}: {e}")))?;
        Ok(Document::from_content(html_to_text(&html)?).with_metadata("source", url))
    }
}

#[async_trait]
impl Loader for WebLoader {
    async fn load(&self) -> Result<Vec<Document>, CragError> {
        let mut docs = Vec::with_capacity(self.urls.len());
        for url in &self.urls {
            docs.push(self.fetch(url).await?);
        }
        Ok(docs)
    }
}

fn pattern(expr: &str) -> Result<Regex, CragError> {
    Regex::new(expr).map_err(|e| CragError::Loader(format!("invalid regex: {e}")))
}

/// Elements whose text never reaches the document.
const HIDDEN: &[&str] = &["head", "script", "style", "noscript", "template", "svg"];

/// Elements that start a new line in the extracted text.
const BLOCK: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "pre",
    "blockquote", "section", "article", "header", "footer", "main", "nav", "table",
];

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(el) = ElementRef::wrap(child) {
            let name = el.value().name();
            if HIDDEN.contains(&name) {
                continue;
            }
            let block = BLOCK.contains(&name);
            if block {
                out.push('\n');
            }
            collect_text(el, out);
            if block {
                out.push('\n');
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

/// Extract readable text from an HTML page, keeping paragraph breaks.
///
/// The page is parsed with `scraper`, so character references (named and
/// numeric) come out decoded. Comments and hidden elements are dropped.
pub fn html_to_text(html: &str) -> Result<String, CragError> {
    let spaces = pattern(r"[ \t\r\f\u{a0}]+")?;
    let blank_lines = pattern(r"\n{3,}")?;

    let document = Html::parse_document(html);
    let mut raw = String::with_capacity(html.len() / 2);
    collect_text(document.root_element(), &mut raw);

    let text = spaces.replace_all(&raw, " ");
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    Ok(blank_lines
        .replace_all(lines.join("\n").trim(), "\n\n")
        .into_owned())
}
