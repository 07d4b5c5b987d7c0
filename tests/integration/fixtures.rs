//! Mock site pages and crawler wiring shared by the integration tests

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tk_stemmingen::config::Config;
use tk_stemmingen::crawler::{CrawlOptions, CrawlRequest, Crawler};
use tk_stemmingen::extract::CommandExtractor;
use tk_stemmingen::output::RecordWriter;
use tk_stemmingen::source::TweedeKamerSource;
use tk_stemmingen::state::open_ledgers;
use tk_stemmingen::DateRange;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LISTING_PATH: &str = "/kamerstukken/stemmingsuitslagen";
pub const VOTING_PATH: &str = "/kamerstukken/stemmingsuitslagen/detail";
pub const MOTION_PATH: &str = "/kamerstukken/moties/detail";
pub const DOWNLOAD_PATH: &str = "/downloads/document";
pub const DATE_KEY: &str = "2024-01-10";

/// Data and state directories of one test workspace
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    pub fn item_dir(&self, id: &str) -> PathBuf {
        self.data_dir().join(DATE_KEY).join(id)
    }

    /// A crawler reading `server`, with `cat` standing in for the converters
    pub fn crawler(&self, server: &MockServer) -> Crawler<TweedeKamerSource, CommandExtractor> {
        let mut config = Config::default();
        config.source.base_url = server.uri();

        let (progress, errors) = open_ledgers(&self.state_dir()).unwrap();
        Crawler::new(
            TweedeKamerSource::new(&config).unwrap(),
            CommandExtractor::new(vec!["cat".to_string()], vec!["cat".to_string()]),
            RecordWriter::new(self.data_dir()),
            progress,
            errors,
            CrawlOptions::default(),
        )
    }
}

pub fn request() -> CrawlRequest {
    let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    CrawlRequest::new(DateRange::new(day, None, day))
}

pub fn read(dir: &Path, stem: &str) -> String {
    std::fs::read_to_string(dir.join(format!("{}.csv", stem))).unwrap()
}

pub fn data_lines(dir: &Path, stem: &str) -> usize {
    read(dir, stem).lines().count() - 1
}

pub fn listing_page(ids: &[&str]) -> String {
    let cards: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<div class="u-mt-6 m-card">
                     <h4 class="u-mt-0"><a href="{VOTING_PATH}?id={id}&did={id}D">Stemmingsuitslagen {id}</a></h4>
                     <time class="u-text-primary" datetime="{DATE_KEY}T14:00:00">woensdag 10 januari 2024</time>
                     <p class="u-text-dark-gray">{id}</p>
                   </div>"#
            )
        })
        .collect();
    format!("<html><body><main>{}</main></body></html>", cards)
}

pub fn end_of_results_page() -> String {
    "<html><body><p>Geen zoekresultaten gevonden</p></body></html>".to_string()
}

pub fn voting_page(id: &str, motions: &[&str]) -> String {
    let cards: String = motions
        .iter()
        .map(|motion| {
            format!(
                r#"<div class="m-card">
                     <h3 class="m-card__title"><a href="{MOTION_PATH}?id={motion}&did={motion}D">Motie {motion}</a></h3>
                     <p class="u-mt-8">Besluit: <span class="u-font-bold">Aangenomen.</span></p>
                   </div>"#
            )
        })
        .collect();
    format!(
        r#"<html><head><meta name="dcterms.title" content="Stemmingen {id}"></head>
           <body>
             <h2>Stemmingen <span class="u-font-normal">woensdag 10 januari 2024</span></h2>
             {cards}
           </body></html>"#
    )
}

/// Parts of a motion page beyond its fixed metadata and sponsor
pub struct MotionPage<'a> {
    pub inline_text: Option<&'a str>,
    pub tally_header: &'a [&'a str],
}

impl Default for MotionPage<'_> {
    fn default() -> Self {
        Self {
            inline_text: Some("De Kamer, gehoord de beraadslaging,"),
            tally_header: &["Fracties", "Zetels", "Voor/Tegen"],
        }
    }
}

pub fn motion_page(id: &str, page: &MotionPage<'_>) -> String {
    let inline = page
        .inline_text
        .map(|text| format!(r#"<div class="m-modal__content"><p>{}</p></div>"#, text))
        .unwrap_or_default();
    let header: String = page
        .tally_header
        .iter()
        .map(|h| format!("<th>{}</th>", h))
        .collect();

    format!(
        r#"<html><body>
             <h1><span class="u-text-primary u-font-normal">Motie</span>: Motie {id} over zonnepanelen</h1>
             <ul class="m-list">
               <li><span class="h-visually-hidden">Nummer:</span> 36410-12</li>
               <li><span class="h-visually-hidden">Datum:</span> 9 januari 2024</li>
             </ul>
             <a aria-label="Download kamerstuk 36410-12" href="{DOWNLOAD_PATH}?id={id}">PDF</a>
             {inline}
             <ul class="m-list">
               <li class="m-list__item--variant-member"><span class="m-list__label"><span class="u-font-bold">Indiener</span> <a class="h-link-inverse" href="/p/1">J. Klaver</a></span></li>
             </ul>
             <h2>Stemmingsuitslagen</h2>
             <h3>Aangenomen</h3>
             <div class="m-vote-result__label"><span>Voor: 61</span></div>
             <div class="m-vote-result__label"><span>Vereist: 31</span></div>
             <div class="m-vote-result__label"><span>Totaal: 61</span></div>
             <div id="votes-details"><table>
               <thead><tr>{header}</tr></thead>
               <tbody>
                 <tr><td>VVD</td><td>24</td><td>Voor</td></tr>
                 <tr><td>PVV</td><td>37</td><td>Voor</td></tr>
               </tbody>
             </table></div>
           </body></html>"#
    )
}

pub async fn mount_listing(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Mounts a voting page, expecting exactly `times` requests for it
pub async fn mount_voting(server: &MockServer, id: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(VOTING_PATH))
        .and(query_param("id", id))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_motion(server: &MockServer, id: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(MOTION_PATH))
        .and(query_param("id", id))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

pub async fn mount_download(server: &MockServer, id: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path(DOWNLOAD_PATH))
        .and(query_param("id", id))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
}

/// X1 resolves fully; X2's only motion has a tally with an unknown header
pub async fn partial_success_site() -> MockServer {
    let server = MockServer::start().await;
    mount_listing(&server, 0, listing_page(&["X1", "X2"])).await;
    mount_listing(&server, 1, end_of_results_page()).await;
    mount_voting(&server, "X1", voting_page("X1", &["M1"]), 1).await;
    mount_voting(&server, "X2", voting_page("X2", &["M2"]), 1).await;
    mount_motion(&server, "M1", motion_page("M1", &MotionPage::default())).await;
    mount_motion(
        &server,
        "M2",
        motion_page(
            "M2",
            &MotionPage {
                tally_header: &["Partij", "Zetels", "Stem"],
                ..MotionPage::default()
            },
        ),
    )
    .await;
    server
}
