//! Runs against a real Chrome (require Chrome to be installed).
//! Ignored by default, run with: cargo test -- --ignored

use practitioner_scrape::browser::Focused;
use practitioner_scrape::locate::resolve;
use practitioner_scrape::{
    BrowserControl, BrowserSession, Chain, LaunchOptions, ScrapeOptions, Scraper, SearchCriteria, SiteProfile,
    Strategy, WaitPolicy,
};
use std::time::Duration;

fn data_url(html: &str) -> String {
    let encoded: String = html
        .bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() {
                (b as char).to_string()
            } else {
                format!("%{:02X}", b)
            }
        })
        .collect();
    format!("data:text/html;charset=utf-8,{}", encoded)
}

fn launch() -> BrowserSession {
    BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser")
}

#[test]
#[ignore]
fn test_resolver_waits_for_late_element() {
    let mut session = launch();
    let page = data_url(
        r#"<body><script>setTimeout(() => { document.body.innerHTML = '<h1 class="late">Dr Late</h1>'; }, 300);</script></body>"#,
    );
    session.navigate(&page).expect("Failed to navigate");

    let chain = Chain::new("late heading", Strategy::attribute("h1.late"));
    let policy = WaitPolicy::new(Duration::from_secs(5)).interval(Duration::from_millis(50));
    let located = resolve(&Focused(&session), &chain, policy).expect("Heading never appeared");
    assert_eq!(located.text(), "Dr Late");
}

#[test]
#[ignore]
fn test_detail_run_leaves_one_tab() {
    let detail_a = data_url("<h1>Dr A</h1><div data-testid='address'>1 Rue A<br>75001 Paris</div><span>45€</span>");
    let detail_b = data_url("<p>Page without heading</p>");
    let listing = data_url(&format!(
        r#"<div class="dl-card"><a data-testid="practitioner-name" href="{}">Dr A</a></div>
           <div class="dl-card"><a data-testid="practitioner-name" href="{}">Dr B</a></div>"#,
        detail_a, detail_b
    ));

    let mut session = launch();
    let before = session.contexts().expect("Failed to list tabs").len();
    let profile = SiteProfile::default();
    let options = ScrapeOptions::new()
        .base_url(listing)
        .timeout_ms(1_000)
        .settle_ms(0);

    let report = Scraper::new(&profile, &options)
        .run(&mut session, &SearchCriteria::new("généraliste", ""))
        .expect("Run failed");

    assert_eq!(report.results.len(), 1);
    let record = report.results.iter().next().unwrap();
    assert_eq!(record.name.as_deref(), Some("Dr A"));
    assert_eq!(record.city.as_deref(), Some("Paris"));
    assert_eq!(record.price.as_deref(), Some("45€"));
    assert_eq!(report.summary.open_failed, 1);
    assert_eq!(session.contexts().unwrap().len(), before);
}
