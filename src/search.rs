use crate::browser::{BrowserControl, Focused};
use crate::criteria::SearchCriteria;
use crate::error::Result;
use crate::locate::{Chain, Strategy, WaitPolicy, resolve};
use crate::site::SiteProfile;
use std::thread;
use std::time::Duration;

/// Longest wait for any single cookie banner button
const COOKIE_WAIT: Duration = Duration::from_secs(2);

/// Drives the landing page's search form
pub struct SearchDriver<'p> {
    profile: &'p SiteProfile,
    policy: WaitPolicy,
    settle: Duration,
}

impl<'p> SearchDriver<'p> {
    /// `settle` is slept after each step that makes the page re-render
    pub fn new(profile: &'p SiteProfile, policy: WaitPolicy, settle: Duration) -> Self {
        Self { profile, policy, settle }
    }

    /// Load `base_url`, fill in the form and submit it.
    ///
    /// Only a failed navigation is an error. Missing form fields and toggles
    /// are logged and skipped; discovery then reports what the page shows.
    pub fn submit<B: BrowserControl + ?Sized>(&self, browser: &mut B, base_url: &str, criteria: &SearchCriteria) -> Result<()> {
        browser.navigate(base_url)?;
        log::info!("Opened search root {}", base_url);

        self.dismiss_cookies(browser);
        self.enter_location(browser, &criteria.location);

        let Some(query_input) = self.find(browser, &self.profile.search_form.query_input) else {
            log::warn!("Search input not found; results page not reached");
            return Ok(());
        };
        if let Err(e) = self.type_and_press(browser, &query_input, &criteria.query, &["Enter"]) {
            log::warn!("Failed to submit query '{}': {}", criteria.query, e);
            return Ok(());
        }
        log::info!("Submitted search '{}' in '{}'", criteria.query, criteria.location);
        self.settle();

        let toggles = [
            ("sector", self.profile.sector_toggle(criteria.sector)),
            ("consultation", self.profile.consultation_toggle(criteria.consultation)),
        ];
        for (label, toggle) in toggles {
            if let Some(toggle) = toggle {
                self.apply_toggle(browser, label, toggle);
            }
        }
        Ok(())
    }

    /// Click every cookie banner button that shows up
    fn dismiss_cookies<B: BrowserControl + ?Sized>(&self, browser: &mut B) {
        let wait = WaitPolicy::new(self.policy.timeout.min(COOKIE_WAIT)).interval(self.policy.interval);
        for button in &self.profile.search_form.cookie_buttons {
            let chain = Chain::new("cookie button", button.clone());
            if resolve(&Focused(&*browser), &chain, wait).is_none() {
                continue;
            }
            match browser.click(button) {
                Ok(()) => log::debug!("Dismissed cookie banner with {}", button),
                Err(e) => log::debug!("Cookie button {} not clickable: {}", button, e),
            }
        }
    }

    /// Type the location and pick the first suggestion
    fn enter_location<B: BrowserControl + ?Sized>(&self, browser: &mut B, location: &str) {
        if location.trim().is_empty() {
            log::debug!("No location given; keeping the site's default");
            return;
        }
        let Some(input) = self.find(browser, &self.profile.search_form.location_input) else {
            log::debug!("Location input not found; keeping the site's default");
            return;
        };
        if let Err(e) = self.type_and_press(browser, &input, location, &["ArrowDown", "Enter"]) {
            log::debug!("Failed to enter location '{}': {}", location, e);
        }
    }

    fn apply_toggle<B: BrowserControl + ?Sized>(&self, browser: &mut B, label: &'static str, toggle: Strategy) {
        let chain = Chain::new(label, toggle.clone());
        if resolve(&Focused(&*browser), &chain, self.policy).is_none() {
            log::debug!("No {} toggle on the results page", label);
            return;
        }
        match browser.click(&toggle) {
            Ok(()) => {
                log::info!("Applied {} filter ({})", label, toggle);
                self.settle();
            }
            Err(e) => log::debug!("Could not click {} toggle: {}", label, e),
        }
    }

    fn find<B: BrowserControl + ?Sized>(&self, browser: &B, chain: &Chain) -> Option<Strategy> {
        resolve(&Focused(browser), chain, self.policy).map(|located| located.strategy().clone())
    }

    fn type_and_press<B: BrowserControl + ?Sized>(
        &self,
        browser: &mut B,
        input: &Strategy,
        text: &str,
        keys: &[&str],
    ) -> Result<()> {
        browser.type_text(input, text)?;
        for key in keys {
            thread::sleep(self.policy.interval);
            browser.press_key(input, key)?;
        }
        Ok(())
    }

    fn settle(&self) {
        if !self.settle.is_zero() {
            thread::sleep(self.settle);
        }
    }
}
