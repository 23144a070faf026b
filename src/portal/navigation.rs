//! Navigation from the post-login dashboard to the consumption page, and the
//! text probe used to pick controls by their visible label.

use crate::error::{DriverError, PortalError};
use crate::portal::driver::Driver;
use crate::portal::selectors;
use std::time::Duration;

/// One click on the way to the consumption page.
///
/// Candidates are tried in order; the first link that resolves is clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationStep {
    pub candidates: Vec<String>,
}

impl NavigationStep {
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    fn describe(&self) -> String {
        self.candidates.join(" | ")
    }
}

/// Ordered link labels leading to the consumption page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPlan {
    pub steps: Vec<NavigationStep>,
}

impl NavigationPlan {
    /// The path the portal currently uses.
    pub fn consumption() -> Self {
        Self {
            steps: selectors::CONSUMPTION_LINKS
                .iter()
                .map(|labels| NavigationStep::new(labels.iter().copied()))
                .collect(),
        }
    }
}

impl Default for NavigationPlan {
    fn default() -> Self {
        Self::consumption()
    }
}

/// Clicks through every step of `plan`.
///
/// Each candidate gets `probe_timeout` to appear. After every click the page is
/// given `settle` before the next step is probed.
pub async fn follow<D: Driver>(
    driver: &D,
    plan: &NavigationPlan,
    probe_timeout: Duration,
    settle: Duration,
) -> Result<(), PortalError> {
    for step in &plan.steps {
        let element = resolve_step(driver, step, probe_timeout).await?;
        driver
            .click(&element)
            .await
            .map_err(|e| PortalError::navigation_failed(step.describe(), e))?;
        tokio::time::sleep(settle).await;
    }
    Ok(())
}

async fn resolve_step<D: Driver>(
    driver: &D,
    step: &NavigationStep,
    probe_timeout: Duration,
) -> Result<D::Element, PortalError> {
    let mut last_error = DriverError::NotFound("empty navigation step".to_string());
    for label in &step.candidates {
        match driver
            .wait_for_xpath(&selectors::link_xpath(label), probe_timeout)
            .await
        {
            Ok(element) => {
                tracing::debug!(label = label.as_str(), "Following navigation link");
                return Ok(element);
            }
            Err(e) => {
                tracing::debug!(label = label.as_str(), error = %e, "Navigation candidate did not resolve");
                last_error = e;
            }
        }
    }
    Err(PortalError::navigation_failed(step.describe(), last_error))
}

/// Returns the first element matching `selector` whose text contains `text`.
///
/// Elements are enumerated once; there is no waiting for late arrivals.
pub async fn find_element_by_text<D: Driver>(
    driver: &D,
    selector: &str,
    text: &str,
) -> Result<D::Element, PortalError> {
    for element in driver.query_all(selector).await? {
        if driver.text(&element).await?.contains(text) {
            return Ok(element);
        }
    }
    Err(PortalError::element_not_found(selector, text))
}
