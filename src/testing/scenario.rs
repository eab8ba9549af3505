//! Scenario matrix runner
//!
//! A scenario is one row of an access table: which client sends which
//! request and what must come back. `run_matrix` executes every row and
//! reports all mismatches together, so one failing combination never hides
//! the others.

use axum::http::StatusCode;

use crate::testing::fixtures::{TestClient, TestResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    /// POST without a body or content type
    PostEmpty,
}

/// Expected outcome of a scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expect {
    /// Exactly this status code
    Status(StatusCode),
    /// `302 Found` whose `Location` equals this string
    Redirect(String),
}

impl Expect {
    pub fn ok() -> Self {
        Expect::Status(StatusCode::OK)
    }

    pub fn not_found() -> Self {
        Expect::Status(StatusCode::NOT_FOUND)
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Expect::Redirect(location.into())
    }

    /// Describe how `response` differs, or `None` when it matches
    fn mismatch(&self, response: &TestResponse) -> Option<String> {
        match self {
            Expect::Status(status) if response.status == *status => None,
            Expect::Status(status) => Some(format!(
                "expected status {}, got {} (location {:?})",
                status, response.status, response.location
            )),
            Expect::Redirect(location)
                if response.status == StatusCode::FOUND
                    && response.location.as_deref() == Some(location.as_str()) =>
            {
                None
            }
            Expect::Redirect(location) => Some(format!(
                "expected 302 to {:?}, got {} to {:?}",
                location, response.status, response.location
            )),
        }
    }
}

/// One row of a scenario matrix
pub struct Scenario<'a> {
    pub label: String,
    pub method: Method,
    pub url: String,
    pub client: &'a TestClient,
    pub form: Vec<(String, String)>,
    pub expect: Expect,
}

impl<'a> Scenario<'a> {
    pub fn get(
        label: impl Into<String>,
        client: &'a TestClient,
        url: impl Into<String>,
        expect: Expect,
    ) -> Self {
        Self {
            label: label.into(),
            method: Method::Get,
            url: url.into(),
            client,
            form: Vec::new(),
            expect,
        }
    }

    pub fn post(
        label: impl Into<String>,
        client: &'a TestClient,
        url: impl Into<String>,
        form: &[(&str, &str)],
        expect: Expect,
    ) -> Self {
        Self {
            label: label.into(),
            method: Method::Post,
            url: url.into(),
            client,
            form: form
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            expect,
        }
    }

    pub fn post_empty(
        label: impl Into<String>,
        client: &'a TestClient,
        url: impl Into<String>,
        expect: Expect,
    ) -> Self {
        Self {
            label: label.into(),
            method: Method::PostEmpty,
            url: url.into(),
            client,
            form: Vec::new(),
            expect,
        }
    }

    pub async fn run(&self) -> TestResponse {
        match self.method {
            Method::Get => self.client.get(&self.url).await,
            Method::Post => {
                let form: Vec<(&str, &str)> = self
                    .form
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                self.client.post_form(&self.url, &form).await
            }
            Method::PostEmpty => self.client.post_empty(&self.url).await,
        }
    }
}

/// Run every scenario, then fail once listing all rows that didn't match
pub async fn run_matrix(scenarios: &[Scenario<'_>]) {
    let mut failures = Vec::new();

    for scenario in scenarios {
        let response = scenario.run().await;
        if let Some(reason) = scenario.expect.mismatch(&response) {
            failures.push(format!(
                "[{}] {:?} {}: {}",
                scenario.label, scenario.method, scenario.url, reason
            ));
        }
    }

    assert!(
        failures.is_empty(),
        "{} of {} scenarios failed:\n{}",
        failures.len(),
        scenarios.len(),
        failures.join("\n")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: StatusCode, location: Option<&str>) -> TestResponse {
        TestResponse {
            status,
            location: location.map(str::to_string),
            set_cookie: None,
            body: String::new(),
        }
    }

    #[test]
    fn test_status_expectation() {
        assert!(Expect::ok().mismatch(&response(StatusCode::OK, None)).is_none());
        assert!(Expect::not_found()
            .mismatch(&response(StatusCode::OK, None))
            .is_some());
    }

    #[test]
    fn test_redirect_expectation_is_exact() {
        let expect = Expect::redirect("/auth/login/?next=/notes/add/");
        assert!(expect
            .mismatch(&response(StatusCode::FOUND, Some("/auth/login/?next=/notes/add/")))
            .is_none());
        assert!(expect
            .mismatch(&response(StatusCode::FOUND, Some("/auth/login/?next=%2Fnotes%2Fadd%2F")))
            .is_some());
        assert!(expect
            .mismatch(&response(StatusCode::SEE_OTHER, Some("/auth/login/?next=/notes/add/")))
            .is_some());
    }
}
