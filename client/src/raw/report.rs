use certportal_shared::report::{
    handle::{ReportDescriptor, ReportResult},
    FacetSelection,
};
use reqwest::{RequestBuilder, Response};

use crate::Session;

pub struct Get<'a> {
    pub session: &'a Session,
    pub selection: FacetSelection,
    /// Zero-based, the backend clamps it into the available pages.
    pub page: usize,
}

#[async_trait::async_trait]
impl super::Request for Get<'_> {
    type Output = ReportResult;
    const URL_SUFFIX: &'static str = "/api/report/get";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .headers(self.session.headers()?)
            .json(&ReportDescriptor {
                selection: self.selection.clone(),
                page: self.page,
            }))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json().await?)
    }
}

/// Exports every certificate passing the selection.
pub struct Export<'a> {
    pub session: &'a Session,
    pub selection: FacetSelection,
}

#[async_trait::async_trait]
impl super::Request for Export<'_> {
    /// The CSV document, its byte order mark stripped by decoding.
    type Output = String;
    const URL_SUFFIX: &'static str = "/api/report/export";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .headers(self.session.headers()?)
            .json(&ReportDescriptor {
                selection: self.selection.clone(),
                page: 0,
            }))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.text().await?)
    }
}
