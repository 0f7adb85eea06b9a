//! Account management, admins only.

use certportal_shared::account::{handle::manage::*, Role};
use reqwest::{RequestBuilder, Response};

use crate::Session;

pub struct List<'a> {
    pub session: &'a Session,
    pub role: Option<Role>,
    pub search: String,
    pub page: usize,
}

#[async_trait::async_trait]
impl super::Request for List<'_> {
    type Output = ListAccountsResult;
    const URL_SUFFIX: &'static str = "/api/account/manage/list";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .headers(self.session.headers()?)
            .json(&ListAccountsDescriptor {
                role: self.role,
                search: self.search.clone(),
                page: self.page,
            }))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json().await?)
    }
}

pub struct View<'a> {
    pub session: &'a Session,
    pub account_id: u64,
}

#[async_trait::async_trait]
impl super::Request for View<'_> {
    type Output = ViewAccountResult;
    const URL_SUFFIX: &'static str = "/api/account/manage/view";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .headers(self.session.headers()?)
            .json(&TargetAccountDescriptor {
                account_id: self.account_id,
            }))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json().await?)
    }
}

pub struct SetRole<'a> {
    pub session: &'a Session,
    pub account_id: u64,
    pub role: Role,
}

#[async_trait::async_trait]
impl super::Request for SetRole<'_> {
    type Output = ();
    const URL_SUFFIX: &'static str = "/api/account/manage/set-role";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .headers(self.session.headers()?)
            .json(&SetRoleDescriptor {
                account_id: self.account_id,
                role: self.role,
            }))
    }

    async fn parse_res(&mut self, _response: Response) -> anyhow::Result<Self::Output> {
        Ok(())
    }
}

pub struct SetActive<'a> {
    pub session: &'a Session,
    pub account_id: u64,
    pub active: bool,
}

#[async_trait::async_trait]
impl super::Request for SetActive<'_> {
    type Output = ();
    const URL_SUFFIX: &'static str = "/api/account/manage/set-active";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .headers(self.session.headers()?)
            .json(&SetActiveDescriptor {
                account_id: self.account_id,
                active: self.active,
            }))
    }

    async fn parse_res(&mut self, _response: Response) -> anyhow::Result<Self::Output> {
        Ok(())
    }
}

/// Removes an account along with its certificates.
pub struct Remove<'a> {
    pub session: &'a Session,
    pub account_id: u64,
}

#[async_trait::async_trait]
impl super::Request for Remove<'_> {
    type Output = ();
    const URL_SUFFIX: &'static str = "/api/account/manage/remove";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .headers(self.session.headers()?)
            .json(&TargetAccountDescriptor {
                account_id: self.account_id,
            }))
    }

    async fn parse_res(&mut self, _response: Response) -> anyhow::Result<Self::Output> {
        Ok(())
    }
}

pub struct Export<'a> {
    pub session: &'a Session,
    pub role: Option<Role>,
    pub search: String,
}

#[async_trait::async_trait]
impl super::Request for Export<'_> {
    /// The CSV document, its byte order mark stripped by decoding.
    type Output = String;
    const URL_SUFFIX: &'static str = "/api/account/manage/export";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .headers(self.session.headers()?)
            .json(&ListAccountsDescriptor {
                role: self.role,
                search: self.search.clone(),
                page: 0,
            }))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.text().await?)
    }
}
