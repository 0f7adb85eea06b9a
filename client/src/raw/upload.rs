//! Supporting uploads of the session's account.

use certportal_shared::upload::{handle::*, UploadFilter, UploadInfo};
use reqwest::{header, RequestBuilder, Response};

use crate::Session;

pub struct Create<'a> {
    pub session: &'a Session,
    pub descriptor: UploadDescriptor,
}

#[async_trait::async_trait]
impl super::Request for Create<'_> {
    /// Id of the new upload.
    type Output = u64;
    const URL_SUFFIX: &'static str = "/api/upload/create";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req.headers(self.session.headers()?).json(&self.descriptor))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json::<CreateUploadResult>().await?.upload_id)
    }
}

/// Lists uploads passing the filter, newest first.
pub struct Get<'a> {
    pub session: &'a Session,
    pub filter: UploadFilter,
}

#[async_trait::async_trait]
impl super::Request for Get<'_> {
    type Output = Vec<UploadInfo>;
    const URL_SUFFIX: &'static str = "/api/upload/get";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .headers(self.session.headers()?)
            .json(&GetUploadsDescriptor {
                filter: self.filter.clone(),
            }))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json::<GetUploadsResult>().await?.uploads)
    }
}

pub struct GetFile<'a> {
    pub session: &'a Session,
    pub id: u64,
}

#[async_trait::async_trait]
impl super::Request for GetFile<'_> {
    /// Content type and bytes of the file.
    type Output = (String, bytes::Bytes);
    const URL_SUFFIX: &'static str = "/api/upload/get-file";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .headers(self.session.headers()?)
            .json(&TargetUploadDescriptor { id: self.id }))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_owned();
        Ok((content_type, response.bytes().await?))
    }
}

pub struct Remove<'a> {
    pub session: &'a Session,
    pub id: u64,
}

#[async_trait::async_trait]
impl super::Request for Remove<'_> {
    type Output = ();
    const URL_SUFFIX: &'static str = "/api/upload/remove";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .headers(self.session.headers()?)
            .json(&TargetUploadDescriptor { id: self.id }))
    }

    async fn parse_res(&mut self, _response: Response) -> anyhow::Result<Self::Output> {
        Ok(())
    }
}
