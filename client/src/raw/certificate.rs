use certportal_shared::{
    certificate::{handle::*, CertificateInfo},
    report::FacetSelection,
};
use reqwest::{header, RequestBuilder, Response};

use crate::Session;

pub struct Create<'a> {
    pub session: &'a Session,
    pub descriptor: CertificateDescriptor,
}

#[async_trait::async_trait]
impl super::Request for Create<'_> {
    /// Id of the new certificate.
    type Output = u64;
    const URL_SUFFIX: &'static str = "/api/certificate/create";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req.headers(self.session.headers()?).json(&self.descriptor))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response
            .json::<CreateCertificateResult>()
            .await?
            .certificate_id)
    }
}

/// Lists certificates of the requesting account when `owner` is `None`.
pub struct Get<'a> {
    pub session: &'a Session,
    pub owner: Option<OwnerScope>,
    pub selection: FacetSelection,
}

#[async_trait::async_trait]
impl super::Request for Get<'_> {
    type Output = Vec<CertificateInfo>;
    const URL_SUFFIX: &'static str = "/api/certificate/get";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .headers(self.session.headers()?)
            .json(&GetCertificatesDescriptor {
                owner: self.owner,
                selection: self.selection.clone(),
            }))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response
            .json::<GetCertificatesResult>()
            .await?
            .certificates)
    }
}

pub struct GetFile<'a> {
    pub session: &'a Session,
    pub owner: u64,
    pub id: u64,
}

#[async_trait::async_trait]
impl super::Request for GetFile<'_> {
    /// Content type and bytes of the file.
    type Output = (String, bytes::Bytes);
    const URL_SUFFIX: &'static str = "/api/certificate/get-file";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .headers(self.session.headers()?)
            .json(&TargetCertificateDescriptor {
                owner: self.owner,
                id: self.id,
            }))
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

pub struct Edit<'a> {
    pub session: &'a Session,
    pub owner: u64,
    pub id: u64,
    pub variants: Vec<EditCertificateVariant>,
}

#[async_trait::async_trait]
impl super::Request for Edit<'_> {
    type Output = ();
    const URL_SUFFIX: &'static str = "/api/certificate/edit";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .headers(self.session.headers()?)
            .json(&EditCertificateDescriptor {
                owner: self.owner,
                id: self.id,
                variants: self.variants.clone(),
            }))
    }

    async fn parse_res(&mut self, _response: Response) -> anyhow::Result<Self::Output> {
        Ok(())
    }
}

pub struct Remove<'a> {
    pub session: &'a Session,
    pub owner: u64,
    pub id: u64,
}

#[async_trait::async_trait]
impl super::Request for Remove<'_> {
    type Output = ();
    const URL_SUFFIX: &'static str = "/api/certificate/remove";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .headers(self.session.headers()?)
            .json(&TargetCertificateDescriptor {
                owner: self.owner,
                id: self.id,
            }))
    }

    async fn parse_res(&mut self, _response: Response) -> anyhow::Result<Self::Output> {
        Ok(())
    }
}
