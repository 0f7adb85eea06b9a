use certportal_shared::account::handle::*;
use reqwest::{RequestBuilder, Response};

use crate::Session;

pub struct Register {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[async_trait::async_trait]
impl super::Request for Register {
    /// Id of the new account.
    type Output = u64;
    const URL_SUFFIX: &'static str = "/api/account/register";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req.json(&RegisterDescriptor {
            email: self.email.parse()?,
            name: self.name.clone(),
            password: self.password.clone(),
        }))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json::<RegisterResult>().await?.account_id)
    }
}

pub struct Login {
    pub email: String,
    pub password: String,
}

#[async_trait::async_trait]
impl super::Request for Login {
    type Output = Session;
    const URL_SUFFIX: &'static str = "/api/account/login";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req.json(&LoginDescriptor {
            email: self.email.parse()?,
            password: self.password.clone(),
        }))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        let LoginResult { account_id, token } = response.json().await?;
        Ok(Session { account_id, token })
    }
}

pub struct Logout<'a> {
    pub session: &'a Session,
}

#[async_trait::async_trait]
impl super::Request for Logout<'_> {
    type Output = ();
    const URL_SUFFIX: &'static str = "/api/account/logout";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req.headers(self.session.headers()?))
    }

    async fn parse_res(&mut self, _response: Response) -> anyhow::Result<Self::Output> {
        Ok(())
    }
}

pub struct View<'a> {
    pub session: &'a Session,
}

#[async_trait::async_trait]
impl super::Request for View<'_> {
    type Output = ViewAccountResult;
    const URL_SUFFIX: &'static str = "/api/account/view";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req.headers(self.session.headers()?))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        let res: ViewAccountResult = response.json().await?;
        anyhow::ensure!(
            res.id == self.session.account_id,
            "viewed account {} instead of {}",
            res.id,
            self.session.account_id
        );
        Ok(res)
    }
}

pub struct Edit<'a> {
    pub session: &'a Session,
    pub variants: Vec<EditAccountVariant>,
}

#[async_trait::async_trait]
impl super::Request for Edit<'_> {
    type Output = ();
    const URL_SUFFIX: &'static str = "/api/account/edit";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .headers(self.session.headers()?)
            .json(&EditAccountDescriptor {
                variants: self.variants.clone(),
            }))
    }

    async fn parse_res(&mut self, _response: Response) -> anyhow::Result<Self::Output> {
        Ok(())
    }
}

/// Uploads raw image bytes as the avatar.
pub struct UploadAvatar<'a> {
    pub session: &'a Session,
    pub image: bytes::Bytes,
}

#[async_trait::async_trait]
impl super::Request for UploadAvatar<'_> {
    /// The stored avatar as a JPEG data url.
    type Output = String;
    const URL_SUFFIX: &'static str = "/api/account/avatar";

    fn make_req(&self, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        Ok(req
            .headers(self.session.headers()?)
            .body(self.image.clone()))
    }

    async fn parse_res(&mut self, response: Response) -> anyhow::Result<Self::Output> {
        Ok(response.json::<AvatarResult>().await?.avatar)
    }
}
