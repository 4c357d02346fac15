use super::{Error, Result};
use crate::{modules::auth::repository::User, types::Context};
use axum::http::StatusCode;
use std::sync::Arc;

pub async fn send_login_code(ctx: Arc<Context>, user: User, code: String) -> Result<()> {
    let sms = match ctx.sms.as_ref() {
        Some(sms) => sms,
        None => {
            // Console delivery keeps the login flow usable without Twilio
            // credentials.
            tracing::info!("Sms not configured, login code for {}: {}", user.phone, code);
            return Ok(());
        }
    };

    let endpoint = format!(
        "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
        sms.account_sid
    );

    let res = reqwest::Client::new()
        .post(endpoint)
        .basic_auth(sms.account_sid.clone(), Some(sms.auth_token.clone()))
        .form(&[
            ("Body", format!("Your snack login code is: {}", code)),
            ("From", sms.from_number.clone()),
            ("To", user.phone.clone()),
        ])
        .send()
        .await
        .map_err(|err| {
            tracing::error!("Failed to send login code sms: {}", err);
            Error::NotSent
        })?;

    if res.status() != StatusCode::CREATED {
        match res.text().await {
            Ok(data) => tracing::error!("Failed to send login code sms: {}", data),
            Err(err) => tracing::error!("Failed to get sms response body: {}", err),
        }
        return Err(Error::NotSent);
    }

    tracing::debug!("Login code sms sent to {}", user.phone);

    Ok(())
}
