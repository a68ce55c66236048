//! Entry pass issuance and delivery pipeline.
//!
//! Steps: sign the pass payload, render it as a QR image, build the HTML
//! email around the inline image, and hand the message to the delivery
//! provider. The first three steps fail as generation errors; only the
//! provider hand-off is a dispatch error, so callers can map the two onto
//! different HTTP statuses.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use domain::models::pass::PassPayload;
use domain::models::pre_approval::PreApproval;

use crate::services::email::{EmailMessage, EmailService};
use crate::services::qr;

#[derive(Debug, Error)]
pub enum PassDeliveryError {
    #[error("pass generation failed: {0}")]
    Generation(String),

    #[error("pass dispatch failed: {0}")]
    Dispatch(String),
}

/// Issues signed passes and emails them to visitors.
#[derive(Clone)]
pub struct PassMailer {
    email: EmailService,
    signing_key: Vec<u8>,
    company_name: String,
}

impl PassMailer {
    pub fn new(email: EmailService, signing_key: Vec<u8>, company_name: String) -> Self {
        Self {
            email,
            signing_key,
            company_name,
        }
    }

    /// Runs the full pipeline for one entry and returns the provider
    /// message ID.
    pub async fn send_pass(
        &self,
        entry: &PreApproval,
        now: DateTime<Utc>,
    ) -> Result<String, PassDeliveryError> {
        let payload = PassPayload::issue(entry, now, &self.signing_key);

        let qr_data_url = qr::render_data_url(&payload.to_json())
            .map_err(|e| PassDeliveryError::Generation(e.to_string()))?;

        let body_html = self.render_pass_email(entry, &qr_data_url);

        let message = EmailMessage {
            to: entry.visitor_email.clone(),
            to_name: entry.visitor_name.clone(),
            subject: format!("Your visitor pass for {}", self.company_name),
            body_html,
        };

        let message_id = self
            .email
            .send(message)
            .await
            .map_err(|e| PassDeliveryError::Dispatch(e.to_string()))?;

        info!(
            entry_id = %entry.id,
            recipient = %entry.visitor_email,
            message_id = %message_id,
            "Pass email dispatched"
        );

        Ok(message_id)
    }

    /// HTML pass email: all visit facts, the inline QR image, and the
    /// display pass code.
    fn render_pass_email(&self, entry: &PreApproval, qr_data_url: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Your visitor pass</title>
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: linear-gradient(135deg, #0f4c81 0%, #2d9cdb 100%); padding: 30px; border-radius: 10px 10px 0 0;">
        <h1 style="color: white; margin: 0; font-size: 24px;">{company}</h1>
    </div>
    <div style="background: #f9f9f9; padding: 30px; border-radius: 0 0 10px 10px;">
        <h2 style="color: #333; margin-top: 0;">Your entry pass is ready</h2>
        <p>Hi {visitor_name},</p>
        <p>{host_name} has pre-approved your visit. Present the QR code below at the security gate.</p>
        <div style="text-align: center; margin: 30px 0;">
            <img src="{qr}" alt="Entry pass QR code" width="300" height="300" style="border: 1px solid #ddd; border-radius: 6px;">
            <p style="font-family: monospace; font-size: 16px; letter-spacing: 1px; color: #0f4c81;">{pass_code}</p>
        </div>
        <table style="width: 100%; border-collapse: collapse;">
            <tr><td style="padding: 6px 0; color: #666;">Date</td><td style="padding: 6px 0;"><strong>{date}</strong></td></tr>
            <tr><td style="padding: 6px 0; color: #666;">Time</td><td style="padding: 6px 0;"><strong>{start} - {end}</strong></td></tr>
            <tr><td style="padding: 6px 0; color: #666;">Host</td><td style="padding: 6px 0;"><strong>{host_name}</strong></td></tr>
            <tr><td style="padding: 6px 0; color: #666;">Purpose</td><td style="padding: 6px 0;"><strong>{purpose}</strong></td></tr>
        </table>
        <ul style="color: #666; font-size: 14px; padding-left: 20px;">
            <li>Please arrive within your scheduled time window</li>
            <li>Bring a valid photo ID for verification</li>
            <li>Contact your host if you need to reschedule</li>
        </ul>
        <p style="color: #666; font-size: 14px;">This pass is valid until the end of {date} and can only be used once.</p>
        <hr style="border: none; border-top: 1px solid #ddd; margin: 30px 0;">
        <p style="color: #999; font-size: 12px;">If you were not expecting this visit, you can safely ignore this email.</p>
    </div>
</body>
</html>"#,
            company = self.company_name,
            visitor_name = entry.visitor_name,
            host_name = entry.host_name,
            qr = qr_data_url,
            pass_code = entry.qr_code,
            date = entry.scheduled_date.format("%Y-%m-%d"),
            start = entry.start_time,
            end = entry.end_time,
            purpose = entry.purpose,
        )
    }
}
