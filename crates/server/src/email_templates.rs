//! Plain-text email bodies carrying the one-time code.

/// Email sent when an OTP is issued for sign-up verification.
pub struct SignupOtpEmailTemplate {
    pub code: String,
}

impl SignupOtpEmailTemplate {
    pub const SUBJECT: &'static str = "Please Verify your Email";

    pub fn render_text(&self) -> String {
        format!(
            r#"Hi, you have requested to sign up.

This is your OTP: {}.

Please keep it confidential and don't share it with anyone.

Thanks,
The Team"#,
            self.code
        )
    }
}

/// Email sent when an OTP is issued for a password reset.
pub struct PasswordResetOtpEmailTemplate {
    pub code: String,
}

impl PasswordResetOtpEmailTemplate {
    pub const SUBJECT: &'static str = "OTP for Password Reset";

    pub fn render_text(&self) -> String {
        format!(
            r#"Hi, you have requested to reset your password.

This is your OTP: {}.

If you did not request this, you can ignore this email.

Thanks,
The Team"#,
            self.code
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_template_embeds_code() {
        let template = SignupOtpEmailTemplate {
            code: "x7Kp2Q".into(),
        };
        let text = template.render_text();
        assert!(text.contains("x7Kp2Q"));
        assert!(text.contains("sign up"));
    }

    #[test]
    fn password_reset_template_embeds_code() {
        let template = PasswordResetOtpEmailTemplate {
            code: "x7Kp2Q".into(),
        };
        let text = template.render_text();
        assert!(text.contains("x7Kp2Q"));
        assert!(text.contains("reset your password"));
    }
}
