//! Verification email template.

use warden_core::traits::OutboundEmail;

/// Renders the account verification email.
#[derive(Debug, Clone)]
pub struct VerificationTemplate {
    product_name: String,
}

impl VerificationTemplate {
    /// Create a template branded with `product_name`.
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
        }
    }

    /// Render the email carrying `code` for `to`.
    pub fn render(&self, to: &str, name: &str, code: &str) -> OutboundEmail {
        let product = escape(&self.product_name);
        let name_html = escape(name);
        let code_html = escape(code);

        let html_body = format!(
            r#"<html>
<body style="font-family: Arial, sans-serif; margin: 0; padding: 0; background-color: #f9f9f9;">
  <div style="max-width: 600px; margin: 20px auto; background-color: #ffffff; border: 1px solid #ddd; border-radius: 8px;">
    <div style="background-color: #BB86FC; color: #ffffff; padding: 15px 20px; border-radius: 8px 8px 0 0; text-align: center;">
      <h1 style="margin: 0; font-size: 24px;">Welcome to {product}!</h1>
    </div>
    <div style="padding: 20px;">
      <p style="font-size: 16px; color: #333333;">Hello {name_html},</p>
      <p style="font-size: 16px; color: #333333;">Enter the code below to finish setting up your <strong>{product}</strong> account:</p>
      <div style="background-color: #f4f4f4; text-align: center; padding: 15px; margin: 20px 0; border: 1px dashed #BB86FC; border-radius: 5px;">
        <p style="font-size: 22px; font-weight: bold; color: #333333; letter-spacing: 3px; margin: 0;">{code_html}</p>
      </div>
      <p style="font-size: 14px; color: #666666;">If you did not sign up, you can ignore this email. Never share this code with anyone.</p>
    </div>
  </div>
</body>
</html>"#
        );

        let text_body = format!(
            "Hello {name},\n\n\
             Enter the code below to finish setting up your {} account:\n\n\
             {code}\n\n\
             If you did not sign up, you can ignore this email. Never share this code with anyone.\n",
            self.product_name
        );

        OutboundEmail {
            to: to.to_string(),
            subject: "Account Verification".to_string(),
            html_body,
            text_body,
        }
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
