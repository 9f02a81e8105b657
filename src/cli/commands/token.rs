use clap::Args;
use serde_json::json;

use crate::auth::{issue_token, Claims, Role};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Debug, Args)]
pub struct TokenArgs {
    #[arg(help = "Subject (user id) to put in the token")]
    pub subject: String,

    #[arg(long, value_parser = parse_role, help = "PARTNER, DIRECTOR or MANAGER; omitted means MANAGER")]
    pub role: Option<Role>,

    #[arg(long, help = "Lifetime in hours (defaults to the configured token expiry)")]
    pub hours: Option<u64>,
}

fn parse_role(s: &str) -> Result<Role, String> {
    s.to_ascii_uppercase().parse().map_err(|e| format!("{}", e))
}

/// Sign a token with the configured secret, for local testing against the API
pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let hours = args.hours.unwrap_or(config.security.token_expiry_hours);
    let claims = Claims::new(&args.subject, args.role.map(|r| r.as_str().to_string()), hours);
    let token = issue_token(&claims, &config.security.jwt_secret)?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "token": token, "subject": args.subject, "expires_in_hours": hours })
        ),
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
